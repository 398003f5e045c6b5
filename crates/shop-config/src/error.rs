use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(shop_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(shop_config::toml_deserialize),
        help("Check your config.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Configuration file already exists")]
    #[diagnostic(
        code(shop_config::already_exists),
        help("Remove the existing config file or use a different location")
    )]
    ConfigAlreadyExists,

    #[error("Invalid value for `{field}`: {reason}")]
    #[diagnostic(code(shop_config::invalid_value))]
    InvalidValue { field: &'static str, reason: String },

    #[error("Path is empty")]
    #[diagnostic(code(shop_config::empty_path))]
    EmptyPath,

    #[error("Environment variable `{0}` is not set")]
    #[diagnostic(
        code(shop_config::unresolved_variable),
        help("Export the variable or use an absolute path")
    )]
    UnresolvedVariable(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(shop_config::io))]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
