//! Path helpers for locating the configuration file and the database.

use std::{env, iter::Peekable, path::PathBuf, str::Chars};

use crate::error::{ConfigError, Result};

/// `$HOME`, or `/root` when it is unset.
pub fn home_dir() -> PathBuf {
    env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/root"))
}

/// `$XDG_CONFIG_HOME`, defaulting to `$HOME/.config`.
pub fn xdg_config_home() -> PathBuf {
    env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// `$XDG_DATA_HOME`, defaulting to `$HOME/.local/share`.
pub fn xdg_data_home() -> PathBuf {
    env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Expands a leading `~` and `$VAR` / `${VAR}` references, then makes the
/// path absolute against the current directory.
pub fn resolve_path(path: &str) -> Result<PathBuf> {
    let path = path.trim();
    if path.is_empty() {
        return Err(ConfigError::EmptyPath);
    }

    let path_buf = PathBuf::from(expand_variables(path)?);
    if path_buf.is_absolute() {
        Ok(path_buf)
    } else {
        Ok(env::current_dir()?.join(path_buf))
    }
}

fn expand_variables(path: &str) -> Result<String> {
    let mut result = String::with_capacity(path.len());
    let mut chars = path.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '$' => {
                let var_name = if chars.peek() == Some(&'{') {
                    chars.next();
                    consume_until(&mut chars, '}')?
                } else {
                    consume_var_name(&mut chars)
                };
                if var_name.is_empty() {
                    result.push('$');
                } else {
                    result.push_str(&lookup(&var_name)?);
                }
            }
            '~' if result.is_empty() => result.push_str(&home_dir().to_string_lossy()),
            _ => result.push(c),
        }
    }

    Ok(result)
}

fn consume_until(chars: &mut Peekable<Chars>, delimiter: char) -> Result<String> {
    let mut var_name = String::new();
    for c in chars.by_ref() {
        if c == delimiter {
            return Ok(var_name);
        }
        var_name.push(c);
    }
    Err(ConfigError::UnresolvedVariable(format!("${{{var_name}")))
}

fn consume_var_name(chars: &mut Peekable<Chars>) -> String {
    let mut var_name = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_alphanumeric() || c == '_' {
            var_name.push(c);
            chars.next();
        } else {
            break;
        }
    }
    var_name
}

fn lookup(var_name: &str) -> Result<String> {
    match var_name {
        "HOME" => Ok(home_dir().to_string_lossy().into_owned()),
        "XDG_CONFIG_HOME" => Ok(xdg_config_home().to_string_lossy().into_owned()),
        "XDG_DATA_HOME" => Ok(xdg_data_home().to_string_lossy().into_owned()),
        _ => env::var(var_name).map_err(|_| ConfigError::UnresolvedVariable(var_name.into())),
    }
}
