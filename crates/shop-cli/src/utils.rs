use std::{
    fmt::Display,
    fs,
    path::Path,
    sync::{LazyLock, RwLock},
};

use miette::{Context, IntoDiagnostic};
use nu_ansi_term::Color;
use serde::{de::DeserializeOwned, Serialize};

pub static COLOR: LazyLock<RwLock<bool>> = LazyLock::new(|| RwLock::new(true));

pub struct Colored<T: Display>(pub Color, pub T);

impl<T: Display> Display for Colored<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let color = COLOR.read().unwrap();
        if *color {
            write!(f, "{}", self.0.prefix())?;
            self.1.fmt(f)?;
            write!(f, "{}", self.0.suffix())
        } else {
            self.1.fmt(f)
        }
    }
}

/// Reads a request body from a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &str) -> miette::Result<T> {
    let path = Path::new(path);
    let content = fs::read_to_string(path)
        .into_diagnostic()
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content)
        .into_diagnostic()
        .with_context(|| format!("parsing {}", path.display()))
}

pub fn print_json<T: Serialize>(value: &T) -> miette::Result<()> {
    let out = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{out}");
    Ok(())
}

pub fn format_money(value: f64) -> String {
    format!("{value:.2}")
}
