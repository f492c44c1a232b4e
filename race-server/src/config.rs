use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use race_core::DEFAULT_MAX_WORD_DRAWS;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Word file to load; the built-in list is used when unset.
    pub words_file: Option<PathBuf>,
    pub max_word_draws: usize,
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 8080),
            words_file: env::var("WORDS_FILE").ok().map(PathBuf::from),
            max_word_draws: parse_var("MAX_WORD_DRAWS", DEFAULT_MAX_WORD_DRAWS),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_var<T: FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    parse_value(name, env::var(name).ok(), default)
}

/// `raw` is the variable's value, if set. Unparsable values fall back to
/// `default` with a warning.
fn parse_value<T: FromStr + Copy + std::fmt::Display>(name: &str, raw: Option<String>, default: T) -> T {
    match raw {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid {} value {:?}, using {}", name, raw, default);
            default
        }),
        None => default,
    }
}
