//! Configuration management for the Folio content server

use std::env;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub content: ContentConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct ContentConfig {
    /// Directory holding one file per document
    pub dir: PathBuf,
    /// Accepted file extensions, highest priority first
    pub extensions: Vec<String>,
    /// Tab stop width for code blocks
    pub tab_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            content: ContentConfig {
                dir: PathBuf::from("./content/blog"),
                extensions: vec!["mdx".to_string(), "md".to_string()],
                tab_size: 2,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT", defaults.server.port)?,
            },
            content: ContentConfig {
                dir: env::var("CONTENT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.content.dir),
                extensions: env::var("CONTENT_EXTENSIONS")
                    .map(|v| parse_list(&v))
                    .ok()
                    .filter(|list| !list.is_empty())
                    .unwrap_or(defaults.content.extensions),
                tab_size: parse_var("CODE_TAB_SIZE", defaults.content.tab_size)?,
            },
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().trim_start_matches('.').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
