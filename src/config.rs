use std::{collections::HashMap, path::PathBuf};

use crate::job::TransitionPolicy;

pub const DEFAULT_PORT: u16 = 24153;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("PORT must be a number, got {0:?}")]
    InvalidPort(String),
    #[error("AUTH_TOKENS entries must look like token:userId, got {0:?}")]
    InvalidToken(String),
    #[error("STRICT_TRANSITIONS must be true/false/1/0, got {0:?}")]
    InvalidFlag(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub port: u16,
    /// token -> user id
    pub auth_tokens: HashMap<String, String>,
    pub data_file: Option<PathBuf>,
    pub transitions: TransitionPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(port) => {
                if port.is_empty() || !port.chars().all(char::is_numeric) {
                    return Err(ConfigError::InvalidPort(port));
                }
                port.parse::<u16>().map_err(|_| ConfigError::InvalidPort(port))?
            }
            None => DEFAULT_PORT,
        };

        let auth_tokens = match lookup("AUTH_TOKENS") {
            Some(raw) => parse_tokens(&raw)?,
            None => HashMap::new(),
        };

        let transitions = match lookup("STRICT_TRANSITIONS").as_deref() {
            None | Some("") | Some("false") | Some("0") => TransitionPolicy::Permissive,
            Some("true") | Some("1") => TransitionPolicy::Strict,
            Some(other) => return Err(ConfigError::InvalidFlag(other.to_string())),
        };

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            auth_tokens,
            data_file: lookup("DATA_FILE")
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
            transitions,
        })
    }
}

fn parse_tokens(raw: &str) -> Result<HashMap<String, String>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once(':') {
            Some((token, user)) if !token.is_empty() && !user.is_empty() => {
                Ok((token.to_string(), user.to_string()))
            }
            _ => Err(ConfigError::InvalidToken(entry.to_string())),
        })
        .collect()
}
