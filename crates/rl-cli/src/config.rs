//! Environment configuration, read once at startup.

use rl_gerrit::{ErrorKind, QueryClient, DEFAULT_SSH_PORT};
use std::num::ParseIntError;
use thiserror::Error;

pub const SERVER_ENV: &str = "GERRIT_URL";
pub const PORT_ENV: &str = "GERRIT_PORT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Set environment variable GERRIT_URL.")]
    MissingServer,

    #[error("Invalid GERRIT_PORT value {value:?}: {source}")]
    InvalidPort {
        value: String,
        #[source]
        source: ParseIntError,
    },
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Config
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SSH destination of the Gerrit server, e.g. `user@review.example.com`
    pub server: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server = lookup(SERVER_ENV)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingServer)?;

        let port = match lookup(PORT_ENV).filter(|p| !p.trim().is_empty()) {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|source| ConfigError::InvalidPort { value, source })?,
            None => DEFAULT_SSH_PORT,
        };

        Ok(Self { server, port })
    }

    pub fn query_client(&self, debug: bool) -> QueryClient {
        QueryClient::new(self.server.clone())
            .with_port(self.port)
            .with_debug(debug)
    }
}
