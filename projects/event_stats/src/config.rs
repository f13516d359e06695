use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_DATABASE_URL: &str = "github_events.db";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_GITHUB_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub github_api_url: String,
    pub github_token: String,
    /// Monitored `owner/name` identifiers, in configured order.
    pub repositories: Vec<String>,
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub github_timeout: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("MissingVariable: {name} is not set")]
    MissingVariable {
        name: &'static str,
    },

    #[error("InvalidRepository: {value:?} is not of the form owner/name")]
    InvalidRepository {
        value: String,
    },

    #[error("InvalidBindAddr: {source}")]
    InvalidBindAddr {
        #[from]
        source: std::net::AddrParseError,
    },

    #[error("InvalidTimeout: {source}")]
    InvalidTimeout {
        #[from]
        source: std::num::ParseIntError,
    },
}

impl AppConfig {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::MissingVariable { name })
        };
        let optional = |name: &str, default: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let github_token = required("GITHUB_TOKEN")?.trim().to_string();
        let repositories = parse_repositories(&required("MONITORED_REPOSITORIES")?)?;

        let bind_addr = optional("BIND_ADDR", DEFAULT_BIND_ADDR).parse::<SocketAddr>()?;
        let timeout_secs = optional("GITHUB_TIMEOUT_SECS", &DEFAULT_GITHUB_TIMEOUT_SECS.to_string())
            .parse::<u64>()?;

        Ok(Self {
            github_api_url: optional("GITHUB_API_URL", DEFAULT_GITHUB_API_URL),
            github_token,
            repositories,
            database_url: optional("DATABASE_URL", DEFAULT_DATABASE_URL),
            bind_addr,
            github_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Splits a comma-separated list, dropping blanks and later duplicates.
pub fn parse_repositories(raw: &str) -> Result<Vec<String>, ConfigError> {
    let mut repositories: Vec<String> = Vec::new();

    for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        if !is_repo_identifier(entry) {
            return Err(ConfigError::InvalidRepository {
                value: entry.to_string(),
            });
        }
        if !repositories.iter().any(|known| known == entry) {
            repositories.push(entry.to_string());
        }
    }

    Ok(repositories)
}

fn is_repo_identifier(value: &str) -> bool {
    match value.split_once('/') {
        Some((owner, name)) => {
            !owner.is_empty()
                && !name.is_empty()
                && !name.contains('/')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
