//! Environment driven configuration.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::{MockError, Result};

pub const DEFAULT_SYSTEMS_PER_ORG: usize = 10;
pub const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_PORT: u16 = 9090;

/// Which directory implementation backs the lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryBackend {
    Postgres,
    Memory,
}

impl FromStr for DirectoryBackend {
    type Err = MockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(DirectoryBackend::Postgres),
            "memory" => Ok(DirectoryBackend::Memory),
            other => Err(MockError::Config(format!(
                "Invalid DIRECTORY_BACKEND '{}', expected 'postgres' or 'memory'",
                other
            ))),
        }
    }
}

/// Connection settings for the subscription database.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
}

// Keeps the password out of logs.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

impl DatabaseConfig {
    pub fn to_pg_config(&self) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.host)
            .port(self.port)
            .dbname(&self.name)
            .user(&self.user)
            .password(&self.password);
        config
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub systems_per_org: usize,
    pub lookup_timeout: Duration,
    pub seed: Option<u64>,
    pub directory_backend: DirectoryBackend,
    pub bind_addr: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so it can be
    /// exercised without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database = DatabaseConfig {
            host: var("RHSM_DB_HOST", "localhost"),
            port: parse_var(&lookup, "RHSM_DB_PORT", 5432)?,
            name: var("RHSM_DB_NAME", "rhsm-subscriptions"),
            user: var("RHSM_DB_USER", "rhsm-subscriptions"),
            password: var("RHSM_DB_PASS", ""),
        };

        let systems_per_org = parse_var(&lookup, "SYS_PER_ORG", DEFAULT_SYSTEMS_PER_ORG)?;
        let timeout_ms = parse_var(&lookup, "LOOKUP_TIMEOUT_MS", DEFAULT_LOOKUP_TIMEOUT_MS)?;

        let seed = match lookup("MOCK_SEED") {
            Some(raw) => Some(
                raw.trim()
                    .parse()
                    .map_err(|e| MockError::Config(format!("Invalid MOCK_SEED: {}", e)))?,
            ),
            None => None,
        };

        let directory_backend = match lookup("DIRECTORY_BACKEND") {
            Some(raw) => raw.parse()?,
            None => DirectoryBackend::Postgres,
        };

        Ok(Self {
            database,
            systems_per_org,
            lookup_timeout: Duration::from_millis(timeout_ms),
            seed,
            directory_backend,
            bind_addr: var("BIND_ADDR", "0.0.0.0"),
            port: parse_var(&lookup, "PORT", DEFAULT_PORT)?,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| MockError::Config(format!("Invalid {}: {}", key, e))),
        None => Ok(default),
    }
}
