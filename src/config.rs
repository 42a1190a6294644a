//! Connection credentials and the ways of loading them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_HOST_VARIABLE: &str = "QUERY_GATEWAY_HOST";
pub const DEFAULT_USERNAME_VARIABLE: &str = "QUERY_GATEWAY_USERNAME";
pub const DEFAULT_PASSWORD_VARIABLE: &str = "QUERY_GATEWAY_PASSWORD";
pub const DEFAULT_DATABASE_VARIABLE: &str = "QUERY_GATEWAY_DATABASE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVariable(String),

    #[error("could not read credentials file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid credentials document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Source of environment variables.
pub trait Environment {
    fn read(&self, variable: &str) -> Option<String>;
}

/// The process environment.
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn read(&self, variable: &str) -> Option<String> {
        std::env::var(variable).ok()
    }
}

impl<F> Environment for F
where
    F: Fn(&str) -> Option<String>,
{
    fn read(&self, variable: &str) -> Option<String> {
        self(variable)
    }
}

/// Database credentials. Immutable once built.
///
/// For the SQLite driver `host` is the directory holding the database
/// files and `database` is a file name inside it. `username` and
/// `password` are carried for other back ends.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    host: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    database: String,
}

impl Credentials {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
            database: database.into(),
        }
    }

    /// Parse a JSON document with `host`, `username`, `password` and `database` keys.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Read credentials from the `QUERY_GATEWAY_*` variables of the process.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_environment(&ProcessEnvironment)
    }

    /// Host and database are required; username and password default to empty.
    pub fn from_environment(environment: &impl Environment) -> Result<Self, ConfigError> {
        let required = |variable: &str| {
            environment
                .read(variable)
                .ok_or_else(|| ConfigError::MissingVariable(variable.to_string()))
        };
        Ok(Self {
            host: required(DEFAULT_HOST_VARIABLE)?,
            username: environment
                .read(DEFAULT_USERNAME_VARIABLE)
                .unwrap_or_default(),
            password: environment
                .read(DEFAULT_PASSWORD_VARIABLE)
                .unwrap_or_default(),
            database: required(DEFAULT_DATABASE_VARIABLE)?,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn database(&self) -> &str {
        &self.database
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}
