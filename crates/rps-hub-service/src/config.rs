//! Service configuration from environment variables.

use rps_core::AccountId;
use rps_engine::DEFAULT_SESSION_EXPIRATION_SECS;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is not a valid {expected}: {value}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Settings read at startup
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    /// `PORT`, default 3000
    pub port: u16,
    /// `SESSION_EXPIRATION_SECS`, default six hours
    pub session_expiration_secs: u64,
    /// `HUB_OWNER_ID`; a fresh id when unset
    pub owner: AccountId,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                expected: "port number",
                value,
            })?,
            None => 3000,
        };

        let session_expiration_secs = match lookup("SESSION_EXPIRATION_SECS") {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "SESSION_EXPIRATION_SECS",
                        expected: "positive number of seconds",
                        value,
                    })
                }
            },
            None => DEFAULT_SESSION_EXPIRATION_SECS,
        };

        let owner = match lookup("HUB_OWNER_ID") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "HUB_OWNER_ID",
                expected: "UUID",
                value,
            })?,
            None => AccountId::new(),
        };

        Ok(Self {
            port,
            session_expiration_secs,
            owner,
        })
    }
}
