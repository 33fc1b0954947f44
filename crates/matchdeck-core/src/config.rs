//! Deck configuration, read from the environment.
//!
//! A missing variable falls back to its default (logged); a present but
//! unparsable or zero value is an error so misconfiguration is caught at
//! startup instead of producing an empty deck later.

use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;
use tracing::info;

pub const STACK_SIZE_VAR: &str = "MATCHDECK_STACK_SIZE";
pub const SWIPE_MAX_ATTEMPTS_VAR: &str = "MATCHDECK_SWIPE_MAX_ATTEMPTS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key} value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("{key} must be greater than zero")]
    Zero { key: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckConfig {
    /// How many cards are rendered on the stack at once.
    pub stack_size: usize,
    /// How often a right swipe re-reads and retries when the other side
    /// changed between the reciprocity check and the commit.
    pub swipe_max_attempts: u32,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            stack_size: 5,
            swipe_max_attempts: 3,
        }
    }
}

impl DeckConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            stack_size: load(&lookup, STACK_SIZE_VAR, defaults.stack_size)?,
            swipe_max_attempts: load(&lookup, SWIPE_MAX_ATTEMPTS_VAR, defaults.swipe_max_attempts)?,
        })
    }
}

fn load<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display + PartialEq + Default,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        info!("{key} not set, using default: {default}");
        return Ok(default);
    };

    let value: T = raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: raw.clone(),
        reason: e.to_string(),
    })?;
    if value == T::default() {
        return Err(ConfigError::Zero { key });
    }
    Ok(value)
}
