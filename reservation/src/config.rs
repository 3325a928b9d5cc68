//! Configuration management for the bus reservation console.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::directory::Limits;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Default `tracing` filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "bus_reservation=warn";

/// Configuration errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A limit was configured as zero
    #[error("{name} must be greater than zero")]
    ZeroLimit {
        /// Environment variable holding the limit
        name: &'static str,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Maximum registered users (`BUS_RESERVATION_MAX_USERS`, default 100)
    pub max_users: usize,
    /// Maximum tickets per user (`BUS_RESERVATION_MAX_TICKETS`, default 10)
    pub max_tickets_per_user: usize,
    /// Load the sample routes and buses at startup (`BUS_RESERVATION_SEED`, default true)
    pub seed_sample_data: bool,
    /// `tracing` filter directive (`RUST_LOG`)
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        let limits = Limits::default();
        Self {
            max_users: limits.max_users,
            max_tickets_per_user: limits.max_tickets_per_user,
            seed_sample_data: true,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable variables fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            max_users: lookup("BUS_RESERVATION_MAX_USERS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.max_users),
            max_tickets_per_user: lookup("BUS_RESERVATION_MAX_TICKETS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.max_tickets_per_user),
            seed_sample_data: lookup("BUS_RESERVATION_SEED")
                .and_then(|s| parse_flag(&s))
                .unwrap_or(defaults.seed_sample_data),
            log_filter: lookup("RUST_LOG")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.log_filter),
        }
    }

    /// Reject limits no directory could work with
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroLimit`] naming the first zero limit.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.max_users == 0 {
            return Err(ConfigError::ZeroLimit {
                name: "BUS_RESERVATION_MAX_USERS",
            });
        }
        if self.max_tickets_per_user == 0 {
            return Err(ConfigError::ZeroLimit {
                name: "BUS_RESERVATION_MAX_TICKETS",
            });
        }
        Ok(())
    }

    /// Directory limits; route and bus caps keep their defaults
    #[must_use]
    pub fn limits(&self) -> Limits {
        Limits {
            max_users: self.max_users,
            max_tickets_per_user: self.max_tickets_per_user,
            ..Limits::default()
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
