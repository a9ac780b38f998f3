// Copyright (c) 2025 - Cowboy AI, Inc.
//! Subscription configuration

use crate::errors::{ValueChangeError, ValueChangeResult};
use crate::reducer::Reducer;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable holding the polling interval in milliseconds
pub const ENV_FREQUENCY_MS: &str = "VALUE_CHANGE_FREQUENCY_MS";
/// Environment variable holding the reducer name
pub const ENV_REDUCER: &str = "VALUE_CHANGE_REDUCER";
/// Environment variable enabling abort of superseded invocations
pub const ENV_ABORT: &str = "VALUE_CHANGE_ABORT";

/// Default polling interval
pub const DEFAULT_FREQUENCY: Duration = Duration::from_millis(100);

/// Configuration for one value-change subscription
///
/// Fixed once the subscription is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueChangeConfig {
    /// Polling interval between queue checks
    #[serde(rename = "frequency_ms", with = "duration_millis")]
    pub frequency: Duration,

    /// How a batch of changes becomes handler invocations
    pub reducer: Reducer,

    /// Abort the running batch when newer changes are waiting
    pub abort_in_flight: bool,
}

impl Default for ValueChangeConfig {
    fn default() -> Self {
        Self {
            frequency: DEFAULT_FREQUENCY,
            reducer: Reducer::default(),
            abort_in_flight: false,
        }
    }
}

impl ValueChangeConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the polling interval
    pub fn with_frequency(mut self, frequency: Duration) -> Self {
        self.frequency = frequency;
        self
    }

    /// Set the reducer strategy
    pub fn with_reducer(mut self, reducer: Reducer) -> Self {
        self.reducer = reducer;
        self
    }

    /// Enable or disable aborting superseded invocations
    pub fn with_abort_in_flight(mut self, abort_in_flight: bool) -> Self {
        self.abort_in_flight = abort_in_flight;
        self
    }

    /// Polling interval in whole milliseconds, saturating at `u64::MAX`
    pub fn frequency_millis(&self) -> u64 {
        u64::try_from(self.frequency.as_millis()).unwrap_or(u64::MAX)
    }

    /// Check the configuration can drive a scheduler
    pub fn validate(&self) -> ValueChangeResult<()> {
        if self.frequency.is_zero() {
            return Err(ValueChangeError::Configuration(
                "frequency must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> ValueChangeResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> ValueChangeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_FREQUENCY_MS) {
            let millis: u64 = raw.trim().parse().map_err(|e| {
                ValueChangeError::Configuration(format!("{ENV_FREQUENCY_MS}='{raw}': {e}"))
            })?;
            config.frequency = Duration::from_millis(millis);
        }

        if let Some(raw) = lookup(ENV_REDUCER) {
            config.reducer = raw.parse()?;
        }

        if let Some(raw) = lookup(ENV_ABORT) {
            config.abort_in_flight = parse_flag(ENV_ABORT, &raw)?;
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_flag(key: &str, raw: &str) -> ValueChangeResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ValueChangeError::Configuration(format!(
            "{key}='{raw}' is not a boolean"
        ))),
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
