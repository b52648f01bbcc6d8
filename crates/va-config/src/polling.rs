//! Session polling cadence.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const fn default_interval_ms() -> u64 {
    3_000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollingConfig {
    /// Period between session refreshes. The first refresh is immediate.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

impl PollingConfig {
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "polling.interval_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_interval_is_three_seconds() {
        assert_eq!(PollingConfig::default().interval(), Duration::from_secs(3));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = PollingConfig { interval_ms: 0 }.validate().unwrap_err();
        assert!(err.to_string().contains("polling.interval_ms"));
    }
}
