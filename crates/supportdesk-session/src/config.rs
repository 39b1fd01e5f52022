use chrono::Duration;
use serde::{Deserialize, Serialize};
use supportdesk_core::{SupportError, SupportResult};

/// Longest accepted expiration window: one year.
pub const MAX_EXPIRATION_MINUTES: i64 = 365 * 24 * 60;

/// Settings for the session cache, read once when the manager is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Sessions older than this many minutes are treated as gone.
    #[serde(default = "default_expiration_minutes")]
    pub expiration_minutes: i64,
    /// How often the background sweeper purges expired sessions.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_expiration_minutes() -> i64 {
    30
}

fn default_sweep_interval_secs() -> u64 {
    60
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            expiration_minutes: default_expiration_minutes(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl SessionConfig {
    /// The expiration window, rejecting values outside
    /// `1..=MAX_EXPIRATION_MINUTES`.
    pub fn expiration_window(&self) -> SupportResult<Duration> {
        if !(1..=MAX_EXPIRATION_MINUTES).contains(&self.expiration_minutes) {
            return Err(SupportError::Config(format!(
                "session.expiration_minutes must be between 1 and {MAX_EXPIRATION_MINUTES}, got {}",
                self.expiration_minutes
            )));
        }
        Duration::try_minutes(self.expiration_minutes).ok_or_else(|| {
            SupportError::Config(format!(
                "session.expiration_minutes out of range: {}",
                self.expiration_minutes
            ))
        })
    }

    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_to_missing_fields() {
        let config: SessionConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.expiration_minutes, 30);
        assert_eq!(config.sweep_interval_secs, 60);
        assert_eq!(config.expiration_window().unwrap(), Duration::minutes(30));
    }

    #[test]
    fn test_out_of_range_expiration_is_config_error() {
        for minutes in [0, -5, MAX_EXPIRATION_MINUTES + 1, 200_000_000_000, i64::MAX] {
            let config = SessionConfig {
                expiration_minutes: minutes,
                sweep_interval_secs: 60,
            };
            let err = config.expiration_window().unwrap_err();
            assert!(matches!(err, SupportError::Config(_)), "minutes = {minutes}");
        }
    }

    #[test]
    fn test_upper_bound_is_accepted() {
        let config = SessionConfig {
            expiration_minutes: MAX_EXPIRATION_MINUTES,
            sweep_interval_secs: 60,
        };
        assert_eq!(
            config.expiration_window().unwrap(),
            Duration::days(365)
        );
    }

    #[test]
    fn test_zero_sweep_interval_is_clamped() {
        let config = SessionConfig {
            expiration_minutes: 5,
            sweep_interval_secs: 0,
        };
        assert_eq!(config.sweep_interval(), std::time::Duration::from_secs(1));
    }
}
