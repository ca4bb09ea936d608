//! Playback pacing configuration.
//!
//! Delays are authored in milliseconds of script time. `speed` only affects
//! the real-time session driver; simulated traces always report script time.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ReplayError, ReplayResult};

/// Pause before the first message of a session.
pub const DEFAULT_LEAD_IN_MS: u64 = 1_000;
/// Pause after every reveal, regardless of sender.
pub const DEFAULT_REVEAL_PAUSE_MS: u64 = 500;
/// Typing delay used when neither the message nor the script sets one.
pub const DEFAULT_TYPING_DELAY_MS: u64 = 2_000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaybackConfig {
    pub lead_in_ms: u64,
    pub reveal_pause_ms: u64,
    pub fallback_typing_delay_ms: u64,
    pub speed: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            lead_in_ms: DEFAULT_LEAD_IN_MS,
            reveal_pause_ms: DEFAULT_REVEAL_PAUSE_MS,
            fallback_typing_delay_ms: DEFAULT_TYPING_DELAY_MS,
            speed: 1.0,
        }
    }
}

impl PlaybackConfig {
    /// Parses a TOML config. Missing keys keep their defaults.
    pub fn from_toml_str(input: &str) -> ReplayResult<Self> {
        let config: Self =
            toml::from_str(input).map_err(|err| ReplayError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> ReplayResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            ReplayError::InvalidConfig(format!("read {}: {err}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn with_speed(mut self, speed: f64) -> ReplayResult<Self> {
        self.speed = speed;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> ReplayResult<()> {
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(ReplayError::InvalidConfig(format!(
                "speed must be a positive number, got {}",
                self.speed
            )));
        }
        Ok(())
    }

    /// Wall-clock duration for a script delay at the configured speed.
    pub fn effective_delay(&self, delay_ms: u64) -> Duration {
        let delay = Duration::from_millis(delay_ms);
        if (self.speed - 1.0).abs() < f64::EPSILON {
            delay
        } else {
            Duration::try_from_secs_f64(delay.as_secs_f64() / self.speed)
                .unwrap_or(Duration::MAX)
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
