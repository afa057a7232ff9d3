//! Autosave settings parsed from environment variables.

use std::time::Duration;

pub const DEFAULT_SAVE_DELAY_MS: u64 = 1000;

/// Host-level defaults for debounced savers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveSettings {
    /// Quiet period before a save fires, in milliseconds.
    pub delay_ms: u64,
    /// Whether savers start enabled.
    pub enabled: bool,
}

impl AutosaveSettings {
    /// Build settings from environment variables.
    ///
    /// - `AUTOSAVE_DELAY_MS`: default 1000
    /// - `AUTOSAVE_ENABLED`: `true` (default) or `false`
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            delay_ms: env_parse("AUTOSAVE_DELAY_MS", DEFAULT_SAVE_DELAY_MS),
            enabled: env_parse("AUTOSAVE_ENABLED", true),
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for AutosaveSettings {
    fn default() -> Self {
        Self { delay_ms: DEFAULT_SAVE_DELAY_MS, enabled: true }
    }
}

/// Parse `key` from the environment, falling back to `default` when it is
/// unset or unparseable.
pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
