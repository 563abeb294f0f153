//! Scheduler timing configuration.

use std::time::Duration;

/// Pauses used by push triggers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Pause after a successful fire, so a trigger cannot fire twice for
    /// the same slot.
    pub cooldown: Duration,
    /// Pause after a failed cycle before the trigger re-arms.
    pub error_backoff: Duration,
    /// Pause between consecutive destinations during a fan-out.
    pub send_pause: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(60),
            error_backoff: Duration::from_secs(300),
            send_pause: Duration::from_secs(1),
        }
    }
}

impl SchedulerConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the post-fire cooldown.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Sets the back-off after a failed cycle.
    pub fn with_error_backoff(mut self, backoff: Duration) -> Self {
        self.error_backoff = backoff;
        self
    }

    /// Sets the pause between destinations.
    pub fn with_send_pause(mut self, pause: Duration) -> Self {
        self.send_pause = pause;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchedulerConfig::default();

        assert_eq!(config.cooldown, Duration::from_secs(60));
        assert_eq!(config.error_backoff, Duration::from_secs(300));
        assert_eq!(config.send_pause, Duration::from_secs(1));
    }

    #[test]
    fn test_config_builder() {
        let config = SchedulerConfig::new()
            .with_cooldown(Duration::from_secs(5))
            .with_error_backoff(Duration::from_secs(10))
            .with_send_pause(Duration::ZERO);

        assert_eq!(config.cooldown, Duration::from_secs(5));
        assert_eq!(config.error_backoff, Duration::from_secs(10));
        assert_eq!(config.send_pause, Duration::ZERO);
    }
}
