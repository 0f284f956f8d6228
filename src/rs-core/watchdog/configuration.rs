use thiserror::Error;

use crate::wasm_bindgen;

const DEFAULT_MAX_PLAY_ATTEMPTS: u32 = 3;
const DEFAULT_CRITICAL_START: f64 = 18.;
const DEFAULT_CRITICAL_END: f64 = 25.;
const DEFAULT_HEALTH_CHECK_INTERVAL: f64 = 5000.;
const DEFAULT_CRITICAL_TICK_INTERVAL: f64 = 200.;
const DEFAULT_NOT_READY_RETRY_DELAY: f64 = 500.;
const DEFAULT_FAILURE_RETRY_DELAY: f64 = 1000.;
const DEFAULT_ERROR_RELOAD_DELAY: f64 = 1000.;
const DEFAULT_SETTLE_DELAY: f64 = 100.;
const DEFAULT_STUCK_THRESHOLD: u32 = 3;
const DEFAULT_STALL_EPSILON: f64 = 0.1;
const DEFAULT_CRITICAL_TEST_POSITION: f64 = 19.;
const DEFAULT_CRITICAL_APPROACH_LOG_WINDOW: f64 = 3.;

/// Configuration on which the `Watchdog` relies.
///
/// All delays and intervals are in milliseconds, all positions in seconds.
#[wasm_bindgen]
#[derive(Clone, Debug, PartialEq)]
pub struct WatchdogConfig {
    /// Amount of consecutive failed play attempts after which automatic retries stop until
    /// either playback succeeds or the user interacts with the page.
    pub(crate) max_play_attempts: u32,

    /// Start of the part of the video where playback is known to silently stall, in seconds.
    pub(crate) critical_start: f64,

    /// End of the part of the video where playback is known to silently stall, in seconds.
    pub(crate) critical_end: f64,

    /// Interval at which the media element is checked for an unwanted pause.
    pub(crate) health_check_interval: f64,

    /// Interval between two position checks while playing.
    pub(crate) critical_tick_interval: f64,

    /// Delay before re-checking a media element which had not enough data to play.
    pub(crate) not_ready_retry_delay: f64,

    /// Delay before retrying a play attempt which failed for a reason other than the autoplay
    /// policy.
    pub(crate) failure_retry_delay: f64,

    /// Delay between the reload following an `error` event and the next play attempt.
    pub(crate) error_reload_delay: f64,

    /// Short delay awaited after an unexpected pause, a visibility change, a forced reload or
    /// the initialization before acting on the media element.
    pub(crate) settle_delay: f64,

    /// Amount of consecutive ticks without progress inside the critical window after which
    /// the media element is considered stuck.
    pub(crate) stuck_threshold: u32,

    /// Minimum progress in seconds between two ticks for playback to be considered as
    /// advancing.
    pub(crate) stall_epsilon: f64,

    /// Position `test_critical_time` jumps to.
    pub(crate) critical_test_position: f64,

    /// How long before `critical_start` we begin logging the remaining time, in seconds.
    pub(crate) critical_approach_log_window: f64,
}

#[wasm_bindgen]
impl WatchdogConfig {
    /// Create a new `WatchdogConfig` with the default values.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            max_play_attempts: DEFAULT_MAX_PLAY_ATTEMPTS,
            critical_start: DEFAULT_CRITICAL_START,
            critical_end: DEFAULT_CRITICAL_END,
            health_check_interval: DEFAULT_HEALTH_CHECK_INTERVAL,
            critical_tick_interval: DEFAULT_CRITICAL_TICK_INTERVAL,
            not_ready_retry_delay: DEFAULT_NOT_READY_RETRY_DELAY,
            failure_retry_delay: DEFAULT_FAILURE_RETRY_DELAY,
            error_reload_delay: DEFAULT_ERROR_RELOAD_DELAY,
            settle_delay: DEFAULT_SETTLE_DELAY,
            stuck_threshold: DEFAULT_STUCK_THRESHOLD,
            stall_epsilon: DEFAULT_STALL_EPSILON,
            critical_test_position: DEFAULT_CRITICAL_TEST_POSITION,
            critical_approach_log_window: DEFAULT_CRITICAL_APPROACH_LOG_WINDOW,
        }
    }

    pub fn set_max_play_attempts(&mut self, max_play_attempts: u32) {
        self.max_play_attempts = max_play_attempts;
    }

    pub fn set_critical_window(&mut self, start: f64, end: f64) {
        self.critical_start = start;
        self.critical_end = end;
    }

    pub fn set_health_check_interval(&mut self, interval: f64) {
        self.health_check_interval = interval;
    }

    pub fn set_critical_tick_interval(&mut self, interval: f64) {
        self.critical_tick_interval = interval;
    }

    /// Update both retry delays: `not_ready` when the media element had not enough data,
    /// `failure` when the play request was rejected.
    pub fn set_retry_delays(&mut self, not_ready: f64, failure: f64) {
        self.not_ready_retry_delay = not_ready;
        self.failure_retry_delay = failure;
    }

    pub fn set_error_reload_delay(&mut self, delay: f64) {
        self.error_reload_delay = delay;
    }

    pub fn set_settle_delay(&mut self, delay: f64) {
        self.settle_delay = delay;
    }

    pub fn set_stuck_threshold(&mut self, ticks: u32) {
        self.stuck_threshold = ticks;
    }

    pub fn set_stall_epsilon(&mut self, epsilon: f64) {
        self.stall_epsilon = epsilon;
    }

    pub fn set_critical_test_position(&mut self, position: f64) {
        self.critical_test_position = position;
    }

    /// How long before the critical window, in seconds, the remaining time starts being
    /// logged.
    pub fn set_critical_approach_log_window(&mut self, window: f64) {
        self.critical_approach_log_window = window;
    }
}

impl WatchdogConfig {
    /// Check that this configuration can be relied on.
    pub(crate) fn validate(&self) -> Result<(), ConfigurationError> {
        if self.max_play_attempts == 0 {
            return Err(ConfigurationError::ZeroValue {
                name: "max_play_attempts",
            });
        }
        if self.stuck_threshold == 0 {
            return Err(ConfigurationError::ZeroValue {
                name: "stuck_threshold",
            });
        }
        let durations = [
            ("critical_start", self.critical_start),
            ("critical_end", self.critical_end),
            ("health_check_interval", self.health_check_interval),
            ("critical_tick_interval", self.critical_tick_interval),
            ("not_ready_retry_delay", self.not_ready_retry_delay),
            ("failure_retry_delay", self.failure_retry_delay),
            ("error_reload_delay", self.error_reload_delay),
            ("settle_delay", self.settle_delay),
            ("stall_epsilon", self.stall_epsilon),
            ("critical_test_position", self.critical_test_position),
            ("critical_approach_log_window", self.critical_approach_log_window),
        ];
        if let Some((name, value)) = durations
            .iter()
            .find(|(_, value)| !value.is_finite() || *value < 0.)
        {
            return Err(ConfigurationError::InvalidValue {
                name: *name,
                value: *value,
            });
        }
        if self.health_check_interval == 0. || self.critical_tick_interval == 0. {
            return Err(ConfigurationError::ZeroValue {
                name: "interval",
            });
        }
        if self.critical_start > self.critical_end {
            return Err(ConfigurationError::InvertedCriticalWindow {
                start: self.critical_start,
                end: self.critical_end,
            });
        }
        Ok(())
    }
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Error returned by `WatchdogConfig::validate`.
#[derive(Error, Debug, PartialEq)]
pub(crate) enum ConfigurationError {
    #[error("`{name}` should be a finite positive number, got {value}.")]
    InvalidValue { name: &'static str, value: f64 },
    #[error("`{name}` cannot be set to zero.")]
    ZeroValue { name: &'static str },
    #[error("The critical window starts ({start}s) after it ends ({end}s).")]
    InvertedCriticalWindow { start: f64, end: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = WatchdogConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.max_play_attempts, 3);
        assert_eq!(config.critical_start, 18.);
        assert_eq!(config.critical_end, 25.);
        assert_eq!(config.stuck_threshold, 3);
    }

    #[test]
    fn test_invalid_configs() {
        let mut config = WatchdogConfig::new();
        config.set_critical_window(25., 18.);
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::InvertedCriticalWindow {
                start: 25.,
                end: 18.
            })
        );

        let mut config = WatchdogConfig::new();
        config.set_max_play_attempts(0);
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::ZeroValue {
                name: "max_play_attempts"
            })
        );

        let mut config = WatchdogConfig::new();
        config.set_retry_delays(500., f64::NAN);
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidValue {
                name: "failure_retry_delay",
                ..
            })
        ));

        let mut config = WatchdogConfig::new();
        config.set_critical_tick_interval(0.);
        assert!(config.validate().is_err());

        let mut config = WatchdogConfig::new();
        config.set_stall_epsilon(-1.);
        assert!(config.validate().is_err());

        let mut config = WatchdogConfig::new();
        config.set_critical_approach_log_window(f64::INFINITY);
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidValue {
                name: "critical_approach_log_window",
                ..
            })
        ));
        config.set_critical_approach_log_window(5.);
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.critical_approach_log_window, 5.);
    }
}
