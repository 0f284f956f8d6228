use crate::{
    bindings::{JsMediaHost, LogLevel},
    utils::logger::LoggerLevel,
    wasm_bindgen,
    watchdog::{Watchdog, WatchdogConfig, WatchdogStatus},
    Logger,
};

use super::VideoBackgroundManager;

/// Methods exposed to the JavaScript-side.
///
/// Note that these are not the only methods callable by JavaScript. There's
/// also "event_listeners" which as its name point at, should be called when particular
/// events happen. Such "event_listeners" are defined in its own file.
#[wasm_bindgen]
impl VideoBackgroundManager {
    /// Create a new `VideoBackgroundManager`, relying on the default configuration if none is
    /// given.
    ///
    /// Nothing is done on the media element until `initialize` is called.
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<WatchdogConfig>) -> Self {
        let config = match config {
            None => WatchdogConfig::default(),
            Some(config) => match config.validate() {
                Ok(()) => config,
                Err(err) => {
                    Logger::error(&format!(
                        "API: Invalid configuration, relying on default values: {}",
                        err
                    ));
                    WatchdogConfig::default()
                }
            },
        };
        VideoBackgroundManager {
            watchdog: Watchdog::new(JsMediaHost, config),
        }
    }

    /// Bind to the background media element and begin keeping it playing.
    ///
    /// Returns `false` if that was not possible, in which case the `VideoBackgroundManager`
    /// stays inert.
    pub fn initialize(&mut self) -> bool {
        match self.watchdog.initialize() {
            Ok(()) => true,
            Err(err) => {
                Logger::error(&format!("API: Could not initialize: {}", err));
                false
            }
        }
    }

    /// Restart the video from its beginning.
    pub fn restart_video(&mut self) {
        self.watchdog.manual_restart();
    }

    /// Jump to a position right before the part of the video where playback is known to
    /// stall, to check that it is correctly handled.
    pub fn test_critical_time(&mut self) {
        self.watchdog.test_critical_time();
    }

    /// Returns a snapshot of the media element's state and of the watchdog's internal state.
    ///
    /// Returns `undefined` if no media element has been bound.
    pub fn get_video_status(&self) -> Option<WatchdogStatus> {
        self.watchdog.status()
    }

    /// Pause the video. It won't be automatically resumed until `resume_video` is called.
    pub fn pause_video(&mut self) {
        self.watchdog.pause();
    }

    pub fn resume_video(&mut self) {
        self.watchdog.resume();
    }

    /// Stop all monitoring, pause and rewind the video.
    pub fn destroy(&mut self) {
        self.watchdog.destroy();
    }

    /// Update the maximum level of logs emitted. `undefined` disables logs.
    pub fn set_log_level(&mut self, level: Option<LogLevel>) {
        let new_level = match level {
            None => LoggerLevel::None,
            Some(LogLevel::Error) => LoggerLevel::Error,
            Some(LogLevel::Warn) => LoggerLevel::Warn,
            Some(LogLevel::Info) => LoggerLevel::Info,
            Some(LogLevel::Debug) => LoggerLevel::Debug,
        };
        Logger::set_logger_level(new_level);
    }
}

impl Default for VideoBackgroundManager {
    fn default() -> Self {
        Self::new(None)
    }
}
