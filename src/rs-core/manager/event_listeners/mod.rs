use crate::{
    bindings::{PlayFailureReason, TimerId, TimerReason},
    wasm_bindgen,
};

use super::VideoBackgroundManager;

/// Methods triggered on JavaScript events by the JavaScript code.
///
/// Those functions are voluntarly written a certain way to put in evidence that
/// those should just be bindings forwarding to the `Watchdog` without directly
/// interacting with its state.
#[wasm_bindgen]
impl VideoBackgroundManager {
    /// The JS code should call this method when the `Promise` returned by a `play` call made
    /// on `jsPlay` resolves.
    pub fn on_play_succeeded(&mut self) {
        self.watchdog.on_play_succeeded();
    }

    /// The JS code should call this method when the `Promise` returned by a `play` call made
    /// on `jsPlay` rejects.
    ///
    /// # Arguments
    ///
    /// * `reason` - Category of the rejection. A `NotAllowedError` should be communicated as
    ///   `AutoplayBlocked`.
    pub fn on_play_failed(&mut self, reason: PlayFailureReason) {
        self.watchdog.on_play_failed(reason);
    }

    /// The JS code should call this method each time a timer started with the `jsTimer`
    /// function finished.
    ///
    /// # Arguments
    ///
    /// * `id` - The `TimerId` given by `jsTimer` when the timer was
    ///   started. This allows to identify which timer actually finished.
    ///
    /// * `reason` - The `TimerReason` given by the Rust code when that timer
    ///   was started.
    pub fn on_timer_ended(&mut self, id: TimerId, reason: TimerReason) {
        self.watchdog.on_timer_ended(id, reason);
    }

    /// The JS code should call this method when the page's visibility changes.
    pub fn on_visibility_change(&mut self, visible: bool) {
        self.watchdog.on_visibility_change(visible);
    }

    /// The JS code should call this method when a listener armed by `jsArmUserGestureRetry`
    /// fires.
    pub fn on_user_gesture(&mut self) {
        self.watchdog.on_user_gesture();
    }

    /// The JS code should call this method on each `touchstart` event on the document.
    pub fn on_touch_start(&mut self) {
        self.watchdog.on_touch_start();
    }

    /// The JS code should call this method on the window's `focus` event.
    pub fn on_window_focus(&mut self) {
        self.watchdog.on_window_focus();
    }

    /// The JS code should call this method on the window's `blur` event.
    pub fn on_window_blur(&mut self) {
        self.watchdog.on_window_blur();
    }

    /// The JS code should call this method on the window's `beforeunload` event.
    pub fn on_page_unload(&mut self) {
        self.watchdog.on_page_unload();
    }

    /// The JS code should call this method on the media element's `loadstart` event.
    pub fn on_load_start(&mut self) {
        self.watchdog.on_load_start();
    }

    /// The JS code should call this method on the media element's `loadeddata` event.
    pub fn on_loaded_data(&mut self) {
        self.watchdog.on_loaded_data();
    }

    /// The JS code should call this method on the media element's `play` event.
    pub fn on_play(&mut self) {
        self.watchdog.on_play();
    }

    /// The JS code should call this method on the media element's `pause` event.
    pub fn on_pause(&mut self) {
        self.watchdog.on_pause();
    }

    /// The JS code should call this method on the media element's `ended` event.
    pub fn on_ended(&mut self) {
        self.watchdog.on_ended();
    }

    /// The JS code should call this method on the media element's `error` event.
    pub fn on_error(&mut self) {
        self.watchdog.on_error();
    }
}
