use crate::wasm_bindgen;

/// Playback-related state of the media element, as deduced from the events it sent.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    /// No media event has been received yet.
    Idle,
    /// The resource began loading (`loadstart`).
    Loading,
    /// The media element started playing (`play`).
    Playing,
    /// The media element was paused (`pause`).
    Paused,
    /// The media element reached its end (`ended`).
    Ended,
    /// The media element sent an `error` event.
    Errored,
}

/// Diagnostic snapshot of both the media element and the watchdog's internal state.
#[wasm_bindgen]
#[derive(Clone, Debug)]
pub struct WatchdogStatus {
    pub current_time: f64,
    pub duration: f64,
    pub paused: bool,
    pub ended: bool,
    pub ready_state: u8,
    pub network_state: u8,
    pub playback_state: PlaybackState,
    pub last_known_time: f64,
    pub stuck_detection_count: u32,
    pub critical_monitoring: bool,
    pub play_attempts: u32,
    pub is_page_visible: bool,
    pub awaiting_user_gesture: bool,
    pub playback_wanted: bool,
}
