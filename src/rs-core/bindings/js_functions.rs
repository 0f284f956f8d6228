use crate::wasm_bindgen;

/// # js_functions
///
/// This file lists all JavaScript functions that are callable from Rust as well as
/// struct and enumeration used by those functions.

#[wasm_bindgen]
extern "C" {
    // Log the given text in the JavaScript console, with the log level given.
    pub fn jsLog(log_level: LogLevel, log: &str);

    // Starts a timer for the number of milliseconds indicated by the `duration` argument.
    //
    // Once this timer has elapsed, and unless `jsClearTimer` has been called since with
    // the `TimerId` returned by this function, the `on_timer_ended` method of this
    // `VideoBackgroundManager` will be called with both the corresponding `TimerId` and
    // `reason`.
    pub fn jsTimer(duration: f64, reason: TimerReason) -> TimerId;

    // Clear a timer started with `jsTimer`.
    pub fn jsClearTimer(id: TimerId);

    // Look for the background `<video>` element this `VideoBackgroundManager` was created for
    // and keep a reference to it.
    //
    // All media-related functions below act on that element. The JavaScript-side should also
    // begin forwarding that element's events (`loadstart`, `loadeddata`, `play`, `pause`,
    // `ended` and `error`) as well as page-level events (visibility changes, focus, blur,
    // `touchstart` and `beforeunload`) to the corresponding `VideoBackgroundManager` methods.
    pub fn jsAttachMediaElement() -> AttachMediaElementResult;

    // Force the attributes needed for a background video: `muted`, `loop`, `playsInline` and
    // a `preload` set to `"auto"`.
    pub fn jsSetBackgroundPlaybackFlags();

    // Call the `HTMLMediaElement.prototype.load` API, discarding the current resource and
    // fetching it again.
    pub fn jsLoad();

    // Call the `HTMLMediaElement.prototype.play` API.
    //
    // The returned Promise is awaited on the JavaScript-side: once it resolves,
    // `on_play_succeeded` should be called on this `VideoBackgroundManager`.
    // If it rejects, `on_play_failed` should be called instead with the `PlayFailureReason`
    // corresponding to the rejection (`NotAllowedError` maps to `AutoplayBlocked`).
    //
    // In both cases, those methods should always be called asynchronously after the `jsPlay`
    // call.
    pub fn jsPlay();

    // Call the `HTMLMediaElement.prototype.pause` API.
    pub fn jsPause();

    // Set the `currentTime` attribute of the media element, in seconds.
    pub fn jsSeek(position: f64);

    // Synchronously read the current state of the media element.
    pub fn jsGetMediaObservation() -> MediaObservation;

    // Add one-shot `click` and `touchstart` listeners on the document calling
    // `on_user_gesture` on this `VideoBackgroundManager`.
    //
    // Both listeners should be removed as soon as either one fires.
    pub fn jsArmUserGestureRetry();

    // Remove listeners added through `jsArmUserGestureRetry` if they are still there.
    pub fn jsDisarmUserGestureRetry();
}

/// Trait allowing to convert "JavaScript Results" as exposed by the JavaScript functions into
/// `Result` structs more idiomatic to Rust.
pub(crate) trait JsResult<T, E> {
    fn result(self) -> Result<T, (E, Option<String>)>;
}

/// Errors that can arise when attempting to attach the background media element.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachMediaElementErrorCode {
    /// No element with the wanted id was found in the page.
    ElementNotFound,

    /// An element was found, but it is not an `HTMLMediaElement`.
    NotAMediaElement,

    /// Could not attach the media element because of an unknown error.
    UnknownError,
}

/// Current state of the media element, as returned by `jsGetMediaObservation`.
#[wasm_bindgen]
#[derive(Clone, Debug)]
pub struct MediaObservation {
    current_time: f64,
    ready_state: u8,
    network_state: u8,
    paused: bool,
    ended: bool,
    duration: f64,
}

#[wasm_bindgen]
impl MediaObservation {
    #[wasm_bindgen(constructor)]
    pub fn new(
        current_time: f64,
        ready_state: u8,
        network_state: u8,
        paused: bool,
        ended: bool,
        duration: f64,
    ) -> Self {
        Self {
            current_time,
            ready_state,
            network_state,
            paused,
            ended,
            duration,
        }
    }
}

impl MediaObservation {
    #[inline(always)]
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    #[inline(always)]
    pub fn ready_state(&self) -> u8 {
        self.ready_state
    }

    #[inline(always)]
    pub fn network_state(&self) -> u8 {
        self.network_state
    }

    #[inline(always)]
    pub fn paused(&self) -> bool {
        self.paused
    }

    #[inline(always)]
    pub fn ended(&self) -> bool {
        self.ended
    }

    #[inline(always)]
    pub fn duration(&self) -> f64 {
        self.duration
    }
}

/// Result of calling the `jsAttachMediaElement` JavaScript function.
///
/// Creation of an `AttachMediaElementResult` should only be performed by the JavaScript side
/// through the exposed static constructors.
#[wasm_bindgen]
pub struct AttachMediaElementResult {
    error: Option<(AttachMediaElementErrorCode, Option<String>)>,
}

#[wasm_bindgen]
impl AttachMediaElementResult {
    /// Creates an `AttachMediaElementResult` indicating success.
    ///
    /// This function should only be called by the JavaScript-side.
    pub fn success() -> Self {
        Self { error: None }
    }

    /// Creates an `AttachMediaElementResult` indicating failure, with the corresponding
    /// error.
    ///
    /// This function should only be called by the JavaScript-side.
    pub fn error(err: AttachMediaElementErrorCode, desc: Option<String>) -> Self {
        Self {
            error: Some((err, desc)),
        }
    }
}

impl JsResult<(), AttachMediaElementErrorCode> for AttachMediaElementResult {
    /// Basically unwrap and consume the `AttachMediaElementResult`, converting it into a
    /// Result enum.
    fn result(self) -> Result<(), (AttachMediaElementErrorCode, Option<String>)> {
        if let Some(err) = self.error {
            Err(err)
        } else {
            Ok(())
        }
    }
}

/// Reason why a `jsPlay` call failed, as communicated through `on_play_failed`.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayFailureReason {
    /// The media element had not enough data to begin playing.
    NotReady = 0,

    /// The browser's autoplay policy rejected a programmatic play (`NotAllowedError`).
    ///
    /// Playback will only be retried on the next user interaction.
    AutoplayBlocked = 1,

    /// Any other rejection, such as decoding or network issues.
    RuntimeError = 2,
}

/// "Reason" associated to a timer started by the `VideoBackgroundManager`.
///
/// This can then help to identify what the timer was for once resolved.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerReason {
    /// First play attempt, shortly after initialization.
    InitialPlay = 0,

    /// A play attempt is retried, either because the media element was not ready or because
    /// the previous attempt failed.
    RetryPlay = 1,

    /// The media element was unexpectedly paused and playback should be resumed.
    ResumeAfterPause = 2,

    /// The page just became visible again.
    VisibilityRestored = 3,

    /// The media element was reloaded after an `error` event.
    ErrorReload = 4,

    /// The media element was reloaded after being detected as stuck; its previous position
    /// has to be restored.
    RestoreAfterReload = 5,

    /// Regular check that the media element is still playing.
    HealthCheck = 6,

    /// Tick of the monitoring done around the known-problematic part of the video.
    CriticalTick = 7,
}

/// Levels with which a log can be emitted.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd)]
pub enum LogLevel {
    /// Log level reserved for very important errors and highly unexpected events.
    Error = 0,

    /// Log level reserved for less important errors and unexpected events.
    Warn = 1,

    /// Log level reserved for important events
    Info = 2,

    /// Log level used when debugging. Small-ish yet impactful events should be logged with it.
    Debug = 3,
}

/// Identify a pending timer.
pub type TimerId = f64;
