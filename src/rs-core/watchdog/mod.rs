use thiserror::Error;

use crate::{
    bindings::{
        AttachMediaElementErrorCode, MediaObservation, PlayFailureReason, TimerId, TimerReason,
    },
    Logger,
};
use retry_counter::RetryCounter;
use stuck_detector::{StallCheck, StuckDetector};

pub use configuration::WatchdogConfig;
pub use status::{PlaybackState, WatchdogStatus};

mod configuration;
mod retry_counter;
mod status;
mod stuck_detector;


/// `readyState` under which no data at all is available for the current resource.
const HAVE_NOTHING: u8 = 0;

/// `readyState` from which the current frame at least is available.
const HAVE_CURRENT_DATA: u8 = 2;

/// Everything the `Watchdog` needs from the environment hosting the media element.
///
/// In a browser this is implemented by calling JavaScript functions, see `JsMediaHost`.
pub(crate) trait MediaHost {
    /// Find and keep a reference to the media element all other methods act on.
    fn attach(&mut self) -> Result<(), AttachMediaElementError>;

    /// Force the media element to be muted, looping, played inline and eagerly preloaded.
    fn set_background_playback_flags(&mut self);

    /// Discard the current resource and load it again.
    fn load(&mut self);

    /// Ask the media element to play.
    ///
    /// The outcome has to be communicated asynchronously through either
    /// `Watchdog::on_play_succeeded` or `Watchdog::on_play_failed`.
    fn request_play(&mut self);

    fn pause(&mut self);

    /// Update the current position of the media element, in seconds.
    fn seek(&mut self, position: f64);

    /// Synchronously read the current state of the media element.
    fn observe(&self) -> MediaObservation;

    /// Start a one-shot timer of `duration` milliseconds.
    ///
    /// Once elapsed, and unless cleared before, `Watchdog::on_timer_ended` has to be called
    /// with the returned `TimerId` and the same `reason`.
    fn start_timer(&mut self, duration: f64, reason: TimerReason) -> TimerId;

    fn clear_timer(&mut self, id: TimerId);

    /// Begin listening for the next user click or touch, which should then lead to a
    /// `Watchdog::on_user_gesture` call. The listener removes itself after firing once.
    fn arm_user_gesture_retry(&mut self);

    fn disarm_user_gesture_retry(&mut self);
}

/// What led to a `Watchdog::ensure_playback_active` call.
///
/// This decides which of the guards preventing retry storms apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PlayTrigger {
    /// Timers and media events.
    Automatic,
    /// Explicit call from the page's code (`resume_video`, `restart_video`...).
    Api,
    /// The page just became visible again.
    VisibilityRestored,
    /// The user clicked or touched the page after an autoplay rejection.
    UserGesture,
}

impl PlayTrigger {
    /// Returns `true` if a play attempt may be made even once the retry counter is exhausted.
    fn bypasses_attempt_limit(self) -> bool {
        matches!(self, PlayTrigger::VisibilityRestored | PlayTrigger::UserGesture)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Lifecycle {
    /// `initialize` was not called yet or failed.
    Unbound,
    Bound,
    /// `destroy` has been called, every event is now ignored.
    Destroyed,
}

/// Media state captured right before a forced reload.
#[derive(Clone, Copy, Debug)]
struct RestorePoint {
    position: f64,
    was_playing: bool,
}

/// State machine keeping a muted, looping background video playing whenever the page is
/// visible.
///
/// It recovers from autoplay-policy rejections, media elements not ready yet, playback errors
/// and from a silent stall known to happen in a specific part of the video.
///
/// The `Watchdog` never blocks: every wait is a timer started through its `MediaHost`, whose
/// end is communicated back through `on_timer_ended`.
pub(crate) struct Watchdog<H: MediaHost> {
    host: H,

    config: WatchdogConfig,

    lifecycle: Lifecycle,

    /// Last playback state deduced from the media element's events.
    playback_state: PlaybackState,

    /// Consecutive failed play attempts.
    retry_counter: RetryCounter,

    stuck_detector: StuckDetector,

    is_page_visible: bool,

    /// `true` when a play attempt was rejected by the autoplay policy and we're now waiting for
    /// the user to interact with the page before retrying.
    awaiting_user_gesture: bool,

    /// `false` when playback was voluntarily paused through the API, in which case unexpected
    /// pauses are not fought against anymore.
    playback_wanted: bool,

    /// `true` between a `request_play` call and its outcome.
    play_request_pending: bool,

    /// Every timer currently started, with at most one timer per `TimerReason`.
    timers: Vec<(TimerId, TimerReason)>,

    /// Set while a `RestoreAfterReload` timer is pending.
    pending_restore: Option<RestorePoint>,
}

impl<H: MediaHost> Watchdog<H> {
    /// Create a new `Watchdog`. Nothing happens until `initialize` is called.
    pub(crate) fn new(host: H, config: WatchdogConfig) -> Self {
        Self {
            host,
            retry_counter: RetryCounter::new(config.max_play_attempts),
            stuck_detector: StuckDetector::new(
                config.critical_start,
                config.critical_end,
                config.stall_epsilon,
                config.stuck_threshold,
            ),
            config,
            lifecycle: Lifecycle::Unbound,
            playback_state: PlaybackState::Idle,
            is_page_visible: true,
            awaiting_user_gesture: false,
            playback_wanted: true,
            play_request_pending: false,
            timers: vec![],
            pending_restore: None,
        }
    }

    /// Bind to the media element, prepare it for background playback and schedule the first
    /// play attempt as well as the regular health check.
    ///
    /// Calling it more than once on the same `Watchdog` is an error.
    pub(crate) fn initialize(&mut self) -> Result<(), WatchdogError> {
        match self.lifecycle {
            Lifecycle::Bound => return Err(WatchdogError::AlreadyInitialized),
            Lifecycle::Destroyed => return Err(WatchdogError::Destroyed),
            Lifecycle::Unbound => {}
        }
        Logger::info("Watchdog: Initializing");
        self.host.attach()?;
        self.lifecycle = Lifecycle::Bound;

        self.host.set_background_playback_flags();
        if self.host.observe().ready_state() == HAVE_NOTHING {
            self.host.load();
        }
        self.schedule(TimerReason::InitialPlay, self.config.settle_delay);
        self.schedule(TimerReason::HealthCheck, self.config.health_check_interval);
        Logger::info("Watchdog: Initialized");
        Ok(())
    }

    /// Try to make the media element play, if the current conditions allow it.
    pub(crate) fn ensure_playback_active(&mut self, trigger: PlayTrigger) {
        if !self.is_bound() || !self.is_page_visible {
            return;
        }
        if self.awaiting_user_gesture && trigger == PlayTrigger::Automatic {
            Logger::debug("Watchdog: Autoplay blocked, waiting for a user interaction");
            return;
        }
        if self.retry_counter.is_exhausted() && !trigger.bypasses_attempt_limit() {
            Logger::info("Watchdog: Max play attempts reached, stopping");
            return;
        }
        if self.play_request_pending {
            Logger::debug("Watchdog: A play request is already pending");
            return;
        }

        if self.host.observe().ready_state() < HAVE_CURRENT_DATA {
            Logger::info("Watchdog: Media not ready, retrying later");
            self.retry_counter.record_failure();
            self.schedule(TimerReason::RetryPlay, self.config.not_ready_retry_delay);
            return;
        }

        Logger::lazy_debug(&|| format!("Watchdog: Requesting play ({:?})", trigger));
        self.play_request_pending = true;
        self.host.request_play();
    }

    /// Called when a play request issued through `MediaHost::request_play` succeeded.
    pub(crate) fn on_play_succeeded(&mut self) {
        if !self.is_bound() {
            return;
        }
        self.play_request_pending = false;
        self.retry_counter.reset();
        self.stop_awaiting_user_gesture();
        self.start_critical_monitoring();
    }

    /// Called when a play request issued through `MediaHost::request_play` failed.
    pub(crate) fn on_play_failed(&mut self, reason: PlayFailureReason) {
        if !self.is_bound() {
            return;
        }
        self.play_request_pending = false;
        self.retry_counter.record_failure();
        Logger::lazy_info(&|| {
            format!(
                "Watchdog: Play attempt failed ({:?}), {} consecutive failure(s)",
                reason,
                self.retry_counter.count()
            )
        });
        match reason {
            PlayFailureReason::AutoplayBlocked => {
                Logger::info("Watchdog: Autoplay blocked, will retry on user interaction");
                self.cancel(TimerReason::RetryPlay);
                if !self.awaiting_user_gesture {
                    self.awaiting_user_gesture = true;
                    self.host.arm_user_gesture_retry();
                }
            }
            PlayFailureReason::NotReady | PlayFailureReason::RuntimeError => {
                self.schedule(TimerReason::RetryPlay, self.config.failure_retry_delay);
            }
        }
    }

    /// Called on the first click or touch following an autoplay rejection.
    pub(crate) fn on_user_gesture(&mut self) {
        if !self.is_bound() || !self.awaiting_user_gesture {
            return;
        }
        Logger::info("Watchdog: User interaction received, retrying playback");
        self.stop_awaiting_user_gesture();
        self.playback_wanted = true;
        self.ensure_playback_active(PlayTrigger::UserGesture);
    }

    /// Called on every `touchstart` on the page.
    pub(crate) fn on_touch_start(&mut self) {
        if !self.is_bound() {
            return;
        }
        if self.awaiting_user_gesture {
            self.on_user_gesture();
        } else if self.playback_wanted && self.host.observe().paused() {
            self.ensure_playback_active(PlayTrigger::Automatic);
        }
    }

    pub(crate) fn on_visibility_change(&mut self, visible: bool) {
        let was_visible = self.is_page_visible;
        self.is_page_visible = visible;
        if !self.is_bound() {
            return;
        }
        if visible && !was_visible {
            Logger::info("Watchdog: Page became visible");
            self.schedule(TimerReason::VisibilityRestored, self.config.settle_delay);
        } else if !visible && was_visible {
            Logger::info("Watchdog: Page became hidden");
        }
    }

    pub(crate) fn on_window_focus(&mut self) {
        if !self.is_bound() {
            return;
        }
        Logger::debug("Watchdog: Window focused");
        self.ensure_playback_active(PlayTrigger::Automatic);
    }

    pub(crate) fn on_window_blur(&mut self) {
        if self.is_bound() {
            Logger::debug("Watchdog: Window blurred");
        }
    }

    pub(crate) fn on_load_start(&mut self) {
        if !self.is_bound() {
            return;
        }
        Logger::debug("Watchdog: Media load started");
        self.playback_state = PlaybackState::Loading;
    }

    pub(crate) fn on_loaded_data(&mut self) {
        if !self.is_bound() {
            return;
        }
        Logger::debug("Watchdog: Media data loaded");
        self.ensure_playback_active(PlayTrigger::Automatic);
    }

    /// Called on the media element's `play` event.
    ///
    /// Playback may have been started without going through `request_play`, e.g. by the
    /// `autoplay` attribute, in which case a previous autoplay rejection no longer applies.
    pub(crate) fn on_play(&mut self) {
        if !self.is_bound() {
            return;
        }
        Logger::info("Watchdog: Media started playing");
        self.playback_state = PlaybackState::Playing;
        self.retry_counter.reset();
        self.stop_awaiting_user_gesture();
        self.start_critical_monitoring();
    }

    /// Called on the media element's `pause` event.
    pub(crate) fn on_pause(&mut self) {
        if !self.is_bound() {
            return;
        }
        Logger::info("Watchdog: Media paused");
        self.playback_state = PlaybackState::Paused;
        self.cancel(TimerReason::CriticalTick);
        if self.is_page_visible && self.playback_wanted && !self.host.observe().ended() {
            self.schedule(TimerReason::ResumeAfterPause, self.config.settle_delay);
        }
    }

    /// Called on the media element's `ended` event.
    ///
    /// As the media element loops, this means the loop did not happen and playback has to be
    /// forced.
    pub(crate) fn on_ended(&mut self) {
        if !self.is_bound() {
            return;
        }
        Logger::info("Watchdog: Media ended while it should loop");
        self.playback_state = PlaybackState::Ended;
        self.ensure_playback_active(PlayTrigger::Automatic);
    }

    /// Called on the media element's `error` event.
    pub(crate) fn on_error(&mut self) {
        if !self.is_bound() {
            return;
        }
        Logger::error("Watchdog: Media error, reloading");
        self.playback_state = PlaybackState::Errored;
        self.host.load();
        self.schedule(TimerReason::ErrorReload, self.config.error_reload_delay);
    }

    /// Called when the page is about to be unloaded.
    ///
    /// Every timer and listener is stopped and no further action is taken on the media
    /// element, which is left as is.
    pub(crate) fn on_page_unload(&mut self) {
        if self.lifecycle != Lifecycle::Bound {
            return;
        }
        Logger::info("Watchdog: Page unloading, stopping monitoring");
        self.stop_monitoring();
        self.lifecycle = Lifecycle::Destroyed;
    }

    /// Called once a timer started through `MediaHost::start_timer` elapsed.
    pub(crate) fn on_timer_ended(&mut self, id: TimerId, reason: TimerReason) {
        let Some(idx) = self
            .timers
            .iter()
            .position(|(timer_id, timer_reason)| *timer_id == id && *timer_reason == reason)
        else {
            Logger::lazy_debug(&|| format!("Watchdog: Ignoring stale {:?} timer", reason));
            return;
        };
        self.timers.remove(idx);
        if !self.is_bound() {
            return;
        }

        match reason {
            TimerReason::InitialPlay
            | TimerReason::RetryPlay
            | TimerReason::ResumeAfterPause
            | TimerReason::ErrorReload => self.ensure_playback_active(PlayTrigger::Automatic),
            TimerReason::VisibilityRestored => {
                self.ensure_playback_active(PlayTrigger::VisibilityRestored)
            }
            TimerReason::RestoreAfterReload => self.restore_after_reload(),
            TimerReason::HealthCheck => {
                self.schedule(TimerReason::HealthCheck, self.config.health_check_interval);
                self.check_health();
            }
            TimerReason::CriticalTick => {
                self.schedule(TimerReason::CriticalTick, self.config.critical_tick_interval);
                self.check_critical_time();
            }
        }
    }

    /// Reload the media element, then restore its position and playback.
    ///
    /// Reloading is the only reliable way found to get out of a silent stall.
    pub(crate) fn force_restart(&mut self) {
        if !self.is_bound() {
            return;
        }
        Logger::warn("Watchdog: Force restarting media");
        let observation = self.host.observe();
        self.pending_restore = Some(RestorePoint {
            position: observation.current_time(),
            was_playing: !observation.paused(),
        });
        self.host.load();
        self.schedule(TimerReason::RestoreAfterReload, self.config.settle_delay);
    }

    /// Restart playback from the beginning.
    pub(crate) fn manual_restart(&mut self) {
        if !self.is_bound() {
            return;
        }
        Logger::info("Watchdog: Manual restart requested");
        self.playback_wanted = true;
        self.host.seek(0.);
        self.ensure_playback_active(PlayTrigger::Api);
    }

    /// Jump right before the critical window, to check that the stall monitoring works.
    pub(crate) fn test_critical_time(&mut self) {
        if !self.is_bound() {
            return;
        }
        let position = self.config.critical_test_position;
        Logger::lazy_info(&|| format!("Watchdog: Jumping to {}s to test critical time", position));
        self.playback_wanted = true;
        self.host.seek(position);
        self.ensure_playback_active(PlayTrigger::Api);
    }

    pub(crate) fn pause(&mut self) {
        if !self.is_bound() {
            return;
        }
        self.playback_wanted = false;
        if !self.host.observe().paused() {
            Logger::info("Watchdog: Pausing media on request");
            self.host.pause();
        }
    }

    pub(crate) fn resume(&mut self) {
        if !self.is_bound() {
            return;
        }
        self.playback_wanted = true;
        if self.host.observe().paused() {
            self.ensure_playback_active(PlayTrigger::Api);
        }
    }

    /// Returns a snapshot of the current state.
    ///
    /// Returns `None` if no media element was ever bound.
    pub(crate) fn status(&self) -> Option<WatchdogStatus> {
        if self.lifecycle == Lifecycle::Unbound {
            return None;
        }
        let observation = self.host.observe();
        Some(WatchdogStatus {
            current_time: observation.current_time(),
            duration: observation.duration(),
            paused: observation.paused(),
            ended: observation.ended(),
            ready_state: observation.ready_state(),
            network_state: observation.network_state(),
            playback_state: self.playback_state,
            last_known_time: self.stuck_detector.last_known_time(),
            stuck_detection_count: self.stuck_detector.stuck_detection_count(),
            critical_monitoring: self.is_scheduled(TimerReason::CriticalTick),
            play_attempts: self.retry_counter.count(),
            is_page_visible: self.is_page_visible,
            awaiting_user_gesture: self.awaiting_user_gesture,
            playback_wanted: self.playback_wanted,
        })
    }

    /// Stop every timer and listener, pause the media element and rewind it.
    ///
    /// Can be called whether or not `initialize` succeeded.
    pub(crate) fn destroy(&mut self) {
        self.stop_monitoring();
        if self.lifecycle == Lifecycle::Bound {
            self.host.pause();
            self.host.seek(0.);
        }
        self.lifecycle = Lifecycle::Destroyed;
        Logger::info("Watchdog: Destroyed");
    }

    fn is_bound(&self) -> bool {
        self.lifecycle == Lifecycle::Bound
    }

    fn stop_awaiting_user_gesture(&mut self) {
        if self.awaiting_user_gesture {
            self.awaiting_user_gesture = false;
            self.host.disarm_user_gesture_retry();
        }
    }

    fn stop_monitoring(&mut self) {
        for (id, _) in self.timers.drain(..) {
            self.host.clear_timer(id);
        }
        self.pending_restore = None;
        self.play_request_pending = false;
        self.stop_awaiting_user_gesture();
    }

    fn check_health(&mut self) {
        if !self.is_page_visible || !self.playback_wanted {
            return;
        }
        let observation = self.host.observe();
        if observation.paused() && !observation.ended() {
            Logger::info("Watchdog: Periodic check found media paused, resuming");
            self.ensure_playback_active(PlayTrigger::Automatic);
        }
    }

    fn start_critical_monitoring(&mut self) {
        Logger::debug("Watchdog: Starting critical time monitoring");
        self.schedule(TimerReason::CriticalTick, self.config.critical_tick_interval);
    }

    fn check_critical_time(&mut self) {
        if !self.is_page_visible {
            return;
        }
        let observation = self.host.observe();
        let current_time = observation.current_time();

        let time_to_critical = self.stuck_detector.time_to_critical(current_time);
        let tick_duration = self.config.critical_tick_interval / 1000.;
        if time_to_critical > 0.
            && time_to_critical <= self.config.critical_approach_log_window
            && time_to_critical.floor() != (time_to_critical + tick_duration).floor()
        {
            Logger::lazy_debug(&|| {
                format!(
                    "Watchdog: {:.1}s until critical time monitoring starts",
                    time_to_critical
                )
            });
        }

        match self.stuck_detector.tick(current_time, observation.paused()) {
            StallCheck::Stuck => {
                Logger::lazy_warn(&|| {
                    format!("Watchdog: Media confirmed stuck at {:.1}s", current_time)
                });
                self.force_restart();
            }
            StallCheck::Suspected { count } => {
                Logger::lazy_info(&|| {
                    format!(
                        "Watchdog: Media potentially stuck at {:.1}s (detection count: {})",
                        current_time, count
                    )
                });
            }
            StallCheck::Progressing | StallCheck::OutsideWindow => {}
        }
    }

    fn restore_after_reload(&mut self) {
        if let Some(restore) = self.pending_restore.take() {
            self.host.seek(restore.position);
            if restore.was_playing && self.is_page_visible {
                self.ensure_playback_active(PlayTrigger::Automatic);
            }
        }
    }

    /// Start a timer for `reason`, clearing the previous one with the same reason if any.
    fn schedule(&mut self, reason: TimerReason, duration: f64) {
        self.cancel(reason);
        let id = self.host.start_timer(duration, reason);
        self.timers.push((id, reason));
    }

    fn cancel(&mut self, reason: TimerReason) {
        if let Some(idx) = self.timers.iter().position(|(_, r)| *r == reason) {
            let (id, _) = self.timers.remove(idx);
            self.host.clear_timer(id);
        }
    }

    fn is_scheduled(&self, reason: TimerReason) -> bool {
        self.timers.iter().any(|(_, r)| *r == reason)
    }

    #[cfg(test)]
    pub(crate) fn host(&self) -> &H {
        &self.host
    }

    #[cfg(test)]
    pub(crate) fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

/// Error that may be returned by `Watchdog::initialize`.
#[derive(Error, Debug)]
pub(crate) enum WatchdogError {
    #[error("The watchdog has already been initialized.")]
    AlreadyInitialized,
    #[error("The watchdog has been destroyed and cannot be initialized again.")]
    Destroyed,
    #[error(transparent)]
    AttachMediaElement(#[from] AttachMediaElementError),
}

/// Error that may be returned by a `MediaHost::attach` call.
#[derive(Error, Debug)]
pub(crate) enum AttachMediaElementError {
    #[error("Background video element not found: {message}")]
    ElementNotFound { message: String },
    #[error("The background element is not a media element: {message}")]
    NotAMediaElement { message: String },
    #[error("Uncategorized Error when attaching the media element: {message}")]
    UnknownError { message: String },
}

impl From<(AttachMediaElementErrorCode, Option<String>)> for AttachMediaElementError {
    fn from(x: (AttachMediaElementErrorCode, Option<String>)) -> Self {
        let message = x.1.unwrap_or_else(|| "Unknown Error.".to_string());
        match x.0 {
            AttachMediaElementErrorCode::ElementNotFound => {
                AttachMediaElementError::ElementNotFound { message }
            }
            AttachMediaElementErrorCode::NotAMediaElement => {
                AttachMediaElementError::NotAMediaElement { message }
            }
            AttachMediaElementErrorCode::UnknownError => {
                AttachMediaElementError::UnknownError { message }
            }
        }
    }
}
