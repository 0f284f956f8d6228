use super::js_functions::{
    jsArmUserGestureRetry, jsAttachMediaElement, jsClearTimer, jsDisarmUserGestureRetry,
    jsGetMediaObservation, jsLoad, jsPause, jsPlay, jsSeek, jsSetBackgroundPlaybackFlags, jsTimer,
    JsResult, MediaObservation, TimerId, TimerReason,
};
use crate::watchdog::{AttachMediaElementError, MediaHost};

/// `MediaHost` implementation relying on the JavaScript functions of the page.
///
/// All state lives on the JavaScript-side, this is just a thin layer converting calls.
pub(crate) struct JsMediaHost;

impl MediaHost for JsMediaHost {
    fn attach(&mut self) -> Result<(), AttachMediaElementError> {
        Ok(jsAttachMediaElement().result()?)
    }

    fn set_background_playback_flags(&mut self) {
        jsSetBackgroundPlaybackFlags();
    }

    fn load(&mut self) {
        jsLoad();
    }

    fn request_play(&mut self) {
        jsPlay();
    }

    fn pause(&mut self) {
        jsPause();
    }

    fn seek(&mut self, position: f64) {
        jsSeek(position);
    }

    fn observe(&self) -> MediaObservation {
        jsGetMediaObservation()
    }

    fn start_timer(&mut self, duration: f64, reason: TimerReason) -> TimerId {
        jsTimer(duration, reason)
    }

    fn clear_timer(&mut self, id: TimerId) {
        jsClearTimer(id);
    }

    fn arm_user_gesture_retry(&mut self) {
        jsArmUserGestureRetry();
    }

    fn disarm_user_gesture_retry(&mut self) {
        jsDisarmUserGestureRetry();
    }
}
