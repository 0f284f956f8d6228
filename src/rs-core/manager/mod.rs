use crate::{bindings::JsMediaHost, wasm_bindgen, watchdog::Watchdog};

mod api;
mod event_listeners;

/// The `VideoBackgroundManager` is the interface exported to the JavaScript-side, keeping the
/// page's background video playing.
///
/// It is created for a single `<video>` element, through `initialize`, and stays linked to it
/// until `destroy` is called.
#[wasm_bindgen]
pub struct VideoBackgroundManager {
    /// The state machine actually deciding what to do with the media element.
    watchdog: Watchdog<JsMediaHost>,
}
