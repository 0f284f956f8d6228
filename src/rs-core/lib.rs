use wasm_bindgen::prelude::*;

mod bindings;
pub mod manager;
mod utils;
mod watchdog;

pub use utils::logger::Logger;
pub use watchdog::{PlaybackState, WatchdogConfig, WatchdogStatus};
