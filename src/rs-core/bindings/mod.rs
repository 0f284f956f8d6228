mod js_functions;
mod media_host;

pub use js_functions::*;
pub(crate) use media_host::JsMediaHost;
