//! Browser glue shared by the background worker and the page script.
//!
//! Everything here is a thin wasm-bindgen adapter: the selrelay core owns the
//! behavior, this crate only moves values across the JS boundary.

mod chrome;
mod logging;
mod runtime;
mod storage;
mod timer;

use selrelay::PlatformError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::{JsCast, JsValue};

pub use logging::{init_logging, set_log_level};
pub use runtime::{listen, post_runtime_message, send_runtime_message};
pub use storage::ChromeStorage;
pub use timer::JsTimer;

/// Installs the panic hook and the console subscriber.
///
/// `directive` is an `EnvFilter` directive such as `"info"` or
/// `"selrelay=debug"`. Safe to call more than once.
pub fn install(directive: &str) {
	console_error_panic_hook::set_once();
	init_logging(directive);
}

/// Converts a thrown JS value into a [`PlatformError`].
pub fn js_error(err: JsValue) -> PlatformError {
	PlatformError::new(stringify_js_error(&err))
}

pub fn stringify_js_error(err: &JsValue) -> String {
	if let Some(error) = err.dyn_ref::<js_sys::Error>() {
		return String::from(error.message());
	}
	err.as_string()
		.or_else(|| js_sys::JSON::stringify(err).ok()?.as_string())
		.unwrap_or_else(|| format!("{err:?}"))
}

/// Serializes `value` as plain JS objects (no `Map`s), which is what the
/// `chrome.*` structured-clone channels expect.
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, PlatformError> {
	value
		.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
		.map_err(|err| PlatformError::new(err.to_string()))
}

pub fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, PlatformError> {
	serde_wasm_bindgen::from_value(value).map_err(|err| PlatformError::new(err.to_string()))
}
