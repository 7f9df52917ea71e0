//! `chrome.*` APIs used by both extension contexts.
//!
//! Manifest V3 returns a promise from every call made without a callback.

use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
	#[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = get)]
	pub fn storage_local_get(keys: &JsValue) -> Result<js_sys::Promise, JsValue>;

	#[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = set)]
	pub fn storage_local_set(items: &JsValue) -> Result<js_sys::Promise, JsValue>;

	#[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "local"], js_name = remove)]
	pub fn storage_local_remove(keys: &JsValue) -> Result<js_sys::Promise, JsValue>;

	#[wasm_bindgen(catch, js_namespace = ["chrome", "runtime"], js_name = sendMessage)]
	pub fn runtime_send_message(message: &JsValue) -> Result<js_sys::Promise, JsValue>;

	#[wasm_bindgen(js_namespace = ["chrome", "runtime", "onMessage"], js_name = addListener)]
	pub fn runtime_on_message_add_listener(cb: &Closure<dyn FnMut(JsValue, JsValue, js_sys::Function) -> bool>);

	#[wasm_bindgen(js_name = setTimeout)]
	pub fn set_timeout(handler: &js_sys::Function, timeout: i32) -> JsValue;
}
