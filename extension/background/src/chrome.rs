//! `chrome.*` APIs only the service worker uses.

use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
	#[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = get)]
	pub fn tabs_get(tab_id: i32) -> Result<js_sys::Promise, JsValue>;

	#[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = update)]
	pub fn tabs_update(tab_id: i32, props: &JsValue) -> Result<js_sys::Promise, JsValue>;

	#[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = sendMessage)]
	pub fn tabs_send_message(tab_id: i32, message: &JsValue) -> Result<js_sys::Promise, JsValue>;

	#[wasm_bindgen(js_namespace = ["chrome", "tabs", "onRemoved"], js_name = addListener)]
	pub fn tabs_on_removed_add_listener(cb: &Closure<dyn FnMut(JsValue, JsValue)>);

	#[wasm_bindgen(catch, js_namespace = ["chrome", "windows"], js_name = update)]
	pub fn windows_update(window_id: i32, props: &JsValue) -> Result<js_sys::Promise, JsValue>;

	#[wasm_bindgen(catch, js_namespace = ["chrome", "notifications"], js_name = create)]
	pub fn notifications_create(options: &JsValue) -> Result<js_sys::Promise, JsValue>;

	#[wasm_bindgen(catch, js_namespace = ["chrome", "notifications"], js_name = clear)]
	pub fn notifications_clear(id: &str) -> Result<js_sys::Promise, JsValue>;

	#[wasm_bindgen(catch, js_namespace = ["chrome", "contextMenus"], js_name = removeAll)]
	pub fn context_menus_remove_all() -> Result<js_sys::Promise, JsValue>;

	#[wasm_bindgen(catch, js_namespace = ["chrome", "contextMenus"], js_name = create)]
	pub fn context_menus_create(props: &JsValue) -> Result<JsValue, JsValue>;

	#[wasm_bindgen(js_namespace = ["chrome", "contextMenus", "onClicked"], js_name = addListener)]
	pub fn context_menus_on_clicked_add_listener(cb: &Closure<dyn FnMut(JsValue, JsValue)>);

	#[wasm_bindgen(js_namespace = ["chrome", "runtime", "onInstalled"], js_name = addListener)]
	pub fn runtime_on_installed_add_listener(cb: &Closure<dyn FnMut(JsValue)>);

	#[wasm_bindgen(js_namespace = ["chrome", "action", "onClicked"], js_name = addListener)]
	pub fn action_on_clicked_add_listener(cb: &Closure<dyn FnMut(JsValue)>);

	#[wasm_bindgen(js_namespace = ["chrome", "action"], js_name = setTitle)]
	pub fn action_set_title(details: &JsValue);

	#[wasm_bindgen(js_namespace = ["chrome", "action"], js_name = setBadgeText)]
	pub fn action_set_badge_text(details: &JsValue);
}
