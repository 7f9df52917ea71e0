use async_trait::async_trait;
use js_sys::{Object, Reflect};
use selrelay::{PlatformError, TabInfo, Tabs};
use selrelay_ext_bridge::{from_js, js_error, stringify_js_error, to_js};
use selrelay_protocol::{ExtensionMessage, TabHandle};
use serde_json::Value;
use tracing::debug;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

use crate::chrome::{tabs_get, tabs_send_message, tabs_update, windows_update};
use crate::js_prop;

/// [`Tabs`] over `chrome.tabs`.
pub struct ChromeTabs;

#[async_trait(?Send)]
impl Tabs for ChromeTabs {
	async fn get(&self, tab: TabHandle) -> Result<Option<TabInfo>, PlatformError> {
		let promise = tabs_get(tab.id()).map_err(js_error)?;
		match JsFuture::from(promise).await {
			Ok(info) => Ok(Some(TabInfo {
				handle: tab,
				url: js_prop(&info, "url").as_string(),
				title: js_prop(&info, "title").as_string(),
			})),
			Err(err) => {
				let message = stringify_js_error(&err);
				if message.starts_with("No tab with id") {
					Ok(None)
				} else {
					Err(PlatformError::new(message))
				}
			}
		}
	}

	async fn activate(&self, tab: TabHandle) -> Result<(), PlatformError> {
		let props = single_prop("active", &JsValue::TRUE)?;
		let updated = JsFuture::from(tabs_update(tab.id(), &props).map_err(js_error)?)
			.await
			.map_err(js_error)?;

		// A background window keeps the tab hidden even when it is active.
		if let Some(window_id) = js_prop(&updated, "windowId").as_f64() {
			let props = single_prop("focused", &JsValue::TRUE)?;
			let focused = match windows_update(window_id as i32, &props) {
				Ok(promise) => JsFuture::from(promise).await.map(drop),
				Err(err) => Err(err),
			};
			if let Err(err) = focused {
				debug!(target = "selrelay", %tab, error = %stringify_js_error(&err), "could not focus target window");
			}
		}
		Ok(())
	}

	async fn send_message(&self, tab: TabHandle, message: &ExtensionMessage) -> Result<Value, PlatformError> {
		let promise = tabs_send_message(tab.id(), &to_js(message)?).map_err(js_error)?;
		let reply = JsFuture::from(promise).await.map_err(js_error)?;
		if reply.is_undefined() {
			return Ok(Value::Null);
		}
		from_js(reply)
	}
}

fn single_prop(name: &str, value: &JsValue) -> Result<JsValue, PlatformError> {
	let obj = Object::new();
	Reflect::set(&obj, &JsValue::from_str(name), value).map_err(js_error)?;
	Ok(obj.into())
}
