//! `chrome.runtime` messaging in terms of [`ExtensionMessage`] and [`Reply`].

use js_sys::Reflect;
use selrelay::{PlatformError, Responder};
use selrelay_protocol::{DeliveryOutcome, ExtensionMessage, Reply, TabHandle};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::chrome::{runtime_on_message_add_listener, runtime_send_message};
use crate::{from_js, js_error, to_js};

/// Sends `message` to the extension's other contexts and decodes the reply.
pub async fn send_runtime_message<R: DeserializeOwned>(message: &ExtensionMessage) -> Result<R, PlatformError> {
	let promise = runtime_send_message(&to_js(message)?).map_err(js_error)?;
	from_js(JsFuture::from(promise).await.map_err(js_error)?)
}

/// Fire-and-forget send for unload paths: the message leaves before this
/// returns, and a missing receiver is ignored.
pub fn post_runtime_message(message: &ExtensionMessage) -> Result<(), PlatformError> {
	let promise = runtime_send_message(&to_js(message)?).map_err(js_error)?;
	let ignore = Closure::<dyn FnMut(JsValue)>::new(|_: JsValue| {});
	let _ = promise.catch(&ignore);
	ignore.forget();
	Ok(())
}

/// Registers the context's `chrome.runtime.onMessage` listener.
///
/// `handler` receives the decoded message, the sending tab (if any) and a
/// responder that must be called exactly once. Undecodable messages are
/// answered with `{success: false, message: "unknown action"}`. The listener
/// always keeps the channel open so handlers may reply asynchronously.
pub fn listen(handler: impl Fn(ExtensionMessage, Option<TabHandle>, Responder) + 'static) {
	let on_message = Closure::<dyn FnMut(JsValue, JsValue, js_sys::Function) -> bool>::new(
		move |message: JsValue, sender: JsValue, send_response: js_sys::Function| {
			let respond: Responder = Box::new(move |reply: Reply| match to_js(&reply) {
				Ok(value) => {
					if let Err(err) = send_response.call1(&JsValue::UNDEFINED, &value) {
						debug!(target = "selrelay", error = %js_error(err), "reply channel already closed");
					}
				}
				Err(err) => warn!(target = "selrelay", error = %err, "failed to encode reply"),
			});

			match from_js::<ExtensionMessage>(message) {
				Ok(message) => handler(message, sender_tab(&sender), respond),
				Err(err) => {
					debug!(target = "selrelay", error = %err, "ignoring unknown message");
					respond(Reply::Outcome(DeliveryOutcome::failed("unknown action")));
				}
			}
			true
		},
	);
	runtime_on_message_add_listener(&on_message);
	on_message.forget();
}

/// `sender.tab.id`, absent for messages from extension pages.
fn sender_tab(sender: &JsValue) -> Option<TabHandle> {
	let tab = Reflect::get(sender, &JsValue::from_str("tab")).ok()?;
	if tab.is_undefined() {
		return None;
	}
	Reflect::get(&tab, &JsValue::from_str("id"))
		.ok()?
		.as_f64()
		.map(|id| TabHandle(id as i32))
}
