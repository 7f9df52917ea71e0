use std::cell::Cell;
use std::time::Duration;

use async_trait::async_trait;
use selrelay::{Notifier, PlatformError, Timer};
use selrelay_ext_bridge::{JsTimer, js_error, stringify_js_error, to_js};
use selrelay_protocol::{Level, Notification};
use serde::Serialize;
use tracing::debug;
use wasm_bindgen_futures::{JsFuture, spawn_local};

use crate::chrome::{notifications_clear, notifications_create};

/// 1x1 transparent PNG; `basic` notifications require an icon.
const ICON_URL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NotificationOptions<'a> {
	#[serde(rename = "type")]
	kind: &'static str,
	icon_url: &'static str,
	title: &'a str,
	message: &'a str,
	priority: i32,
}

/// System notifications through `chrome.notifications`, cleared after a TTL.
pub struct ChromeNotifier {
	ttl: Cell<Duration>,
}

impl ChromeNotifier {
	pub fn new(ttl: Duration) -> Self {
		Self { ttl: Cell::new(ttl) }
	}

	pub fn set_ttl(&self, ttl: Duration) {
		self.ttl.set(ttl);
	}
}

#[async_trait(?Send)]
impl Notifier for ChromeNotifier {
	async fn notify(&self, notification: Notification) -> Result<(), PlatformError> {
		let options = NotificationOptions {
			kind: "basic",
			icon_url: ICON_URL,
			title: notification.display_title(),
			message: &notification.message,
			priority: if notification.level == Level::Error { 2 } else { 0 },
		};
		let created = JsFuture::from(notifications_create(&to_js(&options)?).map_err(js_error)?)
			.await
			.map_err(js_error)?;

		let Some(id) = created.as_string() else {
			return Ok(());
		};
		let ttl = self.ttl.get();
		spawn_local(async move {
			JsTimer.sleep(ttl).await;
			match notifications_clear(&id) {
				Ok(promise) => {
					if let Err(err) = JsFuture::from(promise).await {
						debug!(target = "selrelay", error = %stringify_js_error(&err), "notification already gone");
					}
				}
				Err(err) => debug!(target = "selrelay", error = %stringify_js_error(&err), "failed to clear notification"),
			}
		});
		Ok(())
	}
}
