//! In-page notifications.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use selrelay::{FallbackNotifier, NotificationMode, Notifier, PlatformError, Timer};
use selrelay_ext_bridge::{JsTimer, js_error, send_runtime_message};
use selrelay_protocol::{ExtensionMessage, Level, Notification, StatusReply};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, HtmlElement};

const TOAST_STYLE: &str = "position:fixed;top:20px;right:20px;z-index:2147483647;color:#fff;\
	padding:12px 15px;border-radius:4px;box-shadow:0 2px 10px rgba(0,0,0,.3);\
	font:14px/1.4 system-ui,sans-serif;max-width:300px;overflow-wrap:anywhere;white-space:pre-wrap;";

fn background(level: Level) -> &'static str {
	match level {
		Level::Info => "#4caf50",
		Level::Warning => "#ff9800",
		Level::Error => "#f44336",
	}
}

/// Fixed-position toast removed after a TTL.
pub struct ToastNotifier {
	document: Document,
	ttl: Cell<Duration>,
}

impl ToastNotifier {
	pub fn new(document: Document, ttl: Duration) -> Self {
		Self {
			document,
			ttl: Cell::new(ttl),
		}
	}

	pub fn set_ttl(&self, ttl: Duration) {
		self.ttl.set(ttl);
	}
}

#[async_trait(?Send)]
impl Notifier for ToastNotifier {
	async fn notify(&self, notification: Notification) -> Result<(), PlatformError> {
		let body = self
			.document
			.body()
			.ok_or_else(|| PlatformError::new("document has no body"))?;
		let toast = self
			.document
			.create_element("div")
			.map_err(js_error)?
			.dyn_into::<HtmlElement>()
			.map_err(|_| PlatformError::new("div is not an HTMLElement"))?;

		toast
			.set_attribute("style", &format!("{TOAST_STYLE}background:{};", background(notification.level)))
			.map_err(js_error)?;
		toast.set_attribute("role", "status").map_err(js_error)?;
		// Never parsed as markup.
		toast.set_text_content(Some(&notification.message));
		body.append_child(&toast).map_err(js_error)?;

		let ttl = self.ttl.get();
		spawn_local(async move {
			JsTimer.sleep(ttl).await;
			toast.remove();
		});
		Ok(())
	}
}

/// Asks the coordinator to show a system notification.
pub struct RuntimeNotifier;

#[async_trait(?Send)]
impl Notifier for RuntimeNotifier {
	async fn notify(&self, notification: Notification) -> Result<(), PlatformError> {
		let reply: StatusReply = send_runtime_message(&ExtensionMessage::ShowNotification(notification)).await?;
		if reply.success {
			Ok(())
		} else {
			Err(PlatformError::new("coordinator could not show the notification"))
		}
	}
}

/// Page-originated notifications, routed by [`NotificationMode`].
pub struct PageNotifier {
	mode: Cell<NotificationMode>,
	system: FallbackNotifier<RuntimeNotifier, Rc<ToastNotifier>>,
	toast: Rc<ToastNotifier>,
}

impl PageNotifier {
	pub fn new(toast: Rc<ToastNotifier>) -> Self {
		Self {
			mode: Cell::new(NotificationMode::default()),
			system: FallbackNotifier::new(RuntimeNotifier, toast.clone()),
			toast,
		}
	}

	pub fn set_mode(&self, mode: NotificationMode) {
		self.mode.set(mode);
	}
}

#[async_trait(?Send)]
impl Notifier for PageNotifier {
	async fn notify(&self, notification: Notification) -> Result<(), PlatformError> {
		match self.mode.get() {
			NotificationMode::System => self.system.notify(notification).await,
			NotificationMode::Page => self.toast.notify(notification).await,
		}
	}
}
