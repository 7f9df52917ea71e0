//! Background relay coordinator.
//!
//! The [`Coordinator`] is the only component that knows how to reach the
//! target tab. A relay runs through a fixed pipeline:
//!
//! 1. a target must be designated ([`RelayError::NoTarget`]);
//! 2. the tab must still exist ([`RelayError::TargetClosed`]);
//! 3. the tab is brought to the foreground ([`RelayError::TargetUnreachable`]);
//! 4. `deliverText` with the prefixed text is sent and its reply awaited,
//!    bounded by [`RelayConfig::reply_timeout_ms`]
//!    ([`RelayError::ConnectionLost`], [`RelayError::Unresponsive`]);
//! 5. the automator's reply is passed through ([`RelayError::Automation`]).
//!
//! Liveness and transport failures clear the registry; every terminal outcome
//! produces exactly one notification and, when a [`Responder`] was supplied,
//! exactly one reply.
//!
//! Notifications follow [`NotificationMode`]. In `system` mode the host
//! notifier is tried first; when it fails, or in `page` mode, the originating
//! tab is asked to show a toast; the log is the last resort.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use futures_util::future::{Either, select};
use futures_util::lock::Mutex;
use selrelay_protocol::{
	Ack, DeliveryOutcome, ExtensionMessage, IsTargetReply, Notification, Reply, StatusReply, TabHandle,
	TargetReply,
};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{RelayError, Result};
use crate::notify::LogNotifier;
use crate::platform::{Notifier, Storage, Tabs, Timer};
use crate::registry::TargetRegistry;
use crate::settings::{NotificationMode, RelayConfig, SettingsStore};

/// One-shot reply continuation for a request.
pub type Responder = Box<dyn FnOnce(Reply)>;

const DESIGNATED: &str = "this page is now the relay target";
const CLEARED: &str = "relay target cleared";
const DELIVERED_FALLBACK: &str = "text sent to the target page";

pub struct Coordinator {
	registry: TargetRegistry,
	settings: SettingsStore,
	prefix: RefCell<String>,
	config: RefCell<RelayConfig>,
	tabs: Rc<dyn Tabs>,
	timer: Rc<dyn Timer>,
	notifier: Rc<dyn Notifier>,
	/// Held for the whole liveness-activate-deliver sequence.
	delivery: Mutex<()>,
}

impl Coordinator {
	/// Creates a coordinator with an empty registry and default settings.
	///
	/// Call [`init`](Self::init) once to load persisted state; requests
	/// arriving earlier see no target.
	pub fn new(storage: Rc<dyn Storage>, tabs: Rc<dyn Tabs>, timer: Rc<dyn Timer>, notifier: Rc<dyn Notifier>) -> Self {
		Self {
			registry: TargetRegistry::new(storage.clone()),
			settings: SettingsStore::new(storage),
			prefix: RefCell::new(selrelay_protocol::DEFAULT_PREFIX.to_string()),
			config: RefCell::new(RelayConfig::default()),
			tabs,
			timer,
			notifier,
			delivery: Mutex::new(()),
		}
	}

	pub async fn init(&self) {
		self.registry.hydrate().await;
		let prefix = self.settings.load_prefix().await;
		let config = self.settings.load_config().await;
		debug!(target = "selrelay", prefix = %prefix, timeout_ms = config.reply_timeout_ms, "coordinator ready");
		*self.prefix.borrow_mut() = prefix;
		*self.config.borrow_mut() = config;
	}

	pub fn registry(&self) -> &TargetRegistry {
		&self.registry
	}

	pub fn target(&self) -> Option<TabHandle> {
		self.registry.get()
	}

	pub fn prefix(&self) -> String {
		self.prefix.borrow().clone()
	}

	pub fn config(&self) -> RelayConfig {
		self.config.borrow().clone()
	}

	/// Dispatches one runtime message. `respond` is called exactly once.
	pub async fn handle(&self, message: ExtensionMessage, sender: Option<TabHandle>, respond: Responder) {
		debug!(target = "selrelay", action = message.action(), sender = ?sender, "handling message");

		let reply = match message {
			ExtensionMessage::RelayText { text } => {
				self.relay(&text, sender, Some(respond)).await;
				return;
			}
			ExtensionMessage::DesignateTarget => match sender {
				Some(tab) => Reply::Ack(self.designate(tab).await),
				None => Reply::Ack(Ack::new("only a page can designate itself as target")),
			},
			ExtensionMessage::IsTarget => Reply::IsTarget(IsTargetReply {
				is_target: sender.is_some_and(|tab| self.registry.is_current(tab)),
			}),
			ExtensionMessage::GetTarget => Reply::Target(TargetReply {
				target_handle: self.registry.get(),
			}),
			ExtensionMessage::ClearTarget => Reply::Ack(self.clear_target().await),
			ExtensionMessage::ShowNotification(notification) => Reply::Status(StatusReply {
				success: self.notify(notification, sender).await,
				tab_handle: None,
			}),
			ExtensionMessage::UpdatePrefix { value } => {
				self.update_prefix(&value).await;
				Reply::Empty
			}
			ExtensionMessage::RememberSelection { text } => {
				if let Err(err) = self.settings.save_selection(&text).await {
					warn!(target = "selrelay", error = %err, "failed to remember selection");
				}
				Reply::Empty
			}
			ExtensionMessage::ContentScriptReady => {
				debug!(target = "selrelay", sender = ?sender, "page script loaded");
				Reply::Status(StatusReply { success: true, tab_handle: sender })
			}
			ExtensionMessage::ContentScriptUnloading => {
				debug!(target = "selrelay", sender = ?sender, "page script unloading");
				Reply::Status(StatusReply { success: true, tab_handle: sender })
			}
			other @ (ExtensionMessage::DeliverText { .. } | ExtensionMessage::ProbeIsTargetPage { .. }) => {
				warn!(target = "selrelay", action = other.action(), "page-bound action sent to coordinator");
				Reply::Outcome(DeliveryOutcome::failed(format!("unsupported action: {}", other.action())))
			}
		};

		respond(reply);
	}

	/// Relays `text` to the target page on behalf of `origin`.
	///
	/// Fire-and-forget callers (context menu) pass no responder; the outcome is
	/// still notified and returned.
	pub async fn relay(&self, text: &str, origin: Option<TabHandle>, respond: Option<Responder>) -> DeliveryOutcome {
		let outcome = match self.try_relay(text).await {
			Ok(message) => {
				info!(target = "selrelay", "relay delivered");
				DeliveryOutcome::delivered(message)
			}
			Err(err) => {
				warn!(target = "selrelay", error = %err, kind = ?err.kind(), "relay failed");
				DeliveryOutcome::failed(err.to_string())
			}
		};

		let notification = if outcome.is_success() {
			Notification::info(outcome.message())
		} else {
			Notification::error(outcome.message())
		};
		self.notify(notification, origin).await;

		if let Some(respond) = respond {
			respond(Reply::Outcome(outcome.clone()));
		}
		outcome
	}

	async fn try_relay(&self, text: &str) -> Result<String> {
		if text.trim().is_empty() {
			return Err(RelayError::EmptyText);
		}

		let _turn = self.delivery.lock().await;
		let handle = self.registry.get().ok_or(RelayError::NoTarget)?;

		let result = self.deliver_to(handle, text).await;
		if let Err(err) = &result {
			if err.clears_target() && self.registry.clear_if(handle).await {
				info!(target = "selrelay", tab = %handle, "target dropped after failed relay");
			}
		}
		result
	}

	async fn deliver_to(&self, handle: TabHandle, text: &str) -> Result<String> {
		match self.tabs.get(handle).await {
			Ok(Some(_)) => {}
			Ok(None) => return Err(RelayError::TargetClosed),
			Err(err) => {
				debug!(target = "selrelay", tab = %handle, error = %err, "liveness query failed");
				return Err(RelayError::TargetClosed);
			}
		}

		self.tabs
			.activate(handle)
			.await
			.map_err(|err| RelayError::TargetUnreachable(err.message))?;

		let message = ExtensionMessage::DeliverText {
			text: format!("{}{}", self.prefix.borrow(), text),
		};
		let timeout = self.config.borrow().reply_timeout();
		let reply = self.send_with_timeout(handle, &message, timeout).await?;

		let outcome: DeliveryOutcome = serde_json::from_value(reply)
			.map_err(|err| RelayError::Unexpected(format!("malformed reply from target page: {err}")))?;
		match outcome {
			DeliveryOutcome::Delivered { message } if message.is_empty() => Ok(DELIVERED_FALLBACK.to_string()),
			DeliveryOutcome::Delivered { message } => Ok(message),
			DeliveryOutcome::Failed { message } => Err(RelayError::Automation(message)),
		}
	}

	async fn send_with_timeout(&self, handle: TabHandle, message: &ExtensionMessage, timeout: Duration) -> Result<Value> {
		let send = self.tabs.send_message(handle, message);
		let expiry = self.timer.sleep(timeout);

		match select(send, expiry).await {
			Either::Left((reply, _)) => reply.map_err(|err| RelayError::ConnectionLost(err.message)),
			Either::Right(((), _)) => Err(RelayError::Unresponsive {
				ms: timeout.as_millis() as u64,
			}),
		}
	}

	/// Makes `tab` the sole target.
	pub async fn designate(&self, tab: TabHandle) -> Ack {
		self.registry.set(tab).await;
		self.notify(Notification::info(DESIGNATED), Some(tab)).await;
		Ack::new(DESIGNATED)
	}

	pub async fn clear_target(&self) -> Ack {
		self.registry.clear().await;
		Ack::new(CLEARED)
	}

	/// Toolbar action: un-designates `tab` when it is the target, designates it otherwise.
	pub async fn toggle(&self, tab: TabHandle) -> Ack {
		if self.registry.is_current(tab) {
			let ack = self.clear_target().await;
			self.notify(Notification::info(CLEARED), Some(tab)).await;
			ack
		} else {
			self.designate(tab).await
		}
	}

	/// Tab-closed event.
	pub async fn on_tab_removed(&self, tab: TabHandle) {
		if self.registry.clear_if(tab).await {
			info!(target = "selrelay", %tab, "target tab closed");
		}
	}

	pub async fn update_prefix(&self, value: &str) {
		let prefix = match self.settings.save_prefix(value).await {
			Ok(prefix) => prefix,
			Err(err) => {
				warn!(target = "selrelay", error = %err, "failed to persist prefix");
				value.trim_start().to_string()
			}
		};
		let prefix = if prefix.trim().is_empty() {
			selrelay_protocol::DEFAULT_PREFIX.to_string()
		} else {
			prefix
		};
		info!(target = "selrelay", prefix = %prefix, "prefix updated");
		*self.prefix.borrow_mut() = prefix;
	}

	/// Shows `notification`; `false` when only the log received it.
	async fn notify(&self, notification: Notification, origin: Option<TabHandle>) -> bool {
		let mode = self.config.borrow().notification_mode;
		if mode == NotificationMode::System {
			match self.notifier.notify(notification.clone()).await {
				Ok(()) => return true,
				Err(err) => warn!(target = "selrelay", error = %err, "system notification failed"),
			}
		}

		if let Some(tab) = origin {
			match self.show_in_page(tab, notification.clone()).await {
				Ok(()) => return true,
				Err(err) => debug!(target = "selrelay", %tab, error = %err, "page could not show notification"),
			}
		}

		if let Err(err) = LogNotifier.notify(notification).await {
			debug!(target = "selrelay", error = %err, "notification dropped");
		}
		false
	}

	async fn show_in_page(&self, tab: TabHandle, notification: Notification) -> Result<()> {
		let message = ExtensionMessage::ShowNotification(notification);
		let timeout = self.config.borrow().reply_timeout();
		let reply = self.send_with_timeout(tab, &message, timeout).await?;
		let status: StatusReply = serde_json::from_value(reply)
			.map_err(|err| RelayError::Unexpected(format!("malformed reply from page: {err}")))?;
		if status.success {
			Ok(())
		} else {
			Err(RelayError::Unexpected("toast rejected".to_string()))
		}
	}
}
