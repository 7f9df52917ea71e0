//! Page script injected into every page.
//!
//! On ordinary pages it only drives the selection trigger. On the designated
//! target page it also answers the coordinator's `deliverText` and
//! `probeIsTargetPage` requests through an [`Automator`] bound to the live
//! document.

mod dom;
mod toast;
mod trigger;

use std::rc::Rc;

use selrelay::{Automator, FallbackNotifier, LogNotifier, Notifier, RelayConfig, SettingsStore, Strategies};
use selrelay_ext_bridge::{ChromeStorage, JsTimer, post_runtime_message, send_runtime_message};
use selrelay_protocol::{DeliveryOutcome, ExtensionMessage, IsTargetReply, Reply, StatusReply, keys};
use tracing::{debug, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Window;

use crate::dom::WebPage;
use crate::toast::{PageNotifier, ToastNotifier};
use crate::trigger::Trigger;

#[wasm_bindgen(start)]
pub fn start() {
	selrelay_ext_bridge::install("info");

	let Some(window) = web_sys::window() else {
		return;
	};
	let Some(document) = window.document() else {
		return;
	};

	let config = RelayConfig::default();
	let toast = Rc::new(ToastNotifier::new(document.clone(), config.notification_ttl()));
	let page_notifier = Rc::new(PageNotifier::new(toast.clone()));
	let automator = Rc::new(Automator::new(
		WebPage::new(document.clone()),
		Rc::new(JsTimer),
		Rc::new(FallbackNotifier::new(toast.clone(), LogNotifier)),
	));

	register_message_listener(automator.clone(), toast.clone());

	match Trigger::install(&document) {
		Ok(trigger) => trigger::watch(
			&window,
			&document,
			trigger,
			Rc::new(FallbackNotifier::new(page_notifier.clone(), LogNotifier)),
			Rc::new(FallbackNotifier::new(toast.clone(), LogNotifier)),
		),
		Err(err) => warn!(target = "selrelay", error = %selrelay_ext_bridge::stringify_js_error(&err), "selection trigger unavailable"),
	}

	register_unload(&window);
	spawn_local(load_settings(automator, toast, page_notifier));
}

fn register_message_listener(automator: Rc<Automator<WebPage>>, toast: Rc<ToastNotifier>) {
	selrelay_ext_bridge::listen(move |message, _sender, respond| match message {
		ExtensionMessage::DeliverText { text } => {
			let automator = automator.clone();
			spawn_local(async move {
				let outcome = automator.deliver(&text).await;
				respond(Reply::Outcome(outcome));
			});
		}
		ExtensionMessage::ProbeIsTargetPage { handle } => {
			respond(Reply::IsTarget(IsTargetReply {
				is_target: automator.probe(handle),
			}));
		}
		ExtensionMessage::ShowNotification(notification) => {
			let toast = toast.clone();
			spawn_local(async move {
				let success = match toast.notify(notification).await {
					Ok(()) => true,
					Err(err) => {
						debug!(target = "selrelay", error = %err, "toast failed");
						false
					}
				};
				respond(Reply::Status(StatusReply {
					success,
					tab_handle: None,
				}));
			});
		}
		other => {
			debug!(target = "selrelay", action = other.action(), "coordinator-bound action sent to page");
			respond(Reply::Outcome(DeliveryOutcome::failed(format!(
				"unsupported action: {}",
				other.action()
			))));
		}
	});
}

/// Loads persisted tunables, then announces the page to the coordinator.
async fn load_settings(automator: Rc<Automator<WebPage>>, toast: Rc<ToastNotifier>, page_notifier: Rc<PageNotifier>) {
	let settings = SettingsStore::new(Rc::new(ChromeStorage));
	let config = settings.load_config().await;
	selrelay_ext_bridge::set_log_level(&config.log_level);
	toast.set_ttl(config.notification_ttl());
	page_notifier.set_mode(config.notification_mode);
	automator.set_submit_delay(config.submit_delay());
	automator.set_strategies(settings.load_or_default::<Strategies>(keys::AUTOMATION_STRATEGIES).await);

	match send_runtime_message::<StatusReply>(&ExtensionMessage::ContentScriptReady).await {
		Ok(StatusReply {
			tab_handle: Some(handle), ..
		}) => {
			automator.set_own_handle(handle);
			info!(target = "selrelay", tab = %handle, "page script ready");
		}
		Ok(_) => debug!(target = "selrelay", "coordinator did not report our tab"),
		Err(err) => debug!(target = "selrelay", error = %err, "coordinator not reachable yet"),
	}
}

fn register_unload(window: &Window) {
	let on_unload = Closure::<dyn FnMut()>::new(|| {
		if let Err(err) = post_runtime_message(&ExtensionMessage::ContentScriptUnloading) {
			debug!(target = "selrelay", error = %err, "unload notice not sent");
		}
	});
	if let Err(err) = window.add_event_listener_with_callback("beforeunload", on_unload.as_ref().unchecked_ref()) {
		warn!(target = "selrelay", error = %selrelay_ext_bridge::stringify_js_error(&err), "failed to watch unload");
	}
	on_unload.forget();
}
