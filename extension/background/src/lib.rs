//! Background service worker: hosts the relay [`Coordinator`].
//!
//! Manifest V3 only delivers events to listeners registered during the
//! worker's first turn, so [`start`] registers everything synchronously and
//! loads persisted state afterwards. Handlers wait for that load before
//! touching the coordinator, which keeps a worker woken by a message from
//! answering "no target" while the registry is still being read.

mod chrome;
mod notifications;
mod tabs;

use std::rc::Rc;

use futures_util::FutureExt;
use futures_util::future::{LocalBoxFuture, Shared};
use js_sys::{Object, Reflect};
use selrelay::Coordinator;
use selrelay_ext_bridge::{ChromeStorage, JsTimer, stringify_js_error};
use selrelay_protocol::{ExtensionMessage, MENU_DESIGNATE_TARGET, MENU_RELAY_SELECTION, Reply, TabHandle};
use tracing::{debug, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};

use crate::chrome::{
	action_on_clicked_add_listener, action_set_badge_text, action_set_title, context_menus_create,
	context_menus_on_clicked_add_listener, context_menus_remove_all, runtime_on_installed_add_listener,
	tabs_on_removed_add_listener,
};
use crate::notifications::ChromeNotifier;
use crate::tabs::ChromeTabs;

type Ready = Shared<LocalBoxFuture<'static, ()>>;

/// Coordinator plus the one-shot load every handler awaits.
#[derive(Clone)]
struct Worker {
	coordinator: Rc<Coordinator>,
	ready: Ready,
}

impl Worker {
	async fn coordinator(&self) -> Rc<Coordinator> {
		self.ready.clone().await;
		self.coordinator.clone()
	}
}

#[wasm_bindgen(start)]
pub fn start() {
	selrelay_ext_bridge::install("info");

	let notifier = Rc::new(ChromeNotifier::new(selrelay::RelayConfig::default().notification_ttl()));
	let coordinator = Rc::new(Coordinator::new(
		Rc::new(ChromeStorage),
		Rc::new(ChromeTabs),
		Rc::new(JsTimer),
		notifier.clone(),
	));

	let ready: Ready = {
		let coordinator = coordinator.clone();
		async move {
			coordinator.init().await;
			let config = coordinator.config();
			notifier.set_ttl(config.notification_ttl());
			selrelay_ext_bridge::set_log_level(&config.log_level);
			refresh_action(coordinator.target());
			info!(target = "selrelay", target_tab = ?coordinator.target(), "coordinator started");
		}
		.boxed_local()
		.shared()
	};
	let worker = Worker { coordinator, ready };

	register_message_listener(worker.clone());
	register_tab_listener(worker.clone());
	register_context_menus(worker.clone());
	register_action(worker.clone());

	spawn_local(async move {
		worker.ready.clone().await;
	});
}

fn register_message_listener(worker: Worker) {
	selrelay_ext_bridge::listen(move |message, sender, respond| {
		let worker = worker.clone();
		spawn_local(async move {
			let coordinator = worker.coordinator().await;
			coordinator.handle(message, sender, respond).await;
			refresh_action(coordinator.target());
		});
	});
}

fn register_tab_listener(worker: Worker) {
	let on_removed = Closure::<dyn FnMut(JsValue, JsValue)>::new(move |tab_id: JsValue, _info: JsValue| {
		let Some(id) = tab_id.as_f64() else {
			return;
		};
		let worker = worker.clone();
		spawn_local(async move {
			let coordinator = worker.coordinator().await;
			coordinator.on_tab_removed(TabHandle(id as i32)).await;
			refresh_action(coordinator.target());
		});
	});
	tabs_on_removed_add_listener(&on_removed);
	on_removed.forget();
}

fn register_context_menus(worker: Worker) {
	let on_installed = Closure::<dyn FnMut(JsValue)>::new(|_details: JsValue| {
		spawn_local(async {
			if let Err(err) = create_context_menus().await {
				warn!(target = "selrelay", error = %stringify_js_error(&err), "failed to create context menus");
			}
		});
	});
	runtime_on_installed_add_listener(&on_installed);
	on_installed.forget();

	let on_clicked = Closure::<dyn FnMut(JsValue, JsValue)>::new(move |info: JsValue, tab: JsValue| {
		let menu_item = js_prop(&info, "menuItemId").as_string().unwrap_or_default();
		let selection = js_prop(&info, "selectionText").as_string();
		let tab = js_prop(&tab, "id").as_f64().map(|id| TabHandle(id as i32));

		let worker = worker.clone();
		spawn_local(async move {
			let coordinator = worker.coordinator().await;
			match (menu_item.as_str(), selection, tab) {
				(MENU_RELAY_SELECTION, Some(text), _) => {
					let remember = ExtensionMessage::RememberSelection { text: text.clone() };
					coordinator.handle(remember, tab, Box::new(|_: Reply| {})).await;
					coordinator.relay(&text, tab, None).await;
				}
				(MENU_DESIGNATE_TARGET, _, Some(tab)) => {
					coordinator.designate(tab).await;
				}
				(item, _, _) => debug!(target = "selrelay", item, "ignoring context menu click"),
			}
			refresh_action(coordinator.target());
		});
	});
	context_menus_on_clicked_add_listener(&on_clicked);
	on_clicked.forget();
}

async fn create_context_menus() -> Result<(), JsValue> {
	JsFuture::from(context_menus_remove_all()?).await?;
	context_menus_create(&menu_item(MENU_RELAY_SELECTION, "Relay selection to target page", "selection")?)?;
	context_menus_create(&menu_item(MENU_DESIGNATE_TARGET, "Use this page as relay target", "all")?)?;
	Ok(())
}

fn menu_item(id: &str, title: &str, context: &str) -> Result<JsValue, JsValue> {
	let obj = Object::new();
	Reflect::set(&obj, &JsValue::from_str("id"), &JsValue::from_str(id))?;
	Reflect::set(&obj, &JsValue::from_str("title"), &JsValue::from_str(title))?;
	let contexts = js_sys::Array::of1(&JsValue::from_str(context));
	Reflect::set(&obj, &JsValue::from_str("contexts"), &contexts)?;
	Ok(obj.into())
}

fn register_action(worker: Worker) {
	let on_clicked = Closure::<dyn FnMut(JsValue)>::new(move |tab: JsValue| {
		let Some(id) = js_prop(&tab, "id").as_f64() else {
			return;
		};
		let worker = worker.clone();
		spawn_local(async move {
			let coordinator = worker.coordinator().await;
			coordinator.toggle(TabHandle(id as i32)).await;
			refresh_action(coordinator.target());
		});
	});
	action_on_clicked_add_listener(&on_clicked);
	on_clicked.forget();
}

/// Mirrors the current target in the toolbar button's title and badge.
fn refresh_action(target: Option<TabHandle>) {
	let (title, badge) = match target {
		Some(tab) => (format!("Relay target: {tab}"), "ON"),
		None => ("No relay target".to_string(), ""),
	};

	match action_details("title", &title) {
		Ok(details) => action_set_title(&details),
		Err(err) => debug!(target = "selrelay", error = %stringify_js_error(&err), "failed to build action title"),
	}
	match action_details("text", badge) {
		Ok(details) => action_set_badge_text(&details),
		Err(err) => debug!(target = "selrelay", error = %stringify_js_error(&err), "failed to build action badge"),
	}
}

fn action_details(key: &str, value: &str) -> Result<JsValue, JsValue> {
	let obj = Object::new();
	Reflect::set(&obj, &JsValue::from_str(key), &JsValue::from_str(value))?;
	Ok(obj.into())
}

/// `obj[name]`, `undefined` when missing or when `obj` is not an object.
pub(crate) fn js_prop(obj: &JsValue, name: &str) -> JsValue {
	Reflect::get(obj, &JsValue::from_str(name)).unwrap_or(JsValue::UNDEFINED)
}
