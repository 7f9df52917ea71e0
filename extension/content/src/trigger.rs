//! The floating "Relay" button shown next to a fresh selection.

use std::cell::RefCell;
use std::rc::Rc;

use selrelay::{Notifier, SelectionWatcher, WatcherAction};
use selrelay_ext_bridge::send_runtime_message;
use selrelay_protocol::{DeliveryOutcome, ExtensionMessage, Notification};
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, EventTarget, HtmlElement, MouseEvent, Node, Window};

const TRIGGER_ID: &str = "selrelay-trigger";
const TRIGGER_LABEL: &str = "Relay";
const TRIGGER_STYLE: &str = "position:fixed;z-index:2147483646;display:none;background:#4caf50;color:#fff;\
	padding:5px 10px;border-radius:4px;cursor:pointer;font:12px/1.4 system-ui,sans-serif;\
	box-shadow:0 2px 5px rgba(0,0,0,.2);user-select:none;";

pub struct Trigger {
	element: HtmlElement,
	watcher: RefCell<SelectionWatcher>,
}

impl Trigger {
	/// Creates the hidden button and appends it to `<body>`.
	pub fn install(document: &Document) -> Result<Rc<Self>, JsValue> {
		let body = document.body().ok_or("document has no body")?;
		let element: HtmlElement = document.create_element("div")?.dyn_into()?;
		element.set_id(TRIGGER_ID);
		element.set_attribute("style", TRIGGER_STYLE)?;
		element.set_attribute("role", "button")?;
		element.set_text_content(Some(TRIGGER_LABEL));
		body.append_child(&element)?;

		Ok(Rc::new(Self {
			element,
			watcher: RefCell::new(SelectionWatcher::new()),
		}))
	}

	fn contains(&self, target: Option<EventTarget>) -> bool {
		target
			.and_then(|target| target.dyn_into::<Node>().ok())
			.is_some_and(|node| self.element.contains(Some(&node)))
	}

	fn apply(&self, action: WatcherAction) {
		let style = self.element.style();
		let result = match action {
			WatcherAction::Show { left, top } => style
				.set_property("left", &format!("{left}px"))
				.and_then(|()| style.set_property("top", &format!("{top}px")))
				.and_then(|()| style.set_property("display", "block")),
			WatcherAction::Hide => style.set_property("display", "none"),
			WatcherAction::Keep => Ok(()),
		};
		if let Err(err) = result {
			debug!(target = "selrelay", error = %selrelay_ext_bridge::stringify_js_error(&err), "failed to restyle trigger");
		}
	}
}

/// Wires pointer events to the watcher and the button to a relay request.
///
/// `notifier` reports local failures; `fallback` is used when the
/// coordinator itself cannot be reached.
pub fn watch(window: &Window, document: &Document, trigger: Rc<Trigger>, notifier: Rc<dyn Notifier>, fallback: Rc<dyn Notifier>) {
	{
		let trigger = trigger.clone();
		let window = window.clone();
		let on_mouseup = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
			if trigger.contains(event.target()) {
				return;
			}
			let selection = window
				.get_selection()
				.ok()
				.flatten()
				.map(|selection| String::from(selection.to_string()))
				.unwrap_or_default();
			let action = trigger
				.watcher
				.borrow_mut()
				.pointer_up(&selection, f64::from(event.client_x()), f64::from(event.client_y()));
			trigger.apply(action);
		});
		add_listener(document, "mouseup", &on_mouseup);
		on_mouseup.forget();
	}

	{
		let trigger = trigger.clone();
		let on_mousedown = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
			let on_trigger = trigger.contains(event.target());
			if on_trigger {
				// Pressing the button must not collapse the selection.
				event.prevent_default();
			}
			let action = trigger.watcher.borrow_mut().pointer_down(on_trigger);
			trigger.apply(action);
		});
		add_listener(document, "mousedown", &on_mousedown);
		on_mousedown.forget();
	}

	let on_click = {
		let trigger = trigger.clone();
		Closure::<dyn FnMut(MouseEvent)>::new(move |_event: MouseEvent| {
			let text = trigger.watcher.borrow().activate();
			trigger.apply(WatcherAction::Hide);

			let notifier = notifier.clone();
			let fallback = fallback.clone();
			spawn_local(async move {
				match text {
					Ok(text) => relay(text, fallback.as_ref()).await,
					Err(err) => {
						if let Err(err) = notifier.notify(Notification::error(err.to_string())).await {
							debug!(target = "selrelay", error = %err, "could not report empty selection");
						}
					}
				}
			});
		})
	};
	if let Err(err) = trigger
		.element
		.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
	{
		warn!(target = "selrelay", error = %selrelay_ext_bridge::stringify_js_error(&err), "failed to arm trigger");
	}
	on_click.forget();
}

/// Sends the selection to the coordinator, which reports the outcome itself:
/// as a system notification, or as a toast sent back to this page.
async fn relay(text: String, fallback: &dyn Notifier) {
	let request = ExtensionMessage::RelayText { text };
	match send_runtime_message::<DeliveryOutcome>(&request).await {
		Ok(outcome) => debug!(target = "selrelay", success = outcome.is_success(), "relay answered"),
		Err(err) => {
			warn!(target = "selrelay", error = %err, "coordinator unreachable");
			let notification = Notification::error(format!("could not reach the extension: {err}"));
			if let Err(err) = fallback.notify(notification).await {
				debug!(target = "selrelay", error = %err, "could not show fallback notification");
			}
		}
	}
}

fn add_listener(document: &Document, event: &str, listener: &Closure<dyn FnMut(MouseEvent)>) {
	if let Err(err) = document.add_event_listener_with_callback(event, listener.as_ref().unchecked_ref()) {
		warn!(target = "selrelay", event, error = %selrelay_ext_bridge::stringify_js_error(&err), "failed to add listener");
	}
}
