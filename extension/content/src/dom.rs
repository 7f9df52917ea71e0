//! [`Page`] and [`Control`] over the live document.

use selrelay::{AutomationError, Control, ControlKind, Page};
use selrelay_ext_bridge::stringify_js_error;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, EventInit, HtmlElement, HtmlInputElement, HtmlTextAreaElement, MouseEvent, MouseEventInit};

pub struct WebPage {
	document: Document,
}

impl WebPage {
	pub fn new(document: Document) -> Self {
		Self { document }
	}
}

impl Page for WebPage {
	type Control = WebControl;

	fn query(&self, selector: &str) -> Option<WebControl> {
		self.document.query_selector(selector).ok().flatten().map(WebControl)
	}

	fn query_all(&self, selector: &str) -> Vec<WebControl> {
		let Ok(nodes) = self.document.query_selector_all(selector) else {
			return Vec::new();
		};
		(0..nodes.length())
			.filter_map(|i| nodes.get(i))
			.filter_map(|node| node.dyn_into::<Element>().ok())
			.map(WebControl)
			.collect()
	}

	fn title(&self) -> String {
		self.document.title()
	}

	fn url(&self) -> String {
		self.document
			.location()
			.and_then(|location| location.href().ok())
			.unwrap_or_default()
	}
}

pub struct WebControl(Element);

impl Control for WebControl {
	fn kind(&self) -> ControlKind {
		if self.0.is_instance_of::<HtmlTextAreaElement>() || self.0.is_instance_of::<HtmlInputElement>() {
			return ControlKind::FormField;
		}
		match self.0.dyn_ref::<HtmlElement>() {
			Some(element) if element.is_content_editable() => ControlKind::Editable,
			_ => ControlKind::Other,
		}
	}

	fn attribute(&self, name: &str) -> Option<String> {
		self.0.get_attribute(name)
	}

	fn text(&self) -> String {
		self.0.text_content().unwrap_or_default()
	}

	fn set_value(&self, text: &str) -> Result<(), AutomationError> {
		if let Some(textarea) = self.0.dyn_ref::<HtmlTextAreaElement>() {
			textarea.set_value(text);
		} else if let Some(input) = self.0.dyn_ref::<HtmlInputElement>() {
			input.set_value(text);
		} else {
			return Err(AutomationError::NotEditable);
		}
		Ok(())
	}

	fn replace_text(&self, text: &str) -> Result<(), AutomationError> {
		// Assigning textContent drops every child and inserts one text node;
		// markup in `text` stays literal.
		self.0.set_text_content(Some(text));
		Ok(())
	}

	fn dispatch_input(&self) -> Result<(), AutomationError> {
		let init = EventInit::new();
		init.set_bubbles(true);
		let event = Event::new_with_event_init_dict("input", &init).map_err(dom_error)?;
		self.0.dispatch_event(&event).map_err(dom_error)?;
		Ok(())
	}

	fn has_native_click(&self) -> bool {
		self.0.is_instance_of::<HtmlElement>()
	}

	fn click(&self) -> Result<(), AutomationError> {
		let element = self.0.dyn_ref::<HtmlElement>().ok_or(AutomationError::ClickRejected)?;
		element.click();
		Ok(())
	}

	fn dispatch_click(&self) -> Result<bool, AutomationError> {
		let init = MouseEventInit::new();
		init.set_bubbles(true);
		init.set_cancelable(true);
		init.set_view(web_sys::window().as_ref());
		let event = MouseEvent::new_with_mouse_event_init_dict("click", &init).map_err(dom_error)?;
		self.0.dispatch_event(&event).map_err(dom_error)
	}
}

fn dom_error(err: JsValue) -> AutomationError {
	AutomationError::Dom(stringify_js_error(&err))
}
