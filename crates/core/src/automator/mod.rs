//! Fills and submits the assistant page's input box.
//!
//! The host page's markup is unknown and changes between versions, so the
//! [`Automator`] works through two layers:
//!
//! * [`Page`] / [`Control`]: the minimal DOM surface it needs, implemented
//!   over `web-sys` in the page script;
//! * [`Strategies`]: ordered locator tables deciding which element is the
//!   input control and which is the submit control.

mod strategy;

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use futures_util::lock::Mutex;
use selrelay_protocol::{DeliveryOutcome, Notification, TabHandle};
use tracing::{debug, info, warn};

use crate::error::AutomationError;
use crate::platform::{Notifier, Timer};
pub use strategy::{Locator, SkipRule, Strategies};

const DELIVERED_MESSAGE: &str = "text sent to the assistant";
const DEFAULT_SUBMIT_DELAY: Duration = Duration::from_millis(300);

/// How text gets into a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
	/// Generic `contenteditable` element.
	Editable,
	/// `<textarea>` or `<input>`.
	FormField,
	/// Anything else (buttons, plain containers).
	Other,
}

/// Read-only view of the document the automator searches.
pub trait Page {
	type Control: Control;

	/// First element matching `selector`. Invalid selectors match nothing.
	fn query(&self, selector: &str) -> Option<Self::Control>;

	/// All elements matching `selector`, in document order.
	fn query_all(&self, selector: &str) -> Vec<Self::Control>;

	fn title(&self) -> String;

	fn url(&self) -> String;
}

/// One element of the host page.
pub trait Control {
	fn kind(&self) -> ControlKind;

	fn attribute(&self, name: &str) -> Option<String>;

	/// Visible text content.
	fn text(&self) -> String;

	/// Sets a form control's value.
	fn set_value(&self, text: &str) -> Result<(), AutomationError>;

	/// Replaces all children with one literal text node.
	fn replace_text(&self, text: &str) -> Result<(), AutomationError>;

	/// Fires a bubbling `input` event so the host page notices the change.
	fn dispatch_input(&self) -> Result<(), AutomationError>;

	fn has_native_click(&self) -> bool;

	fn click(&self) -> Result<(), AutomationError>;

	/// Dispatches a synthetic click; `false` when the page cancelled it.
	fn dispatch_click(&self) -> Result<bool, AutomationError>;
}

/// Automation running inside the target page.
///
/// Deliveries are serialized: a second `deliver` waits until the first has
/// pressed send, so two texts never interleave in the shared input control.
pub struct Automator<P: Page> {
	page: P,
	strategies: RefCell<Strategies>,
	timer: Rc<dyn Timer>,
	notifier: Rc<dyn Notifier>,
	submit_delay: Cell<Duration>,
	own_handle: Cell<Option<TabHandle>>,
	turn: Mutex<()>,
}

impl<P: Page> Automator<P> {
	pub fn new(page: P, timer: Rc<dyn Timer>, notifier: Rc<dyn Notifier>) -> Self {
		Self {
			page,
			strategies: RefCell::new(Strategies::default()),
			timer,
			notifier,
			submit_delay: Cell::new(DEFAULT_SUBMIT_DELAY),
			own_handle: Cell::new(None),
			turn: Mutex::new(()),
		}
	}

	pub fn page(&self) -> &P {
		&self.page
	}

	pub fn set_strategies(&self, strategies: Strategies) {
		*self.strategies.borrow_mut() = strategies;
	}

	pub fn set_submit_delay(&self, delay: Duration) {
		self.submit_delay.set(delay);
	}

	/// Records this page's own tab handle, as reported by the coordinator.
	pub fn set_own_handle(&self, handle: TabHandle) {
		self.own_handle.set(Some(handle));
	}

	pub fn own_handle(&self) -> Option<TabHandle> {
		self.own_handle.get()
	}

	/// Injects `text` into the input control and presses send.
	///
	/// The outcome is also shown through the notifier.
	pub async fn deliver(&self, text: &str) -> DeliveryOutcome {
		let _turn = self.turn.lock().await;

		let outcome = match self.fill_and_submit(text).await {
			Ok(()) => {
				info!(target = "selrelay", chars = text.chars().count(), "delivered text to host page");
				DeliveryOutcome::delivered(DELIVERED_MESSAGE)
			}
			Err(err) => {
				warn!(target = "selrelay", error = %err, "automation failed");
				DeliveryOutcome::failed(err.to_string())
			}
		};

		let notification = if outcome.is_success() {
			Notification::info(outcome.message())
		} else {
			Notification::error(outcome.message())
		};
		if let Err(err) = self.notifier.notify(notification).await {
			debug!(target = "selrelay", error = %err, "could not show automation outcome");
		}

		outcome
	}

	async fn fill_and_submit(&self, text: &str) -> Result<(), AutomationError> {
		let submit = {
			let strategies = self.strategies.borrow();
			let input = strategies.find_input(&self.page).ok_or(AutomationError::InputNotFound)?;
			inject(&input, text)?;
			strategies.find_submit(&self.page).ok_or(AutomationError::SubmitNotFound)?
		};

		self.timer.sleep(self.submit_delay.get()).await;
		press(&submit)
	}

	/// Whether this page is the designated target.
	///
	/// With both the caller's handle and this page's own handle known, the
	/// answer is handle equality. Otherwise the page falls back to the content
	/// heuristic of [`Strategies::looks_like_target`].
	pub fn probe(&self, handle: Option<TabHandle>) -> bool {
		match (handle, self.own_handle.get()) {
			(Some(handle), Some(own)) => handle == own,
			_ => self.strategies.borrow().looks_like_target(&self.page),
		}
	}
}

/// Writes `text` and signals the change in the same turn.
fn inject<C: Control>(control: &C, text: &str) -> Result<(), AutomationError> {
	match control.kind() {
		ControlKind::Editable => control.replace_text(text)?,
		ControlKind::FormField => control.set_value(text)?,
		ControlKind::Other => return Err(AutomationError::NotEditable),
	}
	control.dispatch_input()
}

fn press<C: Control>(control: &C) -> Result<(), AutomationError> {
	if control.has_native_click() {
		return control.click();
	}
	if control.dispatch_click()? {
		Ok(())
	} else {
		Err(AutomationError::ClickRejected)
	}
}
