//! Test doubles for the platform and DOM seams.
//!
//! Every double is shared through [`Rc`] so a test can keep a handle for
//! assertions after passing it to the code under test.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use selrelay_protocol::{ExtensionMessage, Notification, TabHandle};
use serde_json::Value;

use crate::automator::{Control, ControlKind, Page};
use crate::error::{AutomationError, PlatformError};
use crate::platform::{Notifier, Storage, TabInfo, Tabs, Timer};

/// In-memory [`Storage`]; clone the [`Rc`] to simulate a process restart.
#[derive(Default)]
pub struct MemoryStorage {
	values: RefCell<HashMap<String, Value>>,
	fail_writes: Cell<bool>,
}

impl MemoryStorage {
	pub fn new() -> Rc<Self> {
		Rc::new(Self::default())
	}

	pub fn insert(&self, key: &str, value: Value) {
		self.values.borrow_mut().insert(key.to_string(), value);
	}

	pub fn value(&self, key: &str) -> Option<Value> {
		self.values.borrow().get(key).cloned()
	}

	pub fn fail_writes(&self, fail: bool) {
		self.fail_writes.set(fail);
	}
}

#[async_trait(?Send)]
impl Storage for MemoryStorage {
	async fn get(&self, key: &str) -> Result<Option<Value>, PlatformError> {
		Ok(self.value(key))
	}

	async fn set(&self, key: &str, value: Value) -> Result<(), PlatformError> {
		if self.fail_writes.get() {
			return Err(PlatformError::new("QUOTA_BYTES quota exceeded"));
		}
		self.insert(key, value);
		Ok(())
	}

	async fn remove(&self, key: &str) -> Result<(), PlatformError> {
		if self.fail_writes.get() {
			return Err(PlatformError::new("storage unavailable"));
		}
		self.values.borrow_mut().remove(key);
		Ok(())
	}
}

/// How a [`FakeTabs`] page script answers a message.
pub enum FakeReply {
	Value(Value),
	Error(String),
	Delayed(Duration, Value),
	/// Channel breaks after `Duration`.
	FailAfter(Duration, String),
	/// Never answers and never disconnects.
	Hang,
}

type ReplyFn = Box<dyn Fn(TabHandle, &ExtensionMessage) -> FakeReply>;

/// Scriptable [`Tabs`] that records every activation and message.
pub struct FakeTabs {
	open: RefCell<HashSet<TabHandle>>,
	query_error: Cell<bool>,
	activate_error: RefCell<Option<String>>,
	reply: RefCell<ReplyFn>,
	activated: RefCell<Vec<TabHandle>>,
	sent: RefCell<Vec<(TabHandle, ExtensionMessage)>>,
}

impl FakeTabs {
	/// Open tabs answer every message with a successful delivery.
	pub fn new(open: &[i32]) -> Rc<Self> {
		Rc::new(Self {
			open: RefCell::new(open.iter().copied().map(TabHandle).collect()),
			query_error: Cell::new(false),
			activate_error: RefCell::new(None),
			reply: RefCell::new(Box::new(|_, _| {
				FakeReply::Value(serde_json::json!({ "success": true, "message": "sent" }))
			})),
			activated: RefCell::new(Vec::new()),
			sent: RefCell::new(Vec::new()),
		})
	}

	pub fn close(&self, tab: i32) {
		self.open.borrow_mut().remove(&TabHandle(tab));
	}

	pub fn fail_queries(&self) {
		self.query_error.set(true);
	}

	pub fn fail_activation(&self, message: &str) {
		*self.activate_error.borrow_mut() = Some(message.to_string());
	}

	pub fn reply_with(&self, reply: impl Fn(TabHandle, &ExtensionMessage) -> FakeReply + 'static) {
		*self.reply.borrow_mut() = Box::new(reply);
	}

	pub fn activated(&self) -> Vec<TabHandle> {
		self.activated.borrow().clone()
	}

	pub fn sent(&self) -> Vec<(TabHandle, ExtensionMessage)> {
		self.sent.borrow().clone()
	}

	/// Notifications pages were asked to show as toasts, in order.
	pub fn toasts(&self) -> Vec<(TabHandle, Notification)> {
		self.sent
			.borrow()
			.iter()
			.filter_map(|(tab, msg)| match msg {
				ExtensionMessage::ShowNotification(notification) => Some((*tab, notification.clone())),
				_ => None,
			})
			.collect()
	}

	/// Texts delivered through `deliverText`, in order.
	pub fn delivered_texts(&self) -> Vec<String> {
		self.sent
			.borrow()
			.iter()
			.filter_map(|(_, msg)| match msg {
				ExtensionMessage::DeliverText { text } => Some(text.clone()),
				_ => None,
			})
			.collect()
	}
}

#[async_trait(?Send)]
impl Tabs for FakeTabs {
	async fn get(&self, tab: TabHandle) -> Result<Option<TabInfo>, PlatformError> {
		if self.query_error.get() {
			return Err(PlatformError::new(format!("No tab with id: {}.", tab.id())));
		}
		Ok(self.open.borrow().contains(&tab).then(|| TabInfo {
			handle: tab,
			url: Some("https://chat.example.com/".into()),
			title: Some("Assistant".into()),
		}))
	}

	async fn activate(&self, tab: TabHandle) -> Result<(), PlatformError> {
		if let Some(message) = self.activate_error.borrow().clone() {
			return Err(PlatformError::new(message));
		}
		self.activated.borrow_mut().push(tab);
		Ok(())
	}

	async fn send_message(&self, tab: TabHandle, message: &ExtensionMessage) -> Result<Value, PlatformError> {
		self.sent.borrow_mut().push((tab, message.clone()));
		let reply = (self.reply.borrow())(tab, message);
		match reply {
			FakeReply::Value(value) => Ok(value),
			FakeReply::Error(message) => Err(PlatformError::new(message)),
			FakeReply::Delayed(delay, value) => {
				tokio::time::sleep(delay).await;
				Ok(value)
			}
			FakeReply::FailAfter(delay, message) => {
				tokio::time::sleep(delay).await;
				Err(PlatformError::new(message))
			}
			FakeReply::Hang => std::future::pending().await,
		}
	}
}

/// [`Timer`] backed by the tokio test runtime.
pub struct TokioTimer;

impl TokioTimer {
	pub fn new() -> Rc<Self> {
		Rc::new(Self)
	}
}

#[async_trait(?Send)]
impl Timer for TokioTimer {
	async fn sleep(&self, duration: Duration) {
		tokio::time::sleep(duration).await;
	}
}

/// [`Notifier`] that remembers everything it was asked to show.
#[derive(Default)]
pub struct RecordingNotifier {
	seen: RefCell<Vec<Notification>>,
	fail: Cell<bool>,
}

impl RecordingNotifier {
	pub fn new() -> Rc<Self> {
		Rc::new(Self::default())
	}

	pub fn failing() -> Rc<Self> {
		let notifier = Self::default();
		notifier.fail.set(true);
		Rc::new(notifier)
	}

	pub fn seen(&self) -> Vec<Notification> {
		self.seen.borrow().clone()
	}

	pub fn messages(&self) -> Vec<String> {
		self.seen.borrow().iter().map(|n| n.message.clone()).collect()
	}
}

#[async_trait(?Send)]
impl Notifier for RecordingNotifier {
	async fn notify(&self, notification: Notification) -> Result<(), PlatformError> {
		self.seen.borrow_mut().push(notification);
		if self.fail.get() {
			return Err(PlatformError::new("notifications permission missing"));
		}
		Ok(())
	}
}

#[derive(Debug)]
struct ControlState {
	tag: String,
	kind: ControlKind,
	attributes: HashMap<String, String>,
	text: String,
	value: String,
	input_events: usize,
	clicks: usize,
	native_click: bool,
	accepts_click: bool,
}

/// One element of a [`FakePage`].
#[derive(Debug, Clone)]
pub struct FakeControl(Rc<RefCell<ControlState>>);

impl FakeControl {
	fn with(tag: &str, kind: ControlKind) -> Self {
		Self(Rc::new(RefCell::new(ControlState {
			tag: tag.to_string(),
			kind,
			attributes: HashMap::new(),
			text: String::new(),
			value: String::new(),
			input_events: 0,
			clicks: 0,
			native_click: true,
			accepts_click: true,
		})))
	}

	pub fn textarea() -> Self {
		Self::with("textarea", ControlKind::FormField)
	}

	pub fn editable() -> Self {
		Self::with("div", ControlKind::Editable)
	}

	pub fn button(label: &str) -> Self {
		let button = Self::with("button", ControlKind::Other);
		button.0.borrow_mut().text = label.to_string();
		button
	}

	pub fn attr(self, name: &str, value: &str) -> Self {
		self.0.borrow_mut().attributes.insert(name.to_string(), value.to_string());
		self
	}

	/// Element without a native `click()`; clicks go through event dispatch.
	pub fn without_native_click(self, accepts: bool) -> Self {
		{
			let mut state = self.0.borrow_mut();
			state.native_click = false;
			state.accepts_click = accepts;
		}
		self
	}

	pub fn is_button(&self) -> bool {
		self.0.borrow().tag == "button"
	}

	pub fn value(&self) -> String {
		self.0.borrow().value.clone()
	}

	pub fn text_content(&self) -> String {
		self.0.borrow().text.clone()
	}

	pub fn input_events(&self) -> usize {
		self.0.borrow().input_events
	}

	pub fn clicks(&self) -> usize {
		self.0.borrow().clicks
	}
}

impl Control for FakeControl {
	fn kind(&self) -> ControlKind {
		self.0.borrow().kind
	}

	fn attribute(&self, name: &str) -> Option<String> {
		self.0.borrow().attributes.get(name).cloned()
	}

	fn text(&self) -> String {
		self.0.borrow().text.clone()
	}

	fn set_value(&self, text: &str) -> Result<(), AutomationError> {
		self.0.borrow_mut().value = text.to_string();
		Ok(())
	}

	fn replace_text(&self, text: &str) -> Result<(), AutomationError> {
		self.0.borrow_mut().text = text.to_string();
		Ok(())
	}

	fn dispatch_input(&self) -> Result<(), AutomationError> {
		self.0.borrow_mut().input_events += 1;
		Ok(())
	}

	fn has_native_click(&self) -> bool {
		self.0.borrow().native_click
	}

	fn click(&self) -> Result<(), AutomationError> {
		self.0.borrow_mut().clicks += 1;
		Ok(())
	}

	fn dispatch_click(&self) -> Result<bool, AutomationError> {
		let mut state = self.0.borrow_mut();
		if state.accepts_click {
			state.clicks += 1;
		}
		Ok(state.accepts_click)
	}
}

/// Page whose selector matches are declared up front.
#[derive(Default)]
pub struct FakePage {
	matches: RefCell<Vec<(String, FakeControl)>>,
	title: String,
	url: String,
}

impl FakePage {
	pub fn new() -> Self {
		Self {
			url: "https://example.com/".into(),
			..Default::default()
		}
	}

	pub fn titled(title: &str, url: &str) -> Self {
		Self {
			matches: RefCell::default(),
			title: title.to_string(),
			url: url.to_string(),
		}
	}

	/// Registers `control` as a match for each of `selectors`; buttons also match `button`.
	pub fn add(&self, selectors: &[&str], control: &FakeControl) {
		let mut matches = self.matches.borrow_mut();
		for selector in selectors {
			matches.push((selector.to_string(), control.clone()));
		}
		if control.is_button() && !selectors.contains(&"button") {
			matches.push(("button".to_string(), control.clone()));
		}
	}
}

impl Page for FakePage {
	type Control = FakeControl;

	fn query(&self, selector: &str) -> Option<FakeControl> {
		self.query_all(selector).into_iter().next()
	}

	fn query_all(&self, selector: &str) -> Vec<FakeControl> {
		self.matches
			.borrow()
			.iter()
			.filter(|(s, _)| s == selector)
			.map(|(_, c)| c.clone())
			.collect()
	}

	fn title(&self) -> String {
		self.title.clone()
	}

	fn url(&self) -> String {
		self.url.clone()
	}
}
