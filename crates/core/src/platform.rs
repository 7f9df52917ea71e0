//! Host seams the core is written against.
//!
//! The extension crates implement these over `chrome.*` APIs; tests use the
//! doubles in `testing`. All futures are `!Send`: every context runs on a
//! single-threaded event loop.

use std::time::Duration;

use async_trait::async_trait;
use selrelay_protocol::{ExtensionMessage, Notification, TabHandle};
use serde_json::Value;

use crate::error::PlatformError;

/// Persisted key/value storage that outlives the coordinator process.
#[async_trait(?Send)]
pub trait Storage {
	/// Returns the stored value for `key`, [`None`] when absent.
	async fn get(&self, key: &str) -> Result<Option<Value>, PlatformError>;

	async fn set(&self, key: &str, value: Value) -> Result<(), PlatformError>;

	async fn remove(&self, key: &str) -> Result<(), PlatformError>;
}

/// What the browser reports about a live tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabInfo {
	pub handle: TabHandle,
	pub url: Option<String>,
	pub title: Option<String>,
}

/// Browser tab access from the coordinator.
#[async_trait(?Send)]
pub trait Tabs {
	/// Liveness query. `Ok(None)` and `Err(_)` both mean the tab cannot be used.
	async fn get(&self, tab: TabHandle) -> Result<Option<TabInfo>, PlatformError>;

	/// Brings `tab` to the foreground.
	async fn activate(&self, tab: TabHandle) -> Result<(), PlatformError>;

	/// Sends `message` to the page script in `tab` and waits for its reply.
	///
	/// Errors when nothing in the tab listens or the channel closes before a
	/// reply arrives.
	async fn send_message(&self, tab: TabHandle, message: &ExtensionMessage) -> Result<Value, PlatformError>;
}

/// Timer driven by the host event loop.
#[async_trait(?Send)]
pub trait Timer {
	async fn sleep(&self, duration: Duration);
}

/// Notification sink.
#[async_trait(?Send)]
pub trait Notifier {
	async fn notify(&self, notification: Notification) -> Result<(), PlatformError>;
}
