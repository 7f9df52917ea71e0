//! Persisted user settings: the relay prefix and [`RelayConfig`] tunables.

use std::rc::Rc;
use std::time::Duration;

use selrelay_protocol::{DEFAULT_PREFIX, keys};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::error::PlatformError;
use crate::platform::Storage;

/// Where the page scripts show notifications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationMode {
	/// System notification through the coordinator, toast as fallback.
	#[default]
	System,
	/// In-page toast only.
	Page,
}

/// Tunables stored under [`keys::RELAY_CONFIG`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RelayConfig {
	/// Upper bound on waiting for the target page's reply.
	pub reply_timeout_ms: u64,
	/// Settle delay between text injection and pressing send.
	pub submit_delay_ms: u64,
	pub notification_mode: NotificationMode,
	/// How long notifications stay visible.
	pub notification_ttl_ms: u64,
	/// `tracing` filter directive for the extension consoles.
	pub log_level: String,
}

impl Default for RelayConfig {
	fn default() -> Self {
		Self {
			reply_timeout_ms: 10_000,
			submit_delay_ms: 300,
			notification_mode: NotificationMode::System,
			notification_ttl_ms: 3_000,
			log_level: "info".to_string(),
		}
	}
}

impl RelayConfig {
	pub fn reply_timeout(&self) -> Duration {
		Duration::from_millis(self.reply_timeout_ms)
	}

	pub fn submit_delay(&self) -> Duration {
		Duration::from_millis(self.submit_delay_ms)
	}

	pub fn notification_ttl(&self) -> Duration {
		Duration::from_millis(self.notification_ttl_ms)
	}
}

/// Reads and writes settings in [`Storage`].
///
/// Missing or malformed values load as defaults.
#[derive(Clone)]
pub struct SettingsStore {
	storage: Rc<dyn Storage>,
}

impl SettingsStore {
	pub fn new(storage: Rc<dyn Storage>) -> Self {
		Self { storage }
	}

	pub async fn load_prefix(&self) -> String {
		match self.storage.get(keys::PREFIX_TEXT).await {
			Ok(Some(Value::String(prefix))) if !prefix.is_empty() => prefix,
			Ok(_) => DEFAULT_PREFIX.to_string(),
			Err(err) => {
				warn!(target = "selrelay", error = %err, "failed to read prefix, using default");
				DEFAULT_PREFIX.to_string()
			}
		}
	}

	/// Saves `value` without leading whitespace; blank input resets to
	/// [`DEFAULT_PREFIX`]. Trailing whitespace is kept as the separator
	/// between prefix and text.
	///
	/// Returns the prefix that was stored.
	pub async fn save_prefix(&self, value: &str) -> Result<String, PlatformError> {
		let prefix = normalize_prefix(value);
		self.storage.set(keys::PREFIX_TEXT, Value::String(prefix.clone())).await?;
		Ok(prefix)
	}

	pub async fn load_config(&self) -> RelayConfig {
		self.load_or_default(keys::RELAY_CONFIG).await
	}

	/// Loads `key` as `T`, falling back to `T::default()`.
	pub async fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
		match self.storage.get(key).await {
			Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|err| {
				warn!(target = "selrelay", key, error = %err, "malformed stored setting, using default");
				T::default()
			}),
			Ok(None) => T::default(),
			Err(err) => {
				warn!(target = "selrelay", key, error = %err, "failed to read setting, using default");
				T::default()
			}
		}
	}

	pub async fn save_selection(&self, text: &str) -> Result<(), PlatformError> {
		self.storage.set(keys::SELECTED_TEXT, Value::String(text.to_string())).await
	}
}

fn normalize_prefix(value: &str) -> String {
	if value.trim().is_empty() {
		DEFAULT_PREFIX.to_string()
	} else {
		value.trim_start().to_string()
	}
}
