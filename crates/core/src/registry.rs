//! The single designated target tab, mirrored to persisted storage.

use std::cell::Cell;
use std::rc::Rc;

use selrelay_protocol::{TabHandle, keys};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::platform::Storage;

/// Owner of the target reference.
///
/// Holds at most one [`TabHandle`]. Every mutation is written through to
/// [`Storage`] under [`keys::TARGET_HANDLE`] so a restarted coordinator can
/// [`hydrate`](Self::hydrate) it. Until hydration completes the registry reads
/// as empty.
///
/// Persistence failures are logged and do not roll back the in-memory value.
pub struct TargetRegistry {
	storage: Rc<dyn Storage>,
	current: Cell<Option<TabHandle>>,
	/// Set once anything wrote the registry in this process.
	written: Cell<bool>,
}

impl TargetRegistry {
	pub fn new(storage: Rc<dyn Storage>) -> Self {
		Self {
			storage,
			current: Cell::new(None),
			written: Cell::new(false),
		}
	}

	/// Loads the persisted target.
	///
	/// A value set or cleared while the read was in flight takes precedence.
	pub async fn hydrate(&self) {
		let stored = match self.storage.get(keys::TARGET_HANDLE).await {
			Ok(value) => value,
			Err(err) => {
				warn!(target = "selrelay", error = %err, "failed to read persisted target");
				return;
			}
		};

		if self.written.get() {
			debug!(target = "selrelay", "registry written during hydration, keeping in-memory target");
			return;
		}

		let handle = match stored {
			None | Some(Value::Null) => None,
			Some(value) => match serde_json::from_value::<TabHandle>(value) {
				Ok(handle) => Some(handle),
				Err(err) => {
					warn!(target = "selrelay", error = %err, "ignoring malformed persisted target");
					None
				}
			},
		};

		if let Some(handle) = handle {
			info!(target = "selrelay", %handle, "restored relay target");
		}
		self.current.set(handle);
	}

	pub fn get(&self) -> Option<TabHandle> {
		self.current.get()
	}

	pub fn is_current(&self, tab: TabHandle) -> bool {
		self.current.get() == Some(tab)
	}

	/// Makes `tab` the target, replacing any previous one.
	pub async fn set(&self, tab: TabHandle) {
		self.written.set(true);
		let previous = self.current.replace(Some(tab));
		info!(target = "selrelay", %tab, previous = ?previous, "relay target set");

		if let Err(err) = self.storage.set(keys::TARGET_HANDLE, Value::from(tab.id())).await {
			warn!(target = "selrelay", error = %err, "failed to persist relay target");
		}
	}

	pub async fn clear(&self) {
		self.written.set(true);
		if let Some(previous) = self.current.take() {
			info!(target = "selrelay", tab = %previous, "relay target cleared");
		}

		if let Err(err) = self.storage.remove(keys::TARGET_HANDLE).await {
			warn!(target = "selrelay", error = %err, "failed to remove persisted relay target");
		}
	}

	/// Clears the target only while it is still `tab`.
	///
	/// Returns whether anything was cleared.
	pub async fn clear_if(&self, tab: TabHandle) -> bool {
		if !self.is_current(tab) {
			return false;
		}
		self.clear().await;
		true
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::MemoryStorage;

	#[tokio::test]
	async fn set_replaces_previous_target_and_persists() {
		let storage = MemoryStorage::new();
		let registry = TargetRegistry::new(storage.clone());

		registry.set(TabHandle(1)).await;
		registry.set(TabHandle(2)).await;

		assert_eq!(registry.get(), Some(TabHandle(2)));
		assert!(!registry.is_current(TabHandle(1)));
		assert_eq!(storage.value(keys::TARGET_HANDLE), Some(Value::from(2)));
	}

	#[tokio::test]
	async fn clear_removes_persisted_value() {
		let storage = MemoryStorage::new();
		let registry = TargetRegistry::new(storage.clone());

		registry.set(TabHandle(5)).await;
		registry.clear().await;

		assert_eq!(registry.get(), None);
		assert_eq!(storage.value(keys::TARGET_HANDLE), None);
	}

	#[tokio::test]
	async fn reads_empty_before_hydration() {
		let storage = MemoryStorage::new();
		storage.insert(keys::TARGET_HANDLE, Value::from(9));

		let registry = TargetRegistry::new(storage.clone());
		assert_eq!(registry.get(), None);

		registry.hydrate().await;
		assert_eq!(registry.get(), Some(TabHandle(9)));
	}

	#[tokio::test]
	async fn hydration_survives_restart() {
		let storage = MemoryStorage::new();
		{
			let registry = TargetRegistry::new(storage.clone());
			registry.set(TabHandle(12)).await;
		}

		let restarted = TargetRegistry::new(storage.clone());
		restarted.hydrate().await;
		assert!(restarted.is_current(TabHandle(12)));
	}

	#[tokio::test]
	async fn write_before_hydration_wins() {
		let storage = MemoryStorage::new();
		storage.insert(keys::TARGET_HANDLE, Value::from(3));

		let registry = TargetRegistry::new(storage.clone());
		registry.set(TabHandle(4)).await;
		registry.hydrate().await;

		assert_eq!(registry.get(), Some(TabHandle(4)));
	}

	#[tokio::test]
	async fn malformed_persisted_value_is_ignored() {
		let storage = MemoryStorage::new();
		storage.insert(keys::TARGET_HANDLE, Value::from("not a tab"));

		let registry = TargetRegistry::new(storage.clone());
		registry.hydrate().await;

		assert_eq!(registry.get(), None);
	}

	#[tokio::test]
	async fn clear_if_ignores_other_tabs() {
		let storage = MemoryStorage::new();
		let registry = TargetRegistry::new(storage.clone());
		registry.set(TabHandle(7)).await;

		assert!(!registry.clear_if(TabHandle(8)).await);
		assert_eq!(registry.get(), Some(TabHandle(7)));

		assert!(registry.clear_if(TabHandle(7)).await);
		assert_eq!(registry.get(), None);
	}

	#[tokio::test]
	async fn storage_failure_keeps_in_memory_value() {
		let storage = MemoryStorage::new();
		storage.fail_writes(true);
		let registry = TargetRegistry::new(storage.clone());

		registry.set(TabHandle(1)).await;

		assert_eq!(registry.get(), Some(TabHandle(1)));
		assert_eq!(storage.value(keys::TARGET_HANDLE), None);
	}
}
