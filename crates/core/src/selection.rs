//! Selection tracking for ordinary pages.
//!
//! [`SelectionWatcher`] is the DOM-free state machine behind the floating
//! trigger button: the page script feeds it pointer events and applies the
//! returned [`WatcherAction`]. The text relayed is always the text selected at
//! the last pointer release.

use crate::error::RelayError;

/// Distance between the pointer and the trigger button, in CSS pixels.
pub const AFFORDANCE_OFFSET: f64 = 10.0;

/// What the page script should do with the trigger button.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WatcherAction {
	Show { left: f64, top: f64 },
	Hide,
	Keep,
}

#[derive(Debug, Default)]
pub struct SelectionWatcher {
	last_selected: Option<String>,
	visible: bool,
}

impl SelectionWatcher {
	pub fn new() -> Self {
		Self::default()
	}

	/// Pointer released at viewport position (`x`, `y`) with `selection` as the
	/// document's current selection.
	pub fn pointer_up(&mut self, selection: &str, x: f64, y: f64) -> WatcherAction {
		let trimmed = selection.trim();
		if trimmed.is_empty() {
			self.last_selected = None;
			self.visible = false;
			return WatcherAction::Hide;
		}

		self.last_selected = Some(trimmed.to_string());
		self.visible = true;
		WatcherAction::Show {
			left: x + AFFORDANCE_OFFSET,
			top: y + AFFORDANCE_OFFSET,
		}
	}

	/// Pointer pressed; presses on the trigger button itself keep it open.
	pub fn pointer_down(&mut self, on_affordance: bool) -> WatcherAction {
		if on_affordance || !self.visible {
			return WatcherAction::Keep;
		}
		self.visible = false;
		WatcherAction::Hide
	}

	/// Text to relay when the trigger button is activated.
	pub fn activate(&self) -> Result<String, RelayError> {
		self.last_selected.clone().ok_or(RelayError::EmptyText)
	}

	pub fn last_selected(&self) -> Option<&str> {
		self.last_selected.as_deref()
	}

	pub fn is_visible(&self) -> bool {
		self.visible
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn release_with_selection_shows_trigger_near_pointer() {
		let mut watcher = SelectionWatcher::new();
		let action = watcher.pointer_up("  hello world \n", 100.0, 40.0);

		assert_eq!(action, WatcherAction::Show { left: 110.0, top: 50.0 });
		assert_eq!(watcher.last_selected(), Some("hello world"));
		assert!(watcher.is_visible());
	}

	#[test]
	fn release_without_selection_hides_and_forgets() {
		let mut watcher = SelectionWatcher::new();
		watcher.pointer_up("hello", 0.0, 0.0);

		assert_eq!(watcher.pointer_up("   ", 5.0, 5.0), WatcherAction::Hide);
		assert_eq!(watcher.activate(), Err(RelayError::EmptyText));
	}

	#[test]
	fn press_outside_hides_press_inside_keeps() {
		let mut watcher = SelectionWatcher::new();
		watcher.pointer_up("hello", 0.0, 0.0);

		assert_eq!(watcher.pointer_down(true), WatcherAction::Keep);
		assert!(watcher.is_visible());

		assert_eq!(watcher.pointer_down(false), WatcherAction::Hide);
		assert!(!watcher.is_visible());
	}

	#[test]
	fn activation_uses_latest_selection() {
		let mut watcher = SelectionWatcher::new();
		watcher.pointer_up("first", 0.0, 0.0);
		watcher.pointer_up("second", 0.0, 0.0);

		assert_eq!(watcher.activate().unwrap(), "second");
	}
}
