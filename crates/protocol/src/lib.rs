//! Wire types for the selrelay extension.
//!
//! Every context of the extension (background coordinator, ordinary pages, the
//! designated target page, the popup) exchanges JSON messages through the
//! browser's runtime messaging. This crate pins down their shape so both ends
//! agree on it.
//!
//! # Main Types
//!
//! - [`ExtensionMessage`] - Every request understood by some context
//! - [`DeliveryOutcome`] - Success/failure result of a relay or delivery
//! - [`Notification`] - A user-facing message routed to a notification sink
//! - [`TabHandle`] - Process-local browser tab identifier

mod message;
mod notification;
mod outcome;

pub mod keys;

pub use message::{Ack, ExtensionMessage, IsTargetReply, Reply, StatusReply, TargetReply};
pub use notification::{Level, Notification};
pub use outcome::DeliveryOutcome;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of one browser tab.
///
/// Only meaningful inside the running browser process; tab ids are reissued
/// after a browser restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabHandle(pub i32);

impl TabHandle {
	pub fn id(self) -> i32 {
		self.0
	}
}

impl fmt::Display for TabHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "tab {}", self.0)
	}
}

/// Prefix used until the user saves their own.
pub const DEFAULT_PREFIX: &str = "Translate the following into Chinese: ";

/// Title shown on notifications that do not carry their own.
pub const DEFAULT_TITLE: &str = "Selection Relay";

/// Context menu item relaying the current selection.
pub const MENU_RELAY_SELECTION: &str = "relay-selection";

/// Context menu item designating the clicked page as target.
pub const MENU_DESIGNATE_TARGET: &str = "designate-target";
