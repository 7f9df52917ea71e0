//! Runtime messages and their replies.
//!
//! Requests are internally tagged by an `action` field:
//!
//! ```text
//! {"action":"relayText","text":"hello"}
//! {"action":"deliverText","text":"Translate the following into Chinese: hello"}
//! {"action":"getTarget"}
//! ```
//!
//! Replies are plain objects whose shape depends on the request (see [`Reply`]).

use serde::{Deserialize, Serialize};

use crate::TabHandle;
use crate::notification::Notification;
use crate::outcome::DeliveryOutcome;

/// Request sent between extension contexts.
///
/// The sender's tab is never part of the payload; the receiving side takes it
/// from the runtime's sender metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ExtensionMessage {
	/// Page asks the coordinator to make the sending tab the target.
	DesignateTarget,
	/// Page asks whether the sending tab is the current target.
	IsTarget,
	/// Any context asks for the current target handle.
	GetTarget,
	/// Any context asks the coordinator to forget the target.
	ClearTarget,
	/// Page asks the coordinator to relay selected text to the target.
	RelayText {
		/// Raw selected text, without prefix.
		text: String,
	},
	/// Coordinator hands prefixed text to the automator in the target tab.
	DeliverText {
		/// Text to inject, prefix already applied.
		text: String,
	},
	/// Coordinator asks a page whether it considers itself the target.
	ProbeIsTargetPage {
		/// Handle the coordinator holds as target, when it has one.
		#[serde(default, skip_serializing_if = "Option::is_none")]
		handle: Option<TabHandle>,
	},
	/// Show a message to the user.
	ShowNotification(Notification),
	/// Popup saves a new prefix.
	UpdatePrefix {
		/// New prefix; blank resets to the default.
		value: String,
	},
	/// Page pushes its current selection for external consumers.
	RememberSelection {
		/// Selected text.
		text: String,
	},
	/// Page script finished loading.
	ContentScriptReady,
	/// Page script is about to unload.
	ContentScriptUnloading,
}

impl ExtensionMessage {
	/// Wire name of the action, for logging.
	pub fn action(&self) -> &'static str {
		match self {
			Self::DesignateTarget => "designateTarget",
			Self::IsTarget => "isTarget",
			Self::GetTarget => "getTarget",
			Self::ClearTarget => "clearTarget",
			Self::RelayText { .. } => "relayText",
			Self::DeliverText { .. } => "deliverText",
			Self::ProbeIsTargetPage { .. } => "probeIsTargetPage",
			Self::ShowNotification(_) => "showNotification",
			Self::UpdatePrefix { .. } => "updatePrefix",
			Self::RememberSelection { .. } => "rememberSelection",
			Self::ContentScriptReady => "contentScriptReady",
			Self::ContentScriptUnloading => "contentScriptUnloading",
		}
	}
}

/// Human-readable acknowledgement (`designateTarget`, `clearTarget`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
	pub message: String,
}

impl Ack {
	pub fn new(message: impl Into<String>) -> Self {
		Self { message: message.into() }
	}
}

/// Reply to `isTarget` and `probeIsTargetPage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IsTargetReply {
	pub is_target: bool,
}

/// Reply to `getTarget`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetReply {
	/// Serialized as `null` when no target is designated.
	pub target_handle: Option<TabHandle>,
}

/// Reply to lifecycle and notification requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReply {
	pub success: bool,
	/// Tab the request came from, so a page can learn its own handle.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tab_handle: Option<TabHandle>,
}

/// Any reply the coordinator or a page can send back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
	Ack(Ack),
	IsTarget(IsTargetReply),
	Target(TargetReply),
	Status(StatusReply),
	Outcome(DeliveryOutcome),
	/// For requests whose sender expects no payload.
	Empty,
}

impl From<DeliveryOutcome> for Reply {
	fn from(outcome: DeliveryOutcome) -> Self {
		Reply::Outcome(outcome)
	}
}
