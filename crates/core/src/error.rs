//! Error types for relaying and page automation.

use thiserror::Error;

/// Result type alias for relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Failure reported by a host API (storage, tabs, messaging, notifications).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PlatformError {
	pub message: String,
}

impl PlatformError {
	pub fn new(message: impl Into<String>) -> Self {
		Self { message: message.into() }
	}
}

impl From<serde_json::Error> for PlatformError {
	fn from(err: serde_json::Error) -> Self {
		Self::new(err.to_string())
	}
}

/// Terminal failure of one relay request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
	#[error("nothing selected to relay")]
	EmptyText,

	#[error("no target page designated; open the assistant page and mark it as target")]
	NoTarget,

	#[error("target page was closed; designate a target page again")]
	TargetClosed,

	#[error("target page unreachable: {0}")]
	TargetUnreachable(String),

	#[error("connection to the target page lost: {0}")]
	ConnectionLost(String),

	#[error("target page did not answer within {ms}ms")]
	Unresponsive { ms: u64 },

	/// Message produced by the automator, passed through verbatim.
	#[error("{0}")]
	Automation(String),

	#[error("unexpected failure: {0}")]
	Unexpected(String),
}

/// Coarse classification of a [`RelayError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	Configuration,
	Liveness,
	Transport,
	Timeout,
	AutomationMiss,
	Unexpected,
}

impl RelayError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			RelayError::EmptyText | RelayError::NoTarget => ErrorKind::Configuration,
			RelayError::TargetClosed | RelayError::TargetUnreachable(_) => ErrorKind::Liveness,
			RelayError::ConnectionLost(_) => ErrorKind::Transport,
			RelayError::Unresponsive { .. } => ErrorKind::Timeout,
			RelayError::Automation(_) => ErrorKind::AutomationMiss,
			RelayError::Unexpected(_) => ErrorKind::Unexpected,
		}
	}

	/// Whether this failure means the target is gone and must be re-designated.
	pub fn clears_target(&self) -> bool {
		matches!(self.kind(), ErrorKind::Liveness | ErrorKind::Transport)
	}
}

/// Failure of the automator inside the target page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomationError {
	#[error("input control not found")]
	InputNotFound,

	#[error("submit control not found")]
	SubmitNotFound,

	#[error("input control is not editable")]
	NotEditable,

	#[error("submit control rejected the click")]
	ClickRejected,

	#[error("page script error: {0}")]
	Dom(String),
}

impl From<AutomationError> for RelayError {
	fn from(err: AutomationError) -> Self {
		RelayError::Automation(err.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn only_liveness_and_transport_clear_the_target() {
		assert!(RelayError::TargetClosed.clears_target());
		assert!(RelayError::TargetUnreachable("No tab with id: 3".into()).clears_target());
		assert!(RelayError::ConnectionLost("Receiving end does not exist.".into()).clears_target());

		assert!(!RelayError::NoTarget.clears_target());
		assert!(!RelayError::Unresponsive { ms: 10 }.clears_target());
		assert!(!RelayError::Automation("submit control not found".into()).clears_target());
		assert!(!RelayError::Unexpected("bad reply".into()).clears_target());
	}

	#[test]
	fn automation_message_passes_through_verbatim() {
		let err: RelayError = AutomationError::SubmitNotFound.into();
		assert_eq!(err.to_string(), "submit control not found");
		assert_eq!(err.kind(), ErrorKind::AutomationMiss);
	}
}
