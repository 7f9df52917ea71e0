use serde::{Deserialize, Serialize};

/// Result of delivering text into the target page.
///
/// On the wire this is `{"success": bool, "message": string}`; a missing
/// message deserializes as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OutcomeWire", into = "OutcomeWire")]
pub enum DeliveryOutcome {
	Delivered { message: String },
	Failed { message: String },
}

impl DeliveryOutcome {
	pub fn delivered(message: impl Into<String>) -> Self {
		Self::Delivered { message: message.into() }
	}

	pub fn failed(message: impl Into<String>) -> Self {
		Self::Failed { message: message.into() }
	}

	pub fn is_success(&self) -> bool {
		matches!(self, Self::Delivered { .. })
	}

	pub fn message(&self) -> &str {
		match self {
			Self::Delivered { message } | Self::Failed { message } => message,
		}
	}
}

#[derive(Serialize, Deserialize)]
struct OutcomeWire {
	success: bool,
	#[serde(default)]
	message: String,
}

impl From<OutcomeWire> for DeliveryOutcome {
	fn from(wire: OutcomeWire) -> Self {
		if wire.success {
			Self::Delivered { message: wire.message }
		} else {
			Self::Failed { message: wire.message }
		}
	}
}

impl From<DeliveryOutcome> for OutcomeWire {
	fn from(outcome: DeliveryOutcome) -> Self {
		match outcome {
			DeliveryOutcome::Delivered { message } => Self { success: true, message },
			DeliveryOutcome::Failed { message } => Self { success: false, message },
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn failure_serializes_with_success_false() {
		let json = serde_json::to_string(&DeliveryOutcome::failed("submit control not found")).unwrap();
		assert_eq!(json, r#"{"success":false,"message":"submit control not found"}"#);
	}

	#[test]
	fn reply_without_message_parses() {
		let outcome: DeliveryOutcome = serde_json::from_str(r#"{"success":true}"#).unwrap();
		assert!(outcome.is_success());
		assert_eq!(outcome.message(), "");
	}
}
