use serde::{Deserialize, Serialize};

use crate::DEFAULT_TITLE;

/// Severity of a [`Notification`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
	#[default]
	Info,
	Warning,
	Error,
}

/// Something to tell the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	pub message: String,
	#[serde(rename = "type", default)]
	pub level: Level,
}

impl Notification {
	pub fn new(level: Level, message: impl Into<String>) -> Self {
		Self {
			title: None,
			message: message.into(),
			level,
		}
	}

	pub fn info(message: impl Into<String>) -> Self {
		Self::new(Level::Info, message)
	}

	pub fn warning(message: impl Into<String>) -> Self {
		Self::new(Level::Warning, message)
	}

	pub fn error(message: impl Into<String>) -> Self {
		Self::new(Level::Error, message)
	}

	pub fn with_title(mut self, title: impl Into<String>) -> Self {
		self.title = Some(title.into());
		self
	}

	/// Title to display, falling back to [`DEFAULT_TITLE`].
	pub fn display_title(&self) -> &str {
		self.title.as_deref().unwrap_or(DEFAULT_TITLE)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn level_defaults_to_info_when_missing() {
		let n: Notification = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
		assert_eq!(n.level, Level::Info);
		assert_eq!(n.display_title(), DEFAULT_TITLE);
	}

	#[test]
	fn level_serializes_as_type_field() {
		let json = serde_json::to_string(&Notification::error("boom").with_title("Relay")).unwrap();
		assert!(json.contains(r#""type":"error""#));
		assert!(json.contains(r#""title":"Relay""#));
	}
}
