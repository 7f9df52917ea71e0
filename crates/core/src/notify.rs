//! Notifier composition.

use async_trait::async_trait;
use selrelay_protocol::{Level, Notification};
use tracing::{error, info, warn};

use crate::error::PlatformError;
use crate::platform::Notifier;

/// Tries `primary`, then `fallback` when the primary sink fails.
pub struct FallbackNotifier<A, B> {
	primary: A,
	fallback: B,
}

impl<A, B> FallbackNotifier<A, B> {
	pub fn new(primary: A, fallback: B) -> Self {
		Self { primary, fallback }
	}
}

#[async_trait(?Send)]
impl<A: Notifier, B: Notifier> Notifier for FallbackNotifier<A, B> {
	async fn notify(&self, notification: Notification) -> Result<(), PlatformError> {
		match self.primary.notify(notification.clone()).await {
			Ok(()) => Ok(()),
			Err(err) => {
				warn!(target = "selrelay", error = %err, "notification sink failed, using fallback");
				self.fallback.notify(notification).await
			}
		}
	}
}

/// Last-resort sink writing notifications to the log.
pub struct LogNotifier;

#[async_trait(?Send)]
impl Notifier for LogNotifier {
	async fn notify(&self, notification: Notification) -> Result<(), PlatformError> {
		let title = notification.display_title();
		match notification.level {
			Level::Info => info!(target = "selrelay", title, "{}", notification.message),
			Level::Warning => warn!(target = "selrelay", title, "{}", notification.message),
			Level::Error => error!(target = "selrelay", title, "{}", notification.message),
		}
		Ok(())
	}
}

#[async_trait(?Send)]
impl<N: Notifier + ?Sized> Notifier for std::rc::Rc<N> {
	async fn notify(&self, notification: Notification) -> Result<(), PlatformError> {
		(**self).notify(notification).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::RecordingNotifier;

	#[tokio::test]
	async fn fallback_used_only_on_failure() {
		let primary = RecordingNotifier::new();
		let fallback = RecordingNotifier::new();
		let notifier = FallbackNotifier::new(primary.clone(), fallback.clone());

		notifier.notify(Notification::info("saved")).await.unwrap();

		assert_eq!(primary.messages(), vec!["saved"]);
		assert!(fallback.seen().is_empty());
	}

	#[tokio::test]
	async fn failing_primary_falls_back() {
		let primary = RecordingNotifier::failing();
		let fallback = RecordingNotifier::new();
		let notifier = FallbackNotifier::new(primary.clone(), fallback.clone());

		notifier.notify(Notification::error("target closed")).await.unwrap();

		assert_eq!(fallback.messages(), vec!["target closed"]);
	}

	#[tokio::test]
	async fn log_notifier_never_fails() {
		assert!(LogNotifier.notify(Notification::warning("careful")).await.is_ok());
	}
}
