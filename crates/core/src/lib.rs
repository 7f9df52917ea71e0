//! Relay coordination and target-page automation for the selrelay extension.
//!
//! The extension runs in three kinds of contexts that share no memory:
//!
//! * the background coordinator, which owns the [`TargetRegistry`] and runs
//!   every relay through the [`Coordinator`];
//! * ordinary pages, where a [`SelectionWatcher`] tracks the user's selection;
//! * the designated target page, where an [`Automator`] fills the host page's
//!   input control and presses its send control.
//!
//! Everything in this crate is host-agnostic. Browser access goes through the
//! traits in [`platform`] and the DOM traits in [`automator`], implemented by
//! the wasm extension crates and by test doubles.

pub mod automator;
pub mod coordinator;
pub mod error;
pub mod notify;
pub mod platform;
pub mod registry;
pub mod selection;
pub mod settings;

#[cfg(test)]
pub(crate) mod testing;

pub use automator::{Automator, Control, ControlKind, Locator, Page, Strategies};
pub use coordinator::{Coordinator, Responder};
pub use error::{AutomationError, ErrorKind, PlatformError, RelayError, Result};
pub use notify::{FallbackNotifier, LogNotifier};
pub use platform::{Notifier, Storage, TabInfo, Tabs, Timer};
pub use registry::TargetRegistry;
pub use selection::{SelectionWatcher, WatcherAction};
pub use settings::{NotificationMode, RelayConfig, SettingsStore};

pub use selrelay_protocol as protocol;
