//! Keys used in the extension's persisted storage area.

/// Tab identifier of the designated target, absent when none is set.
pub const TARGET_HANDLE: &str = "targetHandle";

/// Prefix prepended to every relayed text.
pub const PREFIX_TEXT: &str = "prefixText";

/// Tunables (timeouts, delays, notification mode).
pub const RELAY_CONFIG: &str = "relayConfig";

/// Selector table overriding the built-in automation strategies.
pub const AUTOMATION_STRATEGIES: &str = "automationStrategies";

/// Most recent text pushed with `rememberSelection`.
pub const SELECTED_TEXT: &str = "selectedText";
