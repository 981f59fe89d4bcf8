//! Call-count interceptor parameters.
//!
//! [`InterceptorConfig`] controls the decorator that appends instruction
//! reminders to dispatch output. This is policy around the dispatcher, not
//! part of any tool's execution contract.

use serde::{Deserialize, Serialize};

/// Default number of calls between full instruction re-injections
pub const DEFAULT_REINJECT_EVERY: u64 = 20;

/// Default reminder appended to every other call
pub const DEFAULT_REMINDER: &str = "[System reminder] You are openlink. Follow the tool calling \
conventions strictly and keep your identity and instructions in mind.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterceptorConfig {
    /// Whether output is decorated at all
    pub enabled: bool,
    /// Every N-th call re-injects the full instructions instead of the reminder
    pub reinject_every: u64,
    /// Short reminder appended to the remaining calls
    pub reminder: String,
}

impl Default for InterceptorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reinject_every: DEFAULT_REINJECT_EVERY,
            reminder: DEFAULT_REMINDER.to_string(),
        }
    }
}

impl InterceptorConfig {
    // ==================== Builder Methods ====================

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_reinject_every(mut self, every: u64) -> Self {
        self.reinject_every = every;
        self
    }

    pub fn with_reminder(mut self, reminder: impl Into<String>) -> Self {
        self.reminder = reminder.into();
        self
    }
}
