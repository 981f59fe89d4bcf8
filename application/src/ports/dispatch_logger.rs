//! Port for structured dispatch auditing.
//!
//! Defines the [`DispatchLogger`] trait for recording one record per tool
//! dispatch to a machine-readable log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port captures an audit trail of
//! what the remote caller asked for and how each call ended.

use chrono::{DateTime, Utc};
use openlink_domain::tool::value_objects::{ToolResult, ToolStatus};
use serde::Serialize;

/// One completed dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchEvent {
    /// Requested tool name, as sent by the caller
    pub tool: String,
    pub status: ToolStatus,
    /// Error code for failed dispatches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
    pub duration_ms: u64,
    /// Caller-supplied reason, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Short preview of the most telling argument
    #[serde(skip_serializing_if = "String::is_empty")]
    pub args_preview: String,
    pub started_at: DateTime<Utc>,
}

impl DispatchEvent {
    pub fn from_result(
        tool: impl Into<String>,
        result: &ToolResult,
        reason: Option<String>,
        args_preview: String,
    ) -> Self {
        let elapsed = (result.finished_at() - result.started_at()).num_milliseconds().max(0);
        Self {
            tool: tool.into(),
            status: result.status(),
            error_code: result.error().map(|e| e.code()),
            duration_ms: elapsed as u64,
            reason,
            args_preview,
            started_at: result.started_at(),
        }
    }
}

/// Port for logging dispatch events to a structured log.
///
/// The `log` method is synchronous and non-fallible so that auditing can
/// never disrupt a dispatch; implementations swallow their own failures.
pub trait DispatchLogger: Send + Sync {
    /// Record a dispatch event.
    fn log(&self, event: DispatchEvent);
}

/// No-op implementation for tests and when auditing is disabled.
pub struct NoDispatchLogger;

impl DispatchLogger for NoDispatchLogger {
    fn log(&self, _event: DispatchEvent) {}
}
