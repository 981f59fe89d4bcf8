//! Tool domain value objects: immutable result and error types
//!
//! These types form the **output side** of the Tool System pipeline.
//! Every dispatch produces exactly one [`ToolResult`], which is rendered
//! to the transport as a [`ToolResponse`] envelope.
//!
//! A result is either a fully populated success or a fully populated
//! error; there is no partially filled state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error taxonomy of the engine.
///
/// | Code | Raised by |
/// |------|-----------|
/// | `UNKNOWN_TOOL` | Dispatcher, name not registered |
/// | `VALIDATION_FAILED` | Tool validators (missing fields, dangerous commands) |
/// | `OUTSIDE_SANDBOX` | Path confinement |
/// | `PRIVATE_ADDRESS_BLOCKED` | Fetch target guard |
/// | `NOT_FOUND` | Fuzzy replacement exhausted every strategy |
/// | `EXECUTION_TIMEOUT` | Deadline exceeded during subprocess or network I/O |
/// | `IO_FAILURE` | Underlying filesystem, process or network error |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    UnknownTool,
    ValidationFailed,
    OutsideSandbox,
    PrivateAddressBlocked,
    NotFound,
    ExecutionTimeout,
    IoFailure,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::UnknownTool => "UNKNOWN_TOOL",
            ErrorKind::ValidationFailed => "VALIDATION_FAILED",
            ErrorKind::OutsideSandbox => "OUTSIDE_SANDBOX",
            ErrorKind::PrivateAddressBlocked => "PRIVATE_ADDRESS_BLOCKED",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::ExecutionTimeout => "EXECUTION_TIMEOUT",
            ErrorKind::IoFailure => "IO_FAILURE",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error carried by a failed [`ToolResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolError {
    /// Error class
    #[serde(rename = "code")]
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ToolError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    // Common error constructors
    pub fn unknown_tool(name: &str, available: &[String]) -> Self {
        let error = Self::new(ErrorKind::UnknownTool, format!("unknown tool: {}", name));
        if available.is_empty() {
            error
        } else {
            error.with_details(format!("available tools: {}", available.join(", ")))
        }
    }

    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::ValidationFailed,
            format!("validation failed: {}", message.into()),
        )
    }

    pub fn outside_sandbox(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::OutsideSandbox, message)
    }

    pub fn private_address_blocked(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PrivateAddressBlocked, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExecutionTimeout, operation)
    }

    pub fn io_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IoFailure, message)
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ToolError {}

impl From<std::io::Error> for ToolError {
    fn from(e: std::io::Error) -> Self {
        Self::io_failure(e.to_string())
    }
}

/// Outcome class of a tool invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Success,
    Error,
}

impl ToolStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolStatus::Success => "success",
            ToolStatus::Error => "error",
        }
    }
}

impl fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured metadata about tool execution.
///
/// | Tool | `bytes` | `path` | `exit_code` | `match_count` | `strategy` |
/// |------|:---:|:---:|:---:|:---:|:---:|
/// | `read_file` | yes | yes | - | - | - |
/// | `write_file` | yes | yes | - | - | - |
/// | `exec_cmd` | yes | - | yes | - | - |
/// | `grep` / `glob` | - | - | - | yes | - |
/// | `edit` | yes | yes | - | - | yes |
/// | `web_fetch` | yes | - | - | - | - |
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolResultMetadata {
    /// Duration of execution in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// Number of bytes processed/returned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<usize>,
    /// For file operations: the resolved path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// For command execution: exit code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// For search operations: number of matches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_count: Option<usize>,
    /// For edits: the replacement strategy that matched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
}

/// Result of a tool invocation.
///
/// Produced once per dispatch. Fields are private; the `with_*` builders
/// consume the value so a result cannot be altered once handed out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    tool_name: String,
    status: ToolStatus,
    output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ToolError>,
    stop_stream: bool,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    #[serde(default)]
    metadata: ToolResultMetadata,
    /// Set when the call never reached `execute`
    #[serde(default, skip_serializing_if = "is_false")]
    rejected: bool,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(tool_name: impl Into<String>, output: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            tool_name: tool_name.into(),
            status: ToolStatus::Success,
            output: output.into(),
            error: None,
            stop_stream: false,
            started_at: now,
            finished_at: now,
            metadata: ToolResultMetadata::default(),
            rejected: false,
        }
    }

    /// Create a failed result
    pub fn failure(tool_name: impl Into<String>, error: ToolError) -> Self {
        let now = Utc::now();
        Self {
            tool_name: tool_name.into(),
            status: ToolStatus::Error,
            output: String::new(),
            error: Some(error),
            stop_stream: false,
            started_at: now,
            finished_at: now,
            metadata: ToolResultMetadata::default(),
            rejected: false,
        }
    }

    /// Create a failed result for a call that was turned away before
    /// execution (unknown tool or failed validation).
    pub fn rejected(tool_name: impl Into<String>, error: ToolError) -> Self {
        let mut result = Self::failure(tool_name, error);
        result.rejected = true;
        result
    }

    /// Record when execution began; duration metadata is derived from it.
    pub fn with_started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = started_at;
        let elapsed = (self.finished_at - started_at).num_milliseconds().max(0);
        self.metadata.duration_ms = Some(elapsed as u64);
        self
    }

    /// Attach output text. On failures this is diagnostic only.
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    /// Append text to the output (used by output interceptors)
    pub fn with_appended_output(mut self, suffix: &str) -> Self {
        self.output.push_str(suffix);
        self
    }

    pub fn with_stop_stream(mut self, stop_stream: bool) -> Self {
        self.stop_stream = stop_stream;
        self
    }

    /// Add metadata to the result, keeping any recorded duration
    pub fn with_metadata(mut self, metadata: ToolResultMetadata) -> Self {
        let duration_ms = self.metadata.duration_ms;
        self.metadata = metadata;
        if self.metadata.duration_ms.is_none() {
            self.metadata.duration_ms = duration_ms;
        }
        self
    }

    /// Add path metadata
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.metadata.path = Some(path.into());
        self
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    pub fn status(&self) -> ToolStatus {
        self.status
    }

    /// Check if execution was successful
    pub fn is_success(&self) -> bool {
        self.status == ToolStatus::Success
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn error(&self) -> Option<&ToolError> {
        self.error.as_ref()
    }

    pub fn stop_stream(&self) -> bool {
        self.stop_stream
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    /// Whether the call was turned away before execution
    pub fn was_rejected(&self) -> bool {
        self.rejected
    }

    pub fn metadata(&self) -> &ToolResultMetadata {
        &self.metadata
    }

    /// Render the transport envelope
    pub fn to_response(&self) -> ToolResponse {
        ToolResponse::from(self)
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Response envelope handed back to the transport layer verbatim.
///
/// Wire shape: `{ "status": "success"|"error", "output": ..., "error"?: ..., "stopStream"?: true }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub status: ToolStatus,
    pub output: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
    #[serde(default, rename = "stopStream", skip_serializing_if = "is_false")]
    pub stop_stream: bool,
}

impl ToolResponse {
    /// Envelope for a request that never reached the dispatcher (e.g. malformed JSON)
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            status: ToolStatus::Error,
            output: String::new(),
            error: message.into(),
            stop_stream: false,
        }
    }
}

impl From<&ToolResult> for ToolResponse {
    fn from(result: &ToolResult) -> Self {
        Self {
            status: result.status,
            output: result.output.clone(),
            error: result.error.as_ref().map(ToString::to_string).unwrap_or_default(),
            stop_stream: result.stop_stream,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error() {
        let err = ToolError::not_found("old_string not found in file").with_details("src/lib.rs");

        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.code(), "NOT_FOUND");
        assert_eq!(
            err.to_string(),
            "[NOT_FOUND] old_string not found in file (src/lib.rs)"
        );
    }

    #[test]
    fn test_unknown_tool_names_the_tool() {
        let err = ToolError::unknown_tool("foo_bar", &["edit".into(), "grep".into()]);
        assert!(err.to_string().contains("foo_bar"));
        assert_eq!(err.details.as_deref(), Some("available tools: edit, grep"));
    }

    #[test]
    fn test_tool_result_success() {
        let result = ToolResult::success("read_file", "file contents").with_path("/test/file.txt");

        assert!(result.is_success());
        assert_eq!(result.output(), "file contents");
        assert!(result.error().is_none());
        assert_eq!(result.metadata().path, Some("/test/file.txt".to_string()));
    }

    #[test]
    fn test_tool_result_failure() {
        let result = ToolResult::failure("write_file", ToolError::outside_sandbox("/etc/passwd"));

        assert!(!result.is_success());
        assert!(result.output().is_empty());
        assert_eq!(result.error().unwrap().kind, ErrorKind::OutsideSandbox);
    }

    #[test]
    fn test_rejected_is_distinct_from_failure() {
        let executed = ToolResult::failure("grep", ToolError::validation_failed("bad include"));
        let rejected = ToolResult::rejected("grep", ToolError::validation_failed("bad include"));

        assert!(!executed.was_rejected());
        assert!(rejected.was_rejected());
        assert_eq!(rejected.to_response(), executed.to_response());
    }

    #[test]
    fn test_started_at_records_duration() {
        let started = Utc::now() - chrono::Duration::milliseconds(250);
        let result = ToolResult::success("exec_cmd", "ok").with_started_at(started);

        assert!(result.metadata().duration_ms.unwrap() >= 250);
        assert!(result.started_at() <= result.finished_at());
    }

    #[test]
    fn test_response_envelope_success_omits_optional_fields() {
        let response = ToolResult::success("list_dir", "a.txt").to_response();
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json, serde_json::json!({"status": "success", "output": "a.txt"}));
    }

    #[test]
    fn test_response_envelope_error_and_stop_stream() {
        let response = ToolResult::failure("exec_cmd", ToolError::timeout("execution timeout after 1s"))
            .with_output("partial")
            .with_stop_stream(true)
            .to_response();
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "[EXECUTION_TIMEOUT] execution timeout after 1s");
        assert_eq!(json["stopStream"], true);
    }

    #[test]
    fn test_error_kind_serializes_as_code() {
        let json = serde_json::to_value(ToolError::validation_failed("path is required")).unwrap();
        assert_eq!(json["code"], "VALIDATION_FAILED");
        assert_eq!(json["message"], "validation failed: path is required");
    }
}
