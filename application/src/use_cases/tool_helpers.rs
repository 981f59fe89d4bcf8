//! Shared helpers for dispatch use cases.

use openlink_domain::tool::entities::ToolCall;
use openlink_domain::util::preview;

/// Longest preview kept in logs and audit records
const PREVIEW_CHARS: usize = 50;

/// Extract a short preview string from tool call arguments.
///
/// Looks for well-known keys (`path`, `command`, `cmd`, `pattern`, `url`,
/// `question`) first, then falls back to the first string value found.
pub(crate) fn tool_args_preview(call: &ToolCall) -> String {
    let keys = ["path", "command", "cmd", "pattern", "url", "question"];
    for key in &keys {
        if let Some(s) = call.arguments.get_string(key) {
            return preview(s, PREVIEW_CHARS);
        }
    }
    // Fallback: first string value
    call.arguments
        .iter()
        .find_map(|(_, value)| value.as_str())
        .map(|s| preview(s, PREVIEW_CHARS))
        .unwrap_or_default()
}
