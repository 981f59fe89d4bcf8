//! Tool Executor port
//!
//! Defines the interface the transport layer uses to run tool calls.
//! The dispatcher implements it, and decorators (such as the call-count
//! interceptor) wrap another implementation of it.

use async_trait::async_trait;
use openlink_domain::tool::{
    entities::{ToolCall, ToolDescriptor},
    value_objects::ToolResult,
};

/// Port for tool execution
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Static descriptors of every available tool, sorted by name
    fn list_tools(&self) -> Vec<ToolDescriptor>;

    /// Check if a tool is available (exact or case-folded name)
    fn has_tool(&self, name: &str) -> bool;

    /// Run a tool call.
    ///
    /// Never fails as a whole: every failure is an error [`ToolResult`].
    async fn dispatch(&self, call: ToolCall) -> ToolResult;
}
