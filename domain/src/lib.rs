//! Domain layer for openlink
//!
//! This crate contains the core contracts and policies of the sandboxed
//! tool-execution engine. It performs no filesystem, process, or network I/O.
//!
//! # Core Concepts
//!
//! ## Tools
//!
//! Every operation a remote agent may invoke is a [`Tool`]: a named capability
//! with a declarative parameter schema, an argument validator and an async
//! executor. Tools are collected in a [`ToolRegistry`] and invoked through a
//! [`ToolCall`], producing exactly one [`ToolResult`].
//!
//! ## Policies
//!
//! - [`security::CommandGuard`]: deny-list classification of shell commands
//! - [`security::address_policy`]: private / loopback / link-local address ranges
//! - [`edit::fuzzy_replace`]: four-strategy tolerant text substitution

pub mod config;
pub mod edit;
pub mod security;
pub mod tool;
pub mod util;

// Re-export commonly used types
pub use config::EngineConfig;
pub use edit::{MatchStrategy, ReplaceError, Replacement};
pub use security::{CommandGuard, DangerousCommand, FetchTargetError, SandboxError};
pub use tool::{
    entities::{ToolArguments, ToolCall, ToolDefinition, ToolDescriptor, ToolParameter},
    registry::{RegistryError, ToolRegistry},
    traits::{DefaultToolValidator, Tool, ToolContext},
    value_objects::{ErrorKind, ToolError, ToolResponse, ToolResult, ToolResultMetadata, ToolStatus},
};
