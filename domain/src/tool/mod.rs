//! Tool domain module
//!
//! This module defines the core abstractions of the **Tool System**: how a
//! remote caller invokes a fixed catalogue of local operations against a
//! single sandbox root.
//!
//! # Overview
//!
//! Every tool is described by a [`ToolDefinition`] (name, advisory parameter
//! schema), invoked via a [`ToolCall`], and returns a [`ToolResult`] that is
//! rendered to the transport as a [`ToolResponse`] envelope.
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ ToolCall     │───▶│ ToolRegistry │───▶│ Tool         │───▶│ ToolResult   │
//! │ (request)    │    │ (name → impl)│    │ validate/exec│    │ → Response   │
//! └──────────────┘    └──────────────┘    └──────────────┘    └──────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`ToolRegistry`]: Name-keyed catalogue with unique registration
//! - [`Tool`]: Capability surface every tool implements
//! - [`ToolDefinition`] / [`ToolDescriptor`]: Static introspection data
//! - [`ToolError`]: Error taxonomy carried by failed results
//!
//! # Architecture
//!
//! - **Domain** (this module): Contracts and pure validation
//! - **Application** (`ToolExecutorPort`): Dispatch with deadline and interception
//! - **Infrastructure** (`builtin_registry`): Filesystem, process and HTTP tools

pub mod entities;
pub mod registry;
pub mod traits;
pub mod value_objects;

pub use entities::{ToolArguments, ToolCall, ToolDefinition, ToolDescriptor, ToolParameter};
pub use registry::{RegistryError, ToolRegistry};
pub use traits::{DefaultToolValidator, Tool, ToolContext};
pub use value_objects::{ErrorKind, ToolError, ToolResponse, ToolResult, ToolStatus};
