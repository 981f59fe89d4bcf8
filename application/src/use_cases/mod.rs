//! Use cases (application services)
//!
//! - [`dispatch_tool`]: look up, validate and run a tool call under a deadline
//! - [`reinject_instructions`]: call-count interceptor decorating dispatch output

pub mod dispatch_tool;
pub mod reinject_instructions;
pub(crate) mod tool_helpers;
