//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod dispatch_logger;
pub mod instruction_source;
pub mod tool_executor;
