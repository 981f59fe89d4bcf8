//! Application layer for openlink
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::InterceptorConfig;
pub use ports::{
    dispatch_logger::{DispatchEvent, DispatchLogger, NoDispatchLogger},
    instruction_source::{InstructionSource, NoInstructions, StaticInstructions},
    tool_executor::ToolExecutorPort,
};
pub use use_cases::dispatch_tool::{DEFAULT_GRACE, ToolDispatcher};
pub use use_cases::reinject_instructions::CallCountInterceptor;
