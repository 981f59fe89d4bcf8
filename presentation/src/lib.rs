//! Presentation layer for openlink
//!
//! This crate contains CLI definitions, output formatters and the
//! JSON-lines stdio loop.

pub mod cli;
pub mod output;
pub mod stdio;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, OutputFormat};
pub use output::console::{ConsoleFormatter, JsonFormatter};
pub use output::formatter::{OutputFormatter, formatter_for};
pub use stdio::StdioServer;
