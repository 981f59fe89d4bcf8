//! Output formatter trait

use crate::cli::commands::OutputFormat;
use crate::output::console::{ConsoleFormatter, JsonFormatter};
use openlink_domain::tool::{entities::ToolDescriptor, value_objects::ToolResponse};

/// Trait for rendering envelopes and tool listings
pub trait OutputFormatter {
    /// Format one response envelope
    fn format_response(&self, response: &ToolResponse) -> String;

    /// Format the tool listing
    fn format_tools(&self, tools: &[ToolDescriptor]) -> String;
}

/// Formatter for the selected output format
pub fn formatter_for(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Pretty => Box::new(ConsoleFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}
