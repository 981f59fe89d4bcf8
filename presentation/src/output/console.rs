//! Console output formatters for envelopes, tool listings and configuration

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use openlink_application::config::InterceptorConfig;
use openlink_domain::config::EngineConfig;
use openlink_domain::tool::{
    entities::ToolDescriptor,
    value_objects::{ToolResponse, ToolStatus},
};
use std::path::Path;

/// Colored, human-readable output
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format a response envelope
    pub fn format_response(response: &ToolResponse) -> String {
        let mut output = String::new();

        let status = match response.status {
            ToolStatus::Success => response.status.as_str().green().bold(),
            ToolStatus::Error => response.status.as_str().red().bold(),
        };
        output.push_str(&format!("{} {}\n", "Status:".cyan().bold(), status));

        if !response.error.is_empty() {
            output.push_str(&format!("{} {}\n", "Error:".red().bold(), response.error));
        }
        if response.stop_stream {
            output.push_str(&format!("{}\n", "(waiting for user input)".yellow()));
        }
        if !response.output.is_empty() {
            output.push('\n');
            output.push_str(&response.output);
            if !response.output.ends_with('\n') {
                output.push('\n');
            }
        }

        output
    }

    /// Format the tool listing
    pub fn format_tools(tools: &[ToolDescriptor]) -> String {
        let mut output = Self::header(&format!("{} tools", tools.len()));
        output.push('\n');

        for tool in tools {
            output.push_str(&format!(
                "\n{}\n  {}\n",
                tool.name.yellow().bold(),
                tool.description
            ));
            for (name, constraint) in &tool.parameters {
                output.push_str(&format!("    {} {}\n", name.cyan(), constraint.dimmed()));
            }
        }

        output
    }

    /// Format the effective configuration; the token is never shown
    pub fn format_config(engine: &EngineConfig, interceptor: &InterceptorConfig) -> String {
        let mut output = Self::header("Effective configuration");
        output.push('\n');

        let token = if engine.token().is_empty() {
            "<unset>"
        } else {
            "<redacted>"
        };
        let roots = engine
            .extra_read_roots()
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");

        output.push_str(&Self::section_header("[engine]"));
        output.push_str(&Self::entry("root_dir", &engine.root_dir().display().to_string()));
        output.push_str(&Self::entry("port", &engine.port().to_string()));
        output.push_str(&Self::entry(
            "timeout_seconds",
            &engine.timeout().as_secs().to_string(),
        ));
        output.push_str(&Self::entry("token", token));
        output.push_str(&Self::entry("extra_read_roots", &roots));

        output.push_str(&Self::section_header("[interceptor]"));
        output.push_str(&Self::entry("enabled", &interceptor.enabled.to_string()));
        output.push_str(&Self::entry(
            "reinject_every",
            &interceptor.reinject_every.to_string(),
        ));

        output
    }

    /// Format config file locations, highest priority first
    pub fn format_sources<'a>(
        sources: impl IntoIterator<Item = (&'a str, &'a Path, bool)>,
    ) -> String {
        let mut output = Self::section_header("Configuration sources");
        for (label, path, found) in sources {
            let marker = if found {
                "[FOUND]".green().to_string()
            } else {
                "[     ]".dimmed().to_string()
            };
            output.push_str(&format!("  {} {:<9} {}\n", marker, label, path.display()));
        }
        output.push_str(&format!("  {} Default   built-in defaults\n", "[     ]".dimmed()));
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn entry(key: &str, value: &str) -> String {
        format!("  {:<18} {}\n", key, value)
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_response(&self, response: &ToolResponse) -> String {
        Self::format_response(response)
    }

    fn format_tools(&self, tools: &[ToolDescriptor]) -> String {
        Self::format_tools(tools)
    }
}

/// One JSON document per response
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_response(&self, response: &ToolResponse) -> String {
        serde_json::to_string(response).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_tools(&self, tools: &[ToolDescriptor]) -> String {
        serde_json::to_string_pretty(tools).unwrap_or_else(|_| "[]".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openlink_domain::tool::value_objects::{ToolError, ToolResult};
    use std::collections::BTreeMap;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_format_success_response() {
        plain();
        let response = ToolResult::success("list_dir", "a.txt\nb/").to_response();
        let text = ConsoleFormatter::format_response(&response);

        assert!(text.starts_with("Status: success\n"));
        assert!(text.ends_with("a.txt\nb/\n"));
        assert!(!text.contains("Error:"));
    }

    #[test]
    fn test_format_error_response() {
        plain();
        let response =
            ToolResult::failure("edit", ToolError::not_found("old_string not found")).to_response();
        let text = ConsoleFormatter::format_response(&response);

        assert!(text.contains("Status: error"));
        assert!(text.contains("Error: [NOT_FOUND] old_string not found"));
    }

    #[test]
    fn test_format_tools_lists_parameters() {
        plain();
        let tools = vec![ToolDescriptor {
            name: "read_file".to_string(),
            description: "Read a file".to_string(),
            parameters: BTreeMap::from([("path".to_string(), "path, required".to_string())]),
        }];
        let text = ConsoleFormatter::format_tools(&tools);

        assert!(text.contains("1 tools"));
        assert!(text.contains("read_file"));
        assert!(text.contains("path path, required"));
    }

    #[test]
    fn test_format_config_redacts_token() {
        plain();
        let engine = EngineConfig::new("/work").with_token("secret");
        let text = ConsoleFormatter::format_config(&engine, &InterceptorConfig::default());

        assert!(text.contains("/work"));
        assert!(text.contains("<redacted>"));
        assert!(!text.contains("secret"));
    }

    #[test]
    fn test_json_formatter_emits_wire_shape() {
        let response = ToolResult::success("question", "Name?")
            .with_stop_stream(true)
            .to_response();
        let json: serde_json::Value =
            serde_json::from_str(&JsonFormatter.format_response(&response)).unwrap();

        assert_eq!(json["status"], "success");
        assert_eq!(json["stopStream"], true);
        assert!(json.get("error").is_none());
    }
}
