//! Interaction tools: question, todo_write
//!
//! `question` hands control back to the human: its result sets
//! `stop_stream` so the transport stops streaming and waits for an answer.

use super::io_error;
use crate::security::PathSandbox;
use async_trait::async_trait;
use openlink_domain::tool::{
    entities::{ToolDefinition, ToolParameter},
    traits::{Tool, ToolContext},
    value_objects::{ToolError, ToolResult, ToolResultMetadata},
};
use serde_json::Value;

/// Tool name constants
pub const QUESTION: &str = "question";
pub const TODO_WRITE: &str = "todo_write";

/// Todo list file, relative to the sandbox root
pub const TODO_FILE: &str = ".todos.json";

/// Get the tool definition for question
pub fn question_definition() -> ToolDefinition {
    ToolDefinition::new(QUESTION, "Ask the user a question and wait for the answer")
        .with_parameter(ToolParameter::new("question", "question to ask", true))
        .with_parameter(
            ToolParameter::new("options", "suggested answers", false).with_type("array"),
        )
}

/// Get the tool definition for todo_write
pub fn todo_write_definition() -> ToolDefinition {
    ToolDefinition::new(TODO_WRITE, "Replace the task list for the current work")
        .with_parameter(ToolParameter::new("todos", "todo items", true).with_type("array"))
}

pub struct QuestionTool {
    definition: ToolDefinition,
}

impl Default for QuestionTool {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionTool {
    pub fn new() -> Self {
        Self {
            definition: question_definition(),
        }
    }
}

#[async_trait]
impl Tool for QuestionTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, ctx: &ToolContext) -> ToolResult {
        let question = ctx.arguments.get_string("question").unwrap_or_default();
        let mut output = question.to_string();

        let options: Vec<String> = ctx
            .arguments
            .get_array("options")
            .map(|items| items.iter().map(option_label).collect())
            .unwrap_or_default();
        if !options.is_empty() {
            output.push('\n');
            for (i, option) in options.iter().enumerate() {
                output.push_str(&format!("\n{}. {}", i + 1, option));
            }
        }

        ToolResult::success(QUESTION, output).with_stop_stream(true)
    }
}

fn option_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub struct TodoWriteTool {
    definition: ToolDefinition,
    sandbox: PathSandbox,
}

impl TodoWriteTool {
    pub fn new(sandbox: PathSandbox) -> Self {
        Self {
            definition: todo_write_definition(),
            sandbox,
        }
    }
}

#[async_trait]
impl Tool for TodoWriteTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, ctx: &ToolContext) -> ToolResult {
        let todos = ctx.arguments.get_array("todos").cloned().unwrap_or_default();

        let path = match self.sandbox.confine(TODO_FILE) {
            Ok(p) => p,
            Err(e) => return ToolResult::failure(TODO_WRITE, e.into()),
        };
        let json = match serde_json::to_string_pretty(&todos) {
            Ok(j) => j,
            Err(e) => return ToolResult::failure(TODO_WRITE, ToolError::io_failure(e.to_string())),
        };
        if let Err(e) = tokio::fs::write(&path, json).await {
            return ToolResult::failure(TODO_WRITE, io_error(TODO_FILE, e));
        }

        ToolResult::success(TODO_WRITE, format!("Updated {} todos", todos.len())).with_metadata(
            ToolResultMetadata {
                match_count: Some(todos.len()),
                path: Some(path.display().to_string()),
                ..Default::default()
            },
        )
    }
}
