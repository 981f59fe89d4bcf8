//! Tool domain traits
//!
//! [`Tool`] is the single capability surface the dispatcher uses to treat
//! every tool polymorphically. [`DefaultToolValidator`] is the pure check
//! of arguments against a tool's declared parameters.

use super::entities::{ToolArguments, ToolDefinition, ToolDescriptor};
use super::value_objects::{ToolError, ToolResult};
use crate::config::EngineConfig;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Per-call execution context: the arguments plus the shared configuration.
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub arguments: ToolArguments,
    pub config: Arc<EngineConfig>,
    pub reason: Option<String>,
}

impl ToolContext {
    pub fn new(arguments: ToolArguments, config: Arc<EngineConfig>) -> Self {
        Self {
            arguments,
            config,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: Option<String>) -> Self {
        self.reason = reason;
        self
    }
}

/// A locally executable operation.
///
/// Implementations are registered once at startup and then shared across
/// concurrent dispatches, so they must be `Send + Sync` and hold no
/// per-call state.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Static definition (name, description, parameters)
    fn definition(&self) -> &ToolDefinition;

    fn name(&self) -> &str {
        &self.definition().name
    }

    fn description(&self) -> &str {
        &self.definition().description
    }

    fn parameter_schema(&self) -> BTreeMap<String, String> {
        self.definition().parameter_schema()
    }

    fn descriptor(&self) -> ToolDescriptor {
        self.definition().descriptor()
    }

    /// Reject malformed or disallowed arguments before execution.
    ///
    /// The executor is never invoked when this returns an error.
    async fn validate(&self, args: &ToolArguments) -> Result<(), ToolError> {
        DefaultToolValidator
            .validate(args, self.definition())
            .map_err(ToolError::validation_failed)
    }

    /// Run the tool. Failures are reported as error results, never panics.
    async fn execute(&self, ctx: &ToolContext) -> ToolResult;
}

/// Checks required parameters and declared type hints.
///
/// Unknown arguments are tolerated: callers often send aliases or extra
/// keys, and the schema is advisory.
#[derive(Debug, Clone, Default)]
pub struct DefaultToolValidator;

impl DefaultToolValidator {
    pub fn validate(&self, args: &ToolArguments, definition: &ToolDefinition) -> Result<(), String> {
        for param in &definition.parameters {
            match args.get(&param.name) {
                None if param.required => {
                    return Err(format!("{} is required", param.name));
                }
                None => {}
                Some(value) => {
                    if !matches_type(value, &param.param_type) {
                        return Err(format!("{} must be of type {}", param.name, param.param_type));
                    }
                    if param.required && value.as_str().is_some_and(str::is_empty) {
                        return Err(format!("{} is required", param.name));
                    }
                }
            }
        }
        Ok(())
    }
}

fn matches_type(value: &Value, param_type: &str) -> bool {
    match param_type {
        "string" | "path" => value.is_string(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        _ => true,
    }
}
