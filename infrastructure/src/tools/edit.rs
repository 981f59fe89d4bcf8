//! Guarded text edit tool: edit

use super::io_error;
use crate::security::PathSandbox;
use async_trait::async_trait;
use openlink_domain::edit::replace;
use openlink_domain::tool::{
    entities::{ToolArguments, ToolDefinition, ToolParameter},
    traits::{Tool, ToolContext},
    value_objects::{ToolError, ToolResult, ToolResultMetadata},
};
use openlink_domain::util::preview;
use tracing::debug;

/// Tool name constant
pub const EDIT: &str = "edit";

/// Characters of old/new text echoed back in the result
const PREVIEW_CHARS: usize = 60;

/// Get the tool definition for edit
pub fn edit_definition() -> ToolDefinition {
    ToolDefinition::new(
        EDIT,
        "Replace a string in a file, tolerating line-ending and indentation differences",
    )
    .with_parameter(ToolParameter::new("path", "file path", true).with_type("path"))
    .with_parameter(ToolParameter::new("old_string", "text to replace", true))
    .with_parameter(ToolParameter::new("new_string", "replacement text", true))
    .with_parameter(
        ToolParameter::new("replace_all", "replace all occurrences (default false)", false)
            .with_type("boolean"),
    )
}

pub struct EditTool {
    definition: ToolDefinition,
    sandbox: PathSandbox,
}

impl EditTool {
    pub fn new(sandbox: PathSandbox) -> Self {
        Self {
            definition: edit_definition(),
            sandbox,
        }
    }
}

#[async_trait]
impl Tool for EditTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn validate(&self, args: &ToolArguments) -> Result<(), ToolError> {
        args.require_string("path")
            .map_err(ToolError::validation_failed)?;
        args.require_string("old_string")
            .map_err(ToolError::validation_failed)?;
        // An empty replacement deletes the fragment
        if args.get_string("new_string").is_none() {
            return Err(ToolError::validation_failed("new_string is required"));
        }
        if args.contains("replace_all") && args.get_bool("replace_all").is_none() {
            return Err(ToolError::validation_failed("replace_all must be of type boolean"));
        }
        Ok(())
    }

    async fn execute(&self, ctx: &ToolContext) -> ToolResult {
        let path_str = ctx.arguments.get_string("path").unwrap_or_default();
        let old = ctx.arguments.get_string("old_string").unwrap_or_default();
        let new = ctx.arguments.get_string("new_string").unwrap_or_default();
        let all = ctx.arguments.get_bool("replace_all").unwrap_or(false);

        let path = match self.sandbox.confine(path_str) {
            Ok(p) => p,
            Err(e) => return ToolResult::failure(EDIT, e.into()),
        };

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) => return ToolResult::failure(EDIT, io_error(path_str, e)),
        };

        let replacement = match replace(&content, old, new, all) {
            Ok(r) => r,
            Err(e) => return ToolResult::failure(EDIT, e.into()),
        };
        debug!(path = %path_str, strategy = %replacement.strategy, "Fragment replaced");

        if let Err(e) = tokio::fs::write(&path, &replacement.content).await {
            return ToolResult::failure(EDIT, io_error(path_str, e));
        }

        ToolResult::success(
            EDIT,
            format!(
                "Replaced '{}' with '{}' in {}",
                preview(old, PREVIEW_CHARS),
                preview(new, PREVIEW_CHARS),
                path_str
            ),
        )
        .with_metadata(ToolResultMetadata {
            bytes: Some(replacement.content.len()),
            path: Some(path.display().to_string()),
            strategy: Some(replacement.strategy.to_string()),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openlink_domain::config::EngineConfig;
    use openlink_domain::tool::value_objects::ErrorKind;
    use std::fs;
    use std::sync::Arc;
    use tempfile::{TempDir, tempdir};

    fn run(dir: &TempDir, args: ToolArguments) -> impl std::future::Future<Output = ToolResult> {
        let tool = EditTool::new(PathSandbox::new(dir.path()));
        let ctx = ToolContext::new(args, Arc::new(EngineConfig::new(dir.path())));
        async move { tool.execute(&ctx).await }
    }

    #[tokio::test]
    async fn test_edit_exact() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "foo\nfoo\n").unwrap();

        let args = ToolArguments::new()
            .with("path", "a.txt")
            .with("old_string", "foo")
            .with("new_string", "bar");
        let result = run(&dir, args).await;

        assert_eq!(result.output(), "Replaced 'foo' with 'bar' in a.txt");
        assert_eq!(result.metadata().strategy.as_deref(), Some("exact"));
        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "bar\nfoo\n");
    }

    #[tokio::test]
    async fn test_edit_replace_all() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "foo\nfoo\n").unwrap();

        let args = ToolArguments::new()
            .with("path", "a.txt")
            .with("old_string", "foo")
            .with("new_string", "bar")
            .with("replace_all", true);
        run(&dir, args).await;

        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "bar\nbar\n");
    }

    #[tokio::test]
    async fn test_edit_indent_tolerant() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("m.py"), "def f():\n    if x:\n        go()\n").unwrap();

        let args = ToolArguments::new()
            .with("path", "m.py")
            .with("old_string", "if x:\n    go()")
            .with("new_string", "if y:\n    stop()");
        let result = run(&dir, args).await;

        assert!(result.is_success());
        assert_eq!(
            fs::read_to_string(dir.path().join("m.py")).unwrap(),
            "def f():\n    if y:\n        stop()\n"
        );
    }

    #[tokio::test]
    async fn test_edit_not_found_leaves_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "hello\n").unwrap();

        let args = ToolArguments::new()
            .with("path", "a.txt")
            .with("old_string", "absent")
            .with("new_string", "x");
        let result = run(&dir, args).await;

        assert_eq!(result.error().unwrap().kind, ErrorKind::NotFound);
        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "hello\n");
    }

    #[tokio::test]
    async fn test_edit_outside_sandbox() {
        let dir = tempdir().unwrap();
        let args = ToolArguments::new()
            .with("path", "../x.txt")
            .with("old_string", "a")
            .with("new_string", "b");
        let result = run(&dir, args).await;

        assert_eq!(result.error().unwrap().kind, ErrorKind::OutsideSandbox);
    }

    #[tokio::test]
    async fn test_validate_allows_empty_replacement() {
        let dir = tempdir().unwrap();
        let tool = EditTool::new(PathSandbox::new(dir.path()));

        let deletion = ToolArguments::new()
            .with("path", "a.txt")
            .with("old_string", "x")
            .with("new_string", "");
        assert!(tool.validate(&deletion).await.is_ok());

        let missing = ToolArguments::new().with("path", "a.txt").with("old_string", "x");
        assert!(tool.validate(&missing).await.is_err());
    }
}
