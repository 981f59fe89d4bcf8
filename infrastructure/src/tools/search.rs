//! Search tools: grep, glob
//!
//! Both walk the filesystem on a blocking thread and never follow symbolic
//! links, so a link inside the sandbox cannot pull outside files into the
//! results.

use super::io_error;
use crate::security::PathSandbox;
use async_trait::async_trait;
use openlink_domain::tool::{
    entities::{ToolArguments, ToolDefinition, ToolParameter},
    traits::{DefaultToolValidator, Tool, ToolContext},
    value_objects::{ToolError, ToolResult, ToolResultMetadata},
};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Tool name constants
pub const GREP: &str = "grep";
pub const GLOB: &str = "glob";

/// Maximum number of results to return
pub const MAX_RESULTS: usize = 100;

/// Files larger than this are skipped by grep (5 MB)
const MAX_GREP_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Get the tool definition for grep
pub fn grep_definition() -> ToolDefinition {
    ToolDefinition::new(GREP, "Search file contents using regex")
        .with_parameter(ToolParameter::new("pattern", "regex pattern to search", true))
        .with_parameter(
            ToolParameter::new("path", "directory to search (default: root)", false)
                .with_type("path"),
        )
        .with_parameter(ToolParameter::new(
            "include",
            "file name glob filter, e.g. *.rs",
            false,
        ))
}

/// Get the tool definition for glob
pub fn glob_definition() -> ToolDefinition {
    ToolDefinition::new(GLOB, "Find files by glob pattern, newest first")
        .with_parameter(ToolParameter::new(
            "pattern",
            "relative glob pattern, e.g. **/*.rs",
            true,
        ))
        .with_parameter(
            ToolParameter::new("path", "base directory (default: root)", false).with_type("path"),
        )
}

fn truncation_marker() -> String {
    format!("(results truncated, showing first {})", MAX_RESULTS)
}

/// Sort newest first and keep at most [`MAX_RESULTS`] entries.
fn newest_first(mut entries: Vec<(SystemTime, String)>) -> (Vec<String>, bool) {
    // Stable sort keeps line order within a file
    entries.sort_by(|a, b| b.0.cmp(&a.0));
    let truncated = entries.len() > MAX_RESULTS;
    let lines = entries
        .into_iter()
        .take(MAX_RESULTS)
        .map(|(_, line)| line)
        .collect();
    (lines, truncated)
}

fn modified(path: &Path) -> SystemTime {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

pub struct GrepTool {
    definition: ToolDefinition,
    sandbox: PathSandbox,
}

impl GrepTool {
    pub fn new(sandbox: PathSandbox) -> Self {
        Self {
            definition: grep_definition(),
            sandbox,
        }
    }
}

#[async_trait]
impl Tool for GrepTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn validate(&self, args: &ToolArguments) -> Result<(), ToolError> {
        DefaultToolValidator
            .validate(args, &self.definition)
            .map_err(ToolError::validation_failed)?;
        if let Some(include) = args.get_string("include")
            && include.contains(['/', '\\'])
        {
            return Err(ToolError::validation_failed(
                "include pattern must not contain path separators",
            ));
        }
        let pattern = args.get_string("pattern").unwrap_or_default();
        Regex::new(pattern)
            .map_err(|e| ToolError::validation_failed(format!("invalid pattern: {}", e)))?;
        Ok(())
    }

    async fn execute(&self, ctx: &ToolContext) -> ToolResult {
        let path_str = ctx
            .arguments
            .get_string("path")
            .filter(|p| !p.is_empty())
            .unwrap_or(".");
        let pattern = ctx.arguments.get_string("pattern").unwrap_or_default();

        let regex = match Regex::new(pattern) {
            Ok(r) => r,
            Err(e) => {
                return ToolResult::failure(
                    GREP,
                    ToolError::validation_failed(format!("invalid pattern: {}", e)),
                );
            }
        };
        let include = match ctx.arguments.get_string("include").filter(|s| !s.is_empty()) {
            Some(inc) => match glob::Pattern::new(inc) {
                Ok(p) => Some(p),
                Err(e) => {
                    return ToolResult::failure(
                        GREP,
                        ToolError::validation_failed(format!("invalid include pattern: {}", e)),
                    );
                }
            },
            None => None,
        };
        let root = match self.sandbox.confine(path_str) {
            Ok(p) => p,
            Err(e) => return ToolResult::failure(GREP, e.into()),
        };

        let matches = match tokio::task::spawn_blocking(move || {
            grep_tree(&root, &regex, include.as_ref())
        })
        .await
        {
            Ok(m) => m,
            Err(e) => return ToolResult::failure(GREP, ToolError::io_failure(e.to_string())),
        };

        let total = matches.len();
        let (mut lines, truncated) = newest_first(matches);
        if lines.is_empty() {
            return ToolResult::success(GREP, "No matches found")
                .with_metadata(ToolResultMetadata {
                    match_count: Some(0),
                    ..Default::default()
                });
        }
        if truncated {
            lines.push(truncation_marker());
        }
        ToolResult::success(GREP, lines.join("\n")).with_metadata(ToolResultMetadata {
            match_count: Some(total),
            ..Default::default()
        })
    }
}

/// Collect `path:line:text` for every matching line under `root`.
fn grep_tree(
    root: &Path,
    regex: &Regex,
    include: Option<&glob::Pattern>,
) -> Vec<(SystemTime, String)> {
    let mut matches = Vec::new();
    for file in walk_files(root) {
        if let Some(pattern) = include {
            let name = file.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            if !pattern.matches(&name) {
                continue;
            }
        }
        let Ok(metadata) = fs::metadata(&file) else {
            continue;
        };
        if metadata.len() > MAX_GREP_FILE_SIZE {
            continue;
        }
        // Binary and non-UTF-8 files are skipped
        let Ok(content) = fs::read_to_string(&file) else {
            continue;
        };
        let mtime = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let display = file.display().to_string();
        for (idx, line) in content.lines().enumerate() {
            if regex.is_match(line) {
                matches.push((mtime, format!("{}:{}:{}", display, idx + 1, line)));
            }
        }
    }
    matches
}

/// Regular files under `root` (or `root` itself), symlinks skipped.
fn walk_files(root: &Path) -> Vec<PathBuf> {
    if root.is_file() {
        return vec![root.to_path_buf()];
    }
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        let mut children: Vec<_> = entries.flatten().collect();
        children.sort_by_key(|e| e.file_name());
        for entry in children {
            match entry.file_type() {
                Ok(t) if t.is_dir() => pending.push(entry.path()),
                Ok(t) if t.is_file() => files.push(entry.path()),
                _ => {}
            }
        }
    }
    files
}

pub struct GlobTool {
    definition: ToolDefinition,
    sandbox: PathSandbox,
}

impl GlobTool {
    pub fn new(sandbox: PathSandbox) -> Self {
        Self {
            definition: glob_definition(),
            sandbox,
        }
    }
}

#[async_trait]
impl Tool for GlobTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn validate(&self, args: &ToolArguments) -> Result<(), ToolError> {
        DefaultToolValidator
            .validate(args, &self.definition)
            .map_err(ToolError::validation_failed)?;
        let pattern = args.get_string("pattern").unwrap_or_default();
        if pattern.starts_with(['/', '\\', '~']) {
            return Err(ToolError::validation_failed("pattern must be relative"));
        }
        if pattern.split(['/', '\\']).any(|part| part == "..") {
            return Err(ToolError::validation_failed(
                "pattern must not contain '..' components",
            ));
        }
        glob::Pattern::new(pattern)
            .map_err(|e| ToolError::validation_failed(format!("invalid pattern: {}", e)))?;
        Ok(())
    }

    async fn execute(&self, ctx: &ToolContext) -> ToolResult {
        let path_str = ctx
            .arguments
            .get_string("path")
            .filter(|p| !p.is_empty())
            .unwrap_or(".");
        let pattern = ctx.arguments.get_string("pattern").unwrap_or_default().to_string();

        let base = match self.sandbox.confine(path_str) {
            Ok(p) => p,
            Err(e) => return ToolResult::failure(GLOB, e.into()),
        };

        let sandbox = self.sandbox.clone();
        let found = tokio::task::spawn_blocking(move || glob_tree(&sandbox, &base, &pattern)).await;
        let found = match found {
            Ok(Ok(f)) => f,
            Ok(Err(e)) => return ToolResult::failure(GLOB, e),
            Err(e) => return ToolResult::failure(GLOB, ToolError::io_failure(e.to_string())),
        };

        let total = found.len();
        let (mut lines, truncated) = newest_first(found);
        if lines.is_empty() {
            return ToolResult::success(GLOB, "No files found");
        }
        if truncated {
            lines.push(truncation_marker());
        }
        ToolResult::success(GLOB, lines.join("\n")).with_metadata(ToolResultMetadata {
            match_count: Some(total),
            ..Default::default()
        })
    }
}

fn glob_tree(
    sandbox: &PathSandbox,
    base: &Path,
    pattern: &str,
) -> Result<Vec<(SystemTime, String)>, ToolError> {
    let full = format!(
        "{}/{}",
        glob::Pattern::escape(&base.to_string_lossy()),
        pattern
    );
    let paths = glob::glob(&full)
        .map_err(|e| ToolError::validation_failed(format!("invalid pattern: {}", e)))?;

    let mut found = Vec::new();
    for path in paths.flatten() {
        // Matches reached through a symlink must still resolve inside
        if sandbox.confine(&path).is_err() {
            continue;
        }
        found.push((modified(&path), path.display().to_string()));
    }
    if found.is_empty() && !base.exists() {
        return Err(io_error(
            &base.display().to_string(),
            std::io::Error::from(std::io::ErrorKind::NotFound),
        ));
    }
    Ok(found)
}
