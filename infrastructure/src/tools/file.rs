//! File operation tools: read_file, write_file, list_dir

use super::io_error;
use crate::security::PathSandbox;
use async_trait::async_trait;
use openlink_domain::tool::{
    entities::{ToolArguments, ToolDefinition, ToolParameter},
    traits::{DefaultToolValidator, Tool, ToolContext},
    value_objects::{ToolError, ToolResult, ToolResultMetadata},
};
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Tool name constants
pub const READ_FILE: &str = "read_file";
pub const WRITE_FILE: &str = "write_file";
pub const LIST_DIR: &str = "list_dir";

/// Maximum lines returned by one read
pub const MAX_LINES: usize = 2000;

/// Maximum bytes returned by one read (50 KiB)
pub const MAX_BYTES: usize = 50 * 1024;

/// Sentinel output for empty files and directories
pub const EMPTY: &str = "empty";

/// Get the tool definition for read_file
pub fn read_file_definition() -> ToolDefinition {
    ToolDefinition::new(READ_FILE, "Read file contents")
        .with_parameter(ToolParameter::new("path", "file path to read", true).with_type("path"))
        .with_parameter(
            ToolParameter::new("offset", "start line number, 1-based (default: 1)", false)
                .with_type("number"),
        )
        .with_parameter(
            ToolParameter::new("limit", "max lines to read (default: 2000)", false)
                .with_type("number"),
        )
}

/// Get the tool definition for write_file
pub fn write_file_definition() -> ToolDefinition {
    ToolDefinition::new(WRITE_FILE, "Write content to file")
        .with_parameter(ToolParameter::new("path", "file path to write", true).with_type("path"))
        .with_parameter(ToolParameter::new("content", "content to write", false))
        .with_parameter(ToolParameter::new(
            "mode",
            "'append' or 'overwrite' (default)",
            false,
        ))
}

/// Get the tool definition for list_dir
pub fn list_dir_definition() -> ToolDefinition {
    ToolDefinition::new(LIST_DIR, "List directory contents").with_parameter(
        ToolParameter::new("path", "directory path to list (default: root)", false)
            .with_type("path"),
    )
}

pub struct ReadFileTool {
    definition: ToolDefinition,
    sandbox: PathSandbox,
}

impl ReadFileTool {
    pub fn new(sandbox: PathSandbox) -> Self {
        Self {
            definition: read_file_definition(),
            sandbox,
        }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, ctx: &ToolContext) -> ToolResult {
        let path_str = ctx.arguments.get_string("path").unwrap_or_default();
        let offset = ctx
            .arguments
            .get_i64("offset")
            .filter(|v| *v >= 1)
            .map_or(1, |v| v as usize);
        let limit = ctx
            .arguments
            .get_i64("limit")
            .filter(|v| *v >= 1)
            .map_or(MAX_LINES, |v| (v as usize).min(MAX_LINES));

        // Absolute paths may also reach the secondary read roots
        let path = match self.sandbox.confine_read(path_str) {
            Ok(p) => p,
            Err(e) => return ToolResult::failure(READ_FILE, e.into()),
        };

        let file = match tokio::fs::File::open(&path).await {
            Ok(f) => f,
            Err(e) => return ToolResult::failure(READ_FILE, io_error(path_str, e)),
        };
        let page = match read_page(BufReader::new(file), offset, limit).await {
            Ok(page) => page,
            Err(e) => return ToolResult::failure(READ_FILE, io_error(path_str, e)),
        };

        ToolResult::success(READ_FILE, page.render(offset)).with_metadata(ToolResultMetadata {
            bytes: Some(page.bytes),
            path: Some(path.display().to_string()),
            ..Default::default()
        })
    }
}

/// One window of a file's lines
struct Page {
    lines: Vec<String>,
    bytes: usize,
    total_lines: usize,
    truncated: bool,
}

impl Page {
    fn render(&self, offset: usize) -> String {
        let mut output = self.lines.join("\n");
        if output.is_empty() {
            output = EMPTY.to_string();
        }
        if self.truncated {
            output.push_str(&format!(
                "\n[truncated, {} total lines, use offset={} to continue]",
                self.total_lines,
                offset + self.lines.len()
            ));
        }
        output
    }
}

/// Take up to `limit` lines starting at 1-based `offset`, stopping early
/// once the byte cap is reached. Lines past the window are counted, not kept.
async fn read_page<R>(mut reader: R, offset: usize, limit: usize) -> io::Result<Page>
where
    R: AsyncBufRead + Unpin,
{
    let mut page = Page {
        lines: Vec::new(),
        bytes: 0,
        total_lines: 0,
        truncated: false,
    };
    let mut byte_count = 0;

    while let Some(line) = next_line(&mut reader, MAX_BYTES + 1).await? {
        page.total_lines += 1;
        if page.total_lines < offset || page.truncated {
            continue;
        }
        if page.lines.len() >= limit {
            page.truncated = true;
            continue;
        }
        byte_count += line.len + 1;
        if byte_count > MAX_BYTES {
            page.truncated = true;
            continue;
        }
        page.bytes += line.len;
        page.lines.push(String::from_utf8_lossy(&line.kept).into_owned());
    }

    Ok(page)
}

/// A line with its terminator stripped; `kept` holds at most the requested cap.
struct Line {
    kept: Vec<u8>,
    len: usize,
}

/// Read the next line, retaining at most `cap` bytes of it. `None` at EOF.
async fn next_line<R>(reader: &mut R, cap: usize) -> io::Result<Option<Line>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Line {
        kept: Vec::new(),
        len: 0,
    };
    let mut seen = false;

    loop {
        let (done, used) = {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                break;
            }
            seen = true;
            let (chunk, done) = match available.iter().position(|&b| b == b'\n') {
                Some(i) => (&available[..i], true),
                None => (available, false),
            };
            let room = cap.saturating_sub(line.kept.len());
            line.kept.extend_from_slice(&chunk[..chunk.len().min(room)]);
            line.len += chunk.len();
            (done, chunk.len() + usize::from(done))
        };
        reader.consume(used);
        if done {
            break;
        }
    }

    if !seen {
        return Ok(None);
    }
    if line.kept.len() == line.len && line.kept.last() == Some(&b'\r') {
        line.kept.pop();
        line.len -= 1;
    }
    Ok(Some(line))
}

pub struct WriteFileTool {
    definition: ToolDefinition,
    sandbox: PathSandbox,
}

impl WriteFileTool {
    pub fn new(sandbox: PathSandbox) -> Self {
        Self {
            definition: write_file_definition(),
            sandbox,
        }
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn validate(&self, args: &ToolArguments) -> Result<(), ToolError> {
        DefaultToolValidator
            .validate(args, &self.definition)
            .map_err(ToolError::validation_failed)?;
        match args.get_string("mode") {
            None | Some("overwrite") | Some("append") => Ok(()),
            Some(other) => Err(ToolError::validation_failed(format!(
                "mode must be 'overwrite' or 'append', got '{}'",
                other
            ))),
        }
    }

    async fn execute(&self, ctx: &ToolContext) -> ToolResult {
        let path_str = ctx.arguments.get_string("path").unwrap_or_default();
        let content = ctx.arguments.get_string("content").unwrap_or_default();
        let append = ctx.arguments.get_string("mode") == Some("append");

        let path = match self.sandbox.confine(path_str) {
            Ok(p) => p,
            Err(e) => return ToolResult::failure(WRITE_FILE, e.into()),
        };

        if let Some(parent) = path.parent()
            && let Err(e) = tokio::fs::create_dir_all(parent).await
        {
            return ToolResult::failure(WRITE_FILE, io_error(path_str, e));
        }

        let written = if append {
            append_to(&path, content).await
        } else {
            tokio::fs::write(&path, content).await
        };
        if let Err(e) = written {
            return ToolResult::failure(WRITE_FILE, io_error(path_str, e));
        }

        let verb = if append { "Appended" } else { "Wrote" };
        ToolResult::success(
            WRITE_FILE,
            format!("{} {} bytes to {}", verb, content.len(), path_str),
        )
        .with_metadata(ToolResultMetadata {
            bytes: Some(content.len()),
            path: Some(path.display().to_string()),
            ..Default::default()
        })
    }
}

async fn append_to(path: &std::path::Path, content: &str) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(content.as_bytes()).await?;
    file.flush().await
}

pub struct ListDirTool {
    definition: ToolDefinition,
    sandbox: PathSandbox,
}

impl ListDirTool {
    pub fn new(sandbox: PathSandbox) -> Self {
        Self {
            definition: list_dir_definition(),
            sandbox,
        }
    }
}

#[async_trait]
impl Tool for ListDirTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, ctx: &ToolContext) -> ToolResult {
        let path_str = ctx
            .arguments
            .get_string("path")
            .filter(|p| !p.is_empty())
            .unwrap_or(".");

        let path = match self.sandbox.confine(path_str) {
            Ok(p) => p,
            Err(e) => return ToolResult::failure(LIST_DIR, e.into()),
        };

        let mut entries = match tokio::fs::read_dir(&path).await {
            Ok(entries) => entries,
            Err(e) => return ToolResult::failure(LIST_DIR, io_error(path_str, e)),
        };

        let mut names = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let mut name = entry.file_name().to_string_lossy().into_owned();
                    if entry.file_type().await.is_ok_and(|t| t.is_dir()) {
                        name.push('/');
                    }
                    names.push(name);
                }
                Ok(None) => break,
                Err(e) => return ToolResult::failure(LIST_DIR, io_error(path_str, e)),
            }
        }
        names.sort();

        let count = names.len();
        let output = if names.is_empty() {
            EMPTY.to_string()
        } else {
            names.join("\n")
        };
        ToolResult::success(LIST_DIR, output).with_metadata(ToolResultMetadata {
            match_count: Some(count),
            path: Some(path.display().to_string()),
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

    fn context(dir: &TempDir, args: ToolArguments) -> ToolContext {
        ToolContext::new(args, Arc::new(EngineConfig::new(dir.path())))
    }

    fn sandbox(dir: &TempDir) -> PathSandbox {
        PathSandbox::new(dir.path())
    }

    #[tokio::test]
    async fn test_read_file_success() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("hello.txt"), "Hello, World!\n").unwrap();

        let tool = ReadFileTool::new(sandbox(&dir));
        let result = tool
            .execute(&context(&dir, ToolArguments::new().with("path", "hello.txt")))
            .await;

        assert!(result.is_success());
        assert_eq!(result.output(), "Hello, World!");
    }

    #[tokio::test]
    async fn test_read_file_offset_and_limit() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("lines.txt"), "line1\nline2\nline3\nline4\nline5\n").unwrap();

        let tool = ReadFileTool::new(sandbox(&dir));
        let args = ToolArguments::new()
            .with("path", "lines.txt")
            .with("offset", 2)
            .with("limit", 2);
        let result = tool.execute(&context(&dir, args)).await;

        assert_eq!(
            result.output(),
            "line2\nline3\n[truncated, 5 total lines, use offset=4 to continue]"
        );
    }

    #[tokio::test]
    async fn test_read_file_last_page_not_truncated() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("lines.txt"), "a\nb\nc").unwrap();

        let tool = ReadFileTool::new(sandbox(&dir));
        let args = ToolArguments::new().with("path", "lines.txt").with("offset", 2);
        let result = tool.execute(&context(&dir, args)).await;

        assert_eq!(result.output(), "b\nc");
    }

    #[tokio::test]
    async fn test_read_empty_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("empty.txt"), "").unwrap();

        let tool = ReadFileTool::new(sandbox(&dir));
        let result = tool
            .execute(&context(&dir, ToolArguments::new().with("path", "empty.txt")))
            .await;

        assert_eq!(result.output(), EMPTY);
    }

    #[tokio::test]
    async fn test_byte_cap_truncates() {
        let line = "x".repeat(1024);
        let content = vec![line.as_str(); 100].join("\n");

        let page = read_page(content.as_bytes(), 1, MAX_LINES).await.unwrap();

        assert!(page.truncated);
        assert_eq!(page.lines.len(), 49);
        assert!(page.render(1).ends_with("[truncated, 100 total lines, use offset=50 to continue]"));
    }

    #[tokio::test]
    async fn test_read_file_large_file_keeps_only_the_window() {
        let dir = tempdir().unwrap();
        let line = "y".repeat(999);
        let mut content = String::new();
        for _ in 0..5000 {
            content.push_str(&line);
            content.push('\n');
        }
        fs::write(dir.path().join("big.txt"), &content).unwrap();

        let tool = ReadFileTool::new(sandbox(&dir));
        let result = tool
            .execute(&context(&dir, ToolArguments::new().with("path", "big.txt")))
            .await;

        assert!(result.is_success());
        assert!(result.metadata().bytes.unwrap() <= MAX_BYTES);
        assert!(result.output().len() < MAX_BYTES + 128);
        assert!(result.output().ends_with("[truncated, 5000 total lines, use offset=52 to continue]"));
    }

    #[tokio::test]
    async fn test_read_page_single_oversized_line() {
        let content = format!("{}\nshort\n", "z".repeat(MAX_BYTES * 3));

        let page = read_page(content.as_bytes(), 1, MAX_LINES).await.unwrap();

        assert!(page.lines.is_empty());
        assert_eq!(page.total_lines, 2);
        assert!(page.truncated);
    }

    #[tokio::test]
    async fn test_next_line_strips_crlf_and_handles_missing_newline() {
        let mut reader: &[u8] = b"one\r\ntwo";

        let first = next_line(&mut reader, 100).await.unwrap().unwrap();
        assert_eq!(first.kept, b"one");
        let second = next_line(&mut reader, 100).await.unwrap().unwrap();
        assert_eq!(second.kept, b"two");
        assert!(next_line(&mut reader, 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_file_outside_sandbox() {
        let dir = tempdir().unwrap();
        let tool = ReadFileTool::new(sandbox(&dir));

        let result = tool
            .execute(&context(&dir, ToolArguments::new().with("path", "../../etc/passwd")))
            .await;

        assert_eq!(result.error().unwrap().kind, ErrorKind::OutsideSandbox);
    }

    #[tokio::test]
    async fn test_read_file_secondary_root() {
        let dir = tempdir().unwrap();
        let extra = tempdir().unwrap();
        let skill = extra.path().join("skill.md");
        fs::write(&skill, "# skill").unwrap();

        let tool = ReadFileTool::new(
            PathSandbox::new(dir.path()).with_read_roots(vec![extra.path().to_path_buf()]),
        );
        let args = ToolArguments::new().with("path", skill.to_str().unwrap());
        let result = tool.execute(&context(&dir, args)).await;

        assert_eq!(result.output(), "# skill");
    }

    #[tokio::test]
    async fn test_read_file_missing() {
        let dir = tempdir().unwrap();
        let tool = ReadFileTool::new(sandbox(&dir));

        let result = tool
            .execute(&context(&dir, ToolArguments::new().with("path", "nope.txt")))
            .await;

        assert_eq!(result.error().unwrap().kind, ErrorKind::IoFailure);
    }

    #[tokio::test]
    async fn test_write_file_creates_parents() {
        let dir = tempdir().unwrap();
        let tool = WriteFileTool::new(sandbox(&dir));

        let args = ToolArguments::new()
            .with("path", "sub/dir/test.txt")
            .with("content", "Hello");
        let result = tool.execute(&context(&dir, args)).await;

        assert!(result.is_success());
        assert_eq!(fs::read_to_string(dir.path().join("sub/dir/test.txt")).unwrap(), "Hello");
    }

    #[tokio::test]
    async fn test_write_file_append() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("log.txt"), "one\n").unwrap();
        let tool = WriteFileTool::new(sandbox(&dir));

        let args = ToolArguments::new()
            .with("path", "log.txt")
            .with("content", "two\n")
            .with("mode", "append");
        let result = tool.execute(&context(&dir, args)).await;

        assert!(result.output().starts_with("Appended 4 bytes"));
        assert_eq!(fs::read_to_string(dir.path().join("log.txt")).unwrap(), "one\ntwo\n");
    }

    #[tokio::test]
    async fn test_write_file_rejects_escape() {
        let dir = tempdir().unwrap();
        let tool = WriteFileTool::new(sandbox(&dir));

        let args = ToolArguments::new().with("path", "../escape.txt").with("content", "x");
        let result = tool.execute(&context(&dir, args)).await;

        assert_eq!(result.error().unwrap().kind, ErrorKind::OutsideSandbox);
        assert!(!dir.path().parent().unwrap().join("escape.txt").exists());
    }

    #[tokio::test]
    async fn test_write_file_rejects_unknown_mode() {
        let dir = tempdir().unwrap();
        let tool = WriteFileTool::new(sandbox(&dir));

        let args = ToolArguments::new().with("path", "a.txt").with("mode", "truncate");
        let err = tool.validate(&args).await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::ValidationFailed);
    }

    #[tokio::test]
    async fn test_list_dir_sorted_with_suffix() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "").unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();

        let tool = ListDirTool::new(sandbox(&dir));
        let result = tool.execute(&context(&dir, ToolArguments::new())).await;

        assert_eq!(result.output(), "a.txt\nb.txt\nsrc/");
    }

    #[tokio::test]
    async fn test_list_dir_empty() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("void")).unwrap();

        let tool = ListDirTool::new(sandbox(&dir));
        let result = tool
            .execute(&context(&dir, ToolArguments::new().with("path", "void")))
            .await;

        assert_eq!(result.output(), EMPTY);
    }
}
