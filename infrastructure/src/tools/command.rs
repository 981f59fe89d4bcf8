//! Command execution tool: exec_cmd
//!
//! Commands run through `sh -c` with the sandbox root as working directory.
//! Each command gets its own process group; when the call ends (normally,
//! by timeout, or because the dispatcher dropped it) the whole group is
//! killed so no background job outlives the call.

use crate::security::PathSandbox;
use async_trait::async_trait;
use openlink_domain::security::CommandGuard;
use openlink_domain::tool::{
    entities::{ToolArguments, ToolDefinition, ToolParameter},
    traits::{Tool, ToolContext},
    value_objects::{ToolError, ToolResult, ToolResultMetadata},
};
use openlink_domain::util::truncate_str;
use std::io;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, warn};

/// Tool name constant
pub const EXEC_CMD: &str = "exec_cmd";

/// Maximum output size (50 KiB)
const MAX_OUTPUT_SIZE: usize = 50 * 1024;

/// Get the tool definition for exec_cmd
pub fn exec_cmd_definition() -> ToolDefinition {
    ToolDefinition::new(EXEC_CMD, "Execute shell command in sandbox").with_parameter(
        ToolParameter::new("command", "shell command to execute (alias: cmd)", true),
    )
}

/// The command string, accepting `cmd` as an alias for `command`.
fn command_arg(args: &ToolArguments) -> Option<&str> {
    args.get_string("command")
        .filter(|c| !c.is_empty())
        .or_else(|| args.get_string("cmd"))
        .filter(|c| !c.is_empty())
}

pub struct ExecCmdTool {
    definition: ToolDefinition,
    sandbox: PathSandbox,
}

impl ExecCmdTool {
    pub fn new(sandbox: PathSandbox) -> Self {
        Self {
            definition: exec_cmd_definition(),
            sandbox,
        }
    }
}

#[async_trait]
impl Tool for ExecCmdTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn validate(&self, args: &ToolArguments) -> Result<(), ToolError> {
        let command =
            command_arg(args).ok_or_else(|| ToolError::validation_failed("command is required"))?;
        CommandGuard::check(command).map_err(|e| ToolError::validation_failed(e.to_string()))
    }

    async fn execute(&self, ctx: &ToolContext) -> ToolResult {
        let Some(command) = command_arg(&ctx.arguments) else {
            return ToolResult::failure(EXEC_CMD, ToolError::validation_failed("command is required"));
        };
        let timeout = ctx.config.timeout();

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .current_dir(self.sandbox.root())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = match cmd.spawn() {
            Ok(c) => c,
            Err(e) => {
                return ToolResult::failure(
                    EXEC_CMD,
                    ToolError::io_failure(format!("failed to spawn command: {}", e)),
                );
            }
        };
        let _group = ProcessGroupGuard(child.id());
        debug!(command = %command, pid = ?child.id(), "Command spawned");

        // Both pipes drain concurrently so neither side blocks on a full pipe
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let run = async {
            let (out, err, status) = tokio::join!(
                read_capped(stdout, MAX_OUTPUT_SIZE),
                read_capped(stderr, MAX_OUTPUT_SIZE),
                child.wait()
            );
            Ok::<_, io::Error>((out?, err?, status?))
        };

        let (out, err, status) = match tokio::time::timeout(timeout, run).await {
            Ok(Ok(finished)) => finished,
            Ok(Err(e)) => {
                return ToolResult::failure(
                    EXEC_CMD,
                    ToolError::io_failure(format!("failed to wait for command: {}", e)),
                );
            }
            Err(_) => {
                warn!(command = %command, timeout_secs = timeout.as_secs(), "Command timed out");
                return ToolResult::failure(
                    EXEC_CMD,
                    ToolError::timeout(format!("execution timeout after {}s", timeout.as_secs())),
                );
            }
        };

        let total = out.total + err.total;
        let combined = combine_output(&out.kept, &err.kept);
        let kept = truncate_str(&combined, MAX_OUTPUT_SIZE);
        let body = if kept.is_empty() { "empty" } else { kept };
        let mut rendered = format!("Command: {}\n\n{}", command, body);
        if total > kept.len() || kept.len() < combined.len() {
            debug!(command = %command, total_bytes = total, "Command output capped");
            rendered.push_str(&format!(
                "\n\n[truncated at {} bytes, total: {} bytes]",
                MAX_OUTPUT_SIZE, total
            ));
        }
        let exit_code = status.code();
        let metadata = ToolResultMetadata {
            bytes: Some(kept.len()),
            exit_code,
            ..Default::default()
        };

        if status.success() {
            ToolResult::success(EXEC_CMD, rendered).with_metadata(metadata)
        } else {
            ToolResult::failure(
                EXEC_CMD,
                ToolError::io_failure(format!("command failed: {}", status)),
            )
            .with_output(rendered)
            .with_metadata(metadata)
        }
    }
}

/// Bytes kept from one stream, plus how many it produced in total.
#[derive(Default)]
struct Captured {
    kept: Vec<u8>,
    total: usize,
}

/// Read `reader` to EOF, keeping at most `cap` bytes and discarding the rest.
async fn read_capped<R>(reader: Option<R>, cap: usize) -> io::Result<Captured>
where
    R: AsyncRead + Unpin,
{
    let mut captured = Captured::default();
    let Some(mut reader) = reader else {
        return Ok(captured);
    };

    let mut chunk = [0u8; 8192];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        let room = cap.saturating_sub(captured.kept.len());
        captured.kept.extend_from_slice(&chunk[..n.min(room)]);
        captured.total += n;
    }
    Ok(captured)
}

/// Stdout first, then stderr.
fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
    let mut combined = String::from_utf8_lossy(stdout).into_owned();
    if !stderr.is_empty() {
        if !combined.is_empty() && !combined.ends_with('\n') {
            combined.push('\n');
        }
        combined.push_str(&String::from_utf8_lossy(stderr));
    }
    combined
}

/// Kills the command's process group when dropped.
struct ProcessGroupGuard(Option<u32>);

impl Drop for ProcessGroupGuard {
    fn drop(&mut self) {
        if let Some(pgid) = self.0 {
            kill_process_group(pgid);
        }
    }
}

#[cfg(unix)]
fn kill_process_group(pgid: u32) {
    // SAFETY: killpg has no memory-safety preconditions; a stale or
    // already-empty group only yields ESRCH.
    unsafe {
        libc::killpg(pgid as libc::pid_t, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pgid: u32) {}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use openlink_domain::config::EngineConfig;
    use openlink_domain::tool::value_objects::ErrorKind;
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use tempfile::{TempDir, tempdir};

    fn tool(dir: &TempDir) -> ExecCmdTool {
        ExecCmdTool::new(PathSandbox::new(dir.path()))
    }

    fn context(dir: &TempDir, command: &str, timeout: Duration) -> ToolContext {
        ToolContext::new(
            ToolArguments::new().with("command", command),
            Arc::new(EngineConfig::new(dir.path()).with_timeout(timeout)),
        )
    }

    #[tokio::test]
    async fn test_exec_echo() {
        let dir = tempdir().unwrap();
        let result = tool(&dir)
            .execute(&context(&dir, "echo hello", Duration::from_secs(10)))
            .await;

        assert!(result.is_success());
        assert_eq!(result.output(), "Command: echo hello\n\nhello\n");
        assert_eq!(result.metadata().exit_code, Some(0));
    }

    #[tokio::test]
    async fn test_exec_runs_in_sandbox_root() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "").unwrap();

        let result = tool(&dir)
            .execute(&context(&dir, "ls", Duration::from_secs(10)))
            .await;

        assert!(result.output().contains("marker.txt"));
    }

    #[tokio::test]
    async fn test_exec_empty_output() {
        let dir = tempdir().unwrap();
        let result = tool(&dir)
            .execute(&context(&dir, "true", Duration::from_secs(10)))
            .await;

        assert_eq!(result.output(), "Command: true\n\nempty");
    }

    #[tokio::test]
    async fn test_exec_nonzero_exit_keeps_output() {
        let dir = tempdir().unwrap();
        let result = tool(&dir)
            .execute(&context(&dir, "echo oops >&2; exit 3", Duration::from_secs(10)))
            .await;

        assert_eq!(result.error().unwrap().kind, ErrorKind::IoFailure);
        assert!(result.output().contains("oops"));
        assert_eq!(result.metadata().exit_code, Some(3));
    }

    #[tokio::test]
    async fn test_exec_timeout_kills_group() {
        let dir = tempdir().unwrap();
        let command = "(sleep 2; touch late.txt) & sleep 30";

        let start = Instant::now();
        let result = tool(&dir)
            .execute(&context(&dir, command, Duration::from_secs(1)))
            .await;

        assert_eq!(result.error().unwrap().kind, ErrorKind::ExecutionTimeout);
        assert!(result.error().unwrap().message.contains("execution timeout after 1s"));
        assert!(start.elapsed() < Duration::from_secs(3));

        // The background job died with its group
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!dir.path().join("late.txt").exists());
    }

    #[tokio::test]
    async fn test_exec_large_output_is_capped_while_streaming() {
        let dir = tempdir().unwrap();
        let command = "head -c 3000000 /dev/zero | tr '\\0' a";
        let result = tool(&dir)
            .execute(&context(&dir, command, Duration::from_secs(30)))
            .await;

        assert!(result.is_success());
        assert!(result.metadata().bytes.unwrap() <= MAX_OUTPUT_SIZE);
        assert!(result.output().ends_with("[truncated at 51200 bytes, total: 3000000 bytes]"));
        assert!(result.output().len() < MAX_OUTPUT_SIZE + 256);
    }

    #[tokio::test]
    async fn test_read_capped_drains_past_cap() {
        let data = vec![b'x'; 20_000];
        let captured = read_capped(Some(data.as_slice()), 100).await.unwrap();

        assert_eq!(captured.kept.len(), 100);
        assert_eq!(captured.total, 20_000);

        let none = read_capped(None::<&[u8]>, 100).await.unwrap();
        assert_eq!(none.total, 0);
    }

    #[tokio::test]
    async fn test_validate_blocks_dangerous() {
        let dir = tempdir().unwrap();
        let tool = tool(&dir);

        let err = tool
            .validate(&ToolArguments::new().with("command", "rm -rf /"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValidationFailed);
        assert!(err.message.contains("dangerous command"));

        assert!(tool.validate(&ToolArguments::new().with("cmd", "ls -la")).await.is_ok());
        assert!(tool.validate(&ToolArguments::new()).await.is_err());
    }

    #[test]
    fn test_combine_output() {
        assert_eq!(combine_output(b"out", b"err"), "out\nerr");
        assert_eq!(combine_output(b"", b"err"), "err");
        assert_eq!(combine_output(b"out\n", b""), "out\n");
    }
}
