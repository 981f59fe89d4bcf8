//! JSON-lines request loop
//!
//! Each input line is one tool call (`{"name": ..., "args": {...}}`); each
//! produces exactly one envelope line on the output, in input order.

use openlink_application::ports::tool_executor::ToolExecutorPort;
use openlink_domain::tool::{entities::ToolCall, value_objects::ToolResponse};
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// Serves tool calls read line by line
pub struct StdioServer {
    executor: Arc<dyn ToolExecutorPort>,
}

impl StdioServer {
    pub fn new(executor: Arc<dyn ToolExecutorPort>) -> Self {
        Self { executor }
    }

    /// Serve process stdin/stdout until EOF
    pub async fn run(&self) -> io::Result<usize> {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        self.serve(stdin, tokio::io::stdout()).await
    }

    /// Serve until the reader reaches EOF. Returns the number of requests answered.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> io::Result<usize>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();
        let mut answered = 0;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            // A line that is not UTF-8 is a bad request, not a broken stream
            let response = match std::str::from_utf8(&buf) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    self.answer(line).await
                }
                Err(e) => {
                    warn!(error = %e, "Request is not valid UTF-8");
                    ToolResponse::rejected(format!("invalid request: {}", e))
                }
            };

            let mut encoded = serde_json::to_string(&response).map_err(io::Error::other)?;
            encoded.push('\n');
            writer.write_all(encoded.as_bytes()).await?;
            writer.flush().await?;
            answered += 1;
        }

        Ok(answered)
    }

    async fn answer(&self, line: &str) -> ToolResponse {
        match serde_json::from_str::<ToolCall>(line) {
            Ok(call) => {
                debug!(tool = %call.tool_name, "Request received");
                self.executor.dispatch(call).await.to_response()
            }
            Err(e) => {
                warn!(error = %e, "Malformed request");
                ToolResponse::rejected(format!("invalid request: {}", e))
            }
        }
    }
}
