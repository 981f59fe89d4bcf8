//! Dispatch use case.
//!
//! [`ToolDispatcher`] turns a [`ToolCall`] into exactly one [`ToolResult`]:
//! lookup, validation, bounded execution, packaging. Nothing that goes wrong
//! inside a tool escapes as a panic or a hung future.

use crate::ports::dispatch_logger::{DispatchEvent, DispatchLogger, NoDispatchLogger};
use crate::ports::tool_executor::ToolExecutorPort;
use crate::use_cases::tool_helpers::tool_args_preview;
use async_trait::async_trait;
use chrono::Utc;
use openlink_domain::config::EngineConfig;
use openlink_domain::tool::entities::{ToolCall, ToolDescriptor};
use openlink_domain::tool::registry::ToolRegistry;
use openlink_domain::tool::traits::ToolContext;
use openlink_domain::tool::value_objects::{ToolError, ToolResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Extra time granted beyond the engine timeout before the dispatcher
/// abandons a tool. Tools that spawn subprocesses enforce the engine timeout
/// themselves and need a moment to kill and reap.
pub const DEFAULT_GRACE: Duration = Duration::from_secs(2);

/// Dispatcher over a populated [`ToolRegistry`].
pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
    config: Arc<EngineConfig>,
    grace: Duration,
    dispatch_logger: Arc<dyn DispatchLogger>,
}

impl ToolDispatcher {
    pub fn new(registry: Arc<ToolRegistry>, config: Arc<EngineConfig>) -> Self {
        Self {
            registry,
            config,
            grace: DEFAULT_GRACE,
            dispatch_logger: Arc::new(NoDispatchLogger),
        }
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn with_dispatch_logger(mut self, logger: Arc<dyn DispatchLogger>) -> Self {
        self.dispatch_logger = logger;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn deadline(&self) -> Duration {
        self.config.timeout() + self.grace
    }

    async fn run(&self, call: &ToolCall) -> ToolResult {
        let Some(tool) = self.registry.lookup(&call.tool_name) else {
            debug!(tool = %call.tool_name, "Unknown tool requested");
            return ToolResult::rejected(
                &call.tool_name,
                ToolError::unknown_tool(&call.tool_name, &self.registry.names()),
            );
        };
        let name = tool.name().to_string();
        debug!(tool = %name, requested = %call.tool_name, "Tool resolved");

        let ctx = ToolContext::new(call.arguments.clone(), Arc::clone(&self.config))
            .with_reason(call.reasoning.clone());

        // Validation and execution share one task so a panic in either is
        // caught by the join handle.
        let task_tool = Arc::clone(&tool);
        let mut handle = tokio::spawn(async move {
            if let Err(e) = task_tool.validate(&ctx.arguments).await {
                debug!(tool = %task_tool.name(), error = %e, "Validation rejected call");
                return ToolResult::rejected(task_tool.name(), e);
            }
            task_tool.execute(&ctx).await
        });

        let deadline = self.deadline();
        match tokio::time::timeout(deadline, &mut handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => {
                warn!(tool = %name, error = %join_error, "Tool task failed");
                ToolResult::failure(
                    &name,
                    ToolError::io_failure(format!("tool {} failed unexpectedly", name))
                        .with_details(join_error.to_string()),
                )
            }
            Err(_) => {
                handle.abort();
                warn!(tool = %name, timeout_secs = self.config.timeout().as_secs(), "Dispatch deadline exceeded");
                ToolResult::failure(
                    &name,
                    ToolError::timeout(format!(
                        "execution timeout after {}s",
                        self.config.timeout().as_secs()
                    )),
                )
            }
        }
    }
}

#[async_trait]
impl ToolExecutorPort for ToolDispatcher {
    fn list_tools(&self) -> Vec<ToolDescriptor> {
        self.registry.descriptors()
    }

    fn has_tool(&self, name: &str) -> bool {
        self.registry.lookup(name).is_some()
    }

    async fn dispatch(&self, call: ToolCall) -> ToolResult {
        let started_at = Utc::now();
        let result = self.run(&call).await.with_started_at(started_at);

        info!(
            tool = %call.tool_name,
            status = %result.status(),
            duration_ms = result.metadata().duration_ms.unwrap_or(0),
            "Dispatch complete"
        );
        self.dispatch_logger.log(DispatchEvent::from_result(
            &call.tool_name,
            &result,
            call.reasoning.clone(),
            tool_args_preview(&call),
        ));
        result
    }
}
