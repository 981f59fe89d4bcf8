//! Call-count interceptor.
//!
//! Wraps another [`ToolExecutorPort`] and decorates the output of every
//! executed call: most calls get a short identity reminder, and every N-th
//! call gets the full instruction text instead. The counter is the only
//! state shared across dispatches.
//!
//! Calls rejected before execution (unknown tool, failed validation) pass
//! through undecorated and do not advance the counter.

use crate::config::InterceptorConfig;
use crate::ports::instruction_source::InstructionSource;
use crate::ports::tool_executor::ToolExecutorPort;
use async_trait::async_trait;
use openlink_domain::tool::entities::{ToolCall, ToolDescriptor};
use openlink_domain::tool::value_objects::ToolResult;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

const REINJECT_HEADER: &str = "\n\n[Instructions re-injected]\n";

pub struct CallCountInterceptor {
    inner: Arc<dyn ToolExecutorPort>,
    source: Arc<dyn InstructionSource>,
    config: InterceptorConfig,
    calls: AtomicU64,
}

impl CallCountInterceptor {
    pub fn new(
        inner: Arc<dyn ToolExecutorPort>,
        source: Arc<dyn InstructionSource>,
        config: InterceptorConfig,
    ) -> Self {
        Self {
            inner,
            source,
            config,
            calls: AtomicU64::new(0),
        }
    }

    /// Number of decorated calls so far
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    fn decoration(&self, n: u64) -> Option<String> {
        let every = self.config.reinject_every;
        if every > 0 && n % every == 0 {
            // A missing prompt file means nothing is appended on this call
            let instructions = self.source.load()?;
            debug!(call = n, "Re-injecting instructions");
            Some(format!("{}{}", REINJECT_HEADER, instructions))
        } else {
            Some(format!("\n\n{}", self.config.reminder))
        }
    }
}

#[async_trait]
impl ToolExecutorPort for CallCountInterceptor {
    fn list_tools(&self) -> Vec<ToolDescriptor> {
        self.inner.list_tools()
    }

    fn has_tool(&self, name: &str) -> bool {
        self.inner.has_tool(name)
    }

    async fn dispatch(&self, call: ToolCall) -> ToolResult {
        let result = self.inner.dispatch(call).await;
        if !self.config.enabled || result.was_rejected() {
            return result;
        }

        let n = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        match self.decoration(n) {
            Some(suffix) => result.with_appended_output(&suffix),
            None => result,
        }
    }
}
