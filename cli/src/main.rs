//! CLI entrypoint for openlink
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result};
use clap::Parser;
use openlink_application::{
    CallCountInterceptor, DispatchLogger, NoDispatchLogger, ToolDispatcher, ToolExecutorPort,
};
use openlink_domain::tool::entities::{ToolArguments, ToolCall};
use openlink_infrastructure::{
    ConfigLoader, ConfigOverrides, FileConfig, FileInstructionSource, JsonlDispatchLogger,
    Settings, builtin_registry,
};
use openlink_presentation::{Cli, Command, ConsoleFormatter, StdioServer, formatter_for};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level; RUST_LOG wins when set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    });

    // stdout carries envelopes only
    let (writer, _log_guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(writer)
        .init();

    // === Configuration ===
    let overrides = ConfigOverrides {
        root_dir: cli.dir.clone(),
        port: cli.port,
        timeout_seconds: cli.timeout,
    };
    let file_config = if cli.no_config {
        ConfigLoader::load_defaults(&overrides)?
    } else {
        ConfigLoader::load(cli.config.as_deref(), &overrides)?
    };
    let settings_token = if cli.no_config {
        None
    } else {
        Settings::load_token()?
    };
    let engine = Arc::new(file_config.engine.to_engine_config(settings_token)?);
    let interceptor = file_config.interceptor.to_interceptor_config()?;

    info!(root = %engine.root_dir().display(), timeout_secs = engine.timeout().as_secs(), "Starting openlink");

    if cli.command == Command::Config {
        print!("{}", ConsoleFormatter::format_config(&engine, &interceptor));
        let sources = ConfigLoader::sources(cli.config.as_deref());
        print!(
            "{}",
            ConsoleFormatter::format_sources(
                sources
                    .iter()
                    .map(|s| (s.label, s.path.as_path(), s.found))
            )
        );
        return Ok(ExitCode::SUCCESS);
    }

    // === Dependency Injection ===
    let registry = Arc::new(builtin_registry(&engine).context("failed to register tools")?);
    let dispatcher = ToolDispatcher::new(registry, engine.clone())
        .with_dispatch_logger(audit_logger(&file_config));
    let source = Arc::new(FileInstructionSource::new(
        engine.root_dir(),
        &file_config.interceptor.prompt_file,
    ));
    let executor: Arc<dyn ToolExecutorPort> = Arc::new(CallCountInterceptor::new(
        Arc::new(dispatcher),
        source,
        interceptor,
    ));

    let formatter = formatter_for(cli.output);
    match cli.command {
        Command::Tools => {
            println!("{}", formatter.format_tools(&executor.list_tools()));
            Ok(ExitCode::SUCCESS)
        }
        Command::Exec { name, args, reason } => {
            let arguments: ToolArguments = match args.as_deref() {
                Some(json) => serde_json::from_str(json).context("--args must be a JSON object")?,
                None => ToolArguments::new(),
            };
            let mut call = ToolCall::new(name);
            call.arguments = arguments;
            call.reasoning = reason;

            let result = executor.dispatch(call).await;
            println!("{}", formatter.format_response(&result.to_response()).trim_end());
            Ok(if result.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Stdio => {
            let answered = StdioServer::new(executor).run().await?;
            info!(requests = answered, "Input closed");
            Ok(ExitCode::SUCCESS)
        }
        Command::Config => Ok(ExitCode::SUCCESS),
    }
}

/// JSONL audit logger when `[logging] audit_log` is set.
fn audit_logger(config: &FileConfig) -> Arc<dyn DispatchLogger> {
    match config.logging.audit_log.as_deref().map(JsonlDispatchLogger::new) {
        Some(Some(logger)) => {
            info!(path = %logger.path().display(), "Dispatch audit log enabled");
            Arc::new(logger)
        }
        Some(None) => {
            warn!("Dispatch audit log disabled: log file could not be opened");
            Arc::new(NoDispatchLogger)
        }
        None => Arc::new(NoDispatchLogger),
    }
}
