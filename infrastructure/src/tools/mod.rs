//! Built-in tool implementations
//!
//! Every tool confines its paths through a [`PathSandbox`] built from the
//! engine configuration, so a tool never sees a path outside the roots.
//!
//! - `file`: read_file, write_file, list_dir
//! - `search`: grep, glob
//! - `command`: exec_cmd
//! - `edit`: edit
//! - `web`: web_fetch (requires the `web-tools` feature)
//! - `interaction`: question, todo_write

pub mod command;
pub mod edit;
pub mod file;
pub mod interaction;
pub mod search;
#[cfg(feature = "web-tools")]
pub mod web;

use crate::security::PathSandbox;
use openlink_domain::config::EngineConfig;
use openlink_domain::tool::registry::{RegistryError, ToolRegistry};
use openlink_domain::tool::traits::Tool;
use openlink_domain::tool::value_objects::ToolError;
use std::sync::Arc;

/// I/O failure prefixed with the caller-facing path
pub(crate) fn io_error(path: &str, e: std::io::Error) -> ToolError {
    ToolError::io_failure(format!("{}: {}", path, e))
}

/// Build the registry holding every built-in tool.
pub fn builtin_registry(config: &EngineConfig) -> Result<ToolRegistry, RegistryError> {
    let sandbox = PathSandbox::from_config(config);
    let registry = ToolRegistry::new();

    let tools: Vec<Arc<dyn Tool>> = vec![
        Arc::new(file::ReadFileTool::new(sandbox.clone())),
        Arc::new(file::WriteFileTool::new(sandbox.clone())),
        Arc::new(file::ListDirTool::new(sandbox.clone())),
        Arc::new(search::GrepTool::new(sandbox.clone())),
        Arc::new(search::GlobTool::new(sandbox.clone())),
        Arc::new(command::ExecCmdTool::new(sandbox.clone())),
        Arc::new(edit::EditTool::new(sandbox.clone())),
        Arc::new(interaction::QuestionTool::new()),
        Arc::new(interaction::TodoWriteTool::new(sandbox)),
    ];
    for tool in tools {
        registry.register(tool)?;
    }

    #[cfg(feature = "web-tools")]
    registry.register(Arc::new(web::WebFetchTool::new(
        crate::security::NetworkGuard::new(),
    )))?;

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_builtin_registry_names() {
        let dir = tempdir().unwrap();
        let registry = builtin_registry(&EngineConfig::new(dir.path())).unwrap();
        let names = registry.names();

        for name in [
            file::READ_FILE,
            file::WRITE_FILE,
            file::LIST_DIR,
            search::GREP,
            search::GLOB,
            command::EXEC_CMD,
            edit::EDIT,
            interaction::QUESTION,
            interaction::TODO_WRITE,
        ] {
            assert!(names.iter().any(|n| n == name), "missing {}", name);
        }
        #[cfg(feature = "web-tools")]
        assert!(names.iter().any(|n| n == web::WEB_FETCH));
    }

    #[test]
    fn test_builtin_registry_rejects_reregistration() {
        let dir = tempdir().unwrap();
        let config = EngineConfig::new(dir.path());
        let registry = builtin_registry(&config).unwrap();

        let err = registry
            .register(Arc::new(edit::EditTool::new(PathSandbox::from_config(&config))))
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName("edit".to_string()));
    }

    #[test]
    fn test_io_error_prefixes_path() {
        let err = io_error("a.txt", std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(err.message.starts_with("a.txt: "));
    }
}
