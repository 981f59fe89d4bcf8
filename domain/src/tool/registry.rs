//! Name-keyed tool catalogue.
//!
//! Registration happens once at startup; afterwards the registry is only
//! read, concurrently, by every dispatch.

use super::entities::ToolDescriptor;
use super::traits::Tool;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("tool {0} already registered")]
    DuplicateName(String),
}

/// Registry mapping tool names to shared implementations
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its own name.
    ///
    /// A second registration of the same name fails; the first one stays.
    pub fn register(&self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let mut tools = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        let name = tool.name().to_string();
        if tools.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        tools.insert(name, tool);
        Ok(())
    }

    /// Look up by exact name, then by lowercased name.
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools
            .get(name)
            .or_else(|| tools.get(&name.to_lowercase()))
            .cloned()
    }

    /// Sorted list of registered names
    pub fn names(&self) -> Vec<String> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Static descriptors of every tool, sorted by name
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        let mut descriptors: Vec<ToolDescriptor> = tools.values().map(|t| t.descriptor()).collect();
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        descriptors
    }

    pub fn len(&self) -> usize {
        self.tools.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::entities::ToolDefinition;
    use crate::tool::traits::ToolContext;
    use crate::tool::value_objects::ToolResult;
    use async_trait::async_trait;

    struct NamedTool(ToolDefinition);

    impl NamedTool {
        fn arc(name: &str, description: &str) -> Arc<dyn Tool> {
            Arc::new(Self(ToolDefinition::new(name, description)))
        }
    }

    #[async_trait]
    impl Tool for NamedTool {
        fn definition(&self) -> &ToolDefinition {
            &self.0
        }

        async fn execute(&self, _ctx: &ToolContext) -> ToolResult {
            ToolResult::success(self.name(), self.description())
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = ToolRegistry::new();
        registry.register(NamedTool::arc("read_file", "Read")).unwrap();
        registry.register(NamedTool::arc("grep", "Search")).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup("grep").unwrap().name(), "grep");
        assert!(registry.lookup("unknown").is_none());
    }

    #[test]
    fn test_duplicate_registration_fails_and_keeps_first() {
        let registry = ToolRegistry::new();
        registry.register(NamedTool::arc("edit", "first")).unwrap();

        let err = registry.register(NamedTool::arc("edit", "second")).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName("edit".to_string()));
        assert_eq!(registry.lookup("edit").unwrap().description(), "first");
    }

    #[test]
    fn test_lookup_falls_back_to_lowercase() {
        let registry = ToolRegistry::new();
        registry.register(NamedTool::arc("list_dir", "List")).unwrap();

        assert_eq!(registry.lookup("LIST_DIR").unwrap().name(), "list_dir");
        assert_eq!(registry.lookup("List_Dir").unwrap().name(), "list_dir");
    }

    #[test]
    fn test_descriptors_sorted() {
        let registry = ToolRegistry::new();
        registry.register(NamedTool::arc("write_file", "Write")).unwrap();
        registry.register(NamedTool::arc("edit", "Edit")).unwrap();

        let names: Vec<String> = registry.descriptors().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["edit", "write_file"]);
        assert_eq!(registry.names(), vec!["edit", "write_file"]);
    }
}
