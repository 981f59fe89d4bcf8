//! Instruction text read from a file in the sandbox root.
//!
//! The file is read on every re-injection, so edits take effect without a
//! restart. A missing or unreadable file means "no instructions".

use openlink_application::ports::instruction_source::InstructionSource;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct FileInstructionSource {
    path: PathBuf,
}

impl FileInstructionSource {
    /// `file_name` is resolved against `root`.
    pub fn new(root: &Path, file_name: impl AsRef<Path>) -> Self {
        Self {
            path: root.join(file_name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl InstructionSource for FileInstructionSource {
    fn load(&self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No prompt file");
                None
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Could not read prompt file");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_yields_none() {
        let dir = tempdir().unwrap();
        let source = FileInstructionSource::new(dir.path(), "init_prompt.txt");
        assert!(source.load().is_none());
    }

    #[test]
    fn test_reads_current_content() {
        let dir = tempdir().unwrap();
        let source = FileInstructionSource::new(dir.path(), "init_prompt.txt");

        std::fs::write(source.path(), "be precise").unwrap();
        assert_eq!(source.load().as_deref(), Some("be precise"));

        std::fs::write(source.path(), "be brief").unwrap();
        assert_eq!(source.load().as_deref(), Some("be brief"));
    }
}
