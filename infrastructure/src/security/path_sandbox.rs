//! Path confinement.
//!
//! Every path handed to a filesystem tool goes through [`PathSandbox`].
//! Paths are made absolute, lexically normalized, then symlink-resolved
//! before the prefix check, so a link inside the root that points outside
//! it is caught. Paths that do not exist yet (the write case) are resolved
//! through their nearest existing ancestor, and dangling links are
//! followed to where a write would actually land.

use openlink_domain::config::EngineConfig;
use openlink_domain::security::SandboxError;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Maximum dangling-link hops followed before giving up
const MAX_LINK_DEPTH: usize = 40;

/// Authorized roots for one engine instance.
///
/// `root` is the primary sandbox; `read_roots` are secondary roots only
/// reachable through [`PathSandbox::confine_absolute`].
#[derive(Debug, Clone)]
pub struct PathSandbox {
    root: PathBuf,
    read_roots: Vec<PathBuf>,
}

impl PathSandbox {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: canonical_or_absolute(root.as_ref()),
            read_roots: Vec::new(),
        }
    }

    pub fn with_read_roots(mut self, roots: impl IntoIterator<Item = PathBuf>) -> Self {
        self.read_roots = roots
            .into_iter()
            .map(|r| canonical_or_absolute(&r))
            .collect();
        self
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.root_dir()).with_read_roots(config.extra_read_roots().iter().cloned())
    }

    /// Canonical primary root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Confine a relative or absolute path to the primary root.
    pub fn confine(&self, path: impl AsRef<Path>) -> Result<PathBuf, SandboxError> {
        confine(&self.root, path.as_ref())
    }

    /// Confine an absolute (or `~`-prefixed) path to the primary root or
    /// any secondary read root.
    pub fn confine_absolute(&self, path: &str) -> Result<PathBuf, SandboxError> {
        let roots: Vec<&Path> = std::iter::once(self.root.as_path())
            .chain(self.read_roots.iter().map(PathBuf::as_path))
            .collect();
        confine_absolute(path, &roots)
    }

    /// Read access: absolute paths may use the secondary roots, relative
    /// paths are confined to the primary root.
    pub fn confine_read(&self, path: &str) -> Result<PathBuf, SandboxError> {
        if path.starts_with('~') || Path::new(path).is_absolute() {
            self.confine_absolute(path)
        } else {
            self.confine(path)
        }
    }
}

/// Resolve `path` against `root` and reject anything outside it.
pub fn confine(root: &Path, path: &Path) -> Result<PathBuf, SandboxError> {
    let root = canonical_or_absolute(root);
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    };
    let resolved = resolve(&normalize_lexical(&joined), 0);

    if is_within(&resolved, &root) {
        Ok(resolved)
    } else {
        Err(SandboxError::OutsideSandbox { path: path.to_path_buf() })
    }
}

/// Accept an absolute path if it resolves under any of `roots`.
pub fn confine_absolute(path: &str, roots: &[&Path]) -> Result<PathBuf, SandboxError> {
    let expanded = expand_home(path)?;
    if !expanded.is_absolute() {
        return Err(SandboxError::NotAbsolute { path: expanded });
    }
    let resolved = resolve(&normalize_lexical(&expanded), 0);

    if roots
        .iter()
        .any(|root| is_within(&resolved, &canonical_or_absolute(root)))
    {
        Ok(resolved)
    } else {
        Err(SandboxError::OutsideSandbox { path: expanded })
    }
}

fn is_within(path: &Path, root: &Path) -> bool {
    // Component-wise: "/srv/root2" does not start with "/srv/root"
    path == root || path.starts_with(root)
}

fn expand_home(path: &str) -> Result<PathBuf, SandboxError> {
    if path == "~" || path.starts_with("~/") {
        let home = dirs::home_dir().ok_or(SandboxError::NoHomeDirectory)?;
        let rest = path.trim_start_matches('~').trim_start_matches('/');
        Ok(if rest.is_empty() { home } else { home.join(rest) })
    } else {
        Ok(PathBuf::from(path))
    }
}

/// Canonical form, or plain absolutization when the path does not exist.
fn canonical_or_absolute(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        normalize_lexical(&std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()))
    })
}

/// Resolve symlinks as far as the filesystem allows.
fn resolve(path: &Path, depth: usize) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    if depth < MAX_LINK_DEPTH
        && let Ok(target) = fs::read_link(path)
    {
        // Dangling link: a write would create the target
        let parent = path.parent().unwrap_or(Path::new("/"));
        return resolve(&normalize_lexical(&parent.join(target)), depth + 1);
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => resolve(parent, depth).join(name),
        _ => path.to_path_buf(),
    }
}

/// Collapse `.` and `..` without touching the filesystem.
fn normalize_lexical(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
