//! Script and JSON loading.
//!
//! The interpreter never touches the filesystem directly.  It asks a
//! [`ScriptLoader`] for a file's contents, then filters script sources with
//! [`script_lines`] or parses JSON imports with `serde_json`.  The default is
//! [`FsLoader`]; tests and embedders can plug in a [`MemoryLoader`] or any
//! closure `Fn(&Path) -> io::Result<String>`.

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{JarvisError, Result};

/// Resolves a path to the file's raw contents.
pub trait ScriptLoader {
    fn read(&self, path: &Path) -> io::Result<String>;
}

impl<F> ScriptLoader for F
where
    F: Fn(&Path) -> io::Result<String>,
{
    fn read(&self, path: &Path) -> io::Result<String> {
        self(path)
    }
}

/// Reads files from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl ScriptLoader for FsLoader {
    fn read(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Serves files from a map, keyed by normalised path.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: HashMap<PathBuf, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, contents: impl Into<String>) {
        self.files.insert(normalize_path(path.as_ref()), contents.into());
    }

    pub fn with_file(mut self, path: impl AsRef<Path>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }
}

impl ScriptLoader for MemoryLoader {
    fn read(&self, path: &Path) -> io::Result<String> {
        self.files.get(&normalize_path(path)).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display()))
        })
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Executable lines of a script: blank lines and `#` comments removed.
/// Surrounding whitespace is trimmed.
pub fn script_lines(src: &str) -> Vec<String> {
    src.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_owned)
        .collect()
}

/// Read `path` through `loader` and return its executable lines.
pub fn load_lines(loader: &dyn ScriptLoader, path: &Path) -> Result<Vec<String>> {
    let src = loader
        .read(path)
        .map_err(|source| JarvisError::ScriptRead { path: path.to_owned(), source })?;
    Ok(script_lines(&src))
}

/// Read `path` through `loader` and parse it as JSON.
pub fn load_json(loader: &dyn ScriptLoader, path: &Path) -> Result<serde_json::Value> {
    let src = loader
        .read(path)
        .map_err(|source| JarvisError::ScriptRead { path: path.to_owned(), source })?;
    serde_json::from_str(&src)
        .map_err(|source| JarvisError::JsonImport { path: path.to_owned(), source })
}

/// `true` if the path ends in `.json` (any case).
pub fn is_json(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// `true` if the path carries the script extension `ext` (without the dot).
pub fn has_script_extension(path: &Path, ext: &str) -> bool {
    path.extension().map(|e| e == ext).unwrap_or(false)
}

/// Lexically normalise a path: drop `.` components and fold `..` into the
/// preceding component.  The filesystem is not consulted.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
