//! Script execution and imports.
//!
//! [`Interpreter::run_script`] feeds a file through [`Interpreter::send`]
//! line by line:
//!
//! - lines between `start` and `end` run as commands; the block produces one
//!   [`Reply::Batch`] and each line fires a [`CommandEvent`];
//! - `how to` and `in this context` blocks are always honoured;
//! - anything else outside a block is skipped.
//!
//! `name is from '<path>'` inside a constants block imports another script
//! (run with the same rules) or a JSON file (staged as a structured constant
//! called `name`).  Relative paths resolve against the directory of the base
//! script, the first one on the [`ImportStack`].  Each resolved path runs at
//! most once per interpreter; an import that fails may be requested again.
//!
//! Uncommitted constants never leak across files: the importing block is set
//! aside while the child runs, so the child neither sees nor can clash with
//! them.  Whatever the child commits is global at once.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{JarvisError, Result};
use crate::loader::{has_script_extension, is_json, load_json, load_lines, normalize_path};
use super::{
    interp::{define_reply, Interpreter},
    line::{classify, LineKind},
    value::{Reply, Value},
};

/// Called for every command run inside a script `start` block.
pub type EventListener = Box<dyn FnMut(&CommandEvent) + Send>;

/// One executed script command and what it returned.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandEvent {
    pub command: String,
    pub response: Reply,
}

// ── ImportStack ───────────────────────────────────────────────────────────────

/// Scripts currently executing, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportStack {
    frames: Vec<PathBuf>,
}

impl ImportStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: PathBuf) {
        self.frames.push(path);
    }

    pub fn pop(&mut self) -> Option<PathBuf> {
        self.frames.pop()
    }

    /// The script whose lines are being executed right now.
    pub fn current(&self) -> Option<&Path> {
        self.frames.last().map(PathBuf::as_path)
    }

    /// The script that started the run.  Import paths resolve against its
    /// directory.
    pub fn base(&self) -> Option<&Path> {
        self.frames.first().map(PathBuf::as_path)
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

// ── Running scripts ───────────────────────────────────────────────────────────

impl Interpreter {
    /// Execute the script at `path` and return one reply per `start` block
    /// and per forwarded line outside a block, in order.
    ///
    /// The file must carry the configured script extension.  Read errors,
    /// handler errors and malformed JSON imports abort the run.  The script
    /// runs in a fresh session: whatever block the caller had open is set
    /// aside and reinstated afterwards, even when the run fails.
    pub fn run_script(&mut self, path: impl AsRef<Path>) -> Result<Vec<Reply>> {
        let path = normalize_path(path.as_ref());
        let extension = &self.config().extension;
        if !has_script_extension(&path, extension) {
            return Err(JarvisError::InvalidScript { path, extension: extension.clone() });
        }
        info!(script = %path.display(), "running script");
        let fresh = !self.imported.contains_key(&path);
        self.imported.entry(path.clone()).or_default();
        let outer = self.suspend_session();
        self.imports.push(path.clone());
        let result = self.run_lines(&path);
        self.imports.pop();
        self.resume_session(outer);
        if result.is_err() && fresh {
            self.imported.remove(&path);
        }
        result
    }

    fn run_lines(&mut self, path: &Path) -> Result<Vec<Reply>> {
        let lines = load_lines(self.loader.as_ref(), path)?;
        let mut results = Vec::new();
        let mut block: Option<Vec<Reply>> = None;

        for line in &lines {
            if self.session().is_idle() {
                let kind = classify(line);
                if block.is_none() && kind == LineKind::Start {
                    block = Some(Vec::new());
                    continue;
                }
                if kind == LineKind::End {
                    if let Some(batch) = block.take() {
                        results.push(Reply::Batch(batch));
                        continue;
                    }
                }
                if block.is_none() && !kind.opens_context() {
                    debug!(line = %line, "outside start block; skipped");
                    continue;
                }
            }

            let reply = self.send(line)?;
            match block.as_mut() {
                Some(batch) => {
                    self.emit(line, &reply);
                    batch.push(reply);
                }
                None => results.push(reply),
            }
        }

        if !self.session().is_idle() {
            warn!(script = %path.display(), state = self.session().label(), "script ended inside an open block");
        }
        if let Some(batch) = block {
            warn!(script = %path.display(), "start block never closed");
            results.push(Reply::Batch(batch));
        }
        Ok(results)
    }

    fn emit(&mut self, line: &str, reply: &Reply) {
        if self.config().events {
            info!(command = line, response = %reply, "script command");
        }
        if self.listeners.is_empty() {
            return;
        }
        let event = CommandEvent { command: line.to_owned(), response: reply.clone() };
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    // ── Imports ───────────────────────────────────────────────────────────────

    /// Where `name is from '<raw>'` points, relative to the base script.
    pub fn resolve_import_path(&self, raw: &str) -> PathBuf {
        let raw = Path::new(raw);
        if raw.is_absolute() {
            return normalize_path(raw);
        }
        let dir = self.imports.base().and_then(Path::parent).unwrap_or(Path::new(""));
        normalize_path(&dir.join(raw))
    }

    pub(super) fn import(&mut self, name: &str, raw: &str) -> Result<Reply> {
        let path = self.resolve_import_path(raw);
        if let Some(names) = self.imported.get_mut(&path) {
            debug!(name, path = %path.display(), "already imported");
            names.push(name.to_owned());
            return Ok(Reply::Null);
        }
        if is_json(&path) {
            let value = load_json(self.loader.as_ref(), &path)?;
            let staged = self.stage_constant(name, Value::Structured(value));
            if staged.is_ok() {
                info!(name, path = %path.display(), "json imported");
                self.imported.insert(path, vec![name.to_owned()]);
            }
            return Ok(define_reply(staged));
        }

        info!(name, path = %path.display(), "importing script");
        // Marked before running so a cycle back to this file stops here.
        self.imported.insert(path.clone(), vec![name.to_owned()]);
        let outer = self.suspend_session();
        self.imports.push(path.clone());
        let result = self.run_lines(&path);
        self.imports.pop();
        self.resume_session(outer);
        match result {
            Ok(replies) => Ok(Reply::Batch(replies)),
            Err(e) => {
                self.imported.remove(&path);
                Err(e)
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
