//! A unit of work for the [`TaskDispatcher`](super::TaskDispatcher).

use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::Context;

use crate::translate::TranslationResult;

pub type WorkFn = Box<dyn FnOnce() -> anyhow::Result<TranslationResult> + Send + 'static>;
pub type CleanupFn = Box<dyn FnOnce() -> anyhow::Result<()> + Send + 'static>;

/// Work closure, a status line describing it, and an optional cleanup step.
///
/// Everything the work needs is captured by the closures; a task holds no
/// references into the UI.
pub struct Task {
    pub(crate) status: String,
    pub(crate) work: WorkFn,
    pub(crate) cleanup: Option<CleanupFn>,
}

impl Task {
    pub fn new<F>(status: impl Into<String>, work: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<TranslationResult> + Send + 'static,
    {
        Self {
            status: status.into(),
            work: Box::new(work),
            cleanup: None,
        }
    }

    /// Run `cleanup` after the outcome has been delivered, whether the work
    /// succeeded or not.
    ///
    /// Calling this more than once chains the steps in registration order.
    pub fn with_cleanup<C>(mut self, cleanup: C) -> Self
    where
        C: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        self.cleanup = Some(match self.cleanup.take() {
            None => Box::new(cleanup),
            Some(previous) => Box::new(move || {
                let first = previous();
                let second = cleanup();
                first.and(second)
            }),
        });
        self
    }

    /// Delete `path` once the task is over.  A file that is already gone is
    /// not an error.
    pub fn remove_file_on_completion(self, path: PathBuf) -> Self {
        self.with_cleanup(move || match std::fs::remove_file(&path) {
            Ok(()) => {
                log::debug!("task: removed {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("cannot remove {}", path.display())),
        })
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn has_cleanup(&self) -> bool {
        self.cleanup.is_some()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("status", &self.status)
            .field("cleanup", &self.cleanup.is_some())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
