//! Writes rendered files to disk.
//!
//! Existing files are only replaced when the configured [`ConflictPolicy`]
//! agrees; a declined overwrite is skipped and logged, not treated as an error.
//! Writes replace the whole file and are not rolled back if a later file fails.
//!
//! Symbolic links are never followed: a destination that is a link, or that
//! sits below a linked directory inside the writer's root, is refused.

use crate::cancel::CancellationToken;
use crate::error::{Error, Result};
use crate::loader::RenderedFile;
use crate::workers::run_all;
use log::{debug, info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Decides whether an existing file may be overwritten.
pub trait ConflictPolicy: Send + Sync {
    fn should_overwrite(&self, file: &RenderedFile) -> Result<bool>;
}

impl<F> ConflictPolicy for F
where
    F: Fn(&RenderedFile) -> Result<bool> + Send + Sync,
{
    fn should_overwrite(&self, file: &RenderedFile) -> Result<bool> {
        self(file)
    }
}

/// Outcome of a [`FileWriter::write`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

enum Outcome {
    Written(PathBuf),
    Skipped(PathBuf),
}

#[derive(Default)]
pub struct FileWriter {
    conflict_policy: Option<Box<dyn ConflictPolicy>>,
    // policies usually drive a single interactive surface
    policy_lock: Mutex<()>,
    root: Option<PathBuf>,
}

impl FileWriter {
    /// Creates a writer that silently overwrites existing files.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_conflict_policy<P: ConflictPolicy + 'static>(mut self, policy: P) -> Self {
        self.conflict_policy = Some(Box::new(policy));
        self
    }

    /// Confines every write to `root`. Destinations outside of it, or below a
    /// symbolic link between it and the file, are refused.
    pub fn with_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Writes every file concurrently, creating parent directories as needed.
    ///
    /// # Errors
    /// * `Error::PathEscapeError` if a destination is, or lies below, a symbolic link
    /// * `Error::WriteError` if a directory or file cannot be created
    /// * `Error::ConflictPolicyError` if the policy fails to decide
    /// * `Error::Cancelled` if the token fires before every file was handled
    pub fn write(
        &self,
        files: &[RenderedFile],
        cancel: &CancellationToken,
    ) -> Result<WriteSummary> {
        let outcomes = run_all(files, cancel, |file| self.write_file(file))?;

        let mut summary = WriteSummary::default();
        for outcome in outcomes {
            match outcome {
                Outcome::Written(path) => summary.written.push(path),
                Outcome::Skipped(path) => summary.skipped.push(path),
            }
        }
        Ok(summary)
    }

    fn write_file(&self, file: &RenderedFile) -> Result<Outcome> {
        let destination = &file.destination;
        let write_error = |source| Error::WriteError {
            path: destination.display().to_string(),
            source,
        };

        self.check_links(destination)?;

        let exists = destination.try_exists().map_err(write_error)?;
        if exists && !self.may_overwrite(file)? {
            warn!("Skipping file: {}", destination.display());
            return Ok(Outcome::Skipped(destination.clone()));
        }

        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }

        info!("Writing file: {}", destination.display());
        fs::write(destination, &file.content).map_err(write_error)?;

        Ok(Outcome::Written(destination.clone()))
    }

    /// Refuses a destination that is a symbolic link, or whose parent
    /// directories up to the root include one.
    fn check_links(&self, destination: &Path) -> Result<()> {
        let root = self.root.as_deref().unwrap_or(Path::new(""));
        let escape = || Error::PathEscapeError {
            path: destination.display().to_string(),
            root: root.display().to_string(),
        };

        let checked: Vec<&Path> = match self.root.as_deref() {
            Some(root) => {
                if !destination.starts_with(root) {
                    return Err(escape());
                }
                destination
                    .ancestors()
                    .take_while(|ancestor| *ancestor != root)
                    .collect()
            }
            None => vec![destination],
        };

        for path in checked {
            match fs::symlink_metadata(path) {
                Ok(metadata) if metadata.file_type().is_symlink() => {
                    debug!("Refusing to write through link {}", path.display());
                    return Err(escape());
                }
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(Error::WriteError {
                        path: destination.display().to_string(),
                        source,
                    })
                }
            }
        }
        Ok(())
    }

    fn may_overwrite(&self, file: &RenderedFile) -> Result<bool> {
        let Some(policy) = &self.conflict_policy else {
            debug!("Overwriting existing file: {}", file.destination.display());
            return Ok(true);
        };

        let _guard = self
            .policy_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        policy
            .should_overwrite(file)
            .map_err(|e| Error::ConflictPolicyError {
                path: file.destination.display().to_string(),
                source: Box::new(e),
            })
    }
}
