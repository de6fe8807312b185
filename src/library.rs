//! Target path resolution for download jobs.
//!
//! Builds the normalized target directory, base filename, and extension for
//! a job, and guards the final path against collisions: a pre-existing file
//! is a hard stop, and a per-target lock registry keeps concurrent jobs from
//! racing past the existence check.

use std::path::PathBuf;

use dashmap::DashSet;

use crate::error::{Error, Result};

/// Normalize a requested subfolder to clean forward-slash segments.
pub fn normalize_subfolder(folder: &str) -> String {
    folder
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// File extension for a download, by format preference.
pub fn target_extension(audio_only: bool, prefer_free_format: bool) -> &'static str {
    match (audio_only, prefer_free_format) {
        (true, true) => ".opus",
        (true, false) => ".mp3",
        (false, true) => ".webm",
        (false, false) => ".mp4",
    }
}

/// Pick the base filename: the title when an audio job carries usable tags,
/// the content id otherwise.
pub fn base_filename<'a>(
    content_id: &'a str,
    title: &'a str,
    audio_only: bool,
    has_tags: bool,
) -> &'a str {
    if audio_only && has_tags && title.len() > 1 {
        title
    } else {
        content_id
    }
}

/// The resolved location of a download, before any tool has run.
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    /// Target directory, derived from library root and normalized subfolder.
    pub directory: PathBuf,
    /// `directory/basename`, without extension. The downloader's output
    /// template is built from this.
    pub base: PathBuf,
    /// Extension of the final file, including the leading dot.
    pub extension: &'static str,
}

impl ResolvedTarget {
    /// The final file path: base + extension.
    pub fn final_path(&self) -> PathBuf {
        let mut path = self.base.clone().into_os_string();
        path.push(self.extension);
        PathBuf::from(path)
    }

    /// Sibling temp path the trimmer writes to before the atomic replace.
    pub fn trim_temp_path(&self) -> PathBuf {
        let mut path = self.base.clone().into_os_string();
        path.push("-nmr");
        path.push(self.extension);
        PathBuf::from(path)
    }

    /// Create the target directory and refuse a pre-existing final file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Filesystem`] if the directory cannot be created or
    /// the final path already exists.
    pub fn prepare(&self) -> Result<()> {
        std::fs::create_dir_all(&self.directory).map_err(|e| {
            Error::Filesystem(format!(
                "could not create directory {}: {e}",
                self.directory.display()
            ))
        })?;

        let path = self.final_path();
        if path.exists() {
            return Err(Error::Filesystem(format!(
                "target file {} already exists",
                path.display()
            )));
        }
        Ok(())
    }
}

/// Build the target location for a job. Pure path arithmetic; directory
/// creation and the collision check happen in [`ResolvedTarget::prepare`],
/// after the target lock is held.
pub fn resolve_target(
    library_root: &str,
    subfolder: &str,
    base_name: &str,
    audio_only: bool,
    prefer_free_format: bool,
) -> ResolvedTarget {
    let folder = normalize_subfolder(subfolder);
    let root = library_root.trim_end_matches('/');
    let directory = if folder.is_empty() {
        PathBuf::from(root)
    } else {
        PathBuf::from(format!("{root}/{folder}"))
    };

    ResolvedTarget {
        base: directory.join(base_name),
        directory,
        extension: target_extension(audio_only, prefer_free_format),
    }
}

/// Per-target mutual exclusion, keyed by the absolute final path. A job
/// holds its key for its full duration, so a second job resolving to the
/// same path fails fast instead of racing the existence check.
#[derive(Debug, Default)]
pub struct TargetLocks {
    active: DashSet<PathBuf>,
}

impl TargetLocks {
    /// Claim a target path for one job.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Filesystem`] if another job already holds the path.
    pub fn acquire(&self, path: PathBuf) -> Result<TargetGuard<'_>> {
        if !self.active.insert(path.clone()) {
            return Err(Error::Filesystem(format!(
                "a download targeting {} is already in progress",
                path.display()
            )));
        }
        Ok(TargetGuard { locks: self, path })
    }
}

/// Releases the claimed target path on drop.
#[derive(Debug)]
pub struct TargetGuard<'a> {
    locks: &'a TargetLocks,
    path: PathBuf,
}

impl Drop for TargetGuard<'_> {
    fn drop(&mut self) {
        self.locks.active.remove(&self.path);
    }
}
