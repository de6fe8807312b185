//! External tool detection and resolution.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::ToolsConfig;
use crate::error::{Error, Result};

/// Canonical name of the duration probe, expected beside the trimmer.
const PROBER_NAME: &str = "ffprobe";

/// Information about an external tool, for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    /// Role of the tool in the pipeline.
    pub name: &'static str,
    /// Whether the tool is available.
    pub available: bool,
    /// Resolved path to the executable.
    pub path: Option<PathBuf>,
}

impl ToolInfo {
    fn new(name: &'static str, path: Option<PathBuf>) -> Self {
        Self {
            name,
            available: path.is_some(),
            path,
        }
    }
}

/// The resolved tool executables for one job. Computed once per job and
/// read-only afterward.
#[derive(Debug, Clone)]
pub struct ToolSet {
    /// Download tool. Required.
    pub downloader: PathBuf,
    /// Tagging tool. Absence disables the tag stage.
    pub tagger: Option<PathBuf>,
    /// Trimming filter tool. Absence disables the trim stage.
    pub trimmer: Option<PathBuf>,
    /// Duration probe, resolved as the trimmer's sibling. Absence disables
    /// the trim stage.
    pub prober: Option<PathBuf>,
}

impl ToolSet {
    /// Resolve the configured tools.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the downloader cannot be found.
    /// Missing optional tools disable their stage instead.
    pub fn locate(config: &ToolsConfig) -> Result<Self> {
        let downloader = resolve(&config.downloader).ok_or_else(|| {
            Error::Configuration(format!(
                "download tool not found at {}",
                config.downloader.display()
            ))
        })?;

        let tagger = resolve(&config.tagger);
        if tagger.is_none() {
            tracing::info!(
                "Tagger not found at {}, tagging disabled",
                config.tagger.display()
            );
        }

        let trimmer = resolve(&config.trimmer);
        let prober = trimmer.as_deref().and_then(prober_for);
        match (&trimmer, &prober) {
            (None, _) => tracing::info!(
                "Trimmer not found at {}, segment removal disabled",
                config.trimmer.display()
            ),
            (Some(trimmer), None) => tracing::info!(
                "No {} next to {}, segment removal disabled",
                PROBER_NAME,
                trimmer.display()
            ),
            _ => {}
        }

        Ok(Self {
            downloader,
            tagger,
            trimmer,
            prober,
        })
    }
}

/// Report availability of every configured tool, for `check-tools` and the
/// tools endpoint.
pub fn check_tools(config: &ToolsConfig) -> Vec<ToolInfo> {
    let trimmer = resolve(&config.trimmer);
    let prober = trimmer.as_deref().and_then(prober_for);

    vec![
        ToolInfo::new("downloader", resolve(&config.downloader)),
        ToolInfo::new("trimmer", trimmer),
        ToolInfo::new("prober", prober),
        ToolInfo::new("tagger", resolve(&config.tagger)),
    ]
}

/// Resolve a configured tool path, preferring the path itself and falling
/// back to a PATH lookup on its file name.
fn resolve(configured: &Path) -> Option<PathBuf> {
    if configured.is_file() {
        return Some(configured.to_path_buf());
    }
    let name = configured.file_name()?;
    which::which(name).ok()
}

/// Derive the prober path by replacing the trimmer's file name. Both tools
/// are expected to live in the same directory.
fn prober_for(trimmer: &Path) -> Option<PathBuf> {
    let candidate = trimmer.with_file_name(PROBER_NAME);
    candidate.is_file().then_some(candidate)
}
