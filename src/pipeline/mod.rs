//! The download pipeline: fetch, optionally trim, optionally tag.
//!
//! A job runs its stages strictly in sequence and the submitter is blocked
//! for the full duration, which may be minutes for a large download. Any
//! fatal condition aborts the job at the point of detection; files written
//! by earlier stages are left on disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::command::ToolCommand;
use crate::config::{Config, DownloadConfig};
use crate::error::{Error, Result};
use crate::library::{self, ResolvedTarget, TargetLocks};
use crate::sponsorblock::{keep_segments, Segment, SponsorBlockClient};
use crate::tools::ToolSet;

/// A request to fetch one remote media item into a library folder.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DownloadRequest {
    /// Remote content identifier.
    pub content_id: String,
    /// Library root to store into.
    pub library: String,
    /// Subfolder inside the library, `/`-separated.
    pub folder: String,
    pub audio_only: bool,
    pub prefer_free_format: bool,
    /// Preferred video resolution, e.g. "1080".
    pub resolution: Option<String>,
    pub artist: String,
    pub album: String,
    pub title: String,
    pub track: i32,
    /// Remove spans the skip-segment service marks as non-music.
    pub remove_nonmusic: bool,
    pub embed_thumbnail: bool,
    pub embed_metadata: bool,
}

impl DownloadRequest {
    /// True when enough tag material is present to name and tag the file.
    /// The track number always contributes at least one character, so a
    /// request with every text field empty and track 0 has none.
    fn has_tags(&self) -> bool {
        self.title.len() + self.album.len() + self.artist.len() + self.track.to_string().len() > 1
    }
}

/// What a finished job reports back to the submitter.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadReport {
    /// Human-readable status trail, one line per stage event.
    pub messages: Vec<String>,
    /// The produced file.
    pub file: PathBuf,
}

/// Runs download jobs against the configured tools and libraries.
pub struct JobRunner {
    config: Arc<Config>,
    sponsorblock: SponsorBlockClient,
    locks: TargetLocks,
}

impl JobRunner {
    pub fn new(config: Arc<Config>) -> Self {
        let sponsorblock = SponsorBlockClient::new(&config.sponsorblock);
        Self {
            config,
            sponsorblock,
            locks: TargetLocks::default(),
        }
    }

    /// Run one job to completion.
    ///
    /// On failure only the error is returned, matching the submit API's
    /// contract; the partial status trail goes to the log instead.
    pub async fn run(&self, request: &DownloadRequest) -> Result<DownloadReport> {
        tracing::info!(
            "Download {} to {}/{}, audio only: {}, prefer free format: {}",
            request.content_id,
            request.library,
            request.folder,
            request.audio_only,
            request.prefer_free_format
        );

        let mut trail = Vec::new();
        match self.run_stages(request, &mut trail).await {
            Ok(file) => {
                trail.push("File saved".to_string());
                Ok(DownloadReport {
                    messages: trail,
                    file,
                })
            }
            Err(e) => {
                tracing::error!(
                    "Download of {} failed: {} (trail so far: {:?})",
                    request.content_id,
                    e,
                    trail
                );
                Err(e)
            }
        }
    }

    async fn run_stages(
        &self,
        request: &DownloadRequest,
        trail: &mut Vec<String>,
    ) -> Result<PathBuf> {
        // Tool resolution comes before any filesystem or network action.
        let tools = ToolSet::locate(&self.config.tools)?;

        let base_name = library::base_filename(
            &request.content_id,
            &request.title,
            request.audio_only,
            request.has_tags(),
        );
        let target = library::resolve_target(
            &request.library,
            &request.folder,
            base_name,
            request.audio_only,
            request.prefer_free_format,
        );
        let final_path = target.final_path();

        // The lock is held until the job ends, covering the existence check
        // and every tool invocation.
        let _guard = self.locks.acquire(final_path.clone())?;
        target.prepare()?;
        trail.push(format!("Filename: {}", final_path.display()));

        self.download(request, &tools, &target, trail).await?;

        if request.remove_nonmusic && request.audio_only {
            if !self.config.sponsorblock.enabled {
                trail.push("Skip-segment lookup disabled, keeping file as downloaded".to_string());
            } else if let (Some(trimmer), Some(prober)) =
                (tools.trimmer.as_deref(), tools.prober.as_deref())
            {
                self.trim_nonmusic(request, trimmer, prober, &target, trail)
                    .await?;
            } else {
                tracing::info!("Trimmer or prober unavailable, skipping non-music removal");
                trail.push("Trimmer unavailable, keeping file as downloaded".to_string());
            }
        }

        if request.audio_only && request.has_tags() {
            if let Some(tagger) = tools.tagger.as_deref() {
                self.tag(request, tagger, &final_path, trail).await?;
            } else {
                tracing::info!("Tagger unavailable, skipping tagging");
            }
        }

        Ok(final_path)
    }

    async fn download(
        &self,
        request: &DownloadRequest,
        tools: &ToolSet,
        target: &ResolvedTarget,
        trail: &mut Vec<String>,
    ) -> Result<()> {
        let mut cmd = ToolCommand::new(&tools.downloader);
        cmd.args(downloader_args(&self.config.download, request, target));
        trail.push(format!("Exec: {}", cmd.command_line()));

        let output = cmd.execute().await?;
        if !output.status.success() {
            return Err(Error::process(
                "downloader",
                format!("exited with {}: {}", output.status, output.stderr.trim()),
            ));
        }
        Ok(())
    }

    async fn trim_nonmusic(
        &self,
        request: &DownloadRequest,
        trimmer: &Path,
        prober: &Path,
        target: &ResolvedTarget,
        trail: &mut Vec<String>,
    ) -> Result<()> {
        let file = target.final_path();

        let mut probe = ToolCommand::new(prober);
        probe
            .arg("-i")
            .arg(file.display().to_string())
            .arg("-show_entries")
            .arg("format=duration")
            .arg("-v")
            .arg("quiet")
            .arg("-of")
            .arg("csv=p=0");
        trail.push(format!("Exec: {}", probe.command_line()));

        let output = probe.execute().await?;
        if !output.status.success() {
            return Err(Error::process(
                "prober",
                format!("exited with {}", output.status),
            ));
        }
        let duration: f64 = output.stdout.trim().parse().map_err(|_| {
            Error::Parse(format!(
                "duration {:?} from prober is not a number",
                output.stdout.trim()
            ))
        })?;

        let discard = self
            .sponsorblock
            .fetch_skip_segments(&request.content_id)
            .await?;
        if discard.is_empty() {
            trail.push("No non-music segments reported, keeping file as downloaded".to_string());
            return Ok(());
        }

        let keep = keep_segments(&discard, duration);
        if keep.is_empty() {
            // The whole file is marked non-music. An empty filter expression
            // is undefined for the trimmer, so leave the file untouched.
            trail.push("Non-music segments cover the whole file, keeping it as downloaded".to_string());
            return Ok(());
        }

        let temp = target.trim_temp_path();
        let mut trim = ToolCommand::new(trimmer);
        trim.arg("-i")
            .arg(file.display().to_string())
            .arg("-af")
            .arg(aselect_filter(&keep))
            .arg(temp.display().to_string());
        trail.push(format!("Exec: {}", trim.command_line()));

        let output = trim.execute().await?;
        if !output.status.success() {
            return Err(Error::process(
                "trimmer",
                format!("exited with {}: {}", output.status, output.stderr.trim()),
            ));
        }

        // Same directory, so the rename is atomic: no window where the
        // target is missing.
        std::fs::rename(&temp, &file).map_err(|e| {
            Error::Filesystem(format!("could not move trimmed file into place: {e}"))
        })?;
        trail.push(format!("Removed {} non-music span(s)", discard.len()));
        Ok(())
    }

    async fn tag(
        &self,
        request: &DownloadRequest,
        tagger: &Path,
        file: &Path,
        trail: &mut Vec<String>,
    ) -> Result<()> {
        let mut cmd = ToolCommand::new(tagger);
        cmd.arg("-a")
            .arg(&request.artist)
            .arg("-A")
            .arg(&request.album)
            .arg("-t")
            .arg(&request.title)
            .arg("-T")
            .arg(request.track.to_string())
            .arg(file.display().to_string());
        trail.push(format!("Exec: {}", cmd.command_line()));

        let output = cmd.execute().await?;
        if !output.status.success() {
            // Tagging is best-effort; the file is already in place.
            tracing::warn!(
                "Tagger exited with {}: {}",
                output.status,
                output.stderr.trim()
            );
        }
        Ok(())
    }
}

/// Arguments for one downloader invocation. Configured extra arguments come
/// first, then format selection, then the output template and content id.
fn downloader_args(
    download: &DownloadConfig,
    request: &DownloadRequest,
    target: &ResolvedTarget,
) -> Vec<String> {
    let mut args = download.extra_args.clone();
    let base = target.base.display().to_string();

    if request.audio_only {
        args.push("-x".to_string());
        if request.prefer_free_format {
            args.push("--prefer-free-format".to_string());
        } else {
            args.push("--audio-format".to_string());
            args.push("mp3".to_string());
        }
    } else {
        if request.prefer_free_format {
            args.push("--prefer-free-format".to_string());
        } else {
            args.push("-f".to_string());
            args.push("mp4".to_string());
        }
        if let Some(resolution) = request.resolution.as_deref().filter(|r| !r.is_empty()) {
            args.push("-S".to_string());
            args.push(format!("res:{resolution}"));
        }
    }

    if request.embed_thumbnail {
        args.push("--embed-thumbnail".to_string());
    }
    if request.embed_metadata {
        args.push("--embed-metadata".to_string());
    }

    let template = match &download.output_template {
        Some(custom) => custom.replace("{target}", &base),
        None if request.audio_only => format!("{base}.%(ext)s"),
        None => format!("{base}-%(title)s.%(ext)s"),
    };
    args.push("-o".to_string());
    args.push(template);
    args.push(request.content_id.clone());

    args
}

/// The trimmer's audio filter keeping exactly the given spans.
fn aselect_filter(keep: &[Segment]) -> String {
    let clauses: Vec<String> = keep
        .iter()
        .map(|s| format!("between(t,{},{})", s.start, s.end))
        .collect();
    format!("aselect='{}',asetpts=N/SR/TB", clauses.join("+"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audio_request() -> DownloadRequest {
        DownloadRequest {
            content_id: "dQw4w9WgXcQ".to_string(),
            library: "/media/music".to_string(),
            audio_only: true,
            title: "Song".to_string(),
            artist: "Artist".to_string(),
            ..Default::default()
        }
    }

    fn target_for(request: &DownloadRequest) -> ResolvedTarget {
        library::resolve_target(
            &request.library,
            &request.folder,
            library::base_filename(
                &request.content_id,
                &request.title,
                request.audio_only,
                request.has_tags(),
            ),
            request.audio_only,
            request.prefer_free_format,
        )
    }

    #[test]
    fn has_tags_requires_more_than_the_track_digit() {
        let mut request = DownloadRequest::default();
        assert!(!request.has_tags());

        request.track = 12;
        assert!(request.has_tags());

        request = DownloadRequest {
            title: "Song".to_string(),
            ..Default::default()
        };
        assert!(request.has_tags());
    }

    #[test]
    fn audio_args_extract_and_convert_to_mp3() {
        let request = audio_request();
        let args = downloader_args(&DownloadConfig::default(), &request, &target_for(&request));
        assert_eq!(
            args,
            [
                "-x",
                "--audio-format",
                "mp3",
                "-o",
                "/media/music/Song.%(ext)s",
                "dQw4w9WgXcQ",
            ]
        );
    }

    #[test]
    fn audio_args_with_free_format() {
        let request = DownloadRequest {
            prefer_free_format: true,
            ..audio_request()
        };
        let args = downloader_args(&DownloadConfig::default(), &request, &target_for(&request));
        assert_eq!(
            args,
            [
                "-x",
                "--prefer-free-format",
                "-o",
                "/media/music/Song.%(ext)s",
                "dQw4w9WgXcQ",
            ]
        );
    }

    #[test]
    fn video_args_carry_resolution_sort() {
        let request = DownloadRequest {
            content_id: "abc123".to_string(),
            library: "/media/video".to_string(),
            resolution: Some("1080".to_string()),
            ..Default::default()
        };
        let args = downloader_args(&DownloadConfig::default(), &request, &target_for(&request));
        assert_eq!(
            args,
            [
                "-f",
                "mp4",
                "-S",
                "res:1080",
                "-o",
                "/media/video/abc123-%(title)s.%(ext)s",
                "abc123",
            ]
        );
    }

    #[test]
    fn extra_args_are_prepended_and_embed_flags_appended() {
        let download = DownloadConfig {
            extra_args: vec!["--no-playlist".to_string()],
            output_template: None,
        };
        let request = DownloadRequest {
            embed_thumbnail: true,
            embed_metadata: true,
            ..audio_request()
        };
        let args = downloader_args(&download, &request, &target_for(&request));
        assert_eq!(args[0], "--no-playlist");
        assert!(args.contains(&"--embed-thumbnail".to_string()));
        assert!(args.contains(&"--embed-metadata".to_string()));
    }

    #[test]
    fn custom_output_template_replaces_the_default() {
        let download = DownloadConfig {
            extra_args: Vec::new(),
            output_template: Some("{target}.%(ext)s".to_string()),
        };
        let request = DownloadRequest {
            content_id: "abc123".to_string(),
            library: "/media/video".to_string(),
            ..Default::default()
        };
        let args = downloader_args(&download, &request, &target_for(&request));
        let o = args.iter().position(|a| a == "-o").unwrap();
        assert_eq!(args[o + 1], "/media/video/abc123.%(ext)s");
    }

    #[test]
    fn aselect_filter_joins_between_clauses() {
        let keep = [Segment::new(0.0, 5.0), Segment::new(10.0, 20.5)];
        assert_eq!(
            aselect_filter(&keep),
            "aselect='between(t,0,5)+between(t,10,20.5)',asetpts=N/SR/TB"
        );
    }
}
