use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub libraries: Vec<LibraryConfig>,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub download: DownloadConfig,

    #[serde(default)]
    pub sponsorblock: SponsorBlockConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8460
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// A library root downloads can target. Exposed verbatim through the
/// libraries endpoint so clients can offer a picker.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibraryConfig {
    pub name: String,
    pub path: PathBuf,
}

/// Paths of the external tools the pipeline drives. Only the downloader is
/// required; the others disable their stage when absent.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default = "default_downloader")]
    pub downloader: PathBuf,

    #[serde(default = "default_trimmer")]
    pub trimmer: PathBuf,

    #[serde(default = "default_tagger")]
    pub tagger: PathBuf,
}

fn default_downloader() -> PathBuf {
    PathBuf::from("/usr/local/bin/yt-dlp")
}
fn default_trimmer() -> PathBuf {
    PathBuf::from("/usr/bin/ffmpeg")
}
fn default_tagger() -> PathBuf {
    PathBuf::from("/usr/bin/id3v2")
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            downloader: default_downloader(),
            trimmer: default_trimmer(),
            tagger: default_tagger(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DownloadConfig {
    /// Extra arguments prepended to every downloader invocation.
    #[serde(default)]
    pub extra_args: Vec<String>,

    /// Replaces the built-in output template when set. `{target}` expands
    /// to the resolved base path.
    #[serde(default)]
    pub output_template: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SponsorBlockConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_category")]
    pub category: String,
}

fn default_true() -> bool {
    true
}
fn default_api_url() -> String {
    "https://sponsor.ajay.app".to_string()
}
fn default_category() -> String {
    "music_offtopic".to_string()
}

impl Default for SponsorBlockConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            api_url: default_api_url(),
            category: default_category(),
        }
    }
}
