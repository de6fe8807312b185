use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tubeforge")]
#[command(author, version, about = "Media fetch service for self-hosted libraries")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Start {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Download a single item from the command line
    Fetch {
        /// Remote content identifier
        #[arg(required = true)]
        content_id: String,

        /// Library root to store into
        #[arg(short, long)]
        library: String,

        /// Subfolder inside the library
        #[arg(short, long, default_value = "")]
        folder: String,

        /// Extract audio instead of keeping the video
        #[arg(long)]
        audio_only: bool,

        /// Prefer free container formats (opus/webm over mp3/mp4)
        #[arg(long)]
        prefer_free_format: bool,

        /// Preferred video resolution, e.g. 1080
        #[arg(long)]
        resolution: Option<String>,

        #[arg(long, default_value = "")]
        artist: String,

        #[arg(long, default_value = "")]
        album: String,

        #[arg(long, default_value = "")]
        title: String,

        #[arg(long, default_value = "0")]
        track: i32,

        /// Remove non-music segments reported by the skip-segment service
        #[arg(long)]
        remove_nonmusic: bool,

        /// Embed the item's thumbnail into the file
        #[arg(long)]
        embed_thumbnail: bool,

        /// Embed the item's metadata into the file
        #[arg(long)]
        embed_metadata: bool,
    },

    /// Check that configured external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
