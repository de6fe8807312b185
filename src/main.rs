mod cli;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tubeforge::{config, pipeline, server, tools};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "tubeforge=trace,tower_http=debug".to_string()
        } else {
            "tubeforge=debug,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let mut config = config::load_config_or_default(cli.config.as_deref())?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(server::start_server(config))
        }
        Commands::Fetch {
            content_id,
            library,
            folder,
            audio_only,
            prefer_free_format,
            resolution,
            artist,
            album,
            title,
            track,
            remove_nonmusic,
            embed_thumbnail,
            embed_metadata,
        } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let request = pipeline::DownloadRequest {
                content_id,
                library,
                folder,
                audio_only,
                prefer_free_format,
                resolution,
                artist,
                album,
                title,
                track,
                remove_nonmusic,
                embed_thumbnail,
                embed_metadata,
            };

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_fetch(config, request))
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("tubeforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn run_fetch(config: config::Config, request: pipeline::DownloadRequest) -> Result<()> {
    let runner = pipeline::JobRunner::new(Arc::new(config));
    let report = runner.run(&request).await?;

    for line in &report.messages {
        println!("{line}");
    }
    println!("Saved: {}", report.file.display());
    Ok(())
}

fn check_tools(config_path: Option<&std::path::Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    println!("Checking external tools...\n");

    let infos = tools::check_tools(&config.tools);
    let mut all_ok = true;

    for info in &infos {
        let status = if info.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, info.name);
        if let Some(ref path) = info.path {
            print!(" - {}", path.display());
        }
        println!();
    }

    println!();
    if all_ok {
        println!("All tools are available!");
    } else {
        println!("Some tools are missing. Only the downloader is required; missing optional tools disable their stage.");
    }

    Ok(())
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Libraries: {}", config.libraries.len());
            println!("  Downloader: {}", config.tools.downloader.display());
            println!(
                "  Skip-segment lookup: {}",
                if config.sponsorblock.enabled {
                    "enabled"
                } else {
                    "disabled"
                }
            );
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
        }
    }

    Ok(())
}
