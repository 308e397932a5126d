// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use qrsnap::Config;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "qrsnap")]
#[command(about = "Camera QR-code scanner")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan image files for QR codes through the capture pipeline
    Scan {
        /// Image files acting as camera devices (first is the default;
        /// additional files become flip targets)
        #[arg(short, long, required = true, num_args = 1..)]
        image: Vec<PathBuf>,

        /// Viewport size the capture surface is fit into, as WIDTHxHEIGHT
        #[arg(long, default_value = "1280x800")]
        viewport: String,

        /// Exit after the first decoded result
        #[arg(long)]
        once: bool,

        /// Skip the clipboard copy
        #[arg(long)]
        no_clipboard: bool,
    },

    /// Manage the offline asset cache
    Assets {
        #[command(subcommand)]
        action: AssetCommands,
    },
}

#[derive(Subcommand)]
enum AssetCommands {
    /// Fetch the asset manifest from a bundle directory into a fresh
    /// versioned cache
    Install {
        /// Directory holding the asset files
        #[arg(short, long)]
        bundle: PathBuf,
    },

    /// Evict caches left behind by previous manifest versions
    Activate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=qrsnap=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("qrsnap=info")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let args = Cli::parse();

    match args.command {
        Commands::Scan {
            image,
            viewport,
            once,
            no_clipboard,
        } => {
            let viewport = cli::parse_viewport(&viewport)?;
            cli::scan(image, viewport, once, Config::load(), no_clipboard).await?;
        }
        Commands::Assets { action } => match action {
            AssetCommands::Install { bundle } => cli::install_assets(bundle)?,
            AssetCommands::Activate => cli::activate_assets()?,
        },
    }

    Ok(())
}
