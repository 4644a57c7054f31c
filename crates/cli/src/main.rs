//! Souk CLI - session migrations and image tooling.
//!
//! # Usage
//!
//! ```bash
//! # Create the storefront session table
//! souk-cli migrate storefront
//!
//! # Create the admin session table (schema `admin`)
//! souk-cli migrate admin
//!
//! # Both
//! souk-cli migrate all
//!
//! # Compress product photos before upload
//! souk-cli images compress a.png b.webp --out-dir out --max-dimension 1600 --quality 80
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use souk_storefront::services::images::CompressionOptions;

mod commands;

#[derive(Parser)]
#[command(name = "souk-cli")]
#[command(author, version, about = "Souk CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create session tables
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Image tooling
    Images {
        #[command(subcommand)]
        action: ImagesAction,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Storefront session table
    Storefront,
    /// Admin session table
    Admin,
    /// Every session table
    All,
}

#[derive(Subcommand)]
enum ImagesAction {
    /// Downsize and re-encode images as JPEG
    Compress {
        /// Input image files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = "compressed")]
        out_dir: PathBuf,

        /// Longest side of the output, in pixels
        #[arg(long, default_value_t = CompressionOptions::default().max_dimension)]
        max_dimension: u32,

        /// JPEG quality (1-100)
        #[arg(short, long, default_value_t = CompressionOptions::default().quality,
              value_parser = clap::value_parser!(u8).range(1..=100))]
        quality: u8,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate { target } => match target {
            MigrateTarget::Storefront => commands::migrate::storefront().await?,
            MigrateTarget::Admin => commands::migrate::admin().await?,
            MigrateTarget::All => {
                commands::migrate::storefront().await?;
                commands::migrate::admin().await?;
            }
        },
        Commands::Images { action } => match action {
            ImagesAction::Compress {
                inputs,
                out_dir,
                max_dimension,
                quality,
            } => {
                let options = CompressionOptions {
                    max_dimension,
                    quality,
                };
                let written = commands::images::compress(&inputs, &out_dir, options).await?;
                tracing::info!(count = written.len(), out_dir = %out_dir.display(), "Done");
            }
        },
    }
    Ok(())
}
