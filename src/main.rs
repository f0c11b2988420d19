#![allow(clippy::multiple_crate_versions)]

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use zelig_docs::assets::{content_hash, default_assets, manifest_path, sync_all, SyncManifest};
use zelig_docs::config::SiteConfig;

#[derive(Parser)]
#[command(name = "zelig-docs")]
#[command(about = "Sync shared navigation assets for the Zelig documentation", long_about = None)]
struct Cli {
    /// Documentation root the assets are installed under
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Site config file (defaults to <root>/zelig-docs.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the shared navigation assets (default)
    Sync {
        /// Rewrite assets even when the remote content is unchanged
        #[arg(long)]
        force: bool,
    },
    /// Show the local state of each asset
    Status,
    /// Print the effective site configuration
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SiteConfig::load_from(path)?,
        None => SiteConfig::load(&cli.root)?,
    };

    match cli.command {
        None => run_sync(&cli.root, &config, false).await,
        Some(Commands::Sync { force }) => run_sync(&cli.root, &config, force).await,
        Some(Commands::Status) => run_status(&cli.root),
        Some(Commands::Show) => run_show(&config),
    }
}

async fn run_sync(root: &Path, config: &SiteConfig, force: bool) -> anyhow::Result<()> {
    let assets = default_assets();
    let report = sync_all(root, &assets, &config.sync, force).await?;

    println!(
        "✓ Synced {} assets ({} written, {} unchanged) in {:.1}s",
        report.outcomes.len(),
        report.written(),
        report.unchanged(),
        report.elapsed.as_secs_f64()
    );

    Ok(())
}

fn run_status(root: &Path) -> anyhow::Result<()> {
    let manifest = match SyncManifest::load(&manifest_path(root)) {
        Ok(manifest) => manifest,
        Err(e) => {
            tracing::warn!("Sync manifest unreadable ({e}), reporting files only");
            SyncManifest::default()
        }
    };

    for asset in default_assets() {
        let dest = asset.dest_in(root);
        let state = match (fs::read(&dest), manifest.find(&asset.name)) {
            (Err(_), _) => "missing".to_string(),
            (Ok(bytes), Some(entry)) => {
                if content_hash(&bytes) == entry.checksum {
                    format!("synced ({})", entry.fetched_at)
                } else {
                    "modified locally".to_string()
                }
            }
            (Ok(_), None) => "present, never synced".to_string(),
        };
        let dest_label = asset.dest.display().to_string();
        println!("{dest_label:<32} {state}");
    }

    if !manifest.assets.is_empty() {
        println!("\nLast sync: {}", manifest.last_sync);
    }

    Ok(())
}

fn run_show(config: &SiteConfig) -> anyhow::Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}
