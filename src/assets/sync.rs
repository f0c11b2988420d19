use crate::assets::fetch::Fetcher;
use crate::assets::manifest::{content_hash, manifest_path, SyncManifest, SyncedAsset};
use crate::assets::registry::Asset;
use crate::config::SyncConfig;
use crate::error::{DocsError, Result};
use futures_util::future::join_all;
use indicatif::ProgressBar;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// How a single asset ended up after a sync pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetStatus {
    /// Downloaded and installed
    Written { bytes: u64 },
    /// Remote content matches the local copy; nothing was written
    Unchanged,
    /// Fetch or validation failed; any previous local copy is untouched
    Failed { reason: String },
}

/// Outcome for one asset in a sync pass
#[derive(Debug, Clone)]
pub struct AssetOutcome {
    pub name: String,
    pub dest: PathBuf,
    pub status: AssetStatus,
}

/// Summary of a full sync pass
#[derive(Debug)]
pub struct SyncReport {
    pub outcomes: Vec<AssetOutcome>,
    pub elapsed: Duration,
}

impl SyncReport {
    #[must_use]
    pub fn written(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, AssetStatus::Written { .. }))
            .count()
    }

    #[must_use]
    pub fn unchanged(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == AssetStatus::Unchanged)
            .count()
    }
}

struct FetchedAsset {
    status: AssetStatus,
    record: SyncedAsset,
}

/// Fetch every asset and install it under `root`.
///
/// Assets are fetched concurrently and independently: one failure does not
/// stop or roll back the others. If any asset fails, the successes are still
/// installed and recorded, and the sync as a whole is reported incomplete.
pub async fn sync_all(
    root: &Path,
    assets: &[Asset],
    config: &SyncConfig,
    force: bool,
) -> Result<SyncReport> {
    let started = Instant::now();
    let fetcher = Fetcher::new(config)?;

    let manifest_file = manifest_path(root);
    let mut manifest = match SyncManifest::load(&manifest_file) {
        Ok(manifest) => manifest,
        Err(e) => {
            tracing::warn!("Sync manifest unreadable ({e}), starting fresh");
            SyncManifest::default()
        }
    };

    tracing::info!("Syncing {} assets into {}", assets.len(), root.display());
    let progress = ProgressBar::new(assets.len() as u64);

    let futures = assets.iter().map(|asset| {
        let fetcher = &fetcher;
        let progress = progress.clone();
        async move {
            let (status, record) = match sync_one(fetcher, root, asset, force).await {
                Ok(fetched) => (fetched.status, Some(fetched.record)),
                Err(e) => {
                    tracing::error!("Failed to sync {}: {e}", asset.name);
                    let reason = e.to_string();
                    (AssetStatus::Failed { reason }, None)
                }
            };

            match &status {
                AssetStatus::Written { bytes } => {
                    progress.println(format!("✓ {} ({bytes} bytes)", asset.dest.display()));
                }
                AssetStatus::Unchanged => {
                    progress.println(format!("✓ {} (unchanged)", asset.dest.display()));
                }
                AssetStatus::Failed { reason } => {
                    progress.println(format!("✗ {}: {reason}", asset.dest.display()));
                }
            }
            progress.inc(1);

            let outcome = AssetOutcome {
                name: asset.name.clone(),
                dest: asset.dest.clone(),
                status,
            };
            (outcome, record)
        }
    });

    let results = join_all(futures).await;
    progress.finish_and_clear();

    let mut outcomes = Vec::with_capacity(results.len());
    let mut recorded = false;
    for (outcome, record) in results {
        if let Some(record) = record {
            manifest.record(record);
            recorded = true;
        }
        outcomes.push(outcome);
    }
    if recorded {
        manifest.save(&manifest_file)?;
    }

    let failed: Vec<String> = outcomes
        .iter()
        .filter(|o| matches!(o.status, AssetStatus::Failed { .. }))
        .map(|o| o.name.clone())
        .collect();

    let report = SyncReport {
        outcomes,
        elapsed: started.elapsed(),
    };

    if failed.is_empty() {
        tracing::info!(
            "Synced {} assets in {:?} ({} written, {} unchanged)",
            report.outcomes.len(),
            report.elapsed,
            report.written(),
            report.unchanged()
        );
        Ok(report)
    } else {
        Err(DocsError::SyncIncomplete {
            total: report.outcomes.len(),
            failed,
        })
    }
}

async fn sync_one(
    fetcher: &Fetcher,
    root: &Path,
    asset: &Asset,
    force: bool,
) -> Result<FetchedAsset> {
    let body = fetcher.fetch(&asset.url).await?;
    asset.kind.validate(&asset.url, &body)?;

    let checksum = content_hash(&body);
    let dest = asset.dest_in(root);

    let unchanged = !force
        && fs::read(&dest)
            .map(|existing| content_hash(&existing) == checksum)
            .unwrap_or(false);

    let status = if unchanged {
        tracing::debug!("{} unchanged, skipping write", asset.name);
        AssetStatus::Unchanged
    } else {
        atomic_write(&dest, &body)?;
        tracing::debug!("Wrote {} ({} bytes)", dest.display(), body.len());
        AssetStatus::Written {
            bytes: body.len() as u64,
        }
    };

    Ok(FetchedAsset {
        status,
        record: SyncedAsset {
            name: asset.name.clone(),
            dest: asset.dest.display().to_string(),
            checksum,
            size_bytes: body.len() as u64,
            fetched_at: chrono::Utc::now().to_rfc3339(),
        },
    })
}

/// Write via a temp file and rename so an interrupted sync never leaves a
/// truncated asset behind
fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, content)?;
    fs::rename(&tmp_path, path)?;

    Ok(())
}
