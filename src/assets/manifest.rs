use crate::error::{DocsError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the manifest file kept at the documentation root
pub const MANIFEST_FILE: &str = ".zelig-sync.json";

/// Record of one successfully synced asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncedAsset {
    pub name: String,
    /// Destination relative to the documentation root
    pub dest: String,
    /// `sha256:<hex>` digest of the installed content
    pub checksum: String,
    pub size_bytes: u64,
    /// RFC 3339 timestamp of the last fetch that confirmed this content
    pub fetched_at: String,
}

/// Manifest tracking the last confirmed state of each asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncManifest {
    pub assets: Vec<SyncedAsset>,
    pub last_sync: String,
}

impl Default for SyncManifest {
    fn default() -> Self {
        Self {
            assets: Vec::new(),
            last_sync: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl SyncManifest {
    /// Load the manifest, or start fresh if none exists yet
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| DocsError::Config(format!("Failed to parse sync manifest: {e}")))
    }

    /// Save the manifest atomically via a temp file and rename
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| DocsError::Config(format!("Failed to serialize sync manifest: {e}")))?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, path)?;

        Ok(())
    }

    /// Record an asset, replacing any previous entry with the same name
    pub fn record(&mut self, asset: SyncedAsset) {
        self.assets.retain(|a| a.name != asset.name);
        self.assets.push(asset);
        self.last_sync = chrono::Utc::now().to_rfc3339();
    }

    /// Look up an asset by name
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&SyncedAsset> {
        self.assets.iter().find(|a| a.name == name)
    }
}

/// Where the manifest lives for a documentation root
#[must_use]
pub fn manifest_path(root: &Path) -> PathBuf {
    root.join(MANIFEST_FILE)
}

/// `sha256:<hex>` digest of a byte buffer, as stored in the manifest
#[must_use]
pub fn content_hash(bytes: &[u8]) -> String {
    format!("sha256:{:x}", Sha256::digest(bytes))
}
