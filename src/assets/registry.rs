use crate::error::FetchError;
use std::path::{Path, PathBuf};

/// Upstream location the shared navigation assets are published from
pub const BASE_URL: &str =
    "https://raw.githubusercontent.com/IQSS/zeligproject.org/master/Sphinx/source";

/// What a fetched asset is expected to contain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Json,
    Html,
}

impl AssetKind {
    /// Check fetched bytes against the declared kind. JSON assets must
    /// parse; HTML fragments are treated as opaque bytes.
    pub fn validate(self, url: &str, body: &[u8]) -> Result<(), FetchError> {
        match self {
            Self::Json => match serde_json::from_slice::<serde_json::Value>(body) {
                Ok(_) => Ok(()),
                Err(e) => Err(FetchError::InvalidJson {
                    url: url.to_string(),
                    source: e,
                }),
            },
            Self::Html => Ok(()),
        }
    }
}

/// One entry in the fixed asset table. The path doubles as the suffix under
/// the upstream base URL and as the destination relative to the docs root,
/// which holds for every asset the site shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetInfo {
    pub path: &'static str,
    pub kind: AssetKind,
}

/// Registry of navigation assets shared with zeligproject.org
pub const ASSETS: &[AssetInfo] = &[
    AssetInfo {
        path: "_static/zelig5models.json",
        kind: AssetKind::Json,
    },
    AssetInfo {
        path: "_static/zelig5choicemodels.json",
        kind: AssetKind::Json,
    },
    AssetInfo {
        path: "_static/modelstree.html",
        kind: AssetKind::Html,
    },
    AssetInfo {
        path: "zelignav.html",
        kind: AssetKind::Html,
    },
];

impl AssetInfo {
    /// File name without the leading directories
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.path.rsplit('/').next().unwrap_or(self.path)
    }

    /// Resolve against an upstream base URL
    #[must_use]
    pub fn resolve(&self, base_url: &str) -> Asset {
        Asset {
            name: self.name().to_string(),
            url: format!("{}/{}", base_url.trim_end_matches('/'), self.path),
            dest: PathBuf::from(self.path),
            kind: self.kind,
        }
    }
}

/// A resolved asset: where to fetch it from and where it lands
#[derive(Debug, Clone)]
pub struct Asset {
    pub name: String,
    pub url: String,
    /// Destination relative to the documentation root
    pub dest: PathBuf,
    pub kind: AssetKind,
}

impl Asset {
    /// Absolute destination under a documentation root
    #[must_use]
    pub fn dest_in(&self, root: &Path) -> PathBuf {
        root.join(&self.dest)
    }
}

/// The full asset table resolved against the fixed upstream
#[must_use]
pub fn default_assets() -> Vec<Asset> {
    ASSETS.iter().map(|info| info.resolve(BASE_URL)).collect()
}
