use thiserror::Error;

/// Main error type for zelig-docs
#[derive(Error, Debug)]
pub enum DocsError {
    #[error("Config error: {0}\n\nTroubleshooting:\n- Check the site config: <root>/zelig-docs.toml (or $ZELIG_DOCS_CONFIG)\n- A missing default file is fine; built-in defaults are used\n- Run with RUST_LOG=debug for more details")]
    Config(String),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to sync {} of {total} assets: {}", .failed.len(), .failed.join(", "))]
    SyncIncomplete { total: usize, failed: Vec<String> },
}

/// Failure while fetching a single remote asset. Every variant names the URL
/// so a broken build can be traced to the exact asset.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error fetching {url}: {source}\n\nTroubleshooting:\n- Check internet connection\n- The upstream repository may be temporarily unavailable\n- Try increasing timeout_secs in the [sync] config section")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("{url} is not valid JSON: {source}")]
    InvalidJson {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// Whether a retry could plausibly succeed. Transport failures and
    /// server-side errors are transient; 4xx statuses and malformed content
    /// are not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Status { status, .. } => status.is_server_error(),
            Self::InvalidJson { .. } => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, DocsError>;
