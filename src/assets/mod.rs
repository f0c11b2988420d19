//! Remote navigation assets shared with the Zelig project site.
//!
//! The docs embed a handful of files published by zeligproject.org: two
//! model index JSON files, the rendered models tree, and the shared navbar
//! fragment. This module knows which files those are ([`registry`]), fetches
//! them ([`fetch`]), installs them under the documentation root ([`sync`]),
//! and tracks what was installed ([`manifest`]).

pub mod fetch;
pub mod manifest;
pub mod registry;
pub mod sync;

pub use fetch::Fetcher;
pub use manifest::{content_hash, manifest_path, SyncManifest, SyncedAsset};
pub use registry::{default_assets, Asset, AssetInfo, AssetKind, ASSETS, BASE_URL};
pub use sync::{sync_all, AssetOutcome, AssetStatus, SyncReport};
