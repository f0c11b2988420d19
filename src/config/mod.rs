//! Site configuration for zelig-docs
//!
//! Loads config from `<root>/zelig-docs.toml`, or from the file named by
//! `$ZELIG_DOCS_CONFIG` when set.
//! Falls back to built-in defaults if the file doesn't exist, so a bare
//! checkout resolves its configuration offline.
//! Partial configs are merged with defaults using serde's default attributes.
//!
//! # Example
//!
//! ```no_run
//! use zelig_docs::config::SiteConfig;
//!
//! let config = SiteConfig::load(std::path::Path::new(".")).expect("Failed to load config");
//! println!("Project: {}", config.project.name);
//! println!("HTML theme: {}", config.html.theme);
//! ```

pub mod schema;

pub use schema::{SiteConfig, SyncConfig};
