#![allow(clippy::multiple_crate_versions)]

pub mod assets;
pub mod config;
pub mod error;

pub use error::{DocsError, Result};
