//! # MAAP Common Library
//!
//! Shared code for the Mentoring Audio Analysis Portal:
//! - Error types
//! - Configuration loading (TOML + environment + CLI)
//! - The analysis record model returned by the remote record store

pub mod config;
pub mod error;
pub mod record;

pub use config::PortalConfig;
pub use error::{Error, Result};
pub use record::AnalysisRecord;
