//! Configuration loading and resolution
//!
//! Configuration file path resolution priority order:
//! 1. Command-line argument (highest priority)
//! 2. `MAAP_CONFIG` environment variable
//! 3. Platform config directory (`~/.config/maap/config.toml` on Linux)
//! 4. Compiled defaults (fallback)
//!
//! Which completion-detection policy applies to a given record store is a
//! deployment property and is therefore always an explicit configuration
//! choice, never inferred from the store's responses.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// How completion of a submitted analysis is detected while polling the
/// record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionPolicy {
    /// Scan each fetched collection for a record whose `audioFile` field
    /// contains the submitted filename (case-insensitive substring).
    /// Preferred whenever the store round-trips the filename.
    IdentifierMatch,
    /// Compare the last element of each fetched collection against the last
    /// element of a baseline snapshot. Used for stores that only expose a
    /// flat appended feed with no reliable identifier.
    ChangeDetection,
}

/// Wire encoding used when forwarding an uploaded file to the automation
/// endpoint. Both appear across deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UploadEncoding {
    /// Multipart form data with a single file part
    Multipart,
    /// JSON envelope: `{fileName, mimeType, data}` with base64 body
    Base64Json,
}

/// Portal configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Port the portal HTTP server binds on 127.0.0.1
    pub listen_port: u16,
    /// Record store endpoint (GET, returns a JSON array of records)
    pub store_url: String,
    /// Upload endpoint (POST, accepts the audio file)
    pub upload_url: String,
    /// Encoding variant for the upload endpoint
    pub upload_encoding: UploadEncoding,
    /// Completion-detection policy for the record store
    pub detection_policy: DetectionPolicy,
    /// Maximum polling attempts before reporting a timeout
    pub poll_max_attempts: u32,
    /// Delay between polling attempts, in seconds
    pub poll_interval_seconds: f64,
    /// Request timeout for record store fetches, in seconds
    pub fetch_timeout_seconds: u64,
    /// Request timeout for uploads, in seconds (uploads carry the file body)
    pub upload_timeout_seconds: u64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            listen_port: 5730,
            store_url: String::new(),
            upload_url: String::new(),
            upload_encoding: UploadEncoding::Multipart,
            detection_policy: DetectionPolicy::IdentifierMatch,
            poll_max_attempts: 60,
            poll_interval_seconds: 4.0,
            fetch_timeout_seconds: 20,
            upload_timeout_seconds: 120,
        }
    }
}

impl PortalConfig {
    /// Load configuration, resolving the file path via the priority order
    /// documented at module level. A missing file yields compiled defaults
    /// (which then fail validation because the endpoint URLs are empty).
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        match resolve_config_path(cli_path) {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                Self::from_file(&path)
            }
            None => {
                info!("No configuration file found; using compiled defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse configuration from a specific TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Validate the configuration before use.
    ///
    /// Enforces the watcher preconditions (at least one attempt, a positive
    /// interval) and requires both endpoint URLs.
    pub fn validate(&self) -> Result<()> {
        if self.store_url.trim().is_empty() {
            return Err(Error::Config(
                "store_url is not configured (set it in config.toml)".to_string(),
            ));
        }
        if self.upload_url.trim().is_empty() {
            return Err(Error::Config(
                "upload_url is not configured (set it in config.toml)".to_string(),
            ));
        }
        if self.poll_max_attempts < 1 {
            return Err(Error::Config(
                "poll_max_attempts must be at least 1".to_string(),
            ));
        }
        if interval_from_seconds(self.poll_interval_seconds).is_err() {
            return Err(Error::Config(
                "poll_interval_seconds must be a positive, finite number of seconds".to_string(),
            ));
        }
        Ok(())
    }

    /// Polling interval as a Duration. `validate()` guarantees the
    /// configured value converts; the fallback is the default cadence.
    pub fn poll_interval(&self) -> Duration {
        interval_from_seconds(self.poll_interval_seconds)
            .unwrap_or_else(|_| Duration::from_secs(4))
    }

    /// Record store fetch timeout as a Duration
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }

    /// Upload request timeout as a Duration
    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_seconds)
    }
}

/// Convert a seconds value into a polling interval Duration.
///
/// Rejects non-positive and non-finite values, and values out of range for
/// a Duration. `Duration::from_secs_f64` panics on the latter, so every
/// interval from configuration or a request goes through here.
pub fn interval_from_seconds(seconds: f64) -> Result<Duration> {
    if !(seconds > 0.0) {
        return Err(Error::InvalidInput(
            "interval_seconds must be greater than 0".to_string(),
        ));
    }
    Duration::try_from_secs_f64(seconds)
        .map_err(|_| Error::InvalidInput(format!("interval_seconds out of range: {}", seconds)))
}

/// Resolve the configuration file path, or None if no file exists anywhere
/// in the priority chain.
fn resolve_config_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument (used even if the file is missing,
    // so a typo'd path surfaces as a load error rather than silent defaults)
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var("MAAP_CONFIG") {
        return Some(PathBuf::from(path));
    }

    // Priority 3: Platform config directory
    let candidate = dirs::config_dir().map(|d| d.join("maap").join("config.toml"));
    if let Some(path) = candidate {
        if path.exists() {
            return Some(path);
        }
    }

    None
}
