use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::gallery::{NOMINAL_HEIGHT, NOMINAL_WIDTH};

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub breaker: BreakerConfig,
    #[serde(default)]
    pub validator: ValidatorConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    "0.0.0.0:8080".parse().unwrap()
}

/// Remote gallery listing endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemoteConfig {
    #[serde(default = "default_remote_base_url")]
    pub base_url: String,
    /// Bound on a single listing request, independent of the breaker's open
    /// timeout.
    #[serde(default = "default_remote_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Optional pagination query parameters passed through to the endpoint.
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl RemoteConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_remote_base_url(),
            request_timeout_secs: default_remote_timeout_secs(),
            page: None,
            per_page: None,
        }
    }
}

fn default_remote_base_url() -> String {
    "http://localhost:4000/api".to_string()
}

fn default_remote_timeout_secs() -> u64 {
    10
}

/// Circuit breaker tuning
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BreakerConfig {
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    #[serde(default = "default_open_timeout_secs")]
    pub open_timeout_secs: u64,
}

impl BreakerConfig {
    pub fn open_timeout(&self) -> Duration {
        Duration::from_secs(self.open_timeout_secs)
    }
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            open_timeout_secs: default_open_timeout_secs(),
        }
    }
}

fn default_failure_threshold() -> u32 {
    3
}

fn default_open_timeout_secs() -> u64 {
    30
}

/// Local asset validation
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValidatorConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
    /// Origin the static file server answers on; relative asset paths are
    /// probed against it.
    #[serde(default = "default_probe_base_url")]
    pub probe_base_url: String,
}

impl ValidatorConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            probe_timeout_secs: default_probe_timeout_secs(),
            probe_base_url: default_probe_base_url(),
        }
    }
}

fn default_batch_size() -> usize {
    5
}

fn default_probe_timeout_secs() -> u64 {
    5
}

fn default_probe_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

/// Local asset manifest and layout
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssetsConfig {
    /// Manifest written by the offline sync job.
    #[serde(default = "default_manifest_path")]
    pub manifest_path: PathBuf,
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,
    /// Nominal dimensions reported for local assets (never probed).
    #[serde(default = "default_width")]
    pub default_width: u32,
    #[serde(default = "default_height")]
    pub default_height: u32,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            manifest_path: default_manifest_path(),
            public_prefix: default_public_prefix(),
            default_width: default_width(),
            default_height: default_height(),
        }
    }
}

fn default_manifest_path() -> PathBuf {
    PathBuf::from("config/galleries.json")
}

fn default_public_prefix() -> String {
    "/images/galeria".to_string()
}

fn default_width() -> u32 {
    NOMINAL_WIDTH
}

fn default_height() -> u32 {
    NOMINAL_HEIGHT
}
