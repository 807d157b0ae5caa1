// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub stream: StreamConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    pub access_log_format: String,
    /// Log file path (optional, stderr if not set)
    #[serde(default)]
    pub log_file: Option<String>,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Seconds allowed for a client to send request headers
    pub header_read_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
}

/// Range streaming configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StreamConfig {
    /// Copy buffer size in bytes
    pub buffer_size: usize,
    /// Seconds
    pub upstream_connect_timeout: u64,
    /// Seconds to wait for upstream response headers
    pub upstream_header_timeout: u64,
    /// Serve 200 with the full body when the source cannot seek
    pub degrade_unseekable: bool,
    /// Media URL served on `/stream` without an id
    #[serde(default)]
    pub default_url: Option<String>,
    /// Used when the source declares no media type
    pub default_content_type: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            buffer_size: 64 * 1024,
            upstream_connect_timeout: 10,
            upstream_header_timeout: 30,
            degrade_unseekable: false,
            default_url: None,
            default_content_type: "video/mp4".to_string(),
        }
    }
}

/// Which storage backend handles uploads
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    Cloudinary,
    Local,
}

/// Storage configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageKind,
    #[serde(default)]
    pub cloudinary: CloudinaryConfig,
    pub local: LocalStorageConfig,
}

/// Cloudinary credentials and upload target
#[derive(Debug, Deserialize, Clone)]
pub struct CloudinaryConfig {
    #[serde(default)]
    pub cloud_name: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default = "default_cloudinary_folder")]
    pub folder: String,
    #[serde(default = "default_cloudinary_api_base")]
    pub api_base: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_cloudinary_folder() -> String {
    "videos".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_cloudinary_api_base() -> String {
    "https://api.cloudinary.com".to_string()
}

impl Default for CloudinaryConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            folder: default_cloudinary_folder(),
            api_base: default_cloudinary_api_base(),
        }
    }
}

/// Local disk storage
#[derive(Debug, Deserialize, Clone)]
pub struct LocalStorageConfig {
    pub dir: String,
}

/// Upload route configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct UploadConfig {
    /// File uploaded by `POST /upload`
    #[serde(default)]
    pub video_path: Option<String>,
}

/// Routes configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RoutesConfig {
    /// Health check configuration
    #[serde(default)]
    pub health: HealthConfig,
}

/// Health check configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HealthConfig {
    /// Enable health check endpoints
    #[serde(default = "default_health_enabled")]
    pub enabled: bool,
    /// Liveness probe path (default: /healthz)
    #[serde(default = "default_healthz_path")]
    pub liveness_path: String,
    /// Readiness probe path (default: /readyz)
    #[serde(default = "default_readyz_path")]
    pub readiness_path: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_health_enabled() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_healthz_path() -> String {
    "/healthz".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_readyz_path() -> String {
    "/readyz".to_string()
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_health_enabled(),
            liveness_path: default_healthz_path(),
            readiness_path: default_readyz_path(),
        }
    }
}
