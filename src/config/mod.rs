// Configuration module entry point
// Layers defaults, config file, environment and the legacy deployment variables

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    CloudinaryConfig, Config, HealthConfig, HttpConfig, LocalStorageConfig, LoggingConfig,
    PerformanceConfig, RoutesConfig, ServerConfig, StorageConfig, StorageKind, StreamConfig,
    UploadConfig,
};

/// Config file used when `KIACH_CONFIG` is not set (extension optional)
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from `KIACH_CONFIG` or the default path
    pub fn load() -> Result<Self, config::ConfigError> {
        let path =
            std::env::var("KIACH_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// Precedence, lowest first: built-in defaults, the config file,
    /// `KIACH__SECTION__KEY` variables, then `PORT`, `VIDEO_PATH` and
    /// `CLOUDINARY_*`.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let legacy = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        let settings = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.header_read_timeout", 30)?
            .set_default("http.server_name", "Kiach")?
            .set_default("http.enable_cors", false)?
            .set_default("stream.buffer_size", 65_536)? // 64KB
            .set_default("stream.upstream_connect_timeout", 10)?
            .set_default("stream.upstream_header_timeout", 30)?
            .set_default("stream.degrade_unseekable", false)?
            .set_default("stream.default_content_type", "video/mp4")?
            .set_default("storage.backend", "cloudinary")?
            .set_default("storage.local.dir", "media")?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("KIACH")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .set_override_option("server.port", legacy("PORT"))?
            .set_override_option("upload.video_path", legacy("VIDEO_PATH"))?
            .set_override_option("storage.cloudinary.cloud_name", legacy("CLOUDINARY_CLOUD_NAME"))?
            .set_override_option("storage.cloudinary.api_key", legacy("CLOUDINARY_API_KEY"))?
            .set_override_option("storage.cloudinary.api_secret", legacy("CLOUDINARY_API_SECRET"))?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kiach.toml");
        std::fs::write(
            &path,
            r#"
[server]
host = "0.0.0.0"

[stream]
buffer_size = 8192
degrade_unseekable = true
default_url = "https://cdn.example.com/intro.mp4"

[storage]
backend = "local"

[storage.local]
dir = "/var/lib/kiach"
"#,
        )
        .unwrap();

        let cfg = Config::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.stream.buffer_size, 8192);
        assert!(cfg.stream.degrade_unseekable);
        assert_eq!(
            cfg.stream.default_url.as_deref(),
            Some("https://cdn.example.com/intro.mp4")
        );
        assert_eq!(cfg.storage.backend, StorageKind::Local);
        assert_eq!(cfg.storage.local.dir, "/var/lib/kiach");

        // Untouched keys keep their defaults
        assert_eq!(cfg.stream.upstream_header_timeout, 30);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert_eq!(cfg.storage.cloudinary.folder, "videos");
        assert!(cfg.routes.health.enabled);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let cfg = Config::load_from("/nonexistent/kiach-config").unwrap();
        assert_eq!(cfg.http.server_name, "Kiach");
        assert_eq!(cfg.stream.default_content_type, "video/mp4");
        assert_eq!(cfg.storage.backend, StorageKind::Cloudinary);
        assert!(cfg.get_socket_addr().is_ok());
    }
}
