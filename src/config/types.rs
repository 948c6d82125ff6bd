// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            workers: None,
        }
    }
}

/// What gets served and from where
#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    /// Server root, relative paths are resolved against the working directory
    pub root: String,
    /// File served for directory requests
    pub index_file: String,
    /// Image directory, relative to the server root
    pub images_dir: String,
    /// Path of the image listing endpoint
    pub images_route: String,
    /// Lowercase extensions (without dot) reported by the image listing
    pub image_extensions: Vec<String>,
    /// Reject resolved paths that fall outside the server root
    #[serde(default)]
    pub confine_to_root: bool,
}

impl ContentConfig {
    /// URL prefix under which listed images are served, e.g. `/images`
    pub fn images_url_prefix(&self) -> String {
        format!("/{}", self.images_dir.trim_matches('/'))
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            root: ".".to_string(),
            index_file: "index.html".to_string(),
            images_dir: "images".to_string(),
            images_route: "/api/images".to_string(),
            image_extensions: ["jpg", "jpeg", "png", "gif", "webp"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            confine_to_root: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub access_log: bool,
    /// Access log format (brief, common, combined, json, or custom pattern)
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            access_log: true,
            access_log_format: "brief".to_string(),
            access_log_file: None,
            error_log_file: None,
        }
    }
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    /// Seconds allowed for a client to send request headers, 0 disables
    pub read_timeout: u64,
    #[serde(default)]
    pub max_connections: Option<u64>,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            keep_alive_timeout: 75,
            read_timeout: 30,
            max_connections: None,
        }
    }
}
