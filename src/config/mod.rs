// Configuration module entry point
// Manages application configuration and runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::Config;

impl Config {
    /// Load configuration from specified file path (without extension)
    /// The file is optional; `main` falls back to "server" when no path is given
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        let settings = config::Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("content.root", defaults.content.root)?
            .set_default("content.index_file", defaults.content.index_file)?
            .set_default("content.images_dir", defaults.content.images_dir)?
            .set_default("content.images_route", defaults.content.images_route)?
            .set_default("content.image_extensions", defaults.content.image_extensions)?
            .set_default("content.confine_to_root", defaults.content.confine_to_root)?
            .set_default("logging.access_log", defaults.logging.access_log)?
            .set_default("logging.access_log_format", defaults.logging.access_log_format)?
            .set_default(
                "performance.keep_alive_timeout",
                defaults.performance.keep_alive_timeout,
            )?
            .set_default("performance.read_timeout", defaults.performance.read_timeout)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SERVER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut cfg: Self = settings.try_deserialize()?;
        cfg.normalize();
        Ok(cfg)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Lowercase and strip leading dots from the image extension allow-list
    fn normalize(&mut self) {
        for ext in &mut self.content.image_extensions {
            *ext = ext.trim_start_matches('.').to_ascii_lowercase();
        }
    }
}
