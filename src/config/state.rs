// Application state module
// Immutable per-process state shared by every connection

use std::path::{Path, PathBuf};

use super::types::Config;

/// Application state
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    /// Absolute server root
    pub root: PathBuf,
}

impl AppState {
    /// Build state from configuration, resolving the server root against the
    /// current working directory
    pub fn new(config: Config) -> std::io::Result<Self> {
        let cwd = std::env::current_dir()?;
        Ok(Self::with_base(config, &cwd))
    }

    /// Build state resolving a relative server root against `base`
    pub fn with_base(config: Config, base: &Path) -> Self {
        let configured = Path::new(&config.content.root);
        let root = if configured.is_absolute() {
            configured.to_path_buf()
        } else {
            base.join(configured)
        };
        // Drop `.` components so `..` in request paths pops a real directory
        let root = root.components().collect();
        Self { config, root }
    }

    /// Absolute path of the image directory
    pub fn images_dir(&self) -> PathBuf {
        self.root.join(&self.config.content.images_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_root_joined_onto_base() {
        let mut config = Config::default();
        config.content.root = "public".to_string();
        let state = AppState::with_base(config, Path::new("/srv/demos"));
        assert_eq!(state.root, PathBuf::from("/srv/demos/public"));
        assert_eq!(state.images_dir(), PathBuf::from("/srv/demos/public/images"));
    }

    #[test]
    fn test_default_root_is_base() {
        let state = AppState::with_base(Config::default(), Path::new("/srv/demos"));
        assert_eq!(state.root, PathBuf::from("/srv/demos"));
        assert_eq!(state.root.parent(), Some(Path::new("/srv")));
    }

    #[test]
    fn test_absolute_root_kept() {
        let mut config = Config::default();
        config.content.root = "/var/www".to_string();
        let state = AppState::with_base(config, Path::new("/ignored"));
        assert_eq!(state.root, PathBuf::from("/var/www"));
    }
}
