use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration (persistent)
///
/// Holds preferences only; key colors live in the keyboard's own data files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Keyboard asset folder opened at startup (bundled keyboard when unset)
    #[serde(default)]
    pub asset_dir: Option<PathBuf>,

    /// Color picker width in points
    #[serde(default = "default_picker_width")]
    pub picker_width: f32,

    /// Color the picker starts with
    #[serde(default = "default_picker_color")]
    pub default_color: String,

    /// Recently opened asset folders (newest first, max 10 items)
    #[serde(default)]
    pub recent_asset_dirs: Vec<PathBuf>,
}

fn default_picker_width() -> f32 {
    320.0
}

fn default_picker_color() -> String {
    "#ff0000".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            asset_dir: None,
            picker_width: default_picker_width(),
            default_color: default_picker_color(),
            recent_asset_dirs: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load config from standard location
    /// Returns default config if file doesn't exist or is malformed
    pub fn load() -> Self {
        match Self::try_load() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config: {}", e);
                log::warn!("Using default configuration");
                Self::default()
            }
        }
    }

    /// Try to load config, returning error if something goes wrong
    fn try_load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;
        Self::from_json(&contents)
    }

    /// Parse config JSON; missing fields fall back to their defaults
    fn from_json(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: AppConfig = serde_json::from_str(contents)?;
        Ok(config)
    }

    /// Save config to standard location
    /// Logs error but doesn't block if save fails
    pub fn save(&self) {
        if let Err(e) = self.try_save() {
            log::warn!("Failed to save config: {}", e);
        }
    }

    /// Try to save config atomically (write to temp, then rename)
    fn try_save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;

        let temp_path = config_path.with_extension("json.tmp");
        std::fs::write(&temp_path, json)?;
        std::fs::rename(temp_path, config_path)?;

        Ok(())
    }

    /// Get cross-platform config file path
    fn config_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        use directories::ProjectDirs;

        let proj_dirs = ProjectDirs::from("", "", "keycap-editor")
            .ok_or("Failed to determine config directory")?;

        Ok(proj_dirs.config_dir().join("config.json"))
    }

    /// Record an asset folder as most recently opened
    /// - Canonicalize path (resolve relative paths and symlinks)
    /// - Move to front if already in list
    /// - Enforce 10-item limit
    /// - Auto-save config
    pub fn add_recent_asset_dir(&mut self, path: PathBuf) {
        let canonical = match path.canonicalize() {
            Ok(p) => p,
            Err(e) => {
                log::warn!("Could not canonicalize path {:?}: {}", path, e);
                return;
            }
        };

        self.push_recent(canonical);
        self.save();
    }

    fn push_recent(&mut self, path: PathBuf) {
        self.recent_asset_dirs.retain(|p| p != &path);
        self.recent_asset_dirs.insert(0, path);
        self.recent_asset_dirs.truncate(10);
    }

    /// Get recent asset folders, filtering out ones that no longer exist
    /// Returns newest first
    pub fn get_recent_asset_dirs(&self) -> Vec<PathBuf> {
        self.recent_asset_dirs
            .iter()
            .filter(|p| p.exists())
            .cloned()
            .collect()
    }

    /// Clear all recent asset folders
    pub fn clear_recent_asset_dirs(&mut self) {
        self.recent_asset_dirs.clear();
        self.save();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = AppConfig::from_json(r#"{"picker_width": 240.0}"#).unwrap();
        assert_eq!(config.picker_width, 240.0);
        assert_eq!(config.default_color, "#ff0000");
        assert!(config.asset_dir.is_none());
        assert!(config.recent_asset_dirs.is_empty());
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        assert!(AppConfig::from_json("{").is_err());
        assert!(AppConfig::from_json(r#"{"picker_width": "wide"}"#).is_err());
    }

    #[test]
    fn test_recent_list_moves_to_front_and_caps() {
        let mut config = AppConfig::default();
        for i in 0..12 {
            config.push_recent(PathBuf::from(format!("/boards/{}", i)));
        }
        config.push_recent(PathBuf::from("/boards/5"));

        assert_eq!(config.recent_asset_dirs.len(), 10);
        assert_eq!(config.recent_asset_dirs[0], PathBuf::from("/boards/5"));
        assert_eq!(
            config.recent_asset_dirs.iter().filter(|p| **p == PathBuf::from("/boards/5")).count(),
            1
        );
    }
}
