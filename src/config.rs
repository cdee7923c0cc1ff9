use crate::color::Theme;
use crate::error::FieldError;
use crate::settings::FieldSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete application configuration for export/import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Version field for future compatibility
    pub version: u32,
    /// Field settings
    pub settings: FieldSettings,
    /// Theme at startup
    pub theme: Theme,
    /// Seed for particle generation; random when absent
    pub seed: Option<u64>,
    /// Start with the reduced-motion preference on
    pub reduced_motion: bool,
}

impl AppConfig {
    /// Export config to a JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<(), FieldError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Import config from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, FieldError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            settings: FieldSettings::default(),
            theme: Theme::default(),
            seed: None,
            reduced_motion: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use tempfile::NamedTempFile;

    #[test]
    fn test_all_fields_preserved() {
        let original = AppConfig {
            version: 1,
            settings: FieldSettings {
                point_count: 33,
                connection_distance: 120.0,
                speed: 0.45,
                radius_base: 2.0,
                radius_variance: 1.0,
                connection_opacity_scale: 0.25,
                stroke_color_dark: Rgba::new(200, 200, 255, 0.2),
                stroke_color_light: Rgba::new(10, 20, 30, 0.05),
                respect_reduced_motion: false,
            },
            theme: Theme::Light,
            seed: Some(99),
            reduced_motion: true,
        };

        let json = serde_json::to_string(&original).unwrap();
        let restored: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_config_file_save_and_load() {
        let config = AppConfig::default();
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).unwrap();
        let loaded = AppConfig::load_from_file(temp_file.path()).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), r#"{"theme": "Light", "settings": {"speed": 1.0}}"#).unwrap();

        let loaded = AppConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded.theme, Theme::Light);
        assert_eq!(loaded.settings.speed, 1.0);
        assert_eq!(loaded.settings.point_count, 20);
        assert_eq!(loaded.version, 1);
    }

    #[test]
    fn test_invalid_config_file() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "not valid json").unwrap();

        let result = AppConfig::load_from_file(temp_file.path());
        assert!(matches!(result, Err(FieldError::Json(_))));
    }

    #[test]
    fn test_missing_config_file() {
        let result = AppConfig::load_from_file(Path::new("/nonexistent/path/config.json"));
        assert!(matches!(result, Err(FieldError::Io(_))));
    }
}
