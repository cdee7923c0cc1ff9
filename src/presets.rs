use crate::color::Rgba;
use crate::error::FieldError;
use crate::settings::FieldSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// A named set of field settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub description: String,
    pub settings: FieldSettings,
}

impl Preset {
    pub fn new(name: impl Into<String>, description: impl Into<String>, settings: FieldSettings) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            settings,
        }
    }
}

/// Section-style preset: same distance, varying density, pace and contrast
fn section(
    point_count: usize,
    speed: f32,
    radius_base: f32,
    radius_variance: f32,
    connection_opacity_scale: f32,
    stroke_alpha_dark: f32,
    stroke_alpha_light: f32,
) -> FieldSettings {
    FieldSettings {
        point_count,
        speed,
        radius_base,
        radius_variance,
        connection_opacity_scale,
        stroke_color_dark: Rgba::new(255, 255, 255, stroke_alpha_dark),
        stroke_color_light: Rgba::new(0, 0, 0, stroke_alpha_light),
        ..Default::default()
    }
}

/// Built-in presets, one per page section style
pub fn builtin_presets() -> Vec<Preset> {
    vec![
        Preset::new("Hero", "Dense, bright and lively", section(25, 0.3, 2.0, 3.0, 0.8, 0.15, 0.12)),
        Preset::new("About", "Balanced default field", section(20, 0.2, 1.5, 2.5, 0.6, 0.1, 0.08)),
        Preset::new("Skills", "Balanced default field", section(20, 0.2, 1.5, 2.5, 0.6, 0.1, 0.08)),
        // Fewer points for less distraction behind cards
        Preset::new("Projects", "Sparse backdrop for busy content", section(15, 0.15, 1.5, 2.0, 0.4, 0.08, 0.05)),
        Preset::new("Experience", "Slow and faint", section(15, 0.1, 1.5, 2.0, 0.3, 0.05, 0.04)),
        Preset::new("Contact", "Calm with medium contrast", section(20, 0.15, 1.5, 2.0, 0.5, 0.08, 0.06)),
        Preset::new("Footer", "Few small points, barely moving", section(12, 0.1, 1.0, 1.5, 0.3, 0.05, 0.04)),
    ]
}

/// Manager for loading and saving presets
pub struct PresetManager {
    /// Built-in presets that ship with the app
    pub builtin: Vec<Preset>,
    /// User-created presets loaded from disk
    pub user: Vec<Preset>,
    dir: Option<PathBuf>,
}

impl Default for PresetManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PresetManager {
    /// Built-ins plus user presets from the platform config directory
    pub fn new() -> Self {
        Self::with_dir(Self::presets_dir())
    }

    /// Built-ins plus user presets from `dir`, if any
    pub fn with_dir(dir: Option<PathBuf>) -> Self {
        let mut manager = Self {
            builtin: builtin_presets(),
            user: Vec::new(),
            dir,
        };
        manager.load_user_presets();
        manager
    }

    /// Get the presets directory path
    fn presets_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("network-field").join("presets"))
    }

    /// Load user presets from disk, skipping unreadable files
    fn load_user_presets(&mut self) {
        let Some(dir) = &self.dir else {
            return;
        };
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.extension().is_some_and(|e| e == "json") {
                continue;
            }
            let parsed = fs::read_to_string(&path)
                .map_err(FieldError::from)
                .and_then(|content| serde_json::from_str::<Preset>(&content).map_err(FieldError::from));
            match parsed {
                Ok(preset) => self.user.push(preset),
                Err(e) => log::warn!("skipping preset {}: {}", path.display(), e),
            }
        }
        self.user.sort_by(|a, b| a.name.cmp(&b.name));
    }

    fn file_for(&self, name: &str) -> Result<PathBuf, FieldError> {
        let dir = self.dir.as_ref().ok_or(FieldError::NoConfigDir)?;

        // Sanitize filename
        let filename = name
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect::<String>();

        Ok(dir.join(format!("{}.json", filename)))
    }

    /// Save a preset to disk, replacing a user preset of the same name
    pub fn save_preset(&mut self, preset: Preset) -> Result<(), FieldError> {
        let path = self.file_for(&preset.name)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let json = serde_json::to_string_pretty(&preset)?;
        fs::write(&path, json)?;
        log::info!("saved preset '{}' to {}", preset.name, path.display());

        match self.user.iter_mut().find(|p| p.name == preset.name) {
            Some(existing) => *existing = preset,
            None => self.user.push(preset),
        }

        Ok(())
    }

    /// Delete a user preset
    pub fn delete_preset(&mut self, name: &str) -> Result<(), FieldError> {
        let path = self.file_for(name)?;

        // Find and remove from user list
        if let Some(pos) = self.user.iter().position(|p| p.name == name) {
            self.user.remove(pos);
        }

        if path.exists() {
            fs::remove_file(&path)?;
        }

        Ok(())
    }

    /// Get all presets (builtin + user)
    pub fn all_presets(&self) -> impl Iterator<Item = &Preset> {
        self.builtin.iter().chain(self.user.iter())
    }

    /// Find a preset by name
    pub fn find(&self, name: &str) -> Option<&Preset> {
        self.all_presets().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Get preset names for display
    pub fn preset_names(&self) -> Vec<&str> {
        self.all_presets().map(|p| p.name.as_str()).collect()
    }
}
