//! Centralized runtime options with TOML preset support.
//!
//! Tunable settings (bloom, camera, particles, lighting, asset paths,
//! keybindings) are consolidated here. Options serialize to/from TOML so a
//! session can start from, and save back to, a preset file.

mod assets;
mod bloom;
mod camera;
mod keybindings;
mod lighting;
mod particles;

use std::path::Path;

pub use assets::AssetOptions;
pub use bloom::{
    BloomSetting, BloomSettings, BLOOM_SETTING_MAX, BLOOM_SETTING_MIN,
};
pub use camera::CameraOptions;
pub use keybindings::KeybindingOptions;
pub use lighting::LightingOptions;
pub use particles::ParticleOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[bloom]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Bloom strength, radius and threshold.
    pub bloom: BloomSettings,
    /// Camera projection and orbit control parameters.
    pub camera: CameraOptions,
    /// Particle sprite appearance.
    pub particles: ParticleOptions,
    /// Scene lighting.
    pub lighting: LightingOptions,
    /// Runtime asset paths.
    #[schemars(skip)]
    pub assets: AssetOptions,
    /// Keyboard binding options.
    #[schemars(skip)]
    pub keybindings: KeybindingOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Parse options from TOML text. Missing fields use defaults and bloom
    /// values are clamped into range.
    pub fn from_toml_str(content: &str) -> Result<Self, AppError> {
        let mut opts: Self = toml::from_str(content)
            .map_err(|e| AppError::OptionsParse(e.to_string()))?;
        opts.bloom = opts.bloom.clamped();
        opts.keybindings.rebuild_reverse_map();
        Ok(opts)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path).map_err(AppError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(AppError::Io)?;
            }
        }
        std::fs::write(path, content).map_err(AppError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyAction;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed = Options::from_toml_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[bloom]
strength = 5.0
";
        let opts = Options::from_toml_str(toml_str).unwrap();
        assert_eq!(opts.bloom.strength, 5.0);
        // Everything else should be default
        assert_eq!(opts.bloom.radius, 0.6);
        assert_eq!(opts.camera.fovy, 75.0);
        assert_eq!(opts.assets.model, "assets/astronaut.glb");
    }

    #[test]
    fn loaded_bloom_values_are_clamped() {
        let opts = Options::from_toml_str("[bloom]\nthreshold = 25.0\n").unwrap();
        assert_eq!(opts.bloom.threshold, BLOOM_SETTING_MAX);
    }

    #[test]
    fn invalid_toml_is_an_options_error() {
        let err = Options::from_toml_str("[bloom\nstrength = ").unwrap_err();
        assert!(matches!(err, AppError::OptionsParse(_)));
    }

    #[test]
    fn keybinding_lookup() {
        let opts = Options::default();
        assert_eq!(
            opts.keybindings.lookup("KeyR"),
            Some(KeyAction::ToggleAutoRotate)
        );
        assert_eq!(
            opts.keybindings.lookup("Digit2"),
            Some(KeyAction::IncreaseBloomStrength)
        );
        assert_eq!(opts.keybindings.lookup("KeyZ"), None);
    }

    #[test]
    fn keybindings_from_file_are_searchable() {
        let opts = Options::from_toml_str(
            "[keybindings.bindings]\ntoggle_auto_rotate = \"Space\"\n",
        )
        .unwrap();
        assert_eq!(
            opts.keybindings.lookup("Space"),
            Some(KeyAction::ToggleAutoRotate)
        );
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let dir = std::env::temp_dir()
            .join(format!("astrobloom-options-{}", std::process::id()));
        let path = dir.join("night.toml");
        let mut opts = Options::default();
        opts.bloom.radius = 2.0;
        opts.save(&path).unwrap();

        let loaded = Options::load(&path).unwrap();
        assert_eq!(loaded.bloom.radius, 2.0);
        assert_eq!(Options::list_presets(&dir), vec!["night".to_owned()]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();

        assert!(props.contains_key("bloom"));
        assert!(props.contains_key("camera"));
        assert!(props.contains_key("particles"));
        assert!(props.contains_key("lighting"));

        // Skipped sections should be absent
        assert!(!props.contains_key("assets"));
        assert!(!props.contains_key("keybindings"));

        let bloom = &props["bloom"]["properties"];
        assert_eq!(bloom["strength"]["maximum"], 10.0);
        assert_eq!(bloom["radius"]["minimum"], 0.0);
        assert_eq!(bloom["threshold"]["step"], 0.01);
    }
}
