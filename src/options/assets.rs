use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
/// Paths of the runtime assets, relative to the working directory.
pub struct AssetOptions {
    /// Sprite drawn for every particle.
    pub particle_texture: String,
    /// Baked colour texture applied to the model.
    pub model_texture: String,
    /// Packaged glTF/GLB model.
    pub model: String,
}

impl Default for AssetOptions {
    fn default() -> Self {
        Self {
            particle_texture: "assets/particle.png".into(),
            model_texture: "assets/baked.jpg".into(),
            model: "assets/astronaut.glb".into(),
        }
    }
}
