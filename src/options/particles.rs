use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Particles", inline)]
#[serde(default)]
/// Particle sprite appearance. The particle count and spread are fixed.
pub struct ParticleOptions {
    /// Sprite size in world units at unit distance.
    #[schemars(title = "Point Size", range(min = 0.1, max = 10.0), extend("step" = 0.1))]
    pub size: f32,
    /// Shrink sprites with distance from the camera.
    #[schemars(title = "Size Attenuation")]
    pub size_attenuation: bool,
}

impl Default for ParticleOptions {
    fn default() -> Self {
        Self {
            size: 1.0,
            size_attenuation: true,
        }
    }
}
