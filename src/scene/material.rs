//! Materials attached to scene nodes.

use super::AssetSlot;
use crate::assets::TextureData;
use crate::options::ParticleOptions;

/// How a material's output combines with the color target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Standard alpha blending.
    Normal,
    /// Source is added onto the destination.
    Additive,
}

/// Uniform block of the particle shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleUniforms {
    /// Seconds since the render loop started.
    pub u_time: f32,
    /// Sprite size (world units when attenuated, pixels otherwise).
    pub size: f32,
    /// 1 when sprites shrink with distance.
    pub size_attenuation: u32,
    pub(crate) _pad: f32,
}

/// Custom shader material for the particle sprites: textured, additive,
/// no depth test.
#[derive(Debug, Clone)]
pub struct ParticleMaterial {
    /// Values written into the shader's uniform block.
    pub uniforms: ParticleUniforms,
    /// Sprite sampled as `u_texture`.
    pub texture: AssetSlot<TextureData>,
    /// Blend mode of the sprites.
    pub blend: BlendMode,
    /// Whether sprites are depth-tested against the scene.
    pub depth_test: bool,
    /// Whether sprites write depth.
    pub depth_write: bool,
}

impl ParticleMaterial {
    /// Build the material from the particle options.
    #[must_use]
    pub fn new(options: &ParticleOptions) -> Self {
        Self {
            uniforms: ParticleUniforms {
                u_time: 0.0,
                size: options.size,
                size_attenuation: u32::from(options.size_attenuation),
                _pad: 0.0,
            },
            texture: AssetSlot::Pending,
            blend: BlendMode::Additive,
            depth_test: false,
            depth_write: false,
        }
    }

    /// Current value of `u_time`.
    #[must_use]
    pub fn time(&self) -> f32 {
        self.uniforms.u_time
    }

    /// Set `u_time`. Values never go backwards.
    pub fn set_time(&mut self, seconds: f32) {
        if seconds >= self.uniforms.u_time {
            self.uniforms.u_time = seconds;
        }
    }
}

/// Unlit textured material shared by every model mesh.
#[derive(Debug, Clone)]
pub struct BasicMaterial {
    /// Base color texture.
    pub map: AssetSlot<TextureData>,
    /// Fragments with alpha below this are discarded.
    pub alpha_test: f32,
    /// Whether the material is rendered with alpha blending.
    pub transparent: bool,
}

impl BasicMaterial {
    /// Material with a pending map and the model's alpha test.
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: AssetSlot::Pending,
            alpha_test: 1.0,
            transparent: true,
        }
    }

    /// Blend mode implied by `transparent`.
    #[must_use]
    pub fn blend(&self) -> Option<BlendMode> {
        self.transparent.then_some(BlendMode::Normal)
    }
}

impl Default for BasicMaterial {
    fn default() -> Self {
        Self::new()
    }
}
