use std::borrow::Cow;

use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, NagaModuleDescriptor, ShaderLanguage,
    ShaderType,
};

use crate::error::AppError;

/// Every composable shader the renderer builds a pipeline from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shader {
    /// Camera-facing particle sprites.
    Particle,
    /// Unlit textured model with alpha test.
    Model,
    /// Luminosity high-pass.
    BloomThreshold,
    /// Separable Gaussian blur.
    BloomBlur,
    /// Weighted sum of the blurred levels.
    BloomComposite,
    /// Scene + bloom to the surface.
    Composite,
}

impl Shader {
    /// All shaders, in pipeline build order.
    pub const ALL: [Self; 6] = [
        Self::Particle,
        Self::Model,
        Self::BloomThreshold,
        Self::BloomBlur,
        Self::BloomComposite,
        Self::Composite,
    ];

    /// Path relative to `assets/shaders`, used in diagnostics.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Particle => "raster/particle.wgsl",
            Self::Model => "raster/model.wgsl",
            Self::BloomThreshold => "screen/bloom_threshold.wgsl",
            Self::BloomBlur => "screen/bloom_blur.wgsl",
            Self::BloomComposite => "screen/bloom_composite.wgsl",
            Self::Composite => "screen/composite.wgsl",
        }
    }

    fn source(self) -> &'static str {
        match self {
            Self::Particle => {
                include_str!("../../assets/shaders/raster/particle.wgsl")
            }
            Self::Model => include_str!("../../assets/shaders/raster/model.wgsl"),
            Self::BloomThreshold => {
                include_str!("../../assets/shaders/screen/bloom_threshold.wgsl")
            }
            Self::BloomBlur => {
                include_str!("../../assets/shaders/screen/bloom_blur.wgsl")
            }
            Self::BloomComposite => {
                include_str!("../../assets/shaders/screen/bloom_composite.wgsl")
            }
            Self::Composite => {
                include_str!("../../assets/shaders/screen/composite.wgsl")
            }
        }
    }
}

/// Shared module definition: (source, file_path)
struct ModuleDef {
    source: &'static str,
    file_path: &'static str,
}

/// Wraps `naga_oil::compose::Composer` to provide shader composition with
/// `#import` support.
///
/// Pre-loads all shared WGSL modules at construction time. Consuming shaders
/// use `#import astrobloom::module_name` to pull in shared code. The composer
/// produces `naga::Module` IR directly, skipping WGSL re-parse at runtime.
pub struct ShaderComposer {
    composer: Composer,
}

impl ShaderComposer {
    /// Register the shared modules.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Shader`] if a shared module fails to parse.
    pub fn new() -> Result<Self, AppError> {
        let mut composer = Composer::default();

        // Register shared modules in dependency order.
        let modules: &[ModuleDef] = &[
            ModuleDef {
                source: include_str!(
                    "../../assets/shaders/modules/fullscreen.wgsl"
                ),
                file_path: "modules/fullscreen.wgsl",
            },
            ModuleDef {
                source: include_str!("../../assets/shaders/modules/camera.wgsl"),
                file_path: "modules/camera.wgsl",
            },
        ];

        for m in modules {
            let _ = composer
                .add_composable_module(ComposableModuleDescriptor {
                    source: m.source,
                    file_path: m.file_path,
                    language: ShaderLanguage::Wgsl,
                    ..Default::default()
                })
                .map_err(|e| {
                    AppError::Shader(format!(
                        "failed to register module '{}': {e}",
                        m.file_path
                    ))
                })?;
        }

        Ok(Self { composer })
    }

    /// Compose a shader into a `wgpu::ShaderModule` ready for pipeline
    /// creation.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Shader`] if composition fails.
    pub fn compose(
        &mut self,
        device: &wgpu::Device,
        label: &str,
        shader: Shader,
    ) -> Result<wgpu::ShaderModule, AppError> {
        let naga_module = self.compose_naga(shader)?;
        Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Naga(Cow::Owned(naga_module)),
        }))
    }

    /// Compose a shader into a `naga::Module` without creating a wgpu shader
    /// module. Useful for testing shader composition without a GPU device.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Shader`] if composition fails.
    pub fn compose_naga(
        &mut self,
        shader: Shader,
    ) -> Result<naga::Module, AppError> {
        self.composer
            .make_naga_module(NagaModuleDescriptor {
                source: shader.source(),
                file_path: shader.path(),
                shader_type: ShaderType::Wgsl,
                ..Default::default()
            })
            .map_err(|e| {
                AppError::Shader(format!(
                    "failed to compose '{}': {e}",
                    shader.path()
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_shaders_compose() {
        let mut composer = ShaderComposer::new().unwrap();
        for shader in Shader::ALL {
            let module = composer
                .compose_naga(shader)
                .unwrap_or_else(|e| panic!("{e}"));
            let entry_points: Vec<&str> = module
                .entry_points
                .iter()
                .map(|ep| ep.name.as_str())
                .collect();
            assert!(entry_points.contains(&"vs_main"), "{shader:?}");
            assert!(entry_points.contains(&"fs_main"), "{shader:?}");
        }
    }

    #[test]
    fn composed_modules_validate() {
        let mut composer = ShaderComposer::new().unwrap();
        for shader in Shader::ALL {
            let module = composer.compose_naga(shader).unwrap();
            let _ = naga::valid::Validator::new(
                naga::valid::ValidationFlags::all(),
                naga::valid::Capabilities::default(),
            )
            .validate(&module)
            .unwrap_or_else(|e| panic!("{shader:?}: {e:?}"));
        }
    }
}
