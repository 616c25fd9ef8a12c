//! Bloom post-processing pass: extracts bright pixels and spreads them into a
//! soft glow.
//!
//! Pipeline: luminosity high-pass at half resolution → five progressively
//! halved levels, each blurred with a separable Gaussian (horizontal then
//! vertical) of growing kernel radius → weighted sum of all levels scaled by
//! `strength`. The per-level weights are mirrored toward the coarse levels
//! as `radius` grows, so a larger radius gives a wider glow.

use wgpu::util::DeviceExt;

use super::screen_pass::{fullscreen_pass, ScreenPass};
use crate::error::AppError;
use crate::gpu::pipeline_helpers::{
    create_screen_space_pipeline, filtering_sampler, linear_sampler,
    texture_2d, uniform_buffer,
};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::{Shader, ShaderComposer};
use crate::gpu::texture::{RenderTarget, HDR_FORMAT};
use crate::options::BloomSettings;

/// Number of blur levels in the bloom chain.
pub const MIP_LEVELS: usize = 5;

/// Gaussian kernel radius per level.
pub const KERNEL_RADII: [u32; MIP_LEVELS] = [3, 5, 7, 9, 11];

/// Base blend weight per level before radius mirroring.
pub const BLOOM_FACTORS: [f32; MIP_LEVELS] = [1.0, 0.8, 0.6, 0.4, 0.2];

/// Width of the soft knee above the threshold.
const SMOOTH_WIDTH: f32 = 0.01;

/// Blend weight of a level: `mix(factor, 1.2 - factor, radius)`.
#[must_use]
pub fn lerp_bloom_factor(factor: f32, radius: f32) -> f32 {
    let mirror = 1.2 - factor;
    factor + (mirror - factor) * radius
}

/// Size of every blur level for a full-resolution input. Each level halves
/// the previous one, rounding up, starting from half resolution.
#[must_use]
pub fn mip_sizes(width: u32, height: u32) -> [(u32, u32); MIP_LEVELS] {
    let mut sizes = [(1, 1); MIP_LEVELS];
    let (mut w, mut h) = (width, height);
    for size in &mut sizes {
        w = w.div_ceil(2).max(1);
        h = h.div_ceil(2).max(1);
        *size = (w, h);
    }
    sizes
}

/// Bloom pass parameters, copied from the live settings once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomParams {
    /// Overall glow intensity.
    pub strength: f32,
    /// Spread toward the coarse levels.
    pub radius: f32,
    /// Luminance below which pixels do not glow.
    pub threshold: f32,
}

impl BloomParams {
    /// Copy settings, clamped to their range.
    #[must_use]
    pub fn from_settings(settings: &BloomSettings) -> Self {
        let s = settings.clamped();
        Self {
            strength: s.strength,
            radius: s.radius,
            threshold: s.threshold,
        }
    }

    /// Blend weight of every level at the current radius.
    #[must_use]
    pub fn factors(&self) -> [f32; MIP_LEVELS] {
        BLOOM_FACTORS.map(|f| lerp_bloom_factor(f, self.radius))
    }
}

impl Default for BloomParams {
    fn default() -> Self {
        Self::from_settings(&BloomSettings::default())
    }
}

/// High-pass params (matches the WGSL struct)
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct ThresholdUniform {
    threshold: f32,
    smooth_width: f32,
    _pad: [f32; 2],
}

/// Blur direction params (matches the WGSL struct)
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct BlurUniform {
    texel_size: [f32; 2],
    direction: [f32; 2],
    kernel_radius: u32,
    _pad: [u32; 3],
}

/// Level weights (matches the WGSL struct)
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct CompositeUniform {
    strength: f32,
    radius: f32,
    _pad: [f32; 2],
    factors: [f32; 8],
}

impl From<BloomParams> for ThresholdUniform {
    fn from(params: BloomParams) -> Self {
        Self {
            threshold: params.threshold,
            smooth_width: SMOOTH_WIDTH,
            _pad: [0.0; 2],
        }
    }
}

impl From<BloomParams> for CompositeUniform {
    fn from(params: BloomParams) -> Self {
        let mut factors = [0.0; 8];
        factors[..MIP_LEVELS].copy_from_slice(&params.factors());
        Self {
            strength: params.strength,
            radius: params.radius,
            _pad: [0.0; 2],
            factors,
        }
    }
}

/// Render targets and bindings of one blur level.
struct BlurLevel {
    horizontal: RenderTarget,
    vertical: RenderTarget,
    _params: [wgpu::Buffer; 2],
    // [0 = horizontal, 1 = vertical]
    bind_groups: [wgpu::BindGroup; 2],
}

/// Threshold → blur chain → weighted composite.
pub struct BloomPass {
    input: wgpu::TextureView,
    sampler: wgpu::Sampler,

    threshold_pipeline: wgpu::RenderPipeline,
    threshold_layout: wgpu::BindGroupLayout,
    threshold_buffer: wgpu::Buffer,
    threshold_bind_group: wgpu::BindGroup,
    bright: RenderTarget,

    blur_pipeline: wgpu::RenderPipeline,
    blur_layout: wgpu::BindGroupLayout,
    levels: Vec<BlurLevel>,

    composite_pipeline: wgpu::RenderPipeline,
    composite_layout: wgpu::BindGroupLayout,
    composite_buffer: wgpu::Buffer,
    composite_bind_group: wgpu::BindGroup,
    output: RenderTarget,

    params: BloomParams,
}

impl BloomPass {
    /// Build the pass reading from `input` (the full-resolution scene
    /// color).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Shader`] if a bloom shader fails to compose.
    pub fn new(
        context: &RenderContext,
        input: &wgpu::TextureView,
        shader_composer: &mut ShaderComposer,
    ) -> Result<Self, AppError> {
        let device = &context.device;
        let (width, height) = context.render_size();
        let params = BloomParams::default();
        let sampler = linear_sampler(device, "Bloom Sampler");

        let threshold_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Bloom Threshold Buffer"),
                contents: bytemuck::cast_slice(&[ThresholdUniform::from(params)]),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });
        let composite_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Bloom Composite Buffer"),
                contents: bytemuck::cast_slice(&[CompositeUniform::from(params)]),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });

        // Threshold and blur read one texture with one parameter block.
        let single_input_entries =
            [texture_2d(0), filtering_sampler(1), uniform_buffer(2)];
        let threshold_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Bloom Threshold Layout"),
                entries: &single_input_entries,
            });
        let blur_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Bloom Blur Layout"),
                entries: &single_input_entries,
            });
        let composite_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Bloom Composite Layout"),
                entries: &[
                    texture_2d(0),
                    texture_2d(1),
                    texture_2d(2),
                    texture_2d(3),
                    texture_2d(4),
                    filtering_sampler(5),
                    uniform_buffer(6),
                ],
            });

        let threshold_pipeline = Self::create_pipeline(
            device,
            shader_composer,
            "Bloom Threshold",
            Shader::BloomThreshold,
            &threshold_layout,
        )?;
        let blur_pipeline = Self::create_pipeline(
            device,
            shader_composer,
            "Bloom Blur",
            Shader::BloomBlur,
            &blur_layout,
        )?;
        let composite_pipeline = Self::create_pipeline(
            device,
            shader_composer,
            "Bloom Composite",
            Shader::BloomComposite,
            &composite_layout,
        )?;

        let bright =
            Self::create_half_res_target(device, "Bloom Bright", width, height);
        let output =
            Self::create_half_res_target(device, "Bloom Output", width, height);
        let threshold_bind_group = Self::create_single_input_bind_group(
            device,
            &threshold_layout,
            input,
            &sampler,
            &threshold_buffer,
            "Bloom Threshold Bind Group",
        );
        let levels = Self::create_levels(
            device,
            &blur_layout,
            &sampler,
            &bright.view,
            width,
            height,
        );
        let composite_bind_group = Self::create_composite_bind_group(
            device,
            &composite_layout,
            &levels,
            &sampler,
            &composite_buffer,
        );

        Ok(Self {
            input: input.clone(),
            sampler,
            threshold_pipeline,
            threshold_layout,
            threshold_buffer,
            threshold_bind_group,
            bright,
            blur_pipeline,
            blur_layout,
            levels,
            composite_pipeline,
            composite_layout,
            composite_buffer,
            composite_bind_group,
            output,
            params,
        })
    }

    /// Parameters last written to the GPU.
    #[must_use]
    pub fn params(&self) -> BloomParams {
        self.params
    }

    /// The weighted bloom result, at half resolution.
    #[must_use]
    pub fn output_view(&self) -> &wgpu::TextureView {
        &self.output.view
    }

    /// Upload new parameters if they changed.
    pub fn update_params(&mut self, queue: &wgpu::Queue, params: BloomParams) {
        if params == self.params {
            return;
        }
        self.params = params;
        queue.write_buffer(
            &self.threshold_buffer,
            0,
            bytemuck::cast_slice(&[ThresholdUniform::from(params)]),
        );
        queue.write_buffer(
            &self.composite_buffer,
            0,
            bytemuck::cast_slice(&[CompositeUniform::from(params)]),
        );
    }

    /// Point the threshold stage at a new scene color view. Takes effect
    /// on the next [`ScreenPass::resize`].
    pub fn set_input(&mut self, input: &wgpu::TextureView) {
        self.input = input.clone();
    }

    fn create_pipeline(
        device: &wgpu::Device,
        shader_composer: &mut ShaderComposer,
        label: &str,
        shader: Shader,
        layout: &wgpu::BindGroupLayout,
    ) -> Result<wgpu::RenderPipeline, AppError> {
        let module =
            shader_composer.compose(device, &format!("{label} Shader"), shader)?;
        Ok(create_screen_space_pipeline(
            device,
            label,
            &module,
            HDR_FORMAT,
            None,
            &[layout],
        ))
    }

    fn create_half_res_target(
        device: &wgpu::Device,
        label: &str,
        width: u32,
        height: u32,
    ) -> RenderTarget {
        let (w, h) = mip_sizes(width, height)[0];
        RenderTarget::new(device, label, w, h, HDR_FORMAT)
    }

    fn create_single_input_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        input: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
        params: &wgpu::Buffer,
        label: &str,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(input),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params.as_entire_binding(),
                },
            ],
        })
    }

    fn create_levels(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        bright: &wgpu::TextureView,
        width: u32,
        height: u32,
    ) -> Vec<BlurLevel> {
        let mut levels: Vec<BlurLevel> = Vec::with_capacity(MIP_LEVELS);
        for (i, (w, h)) in mip_sizes(width, height).into_iter().enumerate() {
            let horizontal = RenderTarget::new(
                device,
                &format!("Bloom Blur H{i}"),
                w,
                h,
                HDR_FORMAT,
            );
            let vertical = RenderTarget::new(
                device,
                &format!("Bloom Blur V{i}"),
                w,
                h,
                HDR_FORMAT,
            );

            let texel_size = [1.0 / w as f32, 1.0 / h as f32];
            let make_params = |direction: [f32; 2], label: &str| {
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents: bytemuck::cast_slice(&[BlurUniform {
                        texel_size,
                        direction,
                        kernel_radius: KERNEL_RADII[i],
                        _pad: [0; 3],
                    }]),
                    usage: wgpu::BufferUsages::UNIFORM,
                })
            };
            let params = [
                make_params([1.0, 0.0], &format!("Bloom Blur H{i} Params")),
                make_params([0.0, 1.0], &format!("Bloom Blur V{i} Params")),
            ];

            // Each level blurs the previous level's vertical output.
            let input = levels.last().map_or(bright, |prev| &prev.vertical.view);
            let bind_groups = [
                Self::create_single_input_bind_group(
                    device,
                    layout,
                    input,
                    sampler,
                    &params[0],
                    &format!("Bloom Blur H{i} Bind Group"),
                ),
                Self::create_single_input_bind_group(
                    device,
                    layout,
                    &horizontal.view,
                    sampler,
                    &params[1],
                    &format!("Bloom Blur V{i} Bind Group"),
                ),
            ];

            levels.push(BlurLevel {
                horizontal,
                vertical,
                _params: params,
                bind_groups,
            });
        }
        levels
    }

    fn create_composite_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        levels: &[BlurLevel],
        sampler: &wgpu::Sampler,
        params: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        let mut entries: Vec<wgpu::BindGroupEntry<'_>> = levels
            .iter()
            .enumerate()
            .map(|(i, level)| wgpu::BindGroupEntry {
                binding: i as u32,
                resource: wgpu::BindingResource::TextureView(
                    &level.vertical.view,
                ),
            })
            .collect();
        entries.push(wgpu::BindGroupEntry {
            binding: MIP_LEVELS as u32,
            resource: wgpu::BindingResource::Sampler(sampler),
        });
        entries.push(wgpu::BindGroupEntry {
            binding: MIP_LEVELS as u32 + 1,
            resource: params.as_entire_binding(),
        });
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Bloom Composite Bind Group"),
            layout,
            entries: &entries,
        })
    }
}

impl ScreenPass for BloomPass {
    fn render(&self, encoder: &mut wgpu::CommandEncoder) {
        fullscreen_pass(
            encoder,
            "Bloom Threshold Pass",
            &self.bright.view,
            &self.threshold_pipeline,
            &self.threshold_bind_group,
        );
        for level in &self.levels {
            fullscreen_pass(
                encoder,
                "Bloom Blur H Pass",
                &level.horizontal.view,
                &self.blur_pipeline,
                &level.bind_groups[0],
            );
            fullscreen_pass(
                encoder,
                "Bloom Blur V Pass",
                &level.vertical.view,
                &self.blur_pipeline,
                &level.bind_groups[1],
            );
        }
        fullscreen_pass(
            encoder,
            "Bloom Composite Pass",
            &self.output.view,
            &self.composite_pipeline,
            &self.composite_bind_group,
        );
    }

    fn resize(&mut self, context: &RenderContext) {
        let device = &context.device;
        let (width, height) = context.render_size();
        self.bright =
            Self::create_half_res_target(device, "Bloom Bright", width, height);
        self.output =
            Self::create_half_res_target(device, "Bloom Output", width, height);
        self.threshold_bind_group = Self::create_single_input_bind_group(
            device,
            &self.threshold_layout,
            &self.input,
            &self.sampler,
            &self.threshold_buffer,
            "Bloom Threshold Bind Group",
        );
        self.levels = Self::create_levels(
            device,
            &self.blur_layout,
            &self.sampler,
            &self.bright.view,
            width,
            height,
        );
        self.composite_bind_group = Self::create_composite_bind_group(
            device,
            &self.composite_layout,
            &self.levels,
            &self.sampler,
            &self.composite_buffer,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn factors_at_radius_extremes() {
        let zero = BloomParams {
            radius: 0.0,
            ..BloomParams::default()
        };
        assert_eq!(zero.factors(), BLOOM_FACTORS);

        let one = BloomParams {
            radius: 1.0,
            ..BloomParams::default()
        };
        let mirrored = one.factors();
        for (got, want) in mirrored.iter().zip([0.2, 0.4, 0.6, 0.8, 1.0]) {
            assert!(close(*got, want), "{got} vs {want}");
        }
    }

    #[test]
    fn default_radius_factors() {
        let factors = BloomParams::default().factors();
        assert!(close(factors[0], 0.52));
        assert!(close(factors[4], 0.2 + (1.0 - 0.2) * 0.6));
    }

    #[test]
    fn params_follow_settings_and_clamp() {
        let params = BloomParams::from_settings(&BloomSettings {
            strength: 20.0,
            radius: 2.0,
            threshold: -1.0,
        });
        assert_eq!(params.strength, 10.0);
        assert_eq!(params.radius, 2.0);
        assert_eq!(params.threshold, 0.0);
    }

    #[test]
    fn mip_chain_halves_with_round_up() {
        assert_eq!(
            mip_sizes(800, 600),
            [(400, 300), (200, 150), (100, 75), (50, 38), (25, 19)]
        );
        assert_eq!(mip_sizes(1, 1), [(1, 1); MIP_LEVELS]);
    }

    #[test]
    fn uniform_layouts_match_wgsl() {
        assert_eq!(size_of::<ThresholdUniform>(), 16);
        assert_eq!(size_of::<BlurUniform>(), 32);
        assert_eq!(size_of::<CompositeUniform>(), 48);
        let uniform = CompositeUniform::from(BloomParams::default());
        assert_eq!(uniform.factors[5..], [0.0; 3]);
    }
}
