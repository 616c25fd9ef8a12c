//! Final composite: adds the bloom glow onto the HDR scene color and writes
//! the sum to the presentation surface.
//!
//! The pass owns the intermediate scene color target. Scene geometry is
//! drawn there instead of into the swapchain so the bloom chain can sample
//! it afterwards.

use super::screen_pass::{fullscreen_pass, ScreenPass};
use crate::error::AppError;
use crate::gpu::pipeline_helpers::{
    create_screen_space_pipeline, filtering_sampler, linear_sampler,
    texture_2d,
};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::{Shader, ShaderComposer};
use crate::gpu::texture::{RenderTarget, HDR_FORMAT};

/// Composite pass renderer
pub struct CompositePass {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,

    /// Scene color target (geometry renders here instead of the
    /// swapchain).
    color: RenderTarget,
    /// Stored bloom view for bind group recreation on resize.
    bloom_view: wgpu::TextureView,
    /// Swapchain view for the current frame, set before render.
    output_view: Option<wgpu::TextureView>,
}

impl CompositePass {
    /// Create the pass and its scene color target at the surface size.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Shader`] if the composite shader fails to
    /// compose.
    pub fn new(
        context: &RenderContext,
        shader_composer: &mut ShaderComposer,
    ) -> Result<Self, AppError> {
        let device = &context.device;
        let (width, height) = context.render_size();
        let color = Self::create_color_target(device, width, height);
        let sampler = linear_sampler(device, "Composite Sampler");

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Composite Bind Group Layout"),
                entries: &[texture_2d(0), texture_2d(1), filtering_sampler(2)],
            });

        let shader = shader_composer.compose(
            device,
            "Composite Shader",
            Shader::Composite,
        )?;
        let pipeline = create_screen_space_pipeline(
            device,
            "Composite",
            &shader,
            context.format(),
            None,
            &[&bind_group_layout],
        );

        // Until the bloom pass exists, sample the scene itself as the glow
        // input; the stack replaces it right after construction.
        let bloom_view = color.view.clone();
        let bind_group = Self::create_bind_group(
            device,
            &bind_group_layout,
            &color.view,
            &bloom_view,
            &sampler,
        );

        Ok(Self {
            pipeline,
            bind_group_layout,
            bind_group,
            sampler,
            color,
            bloom_view,
            output_view: None,
        })
    }

    fn create_color_target(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> RenderTarget {
        RenderTarget::new(device, "Scene Color Target", width, height, HDR_FORMAT)
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        scene: &wgpu::TextureView,
        bloom: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Composite Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(scene),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(bloom),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    fn rebuild_bind_group(&mut self, device: &wgpu::Device) {
        self.bind_group = Self::create_bind_group(
            device,
            &self.bind_group_layout,
            &self.color.view,
            &self.bloom_view,
            &self.sampler,
        );
    }

    /// The scene color target geometry is drawn into.
    #[must_use]
    pub fn color_view(&self) -> &wgpu::TextureView {
        &self.color.view
    }

    /// Use `bloom` as the glow input.
    pub fn set_bloom_view(
        &mut self,
        device: &wgpu::Device,
        bloom: &wgpu::TextureView,
    ) {
        self.bloom_view = bloom.clone();
        self.rebuild_bind_group(device);
    }

    /// Set the swapchain view for this frame.
    pub fn set_output_view(&mut self, view: wgpu::TextureView) {
        self.output_view = Some(view);
    }
}

impl ScreenPass for CompositePass {
    fn render(&self, encoder: &mut wgpu::CommandEncoder) {
        let Some(output_view) = &self.output_view else {
            return;
        };
        fullscreen_pass(
            encoder,
            "Composite Pass",
            output_view,
            &self.pipeline,
            &self.bind_group,
        );
    }

    fn resize(&mut self, context: &RenderContext) {
        let (width, height) = context.render_size();
        if self.color.size() != (width, height) {
            self.color =
                Self::create_color_target(&context.device, width, height);
        }
        self.rebuild_bind_group(&context.device);
    }
}
