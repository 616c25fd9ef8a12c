use super::bloom::{BloomParams, BloomPass};
use super::composite::CompositePass;
use super::screen_pass::ScreenPass;
use crate::error::AppError;
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;
use crate::gpu::texture::RenderTarget;

/// Depth format shared by every scene pipeline.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Owns the post-processing chain and the targets the scene is drawn into:
/// depth buffer, bloom, and the final composite.
pub(crate) struct PostProcessStack {
    pub depth: RenderTarget,
    pub bloom_pass: BloomPass,
    pub composite_pass: CompositePass,
}

impl PostProcessStack {
    /// Build the depth target and all passes.
    pub fn new(
        context: &RenderContext,
        shader_composer: &mut ShaderComposer,
    ) -> Result<Self, AppError> {
        let depth = Self::create_depth_target(context);
        let mut composite_pass = CompositePass::new(context, shader_composer)?;
        let bloom_pass = BloomPass::new(
            context,
            composite_pass.color_view(),
            shader_composer,
        )?;
        composite_pass.set_bloom_view(&context.device, bloom_pass.output_view());

        Ok(Self {
            depth,
            bloom_pass,
            composite_pass,
        })
    }

    fn create_depth_target(context: &RenderContext) -> RenderTarget {
        let (width, height) = context.render_size();
        RenderTarget::new(
            &context.device,
            "Depth Texture",
            width,
            height,
            DEPTH_FORMAT,
        )
    }

    /// Scene color target geometry renders into.
    pub fn color_view(&self) -> &wgpu::TextureView {
        self.composite_pass.color_view()
    }

    /// Depth attachment for scene geometry.
    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth.view
    }

    /// Recreate all resolution-dependent resources.
    pub fn resize(&mut self, context: &RenderContext) {
        self.depth = Self::create_depth_target(context);
        self.composite_pass.resize(context);
        self.bloom_pass.set_input(self.composite_pass.color_view());
        self.bloom_pass.resize(context);
        self.composite_pass
            .set_bloom_view(&context.device, self.bloom_pass.output_view());
    }

    /// Push the per-tick bloom parameters.
    pub fn apply_bloom(&mut self, queue: &wgpu::Queue, params: BloomParams) {
        self.bloom_pass.update_params(queue, params);
    }

    /// Run bloom, then composite scene + bloom into `final_view`.
    pub fn render(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        final_view: &wgpu::TextureView,
    ) {
        self.bloom_pass.render(encoder);
        self.composite_pass.set_output_view(final_view.clone());
        self.composite_pass.render(encoder);
    }
}
