//! Common interface of the fullscreen post-processing passes.

use crate::gpu::render_context::RenderContext;

/// A fullscreen pass in the post-processing chain.
pub trait ScreenPass {
    /// Record this pass into `encoder`.
    fn render(&self, encoder: &mut wgpu::CommandEncoder);
    /// Rebuild size-dependent targets and bind groups.
    /// Input views owned by other passes must be handed over through the
    /// pass-specific setters first.
    fn resize(&mut self, context: &RenderContext);
}

/// Draw one fullscreen triangle into `target`, clearing it to black.
pub(crate) fn fullscreen_pass(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            depth_slice: None,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.draw(0..3, 0..1);
}
