//! GPU rendering of the scene graph.
//!
//! [`SceneRenderer`] owns the device, the camera uniform, one renderer per
//! drawable node type, and the post-processing stack. Geometry is drawn into
//! an HDR color target; bloom and the final composite then write the
//! swapchain image.

pub mod model;
pub mod particles;
pub(crate) mod pipeline_util;
pub mod postprocess;

use glam::Mat4;

use self::model::ModelRenderer;
use self::particles::ParticleRenderer;
use self::postprocess::post_process::PostProcessStack;
use crate::app::render_loop::{Compositor, Frame};
use crate::camera::{Camera, CameraController};
use crate::error::AppError;
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;
use crate::scene::{NodeId, Scene, SceneHandles};

/// Accumulated world transform of `id`, if it is reachable from the root.
fn world_transform(scene: &Scene, id: NodeId) -> Option<Mat4> {
    scene
        .walk()
        .into_iter()
        .find_map(|(node, world)| (node == id).then_some(world))
}

/// Draws the composed scene with bloom to a window surface.
pub struct SceneRenderer {
    context: RenderContext,
    camera: CameraController,
    model: Option<ModelRenderer>,
    particles: Option<ParticleRenderer>,
    post_process: PostProcessStack,
}

impl SceneRenderer {
    /// Build pipelines for every drawable node in `scene`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Shader`] if any shader fails to compose.
    pub fn new(
        context: RenderContext,
        scene: &Scene,
        camera: &Camera,
    ) -> Result<Self, AppError> {
        let mut shader_composer = ShaderComposer::new()?;
        let camera =
            CameraController::new(&context.device, camera, context.size());

        let model = scene
            .model(SceneHandles::MODEL)
            .map(|node| {
                ModelRenderer::new(
                    &context,
                    &camera.layout,
                    &mut shader_composer,
                    &node.material,
                )
            })
            .transpose()?;
        let particles = scene
            .particles(SceneHandles::PARTICLES)
            .map(|field| {
                ParticleRenderer::new(
                    &context,
                    &camera.layout,
                    &mut shader_composer,
                    field,
                )
            })
            .transpose()?;
        let post_process = PostProcessStack::new(&context, &mut shader_composer)?;

        log::info!(
            "renderer ready: {}x{} {:?}",
            context.config.width,
            context.config.height,
            context.format()
        );

        Ok(Self {
            context,
            camera,
            model,
            particles,
            post_process,
        })
    }

    /// The GPU context.
    #[must_use]
    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    /// Track the window's device pixel ratio and rebuild the offscreen
    /// targets at the capped resolution.
    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        self.context.set_scale_factor(scale_factor);
        self.post_process.resize(&self.context);
    }

    /// Reconfigure the surface after it was lost or became outdated.
    pub fn reconfigure(&self) {
        self.context.reconfigure();
    }

    /// Upload anything the scene resolved since the last frame.
    fn sync_scene(&mut self, scene: &Scene) {
        if let (Some(renderer), Some(id)) =
            (self.model.as_mut(), scene.find(SceneHandles::MODEL))
        {
            if let (Some(node), Some(world)) =
                (scene.model(SceneHandles::MODEL), world_transform(scene, id))
            {
                renderer.sync(&self.context, node, world);
            }
        }
        if let (Some(renderer), Some(field)) = (
            self.particles.as_mut(),
            scene.particles(SceneHandles::PARTICLES),
        ) {
            renderer.sync(&self.context, field);
        }
    }

    fn render_scene(&self, encoder: &mut wgpu::CommandEncoder) {
        let mut render_pass =
            encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.post_process.color_view(),
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(
                    wgpu::RenderPassDepthStencilAttachment {
                        view: self.post_process.depth_view(),
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    },
                ),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

        if let Some(model) = &self.model {
            model.draw(&mut render_pass, &self.camera.bind_group);
        }
        if let Some(particles) = &self.particles {
            particles.draw(&mut render_pass, &self.camera.bind_group);
        }
    }
}

impl Compositor for SceneRenderer {
    type Error = wgpu::SurfaceError;

    fn render(&mut self, frame: &Frame<'_>) -> Result<(), Self::Error> {
        if frame.scene.is_dirty() {
            self.sync_scene(frame.scene);
        }
        self.camera
            .update_gpu(&self.context.queue, frame.camera, frame.viewport);
        if let (Some(renderer), Some(field)) = (
            &self.particles,
            frame.scene.particles(SceneHandles::PARTICLES),
        ) {
            renderer.update_uniforms(&self.context.queue, &field.material.uniforms);
        }
        self.post_process
            .apply_bloom(&self.context.queue, frame.bloom);

        let output = self.context.get_next_frame()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.context.create_encoder();

        self.render_scene(&mut encoder);
        self.post_process.render(&mut encoder, &view);

        self.context.submit(encoder);
        output.present();
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.context.resize(width, height);
        self.post_process.resize(&self.context);
    }
}
