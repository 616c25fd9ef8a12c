//! Textured particle sprites.
//!
//! One instance per particle position; the vertex shader expands every
//! instance into a camera-facing quad (6 vertices).

use std::sync::Arc;

use wgpu::util::DeviceExt;

use super::pipeline_util::{depth_stencil_state, scene_color_target};
use crate::assets::TextureData;
use crate::error::AppError;
use crate::gpu::pipeline_helpers::{
    filtering_sampler, linear_sampler, texture_2d, uniform_buffer_in,
};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::{Shader, ShaderComposer};
use crate::gpu::texture::GpuTexture;
use crate::scene::{ParticleField, ParticleMaterial, ParticleUniforms};

const VERTICES_PER_SPRITE: u32 = 6;

const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 1] =
    wgpu::vertex_attr_array![0 => Float32x3];

fn instance_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: size_of::<[f32; 3]>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &INSTANCE_ATTRIBUTES,
    }
}

/// Draws a [`ParticleField`] with its [`ParticleMaterial`].
pub struct ParticleRenderer {
    pipeline: wgpu::RenderPipeline,
    instance_buffer: wgpu::Buffer,
    instance_count: u32,
    material_buffer: wgpu::Buffer,
    material_layout: wgpu::BindGroupLayout,
    material_bind_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,
    placeholder: GpuTexture,
    /// Uploaded sprite texture and the asset it came from.
    texture: Option<(Arc<TextureData>, GpuTexture)>,
}

impl ParticleRenderer {
    /// Build the pipeline for `material` and upload `positions`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Shader`] if the particle shader fails to compose.
    pub fn new(
        context: &RenderContext,
        camera_layout: &wgpu::BindGroupLayout,
        shader_composer: &mut ShaderComposer,
        field: &ParticleField,
    ) -> Result<Self, AppError> {
        let device = &context.device;
        let material = &field.material;

        let material_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Particle Material Buffer"),
                contents: bytemuck::cast_slice(&[material.uniforms]),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });
        let material_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Particle Material Layout"),
                entries: &[
                    uniform_buffer_in(
                        0,
                        wgpu::ShaderStages::VERTEX
                            | wgpu::ShaderStages::FRAGMENT,
                    ),
                    texture_2d(1),
                    filtering_sampler(2),
                ],
            });
        let sampler = linear_sampler(device, "Particle Sampler");
        let placeholder = GpuTexture::placeholder(device, &context.queue);
        let material_bind_group = Self::create_material_bind_group(
            device,
            &material_layout,
            &material_buffer,
            &placeholder.view,
            &sampler,
        );

        let pipeline = Self::create_pipeline(
            device,
            camera_layout,
            &material_layout,
            shader_composer,
            material,
        )?;
        let (instance_buffer, instance_count) =
            Self::create_instance_buffer(device, field.positions());

        Ok(Self {
            pipeline,
            instance_buffer,
            instance_count,
            material_buffer,
            material_layout,
            material_bind_group,
            sampler,
            placeholder,
            texture: None,
        })
    }

    fn create_pipeline(
        device: &wgpu::Device,
        camera_layout: &wgpu::BindGroupLayout,
        material_layout: &wgpu::BindGroupLayout,
        shader_composer: &mut ShaderComposer,
        material: &ParticleMaterial,
    ) -> Result<wgpu::RenderPipeline, AppError> {
        let shader =
            shader_composer.compose(device, "Particle Shader", Shader::Particle)?;
        let layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Particle Pipeline Layout"),
                bind_group_layouts: &[camera_layout, material_layout],
                push_constant_ranges: &[],
            });
        Ok(device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Particle Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[instance_layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &scene_color_target(Some(material.blend)),
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(depth_stencil_state(
                material.depth_test,
                material.depth_write,
            )),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        }))
    }

    fn create_instance_buffer(
        device: &wgpu::Device,
        positions: &[[f32; 3]],
    ) -> (wgpu::Buffer, u32) {
        // Never allocate an empty vertex buffer.
        let contents: &[[f32; 3]] =
            if positions.is_empty() { &[[0.0; 3]] } else { positions };
        let buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Particle Instance Buffer"),
                contents: bytemuck::cast_slice(contents),
                usage: wgpu::BufferUsages::VERTEX,
            });
        (buffer, positions.len() as u32)
    }

    fn create_material_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
        texture: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle Material Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(texture),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    /// Number of sprites drawn.
    #[must_use]
    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    /// Write the material uniforms (`u_time`, size) for this frame.
    pub fn update_uniforms(&self, queue: &wgpu::Queue, uniforms: &ParticleUniforms) {
        queue.write_buffer(
            &self.material_buffer,
            0,
            bytemuck::cast_slice(std::slice::from_ref(uniforms)),
        );
    }

    /// Pick up scene changes: new positions or a newly resolved sprite
    /// texture. Unchanged assets are detected by pointer and skipped.
    pub fn sync(&mut self, context: &RenderContext, field: &ParticleField) {
        let device = &context.device;
        if field.len() as u32 != self.instance_count {
            let (buffer, count) =
                Self::create_instance_buffer(device, field.positions());
            self.instance_buffer = buffer;
            self.instance_count = count;
        }

        let ready = field.material.texture.ready();
        let unchanged = match (ready, &self.texture) {
            (Some(new), Some((current, _))) => Arc::ptr_eq(new, current),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }

        self.texture = ready.map(|data| {
            let gpu = GpuTexture::from_data(
                device,
                &context.queue,
                data,
                "Particle Texture",
            );
            (Arc::clone(data), gpu)
        });
        let view = self
            .texture
            .as_ref()
            .map_or(&self.placeholder.view, |(_, gpu)| &gpu.view);
        self.material_bind_group = Self::create_material_bind_group(
            device,
            &self.material_layout,
            &self.material_buffer,
            view,
            &self.sampler,
        );
    }

    /// Record the sprite draw into an open scene pass.
    pub fn draw<'a>(
        &'a self,
        render_pass: &mut wgpu::RenderPass<'a>,
        camera: &'a wgpu::BindGroup,
    ) {
        if self.instance_count == 0 {
            return;
        }
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, camera, &[]);
        render_pass.set_bind_group(1, &self.material_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
        render_pass.draw(0..VERTICES_PER_SPRITE, 0..self.instance_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_layout_is_one_vec3_per_instance() {
        let layout = instance_layout();
        assert_eq!(layout.array_stride, 12);
        assert_eq!(layout.step_mode, wgpu::VertexStepMode::Instance);
        assert_eq!(layout.attributes.len(), 1);
        assert_eq!(layout.attributes[0].shader_location, 0);
    }
}
