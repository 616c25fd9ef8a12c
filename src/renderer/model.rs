//! Textured model meshes drawn with the unlit [`BasicMaterial`].

use std::sync::Arc;

use glam::Mat4;
use wgpu::util::DeviceExt;

use super::pipeline_util::{depth_stencil_state, scene_color_target};
use crate::assets::{ModelData, ModelVertex, TextureData};
use crate::error::AppError;
use crate::gpu::pipeline_helpers::{
    filtering_sampler, repeat_sampler, texture_2d, uniform_buffer_in,
};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::{Shader, ShaderComposer};
use crate::gpu::texture::GpuTexture;
use crate::scene::{BasicMaterial, ModelNode};

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: size_of::<ModelVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRIBUTES,
    }
}

/// Per-mesh uniforms (matches the WGSL struct)
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct MeshUniform {
    model: [[f32; 4]; 4],
    alpha_test: f32,
    _pad: [f32; 3],
}

impl MeshUniform {
    fn new(world: Mat4, material: &BasicMaterial) -> Self {
        Self {
            model: world.to_cols_array_2d(),
            alpha_test: material.alpha_test,
            _pad: [0.0; 3],
        }
    }
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    /// Transform relative to the model node.
    local: Mat4,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Uploads a [`ModelNode`]'s geometry once it is resolved and draws every
/// mesh with the shared material map.
pub struct ModelRenderer {
    pipeline: wgpu::RenderPipeline,
    mesh_layout: wgpu::BindGroupLayout,
    map_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    placeholder: GpuTexture,
    map_bind_group: wgpu::BindGroup,
    map: Option<(Arc<TextureData>, GpuTexture)>,
    geometry: Option<Arc<ModelData>>,
    meshes: Vec<GpuMesh>,
}

impl ModelRenderer {
    /// Build the pipeline for `material`. Geometry arrives later through
    /// [`sync`](Self::sync).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Shader`] if the model shader fails to compose.
    pub fn new(
        context: &RenderContext,
        camera_layout: &wgpu::BindGroupLayout,
        shader_composer: &mut ShaderComposer,
        material: &BasicMaterial,
    ) -> Result<Self, AppError> {
        let device = &context.device;
        let mesh_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Model Mesh Layout"),
                entries: &[uniform_buffer_in(
                    0,
                    wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                )],
            });
        let map_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Model Map Layout"),
                entries: &[texture_2d(0), filtering_sampler(1)],
            });
        let sampler = repeat_sampler(device, "Model Map Sampler");
        let placeholder = GpuTexture::placeholder(device, &context.queue);
        let map_bind_group = Self::create_map_bind_group(
            device,
            &map_layout,
            &placeholder.view,
            &sampler,
        );

        let shader =
            shader_composer.compose(device, "Model Shader", Shader::Model)?;
        let layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Model Pipeline Layout"),
                bind_group_layouts: &[camera_layout, &mesh_layout, &map_layout],
                push_constant_ranges: &[],
            });
        let pipeline =
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Model Pipeline"),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[vertex_layout()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &scene_color_target(material.blend()),
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: Some(wgpu::Face::Back),
                    ..Default::default()
                },
                depth_stencil: Some(depth_stencil_state(true, true)),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        Ok(Self {
            pipeline,
            mesh_layout,
            map_layout,
            sampler,
            placeholder,
            map_bind_group,
            map: None,
            geometry: None,
            meshes: Vec::new(),
        })
    }

    fn create_map_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Model Map Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    fn upload_meshes(
        &self,
        device: &wgpu::Device,
        data: &ModelData,
        world: Mat4,
        material: &BasicMaterial,
    ) -> Vec<GpuMesh> {
        data.meshes
            .iter()
            .filter(|mesh| !mesh.vertices.is_empty() && !mesh.indices.is_empty())
            .map(|mesh| {
                let vertex_buffer = device.create_buffer_init(
                    &wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("{} Vertex Buffer", mesh.name)),
                        contents: bytemuck::cast_slice(&mesh.vertices),
                        usage: wgpu::BufferUsages::VERTEX,
                    },
                );
                let index_buffer = device.create_buffer_init(
                    &wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("{} Index Buffer", mesh.name)),
                        contents: bytemuck::cast_slice(&mesh.indices),
                        usage: wgpu::BufferUsages::INDEX,
                    },
                );
                let uniform_buffer = device.create_buffer_init(
                    &wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("{} Uniform Buffer", mesh.name)),
                        contents: bytemuck::cast_slice(&[MeshUniform::new(
                            world * mesh.world,
                            material,
                        )]),
                        usage: wgpu::BufferUsages::UNIFORM
                            | wgpu::BufferUsages::COPY_DST,
                    },
                );
                let bind_group =
                    device.create_bind_group(&wgpu::BindGroupDescriptor {
                        label: Some(&format!("{} Bind Group", mesh.name)),
                        layout: &self.mesh_layout,
                        entries: &[wgpu::BindGroupEntry {
                            binding: 0,
                            resource: uniform_buffer.as_entire_binding(),
                        }],
                    });
                GpuMesh {
                    vertex_buffer,
                    index_buffer,
                    index_count: mesh.indices.len() as u32,
                    local: mesh.world,
                    uniform_buffer,
                    bind_group,
                }
            })
            .collect()
    }

    /// Pick up scene changes for the model node with accumulated transform
    /// `world`. New geometry or a new map is uploaded; unchanged assets are
    /// detected by pointer and skipped.
    pub fn sync(
        &mut self,
        context: &RenderContext,
        node: &ModelNode,
        world: Mat4,
    ) {
        let device = &context.device;
        let geometry = node.geometry.ready();
        let same_geometry = match (geometry, &self.geometry) {
            (Some(new), Some(current)) => Arc::ptr_eq(new, current),
            (None, None) => true,
            _ => false,
        };
        if same_geometry {
            for mesh in &self.meshes {
                context.queue.write_buffer(
                    &mesh.uniform_buffer,
                    0,
                    bytemuck::cast_slice(&[MeshUniform::new(
                        world * mesh.local,
                        &node.material,
                    )]),
                );
            }
        } else {
            self.meshes = geometry.map_or_else(Vec::new, |data| {
                self.upload_meshes(device, data, world, &node.material)
            });
            self.geometry = geometry.cloned();
            log::debug!("uploaded {} model meshes", self.meshes.len());
        }

        let map = node.material.map.ready();
        let same_map = match (map, &self.map) {
            (Some(new), Some((current, _))) => Arc::ptr_eq(new, current),
            (None, None) => true,
            _ => false,
        };
        if same_map {
            return;
        }
        self.map = map.map(|data| {
            let gpu =
                GpuTexture::from_data(device, &context.queue, data, "Model Map");
            (Arc::clone(data), gpu)
        });
        let view = self
            .map
            .as_ref()
            .map_or(&self.placeholder.view, |(_, gpu)| &gpu.view);
        self.map_bind_group = Self::create_map_bind_group(
            device,
            &self.map_layout,
            view,
            &self.sampler,
        );
    }

    /// Record every mesh into an open scene pass. Draws nothing until the
    /// geometry has been resolved.
    pub fn draw<'a>(
        &'a self,
        render_pass: &mut wgpu::RenderPass<'a>,
        camera: &'a wgpu::BindGroup,
    ) {
        if self.meshes.is_empty() {
            return;
        }
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, camera, &[]);
        render_pass.set_bind_group(2, &self.map_bind_group, &[]);
        for mesh in &self.meshes {
            render_pass.set_bind_group(1, &mesh.bind_group, &[]);
            render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(
                mesh.index_buffer.slice(..),
                wgpu::IndexFormat::Uint32,
            );
            render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_uniform_matches_wgsl_layout() {
        assert_eq!(size_of::<MeshUniform>(), 80);
        let uniform = MeshUniform::new(Mat4::IDENTITY, &BasicMaterial::new());
        assert_eq!(uniform.alpha_test, 1.0);
        assert_eq!(uniform.model[3][3], 1.0);
    }

    #[test]
    fn vertex_layout_matches_model_vertex() {
        let layout = vertex_layout();
        assert_eq!(layout.array_stride, 20);
        assert_eq!(layout.attributes[1].offset, 12);
    }
}
