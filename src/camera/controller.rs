use wgpu::util::DeviceExt;

use crate::camera::core::{Camera, CameraUniform};

/// GPU side of the camera: the uniform buffer and its bind group.
///
/// The camera itself lives in [`AppContext`](crate::app::AppContext); the
/// renderer calls [`update_gpu`](Self::update_gpu) once per frame to push
/// the latest matrices.
pub struct CameraController {
    /// CPU copy of the uniform contents.
    pub uniform: CameraUniform,
    /// Uniform buffer bound at group 0 by the scene pipelines.
    pub buffer: wgpu::Buffer,
    /// Bind group layout (single uniform at binding 0).
    pub layout: wgpu::BindGroupLayout,
    /// Bind group referencing [`Self::buffer`].
    pub bind_group: wgpu::BindGroup,
}

impl CameraController {
    /// Allocate the camera uniform buffer initialised from `camera`.
    pub fn new(
        device: &wgpu::Device,
        camera: &Camera,
        viewport: (u32, u32),
    ) -> Self {
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(camera, viewport);

        let buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Buffer"),
                contents: bytemuck::cast_slice(&[uniform]),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });

        let layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Camera Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX
                        | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("Camera Bind Group"),
        });

        Self {
            uniform,
            buffer,
            layout,
            bind_group,
        }
    }

    /// Upload the current camera state.
    pub fn update_gpu(
        &mut self,
        queue: &wgpu::Queue,
        camera: &Camera,
        viewport: (u32, u32),
    ) {
        self.uniform.update_view_proj(camera, viewport);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}
