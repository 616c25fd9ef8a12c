use glam::{Mat4, Vec3};

use crate::options::CameraOptions;

/// Perspective camera defined by eye position, target, and projection
/// parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Eye (camera) position in world space.
    pub eye: Vec3,
    /// Look-at target position.
    pub target: Vec3,
    /// Up direction vector.
    pub up: Vec3,
    /// Viewport aspect ratio (width / height).
    pub aspect: f32,
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
/// GPU uniform buffer holding the view-projection matrix and camera metadata.
pub struct CameraUniform {
    /// Combined view-projection matrix.
    pub view_proj: [[f32; 4]; 4],
    /// Camera world-space position.
    pub position: [f32; 3],
    /// Viewport aspect ratio.
    pub aspect: f32,
    /// Viewport size in physical pixels.
    pub viewport: [f32; 2],
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Padding for GPU alignment.
    pub(crate) _pad: f32,
}

impl Camera {
    /// Build a camera from the configured projection and start position.
    /// `aspect` comes from the initial viewport.
    #[must_use]
    pub fn from_options(options: &CameraOptions, aspect: f32) -> Self {
        Self {
            eye: Vec3::from_array(options.position),
            target: Vec3::from_array(options.target),
            up: Vec3::Y,
            aspect,
            fovy: options.fovy,
            znear: options.znear,
            zfar: options.zfar,
        }
    }

    /// Set the aspect ratio from a viewport size. Zero-sized viewports
    /// (minimized windows) leave the aspect untouched and return `false`.
    pub fn set_viewport(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.aspect = width as f32 / height as f32;
        true
    }

    /// Distance from eye to target.
    #[must_use]
    pub fn distance(&self) -> f32 {
        (self.eye - self.target).length()
    }

    /// View matrix (world to camera space).
    #[must_use]
    pub fn build_view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Projection matrix.
    #[must_use]
    pub fn build_projection(&self) -> Mat4 {
        // perspective_rh already uses [0,1] depth range (wgpu/Vulkan
        // convention)
        Mat4::perspective_rh(
            self.fovy.to_radians(),
            self.aspect,
            self.znear,
            self.zfar,
        )
    }

    /// Build the combined view-projection matrix.
    #[must_use]
    pub fn build_matrix(&self) -> Mat4 {
        self.build_projection() * self.build_view()
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraUniform {
    /// Create a new camera uniform with identity view-projection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            position: [0.0; 3],
            aspect: 1.0,
            viewport: [1.0, 1.0],
            fovy: 75.0,
            _pad: 0.0,
        }
    }

    /// Update uniform fields from the given camera's current state.
    pub fn update_view_proj(&mut self, camera: &Camera, viewport: (u32, u32)) {
        self.view_proj = camera.build_matrix().to_cols_array_2d();
        self.position = camera.eye.to_array();
        self.aspect = camera.aspect;
        self.viewport = [viewport.0.max(1) as f32, viewport.1.max(1) as f32];
        self.fovy = camera.fovy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_match_scene_camera() {
        let camera = Camera::from_options(&CameraOptions::default(), 1.5);
        assert_eq!(camera.eye, Vec3::new(10.0, 9.0, 20.0));
        assert_eq!(camera.target, Vec3::ZERO);
        assert_eq!(camera.fovy, 75.0);
        assert_eq!(camera.znear, 0.1);
        assert_eq!(camera.zfar, 1000.0);
    }

    #[test]
    fn last_resize_wins() {
        let mut camera = Camera::from_options(&CameraOptions::default(), 1.0);
        for (w, h) in [(1920, 1080), (640, 480), (800, 600)] {
            assert!(camera.set_viewport(w, h));
        }
        assert_eq!(camera.aspect, 800.0 / 600.0);
    }

    #[test]
    fn zero_sized_viewport_is_ignored() {
        let mut camera = Camera::from_options(&CameraOptions::default(), 2.0);
        assert!(!camera.set_viewport(0, 600));
        assert!(!camera.set_viewport(800, 0));
        assert_eq!(camera.aspect, 2.0);
    }

    #[test]
    fn target_projects_to_screen_center() {
        let camera = Camera::from_options(&CameraOptions::default(), 1.0);
        let clip = camera.build_matrix() * camera.target.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn uniform_tracks_camera() {
        let mut camera = Camera::from_options(&CameraOptions::default(), 1.0);
        let _ = camera.set_viewport(800, 600);
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera, (800, 600));
        assert_eq!(uniform.position, [10.0, 9.0, 20.0]);
        assert_eq!(uniform.viewport, [800.0, 600.0]);
        assert_eq!(uniform.aspect, camera.aspect);
        assert_eq!(size_of::<CameraUniform>(), 96);
    }
}
