//! Orbit controls: spherical-coordinate camera orbiting around a target,
//! with inertial damping and turntable auto-rotation.
//!
//! Input handlers only accumulate deltas. [`OrbitControls::update`] applies
//! them to the [`Camera`] once per frame, decaying the deltas when damping is
//! enabled so motion eases out over several frames.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use super::core::Camera;
use crate::options::CameraOptions;

/// Polar angle is kept this far away from the poles.
const PHI_EPSILON: f32 = 1e-6;

/// Zoom factor of a single wheel step at `zoom_speed = 1.0`.
const ZOOM_STEP_BASE: f32 = 0.95;

/// Auto-rotation angle per frame at `auto_rotate_speed = 1.0`: one full
/// turn every 60 seconds at 60 frames per second.
const AUTO_ROTATE_ANGLE: f32 = TAU / 60.0 / 60.0;

/// Spherical coordinates around the Y axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Spherical {
    radius: f32,
    /// Polar angle from +Y.
    phi: f32,
    /// Azimuth around +Y, measured from +Z toward +X.
    theta: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

/// Camera controller that orbits, pans and dollies around a target point.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    /// Whether deltas decay over several frames instead of applying at once.
    pub enable_damping: bool,
    /// Fraction of the pending delta applied per frame when damping.
    pub damping_factor: f32,
    /// Whether the camera turns around the target on its own.
    pub auto_rotate: bool,
    /// Auto-rotation speed multiplier.
    pub auto_rotate_speed: f32,
    /// Drag rotation speed multiplier.
    pub rotate_speed: f32,
    /// Pan speed multiplier.
    pub pan_speed: f32,
    /// Wheel zoom speed multiplier.
    pub zoom_speed: f32,
    /// Closest allowed eye-to-target distance.
    pub min_distance: f32,
    /// Farthest allowed eye-to-target distance.
    pub max_distance: f32,

    spherical_delta: Spherical,
    pan_offset: Vec3,
    scale: f32,
}

impl OrbitControls {
    /// Create controls configured from the camera options.
    #[must_use]
    pub fn from_options(options: &CameraOptions) -> Self {
        Self {
            enable_damping: options.enable_damping,
            damping_factor: options.damping_factor.clamp(0.0, 1.0),
            auto_rotate: options.auto_rotate,
            auto_rotate_speed: options.auto_rotate_speed,
            rotate_speed: options.rotate_speed,
            pan_speed: options.pan_speed,
            zoom_speed: options.zoom_speed,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            spherical_delta: Spherical::default(),
            pan_offset: Vec3::ZERO,
            scale: 1.0,
        }
    }

    /// Angle the camera turns per frame while auto-rotating.
    #[must_use]
    pub fn auto_rotation_angle(&self) -> f32 {
        AUTO_ROTATE_ANGLE * self.auto_rotate_speed
    }

    /// Accumulate a drag rotation. `delta` is in pixels; a drag across the
    /// full viewport height turns the camera once around.
    pub fn rotate(&mut self, delta: Vec2, viewport_height: u32) {
        let height = viewport_height.max(1) as f32;
        self.rotate_left(TAU * delta.x / height * self.rotate_speed);
        self.rotate_up(TAU * delta.y / height * self.rotate_speed);
    }

    /// Accumulate a screen-space pan. `delta` is in pixels and is scaled so
    /// the point under the cursor stays under the cursor at the target
    /// depth.
    pub fn pan(&mut self, delta: Vec2, viewport_height: u32, camera: &Camera) {
        let height = viewport_height.max(1) as f32;
        let target_distance =
            camera.distance() * (camera.fovy.to_radians() / 2.0).tan();
        let forward = (camera.target - camera.eye).normalize_or_zero();
        let right = forward.cross(camera.up).normalize_or_zero();
        let up = right.cross(forward);

        let left = -right * (2.0 * delta.x * target_distance / height);
        let raise = up * (2.0 * delta.y * target_distance / height);
        self.pan_offset += (left + raise) * self.pan_speed;
    }

    /// Accumulate a wheel zoom. Positive deltas move toward the target.
    pub fn zoom(&mut self, delta: f32) {
        let step = ZOOM_STEP_BASE.powf(self.zoom_speed);
        if delta > 0.0 {
            self.scale *= step;
        } else if delta < 0.0 {
            self.scale /= step;
        }
    }

    /// Apply pending motion to the camera. Returns `true` if the camera
    /// moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let before = camera.eye;
        let mut spherical = Spherical::from_offset(camera.eye - camera.target);

        if self.auto_rotate {
            self.rotate_left(self.auto_rotation_angle());
        }

        let factor = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };
        spherical.theta += self.spherical_delta.theta * factor;
        spherical.phi += self.spherical_delta.phi * factor;
        spherical.phi = spherical.phi.clamp(PHI_EPSILON, PI - PHI_EPSILON);
        spherical.radius = (spherical.radius * self.scale)
            .clamp(self.min_distance, self.max_distance);

        camera.target += self.pan_offset * factor;
        camera.eye = camera.target + spherical.to_offset();

        if self.enable_damping {
            self.spherical_delta.theta *= 1.0 - self.damping_factor;
            self.spherical_delta.phi *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.spherical_delta = Spherical::default();
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        camera.eye.distance_squared(before) > f32::EPSILON
    }

    fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Camera, OrbitControls) {
        let options = CameraOptions::default();
        (
            Camera::from_options(&options, 1.0),
            OrbitControls::from_options(&options),
        )
    }

    fn azimuth(camera: &Camera) -> f32 {
        let offset = camera.eye - camera.target;
        offset.x.atan2(offset.z)
    }

    #[test]
    fn spherical_round_trip() {
        let offset = Vec3::new(10.0, 9.0, 20.0);
        let back = Spherical::from_offset(offset).to_offset();
        assert!(back.distance(offset) < 1e-4);
    }

    #[test]
    fn auto_rotate_turns_by_fixed_angle_and_keeps_radius() {
        let (mut camera, mut controls) = setup();
        controls.enable_damping = false;
        let radius = camera.distance();
        let start = azimuth(&camera);

        assert!(controls.update(&mut camera));

        let expected = TAU / 60.0 / 60.0 * 0.5;
        assert!((start - azimuth(&camera) - expected).abs() < 1e-5);
        assert!((camera.distance() - radius).abs() < 1e-3);
    }

    #[test]
    fn damped_rotation_decays_geometrically() {
        let (mut camera, mut controls) = setup();
        controls.auto_rotate = false;
        controls.rotate(Vec2::new(100.0, 0.0), 600);
        let pending = controls.spherical_delta.theta;

        let _ = controls.update(&mut camera);
        assert!(
            (controls.spherical_delta.theta - pending * 0.95).abs() < 1e-6
        );
        let _ = controls.update(&mut camera);
        assert!(
            (controls.spherical_delta.theta - pending * 0.95 * 0.95).abs()
                < 1e-6
        );
    }

    #[test]
    fn still_controls_leave_camera_in_place() {
        let (mut camera, mut controls) = setup();
        controls.auto_rotate = false;
        let eye = camera.eye;
        assert!(!controls.update(&mut camera));
        assert!(camera.eye.distance(eye) < 1e-4);
    }

    #[test]
    fn polar_angle_never_flips_over_the_pole() {
        let (mut camera, mut controls) = setup();
        controls.enable_damping = false;
        controls.auto_rotate = false;
        controls.rotate(Vec2::new(0.0, 10_000.0), 600);
        let _ = controls.update(&mut camera);
        let offset = camera.eye - camera.target;
        assert!(offset.y > 0.0);
        assert!(Vec2::new(offset.x, offset.z).length() < 1e-3);
    }

    #[test]
    fn zoom_in_shrinks_radius() {
        let (mut camera, mut controls) = setup();
        controls.auto_rotate = false;
        let radius = camera.distance();
        controls.zoom(1.0);
        let _ = controls.update(&mut camera);
        assert!((camera.distance() - radius * 0.95).abs() < 1e-3);

        controls.zoom(-1.0);
        let _ = controls.update(&mut camera);
        assert!((camera.distance() - radius).abs() < 1e-3);
    }

    #[test]
    fn pan_moves_target_and_eye_together() {
        let (mut camera, mut controls) = setup();
        controls.enable_damping = false;
        controls.auto_rotate = false;
        let offset = camera.eye - camera.target;
        controls.pan(Vec2::new(50.0, 0.0), 600, &camera);
        let _ = controls.update(&mut camera);
        assert!(camera.target.length() > 0.0);
        assert!((camera.eye - camera.target).distance(offset) < 1e-3);
    }
}
