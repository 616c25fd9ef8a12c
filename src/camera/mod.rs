//! Camera system for 3D scene viewing.
//!
//! Provides a perspective camera, orbit controls with damping and
//! auto-rotation, and the GPU uniform binding.

/// GPU uniform buffer and bind group for the camera.
pub mod controller;
/// Core camera struct and GPU uniform types.
pub mod core;
/// Spherical orbit controls with damping and auto-rotation.
pub mod orbit;

pub use self::core::{Camera, CameraUniform};
pub use controller::CameraController;
pub use orbit::OrbitControls;
