//! GPU resource management utilities.
//!
//! Provides wgpu device/surface initialization, pipeline boilerplate,
//! texture uploads and shader composition.

/// Shared wgpu boilerplate helpers for pipelines and bind group layouts.
pub mod pipeline_helpers;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// WGSL shader composition with `#import` support via naga-oil.
pub mod shader_composer;
/// Texture uploads and render targets.
pub mod texture;
