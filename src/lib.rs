// -- Lint policy ---------------------------------------------------------
// Lint groups and their allowances live in Cargo.toml; these are the
// crate-wide extras.

// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Real-time 3D scene with bloom, rendered with wgpu.
//!
//! A textured glTF astronaut floats inside a field of glowing, twinkling
//! particle sprites. An orbit camera circles the scene and an UnrealBloom
//! style post-process makes the bright pixels glow. Bloom strength, radius
//! and threshold can be tuned while the scene runs.
//!
//! # Key entry points
//!
//! - [`app::AppContext`] - options, scene graph, camera and asset loader
//! - [`app::RenderLoop`] - per-frame tick: assets, `u_time`, bloom, controls,
//!   render
//! - [`renderer::SceneRenderer`] - the wgpu compositor
//! - [`options::Options`] - runtime configuration (bloom, camera, particles,
//!   lighting, asset paths, keybindings)
//! - `Viewer` - winit window host (feature `viewer`)
//!
//! # Architecture
//!
//! Textures and the model are decoded on a background
//! [`assets::AssetLoader`] thread. Each tick the render loop drains finished
//! loads into the scene graph, so nodes go from pending to ready (or failed)
//! between frames. The renderer uploads newly resolved assets, draws the
//! model and the additive particle sprites into an HDR target, then runs
//! bloom (threshold → blur chain → weighted composite) and a final
//! scene + bloom composite onto the window surface.

pub mod app;
pub mod assets;
pub mod camera;
pub mod error;
pub mod gpu;
pub mod input;
pub mod options;
pub mod renderer;
pub mod scene;
pub mod util;
#[cfg(feature = "viewer")]
mod viewer;

pub use app::{AppCommand, AppContext, RenderLoop};
pub use error::AppError;
pub use input::{InputEvent, InputProcessor, MouseButton};
pub use options::Options;
pub use renderer::SceneRenderer;
#[cfg(feature = "viewer")]
pub use viewer::{Viewer, ViewerBuilder};
