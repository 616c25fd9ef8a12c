//! Post-processing effect passes.
//!
//! Provides the UnrealBloom-style glow and the final scene + bloom
//! composite.

pub mod bloom;
pub mod composite;
pub(crate) mod post_process;
pub mod screen_pass;

pub use bloom::BloomParams;
