//! Asset loading: texture decoding, glTF import and the background loader
//! thread that runs both off the main timeline.

/// Background loader thread and completion events.
pub mod loader;
/// glTF/GLB model import.
pub mod model;
/// Image decoding into RGBA8 textures.
pub mod texture;

pub use loader::{AssetEvent, AssetKey, AssetLoader, AssetPayload};
pub use model::{load_model, model_from_slice, MeshData, ModelData, ModelVertex};
pub use texture::{
    decode_texture, load_texture, ColorSpace, TextureData, TextureOptions,
};
