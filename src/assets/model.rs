//! glTF/GLB model import.
//!
//! Every scene node is walked recursively and its transform accumulated into
//! a world matrix. Each mesh primitive becomes one [`MeshData`] with
//! positions, texture coordinates and triangle indices.

use std::path::Path;

use glam::Mat4;

use crate::error::AppError;

/// Interleaved vertex used by the model pipeline.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Texture coordinate set 0.
    pub uv: [f32; 2],
}

/// One drawable primitive of a model.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// Mesh name from the file (or `"unnamed"`).
    pub name: String,
    /// Vertex data.
    pub vertices: Vec<ModelVertex>,
    /// Triangle list indices.
    pub indices: Vec<u32>,
    /// Accumulated node transform.
    pub world: Mat4,
}

/// All primitives of an imported model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelData {
    /// Primitives in traversal order.
    pub meshes: Vec<MeshData>,
}

impl ModelData {
    /// Total vertex count over all meshes.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices.len()).sum()
    }

    /// Total index count over all meshes.
    #[must_use]
    pub fn index_count(&self) -> usize {
        self.meshes.iter().map(|m| m.indices.len()).sum()
    }
}

/// Import a model file (`.glb` or `.gltf`).
pub fn load_model(path: &Path) -> Result<ModelData, AppError> {
    let (document, buffers, _images) = gltf::import(path)?;
    build_model(&document, &buffers)
}

/// Import a model from an in-memory glTF or GLB blob.
pub fn model_from_slice(data: &[u8]) -> Result<ModelData, AppError> {
    let (document, buffers, _images) = gltf::import_slice(data)?;
    build_model(&document, &buffers)
}

fn build_model(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
) -> Result<ModelData, AppError> {
    let mut model = ModelData::default();
    let scenes = document
        .default_scene()
        .into_iter()
        .chain(document.scenes())
        .take(1);
    for scene in scenes {
        for node in scene.nodes() {
            process_node(&node, Mat4::IDENTITY, buffers, &mut model)?;
        }
    }
    log::debug!(
        "imported model: {} meshes, {} vertices, {} indices",
        model.meshes.len(),
        model.vertex_count(),
        model.index_count()
    );
    Ok(model)
}

/// Process a glTF node and its children recursively.
fn process_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    model: &mut ModelData,
) -> Result<(), AppError> {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        let name = mesh.name().unwrap_or("unnamed").to_owned();
        for primitive in mesh.primitives() {
            let (vertices, indices) =
                extract_primitive(&primitive, buffers, &name)?;
            log::debug!(
                "mesh '{name}': {} vertices, {} indices",
                vertices.len(),
                indices.len()
            );
            model.meshes.push(MeshData {
                name: name.clone(),
                vertices,
                indices,
                world,
            });
        }
    }

    for child in node.children() {
        process_node(&child, world, buffers, model)?;
    }
    Ok(())
}

fn extract_primitive(
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
    name: &str,
) -> Result<(Vec<ModelVertex>, Vec<u32>), AppError> {
    let reader =
        primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| &d.0[..]));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .ok_or_else(|| AppError::MissingPositions(name.to_owned()))?
        .collect();

    let mut uvs = reader
        .read_tex_coords(0)
        .map(|coords| coords.into_f32());
    let vertices = positions
        .iter()
        .map(|&position| ModelVertex {
            position,
            uv: uvs
                .as_mut()
                .and_then(Iterator::next)
                .unwrap_or([0.0, 0.0]),
        })
        .collect::<Vec<_>>();

    // Non-indexed primitives draw their vertices in order.
    let indices = reader.read_indices().map_or_else(
        || (0..vertices.len() as u32).collect(),
        |iter| iter.into_u32().collect(),
    );

    Ok((vertices, indices))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Single triangle with UVs and u16 indices, under a translated parent
    /// node.
    pub(crate) const TRIANGLE_GLTF: &str = r#"{
  "asset": { "version": "2.0" },
  "scene": 0,
  "scenes": [{ "nodes": [0] }],
  "nodes": [
    { "name": "root", "translation": [0.0, 2.0, 0.0], "children": [1] },
    { "name": "tri", "mesh": 0, "translation": [1.0, 0.0, 0.0] }
  ],
  "meshes": [{
    "name": "Triangle",
    "primitives": [{
      "attributes": { "POSITION": 0, "TEXCOORD_0": 1 },
      "indices": 2
    }]
  }],
  "buffers": [{
    "byteLength": 68,
    "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAAAAAAAAAAAAIA/AAAAAAAAAAAAAIA/AAABAAIAAAA="
  }],
  "bufferViews": [
    { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
    { "buffer": 0, "byteOffset": 36, "byteLength": 24 },
    { "buffer": 0, "byteOffset": 60, "byteLength": 6 }
  ],
  "accessors": [
    { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
      "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
    { "bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC2" },
    { "bufferView": 2, "componentType": 5123, "count": 3, "type": "SCALAR" }
  ]
}"#;

    /// Same triangle positions with no UVs and no indices.
    const BARE_TRIANGLE_GLTF: &str = r#"{
  "asset": { "version": "2.0" },
  "scenes": [{ "nodes": [0] }],
  "nodes": [{ "mesh": 0 }],
  "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 } }] }],
  "buffers": [{
    "byteLength": 36,
    "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAA"
  }],
  "bufferViews": [{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }],
  "accessors": [
    { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
      "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] }
  ]
}"#;

    #[test]
    fn imports_triangle_with_uvs_and_indices() {
        let model = model_from_slice(TRIANGLE_GLTF.as_bytes()).unwrap();
        assert_eq!(model.meshes.len(), 1);
        let mesh = &model.meshes[0];
        assert_eq!(mesh.name, "Triangle");
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.vertices[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[2].uv, [0.0, 1.0]);
    }

    #[test]
    fn node_transforms_accumulate() {
        let model = model_from_slice(TRIANGLE_GLTF.as_bytes()).unwrap();
        let origin = model.meshes[0].world.transform_point3(glam::Vec3::ZERO);
        assert_eq!(origin, glam::Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn missing_uvs_and_indices_get_defaults() {
        let model = model_from_slice(BARE_TRIANGLE_GLTF.as_bytes()).unwrap();
        let mesh = &model.meshes[0];
        assert_eq!(mesh.name, "unnamed");
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert!(mesh.vertices.iter().all(|v| v.uv == [0.0, 0.0]));
        assert_eq!(model.vertex_count(), 3);
    }

    #[test]
    fn invalid_blob_is_model_error() {
        let err = model_from_slice(b"{ not gltf").unwrap_err();
        assert!(matches!(err, AppError::Model(_)));
    }
}
