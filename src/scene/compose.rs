use glam::{Mat4, Vec3};
use rand::Rng;

use super::{
    AmbientLight, AssetSlot, BasicMaterial, ModelNode, NodeId, NodeKind,
    ParticleField, ParticleMaterial, Scene,
};
use crate::options::Options;

/// Ids of the nodes created by [`compose_scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneHandles {
    /// Camera placeholder node.
    pub camera: NodeId,
    /// Ambient light node.
    pub ambient_light: NodeId,
    /// Model node, pending until its geometry arrives.
    pub model: NodeId,
    /// Particle field node.
    pub particles: NodeId,
}

impl SceneHandles {
    /// Name of the camera node.
    pub const CAMERA: &'static str = "camera";
    /// Name of the ambient light node.
    pub const AMBIENT_LIGHT: &'static str = "ambient_light";
    /// Name of the model node.
    pub const MODEL: &'static str = "astronaut";
    /// Name of the particle node.
    pub const PARTICLES: &'static str = "particles";
}

/// Assemble the scene: camera, ambient light, a pending model slot and the
/// particle field, all under the root group.
pub fn compose_scene<R: Rng + ?Sized>(
    options: &Options,
    rng: &mut R,
) -> (Scene, SceneHandles) {
    let mut scene = Scene::new();
    let root = scene.root();

    let camera = push(&mut scene, root, SceneHandles::CAMERA, NodeKind::Camera);
    if let Some(node) = scene.node_mut(camera) {
        node.transform =
            Mat4::from_translation(Vec3::from_array(options.camera.position));
    }

    let ambient_light = push(
        &mut scene,
        root,
        SceneHandles::AMBIENT_LIGHT,
        NodeKind::AmbientLight(AmbientLight {
            color: Vec3::from_array(options.lighting.ambient_color),
            intensity: options.lighting.ambient_intensity,
        }),
    );

    let model = push(
        &mut scene,
        root,
        SceneHandles::MODEL,
        NodeKind::Model(ModelNode {
            geometry: AssetSlot::Pending,
            material: BasicMaterial::new(),
        }),
    );

    let field =
        ParticleField::new(rng, ParticleMaterial::new(&options.particles));
    let particles = push(
        &mut scene,
        root,
        SceneHandles::PARTICLES,
        NodeKind::Particles(field),
    );

    log::debug!("composed scene with {} nodes", scene.len());
    (
        scene,
        SceneHandles {
            camera,
            ambient_light,
            model,
            particles,
        },
    )
}

/// Names are fixed and unique, so `add` cannot fail here; fall back to the
/// existing id to stay total.
fn push(scene: &mut Scene, parent: NodeId, name: &str, kind: NodeKind) -> NodeId {
    scene
        .add(parent, name, kind)
        .or_else(|| scene.find(name))
        .unwrap_or(parent)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::scene::PARTICLE_COUNT;

    #[test]
    fn composes_all_nodes_under_root() {
        let (scene, handles) =
            compose_scene(&Options::default(), &mut StdRng::seed_from_u64(3));
        assert_eq!(scene.len(), 5);
        let root = scene.node(scene.root()).unwrap();
        assert_eq!(
            root.children,
            vec![
                handles.camera,
                handles.ambient_light,
                handles.model,
                handles.particles
            ]
        );
    }

    #[test]
    fn model_starts_pending_and_particles_are_full() {
        let (scene, _) =
            compose_scene(&Options::default(), &mut StdRng::seed_from_u64(3));
        let model = scene.model(SceneHandles::MODEL).unwrap();
        assert!(model.geometry.is_pending());
        assert!(model.material.map.is_pending());
        assert_eq!(
            scene.particles(SceneHandles::PARTICLES).unwrap().len(),
            PARTICLE_COUNT
        );
    }

    #[test]
    fn ambient_light_uses_lighting_options() {
        let (scene, _) =
            compose_scene(&Options::default(), &mut StdRng::seed_from_u64(3));
        let light = scene.ambient_light().unwrap();
        assert_eq!(light.color, Vec3::ONE);
        assert_eq!(light.intensity, 0.8);
    }
}
