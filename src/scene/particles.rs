use rand::Rng;

use super::material::ParticleMaterial;

/// Number of particles in the field.
pub const PARTICLE_COUNT: usize = 2000;

/// Half-width of the cube the particles are scattered in.
pub const PARTICLE_EXTENT: f32 = 250.0;

/// Generate `count` positions, each coordinate uniform in
/// `[-PARTICLE_EXTENT, PARTICLE_EXTENT]`.
pub fn generate_positions<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
) -> Vec<[f32; 3]> {
    (0..count)
        .map(|_| {
            [
                rng.random_range(-PARTICLE_EXTENT..=PARTICLE_EXTENT),
                rng.random_range(-PARTICLE_EXTENT..=PARTICLE_EXTENT),
                rng.random_range(-PARTICLE_EXTENT..=PARTICLE_EXTENT),
            ]
        })
        .collect()
}

/// Fixed set of randomly placed sprites and their material.
#[derive(Debug, Clone)]
pub struct ParticleField {
    positions: Vec<[f32; 3]>,
    /// Shader material drawing the sprites.
    pub material: ParticleMaterial,
}

impl ParticleField {
    /// Scatter [`PARTICLE_COUNT`] particles using `rng`.
    pub fn new<R: Rng + ?Sized>(
        rng: &mut R,
        material: ParticleMaterial,
    ) -> Self {
        Self {
            positions: generate_positions(rng, PARTICLE_COUNT),
            material,
        }
    }

    /// Particle positions. Immutable after generation.
    #[must_use]
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// Number of particles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the field has no particles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
