//! Boids without spatial binning.

use std::f32::consts::TAU;

use glam::{Vec2, Vec4};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::{GpuRecord, ProjectionParameters};

/// Particles the demo allocates.
pub const PARTICLE_COUNT: usize = 10_000;

/// Edge length of a particle quad, in projection units.
pub const PARTICLE_SIZE: f32 = 0.01;

#[derive(GpuRecord, Clone, Copy, Debug, Default, PartialEq)]
pub struct Particle {
    pub color: Vec4,
    pub center: Vec2,
    pub size: f32,
    pub age: f32,
    /// Heading in radians, kept in step with `velocity`.
    pub rotation: f32,
    pub velocity: Vec2,
    pub force: Vec2,
}

#[derive(GpuRecord, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleSystem {
    pub position: Vec4,
    pub time_step: f32,
    pub separation: f32,
    pub alignment: f32,
    pub cohesion: f32,
    pub max_velocity: f32,
    pub max_force: f32,
    pub neighbor_distance: f32,
    pub desired_separation: f32,
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self {
            position: Vec4::new(0.0, 0.0, 0.0, 1.0),
            time_step: 0.016,
            separation: 1.5,
            alignment: 1.0,
            cohesion: 1.0,
            max_velocity: 0.4,
            max_force: 0.03,
            neighbor_distance: 0.05,
            desired_separation: 0.025,
        }
    }
}

impl ParticleSystem {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_steering(self.time_step, self.neighbor_distance, self.desired_separation)
    }
}

pub(super) fn validate_steering(
    time_step: f32,
    neighbor_distance: f32,
    desired_separation: f32,
) -> Result<(), ConfigError> {
    if !(time_step > 0.0) {
        return Err(ConfigError::Invalid(format!(
            "time_step must be positive, got {}",
            time_step
        )));
    }
    if !(neighbor_distance > 0.0) {
        return Err(ConfigError::Invalid(format!(
            "neighbor_distance must be positive, got {}",
            neighbor_distance
        )));
    }
    if desired_separation > neighbor_distance {
        return Err(ConfigError::Invalid(format!(
            "desired_separation ({}) exceeds neighbor_distance ({})",
            desired_separation, neighbor_distance
        )));
    }
    Ok(())
}

/// Particles at random points inside `bounds`, each heading in a random
/// direction at half of `max_speed`.
pub fn spawn_particles<R: Rng>(
    count: usize,
    bounds: &ProjectionParameters,
    max_speed: f32,
    rng: &mut R,
) -> Vec<Particle> {
    (0..count)
        .map(|_| {
            let n = Vec2::new(rng.gen(), rng.gen());
            let center = Vec2::new(
                bounds.left + n.x * bounds.width(),
                bounds.bottom + n.y * bounds.height(),
            );
            let heading = rng.gen_range(0.0..TAU);
            let velocity = Vec2::from_angle(heading) * max_speed * 0.5;
            let shade = rng.gen_range(0.6..1.0);

            Particle {
                color: Vec4::new(shade, shade, 1.0, 1.0),
                center,
                size: PARTICLE_SIZE,
                age: 0.0,
                rotation: heading,
                velocity,
                force: Vec2::ZERO,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_layout() {
        assert_eq!(Particle::stride(), 64);
        assert_eq!(Particle::field("velocity").unwrap().offset, 40);
        assert_eq!(Particle::field("force").unwrap().offset, 48);
        assert_eq!(ParticleSystem::stride(), 48);
        assert_eq!(ParticleSystem::field("time_step").unwrap().offset, 16);
        assert_eq!(ParticleSystem::field("desired_separation").unwrap().offset, 44);
    }

    #[test]
    fn test_spawned_particles_move_inside_bounds() {
        let bounds = ProjectionParameters::new(0.0, 1.92, 1.08, 0.0, -1.0, 1.0);
        let mut rng = SmallRng::seed_from_u64(11);
        let particles = spawn_particles(500, &bounds, 0.4, &mut rng);

        assert_eq!(particles.len(), 500);
        for p in &particles {
            assert!(bounds.contains(p.center), "{:?}", p.center);
            assert!((p.velocity.length() - 0.2).abs() < 1e-5);
            assert!(Vec2::from_angle(p.rotation).abs_diff_eq(p.velocity / 0.2, 1e-4));
        }
    }

    #[test]
    fn test_steering_validation() {
        assert!(ParticleSystem::default().validate().is_ok());
        let crowded = ParticleSystem {
            desired_separation: 1.0,
            ..Default::default()
        };
        assert!(crowded.validate().is_err());
    }
}
