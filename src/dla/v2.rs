//! Aggregation by random walk.
//!
//! Particles wander until they touch a stuck particle, then stick with
//! probability `stickiness`. Particle 0 starts stuck at the system position
//! and seeds the aggregate.

use glam::{Vec2, Vec4};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::{GpuRecord, ProjectionParameters};

/// Particles the demo allocates per buffer.
pub const PARTICLE_COUNT: usize = 30_000;

/// Particle buffers in flight; compute writes one while another is drawn.
pub const BUFFER_COUNT: usize = 3;

/// Edge length of a particle quad, in projection units.
pub const PARTICLE_SIZE: f32 = 0.005;

#[derive(GpuRecord, Clone, Copy, Debug, Default, PartialEq)]
pub struct Particle {
    pub color: Vec4,
    pub center: Vec2,
    pub size: f32,
    pub age: f32,
    pub stuck: bool,
}

#[derive(GpuRecord, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleSystem {
    /// Seed point of the aggregate; only x and y are used.
    pub position: Vec4,
    pub time_step: f32,
    /// Probability in `[0, 1]` that a touching particle sticks.
    pub stickiness: f32,
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self {
            position: Vec4::new(0.5, 0.5, 0.0, 1.0),
            time_step: 0.003,
            stickiness: 0.5,
        }
    }
}

impl ParticleSystem {
    pub fn seed(&self) -> Vec2 {
        self.position.truncate().truncate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.time_step > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "time_step must be positive, got {}",
                self.time_step
            )));
        }
        if !(0.0..=1.0).contains(&self.stickiness) {
            return Err(ConfigError::Invalid(format!(
                "stickiness must be within [0, 1], got {}",
                self.stickiness
            )));
        }
        Ok(())
    }
}

const FREE_COLOR: Vec4 = Vec4::new(0.4, 0.6, 1.0, 1.0);
const STUCK_COLOR: Vec4 = Vec4::new(1.0, 0.85, 0.4, 1.0);

/// Initial particles: the first is stuck at the system seed point, the
/// rest wander from random points inside `bounds`.
///
/// Fails when `bounds` is not finite or has a zero extent.
pub fn seed_particles<R: Rng>(
    count: usize,
    bounds: &ProjectionParameters,
    system: &ParticleSystem,
    rng: &mut R,
) -> Result<Vec<Particle>, ConfigError> {
    bounds.validate()?;
    let (x_lo, x_hi) = ordered(bounds.left, bounds.right);
    let (y_lo, y_hi) = ordered(bounds.bottom, bounds.top);

    let particles = (0..count)
        .map(|i| {
            if i == 0 {
                return Particle {
                    color: STUCK_COLOR,
                    center: system.seed(),
                    size: PARTICLE_SIZE,
                    age: 0.0,
                    stuck: true,
                };
            }
            Particle {
                color: FREE_COLOR,
                center: Vec2::new(rng.gen_range(x_lo..=x_hi), rng.gen_range(y_lo..=y_hi)),
                size: PARTICLE_SIZE,
                age: 0.0,
                stuck: false,
            }
        })
        .collect();
    Ok(particles)
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_layout() {
        assert_eq!(Particle::stride(), 48);
        assert_eq!(Particle::field("stuck").unwrap().offset, 32);
        assert_eq!(ParticleSystem::stride(), 32);
        assert_eq!(ParticleSystem::field("time_step").unwrap().offset, 16);
        assert_eq!(ParticleSystem::field("stickiness").unwrap().offset, 20);
    }

    #[test]
    fn test_default_system() {
        let system = ParticleSystem::default();
        assert_eq!(system.seed(), Vec2::new(0.5, 0.5));
        assert_eq!(system.time_step, 0.003);
        assert_eq!(system.stickiness, 0.5);
        assert!(system.validate().is_ok());
    }

    #[test]
    fn test_seed_particles() {
        let bounds = ProjectionParameters::default();
        let system = ParticleSystem::default();
        let mut rng = SmallRng::seed_from_u64(3);
        let particles = seed_particles(1000, &bounds, &system, &mut rng).unwrap();

        assert_eq!(particles.len(), 1000);
        assert!(particles[0].stuck);
        assert_eq!(particles[0].center, system.seed());
        assert!(particles[1..].iter().all(|p| !p.stuck));
        assert!(particles.iter().all(|p| bounds.contains(p.center)));
    }

    #[test]
    fn test_stuck_flag_encodes_as_float() {
        let bounds = ProjectionParameters::default();
        let mut rng = SmallRng::seed_from_u64(9);
        let particles = seed_particles(2, &bounds, &ParticleSystem::default(), &mut rng).unwrap();
        assert_eq!(particles[0].to_gpu().stuck, 1.0);
        assert_eq!(particles[1].to_gpu().stuck, 0.0);
    }

    #[test]
    fn test_seed_particles_rejects_bad_bounds() {
        let system = ParticleSystem::default();
        let mut rng = SmallRng::seed_from_u64(4);
        let infinite = ProjectionParameters { right: f32::INFINITY, ..Default::default() };
        assert!(matches!(
            seed_particles(10, &infinite, &system, &mut rng),
            Err(ConfigError::Invalid(_))
        ));
        let nan = ProjectionParameters { top: f32::NAN, ..Default::default() };
        assert!(seed_particles(10, &nan, &system, &mut rng).is_err());
    }

    #[test]
    fn test_stickiness_out_of_range() {
        let system = ParticleSystem { stickiness: 1.5, ..Default::default() };
        assert!(system.validate().is_err());
    }
}
