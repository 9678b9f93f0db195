//! Boids with uniform-grid binning.
//!
//! A binning pass stores each particle's cell in `grid_id` and counts
//! particles per cell in a [`Grid`](super::Grid); the steering pass then
//! only looks at the 3x3 block of cells around each particle.

use glam::{Vec2, Vec4};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::grid::GridDims;
use super::v1;
use crate::error::ConfigError;
use crate::{GpuRecord, ProjectionParameters};

pub use super::v1::{PARTICLE_COUNT, PARTICLE_SIZE};

#[derive(GpuRecord, Clone, Copy, Debug, Default, PartialEq)]
pub struct Particle {
    pub color: Vec4,
    pub center: Vec2,
    pub size: f32,
    pub age: f32,
    pub rotation: f32,
    pub velocity: Vec2,
    pub force: Vec2,
    /// Cell this particle was binned into; stored as a float on the GPU.
    #[index]
    pub grid_id: u32,
}

impl From<v1::Particle> for Particle {
    fn from(p: v1::Particle) -> Self {
        Self {
            color: p.color,
            center: p.center,
            size: p.size,
            age: p.age,
            rotation: p.rotation,
            velocity: p.velocity,
            force: p.force,
            grid_id: 0,
        }
    }
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
    pub grid_width: u32,
    pub grid_height: u32,
}

impl Default for ParticleSystem {
    /// Same steering as the unbinned demo over a 40x40 grid, so a cell
    /// is one neighbour distance wide in the default bounds.
    fn default() -> Self {
        let base = v1::ParticleSystem::default();
        Self {
            position: base.position,
            time_step: base.time_step,
            separation: base.separation,
            alignment: base.alignment,
            cohesion: base.cohesion,
            max_velocity: base.max_velocity,
            max_force: base.max_force,
            neighbor_distance: base.neighbor_distance,
            desired_separation: base.desired_separation,
            grid_width: 40,
            grid_height: 40,
        }
    }
}

impl ParticleSystem {
    pub fn grid_dims(&self) -> Result<GridDims, crate::LayoutError> {
        GridDims::new(self.grid_width, self.grid_height)
    }

    /// Grid sized so one cell spans `neighbor_distance` across `bounds`.
    ///
    /// Leaves the grid size untouched when the fit exceeds the histogram
    /// capacity.
    pub fn fit_grid(&mut self, bounds: &ProjectionParameters) -> Result<GridDims, crate::LayoutError> {
        let cells = |extent: f32| (extent.abs() / self.neighbor_distance).ceil().max(1.0) as u32;
        let dims = GridDims::new(cells(bounds.width()), cells(bounds.height()))?;
        self.grid_width = dims.width();
        self.grid_height = dims.height();
        Ok(dims)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        v1::validate_steering(self.time_step, self.neighbor_distance, self.desired_separation)?;
        self.grid_dims()?;
        Ok(())
    }
}

/// Particles at random points inside `bounds`, all in cell 0 until the
/// first binning pass.
pub fn spawn_particles<R: Rng>(
    count: usize,
    bounds: &ProjectionParameters,
    max_speed: f32,
    rng: &mut R,
) -> Vec<Particle> {
    v1::spawn_particles(count, bounds, max_speed, rng)
        .into_iter()
        .map(Particle::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::MAX_EXACT_INDEX;
    use crate::flocking::GRID_CAPACITY;

    #[test]
    fn test_layout() {
        assert_eq!(Particle::stride(), 64);
        assert_eq!(Particle::field("grid_id").unwrap().offset, 56);
        assert_eq!(ParticleSystem::stride(), 64);
        assert_eq!(ParticleSystem::field("grid_width").unwrap().offset, 48);
        assert_eq!(ParticleSystem::field("grid_height").unwrap().offset, 52);
    }

    #[test]
    fn test_grid_id_round_trips_for_every_cell() {
        let mut particle = Particle::default();
        for id in 0..GRID_CAPACITY as u32 {
            particle.grid_id = id;
            let gpu = particle.to_gpu();
            assert_eq!(gpu.grid_id, id as f32);
            assert_eq!(Particle::from_gpu(&gpu).grid_id, id);
        }
        assert!(GRID_CAPACITY as u32 <= MAX_EXACT_INDEX);
    }

    #[test]
    fn test_grid_dims_from_system() {
        let system = ParticleSystem::default();
        let dims = system.grid_dims().unwrap();
        assert_eq!((dims.width(), dims.height()), (40, 40));

        let too_big = ParticleSystem {
            grid_width: 1000,
            grid_height: 1000,
            ..Default::default()
        };
        assert!(too_big.grid_dims().is_err());
        assert!(matches!(too_big.validate(), Err(ConfigError::Layout(_))));
    }

    #[test]
    fn test_fit_grid() {
        let mut system = ParticleSystem::default();
        let bounds = ProjectionParameters::new(0.0, 1.92, 1.08, 0.0, -1.0, 1.0);
        let dims = system.fit_grid(&bounds).unwrap();
        assert_eq!((dims.width(), dims.height()), (39, 22));
        assert_eq!(system.grid_width, 39);

        system.neighbor_distance = 0.001;
        assert!(system.fit_grid(&bounds).is_err());
        assert_eq!((system.grid_width, system.grid_height), (39, 22));
        assert!(system.validate().is_ok());
    }

    #[test]
    fn test_json_keeps_grid_size() {
        let json = r#"{ "grid_width": 64, "grid_height": 32 }"#;
        let system: ParticleSystem = serde_json::from_str(json).unwrap();
        assert_eq!((system.grid_width, system.grid_height), (64, 32));
        assert_eq!(system.max_force, ParticleSystem::default().max_force);
    }
}
