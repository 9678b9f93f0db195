//! Aggregation with particle dynamics.
//!
//! Particles integrate `force` into `velocity` under gravity and steer with
//! separation, alignment and cohesion weights before they settle.

use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::GpuRecord;

#[derive(GpuRecord, Clone, Copy, Debug, Default, PartialEq)]
pub struct Particle {
    pub color: Vec4,
    pub center: Vec2,
    pub size: f32,
    pub age: f32,
    pub rotation: f32,
    pub velocity: Vec2,
    pub force: Vec2,
}

/// Parameters shared by every particle in one update.
#[derive(GpuRecord, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleSystem {
    /// Seed point of the aggregate.
    pub position: Vec4,
    /// Seconds a particle wanders before it is respawned.
    pub lifespan: f32,
    pub speed: f32,
    pub separation: f32,
    pub alignment: f32,
    pub cohesion: f32,
    pub mass: f32,
    pub max_velocity: f32,
    pub max_force: f32,
    pub gravity: Vec2,
    pub time_step: f32,
    pub neighbor_distance: f32,
    pub desired_separation: f32,
}

impl Default for ParticleSystem {
    /// Aggregate seeded at the centre with weak steering and no gravity.
    fn default() -> Self {
        Self {
            position: Vec4::new(0.0, 0.0, 0.0, 1.0),
            lifespan: 10.0,
            speed: 1.0,
            separation: 1.5,
            alignment: 1.0,
            cohesion: 1.0,
            mass: 1.0,
            max_velocity: 0.5,
            max_force: 0.05,
            gravity: Vec2::ZERO,
            time_step: 0.003,
            neighbor_distance: 0.05,
            desired_separation: 0.02,
        }
    }
}

impl ParticleSystem {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.time_step > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "time_step must be positive, got {}",
                self.time_step
            )));
        }
        if !(self.mass > 0.0) {
            return Err(ConfigError::Invalid(format!("mass must be positive, got {}", self.mass)));
        }
        if self.desired_separation > self.neighbor_distance {
            return Err(ConfigError::Invalid(format!(
                "desired_separation ({}) exceeds neighbor_distance ({})",
                self.desired_separation, self.neighbor_distance
            )));
        }
        Ok(())
    }
}
