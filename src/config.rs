//! Demo configuration.
//!
//! Each demo is described by one JSON document tagged with its name:
//!
//! ```json
//! {
//!   "demo": "dla_sticky",
//!   "particle_count": 30000,
//!   "projection": { "left": -1, "right": 1, "top": 1, "bottom": -1, "near": -1, "far": 1 },
//!   "system": { "position": [0.5, 0.5, 0.0, 1.0], "time_step": 0.003, "stickiness": 0.5 }
//! }
//! ```
//!
//! Missing fields take their defaults, so `{ "demo": "flocking" }` is a
//! complete configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::automaton3d::{self, AutomatonClock, VolumeDims};
use crate::error::{ConfigError, LayoutError};
use crate::layout::{self, RecordLayout};
use crate::mesh::{CubeVertex, QuadVertex};
use crate::vertex::InstanceLayout;
use crate::{dla, flocking, GpuRecord, ProjectionParameters, Uniforms};

fn default_dla_count() -> usize {
    dla::v2::PARTICLE_COUNT
}

fn default_flocking_count() -> usize {
    flocking::v1::PARTICLE_COUNT
}

/// One of the five demos with its parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "demo", rename_all = "snake_case")]
pub enum DemoConfig {
    /// 3D cellular automaton.
    Automaton3d {
        #[serde(default)]
        volume: VolumeDims,
        #[serde(default)]
        simulation: automaton3d::Simulation,
    },
    /// Aggregation with particle dynamics.
    DlaKinetic {
        #[serde(default = "default_dla_count")]
        particle_count: usize,
        #[serde(default)]
        projection: ProjectionParameters,
        #[serde(default)]
        system: dla::v1::ParticleSystem,
    },
    /// Aggregation by random walk and sticking.
    DlaSticky {
        #[serde(default = "default_dla_count")]
        particle_count: usize,
        #[serde(default)]
        projection: ProjectionParameters,
        #[serde(default)]
        system: dla::v2::ParticleSystem,
    },
    /// Boids, all pairs.
    Flocking {
        #[serde(default = "default_flocking_count")]
        particle_count: usize,
        #[serde(default)]
        projection: ProjectionParameters,
        #[serde(default)]
        system: flocking::v1::ParticleSystem,
    },
    /// Boids binned into a uniform grid.
    FlockingBinned {
        #[serde(default = "default_flocking_count")]
        particle_count: usize,
        #[serde(default)]
        projection: ProjectionParameters,
        #[serde(default)]
        system: flocking::v2::ParticleSystem,
    },
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self::DlaSticky {
            particle_count: default_dla_count(),
            projection: ProjectionParameters::default(),
            system: dla::v2::ParticleSystem::default(),
        }
    }
}

/// Layout facts about one record, independent of its type.
#[derive(Clone, Copy, Debug)]
pub struct RecordInfo {
    pub name: &'static str,
    pub wgsl: &'static str,
    pub stride: u32,
    pub fields: &'static [crate::FieldLayout],
    layout: fn() -> RecordLayout,
    verify: fn() -> Result<(), LayoutError>,
}

impl RecordInfo {
    pub fn of<R: GpuRecord>() -> Self {
        Self {
            name: R::WGSL_NAME,
            wgsl: R::WGSL_STRUCT,
            stride: R::stride(),
            fields: R::FIELDS,
            layout: RecordLayout::of::<R>,
            verify: layout::verify::<R>,
        }
    }

    pub fn layout(&self) -> RecordLayout {
        (self.layout)()
    }

    pub fn verify(&self) -> Result<(), LayoutError> {
        (self.verify)()
    }
}

impl DemoConfig {
    /// Demo names as they appear in the `demo` tag.
    pub const NAMES: [&'static str; 5] = [
        "automaton3d",
        "dla_kinetic",
        "dla_sticky",
        "flocking",
        "flocking_binned",
    ];

    /// Default configuration for a demo by name.
    pub fn default_for(name: &str) -> Option<Self> {
        let config = match name {
            "automaton3d" => Self::Automaton3d {
                volume: VolumeDims::default(),
                simulation: automaton3d::Simulation::default(),
            },
            "dla_kinetic" => Self::DlaKinetic {
                particle_count: default_dla_count(),
                projection: ProjectionParameters::default(),
                system: dla::v1::ParticleSystem::default(),
            },
            "dla_sticky" => Self::default(),
            "flocking" => Self::Flocking {
                particle_count: default_flocking_count(),
                projection: ProjectionParameters::default(),
                system: flocking::v1::ParticleSystem::default(),
            },
            "flocking_binned" => Self::FlockingBinned {
                particle_count: default_flocking_count(),
                projection: ProjectionParameters::default(),
                system: flocking::v2::ParticleSystem::default(),
            },
            _ => return None,
        };
        Some(config)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Automaton3d { .. } => "automaton3d",
            Self::DlaKinetic { .. } => "dla_kinetic",
            Self::DlaSticky { .. } => "dla_sticky",
            Self::Flocking { .. } => "flocking",
            Self::FlockingBinned { .. } => "flocking_binned",
        }
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded {} config from {}", config.name(), path.display());
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Orthographic bounds of a 2D demo; `None` for the automaton.
    pub fn projection(&self) -> Option<&ProjectionParameters> {
        match self {
            Self::Automaton3d { .. } => None,
            Self::DlaKinetic { projection, .. }
            | Self::DlaSticky { projection, .. }
            | Self::Flocking { projection, .. }
            | Self::FlockingBinned { projection, .. } => Some(projection),
        }
    }

    /// Number of particle or cube instances the demo draws.
    pub fn instance_count(&self) -> usize {
        match self {
            Self::Automaton3d { volume, .. } => volume.cell_count(),
            Self::DlaKinetic { particle_count, .. }
            | Self::DlaSticky { particle_count, .. }
            | Self::Flocking { particle_count, .. }
            | Self::FlockingBinned { particle_count, .. } => *particle_count,
        }
    }

    /// Uniforms for the first frame.
    pub fn initial_uniforms(&self, aspect: f32) -> Uniforms {
        match self.projection() {
            Some(bounds) => Uniforms::orthographic(bounds),
            None => {
                let mut clock = AutomatonClock::new();
                clock.advance();
                clock.uniforms(aspect)
            }
        }
    }

    /// Check every parameter the demo depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(bounds) = self.projection() {
            bounds.validate()?;
        }
        match self {
            Self::Automaton3d { volume, .. } => volume.validate()?,
            Self::DlaKinetic { system, .. } => system.validate()?,
            Self::DlaSticky { system, .. } => system.validate()?,
            Self::Flocking { system, .. } => system.validate()?,
            Self::FlockingBinned { system, .. } => system.validate()?,
        }

        if self.instance_count() == 0 {
            return Err(ConfigError::Invalid(format!("{} needs at least one instance", self.name())));
        }
        if u32::try_from(self.instance_count()).is_err() {
            return Err(ConfigError::Invalid(format!(
                "{} instances do not fit a draw call",
                self.instance_count()
            )));
        }

        for record in self.records() {
            record.verify()?;
        }
        Ok(())
    }

    /// Every record the demo shares with its shaders, uniforms last.
    pub fn records(&self) -> Vec<RecordInfo> {
        let mut records = match self {
            Self::Automaton3d { .. } => vec![
                RecordInfo::of::<automaton3d::Cube>(),
                RecordInfo::of::<automaton3d::Simulation>(),
            ],
            Self::DlaKinetic { .. } => vec![
                RecordInfo::of::<dla::v1::Particle>(),
                RecordInfo::of::<dla::v1::ParticleSystem>(),
            ],
            Self::DlaSticky { .. } => vec![
                RecordInfo::of::<dla::v2::Particle>(),
                RecordInfo::of::<dla::v2::ParticleSystem>(),
            ],
            Self::Flocking { .. } => vec![
                RecordInfo::of::<flocking::v1::Particle>(),
                RecordInfo::of::<flocking::v1::ParticleSystem>(),
            ],
            Self::FlockingBinned { .. } => vec![
                RecordInfo::of::<flocking::v2::Particle>(),
                RecordInfo::of::<flocking::v2::ParticleSystem>(),
                RecordInfo::of::<flocking::Grid>(),
            ],
        };

        records.push(RecordInfo::of::<Uniforms>());
        if self.projection().is_some() {
            records.push(RecordInfo::of::<ProjectionParameters>());
        }
        records
    }

    /// Instance attributes for the record the demo draws, placed after the
    /// attributes of its mesh.
    pub fn instance_layout(&self) -> InstanceLayout {
        let first = QuadVertex::NEXT_LOCATION;
        match self {
            Self::Automaton3d { .. } => {
                InstanceLayout::of::<automaton3d::Cube>(CubeVertex::NEXT_LOCATION)
            }
            Self::DlaKinetic { .. } => InstanceLayout::of::<dla::v1::Particle>(first),
            Self::DlaSticky { .. } => InstanceLayout::of::<dla::v2::Particle>(first),
            Self::Flocking { .. } => InstanceLayout::of::<flocking::v1::Particle>(first),
            Self::FlockingBinned { .. } => InstanceLayout::of::<flocking::v2::Particle>(first),
        }
    }

    /// WGSL struct declarations for every record of the demo, ready to be
    /// prepended to its shader source.
    pub fn wgsl_prelude(&self) -> String {
        let structs: Vec<&str> = self.records().iter().map(|r| r.wgsl).collect();
        let mut prelude = structs.join("\n\n");
        prelude.push('\n');
        prelude
    }
}
