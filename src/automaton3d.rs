//! 3D cellular automaton.
//!
//! Cell state lives in two `u8` volumes the compute pass ping-pongs
//! between. Every cell also owns a [`Cube`] instance that the compute pass
//! fills (color, center, alive flag, size) and the render pass draws with
//! the cube mesh.

use glam::{Vec3, Vec4};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::frame::workgroups_3d;
use crate::projection;
use crate::{GpuRecord, Uniforms};

/// Threads per workgroup on each axis of the step kernel.
pub const WORKGROUP_SIZE: [u32; 3] = [8, 8, 8];

/// One drawable cell.
#[derive(GpuRecord, Clone, Copy, Debug, Default, PartialEq)]
pub struct Cube {
    pub color: Vec4,
    pub center: Vec3,
    pub alive: bool,
    pub size: f32,
}

/// Simulation-wide parameters for the step kernel.
#[derive(GpuRecord, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Simulation {
    pub position: Vec4,
}

impl Default for Simulation {
    fn default() -> Self {
        Self { position: Vec4::new(0.0, 0.0, 0.0, 1.0) }
    }
}

/// Extent of the cell volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeDims {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl Default for VolumeDims {
    fn default() -> Self {
        Self::new(128, 128, 128)
    }
}

impl VolumeDims {
    pub const fn new(width: u32, height: u32, depth: u32) -> Self {
        Self { width, height, depth }
    }

    /// Number of cells, saturating at `usize::MAX`.
    pub const fn cell_count(&self) -> usize {
        match self.checked_cell_count() {
            Some(count) => count,
            None => usize::MAX,
        }
    }

    /// Number of cells, or `None` when the product overflows.
    pub const fn checked_cell_count(&self) -> Option<usize> {
        match (self.width as usize).checked_mul(self.height as usize) {
            Some(area) => area.checked_mul(self.depth as usize),
            None => None,
        }
    }

    /// Linear cell index, x fastest then y then z.
    pub const fn index(&self, x: u32, y: u32, z: u32) -> usize {
        let (w, h) = (self.width as usize, self.height as usize);
        z as usize * w * h + y as usize * w + x as usize
    }

    /// Initial state volume: random 0/1 cells in the centred block whose
    /// half-extent is a quarter of each dimension, zero everywhere else.
    pub fn seed_core<R: Rng>(&self, rng: &mut R) -> Vec<u8> {
        let mut cells = vec![0u8; self.cell_count()];
        let [cx, cy, cz] = [self.width / 2, self.height / 2, self.depth / 2];
        let [hx, hy, hz] = [self.width / 4, self.height / 4, self.depth / 4];

        for z in (cz - hz)..(cz + hz) {
            for y in (cy - hy)..(cy + hy) {
                for x in (cx - hx)..(cx + hx) {
                    cells[self.index(x, y, z)] = rng.gen_range(0..=1);
                }
            }
        }

        log::debug!(
            "Seeded {}x{}x{} volume, {} live cells",
            self.width,
            self.height,
            self.depth,
            cells.iter().filter(|c| **c != 0).count()
        );
        cells
    }

    /// Zeroed cube instances, one per cell; the step kernel fills them.
    pub fn cube_buffer(&self) -> Vec<CubeGpu> {
        vec![bytemuck::Zeroable::zeroed(); self.cell_count()]
    }

    /// Workgroups for one step over the whole volume.
    pub const fn workgroups(&self) -> [u32; 3] {
        workgroups_3d([self.width, self.height, self.depth], WORKGROUP_SIZE)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 || self.depth == 0 {
            return Err(ConfigError::Invalid(format!("volume has a zero extent: {:?}", self)));
        }
        let fits = match self.checked_cell_count() {
            Some(count) => u32::try_from(count).is_ok(),
            None => false,
        };
        if !fits {
            return Err(ConfigError::Invalid(format!("volume too large to index: {:?}", self)));
        }
        Ok(())
    }
}

/// Frame clock driving rotation and stepping.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AutomatonClock {
    time: f32,
    frame: u64,
}

impl AutomatonClock {
    /// Seconds of rotation added per frame.
    pub const TIME_STEP: f32 = 0.01;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Move to the next frame. Returns whether this frame runs a step;
    /// the automaton steps every other frame so it evolves at half the
    /// display rate.
    ///
    /// Call before building the frame's uniforms, so the first frame drawn
    /// is already rotated by one time step.
    pub fn advance(&mut self) -> bool {
        let step = self.frame % 2 == 0;
        self.time += Self::TIME_STEP;
        self.frame += 1;
        step
    }

    /// Camera for the current time: the volume spins about Y at twice its
    /// unit size, 2.5 units in front of the eye.
    pub fn uniforms(&self, aspect: f32) -> Uniforms {
        let model = projection::rotation_about(Vec3::Y, self.time) * projection::scale(Vec3::splat(2.0));
        let view = projection::translation(Vec3::new(0.0, 0.0, -2.5));
        let proj = projection::perspective_gl(60.0_f32.to_radians(), aspect, 0.1, 5.0);
        Uniforms::new(model, view, proj)
    }
}

/// Cube instance for a live cell at `(x, y, z)`, placed in a unit volume
/// centred on the origin.
///
/// Same placement the step kernel uses when it writes instances.
pub fn cube_at(dims: &VolumeDims, x: u32, y: u32, z: u32, alive: bool) -> Cube {
    let extent = Vec3::new(dims.width as f32, dims.height as f32, dims.depth as f32);
    let cell = Vec3::new(x as f32, y as f32, z as f32);
    let center = (cell + 0.5) / extent - 0.5;
    let color = (cell / extent).extend(1.0);

    Cube {
        color,
        center,
        alive,
        size: 1.0 / extent.max_element(),
    }
}
