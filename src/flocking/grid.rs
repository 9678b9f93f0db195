//! Fixed-capacity histogram used to bin flocking particles.

use std::fmt;

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use super::v2::Particle;
use crate::error::LayoutError;
use crate::layout::{FieldKind, FieldLayout};
use crate::{GpuRecord, ProjectionParameters};

/// Number of buckets in a [`Grid`].
pub const GRID_CAPACITY: usize = 150_000;

/// Width and height of the binning grid, in cells.
///
/// Always non-empty and never larger than [`GRID_CAPACITY`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridDims {
    width: u32,
    height: u32,
}

impl GridDims {
    pub fn new(width: u32, height: u32) -> Result<Self, LayoutError> {
        let cells = width as u64 * height as u64;
        if cells == 0 || cells > GRID_CAPACITY as u64 {
            return Err(LayoutError::GridTooLarge { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Row-major cell id of `(x, y)`.
    pub fn cell_index(&self, x: u32, y: u32) -> u32 {
        y * self.width + x
    }

    /// Cell containing `center`. Points outside `bounds` land in the
    /// nearest edge cell.
    pub fn cell_of(&self, center: Vec2, bounds: &ProjectionParameters) -> u32 {
        let n = bounds.normalize(center);
        let x = axis_cell(n.x, self.width);
        let y = axis_cell(n.y, self.height);
        self.cell_index(x, y)
    }
}

fn axis_cell(normalized: f32, cells: u32) -> u32 {
    // NaN casts to 0
    let cell = (normalized * cells as f32).floor() as u32;
    cell.min(cells - 1)
}

/// Per-cell particle counts, shared with the binning kernel.
///
/// The buffer is always [`GRID_CAPACITY`] buckets long; only the first
/// `width * height` are in use for a given [`GridDims`].
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct Grid {
    pub bins: [u32; GRID_CAPACITY],
}

impl Grid {
    /// Zeroed grid allocated directly on the heap.
    pub fn new_boxed() -> Box<Self> {
        bytemuck::zeroed_box()
    }

    /// Copy a readback of exactly one grid into a new heap grid.
    pub fn from_bytes(bytes: &[u8]) -> Result<Box<Self>, LayoutError> {
        let stride = std::mem::size_of::<Self>();
        if bytes.len() != stride {
            return Err(LayoutError::BufferLength { len: bytes.len(), stride });
        }
        let mut grid = Self::new_boxed();
        bytemuck::bytes_of_mut(&mut *grid).copy_from_slice(bytes);
        Ok(grid)
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    pub fn clear(&mut self) {
        self.bins.fill(0);
    }

    /// Count in `cell`, or 0 past the end of the grid.
    pub fn count(&self, cell: u32) -> u32 {
        self.bins.get(cell as usize).copied().unwrap_or(0)
    }

    /// Add one to `cell` and return the new count, or `None` past the end
    /// of the grid.
    pub fn increment(&mut self, cell: u32) -> Option<u32> {
        let bin = self.bins.get_mut(cell as usize)?;
        *bin += 1;
        Some(*bin)
    }

    /// Assign every particle its cell and rebuild the counts from scratch.
    pub fn bin(&mut self, particles: &mut [Particle], dims: GridDims, bounds: &ProjectionParameters) {
        self.clear();
        for particle in particles.iter_mut() {
            let cell = dims.cell_of(particle.center, bounds);
            particle.grid_id = cell;
            self.bins[cell as usize] += 1;
        }
        log::trace!(
            "Binned {} particles into {}x{} cells",
            particles.len(),
            dims.width,
            dims.height
        );
    }

    /// Start offset of each cell in a cell-sorted particle array, plus the
    /// total as a final entry.
    pub fn prefix_offsets(&self, dims: GridDims) -> Vec<u32> {
        let mut offsets = Vec::with_capacity(dims.cell_count() + 1);
        let mut running = 0u32;
        offsets.push(0);
        for count in &self.bins[..dims.cell_count()] {
            running += count;
            offsets.push(running);
        }
        offsets
    }

    /// Sum of the counts over the cells in use.
    pub fn total(&self, dims: GridDims) -> u32 {
        self.bins[..dims.cell_count()].iter().sum()
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let occupied = self.bins.iter().filter(|b| **b != 0).count();
        f.debug_struct("Grid")
            .field("capacity", &GRID_CAPACITY)
            .field("occupied", &occupied)
            .finish()
    }
}

impl PartialEq for Grid {
    fn eq(&self, other: &Self) -> bool {
        self.bins[..] == other.bins[..]
    }
}

/// Written by hand: the derive has no array field kind.
impl GpuRecord for Grid {
    type Gpu = Grid;

    const WGSL_NAME: &'static str = "Grid";
    const WGSL_STRUCT: &'static str = "struct Grid {\n    bins: array<u32, 150000>,\n}";
    const FIELDS: &'static [FieldLayout] = &[FieldLayout {
        name: "bins",
        offset: 0,
        kind: FieldKind::UintArray(GRID_CAPACITY as u32),
    }];
    const ALIGN: u32 = 4;

    fn to_gpu(&self) -> Self::Gpu {
        *self
    }

    fn from_gpu(gpu: &Self::Gpu) -> Self {
        *gpu
    }

    fn encode_records(records: &[Self], out: &mut Vec<u8>) {
        out.extend_from_slice(bytemuck::cast_slice(records));
    }

    fn from_gpu_records(gpu: Vec<Self::Gpu>) -> Vec<Self> {
        gpu
    }

    fn inspect_fields(&self) -> Vec<(&'static str, String)> {
        let occupied = self.bins.iter().filter(|b| **b != 0).count();
        let total: u64 = self.bins.iter().map(|b| *b as u64).sum();
        vec![("bins", format!("{} occupied, {} total", occupied, total))]
    }
}
