//! Flocking.
//!
//! [`v1`] is plain boids: every particle scans every other particle for
//! neighbours. [`v2`] bins particles into a uniform grid first, recording
//! each particle's cell in `grid_id` and per-cell counts in [`Grid`], so a
//! neighbour search only visits nearby cells.

mod grid;
pub mod v1;
pub mod v2;

pub use grid::{Grid, GridDims, GRID_CAPACITY};

/// Threads per workgroup of the flocking kernels.
pub const WORKGROUP_SIZE: u32 = 32;
