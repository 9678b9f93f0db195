//! Diffusion-limited aggregation.
//!
//! Two generations of the same demo. [`v1`] carries full particle dynamics
//! (velocity, force, flocking-style weights and gravity); [`v2`] drops them
//! in favour of a random walk and a `stuck` flag that turns wandering
//! particles into part of the aggregate.

pub mod v1;
pub mod v2;

/// Threads per workgroup of the particle update kernel.
pub const WORKGROUP_SIZE: u32 = 32;
