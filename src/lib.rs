//! # shader-types
//!
//! Byte-exact records shared between host code and GPU shaders for a set of
//! small simulation demos: a 3D cellular automaton, two diffusion-limited
//! aggregation variants and two flocking variants.
//!
//! Every record is written once as a plain Rust struct with semantic types
//! and derives its GPU twin:
//!
//! ```ignore
//! use shader_types::prelude::*;
//!
//! #[derive(GpuRecord, Clone, Copy)]
//! struct Cube {
//!     color: Vec4,
//!     center: Vec3,
//!     alive: bool,
//!     size: f32,
//! }
//!
//! let bytes = shader_types::buffer::encode_slice(&cubes);
//! let wgsl = Cube::WGSL_STRUCT;
//! ```
//!
//! ## Layout contract
//!
//! Shaders read these records by offset, not by name. Field order is
//! declaration order, three-component vectors occupy 16 bytes, and all
//! padding is explicit on both sides. [`layout::verify`] checks a record
//! against the rules at run time; the derive checks the total size at
//! compile time.
//!
//! | Demo | Module | Records |
//! |------|--------|---------|
//! | 3D cellular automaton | [`automaton3d`] | `Cube`, `Simulation` |
//! | DLA with dynamics | [`dla::v1`] | `Particle`, `ParticleSystem` |
//! | DLA with stuck flag | [`dla::v2`] | `Particle`, `ParticleSystem` |
//! | Flocking | [`flocking::v1`] | `Particle`, `ParticleSystem` |
//! | Flocking with binning | [`flocking::v2`] | `Particle`, `ParticleSystem`, [`flocking::Grid`] |
//! | All | [`uniforms`] | `Uniforms`, `ProjectionParameters` |
//!
//! Record names repeat across demos on purpose: each demo is its own
//! contract and nothing is shared between them except the uniforms.

extern crate self as shader_types;

pub mod automaton3d;
pub mod buffer;
pub mod config;
pub mod dla;
pub mod encoding;
mod error;
pub mod flocking;
pub mod frame;
pub mod gpu;
pub mod layout;
pub mod mesh;
pub mod projection;
pub mod uniforms;
pub mod vertex;

pub use bytemuck;
pub use config::DemoConfig;
pub use error::{ConfigError, LayoutError};
pub use glam;
pub use glam::{Mat4, Vec2, Vec3, Vec4};
pub use layout::{FieldKind, FieldLayout, RecordLayout};
pub use shader_types_derive::GpuRecord;
pub use uniforms::{ProjectionParameters, Uniforms};

/// Trait implemented by `#[derive(GpuRecord)]`.
///
/// Bridges a host struct to the byte layout the shaders read. The derive
/// generates:
/// - A companion `{Name}Gpu` struct with explicit padding
/// - A WGSL struct declaration with the same layout
/// - A field table with byte offsets
/// - Conversions in both directions
///
/// Hand-written implementations are fine for records the derive cannot
/// express (see [`flocking::Grid`]), as long as [`layout::verify`] passes.
pub trait GpuRecord: Clone + Send + Sync {
    /// Byte-exact representation uploaded to the GPU.
    type Gpu: Copy + Clone + bytemuck::Pod + bytemuck::Zeroable + Send + Sync;

    /// Struct name used in the WGSL declaration.
    const WGSL_NAME: &'static str;

    /// WGSL struct declaration matching [`Self::Gpu`] byte for byte.
    const WGSL_STRUCT: &'static str;

    /// Named fields in memory order, padding excluded.
    const FIELDS: &'static [FieldLayout];

    /// Largest field alignment; the record size is a multiple of it.
    const ALIGN: u32;

    /// Convert this record to its GPU representation.
    fn to_gpu(&self) -> Self::Gpu;

    /// Convert from the GPU representation, e.g. after a readback.
    fn from_gpu(gpu: &Self::Gpu) -> Self;

    /// Field names and formatted values, for logging and the CLI.
    fn inspect_fields(&self) -> Vec<(&'static str, String)>;

    /// Append the GPU bytes of `records` to `out`.
    ///
    /// Large records override this to copy straight from `self` instead
    /// of building a temporary [`Self::Gpu`].
    fn encode_records(records: &[Self], out: &mut Vec<u8>)
    where
        Self: Sized,
    {
        out.reserve(records.len() * std::mem::size_of::<Self::Gpu>());
        for record in records {
            out.extend_from_slice(bytemuck::bytes_of(&record.to_gpu()));
        }
    }

    /// Convert decoded GPU records into host records.
    fn from_gpu_records(gpu: Vec<Self::Gpu>) -> Vec<Self>
    where
        Self: Sized,
    {
        gpu.iter().map(Self::from_gpu).collect()
    }

    /// Size of one record in bytes.
    fn stride() -> u32
    where
        Self: Sized,
    {
        std::mem::size_of::<Self::Gpu>() as u32
    }

    /// Look up a field by name.
    fn field(name: &str) -> Option<&'static FieldLayout>
    where
        Self: Sized,
    {
        Self::FIELDS.iter().find(|f| f.name == name)
    }
}

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use shader_types::prelude::*;
/// ```
pub mod prelude {
    pub use crate::encoding::{decode_flag, encode_flag};
    pub use crate::flocking::{Grid, GridDims, GRID_CAPACITY};
    pub use crate::frame::FrameRing;
    pub use crate::layout::{FieldKind, FieldLayout};
    pub use crate::vertex::InstanceLayout;
    pub use crate::GpuRecord;
    pub use crate::{ProjectionParameters, Uniforms};
    pub use crate::{Mat4, Vec2, Vec3, Vec4};
}
