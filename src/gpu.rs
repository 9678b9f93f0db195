//! `wgpu` buffers holding records.
//!
//! The caller owns the device and queue; these helpers only turn records
//! into buffers with the right size, usage and contents.

use wgpu::util::DeviceExt;

use crate::buffer;
use crate::frame::FrameRing;
use crate::mesh::{CUBE_INDICES, CUBE_VERTICES, QUAD_VERTICES};
use crate::GpuRecord;

/// Usage for particle and cell buffers: written by compute, read as
/// instances, copied back for inspection.
pub const RECORD_USAGE: wgpu::BufferUsages = wgpu::BufferUsages::STORAGE
    .union(wgpu::BufferUsages::VERTEX)
    .union(wgpu::BufferUsages::COPY_SRC)
    .union(wgpu::BufferUsages::COPY_DST);

/// Size of a uniform block for `R`, rounded up to 16 bytes.
pub fn uniform_size<R: GpuRecord>() -> wgpu::BufferAddress {
    ((R::stride() as wgpu::BufferAddress) + 15) & !15
}

/// Minimum binding size for a buffer holding at least one `R`.
pub fn binding_size<R: GpuRecord>() -> Option<wgpu::BufferSize> {
    wgpu::BufferSize::new(R::stride() as u64)
}

/// Buffer holding `records` back to back.
pub fn create_record_buffer<R: GpuRecord>(
    device: &wgpu::Device,
    label: &str,
    records: &[R],
    usage: wgpu::BufferUsages,
) -> wgpu::Buffer {
    let contents = buffer::encode_slice(records);
    log::debug!(
        "Creating {} buffer '{}': {} records, {} bytes",
        R::WGSL_NAME,
        label,
        records.len(),
        contents.len()
    );
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: &contents,
        usage,
    })
}

/// Uniform buffer for a single record, updatable with [`write_record`].
pub fn create_uniform_buffer<R: GpuRecord>(
    device: &wgpu::Device,
    label: &str,
    record: &R,
) -> wgpu::Buffer {
    let mut contents = buffer::encode(record);
    contents.resize(uniform_size::<R>() as usize, 0);
    log::debug!("Creating {} uniform buffer '{}': {} bytes", R::WGSL_NAME, label, contents.len());
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: &contents,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

/// Overwrite the start of `buffer` with one record.
pub fn write_record<R: GpuRecord>(queue: &wgpu::Queue, buffer: &wgpu::Buffer, record: &R) {
    queue.write_buffer(buffer, 0, &buffer::encode(record));
}

/// Overwrite `records` into `buffer` starting at record `first`.
pub fn write_records<R: GpuRecord>(
    queue: &wgpu::Queue,
    buffer: &wgpu::Buffer,
    first: usize,
    records: &[R],
) {
    let offset = buffer::byte_len::<R>(first) as wgpu::BufferAddress;
    queue.write_buffer(buffer, offset, &buffer::encode_slice(records));
}

/// Vertex buffer for the particle quad, drawn as a 4-vertex triangle strip.
pub fn create_quad_mesh(device: &wgpu::Device) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Quad Vertex Buffer"),
        contents: bytemuck::cast_slice(&QUAD_VERTICES),
        usage: wgpu::BufferUsages::VERTEX,
    })
}

/// Vertex and index buffers for the unit cube.
pub fn create_cube_mesh(device: &wgpu::Device) -> (wgpu::Buffer, wgpu::Buffer) {
    let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Cube Vertex Buffer"),
        contents: bytemuck::cast_slice(&CUBE_VERTICES),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Cube Index Buffer"),
        contents: bytemuck::cast_slice(&CUBE_INDICES),
        usage: wgpu::BufferUsages::INDEX,
    });
    (vertices, indices)
}

/// Rotating set of identical record buffers.
///
/// Compute reads [`current`](Self::current) and writes [`next`](Self::next);
/// after [`advance`](Self::advance) the freshly written buffer is current
/// and is the one to draw.
pub struct RecordRing {
    ring: FrameRing<wgpu::Buffer>,
    count: usize,
}

impl RecordRing {
    /// `slots` buffers, each starting with a copy of `records`.
    ///
    /// Returns `None` when `slots` is zero.
    pub fn new<R: GpuRecord>(
        device: &wgpu::Device,
        label: &str,
        records: &[R],
        slots: usize,
    ) -> Option<Self> {
        let ring = FrameRing::from_fn(slots, |i| {
            create_record_buffer(device, &format!("{} {}", label, i), records, RECORD_USAGE)
        })?;
        Some(Self {
            ring,
            count: records.len(),
        })
    }

    /// Records per buffer.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn slots(&self) -> usize {
        self.ring.len()
    }

    pub fn current(&self) -> &wgpu::Buffer {
        self.ring.current()
    }

    pub fn next(&self) -> &wgpu::Buffer {
        self.ring.next()
    }

    pub fn advance(&mut self) -> (usize, usize) {
        self.ring.advance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton3d::Simulation;
    use crate::{ProjectionParameters, Uniforms};

    #[test]
    fn test_uniform_sizes_round_to_sixteen() {
        assert_eq!(uniform_size::<ProjectionParameters>(), 32);
        assert_eq!(uniform_size::<Uniforms>(), 192);
        assert_eq!(uniform_size::<Simulation>(), 16);
    }

    #[test]
    fn test_binding_size_is_one_record() {
        assert_eq!(binding_size::<Uniforms>().map(|s| s.get()), Some(192));
    }

    #[test]
    fn test_record_usage() {
        assert!(RECORD_USAGE.contains(wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::VERTEX));
        assert!(!RECORD_USAGE.contains(wgpu::BufferUsages::UNIFORM));
    }
}
