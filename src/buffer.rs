//! Record slices to bytes and back.
//!
//! Uploads go through `to_gpu` and `bytemuck::bytes_of`. Readbacks come
//! from mapped buffers with no alignment guarantee, so decoding copies the
//! bytes into a zeroed, aligned heap buffer first. Nothing here holds a
//! record on the stack, which matters for the 600 KB [`Grid`].
//!
//! [`Grid`]: crate::flocking::Grid

use crate::error::LayoutError;
use crate::GpuRecord;

/// Number of bytes needed for `count` records.
pub fn byte_len<R: GpuRecord>(count: usize) -> usize {
    count * R::stride() as usize
}

/// Encode one record.
pub fn encode<R: GpuRecord>(record: &R) -> Vec<u8> {
    encode_slice(std::slice::from_ref(record))
}

/// Encode a slice of records into one contiguous buffer.
pub fn encode_slice<R: GpuRecord>(records: &[R]) -> Vec<u8> {
    let mut bytes = Vec::new();
    R::encode_records(records, &mut bytes);
    bytes
}

/// Decode raw GPU records from bytes of any alignment.
pub fn decode_gpu_slice<R: GpuRecord>(bytes: &[u8]) -> Result<Vec<R::Gpu>, LayoutError> {
    let stride = R::stride() as usize;
    if stride == 0 || bytes.len() % stride != 0 {
        return Err(LayoutError::BufferLength { len: bytes.len(), stride });
    }
    let mut gpu = bytemuck::zeroed_vec::<R::Gpu>(bytes.len() / stride);
    bytemuck::cast_slice_mut::<R::Gpu, u8>(&mut gpu).copy_from_slice(bytes);
    Ok(gpu)
}

/// Decode host records from bytes of any alignment.
pub fn decode_slice<R: GpuRecord>(bytes: &[u8]) -> Result<Vec<R>, LayoutError> {
    Ok(R::from_gpu_records(decode_gpu_slice::<R>(bytes)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dla::v2::Particle;
    use glam::{Vec2, Vec4};

    fn particles() -> Vec<Particle> {
        (0..4)
            .map(|i| Particle {
                color: Vec4::new(1.0, 0.5, 0.25, 1.0),
                center: Vec2::new(i as f32 * 0.1, -0.2),
                size: 0.01,
                age: i as f32,
                stuck: i == 0,
            })
            .collect()
    }

    #[test]
    fn test_encoded_length_is_count_times_stride() {
        let bytes = encode_slice(&particles());
        assert_eq!(bytes.len(), byte_len::<Particle>(4));
        assert_eq!(bytes.len(), 4 * 48);
    }

    #[test]
    fn test_stuck_flag_lands_at_offset_32() {
        let bytes = encode_slice(&particles());
        let stuck = |record: usize| {
            let at = record * 48 + 32;
            f32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
        };
        assert_eq!(stuck(0), 1.0);
        assert_eq!(stuck(1), 0.0);
    }

    #[test]
    fn test_decode_from_unaligned_readback() {
        let bytes = encode_slice(&particles());
        let mut shifted = vec![0u8; 1];
        shifted.extend_from_slice(&bytes);

        let decoded: Vec<Particle> = decode_slice(&shifted[1..]).unwrap();
        assert_eq!(decoded, particles());
    }

    #[test]
    fn test_decode_rejects_partial_record() {
        let bytes = encode_slice(&particles());
        let err = decode_slice::<Particle>(&bytes[..bytes.len() - 4]).unwrap_err();
        assert!(matches!(err, LayoutError::BufferLength { stride: 48, .. }));
    }
}
