//! Value conventions for data the accelerator keeps in float slots.
//!
//! Two kinds of host values travel in `f32` fields:
//!
//! - **Flags** (`alive`, `stuck`): `true` is written as `1.0`, `false` as
//!   `0.0`. Shaders compare against these numbers directly, so nothing else
//!   is ever written from the host side.
//! - **Indices** (`grid_id`): an integer cell id stored as a float. Every
//!   integer up to 2^24 has an exact `f32` representation.
//!
//! Derived records call these functions from `to_gpu` / `from_gpu`; they
//! are public for code that patches raw buffers.

use crate::error::LayoutError;

/// Largest index that survives a round trip through an `f32` unchanged.
pub const MAX_EXACT_INDEX: u32 = 1 << 24;

/// Encode a flag as `1.0` or `0.0`.
pub const fn encode_flag(value: bool) -> f32 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Decode a flag written by either side.
///
/// Anything at or above `0.5` reads as set. `NaN` reads as unset.
pub fn decode_flag(value: f32) -> bool {
    value >= 0.5
}

/// Encode an integer index into a float slot.
///
/// Indices above [`MAX_EXACT_INDEX`] are rounded to the nearest
/// representable float; use [`try_encode_index`] to reject them instead.
pub fn encode_index(index: u32) -> f32 {
    if index > MAX_EXACT_INDEX {
        log::warn!("index {} is not exactly representable as f32", index);
    }
    index as f32
}

/// Encode an integer index, failing if it would lose precision.
pub fn try_encode_index(index: u32) -> Result<f32, LayoutError> {
    if index > MAX_EXACT_INDEX {
        return Err(LayoutError::IndexNotExact(index));
    }
    Ok(index as f32)
}

/// Decode a float slot back to an index.
///
/// Rounds to the nearest integer. Negative values and `NaN` give 0,
/// values past `u32::MAX` saturate.
pub fn decode_index(value: f32) -> u32 {
    value.round() as u32
}

/// Decode a float slot, rejecting anything that is not an exact index.
pub fn try_decode_index(value: f32) -> Result<u32, LayoutError> {
    let exact = value.is_finite()
        && value >= 0.0
        && value.fract() == 0.0
        && value <= MAX_EXACT_INDEX as f32;
    if !exact {
        return Err(LayoutError::NotAnIndex(value));
    }
    Ok(value as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_encode_to_zero_or_one() {
        assert_eq!(encode_flag(true), 1.0);
        assert_eq!(encode_flag(false), 0.0);
    }

    #[test]
    fn test_any_gpu_value_reencodes_to_zero_or_one() {
        for value in [-3.0, -0.0, 0.0, 0.25, 0.5, 0.75, 1.0, 7.5, f32::NAN, f32::INFINITY] {
            let reencoded = encode_flag(decode_flag(value));
            assert!(reencoded == 0.0 || reencoded == 1.0, "{} -> {}", value, reencoded);
        }
        assert!(!decode_flag(f32::NAN));
        assert!(decode_flag(0.5));
        assert!(!decode_flag(0.49));
    }

    #[test]
    fn test_index_round_trip_is_exact_up_to_limit() {
        for index in [0, 1, 2, 149_999, 150_000, MAX_EXACT_INDEX - 1, MAX_EXACT_INDEX] {
            let encoded = try_encode_index(index).unwrap();
            assert_eq!(try_decode_index(encoded).unwrap(), index);
            assert_eq!(decode_index(encode_index(index)), index);
        }
    }

    #[test]
    fn test_index_past_limit_is_rejected() {
        assert!(matches!(
            try_encode_index(MAX_EXACT_INDEX + 1),
            Err(LayoutError::IndexNotExact(_))
        ));
    }

    #[test]
    fn test_decode_rejects_non_indices() {
        for value in [-1.0, 0.5, f32::NAN, f32::INFINITY, 1.0e9] {
            assert!(matches!(try_decode_index(value), Err(LayoutError::NotAnIndex(_))));
        }
    }

    #[test]
    fn test_lenient_decode_rounds_and_clamps() {
        assert_eq!(decode_index(41.6), 42);
        assert_eq!(decode_index(-5.0), 0);
        assert_eq!(decode_index(f32::NAN), 0);
    }
}
