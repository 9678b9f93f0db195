//! Error types for shader-types.
//!
//! This module provides error types for layout verification, buffer
//! decoding and configuration loading.

use std::fmt;

/// Errors raised when a record layout or a record buffer does not match
/// what the accelerator side expects.
#[derive(Debug, Clone)]
pub enum LayoutError {
    /// Byte buffer is not a whole number of records.
    BufferLength { len: usize, stride: usize },
    /// Field offset does not satisfy the field's alignment.
    Misaligned {
        record: &'static str,
        field: &'static str,
        offset: u32,
        align: u32,
    },
    /// Field starts before the previous field ends.
    Overlap {
        record: &'static str,
        field: &'static str,
    },
    /// Field sits at a different offset than the layout rules give.
    OffsetMismatch {
        record: &'static str,
        field: &'static str,
        expected: u32,
        actual: u32,
    },
    /// Record size differs from the layout rules.
    SizeMismatch {
        record: &'static str,
        expected: u32,
        actual: u32,
    },
    /// No field with this name in the record.
    UnknownField { record: &'static str, field: String },
    /// Field cannot be fed to a vertex attribute (matrices, arrays).
    NotVertexEncodable {
        record: &'static str,
        field: &'static str,
    },
    /// Index too large to be stored exactly in an `f32`.
    IndexNotExact(u32),
    /// Float slot does not hold an exact non-negative integer.
    NotAnIndex(f32),
    /// Grid dimensions are empty or exceed the histogram capacity.
    GridTooLarge { width: u32, height: u32 },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::BufferLength { len, stride } => write!(
                f,
                "Buffer of {} bytes is not a whole number of {}-byte records",
                len, stride
            ),
            LayoutError::Misaligned { record, field, offset, align } => write!(
                f,
                "{}.{} at offset {} is not {}-byte aligned",
                record, field, offset, align
            ),
            LayoutError::Overlap { record, field } => {
                write!(f, "{}.{} overlaps the previous field", record, field)
            }
            LayoutError::OffsetMismatch { record, field, expected, actual } => write!(
                f,
                "{}.{} is at offset {}, expected {}",
                record, field, actual, expected
            ),
            LayoutError::SizeMismatch { record, expected, actual } => write!(
                f,
                "{} is {} bytes, expected {}",
                record, actual, expected
            ),
            LayoutError::UnknownField { record, field } => {
                write!(f, "{} has no field named '{}'", record, field)
            }
            LayoutError::NotVertexEncodable { record, field } => write!(
                f,
                "{}.{} has no vertex format and cannot be bound as an attribute",
                record, field
            ),
            LayoutError::IndexNotExact(index) => {
                write!(f, "Index {} cannot be stored exactly in an f32", index)
            }
            LayoutError::NotAnIndex(value) => {
                write!(f, "{} is not a valid float-encoded index", value)
            }
            LayoutError::GridTooLarge { width, height } => write!(
                f,
                "Grid of {}x{} cells does not fit the histogram",
                width, height
            ),
        }
    }
}

impl std::error::Error for LayoutError {}

/// Errors that can occur when loading or validating a demo configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read or write the configuration file.
    Io(std::io::Error),
    /// Configuration is not valid JSON for the expected shape.
    Json(serde_json::Error),
    /// A parameter block does not fit its record layout.
    Layout(LayoutError),
    /// A parameter has a value the demo cannot run with.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to access config file: {}", e),
            ConfigError::Json(e) => write!(f, "Failed to parse config: {}", e),
            ConfigError::Layout(e) => write!(f, "Layout error: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Json(e) => Some(e),
            ConfigError::Layout(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

impl From<LayoutError> for ConfigError {
    fn from(e: LayoutError) -> Self {
        ConfigError::Layout(e)
    }
}
