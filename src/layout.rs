//! Field kinds, offset tables and layout verification.
//!
//! The derive macro computes offsets at compile time. [`RecordLayout`]
//! recomputes them at run time from nothing but the field kinds, and
//! [`verify`] checks a record's derived constants against that independent
//! computation.

use std::borrow::Cow;

use crate::error::LayoutError;
use crate::GpuRecord;

/// Kind of a field as seen by the accelerator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// 32-bit float
    Float,
    /// 32-bit unsigned integer
    Uint,
    /// 32-bit signed integer
    Sint,
    /// Boolean stored as 0.0 / 1.0 in a float slot
    Flag,
    /// Integer id stored in a float slot
    Index,
    /// `simd_float2` / `vec2<f32>`
    Float2,
    /// `simd_float3` / `vec3<f32>`, followed by 4 bytes of padding
    Float3,
    /// `simd_float4` / `vec4<f32>`
    Float4,
    /// `simd_float4x4` / `mat4x4<f32>`, column major
    Float4x4,
    /// Fixed-length array of `u32`
    UintArray(u32),
}

impl FieldKind {
    /// Size in bytes, not counting the trailing pad of a `Float3`.
    pub const fn size(&self) -> u32 {
        match self {
            FieldKind::Float
            | FieldKind::Uint
            | FieldKind::Sint
            | FieldKind::Flag
            | FieldKind::Index => 4,
            FieldKind::Float2 => 8,
            FieldKind::Float3 => 12,
            FieldKind::Float4 => 16,
            FieldKind::Float4x4 => 64,
            FieldKind::UintArray(len) => 4 * *len,
        }
    }

    /// Required alignment in bytes.
    pub const fn align(&self) -> u32 {
        match self {
            FieldKind::Float2 => 8,
            FieldKind::Float3 | FieldKind::Float4 | FieldKind::Float4x4 => 16,
            _ => 4,
        }
    }

    /// Padding that always follows the field.
    pub const fn tail_padding(&self) -> u32 {
        match self {
            FieldKind::Float3 => 4,
            _ => 0,
        }
    }

    /// Bytes the field occupies including its own trailing pad.
    pub const fn footprint(&self) -> u32 {
        self.size() + self.tail_padding()
    }

    /// WGSL type name.
    pub fn wgsl_type(&self) -> Cow<'static, str> {
        match self {
            FieldKind::Float | FieldKind::Flag | FieldKind::Index => Cow::Borrowed("f32"),
            FieldKind::Uint => Cow::Borrowed("u32"),
            FieldKind::Sint => Cow::Borrowed("i32"),
            FieldKind::Float2 => Cow::Borrowed("vec2<f32>"),
            FieldKind::Float3 => Cow::Borrowed("vec3<f32>"),
            FieldKind::Float4 => Cow::Borrowed("vec4<f32>"),
            FieldKind::Float4x4 => Cow::Borrowed("mat4x4<f32>"),
            FieldKind::UintArray(len) => Cow::Owned(format!("array<u32, {}>", len)),
        }
    }

    /// Vertex format used when the field is bound as an instance attribute.
    ///
    /// Matrices and arrays have none.
    pub fn vertex_format(&self) -> Option<wgpu::VertexFormat> {
        match self {
            FieldKind::Float | FieldKind::Flag | FieldKind::Index => Some(wgpu::VertexFormat::Float32),
            FieldKind::Uint => Some(wgpu::VertexFormat::Uint32),
            FieldKind::Sint => Some(wgpu::VertexFormat::Sint32),
            FieldKind::Float2 => Some(wgpu::VertexFormat::Float32x2),
            FieldKind::Float3 => Some(wgpu::VertexFormat::Float32x3),
            FieldKind::Float4 => Some(wgpu::VertexFormat::Float32x4),
            FieldKind::Float4x4 | FieldKind::UintArray(_) => None,
        }
    }
}

/// One named field of a record and where it lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldLayout {
    pub name: &'static str,
    /// Byte offset from the start of the record.
    pub offset: u32,
    pub kind: FieldKind,
}

impl FieldLayout {
    /// First byte after the field, including its own trailing pad.
    pub const fn end(&self) -> u32 {
        self.offset + self.kind.footprint()
    }
}

/// A field placed by [`RecordLayout::compute`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedField {
    pub name: String,
    pub kind: FieldKind,
    pub offset: u32,
}

/// A padding run inserted by [`RecordLayout::compute`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaddingRun {
    pub offset: u32,
    pub bytes: u32,
}

/// Record layout computed from field kinds alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordLayout {
    /// Fields in memory order.
    pub fields: Vec<PlacedField>,
    /// Explicit padding runs in memory order.
    pub padding: Vec<PaddingRun>,
    /// Total size of one record in bytes.
    pub stride: u32,
    /// Largest field alignment.
    pub align: u32,
}

impl RecordLayout {
    /// Lay out fields in declaration order.
    pub fn compute<'a>(fields: impl IntoIterator<Item = (&'a str, FieldKind)>) -> Self {
        let mut placed = Vec::new();
        let mut padding = Vec::new();
        let mut offset = 0u32;
        let mut align = 4u32;

        for (name, kind) in fields {
            align = align.max(kind.align());

            let aligned = offset.div_ceil(kind.align()) * kind.align();
            if aligned > offset {
                padding.push(PaddingRun { offset, bytes: aligned - offset });
            }
            offset = aligned;

            placed.push(PlacedField {
                name: name.to_string(),
                kind,
                offset,
            });
            offset += kind.size();

            if kind.tail_padding() > 0 {
                padding.push(PaddingRun { offset, bytes: kind.tail_padding() });
                offset += kind.tail_padding();
            }
        }

        let stride = offset.div_ceil(align) * align;
        if stride > offset {
            padding.push(PaddingRun { offset, bytes: stride - offset });
        }

        Self {
            fields: placed,
            padding,
            stride,
            align,
        }
    }

    /// Recompute the layout of a derived record from its field table.
    pub fn of<R: GpuRecord>() -> Self {
        Self::compute(R::FIELDS.iter().map(|f| (f.name, f.kind)))
    }

    /// Get the offset of a field by name.
    pub fn field_offset(&self, name: &str) -> Option<u32> {
        self.fields.iter().find(|f| f.name == name).map(|f| f.offset)
    }

    /// Total bytes spent on padding.
    pub fn padding_bytes(&self) -> u32 {
        self.padding.iter().map(|p| p.bytes).sum()
    }

    /// Generate the WGSL struct definition, padding included.
    ///
    /// Produces the same text as the derive macro's `WGSL_STRUCT`.
    pub fn to_wgsl_struct(&self, name: &str) -> String {
        let mut lines = Vec::new();
        let mut pads = self.padding.iter().peekable();
        let mut pad_index = 0;

        let mut push_pads_before = |limit: u32, lines: &mut Vec<String>| {
            while let Some(pad) = pads.next_if(|p| p.offset < limit) {
                lines.push(padding_line(pad_index, pad.bytes));
                pad_index += 1;
            }
        };

        for field in &self.fields {
            push_pads_before(field.offset, &mut lines);
            lines.push(format!("    {}: {},", field.name, field.kind.wgsl_type()));
        }
        push_pads_before(u32::MAX, &mut lines);

        format!("struct {} {{\n{}\n}}", name, lines.join("\n"))
    }
}

fn padding_line(index: u32, bytes: u32) -> String {
    if bytes == 4 {
        format!("    _pad{}: f32,", index)
    } else {
        format!("    _pad{}: array<f32, {}>,", index, bytes / 4)
    }
}

/// Check a record's derived layout against the layout rules.
///
/// Verifies that every field is aligned, that fields follow each other
/// without overlap, that offsets and size agree with
/// [`RecordLayout::compute`], and that the `Gpu` type has that size.
pub fn verify<R: GpuRecord>() -> Result<(), LayoutError> {
    let record = R::WGSL_NAME;
    let stride = R::stride();
    let expected = RecordLayout::of::<R>();
    let mut previous_end = 0u32;

    for (field, placed) in R::FIELDS.iter().zip(&expected.fields) {
        let align = field.kind.align();
        if field.offset % align != 0 {
            return Err(LayoutError::Misaligned {
                record,
                field: field.name,
                offset: field.offset,
                align,
            });
        }
        if field.offset < previous_end {
            return Err(LayoutError::Overlap { record, field: field.name });
        }
        if field.offset != placed.offset {
            return Err(LayoutError::OffsetMismatch {
                record,
                field: field.name,
                expected: placed.offset,
                actual: field.offset,
            });
        }
        previous_end = field.end();
    }

    if stride != expected.stride || previous_end > stride || R::ALIGN != expected.align {
        return Err(LayoutError::SizeMismatch {
            record,
            expected: expected.stride,
            actual: stride,
        });
    }

    log::debug!(
        "{}: {} fields, {} bytes ({} padding)",
        record,
        R::FIELDS.len(),
        stride,
        expected.padding_bytes()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float3_takes_sixteen_bytes() {
        let layout = RecordLayout::compute([
            ("center", FieldKind::Float3),
            ("alive", FieldKind::Flag),
        ]);
        assert_eq!(layout.field_offset("alive"), Some(16));
        assert_eq!(layout.stride, 32);
        assert_eq!(layout.padding_bytes(), 4 + 12);
    }

    #[test]
    fn test_float2_aligns_to_eight() {
        let layout = RecordLayout::compute([
            ("rotation", FieldKind::Float),
            ("velocity", FieldKind::Float2),
        ]);
        assert_eq!(layout.field_offset("velocity"), Some(8));
        assert_eq!(layout.stride, 16);
        assert_eq!(layout.align, 8);
    }

    #[test]
    fn test_scalar_only_record_has_no_padding() {
        let layout = RecordLayout::compute(
            ["left", "right", "top", "bottom", "near", "far"]
                .into_iter()
                .map(|n| (n, FieldKind::Float)),
        );
        assert_eq!(layout.stride, 24);
        assert_eq!(layout.align, 4);
        assert!(layout.padding.is_empty());
    }

    #[test]
    fn test_wgsl_struct_names_pads_in_order() {
        let layout = RecordLayout::compute([
            ("color", FieldKind::Float4),
            ("center", FieldKind::Float3),
            ("alive", FieldKind::Flag),
            ("size", FieldKind::Float),
        ]);
        let expected = "struct Cube {\n    color: vec4<f32>,\n    center: vec3<f32>,\n    _pad0: f32,\n    alive: f32,\n    size: f32,\n    _pad1: array<f32, 2>,\n}";
        assert_eq!(layout.to_wgsl_struct("Cube"), expected);
    }

    #[test]
    fn test_vertex_formats() {
        assert_eq!(FieldKind::Flag.vertex_format(), Some(wgpu::VertexFormat::Float32));
        assert_eq!(FieldKind::Float3.vertex_format(), Some(wgpu::VertexFormat::Float32x3));
        assert_eq!(FieldKind::Float4x4.vertex_format(), None);
        assert_eq!(FieldKind::UintArray(8).wgsl_type(), "array<u32, 8>");
    }
}
