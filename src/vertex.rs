//! Per-instance vertex attributes for records drawn as instances.
//!
//! The demos draw one quad or cube per record and let the vertex stage read
//! the record's fields as instance attributes. The attribute offsets must
//! be the record's field offsets, so they are taken from the derived field
//! table instead of being written by hand.

use crate::error::LayoutError;
use crate::GpuRecord;

/// Instance-step vertex buffer layout for one record type.
#[derive(Clone, Debug, PartialEq)]
pub struct InstanceLayout {
    attributes: Vec<wgpu::VertexAttribute>,
    stride: wgpu::BufferAddress,
}

impl InstanceLayout {
    /// One attribute per field that has a vertex format, in field order,
    /// with shader locations counting up from `first_location`.
    pub fn of<R: GpuRecord>(first_location: u32) -> Self {
        let attributes = R::FIELDS
            .iter()
            .filter_map(|field| field.kind.vertex_format().map(|format| (field, format)))
            .zip(first_location..)
            .map(|((field, format), shader_location)| wgpu::VertexAttribute {
                format,
                offset: field.offset as wgpu::BufferAddress,
                shader_location,
            })
            .collect();

        Self {
            attributes,
            stride: R::stride() as wgpu::BufferAddress,
        }
    }

    /// Attributes for the named fields only, in the order given.
    pub fn only<R: GpuRecord>(first_location: u32, names: &[&str]) -> Result<Self, LayoutError> {
        let mut attributes = Vec::with_capacity(names.len());

        for (name, shader_location) in names.iter().zip(first_location..) {
            let field = R::field(name).ok_or_else(|| LayoutError::UnknownField {
                record: R::WGSL_NAME,
                field: name.to_string(),
            })?;
            let format = field.kind.vertex_format().ok_or(LayoutError::NotVertexEncodable {
                record: R::WGSL_NAME,
                field: field.name,
            })?;
            attributes.push(wgpu::VertexAttribute {
                format,
                offset: field.offset as wgpu::BufferAddress,
                shader_location,
            });
        }

        Ok(Self {
            attributes,
            stride: R::stride() as wgpu::BufferAddress,
        })
    }

    pub fn attributes(&self) -> &[wgpu::VertexAttribute] {
        &self.attributes
    }

    pub fn stride(&self) -> wgpu::BufferAddress {
        self.stride
    }

    /// First shader location not used by this layout.
    pub fn next_location(&self) -> u32 {
        self.attributes
            .iter()
            .map(|a| a.shader_location + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn buffer_layout(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &self.attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton3d::Cube;
    use crate::Uniforms;

    #[test]
    fn test_cube_instance_attributes_follow_mesh_attributes() {
        // Cube mesh uses locations 0..=2
        let layout = InstanceLayout::of::<Cube>(3);
        let attrs = layout.attributes();

        assert_eq!(layout.stride(), 48);
        assert_eq!(attrs.len(), 4);
        assert_eq!((attrs[0].shader_location, attrs[0].offset), (3, 0));
        assert_eq!(attrs[0].format, wgpu::VertexFormat::Float32x4);
        assert_eq!((attrs[1].shader_location, attrs[1].offset), (4, 16));
        assert_eq!(attrs[1].format, wgpu::VertexFormat::Float32x3);
        assert_eq!((attrs[2].shader_location, attrs[2].offset), (5, 32));
        assert_eq!((attrs[3].shader_location, attrs[3].offset), (6, 36));
        assert_eq!(layout.next_location(), 7);
        assert_eq!(layout.buffer_layout().step_mode, wgpu::VertexStepMode::Instance);
    }

    #[test]
    fn test_subset_keeps_requested_order() {
        let layout =
            InstanceLayout::only::<crate::dla::v1::Particle>(2, &["color", "center", "velocity"]).unwrap();
        let offsets: Vec<_> = layout.attributes().iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 16, 40]);
    }

    #[test]
    fn test_subset_rejects_unknown_and_matrix_fields() {
        let unknown = InstanceLayout::only::<Cube>(0, &["colour"]);
        assert!(matches!(unknown, Err(LayoutError::UnknownField { .. })));

        let matrix = InstanceLayout::only::<Uniforms>(0, &["model"]);
        assert!(matches!(matrix, Err(LayoutError::NotVertexEncodable { field: "model", .. })));
    }

    #[test]
    fn test_matrices_are_skipped() {
        assert!(InstanceLayout::of::<Uniforms>(0).attributes().is_empty());
    }
}
