//! Static meshes the demos instance their records onto.
//!
//! The 2D demos draw a quad per particle as a 4-vertex triangle strip; the
//! automaton draws an indexed unit cube per cell. Mesh attributes take the
//! low shader locations so instance attributes start right after them.

use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl QuadVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    /// First location free for instance attributes.
    pub const NEXT_LOCATION: u32 = 2;

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

const fn quad(half: f32) -> [QuadVertex; 4] {
    [
        QuadVertex { position: [-half, half, 0.0], uv: [0.0, 0.0] },  // upper left
        QuadVertex { position: [-half, -half, 0.0], uv: [0.0, 1.0] }, // lower left
        QuadVertex { position: [half, half, 0.0], uv: [1.0, 0.0] },   // upper right
        QuadVertex { position: [half, -half, 0.0], uv: [1.0, 1.0] },  // lower right
    ]
}

/// Unit quad centred on the origin, scaled per instance by `size`.
pub const QUAD_VERTICES: [QuadVertex; 4] = quad(0.5);

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct CubeVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub normal: [f32; 3],
}

impl CubeVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2, 2 => Float32x3];

    /// First location free for instance attributes.
    pub const NEXT_LOCATION: u32 = 3;

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

const fn cv(position: [f32; 3], uv: [f32; 2], normal: [f32; 3]) -> CubeVertex {
    CubeVertex { position, uv, normal }
}

/// Unit cube, four vertices per face so each face has its own normal.
pub const CUBE_VERTICES: [CubeVertex; 24] = [
    // front
    cv([-0.5, 0.5, 0.5], [0.0, 0.0], [0.0, 0.0, 1.0]),
    cv([-0.5, -0.5, 0.5], [0.0, 1.0], [0.0, 0.0, 1.0]),
    cv([0.5, 0.5, 0.5], [1.0, 0.0], [0.0, 0.0, 1.0]),
    cv([0.5, -0.5, 0.5], [1.0, 1.0], [0.0, 0.0, 1.0]),
    // back
    cv([-0.5, 0.5, -0.5], [1.0, 0.0], [0.0, 0.0, -1.0]),
    cv([-0.5, -0.5, -0.5], [1.0, 1.0], [0.0, 0.0, -1.0]),
    cv([0.5, 0.5, -0.5], [0.0, 0.0], [0.0, 0.0, -1.0]),
    cv([0.5, -0.5, -0.5], [0.0, 1.0], [0.0, 0.0, -1.0]),
    // top
    cv([-0.5, 0.5, 0.5], [0.0, 0.0], [0.0, 1.0, 0.0]),
    cv([-0.5, 0.5, -0.5], [0.0, 1.0], [0.0, 1.0, 0.0]),
    cv([0.5, 0.5, 0.5], [1.0, 0.0], [0.0, 1.0, 0.0]),
    cv([0.5, 0.5, -0.5], [1.0, 1.0], [0.0, 1.0, 0.0]),
    // bottom
    cv([-0.5, -0.5, 0.5], [0.0, 1.0], [0.0, -1.0, 0.0]),
    cv([-0.5, -0.5, -0.5], [0.0, 0.0], [0.0, -1.0, 0.0]),
    cv([0.5, -0.5, 0.5], [1.0, 1.0], [0.0, -1.0, 0.0]),
    cv([0.5, -0.5, -0.5], [1.0, 0.0], [0.0, -1.0, 0.0]),
    // left
    cv([-0.5, 0.5, -0.5], [1.0, 0.0], [-1.0, 0.0, 0.0]),
    cv([-0.5, -0.5, -0.5], [1.0, 1.0], [-1.0, 0.0, 0.0]),
    cv([-0.5, 0.5, 0.5], [0.0, 0.0], [-1.0, 0.0, 0.0]),
    cv([-0.5, -0.5, 0.5], [0.0, 1.0], [-1.0, 0.0, 0.0]),
    // right
    cv([0.5, 0.5, -0.5], [0.0, 0.0], [1.0, 0.0, 0.0]),
    cv([0.5, -0.5, -0.5], [0.0, 1.0], [1.0, 0.0, 0.0]),
    cv([0.5, 0.5, 0.5], [1.0, 0.0], [1.0, 0.0, 0.0]),
    cv([0.5, -0.5, 0.5], [1.0, 1.0], [1.0, 0.0, 0.0]),
];

/// Counter-clockwise triangles, two per face.
pub const CUBE_INDICES: [u16; 36] = [
    0, 1, 2, 2, 1, 3, //
    6, 5, 4, 7, 5, 6, //
    10, 9, 8, 11, 9, 10, //
    12, 13, 14, 14, 13, 15, //
    16, 17, 18, 18, 17, 19, //
    22, 21, 20, 23, 21, 22, //
];

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_vertex_strides() {
        assert_eq!(QuadVertex::desc().array_stride, 20);
        assert_eq!(CubeVertex::desc().array_stride, 32);
    }

    #[test]
    fn test_cube_triangles_face_outwards() {
        for tri in CUBE_INDICES.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| CUBE_VERTICES[i as usize]);
            let pa = Vec3::from_array(a.position);
            let pb = Vec3::from_array(b.position);
            let pc = Vec3::from_array(c.position);
            let face_normal = (pb - pa).cross(pc - pa);
            assert!(face_normal.dot(Vec3::from_array(a.normal)) > 0.0, "{:?}", tri);
        }
    }

    #[test]
    fn test_quad_is_centered() {
        let sum: f32 = QUAD_VERTICES.iter().map(|v| v.position[0] + v.position[1]).sum();
        assert_eq!(sum, 0.0);
        assert_eq!(QUAD_VERTICES[3].position, [0.5, -0.5, 0.0]);
    }
}
