use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};
use std::mem::{offset_of, size_of};

/// One interleaved vertex as it is laid out in a GPU vertex buffer.
///
/// Attribute binding addresses fields by byte offset, so field order and
/// padding must not change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub pad0: Vec2,
    pub color: Vec4,
    pub tex_coord: Vec2,
    pub pad1: Vec2,
}

impl Vertex {
    pub const STRIDE: usize = size_of::<Vertex>();
    pub const POSITION_OFFSET: usize = offset_of!(Vertex, position);
    pub const NORMAL_OFFSET: usize = offset_of!(Vertex, normal);
    pub const COLOR_OFFSET: usize = offset_of!(Vertex, color);
    pub const TEX_COORD_OFFSET: usize = offset_of!(Vertex, tex_coord);

    pub const ATTRIBUTES: [VertexAttribute; 4] = [
        VertexAttribute {
            semantic: VertexSemantic::Position,
            format: VertexFormat::Float3,
            offset: Self::POSITION_OFFSET,
        },
        VertexAttribute {
            semantic: VertexSemantic::Normal,
            format: VertexFormat::Float3,
            offset: Self::NORMAL_OFFSET,
        },
        VertexAttribute {
            semantic: VertexSemantic::Color,
            format: VertexFormat::Float4,
            offset: Self::COLOR_OFFSET,
        },
        VertexAttribute {
            semantic: VertexSemantic::TexCoord,
            format: VertexFormat::Float2,
            offset: Self::TEX_COORD_OFFSET,
        },
    ];

    pub fn new(position: Vec3, color: Vec4, tex_coord: Vec2) -> Self {
        Self {
            position,
            normal: Vec3::ZERO,
            pad0: Vec2::ZERO,
            color,
            tex_coord,
            pad1: Vec2::ZERO,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum VertexSemantic {
    Position,
    Normal,
    Color,
    TexCoord,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum VertexFormat {
    Float2,
    Float3,
    Float4,
}

impl VertexFormat {
    pub fn components(self) -> usize {
        match self {
            VertexFormat::Float2 => 2,
            VertexFormat::Float3 => 3,
            VertexFormat::Float4 => 4,
        }
    }

    pub fn size(self) -> usize {
        self.components() * size_of::<f32>()
    }
}

/// Where a shader input lives inside [`Vertex`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VertexAttribute {
    pub semantic: VertexSemantic,
    pub format: VertexFormat,
    pub offset: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_fixed() {
        assert_eq!(Vertex::POSITION_OFFSET, 0);
        assert_eq!(Vertex::NORMAL_OFFSET, 12);
        assert_eq!(Vertex::COLOR_OFFSET, 32);
        assert_eq!(Vertex::TEX_COORD_OFFSET, 48);
        assert_eq!(Vertex::STRIDE, 64);
    }

    #[test]
    fn attributes_fit_inside_stride() {
        for attribute in Vertex::ATTRIBUTES {
            assert!(attribute.offset + attribute.format.size() <= Vertex::STRIDE);
        }
    }

    #[test]
    fn vertex_bytes_follow_layout() {
        let vertex = Vertex::new(
            Vec3::new(1.0, 2.0, 3.0),
            Vec4::new(0.25, 0.5, 0.75, 1.0),
            Vec2::new(0.5, 1.0),
        );
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&vertex));

        assert_eq!(&floats[0..3], &[1.0, 2.0, 3.0]);
        assert_eq!(&floats[3..6], &[0.0, 0.0, 0.0]);
        assert_eq!(&floats[8..12], &[0.25, 0.5, 0.75, 1.0]);
        assert_eq!(&floats[12..14], &[0.5, 1.0]);
    }
}
