use crate::{bounds::BoundingBox, id::BufferId};

/// One uploaded bucket. Empty buckets own no buffer.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BucketBuffer {
    pub buffer: Option<BufferId>,
    pub vertex_count: u32,
}

impl BucketBuffer {
    pub const EMPTY: Self = Self {
        buffer: None,
        vertex_count: 0,
    };
}

/// GPU buffers holding a node's interleaved vertices, one per primitive arity.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct GeometryHandle {
    pub triangles: BucketBuffer,
    pub quads: BucketBuffer,
    pub lines: BucketBuffer,
    pub points: BucketBuffer,
}

impl GeometryHandle {
    pub const ZERO: Self = Self {
        triangles: BucketBuffer::EMPTY,
        quads: BucketBuffer::EMPTY,
        lines: BucketBuffer::EMPTY,
        points: BucketBuffer::EMPTY,
    };

    pub fn buckets(&self) -> [BucketBuffer; 4] {
        [self.triangles, self.quads, self.lines, self.points]
    }

    pub fn buffers(&self) -> impl Iterator<Item = BufferId> {
        self.buckets().into_iter().filter_map(|bucket| bucket.buffer)
    }

    pub fn is_empty(&self) -> bool {
        self.buffers().next().is_none()
    }
}

/// What a geometry node hands back to the renderer after collection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderGeometry {
    pub handle: GeometryHandle,
    pub bounding_box: BoundingBox,
    pub coloring: bool,
    pub texturing: bool,
}

/// Marks a node whose geometry must be (re)collected on the next pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct RebuildGeometry;
