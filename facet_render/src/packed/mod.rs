//! Raw geometry as collected from a scene node, and its interleaved form.

mod interleave;

use glam::{Vec2, Vec3};

use crate::{bounds::BoundingBox, config::InterleaveOptions, vertex::Vertex};

/// Index value that closes the current face in a flat index stream.
pub const RESTART_INDEX: i32 = -1;

/// Flat per-color float list, tagged with its channel count.
#[derive(Clone, Debug, PartialEq)]
pub enum ColorData {
    Rgb(Vec<f32>),
    Rgba(Vec<f32>),
}

impl ColorData {
    pub fn channels(&self) -> usize {
        match self {
            ColorData::Rgb(_) => 3,
            ColorData::Rgba(_) => 4,
        }
    }

    pub fn values(&self) -> &[f32] {
        match self {
            ColorData::Rgb(values) | ColorData::Rgba(values) => values,
        }
    }

    pub fn len(&self) -> usize {
        self.values().len() / self.channels()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// How a node's index stream is cut into faces.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Topology {
    /// Decided by the restart index and vertex stride alone.
    #[default]
    Inferred,
    /// Every restart run is one polygon. A stream without the sentinel is a
    /// single polygon.
    Polygons,
    /// Every restart run is one polyline, walked in overlapping windows of
    /// the vertex stride. A stream without the sentinel is a single polyline.
    Polylines,
}

/// Uniform description of one geometry node before interleaving.
#[derive(Clone, Debug, PartialEq)]
pub struct RawGeometry {
    pub coordinates: Vec<Vec3>,
    pub indices: Vec<i32>,
    pub colors: Option<ColorData>,
    pub color_indices: Option<Vec<i32>>,
    pub texture_coords: Option<Vec<Vec2>>,
    pub texture_indices: Option<Vec<i32>>,
    pub color_per_vertex: bool,
    pub topology: Topology,
    /// Set iff `indices` contains the sentinel.
    pub restart_index: Option<i32>,
    /// Fixed number of indices per primitive (2 for lines, 1 for points).
    pub vertex_stride: Option<usize>,
    /// Length of the implicit `0..n` stream used when `indices` is empty.
    pub vertex_count: Option<usize>,
}

impl RawGeometry {
    pub fn has_rgb(&self) -> bool {
        matches!(self.colors, Some(ColorData::Rgb(_)))
    }

    pub fn has_rgba(&self) -> bool {
        matches!(self.colors, Some(ColorData::Rgba(_)))
    }

    pub fn coloring(&self) -> bool {
        self.colors.is_some()
    }

    pub fn generate_color_map(&self) -> bool {
        self.coloring()
    }

    pub fn texturing(&self) -> bool {
        self.texture_coords.is_some()
    }

    /// Records the restart sentinel when the index stream uses it.
    pub fn detect_restart(&mut self) {
        self.restart_index = self
            .indices
            .contains(&RESTART_INDEX)
            .then_some(RESTART_INDEX);
    }

    pub fn interleave(self, options: &InterleaveOptions) -> PackedGeometry {
        let (buckets, bounding_box) = interleave::interleave(&self, options);
        PackedGeometry {
            raw: self,
            triangles: buckets.triangles,
            quads: buckets.quads,
            lines: buckets.lines,
            points: buckets.points,
            bounding_box,
            dropped_faces: buckets.dropped,
        }
    }
}

impl Default for RawGeometry {
    fn default() -> Self {
        Self {
            coordinates: Vec::new(),
            indices: Vec::new(),
            colors: None,
            color_indices: None,
            texture_coords: None,
            texture_indices: None,
            color_per_vertex: true,
            topology: Topology::Inferred,
            restart_index: None,
            vertex_stride: None,
            vertex_count: None,
        }
    }
}

/// Interleaved, bucketed geometry ready for upload.
///
/// Built once from a [`RawGeometry`]; a rebuild produces a new instance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PackedGeometry {
    raw: RawGeometry,
    triangles: Vec<Vertex>,
    quads: Vec<Vertex>,
    lines: Vec<Vertex>,
    points: Vec<Vertex>,
    bounding_box: BoundingBox,
    dropped_faces: usize,
}

impl PackedGeometry {
    /// Concatenates the buckets of already packed parts in input order.
    ///
    /// Bounds and coloring flags are not re-derived; the result reports
    /// `BoundingBox::ZERO` and no coloring or texturing.
    pub fn merge<'a>(packs: impl IntoIterator<Item = &'a PackedGeometry>) -> PackedGeometry {
        let mut merged = PackedGeometry::default();
        for pack in packs {
            merged.triangles.extend_from_slice(&pack.triangles);
            merged.quads.extend_from_slice(&pack.quads);
            merged.lines.extend_from_slice(&pack.lines);
            merged.points.extend_from_slice(&pack.points);
            merged.dropped_faces += pack.dropped_faces;
        }
        merged
    }

    /// Runs interleaving again over the same raw inputs.
    pub fn reinterleave(&self, options: &InterleaveOptions) -> PackedGeometry {
        self.raw.clone().interleave(options)
    }

    pub fn raw(&self) -> &RawGeometry {
        &self.raw
    }

    pub fn triangle_vertices(&self) -> &[Vertex] {
        &self.triangles
    }

    pub fn quad_vertices(&self) -> &[Vertex] {
        &self.quads
    }

    pub fn line_vertices(&self) -> &[Vertex] {
        &self.lines
    }

    pub fn point_vertices(&self) -> &[Vertex] {
        &self.points
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    pub fn coloring(&self) -> bool {
        self.raw.coloring()
    }

    pub fn texturing(&self) -> bool {
        self.raw.texturing()
    }

    /// Faces skipped because of their arity or an invalid coordinate
    /// reference, including runs and trailing chunks too short for the stride.
    pub fn dropped_faces(&self) -> usize {
        self.dropped_faces
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
            && self.quads.is_empty()
            && self.lines.is_empty()
            && self.points.is_empty()
    }
}
