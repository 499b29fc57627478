//! The X3D geometry shapes the packer understands.

use facet_render::{GeometrySource, Topology, Vertex, RESTART_INDEX};
use glam::{Vec2, Vec3};
use std::sync::Arc;

use crate::providers::{Color, ColorRgba, Coordinate, TextureCoordinate};

/// Attribute providers a geometry node was given at scene construction.
/// Shared providers (`USE`) are the same `Arc`.
#[derive(Clone, Debug, Default)]
pub struct Providers {
    pub coord: Option<Arc<Coordinate>>,
    pub color: Option<Arc<Color>>,
    pub color_rgba: Option<Arc<ColorRgba>>,
    pub tex_coord: Option<Arc<TextureCoordinate>>,
}

impl Providers {
    pub fn new(coord: Arc<Coordinate>) -> Self {
        Self {
            coord: Some(coord),
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: Arc<Color>) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_color_rgba(mut self, color: Arc<ColorRgba>) -> Self {
        self.color_rgba = Some(color);
        self
    }

    pub fn with_tex_coord(mut self, tex_coord: Arc<TextureCoordinate>) -> Self {
        self.tex_coord = Some(tex_coord);
        self
    }

    fn points(&self) -> Option<&[Vec3]> {
        self.coord.as_deref().map(|coord| coord.point.as_slice())
    }

    fn rgb(&self) -> Option<&[f32]> {
        self.color.as_deref().map(|color| color.color.as_slice())
    }

    fn rgba(&self) -> Option<&[f32]> {
        self.color_rgba.as_deref().map(|color| color.color.as_slice())
    }

    fn tex_points(&self) -> Option<&[Vec2]> {
        self.tex_coord
            .as_deref()
            .map(|tex_coord| tex_coord.point.as_slice())
    }
}

#[derive(Clone, Debug)]
pub struct IndexedTriangleSet {
    pub providers: Providers,
    pub index: Vec<i32>,
    pub color_per_vertex: bool,
}

impl Default for IndexedTriangleSet {
    fn default() -> Self {
        Self {
            providers: Providers::default(),
            index: Vec::new(),
            color_per_vertex: true,
        }
    }
}

impl GeometrySource for IndexedTriangleSet {
    fn coordinates(&self) -> Option<&[Vec3]> {
        self.providers.points()
    }

    fn indices(&self) -> &[i32] {
        &self.index
    }

    fn rgb_colors(&self) -> Option<&[f32]> {
        self.providers.rgb()
    }

    fn rgba_colors(&self) -> Option<&[f32]> {
        self.providers.rgba()
    }

    fn texture_coordinates(&self) -> Option<&[Vec2]> {
        self.providers.tex_points()
    }

    fn color_per_vertex(&self) -> bool {
        self.color_per_vertex
    }
}

/// Polygons delimited by `-1` in `coord_index`.
#[derive(Clone, Debug)]
pub struct IndexedFaceSet {
    pub providers: Providers,
    pub coord_index: Vec<i32>,
    pub color_index: Vec<i32>,
    pub tex_coord_index: Vec<i32>,
    pub color_per_vertex: bool,
}

impl Default for IndexedFaceSet {
    fn default() -> Self {
        Self {
            providers: Providers::default(),
            coord_index: Vec::new(),
            color_index: Vec::new(),
            tex_coord_index: Vec::new(),
            color_per_vertex: true,
        }
    }
}

impl GeometrySource for IndexedFaceSet {
    fn coordinates(&self) -> Option<&[Vec3]> {
        self.providers.points()
    }

    fn indices(&self) -> &[i32] {
        &self.coord_index
    }

    fn rgb_colors(&self) -> Option<&[f32]> {
        self.providers.rgb()
    }

    fn rgba_colors(&self) -> Option<&[f32]> {
        self.providers.rgba()
    }

    fn color_indices(&self) -> &[i32] {
        &self.color_index
    }

    fn texture_coordinates(&self) -> Option<&[Vec2]> {
        self.providers.tex_points()
    }

    fn texture_indices(&self) -> &[i32] {
        &self.tex_coord_index
    }

    fn color_per_vertex(&self) -> bool {
        self.color_per_vertex
    }

    fn topology(&self) -> Topology {
        Topology::Polygons
    }
}

/// Polylines delimited by `-1`, drawn as segments.
#[derive(Clone, Debug)]
pub struct IndexedLineSet {
    pub providers: Providers,
    pub coord_index: Vec<i32>,
    pub color_index: Vec<i32>,
    pub color_per_vertex: bool,
}

impl IndexedLineSet {
    /// Line list through the positions of `vertices`, two per segment.
    /// Each pair is its own polyline; an odd trailing vertex is left out.
    pub fn from_vertices(vertices: &[Vertex]) -> Self {
        let coord = Coordinate {
            point: vertices.iter().map(|vertex| vertex.position).collect(),
        };
        let pairs = vertices.len() as i32 / 2;
        Self {
            providers: Providers::new(Arc::new(coord)),
            coord_index: (0..pairs)
                .flat_map(|pair| [pair * 2, pair * 2 + 1, RESTART_INDEX])
                .collect(),
            ..Default::default()
        }
    }
}

impl Default for IndexedLineSet {
    fn default() -> Self {
        Self {
            providers: Providers::default(),
            coord_index: Vec::new(),
            color_index: Vec::new(),
            color_per_vertex: true,
        }
    }
}

impl GeometrySource for IndexedLineSet {
    fn coordinates(&self) -> Option<&[Vec3]> {
        self.providers.points()
    }

    fn indices(&self) -> &[i32] {
        &self.coord_index
    }

    fn rgb_colors(&self) -> Option<&[f32]> {
        self.providers.rgb()
    }

    fn rgba_colors(&self) -> Option<&[f32]> {
        self.providers.rgba()
    }

    fn color_indices(&self) -> &[i32] {
        &self.color_index
    }

    fn texture_coordinates(&self) -> Option<&[Vec2]> {
        self.providers.tex_points()
    }

    fn color_per_vertex(&self) -> bool {
        self.color_per_vertex
    }

    fn vertex_stride(&self) -> Option<usize> {
        Some(2)
    }

    fn topology(&self) -> Topology {
        Topology::Polylines
    }
}

/// Unindexed segments over the first `vertex_count` coordinates, or all of
/// them when unset.
#[derive(Clone, Debug, Default)]
pub struct LineSet {
    pub providers: Providers,
    pub vertex_count: Option<usize>,
}

impl GeometrySource for LineSet {
    fn coordinates(&self) -> Option<&[Vec3]> {
        self.providers.points()
    }

    fn rgb_colors(&self) -> Option<&[f32]> {
        self.providers.rgb()
    }

    fn rgba_colors(&self) -> Option<&[f32]> {
        self.providers.rgba()
    }

    fn texture_coordinates(&self) -> Option<&[Vec2]> {
        self.providers.tex_points()
    }

    fn vertex_stride(&self) -> Option<usize> {
        Some(2)
    }

    fn vertex_count(&self) -> Option<usize> {
        self.vertex_count
    }

    fn requires_indices(&self) -> bool {
        false
    }
}

#[derive(Clone, Debug, Default)]
pub struct PointSet {
    pub providers: Providers,
}

impl GeometrySource for PointSet {
    fn coordinates(&self) -> Option<&[Vec3]> {
        self.providers.points()
    }

    fn rgb_colors(&self) -> Option<&[f32]> {
        self.providers.rgb()
    }

    fn rgba_colors(&self) -> Option<&[f32]> {
        self.providers.rgba()
    }

    fn texture_coordinates(&self) -> Option<&[Vec2]> {
        self.providers.tex_points()
    }

    fn vertex_stride(&self) -> Option<usize> {
        Some(1)
    }

    fn requires_indices(&self) -> bool {
        false
    }
}
