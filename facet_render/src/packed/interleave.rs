use glam::{Vec2, Vec3, Vec4};
use std::{borrow::Cow, ops::Range};

use super::{RawGeometry, Topology};
use crate::{
    bounds::BoundingBox,
    config::{InterleaveOptions, PolygonPolicy},
    vertex::Vertex,
};

#[derive(Default)]
pub(super) struct Buckets {
    pub triangles: Vec<Vertex>,
    pub quads: Vec<Vertex>,
    pub lines: Vec<Vertex>,
    pub points: Vec<Vertex>,
    pub dropped: usize,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Faceting {
    /// Restart runs, each one polygon.
    Polygons,
    /// Fixed-size chunks over the whole stream.
    Chunks(usize),
    /// Restart runs, each expanded into overlapping windows.
    Strips(usize),
}

impl Faceting {
    fn of(raw: &RawGeometry) -> Self {
        let stride = raw.vertex_stride.filter(|s| *s > 0);
        match (raw.topology, raw.restart_index, stride) {
            (Topology::Polygons, _, _) => Faceting::Polygons,
            (Topology::Polylines, _, stride) => Faceting::Strips(stride.unwrap_or(2)),
            (Topology::Inferred, Some(_), Some(stride)) => Faceting::Strips(stride),
            (Topology::Inferred, None, Some(stride)) => Faceting::Chunks(stride),
            (Topology::Inferred, Some(_), None) => Faceting::Polygons,
            (Topology::Inferred, None, None) => Faceting::Chunks(3),
        }
    }
}

pub(super) fn interleave(
    raw: &RawGeometry,
    options: &InterleaveOptions,
) -> (Buckets, BoundingBox) {
    let stream = index_stream(raw);
    let resolver = Resolver {
        raw,
        stream: &stream,
    };

    let bounding_box = if options.compute_bounds {
        resolver.bounds()
    } else {
        BoundingBox::ZERO
    };

    let mut buckets = Buckets::default();
    let mut invalid = 0;
    let faceting = Faceting::of(raw);
    let policy = options.polygon_policy;

    for_each_run(&stream, raw.restart_index, |run| match faceting {
        Faceting::Polygons => {
            if !resolver.place_polygon(run, policy, &mut buckets) {
                invalid += 1;
            }
        }
        Faceting::Chunks(stride) => {
            let mut start = run.start;
            while start + stride <= run.end {
                if !resolver.place_primitive(start..start + stride, policy, &mut buckets) {
                    invalid += 1;
                }
                start += stride;
            }
            if start < run.end {
                buckets.dropped += 1;
            }
        }
        Faceting::Strips(stride) => {
            if run.len() < stride {
                buckets.dropped += 1;
                return;
            }
            for start in run.start..=run.end - stride {
                if !resolver.place_primitive(start..start + stride, policy, &mut buckets) {
                    invalid += 1;
                }
            }
        }
    });

    if invalid > 0 {
        tracing::warn!(
            "Dropped {} faces referencing missing coordinates ({} coordinates available)",
            invalid,
            raw.coordinates.len()
        );
    }
    buckets.dropped += invalid;

    (buckets, bounding_box)
}

/// The decoded indices, or `0..n` for index-free fixed-arity shapes.
fn index_stream(raw: &RawGeometry) -> Cow<'_, [i32]> {
    if raw.indices.is_empty() && raw.vertex_stride.is_some() {
        let count = raw
            .vertex_count
            .unwrap_or(raw.coordinates.len())
            .min(raw.coordinates.len());
        let count = i32::try_from(count).unwrap_or(i32::MAX);
        Cow::Owned((0..count).collect())
    } else {
        Cow::Borrowed(&raw.indices)
    }
}

/// Calls `f` with each maximal run between restart sentinels, skipping
/// empty runs.
fn for_each_run(stream: &[i32], restart: Option<i32>, mut f: impl FnMut(Range<usize>)) {
    let Some(restart) = restart else {
        if !stream.is_empty() {
            f(0..stream.len());
        }
        return;
    };

    let mut start = 0;
    for (position, index) in stream.iter().enumerate() {
        if *index == restart {
            if start < position {
                f(start..position);
            }
            start = position + 1;
        }
    }
    if start < stream.len() {
        f(start..stream.len());
    }
}

struct Resolver<'a> {
    raw: &'a RawGeometry,
    stream: &'a [i32],
}

impl Resolver<'_> {
    fn bounds(&self) -> BoundingBox {
        let restart = self.raw.restart_index;
        BoundingBox::from_points(
            self.stream
                .iter()
                .enumerate()
                .filter(|(_, index)| Some(**index) != restart)
                .filter_map(|(position, _)| self.coordinate(position)),
        )
    }

    /// Places a fixed-arity primitive; arities above four fall back to
    /// polygon handling.
    fn place_primitive(
        &self,
        face: Range<usize>,
        policy: PolygonPolicy,
        buckets: &mut Buckets,
    ) -> bool {
        let first = face.start;
        match face.len() {
            1 => self.push_face(&[first], first, &mut buckets.points),
            2 => self.push_face(&[first, first + 1], first, &mut buckets.lines),
            _ => self.place_polygon(face, policy, buckets),
        }
    }

    fn place_polygon(
        &self,
        face: Range<usize>,
        policy: PolygonPolicy,
        buckets: &mut Buckets,
    ) -> bool {
        let first = face.start;
        match face.len() {
            0..=2 => {
                buckets.dropped += 1;
                true
            }
            3 => self.push_face(&[first, first + 1, first + 2], first, &mut buckets.triangles),
            4 => self.push_face(
                &[first, first + 1, first + 2, first + 3],
                first,
                &mut buckets.quads,
            ),
            _ => match policy {
                PolygonPolicy::Drop => {
                    buckets.dropped += 1;
                    true
                }
                PolygonPolicy::Fan => {
                    let start = buckets.triangles.len();
                    for second in face.start + 1..face.end - 1 {
                        let triangle = [first, second, second + 1];
                        if !self.push_face(&triangle, first, &mut buckets.triangles) {
                            buckets.triangles.truncate(start);
                            return false;
                        }
                    }
                    true
                }
            },
        }
    }

    /// Appends one vertex per position, or nothing when any position
    /// references a missing coordinate.
    fn push_face(&self, positions: &[usize], face_first: usize, out: &mut Vec<Vertex>) -> bool {
        let start = out.len();
        for &position in positions {
            let Some(coordinate) = self.coordinate(position) else {
                out.truncate(start);
                return false;
            };
            let color_position = if self.raw.color_per_vertex {
                position
            } else {
                face_first
            };
            out.push(Vertex::new(
                coordinate,
                self.color(color_position),
                self.tex_coord(position),
            ));
        }
        true
    }

    fn coordinate(&self, position: usize) -> Option<Vec3> {
        let index = usize::try_from(self.stream[position]).ok()?;
        self.raw.coordinates.get(index).copied()
    }

    /// Secondary index at `position`, falling back to the coordinate index
    /// when the secondary array is absent, short or negative there.
    fn secondary_index(&self, secondary: Option<&[i32]>, position: usize) -> i32 {
        secondary
            .and_then(|indices| indices.get(position))
            .copied()
            .filter(|index| *index >= 0)
            .unwrap_or(self.stream[position])
    }

    fn color(&self, position: usize) -> Vec4 {
        let Some(colors) = &self.raw.colors else {
            return Vec4::ONE;
        };
        let count = colors.len();
        if count == 0 {
            return Vec4::ONE;
        }
        let index = self.secondary_index(self.raw.color_indices.as_deref(), position);
        let entry = clamp_index(index, count) * colors.channels();
        let values = colors.values();
        match colors.channels() {
            3 => Vec3::from_slice(&values[entry..entry + 3]).extend(1.0),
            _ => Vec4::from_slice(&values[entry..entry + 4]),
        }
    }

    fn tex_coord(&self, position: usize) -> Vec2 {
        let Some(tex_coords) = self.raw.texture_coords.as_deref() else {
            return Vec2::ZERO;
        };
        if tex_coords.is_empty() {
            return Vec2::ZERO;
        }
        let index = self.secondary_index(self.raw.texture_indices.as_deref(), position);
        tex_coords[clamp_index(index, tex_coords.len())]
    }
}

fn clamp_index(index: i32, count: usize) -> usize {
    usize::try_from(index).unwrap_or(0).min(count - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packed::{ColorData, PackedGeometry, RawGeometry, Topology, RESTART_INDEX};
    use rstest::rstest;

    fn coordinates(count: usize) -> Vec<Vec3> {
        (0..count)
            .map(|i| Vec3::new(i as f32, (i * 2) as f32, (i * 3) as f32))
            .collect()
    }

    fn pack(mut raw: RawGeometry) -> PackedGeometry {
        raw.detect_restart();
        raw.interleave(&InterleaveOptions::default())
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(5)]
    fn plain_streams_are_triangle_lists(#[case] k: usize) {
        let packed = pack(RawGeometry {
            coordinates: coordinates(3 * k),
            indices: (0..3 * k as i32).collect(),
            ..Default::default()
        });

        assert_eq!(packed.triangle_vertices().len(), 3 * k);
        assert!(packed.quad_vertices().is_empty());
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    fn restart_runs_of_four_are_quads(#[case] k: usize) {
        let mut indices = Vec::new();
        for face in 0..k as i32 {
            indices.extend([face * 4, face * 4 + 1, face * 4 + 2, face * 4 + 3]);
            if face + 1 < k as i32 {
                indices.push(RESTART_INDEX);
            }
        }
        let packed = pack(RawGeometry {
            coordinates: coordinates(4 * k),
            indices,
            topology: Topology::Polygons,
            ..Default::default()
        });

        assert_eq!(packed.quad_vertices().len(), 4 * k);
        assert!(packed.triangle_vertices().is_empty());
        assert_eq!(packed.dropped_faces(), 0);
    }

    #[test]
    fn unterminated_polygon_stream_is_one_face() {
        let packed = pack(RawGeometry {
            coordinates: coordinates(4),
            indices: vec![0, 1, 3, 2],
            topology: Topology::Polygons,
            ..Default::default()
        });

        assert_eq!(packed.raw().restart_index, None);
        assert!(packed.triangle_vertices().is_empty());
        assert_eq!(packed.quad_vertices().len(), 4);
        assert_eq!(packed.quad_vertices()[3].position, Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(packed.dropped_faces(), 0);
    }

    #[test]
    fn trailing_partial_triangle_is_counted() {
        let packed = pack(RawGeometry {
            coordinates: coordinates(5),
            indices: vec![0, 1, 2, 3, 4],
            ..Default::default()
        });

        assert_eq!(packed.triangle_vertices().len(), 3);
        assert_eq!(packed.dropped_faces(), 1);
    }

    #[test]
    fn mixed_faces_split_into_buckets() {
        let packed = pack(RawGeometry {
            coordinates: coordinates(7),
            indices: vec![0, 1, 2, -1, 3, 4, 5, 6, -1],
            ..Default::default()
        });

        assert_eq!(packed.triangle_vertices().len(), 3);
        assert_eq!(packed.quad_vertices().len(), 4);
        assert_eq!(packed.quad_vertices()[0].position, Vec3::new(3.0, 6.0, 9.0));
        assert_eq!(packed.quad_vertices()[3].position, Vec3::new(6.0, 12.0, 18.0));
    }

    #[test]
    fn bounds_cover_referenced_coordinates_only() {
        let packed = pack(RawGeometry {
            coordinates: vec![Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0), Vec3::splat(100.0)],
            indices: vec![0, 1],
            ..Default::default()
        });

        assert_eq!(packed.bounding_box().min, Vec3::ZERO);
        assert_eq!(packed.bounding_box().max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn disabled_bounds_stay_zero() {
        let raw = RawGeometry {
            coordinates: vec![Vec3::ONE, Vec3::splat(2.0), Vec3::splat(3.0)],
            indices: vec![0, 1, 2],
            ..Default::default()
        };
        let packed = raw.interleave(&InterleaveOptions {
            compute_bounds: false,
            ..Default::default()
        });

        assert_eq!(packed.triangle_vertices().len(), 3);
        assert!(packed.bounding_box().is_zero());
    }

    #[test]
    fn face_color_is_replicated() {
        let packed = pack(RawGeometry {
            coordinates: coordinates(8),
            indices: vec![4, 5, 6, 7, -1, 1, 2, 3],
            colors: Some(ColorData::Rgb(vec![1.0, 0.0, 0.0])),
            color_per_vertex: false,
            ..Default::default()
        });

        for vertex in packed.quad_vertices().iter().chain(packed.triangle_vertices()) {
            assert_eq!(vertex.color.truncate(), Vec3::new(1.0, 0.0, 0.0));
        }
    }

    #[test]
    fn face_color_uses_first_resolved_index() {
        let packed = pack(RawGeometry {
            coordinates: coordinates(3),
            indices: vec![1, 0, 2],
            colors: Some(ColorData::Rgb(vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0])),
            color_per_vertex: false,
            ..Default::default()
        });

        for vertex in packed.triangle_vertices() {
            assert_eq!(vertex.color, Vec4::new(0.0, 1.0, 0.0, 1.0));
        }
    }

    #[test]
    fn per_vertex_colors_prefer_color_indices() {
        let packed = pack(RawGeometry {
            coordinates: coordinates(3),
            indices: vec![0, 1, 2],
            colors: Some(ColorData::Rgba(vec![
                1.0, 0.0, 0.0, 1.0, //
                0.0, 1.0, 0.0, 0.5, //
            ])),
            color_indices: Some(vec![1, 1]),
            ..Default::default()
        });
        let colors: Vec<Vec4> = packed.triangle_vertices().iter().map(|v| v.color).collect();

        // The third vertex has no color index and falls back to its coordinate
        // index, which is clamped to the last color.
        assert_eq!(
            colors,
            vec![
                Vec4::new(0.0, 1.0, 0.0, 0.5),
                Vec4::new(0.0, 1.0, 0.0, 0.5),
                Vec4::new(0.0, 1.0, 0.0, 0.5),
            ]
        );
    }

    #[test]
    fn uncolored_vertices_are_white() {
        let packed = pack(RawGeometry {
            coordinates: coordinates(3),
            indices: vec![0, 1, 2],
            ..Default::default()
        });
        assert!(packed.triangle_vertices().iter().all(|v| v.color == Vec4::ONE));
        assert!(packed.triangle_vertices().iter().all(|v| v.normal == Vec3::ZERO));
    }

    #[test]
    fn texture_coordinates_follow_texture_indices() {
        let packed = pack(RawGeometry {
            coordinates: coordinates(4),
            indices: vec![0, 1, 2, 3, -1],
            texture_coords: Some(vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
            ]),
            texture_indices: Some(vec![3, 2, 1, 0, -1]),
            ..Default::default()
        });
        let tex: Vec<Vec2> = packed.quad_vertices().iter().map(|v| v.tex_coord).collect();

        assert_eq!(
            tex,
            vec![
                Vec2::new(0.0, 1.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(0.0, 0.0),
            ]
        );
        assert!(packed.texturing());
    }

    #[test]
    fn texture_coordinates_default_to_coordinate_index() {
        let packed = pack(RawGeometry {
            coordinates: coordinates(3),
            indices: vec![2, 1, 0],
            texture_coords: Some(vec![Vec2::ZERO, Vec2::X, Vec2::Y]),
            ..Default::default()
        });
        let tex: Vec<Vec2> = packed.triangle_vertices().iter().map(|v| v.tex_coord).collect();
        assert_eq!(tex, vec![Vec2::Y, Vec2::X, Vec2::ZERO]);
    }

    #[test]
    fn pentagons_are_dropped_by_default() {
        let packed = pack(RawGeometry {
            coordinates: coordinates(5),
            indices: vec![0, 1, 2, 3, 4, -1],
            ..Default::default()
        });

        assert!(packed.is_empty());
        assert_eq!(packed.dropped_faces(), 1);
        assert_eq!(packed.bounding_box().max, Vec3::new(4.0, 8.0, 12.0));
    }

    #[test]
    fn pentagons_fan_when_requested() {
        let mut raw = RawGeometry {
            coordinates: coordinates(5),
            indices: vec![0, 1, 2, 3, 4, -1],
            ..Default::default()
        };
        raw.detect_restart();
        let packed = raw.interleave(&InterleaveOptions {
            polygon_policy: PolygonPolicy::Fan,
            compute_bounds: true,
        });
        let fan: Vec<f32> = packed
            .triangle_vertices()
            .iter()
            .map(|v| v.position.x)
            .collect();

        assert_eq!(fan, vec![0.0, 1.0, 2.0, 0.0, 2.0, 3.0, 0.0, 3.0, 4.0]);
        assert_eq!(packed.dropped_faces(), 0);
    }

    #[test]
    fn fan_with_missing_coordinate_rolls_back() {
        let mut raw = RawGeometry {
            coordinates: coordinates(4),
            indices: vec![0, 1, 2, 3, 9, -1],
            ..Default::default()
        };
        raw.detect_restart();
        let packed = raw.interleave(&InterleaveOptions {
            polygon_policy: PolygonPolicy::Fan,
            compute_bounds: true,
        });

        assert!(packed.triangle_vertices().is_empty());
        assert_eq!(packed.dropped_faces(), 1);
    }

    #[test]
    fn degenerate_faces_are_dropped() {
        let packed = pack(RawGeometry {
            coordinates: coordinates(4),
            indices: vec![0, 1, -1, 2, -1, 0, 1, 2],
            ..Default::default()
        });

        assert_eq!(packed.triangle_vertices().len(), 3);
        assert_eq!(packed.dropped_faces(), 2);
    }

    #[test]
    fn all_sentinels_yield_nothing() {
        let packed = pack(RawGeometry {
            coordinates: coordinates(3),
            indices: vec![RESTART_INDEX; 10_000],
            ..Default::default()
        });

        assert!(packed.is_empty());
        assert_eq!(packed.dropped_faces(), 0);
        assert!(packed.bounding_box().is_zero());
    }

    #[test]
    fn out_of_range_references_drop_the_face() {
        let packed = pack(RawGeometry {
            coordinates: coordinates(3),
            indices: vec![0, 1, 9, -1, 0, 1, 2],
            ..Default::default()
        });

        assert_eq!(packed.triangle_vertices().len(), 3);
        assert_eq!(packed.dropped_faces(), 1);
    }

    #[test]
    fn restart_with_stride_two_walks_polylines() {
        let packed = pack(RawGeometry {
            coordinates: coordinates(5),
            indices: vec![0, 1, 2, -1, 3, 4],
            vertex_stride: Some(2),
            ..Default::default()
        });
        let segments: Vec<f32> = packed.line_vertices().iter().map(|v| v.position.x).collect();

        assert_eq!(segments, vec![0.0, 1.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn polylines_ignore_trailing_sentinel() {
        let polyline = |indices: Vec<i32>| {
            pack(RawGeometry {
                coordinates: coordinates(3),
                indices,
                topology: Topology::Polylines,
                vertex_stride: Some(2),
                ..Default::default()
            })
        };

        let open = polyline(vec![0, 1, 2]);
        let closed = polyline(vec![0, 1, 2, -1]);

        assert_eq!(open.line_vertices().len(), 4);
        assert_eq!(open.line_vertices(), closed.line_vertices());
        assert_eq!(open.dropped_faces(), closed.dropped_faces());
    }

    #[test]
    fn short_polyline_runs_are_counted() {
        let packed = pack(RawGeometry {
            coordinates: coordinates(4),
            indices: vec![0, -1, 1, 2, 3],
            topology: Topology::Polylines,
            vertex_stride: Some(2),
            ..Default::default()
        });

        assert_eq!(packed.line_vertices().len(), 4);
        assert_eq!(packed.dropped_faces(), 1);
    }

    #[test]
    fn stride_without_indices_uses_vertex_count() {
        let packed = pack(RawGeometry {
            coordinates: coordinates(6),
            vertex_stride: Some(2),
            vertex_count: Some(5),
            ..Default::default()
        });

        assert_eq!(packed.line_vertices().len(), 4);
        assert_eq!(packed.bounding_box().max, Vec3::new(4.0, 8.0, 12.0));
        assert_eq!(packed.dropped_faces(), 1);
    }

    #[test]
    fn stride_one_produces_points() {
        let packed = pack(RawGeometry {
            coordinates: coordinates(4),
            vertex_stride: Some(1),
            colors: Some(ColorData::Rgb(vec![0.0, 0.0, 1.0])),
            ..Default::default()
        });

        assert_eq!(packed.point_vertices().len(), 4);
        assert!(packed
            .point_vertices()
            .iter()
            .all(|v| v.color == Vec4::new(0.0, 0.0, 1.0, 1.0)));
    }

    #[test]
    fn missing_coordinates_yield_empty_output() {
        let packed = pack(RawGeometry {
            indices: vec![0, 1, 2],
            ..Default::default()
        });

        assert!(packed.is_empty());
        assert!(packed.bounding_box().is_zero());
    }
}
