use glam::{Vec2, Vec3};

use crate::{
    config::InterleaveOptions,
    packed::{ColorData, PackedGeometry, RawGeometry, Topology},
};

/// Accessors a geometry node exposes to the packer.
///
/// Every X3D geometry shape implements this once; packing and interleaving
/// only ever see the trait. Index fields arrive already decoded.
pub trait GeometrySource {
    /// Points of the coordinate provider, `None` when the node has none.
    fn coordinates(&self) -> Option<&[Vec3]>;

    fn indices(&self) -> &[i32] {
        &[]
    }

    fn rgb_colors(&self) -> Option<&[f32]> {
        None
    }

    fn rgba_colors(&self) -> Option<&[f32]> {
        None
    }

    fn color_indices(&self) -> &[i32] {
        &[]
    }

    fn texture_coordinates(&self) -> Option<&[Vec2]> {
        None
    }

    fn texture_indices(&self) -> &[i32] {
        &[]
    }

    fn color_per_vertex(&self) -> bool {
        true
    }

    fn vertex_stride(&self) -> Option<usize> {
        None
    }

    fn vertex_count(&self) -> Option<usize> {
        None
    }

    /// How the index stream is cut into faces when it carries no sentinel.
    fn topology(&self) -> Topology {
        Topology::Inferred
    }

    /// Whether an empty `indices` means there is nothing to draw.
    fn requires_indices(&self) -> bool {
        true
    }

    /// Extracts the raw description of this node.
    ///
    /// A node without coordinates, or without indices when it needs them,
    /// yields a description that interleaves to nothing.
    fn pack(&self) -> RawGeometry {
        let mut raw = RawGeometry {
            color_per_vertex: self.color_per_vertex(),
            topology: self.topology(),
            ..Default::default()
        };

        raw.colors = match (self.rgb_colors(), self.rgba_colors()) {
            (Some(rgb), None) => Some(ColorData::Rgb(rgb.to_vec())),
            (None, Some(rgba)) => Some(ColorData::Rgba(rgba.to_vec())),
            (Some(_), Some(_)) => {
                tracing::debug!("Both RGB and RGBA colors present, coloring disabled");
                None
            }
            (None, None) => None,
        };
        raw.texture_coords = self.texture_coordinates().map(<[Vec2]>::to_vec);

        let Some(coordinates) = self.coordinates() else {
            return raw;
        };
        let indices = self.indices();
        if self.requires_indices() && indices.is_empty() {
            return raw;
        }

        raw.coordinates = coordinates.to_vec();
        raw.indices = indices.to_vec();
        raw.color_indices = non_empty(self.color_indices());
        raw.texture_indices = non_empty(self.texture_indices());
        raw.detect_restart();
        raw.vertex_stride = self.vertex_stride();
        raw.vertex_count = self.vertex_count();
        raw
    }

    fn collect(&self, options: &InterleaveOptions) -> PackedGeometry {
        self.pack().interleave(options)
    }
}

fn non_empty(indices: &[i32]) -> Option<Vec<i32>> {
    (!indices.is_empty()).then(|| indices.to_vec())
}
