pub mod geometry;
pub mod header;
pub mod providers;

use facet_ecs::{Component, Entity, World};
use facet_render::{backend::Backend, GeometrySource, RebuildGeometry, RenderError, Renderer};

pub use geometry::{
    IndexedFaceSet, IndexedLineSet, IndexedTriangleSet, LineSet, PointSet, Providers,
};
pub use header::{Profile, SceneHeader};
pub use providers::{Color, ColorRgba, Coordinate, TextureCoordinate};

/// Adds a geometry node, scheduled for collection on the next pass.
pub fn spawn_geometry<T>(world: &mut World, node: T) -> Entity
where
    T: GeometrySource + Component,
{
    world.spawn((node, RebuildGeometry))
}

/// Like [`spawn_geometry`], registering the node under a `DEF` name.
pub fn spawn_geometry_def<T>(world: &mut World, name: &str, node: T) -> Entity
where
    T: GeometrySource + Component,
{
    world.spawn_def(name, (node, RebuildGeometry))
}

/// Runs one collection pass over every geometry node type. Returns the
/// number of nodes whose geometry was rebuilt.
pub fn collect_geometry<B: Backend>(
    renderer: &mut Renderer<B>,
    world: &mut World,
) -> Result<usize, RenderError> {
    let rebuilt = renderer.prepare_geometry::<IndexedTriangleSet>(world)?
        + renderer.prepare_geometry::<IndexedFaceSet>(world)?
        + renderer.prepare_geometry::<IndexedLineSet>(world)?
        + renderer.prepare_geometry::<LineSet>(world)?
        + renderer.prepare_geometry::<PointSet>(world)?;

    if rebuilt > 0 {
        tracing::debug!("Collection pass rebuilt {} nodes", rebuilt);
    }
    Ok(rebuilt)
}
