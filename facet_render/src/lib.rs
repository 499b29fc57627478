pub mod backend;
pub mod bounds;
pub mod config;
pub mod context;
pub mod error;
pub mod handle;
pub mod id;
pub mod packed;
pub mod source;
pub mod vertex;

use backend::Backend;
use context::GraphicsContext;
use facet_ecs::{CommandBuffer, Component, Entity, NoSuchEntity, World};

pub use bounds::BoundingBox;
pub use config::{InterleaveOptions, PolygonPolicy, RenderConfig};
pub use error::RenderError;
pub use handle::{BucketBuffer, GeometryHandle, RebuildGeometry, RenderGeometry};
pub use packed::{ColorData, PackedGeometry, RawGeometry, Topology, RESTART_INDEX};
pub use source::GeometrySource;
pub use vertex::Vertex;

/// Turns geometry nodes into GPU buffers.
///
/// All buffer traffic goes through the owned [`GraphicsContext`], so it must
/// happen on the thread that currently owns the context.
pub struct Renderer<B: Backend> {
    context: GraphicsContext<B>,
    config: RenderConfig,
}

impl<B: Backend> Renderer<B> {
    pub fn new(backend: B, config: RenderConfig) -> Self {
        tracing::info!("Renderer using {} backend", backend.name());
        Self {
            context: GraphicsContext::new(backend),
            config,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn context(&self) -> &GraphicsContext<B> {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut GraphicsContext<B> {
        &mut self.context
    }

    /// Uploads every non-empty bucket of `packed` into its own vertex buffer.
    pub fn upload(&mut self, packed: &PackedGeometry) -> Result<GeometryHandle, RenderError> {
        self.context.assert_current();

        let mut handle = GeometryHandle::ZERO;
        match self.upload_buckets(packed, &mut handle) {
            Ok(()) => Ok(handle),
            Err(err) => {
                if let Err(release_err) = self.release(handle) {
                    tracing::warn!("Failed to release partial upload: {}", release_err);
                }
                Err(err)
            }
        }
    }

    fn upload_buckets(
        &mut self,
        packed: &PackedGeometry,
        handle: &mut GeometryHandle,
    ) -> Result<(), RenderError> {
        handle.triangles = self.upload_bucket("Triangles", packed.triangle_vertices())?;
        handle.quads = self.upload_bucket("Quads", packed.quad_vertices())?;
        handle.lines = self.upload_bucket("Lines", packed.line_vertices())?;
        handle.points = self.upload_bucket("Points", packed.point_vertices())?;
        Ok(())
    }

    fn upload_bucket(
        &mut self,
        label: &str,
        vertices: &[Vertex],
    ) -> Result<BucketBuffer, RenderError> {
        if vertices.is_empty() {
            return Ok(BucketBuffer::EMPTY);
        }
        let vertex_count = u32::try_from(vertices.len()).map_err(|_| {
            RenderError::ResourceCreation(format!("{} vertices in one bucket", vertices.len()))
        })?;

        let buffer = self
            .context
            .backend_mut()
            .create_vertex_buffer(label, bytemuck::cast_slice(vertices))?;

        Ok(BucketBuffer {
            buffer: Some(buffer),
            vertex_count,
        })
    }

    /// Frees the buffers of a handle that is no longer drawn. Every buffer is
    /// attempted; the first failure is returned.
    pub fn release(&mut self, handle: GeometryHandle) -> Result<(), RenderError> {
        self.context.assert_current();

        let backend = self.context.backend_mut();
        let mut result = Ok(());
        for buffer in handle.buffers() {
            if let Err(err) = backend.destroy_buffer(buffer) {
                tracing::warn!("Failed to destroy buffer {:?}: {}", buffer, err);
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }
        result
    }

    /// Packs, interleaves and uploads one geometry source.
    pub fn collect<S: GeometrySource>(&mut self, source: &S) -> Result<RenderGeometry, RenderError> {
        let packed = source.collect(&self.config.interleave_options());
        self.build(&packed)
    }

    /// Packs each part on its own and uploads the concatenation as one
    /// geometry. The envelope is the union of the parts' envelopes.
    pub fn collect_parts(
        &mut self,
        parts: &[&dyn GeometrySource],
    ) -> Result<RenderGeometry, RenderError> {
        let options = self.config.interleave_options();
        let packs: Vec<PackedGeometry> = parts.iter().map(|part| part.collect(&options)).collect();
        let merged = PackedGeometry::merge(&packs);

        Ok(RenderGeometry {
            handle: self.upload(&merged)?,
            bounding_box: packs
                .iter()
                .map(PackedGeometry::bounding_box)
                .filter(|bounds| !bounds.is_zero())
                .reduce(BoundingBox::union)
                .unwrap_or(BoundingBox::ZERO),
            coloring: packs.iter().any(PackedGeometry::coloring),
            texturing: packs.iter().any(PackedGeometry::texturing),
        })
    }

    fn build(&mut self, packed: &PackedGeometry) -> Result<RenderGeometry, RenderError> {
        Ok(RenderGeometry {
            handle: self.upload(packed)?,
            bounding_box: packed.bounding_box(),
            coloring: packed.coloring(),
            texturing: packed.texturing(),
        })
    }

    /// Collects every `S` node marked with [`RebuildGeometry`], replacing and
    /// releasing any geometry it rendered before. Returns the number of
    /// nodes rebuilt.
    pub fn prepare_geometry<S>(&mut self, world: &mut World) -> Result<usize, RenderError>
    where
        S: GeometrySource + Component,
    {
        if !self.config.runtime_presentation {
            return Ok(0);
        }

        let options = self.config.interleave_options();
        let pending: Vec<_> = world
            .query::<(&S, Option<&RenderGeometry>)>()
            .with::<&RebuildGeometry>()
            .iter()
            .map(|(entity, (node, previous))| {
                (entity, node.collect(&options), previous.map(|g| g.handle))
            })
            .collect();

        let mut commands = CommandBuffer::new();
        let mut rebuilt = 0;
        let result = pending
            .into_iter()
            .try_for_each(|(entity, packed, previous)| -> Result<(), RenderError> {
                if let Some(previous) = previous {
                    self.release(previous)?;
                    commands.remove_one::<RenderGeometry>(entity);
                }
                let geometry = self.build(&packed)?;
                tracing::debug!(
                    "Collected {:?}: {} triangle, {} quad, {} line, {} point vertices, bounds {:?}..{:?}",
                    entity,
                    packed.triangle_vertices().len(),
                    packed.quad_vertices().len(),
                    packed.line_vertices().len(),
                    packed.point_vertices().len(),
                    geometry.bounding_box.min,
                    geometry.bounding_box.max
                );
                commands.insert_one(entity, geometry);
                commands.remove_one::<RebuildGeometry>(entity);
                rebuilt += 1;
                Ok(())
            });

        world.run_commands(&mut commands);
        result.map(|()| rebuilt)
    }

    /// Releases a node's geometry and removes the node.
    pub fn despawn(&mut self, world: &mut World, entity: Entity) -> Result<(), RenderError> {
        if let Ok(geometry) = world.remove_one::<RenderGeometry>(entity) {
            self.release(geometry.handle)?;
        }
        if world.despawn(entity).is_err() {
            tracing::warn!("Tried to despawn missing node {:?}", entity);
        }
        Ok(())
    }
}

/// Schedules a node for re-collection on the next pass.
pub fn mark_for_rebuild(world: &mut World, entity: Entity) -> Result<(), NoSuchEntity> {
    world.insert_one(entity, RebuildGeometry)
}
