use clap::{Parser, ValueEnum};
use facet_ecs::World;
use facet_render::{
    backend::HeadlessBackend, PolygonPolicy, RenderConfig, RenderGeometry, Renderer,
};
use facet_scene::{
    collect_geometry, spawn_geometry_def, Color, ColorRgba, Coordinate, IndexedFaceSet,
    IndexedLineSet, IndexedTriangleSet, LineSet, PointSet, Profile, Providers, SceneHeader,
    TextureCoordinate,
};
use glam::{Vec2, Vec3};
use std::{error::Error, sync::Arc};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolygonArg {
    Drop,
    Fan,
}

/// Packs a sample scene into vertex buffers and reports what was built.
#[derive(Debug, Parser)]
#[command(name = "facet", version)]
struct Args {
    /// Handling of faces with more than four vertices.
    #[arg(long, value_enum, default_value = "drop")]
    polygon_policy: PolygonArg,

    /// Skip bounding box computation.
    #[arg(long)]
    no_bounds: bool,

    /// Disable geometry presentation.
    #[arg(long)]
    no_presentation: bool,

    /// Present geometry without running behaviors.
    #[arg(long)]
    loader_only: bool,
}

impl Args {
    fn config(&self) -> RenderConfig {
        RenderConfig {
            runtime_presentation: !self.no_presentation,
            loader_only: self.loader_only,
            polygon_policy: match self.polygon_policy {
                PolygonArg::Drop => PolygonPolicy::Drop,
                PolygonArg::Fan => PolygonPolicy::Fan,
            },
            compute_bounds: !self.no_bounds,
            ..Default::default()
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = args.config();
    tracing::info!(
        "Presentation {}, behaviors {}",
        config.runtime_presentation,
        config.executes_behaviors()
    );

    let header = SceneHeader {
        version: Some(3.3),
        profile: Profile::Interchange,
    };
    header.validate();

    let mut world = World::new();
    let mut renderer = Renderer::new(HeadlessBackend::new(), config);
    build_scene(&mut world);

    let rebuilt = collect_geometry(&mut renderer, &mut world)?;
    tracing::info!("Collected {} geometry nodes", rebuilt);

    for name in ["Box", "Roof", "Fan", "Outline", "Axis", "Stars"] {
        let Some(entity) = world.lookup_def(name) else {
            continue;
        };
        let Ok(geometry) = world.component::<RenderGeometry>(entity) else {
            continue;
        };
        let handle = geometry.handle;
        tracing::info!(
            "{}: triangles {}, quads {}, lines {}, points {}, bounds {:?}..{:?}, coloring {}, texturing {}",
            name,
            handle.triangles.vertex_count,
            handle.quads.vertex_count,
            handle.lines.vertex_count,
            handle.points.vertex_count,
            geometry.bounding_box.min,
            geometry.bounding_box.max,
            geometry.coloring,
            geometry.texturing
        );
    }

    tracing::info!(
        "{} vertex buffers resident",
        renderer.context().backend().live_buffers()
    );
    Ok(())
}

fn build_scene(world: &mut World) {
    let box_points = Arc::new(Coordinate {
        point: vec![
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
        ],
    });
    let face_colors = Arc::new(Color {
        color: vec![
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, //
            0.0, 0.0, 1.0, //
        ],
    });

    spawn_geometry_def(
        world,
        "Box",
        IndexedFaceSet {
            providers: Providers::new(box_points.clone())
                .with_color(face_colors)
                .with_tex_coord(Arc::new(TextureCoordinate {
                    point: vec![Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y],
                })),
            coord_index: vec![
                0, 1, 2, 3, -1, //
                4, 5, 6, 7, -1, //
                0, 1, 5, 4, -1, //
                3, 2, 6, 7, -1, //
                0, 3, 7, 4, -1, //
                1, 2, 6, 5, -1,
            ],
            // Indexed by stream position; a face takes the entry at its first vertex.
            color_index: vec![
                0, 0, 0, 0, -1, //
                1, 1, 1, 1, -1, //
                2, 2, 2, 2, -1, //
                0, 0, 0, 0, -1, //
                1, 1, 1, 1, -1, //
                2, 2, 2, 2, -1,
            ],
            tex_coord_index: vec![
                0, 1, 2, 3, -1, //
                0, 1, 2, 3, -1, //
                0, 1, 2, 3, -1, //
                0, 1, 2, 3, -1, //
                0, 1, 2, 3, -1, //
                0, 1, 2, 3, -1,
            ],
            color_per_vertex: false,
        },
    );

    spawn_geometry_def(
        world,
        "Roof",
        IndexedTriangleSet {
            providers: Providers::new(Arc::new(Coordinate {
                point: vec![
                    Vec3::new(-1.0, 1.0, -1.0),
                    Vec3::new(1.0, 1.0, -1.0),
                    Vec3::new(0.0, 2.0, 0.0),
                    Vec3::new(1.0, 1.0, 1.0),
                    Vec3::new(-1.0, 1.0, 1.0),
                ],
            }))
            .with_color_rgba(Arc::new(ColorRgba {
                color: vec![0.6, 0.3, 0.1, 1.0],
            })),
            index: vec![0, 1, 2, 1, 3, 2, 3, 4, 2, 4, 0, 2],
            color_per_vertex: false,
        },
    );

    spawn_geometry_def(
        world,
        "Fan",
        IndexedFaceSet {
            providers: Providers::new(Arc::new(Coordinate {
                point: (0..6)
                    .map(|i| {
                        let angle = i as f32 * std::f32::consts::TAU / 6.0;
                        Vec3::new(angle.cos() + 3.0, angle.sin(), 0.0)
                    })
                    .collect(),
            })),
            coord_index: vec![0, 1, 2, 3, 4, 5, -1],
            ..Default::default()
        },
    );

    spawn_geometry_def(
        world,
        "Outline",
        IndexedLineSet {
            providers: Providers::new(box_points),
            coord_index: vec![0, 1, 2, 3, 0, -1, 4, 5, 6, 7, 4],
            ..Default::default()
        },
    );

    spawn_geometry_def(
        world,
        "Axis",
        LineSet {
            providers: Providers::new(Arc::new(Coordinate {
                point: vec![
                    Vec3::ZERO,
                    Vec3::X * 2.0,
                    Vec3::ZERO,
                    Vec3::Y * 2.0,
                    Vec3::ZERO,
                    Vec3::Z * 2.0,
                ],
            })),
            vertex_count: None,
        },
    );

    spawn_geometry_def(
        world,
        "Stars",
        PointSet {
            providers: Providers::new(Arc::new(Coordinate {
                point: (0..16)
                    .map(|i| Vec3::new(i as f32 * 0.5 - 4.0, 3.0, (i % 4) as f32))
                    .collect(),
            })),
        },
    );
}
