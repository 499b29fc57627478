//! Child nodes that feed attribute data to a geometry node.

use glam::{Vec2, Vec3};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Coordinate {
    pub point: Vec<Vec3>,
}

/// Flat RGB triples.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Color {
    pub color: Vec<f32>,
}

/// Flat RGBA quadruples.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColorRgba {
    pub color: Vec<f32>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextureCoordinate {
    pub point: Vec<Vec2>,
}
