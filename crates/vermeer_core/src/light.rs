//! Scene light sources.
//!
//! The set of light kinds is fixed, so they form a closed sum type that
//! the integrator matches exhaustively.

use glam::Vec3;

use crate::Color;

/// A light concentrated at a single position.
#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Color,
}

/// A line-segment light; position and emitted color interpolate linearly
/// between the two endpoints.
#[derive(Debug, Clone, Copy)]
pub struct SegmentLight {
    pub endpoint0: Vec3,
    pub endpoint1: Vec3,
    pub color0: Color,
    pub color1: Color,
}

/// A parallelogram light spanned by two edge vectors from `v0`.
///
/// Corner colors in sample space: `color0` at (0,0), `color1` at (0,1),
/// `color2` at (1,0), `color3` at (1,1).
#[derive(Debug, Clone, Copy)]
pub struct ParallelogramLight {
    pub v0: Vec3,
    pub edge01: Vec3,
    pub edge02: Vec3,
    pub color0: Color,
    pub color1: Color,
    pub color2: Color,
    pub color3: Color,
}

/// Any light the renderer can integrate over.
#[derive(Debug, Clone, Copy)]
pub enum Light {
    Point(PointLight),
    Segment(SegmentLight),
    Parallelogram(ParallelogramLight),
}
