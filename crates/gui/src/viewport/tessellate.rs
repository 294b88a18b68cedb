//! CPU-side geometry for GPU batches and zoom-adaptive curve tessellation

use std::f32::consts::TAU;

use glam::Vec3;
use shared::{Entity, Geometry};

/// Segment limits for full circles
pub const CIRCLE_SEGMENTS: (u32, u32) = (8, 360);
/// Segment limits for arcs
pub const ARC_SEGMENTS: (u32, u32) = (2, 360);

/// How a batch's vertices are assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    LineList,
    LineStrip,
    TriangleList,
}

/// Tessellated geometry of one entity, ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct BatchData {
    /// 3 floats per vertex
    pub vertices: Vec<f32>,
    /// Empty for non-indexed topologies
    pub indices: Vec<u32>,
    pub topology: Topology,
    /// 0xRRGGBBAA
    pub rgba: u32,
}

impl BatchData {
    fn from_points(points: &[Vec3], topology: Topology, rgba: u32) -> Self {
        Self {
            vertices: points.iter().flat_map(|p| p.to_array()).collect(),
            indices: Vec::new(),
            topology,
            rgba,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn is_indexed(&self) -> bool {
        !self.indices.is_empty()
    }

    /// Number of elements a draw call consumes
    pub fn draw_count(&self) -> usize {
        if self.is_indexed() {
            self.indices.len()
        } else {
            self.vertex_count()
        }
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.vertices.chunks_exact(3).map(Vec3::from_slice)
    }
}

// ── Adaptive segment count ───────────────────────────────

/// Segments needed so the chord deviation of a curve with radius `r`
/// spanning `span` radians stays within `eps`.
pub fn segments_for_radius(r: f32, eps: f32, span: f32, limits: (u32, u32)) -> u32 {
    let (min, max) = limits;
    if r < 1e-6 {
        return CIRCLE_SEGMENTS.0.clamp(min, max);
    }
    // sagitta r·(1 − cos(θ/2)) <= eps
    let mut theta_max = 2.0 * (1.0 - eps / r).max(0.0).acos();
    if theta_max.is_nan() || theta_max <= 0.0 {
        theta_max = 0.1;
    }
    let n = (span / theta_max).ceil();
    if n.is_finite() {
        (n.max(0.0) as u32).clamp(min, max)
    } else {
        max
    }
}

/// Counter-clockwise span from `start` to `end`, folded into [0, 2π]
pub fn normalized_span(start: f32, end: f32) -> f32 {
    let span = end - start;
    if (0.0..=TAU).contains(&span) {
        return span;
    }
    let folded = span.rem_euclid(TAU);
    if span > TAU && folded == 0.0 {
        TAU
    } else {
        folded
    }
}

/// Closed ring of `n` points (the first point is not repeated)
pub fn tessellate_circle(center: Vec3, radius: f32, eps: f32) -> Vec<Vec3> {
    let n = segments_for_radius(radius, eps, TAU, CIRCLE_SEGMENTS);
    (0..n)
        .map(|i| {
            let t = i as f32 / n as f32 * TAU;
            center + Vec3::new(radius * t.cos(), radius * t.sin(), 0.0)
        })
        .collect()
}

/// Open strip of `n + 1` points from `start` counter-clockwise to `end`
pub fn tessellate_arc(center: Vec3, radius: f32, start: f32, end: f32, eps: f32) -> Vec<Vec3> {
    let span = normalized_span(start, end);
    let n = segments_for_radius(radius, eps, span, ARC_SEGMENTS);
    (0..=n)
        .map(|i| {
            let t = start + span * (i as f32 / n as f32);
            center + Vec3::new(radius * t.cos(), radius * t.sin(), 0.0)
        })
        .collect()
}

// ── Box ──────────────────────────────────────────────────

/// Cube corners: bottom face (z−) counter-clockwise, then top face (z+)
pub fn box_corners(center: Vec3, size: f32) -> [Vec3; 8] {
    let h = size * 0.5;
    [
        Vec3::new(-h, -h, -h),
        Vec3::new(h, -h, -h),
        Vec3::new(h, h, -h),
        Vec3::new(-h, h, -h),
        Vec3::new(-h, -h, h),
        Vec3::new(h, -h, h),
        Vec3::new(h, h, h),
        Vec3::new(-h, h, h),
    ]
    .map(|c| center + c)
}

/// 12 outward-facing triangles over `box_corners`
pub const BOX_INDICES: [u32; 36] = [
    0, 3, 2, 0, 2, 1, // -Z
    4, 5, 6, 4, 6, 7, // +Z
    0, 1, 5, 0, 5, 4, // -Y
    3, 7, 6, 3, 6, 2, // +Y
    0, 4, 7, 0, 7, 3, // -X
    1, 2, 6, 1, 6, 5, // +X
];

// ── Entity → batch ───────────────────────────────────────

/// Allowed chord deviation: half a pixel
pub fn chord_tolerance(world_per_pixel: f32) -> f32 {
    world_per_pixel * 0.5
}

/// Build upload data for an entity. None if the geometry has nothing to draw.
pub fn build_batch(entity: &Entity, world_per_pixel: f32, rgba: u32) -> Option<BatchData> {
    let eps = chord_tolerance(world_per_pixel);
    let batch = match &entity.geometry {
        Geometry::Line { p0, p1 } => BatchData::from_points(&[*p0, *p1], Topology::LineList, rgba),
        Geometry::Polyline { points, closed } => polyline_batch(points, *closed, rgba)?,
        Geometry::Circle { center, radius } => {
            polyline_batch(&tessellate_circle(*center, *radius, eps), true, rgba)?
        }
        Geometry::Arc {
            center,
            radius,
            start_angle,
            end_angle,
        } => polyline_batch(
            &tessellate_arc(*center, *radius, *start_angle, *end_angle, eps),
            false,
            rgba,
        )?,
        Geometry::Box { center, size } => {
            let mut batch =
                BatchData::from_points(&box_corners(*center, *size), Topology::TriangleList, rgba);
            batch.indices = BOX_INDICES.to_vec();
            batch
        }
    };
    Some(batch)
}

fn polyline_batch(points: &[Vec3], closed: bool, rgba: u32) -> Option<BatchData> {
    if points.len() < 2 {
        return None;
    }
    let mut batch = BatchData::from_points(points, Topology::LineStrip, rgba);
    if closed {
        batch.vertices.extend_from_slice(&points[0].to_array());
    }
    Some(batch)
}

/// Representative points of an entity for screen-space containment tests
pub fn outline_points(geometry: &Geometry, world_per_pixel: f32) -> Vec<Vec3> {
    let eps = chord_tolerance(world_per_pixel);
    match geometry {
        Geometry::Line { p0, p1 } => vec![*p0, *p1],
        Geometry::Polyline { points, .. } => points.clone(),
        Geometry::Circle { center, radius } => tessellate_circle(*center, *radius, eps),
        Geometry::Arc {
            center,
            radius,
            start_angle,
            end_angle,
        } => tessellate_arc(*center, *radius, *start_angle, *end_angle, eps),
        Geometry::Box { center, size } => box_corners(*center, *size).to_vec(),
    }
}
