//! Zoom-adaptive ground grid and world axes
//!
//! Both are rebuilt every frame and drawn through the renderer's transient
//! line calls, so nothing here owns GPU resources.

use glam::{Vec2, Vec3};

use super::view_state::ViewportState;

/// Desired on-screen spacing between minor lines
pub const TARGET_SPACING_PX: f32 = 80.0;

/// Grid plane sits slightly below z = 0 so entities drawn on it stay on top
pub const GRID_Z: f32 = -0.01;

/// Upper bound on lines per direction
const MAX_LINES: i64 = 1000;

/// Minor grid step for the given zoom: `TARGET_SPACING_PX` pixels rounded to
/// the nearest of {1, 2, 5, 10} × 10^k.
pub fn choose_minor_step(world_per_pixel: f32) -> f32 {
    choose_step(world_per_pixel, TARGET_SPACING_PX)
}

pub fn choose_step(world_per_pixel: f32, target_px: f32) -> f32 {
    let step = target_px * world_per_pixel;
    if !step.is_finite() || step <= 0.0 {
        return 1.0;
    }
    let base = 10f32.powi(step.log10().floor() as i32);
    let scaled = step / base;
    let nice = if scaled < 1.5 {
        1.0
    } else if scaled < 3.5 {
        2.0
    } else if scaled < 7.5 {
        5.0
    } else {
        10.0
    };
    nice * base
}

/// Axis-aligned world rectangle covered by the viewport on the plane z = `z`
pub fn world_rect_on_plane(viewport: &ViewportState, z: f32) -> Option<(Vec2, Vec2)> {
    let corners = [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)]
        .map(|(x, y)| viewport.ndc_to_world(x, y, z).truncate());
    let min = corners.iter().copied().reduce(Vec2::min)?;
    let max = corners.iter().copied().reduce(Vec2::max)?;
    (min.is_finite() && max.is_finite()).then_some((min, max))
}

/// Line-list vertices for one frame of the grid
#[derive(Debug, Clone, Default)]
pub struct GridLines {
    pub minor: Vec<Vec3>,
    pub major: Vec<Vec3>,
    pub minor_step: f32,
}

impl GridLines {
    pub fn line_count(&self) -> usize {
        (self.minor.len() + self.major.len()) / 2
    }
}

/// Grid covering the visible part of z = 0; every `major_every`-th line is major
pub fn grid_segments(viewport: &ViewportState, target_px: f32, major_every: u32) -> GridLines {
    let Some((min, max)) = world_rect_on_plane(viewport, 0.0) else {
        return GridLines::default();
    };
    let step = choose_step(viewport.world_per_pixel, target_px);
    let major_every = i64::from(major_every.max(1));
    let focus = viewport.focus.truncate();

    let mut grid = GridLines {
        minor_step: step,
        ..Default::default()
    };

    // vertical lines (constant x), then horizontal (constant y)
    for (axis, lo, hi, center) in [(0, min.x, max.x, focus.x), (1, min.y, max.y, focus.y)] {
        let (first, last) = index_range(lo, hi, step, center);
        let (span_lo, span_hi) = if axis == 0 { (min.y, max.y) } else { (min.x, max.x) };
        for i in first..=last {
            let v = i as f32 * step;
            let (a, b) = if axis == 0 {
                (Vec3::new(v, span_lo, GRID_Z), Vec3::new(v, span_hi, GRID_Z))
            } else {
                (Vec3::new(span_lo, v, GRID_Z), Vec3::new(span_hi, v, GRID_Z))
            };
            let dst = if i.rem_euclid(major_every) == 0 {
                &mut grid.major
            } else {
                &mut grid.minor
            };
            dst.push(a);
            dst.push(b);
        }
    }
    grid
}

/// Line indices covering [lo, hi], capped around `center`
fn index_range(lo: f32, hi: f32, step: f32, center: f32) -> (i64, i64) {
    let mut first = (lo / step).floor() as i64;
    let mut last = (hi / step).ceil() as i64;
    if last - first > MAX_LINES {
        let mid = (center / step).round() as i64;
        first = first.max(mid - MAX_LINES / 2);
        last = last.min(mid + MAX_LINES / 2);
    }
    (first, last)
}

/// X, Y and Z axis segments from the origin
pub fn axis_segments(length: f32) -> [[Vec3; 2]; 3] {
    [
        [Vec3::ZERO, Vec3::X * length],
        [Vec3::ZERO, Vec3::Y * length],
        [Vec3::ZERO, Vec3::Z * length],
    ]
}
