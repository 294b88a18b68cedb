//! Ray casting and screen-rectangle selection against document entities

use glam::{Vec2, Vec3};
use shared::{EntityId, Geometry};

use super::tessellate::outline_points;
use super::view_state::ViewportState;
use crate::state::document::Document;

/// A ray in 3D space (direction is unit length)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Default for Ray {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            direction: Vec3::NEG_Z,
        }
    }
}

impl Ray {
    /// None if `direction` is zero
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        Some(Self {
            origin,
            direction: direction.try_normalize()?,
        })
    }

    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + t * self.direction
    }

    /// Ray parameter of the orthogonal projection of `p` (may be negative)
    pub fn project_point(&self, p: Vec3) -> f32 {
        (p - self.origin).dot(self.direction)
    }

    /// Closest point on the ray (not behind the origin)
    pub fn closest_point_to(&self, p: Vec3) -> Vec3 {
        self.point_at(self.project_point(p).max(0.0))
    }

    pub fn distance_to_point(&self, p: Vec3) -> f32 {
        p.distance(self.closest_point_to(p))
    }

    /// Hit point and ray parameter, rejecting parallel planes and hits behind
    pub fn intersect_plane(&self, point: Vec3, normal: Vec3) -> Option<(Vec3, f32)> {
        let denom = normal.dot(self.direction);
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = (point - self.origin).dot(normal) / denom;
        if t < 0.0 {
            return None;
        }
        Some((self.point_at(t), t))
    }

    /// Point on the segment closest to the ray, if within `threshold`
    pub fn intersect_line_segment(&self, a: Vec3, b: Vec3, threshold: f32) -> Option<Vec3> {
        let seg = b - a;
        let len = seg.length();
        if len < 1e-6 {
            return (self.distance_to_point(a) < threshold).then_some(a);
        }
        let seg_dir = seg / len;

        let w0 = self.origin - a;
        let bb = self.direction.dot(seg_dir);
        let d = self.direction.dot(w0);
        let e = seg_dir.dot(w0);
        // both directions are unit length
        let denom = 1.0 - bb * bb;
        if denom.abs() < 1e-6 {
            return (self.distance_to_point(a) < threshold).then_some(a);
        }

        let tc = ((e - bb * d) / denom).clamp(0.0, len);
        let on_segment = a + tc * seg_dir;
        let on_ray = self.closest_point_to(on_segment);
        (on_ray.distance(on_segment) < threshold).then_some(on_segment)
    }

    /// Slab test. Returns the entry point and parameter (0 if the origin is inside).
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<(Vec3, f32)> {
        let mut tmin = 0.0_f32;
        let mut tmax = f32::MAX;
        for i in 0..3 {
            let o = self.origin[i];
            let d = self.direction[i];
            if d.abs() < 1e-6 {
                if o < aabb.min[i] || o > aabb.max[i] {
                    return None;
                }
                continue;
            }
            let mut t1 = (aabb.min[i] - o) / d;
            let mut t2 = (aabb.max[i] - o) / d;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            tmin = tmin.max(t1);
            tmax = tmax.min(t2);
            if tmin > tmax {
                return None;
            }
        }
        Some((self.point_at(tmin), tmin))
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center_size(center: Vec3, size: f32) -> Self {
        let half = Vec3::splat(size * 0.5);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let first = *points.first()?;
        Some(points.iter().fold(
            Self {
                min: first,
                max: first,
            },
            |acc, p| Self {
                min: acc.min.min(*p),
                max: acc.max.max(*p),
            },
        ))
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

// ── Single-point picking ─────────────────────────────────────

/// One ray hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub id: EntityId,
    pub point: Vec3,
    /// Distance from the ray origin to `point`
    pub distance: f32,
}

/// Hit point of a ray against one geometry
pub fn intersect_geometry(ray: &Ray, geometry: &Geometry, threshold: f32) -> Option<Vec3> {
    match geometry {
        Geometry::Line { p0, p1 } => ray.intersect_line_segment(*p0, *p1, threshold),
        Geometry::Polyline { points, closed } => {
            let closing = closed.then(|| (points.last(), points.first()));
            points
                .windows(2)
                .map(|w| (&w[0], &w[1]))
                .chain(closing.and_then(|(a, b)| Some((a?, b?))))
                .filter_map(|(a, b)| ray.intersect_line_segment(*a, *b, threshold))
                .min_by(|a, b| {
                    ray.origin
                        .distance_squared(*a)
                        .total_cmp(&ray.origin.distance_squared(*b))
                })
        }
        Geometry::Circle { center, radius } => intersect_ring(ray, *center, *radius, threshold),
        // Not limited to the angular span yet; behaves like the full circle.
        Geometry::Arc { center, radius, .. } => intersect_ring(ray, *center, *radius, threshold),
        Geometry::Box { center, size } => ray
            .intersect_aabb(&Aabb::from_center_size(*center, *size))
            .map(|(p, _)| p),
    }
}

/// Ring of radius `radius` in the plane z = center.z
fn intersect_ring(ray: &Ray, center: Vec3, radius: f32, threshold: f32) -> Option<Vec3> {
    let (p, _) = ray.intersect_plane(center, Vec3::Z)?;
    let d = p.truncate().distance(center.truncate());
    ((d - radius).abs() < threshold).then_some(p)
}

/// Every visible entity hit by the ray, nearest first
pub fn pick_all(ray: &Ray, doc: &Document, threshold: f32) -> Vec<PickHit> {
    let mut hits: Vec<PickHit> = doc
        .all()
        .into_iter()
        .filter(|e| e.visible)
        .filter_map(|e| {
            let point = intersect_geometry(ray, &e.geometry, threshold)?;
            Some(PickHit {
                id: e.id,
                point,
                distance: ray.origin.distance(point),
            })
        })
        .collect();
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

/// Nearest visible entity hit by the ray
pub fn pick(ray: &Ray, doc: &Document, threshold: f32) -> Option<PickHit> {
    pick_all(ray, doc, threshold).into_iter().next()
}

/// Pick through a pixel of the viewport
pub fn pick_at_screen(
    x: f32,
    y: f32,
    doc: &Document,
    viewport: &ViewportState,
    threshold: f32,
) -> Option<PickHit> {
    let ray = viewport.screen_ray(x, y)?;
    pick(&ray, doc, threshold)
}

// ── Box selection ────────────────────────────────────────────

/// How a selection rectangle admits entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxSelectMode {
    /// Every sampled point must lie inside (left-to-right drag)
    #[default]
    Contain,
    /// Any sampled point inside, or a segment's screen bounds overlapping
    Intersect,
}

/// Screen-space rectangle in pixels, normalized so min <= max
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl ScreenRect {
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    pub fn overlaps(&self, other: &ScreenRect) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }
}

/// Entities admitted by a screen rectangle, in ascending id order
pub fn pick_box(
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
    doc: &Document,
    viewport: &ViewportState,
    mode: BoxSelectMode,
) -> Vec<EntityId> {
    let rect = ScreenRect::from_corners(Vec2::new(min_x, min_y), Vec2::new(max_x, max_y));
    doc.all()
        .into_iter()
        .filter(|e| e.visible)
        .filter(|e| box_admits(&e.geometry, &rect, viewport, mode))
        .map(|e| e.id)
        .collect()
}

fn box_admits(geometry: &Geometry, rect: &ScreenRect, viewport: &ViewportState, mode: BoxSelectMode) -> bool {
    let screen: Vec<Option<Vec2>> = outline_points(geometry, viewport.world_per_pixel)
        .into_iter()
        .map(|p| viewport.try_world_to_screen(p))
        .collect();
    let inside = |s: &Option<Vec2>| s.is_some_and(|s| rect.contains(s));

    match mode {
        BoxSelectMode::Contain => !screen.is_empty() && screen.iter().all(inside),
        BoxSelectMode::Intersect => {
            if screen.iter().any(inside) {
                return true;
            }
            let closed = matches!(geometry, Geometry::Polyline { closed: true, .. });
            match geometry {
                Geometry::Line { .. } | Geometry::Polyline { .. } => {
                    segment_bounds_overlap(&screen, closed, rect)
                }
                _ => false,
            }
        }
    }
}

/// Any projected segment whose screen bounding box overlaps the rectangle
fn segment_bounds_overlap(screen: &[Option<Vec2>], closed: bool, rect: &ScreenRect) -> bool {
    let closing = if closed && screen.len() > 2 {
        Some((screen[screen.len() - 1], screen[0]))
    } else {
        None
    };
    screen
        .windows(2)
        .map(|w| (w[0], w[1]))
        .chain(closing)
        .any(|pair| match pair {
            (Some(a), Some(b)) => ScreenRect::from_corners(a, b).overlaps(rect),
            _ => false,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::camera::{Camera, CameraMode};
    use shared::Style;

    fn down_ray(x: f32, y: f32) -> Ray {
        Ray::new(Vec3::new(x, y, 5.0), Vec3::NEG_Z).unwrap()
    }

    /// 800x600 top view, half-height 5, centered on the origin
    fn top_viewport() -> ViewportState {
        let mut cam = Camera::new(CameraMode::Orbit);
        cam.set_2d_mode(true);
        cam.set_orbit_params(5.0, 90.0, 0.0);
        let mut vp = ViewportState::default();
        vp.refresh(&cam, 800.0, 600.0);
        vp
    }

    #[test]
    fn test_pick_line_midpoint() {
        let mut doc = Document::new();
        let id = doc.add_line(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Style::default());
        let ray = down_ray(0.0, 0.0);
        let hit = pick(&ray, &doc, 0.05).unwrap();
        assert_eq!(hit.id, id);
        assert!((hit.distance - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_pick_misses_outside_threshold() {
        let mut doc = Document::new();
        doc.add_line(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Style::default());
        assert!(pick(&down_ray(0.0, 0.2), &doc, 0.1).is_none());
        assert!(pick(&down_ray(1.5, 0.0), &doc, 0.1).is_none());
    }

    #[test]
    fn test_pick_closed_polyline_closing_segment() {
        let mut doc = Document::new();
        let pts = vec![Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y];
        let closed = doc.add_polyline(pts.clone(), true, Style::default());
        // midpoint of the closing segment (0,1)-(0,0)
        let ray = down_ray(0.0, 0.5);
        assert_eq!(pick(&ray, &doc, 0.05).map(|h| h.id), Some(closed));

        let mut open_doc = Document::new();
        open_doc.add_polyline(pts, false, Style::default());
        assert!(pick(&ray, &open_doc, 0.05).is_none());
    }

    #[test]
    fn test_pick_circle_rim_only() {
        let mut doc = Document::new();
        let id = doc.add_circle(Vec3::ZERO, 1.5, Style::default());
        assert_eq!(pick(&down_ray(1.5, 0.0), &doc, 0.05).map(|h| h.id), Some(id));
        assert!(pick(&down_ray(0.0, 0.0), &doc, 0.05).is_none());
    }

    #[test]
    fn test_pick_arc_matches_full_circle() {
        let mut doc = Document::new();
        let id = doc.add_arc(Vec3::ZERO, 1.0, 0.0, std::f32::consts::FRAC_PI_2, Style::default());
        // opposite side of the arc's span is still accepted
        assert_eq!(pick(&down_ray(-1.0, 0.0), &doc, 0.05).map(|h| h.id), Some(id));
    }

    #[test]
    fn test_pick_box_slab() {
        let mut doc = Document::new();
        let id = doc.add_box(Vec3::ZERO, 2.0, Style::default());
        let hit = pick(&down_ray(0.5, 0.5), &doc, 0.01).unwrap();
        assert_eq!(hit.id, id);
        assert!((hit.point.z - 1.0).abs() < 1e-5);
        assert!(pick(&down_ray(1.5, 0.0), &doc, 0.01).is_none());
    }

    #[test]
    fn test_pick_all_sorted_and_skips_hidden() {
        let mut doc = Document::new();
        let low = doc.add_line(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Style::default());
        let high = doc.add_line(Vec3::new(-1.0, 0.0, 2.0), Vec3::new(1.0, 0.0, 2.0), Style::default());
        let hidden = doc.add_line(Vec3::new(-1.0, 0.0, 3.0), Vec3::new(1.0, 0.0, 3.0), Style::default());
        doc.set_visible(hidden, false);

        let hits = pick_all(&down_ray(0.0, 0.0), &doc, 0.05);
        let ids: Vec<EntityId> = hits.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![high, low]);
    }

    #[test]
    fn test_ray_parallel_plane_is_none() {
        let ray = Ray::new(Vec3::Z, Vec3::X).unwrap();
        assert!(ray.intersect_plane(Vec3::ZERO, Vec3::Z).is_none());
        assert!(Ray::new(Vec3::ZERO, Vec3::ZERO).is_none());
    }

    #[test]
    fn test_degenerate_segment_acts_as_point() {
        let ray = down_ray(0.0, 0.0);
        assert_eq!(ray.intersect_line_segment(Vec3::ZERO, Vec3::ZERO, 0.1), Some(Vec3::ZERO));
        assert!(ray.intersect_line_segment(Vec3::X, Vec3::X, 0.1).is_none());
    }

    #[test]
    fn test_pick_at_screen_center() {
        let vp = top_viewport();
        let mut doc = Document::new();
        let id = doc.add_line(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Style::default());
        let hit = pick_at_screen(400.0, 300.0, &doc, &vp, vp.world_per_pixel * 4.0);
        assert_eq!(hit.map(|h| h.id), Some(id));
    }

    #[test]
    fn test_pick_box_contain_then_shrink() {
        let vp = top_viewport();
        let mut doc = Document::new();
        let square = doc.add_polyline(
            vec![
                Vec3::new(-2.0, -2.0, 0.0),
                Vec3::new(2.0, -2.0, 0.0),
                Vec3::new(2.0, 2.0, 0.0),
                Vec3::new(-2.0, 2.0, 0.0),
            ],
            true,
            Style::default(),
        );
        // the square spans x 280..520, y 180..420 on screen
        let full = pick_box(250.0, 150.0, 550.0, 450.0, &doc, &vp, BoxSelectMode::Contain);
        assert_eq!(full, vec![square]);

        let contain = pick_box(250.0, 150.0, 500.0, 450.0, &doc, &vp, BoxSelectMode::Contain);
        assert!(contain.is_empty());
        let intersect = pick_box(250.0, 150.0, 500.0, 450.0, &doc, &vp, BoxSelectMode::Intersect);
        assert_eq!(intersect, vec![square]);
    }

    #[test]
    fn test_pick_box_intersect_line_crossing() {
        let vp = top_viewport();
        let mut doc = Document::new();
        let id = doc.add_line(Vec3::new(-4.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 0.0), Style::default());
        // both endpoints outside, the segment crosses the rectangle
        let hits = pick_box(380.0, 280.0, 420.0, 320.0, &doc, &vp, BoxSelectMode::Intersect);
        assert_eq!(hits, vec![id]);
        let hits = pick_box(380.0, 280.0, 420.0, 320.0, &doc, &vp, BoxSelectMode::Contain);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_pick_box_swapped_corners() {
        let vp = top_viewport();
        let mut doc = Document::new();
        let id = doc.add_circle(Vec3::ZERO, 1.0, Style::default());
        let hits = pick_box(600.0, 500.0, 200.0, 100.0, &doc, &vp, BoxSelectMode::Contain);
        assert_eq!(hits, vec![id]);
    }

    #[test]
    fn test_aabb_from_points() {
        let bb = Aabb::from_points(&[Vec3::ONE, Vec3::NEG_ONE, Vec3::new(0.0, 2.0, 0.0)]).unwrap();
        assert_eq!(bb.min, Vec3::NEG_ONE);
        assert_eq!(bb.max, Vec3::new(1.0, 2.0, 1.0));
        assert!(bb.contains(Vec3::ZERO));
        assert!(Aabb::from_points(&[]).is_none());
    }
}
