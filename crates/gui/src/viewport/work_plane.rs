//! Oriented reference plane for 2D operations inside 3D space

use glam::{Mat4, Quat, Vec2, Vec3};

/// Camera-follow behaviour, applied once per frame by the scene
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FollowMode {
    pub enabled: bool,
    /// Move the origin to the camera target
    pub follow_position: bool,
    /// Align the normal with the camera look direction
    pub follow_orientation: bool,
    /// Offset along the normal applied after following the target
    pub offset: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkPlane {
    origin: Vec3,
    normal: Vec3,
    x_axis: Vec3,
    y_axis: Vec3,
    pub follow: FollowMode,
}

impl Default for WorkPlane {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            normal: Vec3::Z,
            x_axis: Vec3::X,
            y_axis: Vec3::Y,
            follow: FollowMode::default(),
        }
    }
}

impl WorkPlane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn x_axis(&self) -> Vec3 {
        self.x_axis
    }

    pub fn y_axis(&self) -> Vec3 {
        self.y_axis
    }

    // ── Presets ──────────────────────────────────────────────

    pub fn set_xy(&mut self, z: f32) {
        self.set_axes(Vec3::new(0.0, 0.0, z), Vec3::Z, Vec3::X, Vec3::Y);
    }

    pub fn set_xz(&mut self, y: f32) {
        self.set_axes(Vec3::new(0.0, y, 0.0), Vec3::Y, Vec3::X, Vec3::Z);
    }

    pub fn set_yz(&mut self, x: f32) {
        self.set_axes(Vec3::new(x, 0.0, 0.0), Vec3::X, Vec3::Y, Vec3::Z);
    }

    fn set_axes(&mut self, origin: Vec3, normal: Vec3, x_axis: Vec3, y_axis: Vec3) {
        self.origin = origin;
        self.normal = normal;
        self.x_axis = x_axis;
        self.y_axis = y_axis;
    }

    /// Set from origin, normal and an in-plane x direction hint.
    /// Returns false (plane unchanged) if the normal is zero.
    pub fn set(&mut self, origin: Vec3, normal: Vec3, x_hint: Vec3) -> bool {
        let Some(normal) = normal.try_normalize() else {
            tracing::warn!("Work plane normal must be non-zero");
            return false;
        };
        self.origin = origin;
        self.normal = normal;
        match (x_hint - x_hint.dot(normal) * normal).try_normalize() {
            Some(x) => {
                self.x_axis = x;
                self.y_axis = normal.cross(x).normalize();
            }
            None => self.rebuild_axes(),
        }
        true
    }

    /// Plane through the camera target, facing along the view direction
    pub fn set_from_view(&mut self, _camera_pos: Vec3, camera_front: Vec3, camera_target: Vec3) {
        let Some(normal) = camera_front.try_normalize() else {
            return;
        };
        self.normal = normal;
        self.origin = camera_target;
        self.rebuild_axes();
        tracing::debug!(
            "Work plane set from view: origin={:?} normal={:?}",
            self.origin,
            self.normal
        );
    }

    // ── Coordinates ──────────────────────────────────────────

    /// Columns are [x_axis, y_axis, normal, origin]
    pub fn local_to_world_matrix(&self) -> Mat4 {
        Mat4::from_cols(
            self.x_axis.extend(0.0),
            self.y_axis.extend(0.0),
            self.normal.extend(0.0),
            self.origin.extend(1.0),
        )
    }

    pub fn world_to_local_matrix(&self) -> Mat4 {
        self.local_to_world_matrix().inverse()
    }

    /// In-plane (u, v) of a world point; the normal component is dropped
    pub fn world_to_local(&self, p: Vec3) -> Vec2 {
        let offset = p - self.origin;
        Vec2::new(offset.dot(self.x_axis), offset.dot(self.y_axis))
    }

    pub fn local_to_world(&self, uv: Vec2) -> Vec3 {
        self.origin + uv.x * self.x_axis + uv.y * self.y_axis
    }

    // ── Geometry ─────────────────────────────────────────────

    /// Signed distance along the normal
    pub fn distance_to_point(&self, p: Vec3) -> f32 {
        (p - self.origin).dot(self.normal)
    }

    pub fn project_point(&self, p: Vec3) -> Vec3 {
        p - self.distance_to_point(p) * self.normal
    }

    /// Hit point and ray parameter, or None if parallel or behind the origin
    pub fn ray_intersection(&self, origin: Vec3, dir: Vec3) -> Option<(Vec3, f32)> {
        let denom = self.normal.dot(dir);
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = (self.origin - origin).dot(self.normal) / denom;
        if t < 0.0 {
            return None;
        }
        Some((origin + t * dir, t))
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.origin += offset;
    }

    pub fn move_along_normal(&mut self, distance: f32) {
        self.origin += distance * self.normal;
    }

    pub fn rotate(&mut self, rotation: Quat) {
        self.normal = (rotation * self.normal).normalize();
        self.x_axis = (rotation * self.x_axis).normalize();
        self.y_axis = (rotation * self.y_axis).normalize();
    }

    /// Rotate the basis around `axis` by `angle` radians
    pub fn rotate_around_axis(&mut self, axis: Vec3, angle: f32) {
        if let Some(axis) = axis.try_normalize() {
            self.rotate(Quat::from_axis_angle(axis, angle));
        }
    }

    pub fn align_to_normal(&mut self, normal: Vec3) {
        if let Some(normal) = normal.try_normalize() {
            self.normal = normal;
            self.rebuild_axes();
        }
    }

    // ── Follow ───────────────────────────────────────────────

    pub fn set_follow_enabled(&mut self, enabled: bool) {
        self.follow.enabled = enabled;
    }

    pub fn update_follow(&mut self, _camera_pos: Vec3, camera_front: Vec3, camera_target: Vec3) {
        if !self.follow.enabled {
            return;
        }
        if self.follow.follow_position {
            self.origin = camera_target;
            if self.follow.offset.abs() > 1e-6 {
                self.origin += self.normal * self.follow.offset;
            }
        }
        if self.follow.follow_orientation {
            if let Some(normal) = camera_front.try_normalize() {
                self.normal = normal;
                self.rebuild_axes();
            }
        }
    }

    // ── Queries ──────────────────────────────────────────────

    pub fn is_valid(&self) -> bool {
        (self.normal.length() - 1.0).abs() < 1e-3
    }

    pub fn is_horizontal(&self) -> bool {
        self.normal.dot(Vec3::Z).abs() > 0.99
    }

    pub fn is_vertical(&self) -> bool {
        self.normal.dot(Vec3::Z).abs() < 0.1
    }

    /// x = ref × n, y = n × x with ref = +Z unless the normal is near-vertical
    fn rebuild_axes(&mut self) {
        let reference = if self.normal.z.abs() < 0.9 { Vec3::Z } else { Vec3::X };
        self.x_axis = reference.cross(self.normal).normalize();
        self.y_axis = self.normal.cross(self.x_axis).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn assert_orthonormal(wp: &WorkPlane) {
        assert!(wp.is_valid());
        assert!((wp.x_axis().length() - 1.0).abs() < EPS);
        assert!((wp.y_axis().length() - 1.0).abs() < EPS);
        assert!(wp.x_axis().dot(wp.y_axis()).abs() < EPS);
        assert!(wp.x_axis().dot(wp.normal()).abs() < EPS);
        assert!(wp.y_axis().dot(wp.normal()).abs() < EPS);
    }

    #[test]
    fn test_presets() {
        let mut wp = WorkPlane::new();
        wp.set_xz(2.0);
        assert_eq!(wp.origin(), Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(wp.normal(), Vec3::Y);
        assert!(!wp.is_horizontal());
        assert!(wp.is_vertical());
        wp.set_xy(-1.0);
        assert!(wp.is_horizontal());
        assert_orthonormal(&wp);
    }

    #[test]
    fn test_translate_moves_origin_only() {
        let mut wp = WorkPlane::new();
        wp.set_xz(1.0);
        let normal = wp.normal();
        wp.translate(Vec3::new(2.0, -0.5, 3.0));
        assert!((wp.origin() - Vec3::new(2.0, 0.5, 3.0)).length() < EPS);
        assert_eq!(wp.normal(), normal);
        wp.translate(Vec3::ZERO);
        assert!((wp.origin() - Vec3::new(2.0, 0.5, 3.0)).length() < EPS);
    }

    #[test]
    fn test_align_to_normal() {
        let mut wp = WorkPlane::new();
        let target = Vec3::new(1.0, 1.0, 1.0).normalize();
        wp.align_to_normal(Vec3::new(2.0, 2.0, 2.0));
        assert!((wp.normal() - target).length() < EPS);
        assert_orthonormal(&wp);

        wp.align_to_normal(Vec3::Z);
        assert!((wp.normal() - Vec3::Z).length() < EPS);
        assert_orthonormal(&wp);

        // Zero normal is ignored
        wp.align_to_normal(Vec3::ZERO);
        assert!((wp.normal() - Vec3::Z).length() < EPS);
    }

    #[test]
    fn test_set_orthogonalizes_hint() {
        let mut wp = WorkPlane::new();
        assert!(wp.set(Vec3::ONE, Vec3::new(0.0, 0.0, 2.0), Vec3::new(1.0, 0.0, 1.0)));
        assert!((wp.normal() - Vec3::Z).length() < EPS);
        assert!((wp.x_axis() - Vec3::X).length() < EPS);
        assert!((wp.y_axis() - Vec3::Y).length() < EPS);
    }

    #[test]
    fn test_set_with_parallel_hint_rebuilds() {
        let mut wp = WorkPlane::new();
        assert!(wp.set(Vec3::ZERO, Vec3::X, Vec3::X));
        assert_orthonormal(&wp);
        assert!(!wp.set(Vec3::ZERO, Vec3::ZERO, Vec3::X));
    }

    #[test]
    fn test_set_from_view() {
        let mut wp = WorkPlane::new();
        wp.set_from_view(Vec3::new(5.0, 5.0, 5.0), Vec3::new(-1.0, -1.0, -1.0), Vec3::ZERO);
        assert_orthonormal(&wp);
        assert_eq!(wp.origin(), Vec3::ZERO);
    }

    #[test]
    fn test_local_world_roundtrip() {
        let mut wp = WorkPlane::new();
        wp.set(Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, 1.0, 0.0), Vec3::Z);
        let uv = Vec2::new(0.5, -2.0);
        let w = wp.local_to_world(uv);
        assert!((wp.world_to_local(w) - uv).length() < 1e-4);
        assert!(wp.distance_to_point(w).abs() < 1e-4);

        let m = wp.world_to_local_matrix().transform_point3(w);
        assert!((m.truncate() - uv).length() < 1e-4);
    }

    #[test]
    fn test_project_point() {
        let wp = WorkPlane::new();
        let p = wp.project_point(Vec3::new(3.0, 4.0, 7.0));
        assert_eq!(p, Vec3::new(3.0, 4.0, 0.0));
        assert_eq!(wp.distance_to_point(Vec3::new(0.0, 0.0, -2.0)), -2.0);
    }

    #[test]
    fn test_ray_intersection() {
        let wp = WorkPlane::new();
        let (hit, t) = wp.ray_intersection(Vec3::new(1.0, 1.0, 5.0), Vec3::NEG_Z).unwrap();
        assert_eq!(hit, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(t, 5.0);
        assert!(wp.ray_intersection(Vec3::new(0.0, 0.0, 5.0), Vec3::X).is_none());
        assert!(wp.ray_intersection(Vec3::new(0.0, 0.0, 5.0), Vec3::Z).is_none());
    }

    #[test]
    fn test_follow_only_when_enabled() {
        let mut wp = WorkPlane::new();
        wp.follow = FollowMode {
            enabled: false,
            follow_position: true,
            follow_orientation: true,
            offset: 0.0,
        };
        wp.update_follow(Vec3::ONE, Vec3::NEG_X, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(wp.origin(), Vec3::ZERO);

        wp.set_follow_enabled(true);
        wp.update_follow(Vec3::ONE, Vec3::NEG_X, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(wp.origin(), Vec3::new(2.0, 0.0, 0.0));
        assert!((wp.normal() - Vec3::NEG_X).length() < EPS);
        assert_orthonormal(&wp);
    }

    #[test]
    fn test_follow_offset_along_normal() {
        let mut wp = WorkPlane::new();
        wp.follow = FollowMode {
            enabled: true,
            follow_position: true,
            follow_orientation: false,
            offset: 0.5,
        };
        wp.update_follow(Vec3::ZERO, Vec3::NEG_Z, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(wp.origin(), Vec3::new(1.0, 0.0, 0.5));
    }

    #[test]
    fn test_rotate_keeps_basis() {
        let mut wp = WorkPlane::new();
        wp.rotate_around_axis(Vec3::X, std::f32::consts::FRAC_PI_2);
        assert!((wp.normal() - Vec3::NEG_Y).length() < 1e-5);
        assert_orthonormal(&wp);
        wp.move_along_normal(2.0);
        assert!((wp.origin() - Vec3::new(0.0, -2.0, 0.0)).length() < 1e-5);
    }
}
