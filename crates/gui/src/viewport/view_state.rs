//! Per-frame viewport snapshot and screen/world transforms
//!
//! Screen coordinates are pixels with a top-left origin, y growing down.

use glam::{Mat4, Vec2, Vec3, Vec4};

use super::camera::Camera;
use super::picking::Ray;

/// Returned by `world_to_screen` when the point cannot be projected
pub const OFFSCREEN: Vec2 = Vec2::new(-1.0, -1.0);

#[derive(Debug, Clone)]
pub struct ViewportState {
    pub width: f32,
    pub height: f32,
    pub view: Mat4,
    pub proj: Mat4,
    /// Depth anchor for scale estimation (camera target)
    pub focus: Vec3,
    /// World units spanned by one screen pixel at the focus depth
    pub world_per_pixel: f32,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
            focus: Vec3::ZERO,
            world_per_pixel: 1.0,
        }
    }
}

impl ViewportState {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn is_sized(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    pub fn aspect(&self) -> f32 {
        if self.is_sized() {
            self.width / self.height
        } else {
            1.0
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.proj * self.view
    }

    /// Pull matrices and focus from the camera for a viewport of the given size
    pub fn refresh(&mut self, camera: &Camera, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.view = camera.view_matrix();
        self.proj = camera.projection_matrix(self.aspect());
        self.focus = if camera.mode().is_target_based() {
            camera.target()
        } else {
            camera.position() + camera.front() * camera.radius()
        };
        self.update_world_per_pixel();
    }

    /// Project a one-unit view-space step at the focus depth and compare it
    /// with one pixel of NDC width.
    pub fn update_world_per_pixel(&mut self) {
        self.world_per_pixel = 1.0;
        if !self.is_sized() {
            return;
        }
        let anchor = self.view.transform_point3(self.focus);
        let a = self.proj * anchor.extend(1.0);
        let b = self.proj * (anchor + Vec3::X).extend(1.0);
        if a.w.abs() < 1e-6 || b.w.abs() < 1e-6 {
            return;
        }
        let ndc_len = (b.truncate() / b.w - a.truncate() / a.w).truncate().length();
        let wpp = (2.0 / self.width) / ndc_len;
        if wpp.is_finite() && wpp > 0.0 {
            self.world_per_pixel = wpp;
        }
    }

    // ── Projection primitives ────────────────────────────────

    pub fn screen_to_ndc(&self, x: f32, y: f32) -> Vec2 {
        let w = self.width.max(1.0);
        let h = self.height.max(1.0);
        Vec2::new(2.0 * x / w - 1.0, 1.0 - 2.0 * y / h)
    }

    pub fn ndc_to_screen(&self, ndc: Vec2) -> Vec2 {
        Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.width,
            (1.0 - ndc.y) * 0.5 * self.height,
        )
    }

    /// NDC of a world point, or None on a near-zero homogeneous w
    pub fn try_world_to_ndc(&self, p: Vec3) -> Option<Vec3> {
        let clip = self.view_projection() * p.extend(1.0);
        if clip.w.abs() < 1e-6 {
            return None;
        }
        Some(clip.truncate() / clip.w)
    }

    /// NDC of a world point; the origin if it cannot be projected
    pub fn world_to_ndc(&self, p: Vec3) -> Vec3 {
        self.try_world_to_ndc(p).unwrap_or(Vec3::ZERO)
    }

    /// Unproject an NDC point (x, y, depth) back to world space
    pub fn unproject(&self, ndc: Vec3) -> Option<Vec3> {
        let w = self.view_projection().inverse() * ndc.extend(1.0);
        if w.w.abs() < 1e-12 {
            return None;
        }
        let p = w.truncate() / w.w;
        p.is_finite().then_some(p)
    }

    /// Ray through an NDC position, from the near plane toward the far plane
    pub fn ndc_ray(&self, ndc_x: f32, ndc_y: f32) -> Option<Ray> {
        let near = self.unproject(Vec3::new(ndc_x, ndc_y, -1.0))?;
        let far = self.unproject(Vec3::new(ndc_x, ndc_y, 1.0))?;
        let direction = (far - near).try_normalize()?;
        Some(Ray {
            origin: near,
            direction,
        })
    }

    /// Point where the ray through an NDC position meets the plane z = plane_z.
    /// A ray parallel to the plane is projected straight onto it.
    pub fn ndc_to_world(&self, ndc_x: f32, ndc_y: f32, plane_z: f32) -> Vec3 {
        let Some(ray) = self.ndc_ray(ndc_x, ndc_y) else {
            return Vec3::new(0.0, 0.0, plane_z);
        };
        if ray.direction.z.abs() < 1e-6 {
            return Vec3::new(ray.origin.x, ray.origin.y, plane_z);
        }
        let t = (plane_z - ray.origin.z) / ray.direction.z;
        ray.point_at(t)
    }

    // ── Screen transforms ────────────────────────────────────

    pub fn screen_to_world(&self, x: f32, y: f32, plane_z: f32) -> Vec3 {
        let ndc = self.screen_to_ndc(x, y);
        self.ndc_to_world(ndc.x, ndc.y, plane_z)
    }

    pub fn try_world_to_screen(&self, p: Vec3) -> Option<Vec2> {
        let ndc = self.try_world_to_ndc(p)?;
        Some(self.ndc_to_screen(ndc.truncate()))
    }

    /// Pixel position of a world point, or [`OFFSCREEN`]
    pub fn world_to_screen(&self, p: Vec3) -> Vec2 {
        self.try_world_to_screen(p).unwrap_or(OFFSCREEN)
    }

    /// Picking ray through a pixel
    pub fn screen_ray(&self, x: f32, y: f32) -> Option<Ray> {
        let ndc = self.screen_to_ndc(x, y);
        self.ndc_ray(ndc.x, ndc.y)
    }

    // ── Queries ──────────────────────────────────────────────

    /// True iff the point lies inside the clip volume
    pub fn is_visible(&self, p: Vec3) -> bool {
        match self.try_world_to_ndc(p) {
            Some(ndc) => ndc.cmpge(Vec3::splat(-1.0)).all() && ndc.cmple(Vec3::ONE).all(),
            None => false,
        }
    }

    /// World distance covered by one pixel at `p`
    pub fn pixel_size_at(&self, p: Vec3) -> f32 {
        let Some(screen) = self.try_world_to_screen(p) else {
            return self.world_per_pixel;
        };
        let p1 = self.screen_to_world(screen.x + 1.0, screen.y, p.z);
        let d = p.distance(p1);
        if d.is_finite() {
            d
        } else {
            self.world_per_pixel
        }
    }

    /// Near face then far face, each bottom-left, bottom-right, top-right, top-left
    pub fn frustum_corners(&self) -> [Vec3; 8] {
        const NDC: [Vec3; 8] = [
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
        ];
        let inv = self.view_projection().inverse();
        NDC.map(|c| {
            let w: Vec4 = inv * c.extend(1.0);
            w.truncate() / w.w
        })
    }
}
