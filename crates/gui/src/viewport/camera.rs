//! Multi-mode viewport camera
//!
//! Orbit and Ortho2D are parameterized by target/radius/yaw/pitch and derive
//! `position` from them. FPS and Free are parameterized by position and a look
//! direction built from yaw/pitch. All angles are in degrees.

use glam::{Mat4, Vec3};

use crate::state::settings::CameraSettings;

const PITCH_LIMIT: f32 = 89.0;
const ORBIT_RADIUS_RANGE: (f32, f32) = (1.0, 50.0);
const ORTHO_RADIUS_RANGE: (f32, f32) = (0.1, 100.0);
const FOV_RANGE: (f32, f32) = (1.0, 90.0);

/// Camera behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    /// Rotates around a target
    #[default]
    Orbit,
    /// First-person
    Fps,
    /// Free-flying
    Free,
    /// Orthographic CAD view: pan and zoom only, preset orientations
    Ortho2D,
}

impl CameraMode {
    pub const ALL: [CameraMode; 4] = [
        CameraMode::Orbit,
        CameraMode::Fps,
        CameraMode::Free,
        CameraMode::Ortho2D,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CameraMode::Orbit => "Orbit",
            CameraMode::Fps => "FPS",
            CameraMode::Free => "Free",
            CameraMode::Ortho2D => "2D",
        }
    }

    /// Modes whose authoritative state is target/radius/yaw/pitch
    pub fn is_target_based(self) -> bool {
        matches!(self, CameraMode::Orbit | CameraMode::Ortho2D)
    }
}

impl std::fmt::Display for CameraMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Semantic keyboard movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
    Reset,
}

/// Preset azimuths used by the 2D camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View2DOrientation {
    /// Looking down -Z onto the XY plane
    #[default]
    Top,
    /// Looking down onto the XZ plane
    Front,
    /// Looking along -X onto the YZ plane
    Right,
}

impl View2DOrientation {
    /// (yaw, pitch) in degrees
    fn angles(self) -> (f32, f32) {
        match self {
            View2DOrientation::Top => (90.0, 0.0),
            View2DOrientation::Front => (90.0, PITCH_LIMIT),
            View2DOrientation::Right => (0.0, 0.0),
        }
    }
}

/// State restored by `reset()`
#[derive(Debug, Clone, Copy)]
struct CameraSnapshot {
    position: Vec3,
    target: Vec3,
    radius: f32,
    yaw: f32,
    pitch: f32,
    fov: f32,
    mode: CameraMode,
}

/// Orientation saved while the camera is in 2D mode
#[derive(Debug, Clone, Copy)]
struct Saved3D {
    yaw: f32,
    pitch: f32,
    radius: f32,
}

/// Viewport camera
#[derive(Debug, Clone)]
pub struct Camera {
    mode: CameraMode,

    // Orbit / Ortho2D
    target: Vec3,
    radius: f32,
    yaw: f32,
    pitch: f32,

    // FPS / Free (derived in orbit modes)
    position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,

    /// Vertical field of view (degrees)
    fov: f32,
    pub near: f32,
    pub far: f32,

    pub move_speed: f32,
    pub mouse_sensitivity: f32,
    pub scroll_sensitivity: f32,
    pub pan_sensitivity: f32,
    pub zoom_speed: f32,

    orientation_2d: View2DOrientation,
    saved_3d: Saved3D,
    snapshot: CameraSnapshot,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(CameraMode::Orbit)
    }
}

impl Camera {
    pub fn new(mode: CameraMode) -> Self {
        let mut camera = Self {
            mode: CameraMode::Orbit,
            target: Vec3::ZERO,
            radius: 5.0,
            yaw: 45.0,
            pitch: 45.0,
            position: Vec3::new(0.0, 0.0, 3.0),
            front: Vec3::NEG_Z,
            up: Vec3::Y,
            right: Vec3::X,
            world_up: Vec3::Y,
            fov: 45.0,
            near: 0.1,
            far: 100.0,
            move_speed: 2.5,
            mouse_sensitivity: 1.0,
            scroll_sensitivity: 2.0,
            pan_sensitivity: 1.0,
            zoom_speed: 0.1,
            orientation_2d: View2DOrientation::Top,
            saved_3d: Saved3D {
                yaw: 45.0,
                pitch: 45.0,
                radius: 5.0,
            },
            snapshot: CameraSnapshot {
                position: Vec3::new(0.0, 0.0, 5.0),
                target: Vec3::ZERO,
                radius: 5.0,
                yaw: 45.0,
                pitch: 45.0,
                fov: 45.0,
                mode: CameraMode::Orbit,
            },
        };
        camera.update_orbit_position();
        if mode != CameraMode::Orbit {
            camera.switch_mode(mode);
        }
        camera.capture_snapshot();
        camera
    }

    /// Copy control tuning from settings
    pub fn apply_settings(&mut self, settings: &CameraSettings) {
        self.mouse_sensitivity = settings.mouse_sensitivity;
        self.scroll_sensitivity = settings.scroll_sensitivity;
        self.pan_sensitivity = settings.pan_sensitivity;
        self.move_speed = settings.move_speed;
        self.zoom_speed = settings.zoom_speed;
    }

    // ── Accessors ────────────────────────────────────────────

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn is_2d(&self) -> bool {
        self.mode == CameraMode::Ortho2D
    }

    pub fn orientation_2d(&self) -> View2DOrientation {
        self.orientation_2d
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn world_up(&self) -> Vec3 {
        self.world_up
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    // ── Matrices ─────────────────────────────────────────────

    /// View matrix (world -> camera)
    pub fn view_matrix(&self) -> Mat4 {
        if self.mode.is_target_based() {
            Mat4::look_at_rh(self.position, self.target, self.up)
        } else {
            Mat4::look_at_rh(self.position, self.position + self.front, self.up)
        }
    }

    /// Projection matrix (camera -> clip)
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        match self.mode {
            CameraMode::Ortho2D => {
                let half_h = self.radius;
                let half_w = self.radius * aspect;
                // Depth range spans both sides of the eye so nothing near the
                // target is clipped whatever the zoom level.
                Mat4::orthographic_rh_gl(-half_w, half_w, -half_h, half_h, -self.far, self.far)
            }
            _ => Mat4::perspective_rh_gl(self.fov.to_radians(), aspect, self.near, self.far),
        }
    }

    /// Combined view-projection matrix
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    // ── Input ────────────────────────────────────────────────

    /// Rotate from a mouse delta. Ignored in 2D mode.
    pub fn process_mouse_movement(&mut self, dx: f32, dy: f32) {
        let dx = dx * self.mouse_sensitivity;
        let dy = dy * self.mouse_sensitivity;
        match self.mode {
            CameraMode::Orbit => {
                self.yaw += dx;
                self.pitch = clamp_pitch(self.pitch - dy);
                self.update_orbit_position();
            }
            CameraMode::Fps | CameraMode::Free => {
                self.yaw += dx;
                self.pitch = clamp_pitch(self.pitch + dy);
                self.update_camera_vectors();
            }
            CameraMode::Ortho2D => {}
        }
    }

    /// Zoom from a wheel delta (positive = zoom in)
    pub fn process_mouse_scroll(&mut self, dy: f32) {
        match self.mode {
            CameraMode::Orbit => {
                self.radius = (self.radius - dy * self.scroll_sensitivity)
                    .clamp(ORBIT_RADIUS_RANGE.0, ORBIT_RADIUS_RANGE.1);
                self.update_orbit_position();
            }
            CameraMode::Ortho2D => {
                self.radius = (self.radius * (1.0 - dy * self.zoom_speed))
                    .clamp(ORTHO_RADIUS_RANGE.0, ORTHO_RADIUS_RANGE.1);
                self.update_orbit_position();
            }
            CameraMode::Fps | CameraMode::Free => {
                self.fov = (self.fov - dy).clamp(FOV_RANGE.0, FOV_RANGE.1);
            }
        }
    }

    /// Keyboard movement; target-based modes move the target, others the eye
    pub fn process_keyboard(&mut self, movement: CameraMovement, dt: f32) {
        let velocity = self.move_speed * dt;
        let offset = match movement {
            CameraMovement::Forward => self.front * velocity,
            CameraMovement::Backward => -self.front * velocity,
            CameraMovement::Left => -self.right * velocity,
            CameraMovement::Right => self.right * velocity,
            CameraMovement::Up => self.world_up * velocity,
            CameraMovement::Down => -self.world_up * velocity,
            CameraMovement::Reset => {
                self.reset();
                return;
            }
        };

        if self.mode.is_target_based() {
            self.target += offset;
            self.update_orbit_position();
        } else {
            self.position += offset;
        }
    }

    /// Pan the 2D view by a pixel delta. Returns false outside 2D mode.
    pub fn pan_2d(&mut self, dx: f32, dy: f32, world_per_pixel: f32) -> bool {
        if !self.is_2d() {
            tracing::warn!("pan_2d ignored: camera is in {} mode", self.mode);
            return false;
        }
        let offset = (-self.right * dx + self.up * dy) * world_per_pixel * self.pan_sensitivity;
        self.target += offset;
        self.position += offset;
        true
    }

    // ── Explicit setters (each captures a reset snapshot) ────

    /// Move the eye. Target-based modes re-derive radius/yaw/pitch from it.
    pub fn set_position(&mut self, position: Vec3) {
        if self.mode.is_target_based() {
            let offset = position - self.target;
            let distance = offset.length();
            if distance > 1e-6 {
                let (yaw, pitch) = yaw_pitch_from_direction(offset / distance);
                self.yaw = yaw;
                self.pitch = pitch;
                self.radius = distance;
            }
            self.update_orbit_position();
        } else {
            self.position = position;
        }
        self.capture_snapshot();
    }

    /// Set the look-at point. Free modes turn to face it.
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
        if self.mode.is_target_based() {
            self.update_orbit_position();
        } else {
            let dir = target - self.position;
            if dir.length_squared() > 1e-12 {
                let (yaw, pitch) = yaw_pitch_from_direction(dir.normalize());
                self.yaw = yaw;
                self.pitch = pitch;
                self.update_camera_vectors();
            }
        }
        self.capture_snapshot();
    }

    pub fn set_mode(&mut self, mode: CameraMode) {
        self.switch_mode(mode);
        self.capture_snapshot();
    }

    /// Orbit parameters in one call (pitch is clamped)
    pub fn set_orbit_params(&mut self, radius: f32, yaw: f32, pitch: f32) {
        self.radius = radius.max(1e-3);
        self.yaw = yaw;
        self.pitch = clamp_pitch(pitch);
        if self.mode.is_target_based() {
            self.update_orbit_position();
        } else {
            self.update_camera_vectors();
        }
    }

    /// Enter or leave the orthographic 2D view
    pub fn set_2d_mode(&mut self, enable: bool) {
        if enable == self.is_2d() {
            return;
        }
        if enable {
            if !self.mode.is_target_based() {
                self.to_orbit_from_free();
            }
            self.saved_3d = Saved3D {
                yaw: self.yaw,
                pitch: self.pitch,
                radius: self.radius,
            };
            let half_height = self.radius * (self.fov.to_radians() * 0.5).tan();
            self.radius = half_height.clamp(ORTHO_RADIUS_RANGE.0, ORTHO_RADIUS_RANGE.1);
            self.mode = CameraMode::Ortho2D;
            self.apply_2d_orientation();
            tracing::debug!("Camera entered 2D mode ({:?})", self.orientation_2d);
        } else {
            self.yaw = self.saved_3d.yaw;
            self.pitch = self.saved_3d.pitch;
            self.radius = self.saved_3d.radius;
            self.mode = CameraMode::Orbit;
            self.update_orbit_position();
            tracing::debug!("Camera returned to 3D orbit");
        }
    }

    pub fn set_2d_orientation(&mut self, orientation: View2DOrientation) {
        self.orientation_2d = orientation;
        if self.is_2d() {
            self.apply_2d_orientation();
        }
    }

    // ── Preset views ─────────────────────────────────────────

    /// Look down -Z onto the XY plane
    pub fn set_top_view(&mut self, distance: f32) {
        self.set_preset(View2DOrientation::Top, distance);
    }

    /// Look down onto the XZ plane
    pub fn set_front_view(&mut self, distance: f32) {
        self.set_preset(View2DOrientation::Front, distance);
    }

    /// Look along -X onto the YZ plane
    pub fn set_right_view(&mut self, distance: f32) {
        self.set_preset(View2DOrientation::Right, distance);
    }

    /// Classic isometric orbit view (leaves 2D mode)
    pub fn set_isometric_view(&mut self, distance: f32) {
        self.set_2d_mode(false);
        if self.mode != CameraMode::Orbit {
            self.switch_mode(CameraMode::Orbit);
        }
        self.set_orbit_params(distance, 45.0, 35.264);
    }

    fn set_preset(&mut self, orientation: View2DOrientation, distance: f32) {
        if self.is_2d() {
            self.set_2d_orientation(orientation);
            return;
        }
        if self.mode != CameraMode::Orbit {
            self.switch_mode(CameraMode::Orbit);
        }
        let (yaw, pitch) = orientation.angles();
        self.set_orbit_params(distance, yaw, pitch);
    }

    /// Restore the state captured by the last explicit setter
    pub fn reset(&mut self) {
        let s = self.snapshot;
        self.mode = s.mode;
        self.position = s.position;
        self.target = s.target;
        self.radius = s.radius;
        self.yaw = s.yaw;
        self.pitch = s.pitch;
        self.fov = s.fov;
        if self.mode.is_target_based() {
            self.update_orbit_position();
        } else {
            self.update_camera_vectors();
        }
    }

    // ── Vector derivation ────────────────────────────────────

    /// Spherical position around the target from radius/yaw/pitch
    pub fn update_orbit_position(&mut self) {
        let (sy, cy) = self.yaw.to_radians().sin_cos();
        let (sp, cp) = self.pitch.to_radians().sin_cos();
        self.position = self.target + self.radius * Vec3::new(cp * cy, sp, cp * sy);
        self.front = (self.target - self.position).normalize_or(Vec3::NEG_Z);
        (self.right, self.up) = basis(self.front, self.world_up);
    }

    /// Look direction from yaw/pitch (free modes)
    pub fn update_camera_vectors(&mut self) {
        self.front = direction_from_yaw_pitch(self.yaw, self.pitch);
        (self.right, self.up) = basis(self.front, self.world_up);
    }

    // ── Internal ─────────────────────────────────────────────

    fn capture_snapshot(&mut self) {
        self.snapshot = CameraSnapshot {
            position: self.position,
            target: self.target,
            radius: self.radius,
            yaw: self.yaw,
            pitch: self.pitch,
            fov: self.fov,
            mode: self.mode,
        };
    }

    fn switch_mode(&mut self, mode: CameraMode) {
        if mode == self.mode {
            return;
        }
        if mode == CameraMode::Ortho2D {
            self.set_2d_mode(true);
            return;
        }
        if self.is_2d() {
            self.set_2d_mode(false);
        }
        match (self.mode.is_target_based(), mode.is_target_based()) {
            (true, false) => {
                // Keep looking where the orbit camera looked
                let (yaw, pitch) = yaw_pitch_from_direction(self.front);
                self.yaw = yaw;
                self.pitch = pitch;
                self.mode = mode;
                self.update_camera_vectors();
            }
            (false, true) => {
                self.to_orbit_from_free();
            }
            _ => {
                self.mode = mode;
            }
        }
    }

    /// Convert free-camera state into an orbit around the point in front
    fn to_orbit_from_free(&mut self) {
        self.target = self.position + self.front * self.radius;
        let (yaw, pitch) = yaw_pitch_from_direction(-self.front);
        self.yaw = yaw;
        self.pitch = pitch;
        self.mode = CameraMode::Orbit;
        self.update_orbit_position();
    }

    fn apply_2d_orientation(&mut self) {
        let (yaw, pitch) = self.orientation_2d.angles();
        self.yaw = yaw;
        self.pitch = pitch;
        self.update_orbit_position();
    }
}

fn clamp_pitch(pitch: f32) -> f32 {
    pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT)
}

/// Unit vector for yaw/pitch in degrees
fn direction_from_yaw_pitch(yaw: f32, pitch: f32) -> Vec3 {
    let (sy, cy) = yaw.to_radians().sin_cos();
    let (sp, cp) = pitch.to_radians().sin_cos();
    Vec3::new(cy * cp, sp, sy * cp).normalize()
}

/// Inverse of `direction_from_yaw_pitch` (pitch is clamped)
fn yaw_pitch_from_direction(dir: Vec3) -> (f32, f32) {
    let pitch = dir.y.clamp(-1.0, 1.0).asin().to_degrees();
    let yaw = dir.z.atan2(dir.x).to_degrees();
    (yaw, clamp_pitch(pitch))
}

/// Right and up vectors for a look direction
fn basis(front: Vec3, world_up: Vec3) -> (Vec3, Vec3) {
    let right = front.cross(world_up).normalize_or(Vec3::X);
    let up = right.cross(front).normalize_or(Vec3::Y);
    (right, up)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn test_orbit_distance_equals_radius() {
        let mut cam = Camera::new(CameraMode::Orbit);
        cam.set_target(Vec3::new(1.0, -2.0, 3.0));
        for &radius in &[1.0_f32, 2.5, 7.0, 50.0] {
            for yaw in (-360..=360).step_by(45) {
                for pitch in (-89..=89).step_by(17) {
                    cam.set_orbit_params(radius, yaw as f32, pitch as f32);
                    let d = (cam.position() - cam.target()).length();
                    assert!((d - radius).abs() < 1e-3 * radius, "d={d} r={radius}");
                }
            }
        }
    }

    #[test]
    fn test_orbit_vectors_orthonormal() {
        let mut cam = Camera::new(CameraMode::Orbit);
        cam.set_orbit_params(10.0, 30.0, 20.0);
        assert!((cam.front().length() - 1.0).abs() < EPS);
        assert!(cam.front().dot(cam.right()).abs() < EPS);
        assert!(cam.front().dot(cam.up()).abs() < EPS);
        assert!(cam.right().dot(cam.up()).abs() < EPS);
    }

    #[test]
    fn test_pitch_clamped_after_mouse_movement() {
        for mode in [CameraMode::Orbit, CameraMode::Fps, CameraMode::Free] {
            let mut cam = Camera::new(mode);
            cam.process_mouse_movement(0.0, 500.0);
            assert!(cam.pitch() >= -89.0 && cam.pitch() <= 89.0);
            cam.process_mouse_movement(10.0, -1000.0);
            assert!(cam.pitch() >= -89.0 && cam.pitch() <= 89.0);
            cam.process_mouse_scroll(3.0);
            assert!(cam.pitch() >= -89.0 && cam.pitch() <= 89.0);
        }
    }

    #[test]
    fn test_orbit_mouse_direction() {
        let mut cam = Camera::new(CameraMode::Orbit);
        let (yaw, pitch) = (cam.yaw(), cam.pitch());
        cam.process_mouse_movement(2.0, 3.0);
        assert!((cam.yaw() - (yaw + 2.0)).abs() < EPS);
        assert!((cam.pitch() - (pitch - 3.0)).abs() < EPS);
    }

    #[test]
    fn test_ortho_ignores_rotation() {
        let mut cam = Camera::new(CameraMode::Orbit);
        cam.set_2d_mode(true);
        let before = cam.position();
        cam.process_mouse_movement(40.0, 40.0);
        assert!((cam.position() - before).length() < EPS);
    }

    #[test]
    fn test_scroll_clamps() {
        let mut cam = Camera::new(CameraMode::Orbit);
        cam.process_mouse_scroll(100.0);
        assert_eq!(cam.radius(), 1.0);
        cam.process_mouse_scroll(-100.0);
        assert_eq!(cam.radius(), 50.0);

        let mut free = Camera::new(CameraMode::Free);
        free.process_mouse_scroll(500.0);
        assert_eq!(free.fov(), 1.0);
        free.process_mouse_scroll(-500.0);
        assert_eq!(free.fov(), 90.0);

        let mut flat = Camera::new(CameraMode::Ortho2D);
        for _ in 0..200 {
            flat.process_mouse_scroll(5.0);
        }
        assert!((flat.radius() - 0.1).abs() < EPS);
        for _ in 0..200 {
            flat.process_mouse_scroll(-5.0);
        }
        assert!((flat.radius() - 100.0).abs() < EPS);
    }

    #[test]
    fn test_keyboard_moves_target_in_orbit() {
        let mut cam = Camera::new(CameraMode::Orbit);
        let target = cam.target();
        let radius = cam.radius();
        cam.process_keyboard(CameraMovement::Up, 1.0);
        assert!((cam.target() - (target + Vec3::Y * 2.5)).length() < EPS);
        assert!(((cam.position() - cam.target()).length() - radius).abs() < 1e-3);
    }

    #[test]
    fn test_keyboard_moves_position_in_free() {
        let mut cam = Camera::new(CameraMode::Free);
        let pos = cam.position();
        let front = cam.front();
        cam.process_keyboard(CameraMovement::Forward, 2.0);
        assert!((cam.position() - (pos + front * 5.0)).length() < EPS);
    }

    #[test]
    fn test_pan_2d_only_in_2d() {
        let mut cam = Camera::new(CameraMode::Orbit);
        assert!(!cam.pan_2d(10.0, 0.0, 0.1));

        cam.set_2d_mode(true);
        let (t0, p0) = (cam.target(), cam.position());
        let right = cam.right();
        assert!(cam.pan_2d(10.0, 0.0, 0.1));
        let expected = -right * 10.0 * 0.1;
        assert!((cam.target() - (t0 + expected)).length() < EPS);
        assert!((cam.position() - (p0 + expected)).length() < EPS);
    }

    #[test]
    fn test_2d_toggle_restores_orientation() {
        let mut cam = Camera::new(CameraMode::Orbit);
        cam.set_orbit_params(12.0, 33.0, -20.0);
        cam.set_2d_mode(true);
        assert_eq!(cam.mode(), CameraMode::Ortho2D);
        assert_eq!(cam.yaw(), 90.0);
        assert_eq!(cam.pitch(), 0.0);

        cam.set_2d_mode(false);
        assert_eq!(cam.mode(), CameraMode::Orbit);
        assert_eq!(cam.yaw(), 33.0);
        assert_eq!(cam.pitch(), -20.0);
        assert_eq!(cam.radius(), 12.0);
    }

    #[test]
    fn test_top_view_looks_down_negative_z() {
        let mut cam = Camera::new(CameraMode::Ortho2D);
        cam.set_2d_orientation(View2DOrientation::Top);
        assert!((cam.front() - Vec3::NEG_Z).length() < EPS);
        cam.set_2d_orientation(View2DOrientation::Right);
        assert!((cam.front() - Vec3::NEG_X).length() < EPS);
    }

    #[test]
    fn test_reset_restores_snapshot() {
        let mut cam = Camera::new(CameraMode::Orbit);
        cam.set_target(Vec3::new(1.0, 1.0, 0.0));
        let pos = cam.position();
        cam.process_mouse_movement(30.0, 10.0);
        cam.process_mouse_scroll(1.0);
        cam.process_keyboard(CameraMovement::Left, 1.0);
        cam.process_keyboard(CameraMovement::Reset, 0.0);
        assert!((cam.target() - Vec3::new(1.0, 1.0, 0.0)).length() < EPS);
        assert!((cam.position() - pos).length() < 1e-3);
    }

    #[test]
    fn test_reset_keeps_constructed_mode() {
        for mode in [CameraMode::Free, CameraMode::Fps, CameraMode::Ortho2D] {
            let mut cam = Camera::new(mode);
            let pos = cam.position();
            let front = cam.front();
            cam.process_mouse_movement(40.0, -15.0);
            cam.process_keyboard(CameraMovement::Forward, 0.5);
            cam.reset();
            assert_eq!(cam.mode(), mode);
            assert!((cam.position() - pos).length() < 1e-3);
            assert!((cam.front() - front).length() < 1e-3);
        }
    }

    #[test]
    fn test_set_position_in_orbit_derives_radius() {
        let mut cam = Camera::new(CameraMode::Orbit);
        cam.set_target(Vec3::ZERO);
        cam.set_position(Vec3::new(0.0, 0.0, 10.0));
        assert!((cam.position() - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-3);
        assert!((cam.radius() - 10.0).abs() < EPS);
        assert!((cam.front() - Vec3::NEG_Z).length() < EPS);
    }

    #[test]
    fn test_orbit_to_free_keeps_look_direction() {
        let mut cam = Camera::new(CameraMode::Orbit);
        let front = cam.front();
        let pos = cam.position();
        cam.set_mode(CameraMode::Free);
        assert!((cam.front() - front).length() < 1e-3);
        assert!((cam.position() - pos).length() < EPS);
    }

    #[test]
    fn test_view_matrix_centers_target() {
        let mut cam = Camera::new(CameraMode::Orbit);
        cam.set_target(Vec3::new(3.0, 4.0, 5.0));
        let v = cam.view_matrix().transform_point3(cam.target());
        assert!(v.x.abs() < 1e-3 && v.y.abs() < 1e-3);
        assert!((v.z + cam.radius()).abs() < 1e-3);
    }

    #[test]
    fn test_ortho_projection_extent() {
        let mut cam = Camera::new(CameraMode::Orbit);
        cam.set_2d_mode(true);
        cam.set_orbit_params(2.0, 90.0, 0.0);
        let p = cam.projection_matrix(2.0);
        let edge = p.transform_point3(Vec3::new(4.0, 2.0, 0.0));
        assert!((edge.x - 1.0).abs() < EPS);
        assert!((edge.y - 1.0).abs() < EPS);
    }
}
