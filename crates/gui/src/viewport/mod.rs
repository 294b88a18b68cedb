//! Camera, viewport transforms, tessellation, rendering and picking

pub mod camera;
pub mod gl_renderer;
pub mod grid;
pub mod picking;
pub mod sync;
pub mod tessellate;
pub mod view_state;
pub mod work_plane;

pub use camera::{Camera, CameraMode, CameraMovement, View2DOrientation};
pub use gl_renderer::{GlRenderer, RenderParams};
pub use picking::{BoxSelectMode, PickHit, Ray};
pub use view_state::ViewportState;
pub use work_plane::WorkPlane;
