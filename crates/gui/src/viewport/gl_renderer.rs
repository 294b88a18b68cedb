use std::collections::HashMap;

use glam::Vec3;
use glow::HasContext;
use shared::{unpack_rgba, EntityId};

use super::grid;
use super::sync::{BatchTracker, SyncPlan};
use super::tessellate::{BatchData, Topology};
use super::view_state::ViewportState;
use crate::error::RenderError;
use crate::state::document::Document;
use crate::state::settings::{AxisSettings, GridSettings};

// ── Render parameters ────────────────────────────────────────

/// Parameters for rendering the viewport
pub struct RenderParams<'a> {
    /// Viewport rectangle [x, y, width, height] in pixels
    pub viewport: [f32; 4],
    /// Background color RGB
    pub bg_color: [u8; 3],
    pub grid: &'a GridSettings,
    pub axes: &'a AxisSettings,
}

// ── GPU batch handles ────────────────────────────────────────

/// GPU buffers of one entity. Must be released with [`GpuBatch::free`].
#[derive(Debug)]
pub struct GpuBatch {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ibo: Option<glow::Buffer>,
    count: i32,
    rgba: u32,
    topology: Topology,
}

impl GpuBatch {
    fn upload(gl: &glow::Context, data: &BatchData, usage: u32) -> Result<Self, RenderError> {
        unsafe {
            let vao = gl.create_vertex_array().map_err(RenderError::ResourceCreation)?;
            let vbo = match gl.create_buffer() {
                Ok(vbo) => vbo,
                Err(e) => {
                    gl.delete_vertex_array(vao);
                    return Err(RenderError::ResourceCreation(e));
                }
            };
            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, bytemuck_cast_slice(&data.vertices), usage);

            // position: location 0
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, 3 * 4, 0);

            let ibo = if data.is_indexed() {
                match gl.create_buffer() {
                    Ok(ibo) => {
                        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ibo));
                        gl.buffer_data_u8_slice(
                            glow::ELEMENT_ARRAY_BUFFER,
                            bytemuck_cast_slice(&data.indices),
                            usage,
                        );
                        Some(ibo)
                    }
                    Err(e) => {
                        gl.bind_vertex_array(None);
                        gl.delete_buffer(vbo);
                        gl.delete_vertex_array(vao);
                        return Err(RenderError::ResourceCreation(e));
                    }
                }
            } else {
                None
            };

            gl.bind_vertex_array(None);

            Ok(Self {
                vao,
                vbo,
                ibo,
                count: data.draw_count() as i32,
                rgba: data.rgba,
                topology: data.topology,
            })
        }
    }

    /// Release the GPU buffers. Consumes the batch so it runs once.
    pub fn free(self, gl: &glow::Context) {
        unsafe {
            if let Some(ibo) = self.ibo {
                gl.delete_buffer(ibo);
            }
            gl.delete_buffer(self.vbo);
            gl.delete_vertex_array(self.vao);
        }
    }

    unsafe fn draw(&self, gl: &glow::Context) {
        let mode = match self.topology {
            Topology::LineList => glow::LINES,
            Topology::LineStrip => glow::LINE_STRIP,
            Topology::TriangleList => glow::TRIANGLES,
        };
        gl.bind_vertex_array(Some(self.vao));
        if self.ibo.is_some() {
            gl.draw_elements(mode, self.count, glow::UNSIGNED_INT, 0);
        } else {
            gl.draw_arrays(mode, 0, self.count);
        }
        gl.bind_vertex_array(None);
    }
}

// ── Shared program ───────────────────────────────────────────

struct LineProgram {
    program: glow::Program,
    u_mvp: Option<glow::UniformLocation>,
    u_color: Option<glow::UniformLocation>,
}

impl LineProgram {
    unsafe fn bind(&self, gl: &glow::Context, vp: &ViewportState) {
        gl.use_program(Some(self.program));
        gl.uniform_matrix_4_f32_slice(
            self.u_mvp.as_ref(),
            false,
            &vp.view_projection().to_cols_array(),
        );
    }

    unsafe fn set_color(&self, gl: &glow::Context, rgba: u32) {
        let [r, g, b, a] = unpack_rgba(rgba);
        gl.uniform_4_f32(self.u_color.as_ref(), r, g, b, a);
    }
}

// ── Main GL renderer ─────────────────────────────────────────

/// Per-entity batch renderer.
///
/// Starts inert; [`GlRenderer::initialize`] compiles the shared program.
/// Batches must be released with [`GlRenderer::shutdown`] while the GL
/// context is still alive.
pub struct GlRenderer {
    program: Option<LineProgram>,
    batches: HashMap<EntityId, GpuBatch>,
    tracker: BatchTracker,
}

impl Default for GlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl GlRenderer {
    pub fn new() -> Self {
        Self {
            program: None,
            batches: HashMap::new(),
            tracker: BatchTracker::new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.program.is_some()
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    pub fn tracker_mut(&mut self) -> &mut BatchTracker {
        &mut self.tracker
    }

    /// Compile and link the shared program. On failure the renderer stays inert.
    pub fn initialize(&mut self, gl: &glow::Context) -> Result<(), RenderError> {
        if self.program.is_some() {
            return Ok(());
        }
        let program = compile_program(gl, LINE_VERT, LINE_FRAG).inspect_err(|e| {
            tracing::error!("Renderer initialization failed: {e}");
        })?;
        let (u_mvp, u_color) = unsafe {
            (
                gl.get_uniform_location(program, "u_mvp"),
                gl.get_uniform_location(program, "u_color"),
            )
        };
        self.program = Some(LineProgram {
            program,
            u_mvp,
            u_color,
        });
        tracing::info!("Scene renderer initialized");
        Ok(())
    }

    /// Free every batch and the program. The renderer becomes inert.
    pub fn shutdown(&mut self, gl: &glow::Context) {
        let count = self.batches.len();
        self.free_all_batches(gl);
        if let Some(p) = self.program.take() {
            unsafe { gl.delete_program(p.program) };
        }
        tracing::debug!("Scene renderer shut down, freed {count} batch(es)");
    }

    fn free_all_batches(&mut self, gl: &glow::Context) {
        for (_, batch) in self.batches.drain() {
            batch.free(gl);
        }
        self.tracker.reset();
    }

    /// Free the batch of one entity, if any
    fn remove_batch(&mut self, gl: &glow::Context, id: EntityId) {
        if let Some(batch) = self.batches.remove(&id) {
            batch.free(gl);
        }
        self.tracker.forget(id);
    }

    /// Bring GPU batches in line with the document. No-op while inert.
    pub fn sync_from_document(
        &mut self,
        gl: &glow::Context,
        doc: &mut Document,
        vp: &ViewportState,
        force_rebuild: bool,
    ) {
        if let Some(plan) = self.plan_sync(doc, vp.world_per_pixel, force_rebuild) {
            self.apply(gl, plan);
        }
    }

    /// Sync plan for the document, or None while inert. An inert renderer
    /// leaves dirty flags untouched so the first real sync uploads everything.
    fn plan_sync(&mut self, doc: &mut Document, world_per_pixel: f32, force_rebuild: bool) -> Option<SyncPlan> {
        if !self.is_initialized() {
            return None;
        }
        Some(self.tracker.sync(doc, world_per_pixel, force_rebuild))
    }

    fn apply(&mut self, gl: &glow::Context, plan: SyncPlan) {
        if plan.free_all {
            for (_, batch) in self.batches.drain() {
                batch.free(gl);
            }
        }
        for id in plan.removals {
            self.remove_batch(gl, id);
        }
        for (id, data) in plan.uploads {
            if let Some(old) = self.batches.remove(&id) {
                old.free(gl);
            }
            match GpuBatch::upload(gl, &data, glow::STATIC_DRAW) {
                Ok(batch) => {
                    self.batches.insert(id, batch);
                }
                Err(e) => {
                    tracing::error!("Upload of entity {id} failed: {e}");
                    self.tracker.forget(id);
                }
            }
        }
    }

    /// Draw every batch with one program and one MVP upload
    pub fn draw(&self, gl: &glow::Context, vp: &ViewportState) {
        let Some(program) = &self.program else {
            return;
        };
        unsafe {
            program.bind(gl, vp);
            for batch in self.batches.values() {
                program.set_color(gl, batch.rgba);
                batch.draw(gl);
            }
            gl.use_program(None);
        }
    }

    /// Clear the viewport, then draw grid, axes and entities
    pub fn paint(&self, gl: &glow::Context, vp: &ViewportState, params: &RenderParams) {
        let [x, y, w, h] = params.viewport.map(|v| v as i32);
        unsafe {
            gl.viewport(x, y, w, h);
            gl.scissor(x, y, w, h);
            gl.enable(glow::SCISSOR_TEST);

            // Clear viewport area with configured background color
            gl.clear_color(
                params.bg_color[0] as f32 / 255.0,
                params.bg_color[1] as f32 / 255.0,
                params.bg_color[2] as f32 / 255.0,
                1.0,
            );
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);

            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LESS);
        }

        if params.grid.visible {
            let lines = grid::grid_segments(vp, params.grid.target_spacing_px, params.grid.major_every);
            self.draw_line_segments(gl, &lines.minor, params.grid.minor_color, vp);
            self.draw_line_segments(gl, &lines.major, params.grid.major_color, vp);
        }

        if params.axes.visible {
            let colors = [params.axes.x_color, params.axes.y_color, params.axes.z_color];
            for (segment, rgba) in grid::axis_segments(params.axes.length).iter().zip(colors) {
                self.draw_line_segments(gl, segment, rgba, vp);
            }
        }

        self.draw(gl, vp);

        unsafe {
            gl.disable(glow::DEPTH_TEST);
            gl.disable(glow::SCISSOR_TEST);
        }
    }

    // ── Transient lines ──────────────────────────────────────

    /// Draw point pairs as separate segments through a throwaway buffer
    pub fn draw_line_segments(&self, gl: &glow::Context, points: &[Vec3], rgba: u32, vp: &ViewportState) {
        self.draw_transient(gl, points, Topology::LineList, rgba, vp);
    }

    fn draw_transient(
        &self,
        gl: &glow::Context,
        points: &[Vec3],
        topology: Topology,
        rgba: u32,
        vp: &ViewportState,
    ) {
        let Some(program) = &self.program else {
            return;
        };
        if points.len() < 2 {
            return;
        }
        let data = BatchData {
            vertices: points.iter().flat_map(|p| p.to_array()).collect(),
            indices: Vec::new(),
            topology,
            rgba,
        };
        let batch = match GpuBatch::upload(gl, &data, glow::STREAM_DRAW) {
            Ok(batch) => batch,
            Err(e) => {
                tracing::error!("Transient line upload failed: {e}");
                return;
            }
        };
        unsafe {
            program.bind(gl, vp);
            program.set_color(gl, rgba);
            batch.draw(gl);
            gl.use_program(None);
        }
        batch.free(gl);
    }
}

impl Drop for GlRenderer {
    fn drop(&mut self) {
        if !self.batches.is_empty() {
            tracing::warn!(
                "GlRenderer dropped with {} live batch(es); call shutdown() before the GL context goes away",
                self.batches.len()
            );
        }
    }
}

// ── Shader compilation ───────────────────────────────────────

fn compile_program(gl: &glow::Context, vert_src: &str, frag_src: &str) -> Result<glow::Program, RenderError> {
    unsafe {
        let vert = compile_shader(gl, glow::VERTEX_SHADER, "Vertex", vert_src)?;
        let frag = match compile_shader(gl, glow::FRAGMENT_SHADER, "Fragment", frag_src) {
            Ok(frag) => frag,
            Err(e) => {
                gl.delete_shader(vert);
                return Err(e);
            }
        };

        let program = match gl.create_program() {
            Ok(program) => program,
            Err(e) => {
                gl.delete_shader(vert);
                gl.delete_shader(frag);
                return Err(RenderError::ResourceCreation(e));
            }
        };
        gl.attach_shader(program, vert);
        gl.attach_shader(program, frag);
        gl.link_program(program);
        let linked = gl.get_program_link_status(program);

        gl.detach_shader(program, vert);
        gl.detach_shader(program, frag);
        gl.delete_shader(vert);
        gl.delete_shader(frag);

        if !linked {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            return Err(RenderError::ProgramLink(log));
        }
        Ok(program)
    }
}

unsafe fn compile_shader(
    gl: &glow::Context,
    kind: u32,
    stage: &'static str,
    src: &str,
) -> Result<glow::Shader, RenderError> {
    let shader = gl.create_shader(kind).map_err(RenderError::ResourceCreation)?;
    gl.shader_source(shader, src);
    gl.compile_shader(shader);
    if !gl.get_shader_compile_status(shader) {
        let log = gl.get_shader_info_log(shader);
        gl.delete_shader(shader);
        return Err(RenderError::ShaderCompile { stage, log });
    }
    Ok(shader)
}

// ── Byte cast helper ─────────────────────────────────────────

fn bytemuck_cast_slice<T: Copy>(slice: &[T]) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(
            slice.as_ptr() as *const u8,
            std::mem::size_of_val(slice),
        )
    }
}

// ── Shaders ──────────────────────────────────────────────────

const LINE_VERT: &str = r#"#version 330 core
uniform mat4 u_mvp;

layout(location = 0) in vec3 a_position;

void main() {
    gl_Position = u_mvp * vec4(a_position, 1.0);
}
"#;

const LINE_FRAG: &str = r#"#version 330 core
uniform vec4 u_color;
out vec4 frag_color;

void main() {
    frag_color = u_color;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_renderer_is_inert() {
        let r = GlRenderer::new();
        assert!(!r.is_initialized());
        assert_eq!(r.batch_count(), 0);
    }

    #[test]
    fn test_inert_renderer_plans_nothing() {
        let mut doc = crate::fixtures::sample_document();
        let mut r = GlRenderer::new();

        assert!(r.plan_sync(&mut doc, 0.01, false).is_none());
        assert!(r.plan_sync(&mut doc, 0.01, true).is_none());

        assert_eq!(doc.dirty_count(), doc.len());
        assert_eq!(r.batch_count(), 0);
        assert_eq!(r.tracker_mut().last_world_per_pixel(), 0.0);
    }

    #[test]
    fn test_cast_slice_length() {
        let v = [1.0_f32, 2.0, 3.0];
        assert_eq!(bytemuck_cast_slice(&v).len(), 12);
    }
}
