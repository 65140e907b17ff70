//! GPU-less graphics context.
//!
//! [`HeadlessContext`] implements [`GraphicsContext`] by recording every
//! draw it receives. It is what the test suite renders into, and it is
//! useful anywhere the debug draw stream should be inspected rather than
//! shown (CI, replays, golden comparisons).

use super::batch::{ColorVertex, PointVertex};
use super::gfx::{
    BlendMode, DrawCall, GraphicsContext, PrimitiveKind, ProgramLayout, ShaderStage, Topology,
};
use crate::camera::Mat4;
use crate::error::RenderError;

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawEvent {
    pub kind: PrimitiveKind,
    pub topology: Topology,
    pub blend: BlendMode,
    pub projection: Mat4,
    pub viewport: [f32; 2],
    pub vertex_count: u32,
    /// Uploaded vertex data, reinterpreted as floats.
    pub data: Vec<f32>,
}

impl DrawEvent {
    /// Vertices of a line or triangle draw.
    pub fn color_vertices(&self) -> &[ColorVertex] {
        debug_assert_ne!(self.kind, PrimitiveKind::Point);
        bytemuck::cast_slice(&self.data)
    }

    /// Vertices of a point draw.
    pub fn point_vertices(&self) -> &[PointVertex] {
        debug_assert_eq!(self.kind, PrimitiveKind::Point);
        bytemuck::cast_slice(&self.data)
    }
}

#[derive(Debug)]
pub struct HeadlessShader {
    stage: ShaderStage,
}

#[derive(Debug)]
pub struct HeadlessProgram {
    layout: ProgramLayout,
}

#[derive(Debug)]
pub struct HeadlessBuffer {
    size: u64,
}

/// Recording graphics context.
#[derive(Debug, Default)]
pub struct HeadlessContext {
    events: Vec<DrawEvent>,
    live_shaders: usize,
    live_programs: usize,
    live_buffers: usize,
    fail_compile: Option<ShaderStage>,
    fail_link: bool,
    fail_draw: Option<PrimitiveKind>,
}

impl HeadlessContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every compile of `stage` fail.
    pub fn with_compile_failure(mut self, stage: ShaderStage) -> Self {
        self.fail_compile = Some(stage);
        self
    }

    /// Make every link fail.
    pub fn with_link_failure(mut self) -> Self {
        self.fail_link = true;
        self
    }

    /// Make draws of `kind` report a graphics error (after recording them).
    pub fn fail_draws_of(&mut self, kind: Option<PrimitiveKind>) {
        self.fail_draw = kind;
    }

    /// Every draw recorded so far, in submission order.
    pub fn events(&self) -> &[DrawEvent] {
        &self.events
    }

    /// Drain the recorded draws.
    pub fn take_events(&mut self) -> Vec<DrawEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn draw_count(&self) -> usize {
        self.events.len()
    }

    /// Recorded draws of one kind.
    pub fn draws_of(&self, kind: PrimitiveKind) -> impl Iterator<Item = &DrawEvent> + '_ {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    /// Total vertices drawn for one kind across all recorded draws.
    pub fn vertices_drawn(&self, kind: PrimitiveKind) -> usize {
        self.draws_of(kind).map(|e| e.vertex_count as usize).sum()
    }

    /// Shader handles that were compiled but not yet consumed by a link.
    pub fn live_shaders(&self) -> usize {
        self.live_shaders
    }

    pub fn live_programs(&self) -> usize {
        self.live_programs
    }

    pub fn live_buffers(&self) -> usize {
        self.live_buffers
    }
}

impl GraphicsContext for HeadlessContext {
    type Shader = HeadlessShader;
    type Program = HeadlessProgram;
    type Buffer = HeadlessBuffer;

    fn compile_shader(
        &mut self,
        label: &str,
        stage: ShaderStage,
        source: &str,
    ) -> Result<HeadlessShader, RenderError> {
        if self.fail_compile == Some(stage) {
            return Err(RenderError::ShaderCompile {
                label: label.to_owned(),
                stage,
                log: "compilation disabled for this stage".to_owned(),
            });
        }
        let entry = format!("fn {}", stage.entry_point());
        if !source.contains(&entry) {
            return Err(RenderError::ShaderCompile {
                label: label.to_owned(),
                stage,
                log: format!("missing entry point `{}`", stage.entry_point()),
            });
        }
        self.live_shaders += 1;
        Ok(HeadlessShader { stage })
    }

    fn link_program(
        &mut self,
        label: &str,
        vertex: HeadlessShader,
        fragment: HeadlessShader,
        layout: &ProgramLayout,
    ) -> Result<HeadlessProgram, RenderError> {
        // Stages are released whatever the outcome.
        self.live_shaders -= 2;

        if self.fail_link {
            return Err(RenderError::ShaderLink {
                label: label.to_owned(),
                log: "linking disabled".to_owned(),
            });
        }
        if vertex.stage != ShaderStage::Vertex || fragment.stage != ShaderStage::Fragment {
            return Err(RenderError::ShaderLink {
                label: label.to_owned(),
                log: "stages attached in the wrong slots".to_owned(),
            });
        }
        self.live_programs += 1;
        Ok(HeadlessProgram {
            layout: layout.clone(),
        })
    }

    fn create_vertex_buffer(&mut self, _label: &str, size: u64) -> Result<HeadlessBuffer, RenderError> {
        self.live_buffers += 1;
        Ok(HeadlessBuffer { size })
    }

    fn draw(
        &mut self,
        program: &HeadlessProgram,
        buffer: &HeadlessBuffer,
        call: DrawCall<'_>,
    ) -> Result<(), RenderError> {
        let requested = call.vertices.len() as u64;
        if requested > buffer.size {
            return Err(RenderError::BufferOverflow {
                capacity: buffer.size,
                requested,
            });
        }

        self.events.push(DrawEvent {
            kind: call.kind,
            topology: program.layout.topology,
            blend: program.layout.blend,
            projection: call.projection,
            viewport: call.viewport,
            vertex_count: call.vertex_count,
            data: bytemuck::cast_slice(call.vertices).to_vec(),
        });

        if self.fail_draw == Some(call.kind) {
            return Err(RenderError::Graphics {
                operation: format!("draw {}", call.kind),
                message: "injected failure".to_owned(),
            });
        }
        Ok(())
    }

    fn destroy_shader(&mut self, _shader: HeadlessShader) {
        self.live_shaders -= 1;
    }

    fn destroy_buffer(&mut self, _buffer: HeadlessBuffer) {
        self.live_buffers -= 1;
    }

    fn destroy_program(&mut self, _program: HeadlessProgram) {
        self.live_programs -= 1;
    }
}
