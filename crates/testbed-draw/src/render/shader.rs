//! Shader program builder.
//!
//! Compiles a vertex/fragment pair through the [`GraphicsContext`] and links
//! them. Compile diagnostics are logged before the error is returned, and a
//! failed stage is never passed on to linking.

use super::gfx::{GraphicsContext, PrimitiveKind, ProgramLayout, ShaderStage};
use crate::error::RenderError;

/// Vertex stage for points (instanced quad expansion).
pub const POINT_VERTEX_SHADER: &str = include_str!("shaders/point.vert.wgsl");

/// Vertex stage shared by lines and triangles.
pub const COLOR_VERTEX_SHADER: &str = include_str!("shaders/color.vert.wgsl");

/// Pass-through fragment stage shared by every kind.
pub const COLOR_FRAGMENT_SHADER: &str = include_str!("shaders/color.frag.wgsl");

/// Name of the projection uniform block member in every vertex stage.
pub const PROJECTION_UNIFORM: &str = "projectionMatrix";

/// Source text for both stages of one program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: &'static str,
    pub fragment: &'static str,
}

impl ShaderSources {
    pub const fn for_kind(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Point => Self {
                vertex: POINT_VERTEX_SHADER,
                fragment: COLOR_FRAGMENT_SHADER,
            },
            PrimitiveKind::Line | PrimitiveKind::Triangle => Self {
                vertex: COLOR_VERTEX_SHADER,
                fragment: COLOR_FRAGMENT_SHADER,
            },
        }
    }
}

/// Compile one stage, logging the diagnostic on failure.
pub fn compile_shader<G: GraphicsContext>(
    gfx: &mut G,
    label: &str,
    stage: ShaderStage,
    source: &str,
) -> Result<G::Shader, RenderError> {
    gfx.compile_shader(label, stage, source).inspect_err(|e| {
        tracing::error!(label, %stage, error = %e, "shader compilation failed");
    })
}

/// Link two compiled stages, logging the diagnostic on failure.
pub fn link_program<G: GraphicsContext>(
    gfx: &mut G,
    label: &str,
    vertex: G::Shader,
    fragment: G::Shader,
    layout: &ProgramLayout,
) -> Result<G::Program, RenderError> {
    gfx.link_program(label, vertex, fragment, layout)
        .inspect_err(|e| {
            tracing::error!(label, error = %e, "shader program link failed");
        })
}

/// Compile and link the program for `layout.kind` from `sources`.
///
/// # Errors
///
/// Returns the first compile error, or the link error. Either one leaves no
/// GPU objects behind.
pub fn build_program<G: GraphicsContext>(
    gfx: &mut G,
    sources: ShaderSources,
    layout: &ProgramLayout,
) -> Result<G::Program, RenderError> {
    let label = format!("debug {}", layout.kind);
    let vertex = compile_shader(gfx, &label, ShaderStage::Vertex, sources.vertex)?;
    let fragment = match compile_shader(gfx, &label, ShaderStage::Fragment, sources.fragment) {
        Ok(fragment) => fragment,
        Err(e) => {
            gfx.destroy_shader(vertex);
            return Err(e);
        }
    };
    let program = link_program(gfx, &label, vertex, fragment, layout)?;
    tracing::debug!(label = %label, "shader program linked");
    Ok(program)
}
