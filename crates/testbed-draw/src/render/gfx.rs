//! The graphics-context seam.
//!
//! Batch renderers never talk to a GPU API directly. They hold opaque
//! handles minted by a [`GraphicsContext`] and hand each flushed batch back
//! to it as a [`DrawCall`]. The context is assumed to be current on the
//! calling thread; this crate never creates windows or devices itself.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::camera::Mat4;
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Primitive kinds
// ---------------------------------------------------------------------------

/// One of the three batched primitive kinds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    Point,
    Line,
    Triangle,
}

impl PrimitiveKind {
    /// Kinds in the order the facade flushes them.
    pub const FLUSH_ORDER: [PrimitiveKind; 3] = [
        PrimitiveKind::Triangle,
        PrimitiveKind::Line,
        PrimitiveKind::Point,
    ];

    /// Depth each kind is pushed to. Points sit nearest, triangles farthest.
    pub const fn z_bias(self) -> f32 {
        match self {
            PrimitiveKind::Point => 0.0,
            PrimitiveKind::Line => 0.1,
            PrimitiveKind::Triangle => 0.2,
        }
    }

    /// Default number of vertices a batch of this kind holds.
    pub const fn default_capacity(self) -> usize {
        match self {
            PrimitiveKind::Point => 512,
            PrimitiveKind::Line => 2 * 512,
            PrimitiveKind::Triangle => 3 * 512,
        }
    }

    /// Vertices that make up one primitive of this kind.
    pub const fn vertices_per_primitive(self) -> usize {
        match self {
            PrimitiveKind::Point => 1,
            PrimitiveKind::Line => 2,
            PrimitiveKind::Triangle => 3,
        }
    }

    pub const fn topology(self) -> Topology {
        match self {
            PrimitiveKind::Point => Topology::Points,
            PrimitiveKind::Line => Topology::Lines,
            PrimitiveKind::Triangle => Topology::Triangles,
        }
    }

    /// Only filled triangles blend; points and lines overwrite.
    pub const fn blend(self) -> BlendMode {
        match self {
            PrimitiveKind::Triangle => BlendMode::Alpha,
            PrimitiveKind::Point | PrimitiveKind::Line => BlendMode::Replace,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            PrimitiveKind::Point => "points",
            PrimitiveKind::Line => "lines",
            PrimitiveKind::Triangle => "triangles",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Program description
// ---------------------------------------------------------------------------

/// Independent shader stage.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// Entry point every source for this stage must define.
    pub const fn entry_point(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vs_main",
            ShaderStage::Fragment => "fs_main",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Draw topology.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Topology {
    Points,
    Lines,
    Triangles,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Blending disabled.
    Replace,
    /// `src_alpha, one_minus_src_alpha`.
    Alpha,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AttributeFormat {
    Float32,
    Float32x2,
    Float32x4,
}

impl AttributeFormat {
    pub const fn size(self) -> u64 {
        match self {
            AttributeFormat::Float32 => 4,
            AttributeFormat::Float32x2 => 8,
            AttributeFormat::Float32x4 => 16,
        }
    }
}

/// One per-vertex attribute as the vertex shader sees it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    pub name: &'static str,
    pub location: u32,
    pub format: AttributeFormat,
    pub offset: u64,
}

/// Everything a context needs to link a program for one primitive kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramLayout {
    pub kind: PrimitiveKind,
    pub stride: u64,
    pub attributes: &'static [VertexAttribute],
    pub topology: Topology,
    pub blend: BlendMode,
}

// ---------------------------------------------------------------------------
// Draw call
// ---------------------------------------------------------------------------

/// One flushed batch.
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    pub kind: PrimitiveKind,
    /// Value for the projection uniform.
    pub projection: Mat4,
    /// Viewport size in pixels, for kinds that size things in pixels.
    pub viewport: [f32; 2],
    /// The first `vertex_count` vertices, tightly packed.
    pub vertices: &'a [u8],
    pub vertex_count: u32,
}

// ---------------------------------------------------------------------------
// GraphicsContext
// ---------------------------------------------------------------------------

/// A bound graphics context able to build programs, own vertex buffers and
/// issue draw calls.
///
/// Handles returned from this trait are owned by exactly one renderer and are
/// handed back through `destroy_*` once at teardown.
pub trait GraphicsContext {
    type Shader;
    type Program;
    type Buffer;

    /// Compile one shader stage from source text.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::ShaderCompile`] with the compiler diagnostic.
    fn compile_shader(
        &mut self,
        label: &str,
        stage: ShaderStage,
        source: &str,
    ) -> Result<Self::Shader, RenderError>;

    /// Link a vertex and fragment stage into a program for `layout`.
    ///
    /// Both shader handles are consumed and released whether or not linking
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::ShaderLink`] with the linker diagnostic.
    fn link_program(
        &mut self,
        label: &str,
        vertex: Self::Shader,
        fragment: Self::Shader,
        layout: &ProgramLayout,
    ) -> Result<Self::Program, RenderError>;

    /// Allocate a vertex buffer of `size` bytes.
    fn create_vertex_buffer(&mut self, label: &str, size: u64)
        -> Result<Self::Buffer, RenderError>;

    /// Upload `call.vertices` into `buffer`, bind `program` with
    /// `call.projection` and issue exactly one draw.
    fn draw(
        &mut self,
        program: &Self::Program,
        buffer: &Self::Buffer,
        call: DrawCall<'_>,
    ) -> Result<(), RenderError>;

    /// Release a compiled stage that will never be linked.
    fn destroy_shader(&mut self, shader: Self::Shader);

    fn destroy_buffer(&mut self, buffer: Self::Buffer);

    fn destroy_program(&mut self, program: Self::Program);
}
