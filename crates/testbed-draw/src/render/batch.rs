//! Fixed-capacity vertex batches, one per primitive kind.
//!
//! A [`BatchRenderer`] accumulates vertices on the CPU and hands them to its
//! [`GraphicsContext`] in one draw call when it is flushed. Submission is
//! unbounded even though storage is not: a submit into a full batch flushes
//! it first, so no vertex is dropped and no draw ever exceeds the capacity.

use std::fmt;

use super::gfx::{
    AttributeFormat, DrawCall, GraphicsContext, PrimitiveKind, ProgramLayout, VertexAttribute,
};
use super::shader::{self, ShaderSources};
use crate::camera::Camera;
use crate::color::Color;
use crate::config::ConfigError;
use crate::error::RenderError;
use crate::geometry::Vec2;

// ---------------------------------------------------------------------------
// Vertex types
// ---------------------------------------------------------------------------

/// A vertex layout a batch can upload verbatim.
pub trait BatchVertex: bytemuck::Pod + fmt::Debug {
    /// Shader-visible attributes, in buffer order.
    const ATTRIBUTES: &'static [VertexAttribute];

    /// Whether this layout can feed `kind`'s shaders.
    fn supports(kind: PrimitiveKind) -> bool;

    /// Program layout for `kind` built from this vertex type.
    fn layout(kind: PrimitiveKind) -> ProgramLayout {
        ProgramLayout {
            kind,
            stride: std::mem::size_of::<Self>() as u64,
            attributes: Self::ATTRIBUTES,
            topology: kind.topology(),
            blend: kind.blend(),
        }
    }
}

/// Point vertex: position, color and size in pixels.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck_derive::Pod, bytemuck_derive::Zeroable)]
pub struct PointVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
    pub size: f32,
}

impl PointVertex {
    #[inline]
    pub fn new(position: Vec2, color: Color, size: f32) -> Self {
        Self {
            position: position.into(),
            color: color.into(),
            size,
        }
    }
}

impl BatchVertex for PointVertex {
    const ATTRIBUTES: &'static [VertexAttribute] = &[
        VertexAttribute {
            name: "position",
            location: 0,
            format: AttributeFormat::Float32x2,
            offset: 0,
        },
        VertexAttribute {
            name: "color",
            location: 1,
            format: AttributeFormat::Float32x4,
            offset: 8,
        },
        VertexAttribute {
            name: "size",
            location: 2,
            format: AttributeFormat::Float32,
            offset: 24,
        },
    ];

    fn supports(kind: PrimitiveKind) -> bool {
        kind == PrimitiveKind::Point
    }
}

/// Line and triangle vertex: position and color.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck_derive::Pod, bytemuck_derive::Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl ColorVertex {
    #[inline]
    pub fn new(position: Vec2, color: Color) -> Self {
        Self {
            position: position.into(),
            color: color.into(),
        }
    }
}

impl BatchVertex for ColorVertex {
    const ATTRIBUTES: &'static [VertexAttribute] = &[
        VertexAttribute {
            name: "position",
            location: 0,
            format: AttributeFormat::Float32x2,
            offset: 0,
        },
        VertexAttribute {
            name: "color",
            location: 1,
            format: AttributeFormat::Float32x4,
            offset: 8,
        },
    ];

    fn supports(kind: PrimitiveKind) -> bool {
        matches!(kind, PrimitiveKind::Line | PrimitiveKind::Triangle)
    }
}

// ---------------------------------------------------------------------------
// BatchRenderer
// ---------------------------------------------------------------------------

/// Batched renderer for one primitive kind.
///
/// Owns its program and vertex buffer exclusively. Both are created in
/// [`new`](Self::new) and released in [`destroy`](Self::destroy); between
/// the two, only the number of pending vertices changes.
pub struct BatchRenderer<V: BatchVertex, G: GraphicsContext> {
    kind: PrimitiveKind,
    capacity: usize,
    vertices: Vec<V>,
    program: G::Program,
    buffer: G::Buffer,
}

/// Points renderer.
pub type PointRenderer<G> = BatchRenderer<PointVertex, G>;
/// Lines renderer.
pub type LineRenderer<G> = BatchRenderer<ColorVertex, G>;
/// Triangles renderer.
pub type TriangleRenderer<G> = BatchRenderer<ColorVertex, G>;

impl<V: BatchVertex, G: GraphicsContext> BatchRenderer<V, G> {
    /// Build the program for `kind`, allocate a buffer for `capacity`
    /// vertices and start with an empty batch.
    ///
    /// # Errors
    ///
    /// A zero `capacity`, shader compile/link failures and buffer
    /// allocation failures. Nothing is leaked on failure.
    pub fn new(gfx: &mut G, kind: PrimitiveKind, capacity: usize) -> Result<Self, RenderError> {
        debug_assert!(V::supports(kind), "{kind} cannot be fed with this vertex type");
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity { kind }.into());
        }

        let layout = V::layout(kind);
        let program = shader::build_program(gfx, ShaderSources::for_kind(kind), &layout)?;

        let size = (capacity * std::mem::size_of::<V>()) as u64;
        let buffer = match gfx.create_vertex_buffer(&format!("debug {kind} vertices"), size) {
            Ok(buffer) => buffer,
            Err(e) => {
                gfx.destroy_program(program);
                return Err(e);
            }
        };

        tracing::debug!(kind = %kind, capacity, bytes = size, "batch renderer created");

        Ok(Self {
            kind,
            capacity,
            vertices: Vec::with_capacity(capacity),
            program,
            buffer,
        })
    }

    /// Append one vertex, flushing first if the batch is full.
    ///
    /// The vertex is always accepted. An error means the flush it triggered
    /// failed; those vertices are gone but the batch is consistent.
    pub fn submit(&mut self, gfx: &mut G, camera: &Camera, vertex: V) -> Result<(), RenderError> {
        let flushed = if self.vertices.len() == self.capacity {
            self.flush(gfx, camera)
        } else {
            Ok(())
        };
        self.vertices.push(vertex);
        flushed
    }

    /// Draw the pending vertices in one call and empty the batch.
    ///
    /// A no-op when nothing is pending, so calling it twice in a row issues
    /// at most one draw.
    pub fn flush(&mut self, gfx: &mut G, camera: &Camera) -> Result<(), RenderError> {
        if self.vertices.is_empty() {
            return Ok(());
        }

        let count = self.vertices.len();
        let call = DrawCall {
            kind: self.kind,
            projection: camera.build_projection_matrix(self.kind.z_bias()),
            viewport: [camera.width as f32, camera.height as f32],
            vertices: bytemuck::cast_slice(&self.vertices),
            vertex_count: count as u32,
        };
        let result = gfx.draw(&self.program, &self.buffer, call);
        self.vertices.clear();

        tracing::trace!(kind = %self.kind, vertices = count, "batch flushed");
        result
    }

    /// Release the program and buffer. Pending vertices are discarded.
    pub fn destroy(self, gfx: &mut G) {
        if !self.vertices.is_empty() {
            tracing::debug!(
                kind = %self.kind,
                vertices = self.vertices.len(),
                "destroying batch with unflushed vertices"
            );
        }
        gfx.destroy_buffer(self.buffer);
        gfx.destroy_program(self.program);
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Pending vertex count.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layouts_match_struct_sizes() {
        assert_eq!(std::mem::size_of::<PointVertex>(), 28);
        assert_eq!(std::mem::size_of::<ColorVertex>(), 24);

        let points = PointVertex::layout(PrimitiveKind::Point);
        assert_eq!(points.stride, 28);
        let last = points.attributes.last().unwrap();
        assert_eq!(last.offset + last.format.size(), points.stride);

        let lines = ColorVertex::layout(PrimitiveKind::Line);
        assert_eq!(lines.stride, 24);
        assert_eq!(lines.attributes.len(), 2);
    }

    #[test]
    fn vertex_kind_support() {
        assert!(PointVertex::supports(PrimitiveKind::Point));
        assert!(!PointVertex::supports(PrimitiveKind::Line));
        assert!(ColorVertex::supports(PrimitiveKind::Triangle));
        assert!(!ColorVertex::supports(PrimitiveKind::Point));
    }
}
