//! The debug draw facade.
//!
//! [`DebugDraw`] owns a graphics context and one batch renderer per
//! primitive kind. Drawing happens through a [`DebugFrame`], which borrows
//! the facade together with the camera for the frame so that any batch that
//! fills up can flush on the spot:
//!
//! ```
//! use testbed_draw::prelude::*;
//!
//! let mut draw = DebugDraw::new(HeadlessContext::new(), DebugDrawConfig::default())?;
//! let camera = Camera::default();
//!
//! let mut frame = draw.begin(&camera);
//! frame.draw_solid_polygon(
//!     &[Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)],
//!     Color::rgb(0.5, 0.9, 0.5),
//! );
//! frame.draw_point(Vec2::new(2.0, 2.0), 5.0, Color::RED);
//! frame.finish()?;
//!
//! let kinds: Vec<_> = draw.context().events().iter().map(|e| e.kind).collect();
//! assert_eq!(kinds, [PrimitiveKind::Triangle, PrimitiveKind::Line, PrimitiveKind::Point]);
//! # Ok::<(), RenderError>(())
//! ```
//!
//! Glyph text is held back until the shape batches are flushed and then
//! drawn through the triangle batch on its own, so it lands on top.
//!
//! Shape calls never fail. An error from a flush they trigger is logged and
//! the batch carries on empty; errors from [`DebugFrame::finish`] and
//! [`DebugDraw::flush_all`] are returned.

use std::fmt;

use crate::camera::Camera;
use crate::color::Color;
use crate::config::DebugDrawConfig;
use crate::error::RenderError;
use crate::geometry::{Aabb, Transform, Vec2};
use crate::render::batch::{ColorVertex, LineRenderer, PointRenderer, PointVertex, TriangleRenderer};
use crate::render::gfx::{GraphicsContext, PrimitiveKind};
use crate::text::{self, TextOverlay};

/// Segments used to approximate every circle.
pub const CIRCLE_SEGMENTS: usize = 16;

/// Length of the axes drawn by [`DebugFrame::draw_transform`].
pub const AXIS_SCALE: f32 = 0.4;

// ---------------------------------------------------------------------------
// DebugDraw
// ---------------------------------------------------------------------------

/// Batched debug renderer for one graphics context.
pub struct DebugDraw<G: GraphicsContext> {
    gfx: G,
    points: PointRenderer<G>,
    lines: LineRenderer<G>,
    triangles: TriangleRenderer<G>,
    glyphs: Vec<ColorVertex>,
    overlay: Option<Box<dyn TextOverlay>>,
    text_color: Color,
    glyph_scale: f32,
}

impl<G: GraphicsContext> DebugDraw<G> {
    /// Create the point, line and triangle renderers, in that order.
    ///
    /// # Errors
    ///
    /// An invalid `config`, or the first renderer that fails to build. The
    /// renderers already built are destroyed before returning.
    pub fn new(mut gfx: G, config: DebugDrawConfig) -> Result<Self, RenderError> {
        config.validate()?;

        let points = PointRenderer::new(&mut gfx, PrimitiveKind::Point, config.point_capacity)?;
        let lines = match LineRenderer::new(&mut gfx, PrimitiveKind::Line, config.line_capacity) {
            Ok(lines) => lines,
            Err(e) => {
                points.destroy(&mut gfx);
                return Err(e);
            }
        };
        let triangles =
            match TriangleRenderer::new(&mut gfx, PrimitiveKind::Triangle, config.triangle_capacity)
            {
                Ok(triangles) => triangles,
                Err(e) => {
                    lines.destroy(&mut gfx);
                    points.destroy(&mut gfx);
                    return Err(e);
                }
            };

        tracing::info!(
            points = config.point_capacity,
            lines = config.line_capacity,
            triangles = config.triangle_capacity,
            "debug draw initialized"
        );

        Ok(Self {
            gfx,
            points,
            lines,
            triangles,
            glyphs: Vec::new(),
            overlay: None,
            text_color: config.text_color,
            glyph_scale: config.glyph_scale,
        })
    }

    /// Start drawing a frame seen through `camera`.
    pub fn begin<'a>(&'a mut self, camera: &'a Camera) -> DebugFrame<'a, G> {
        DebugFrame {
            draw: self,
            camera,
            finished: false,
        }
    }

    /// Flush triangles, then lines, then points, then any glyph text.
    ///
    /// Every batch is flushed even if an earlier one fails; the first error
    /// is returned.
    pub fn flush_all(&mut self, camera: &Camera) -> Result<(), RenderError> {
        let triangles = self.triangles.flush(&mut self.gfx, camera);
        let lines = self.lines.flush(&mut self.gfx, camera);
        let points = self.points.flush(&mut self.gfx, camera);
        let text = self.flush_glyphs(camera);
        triangles.and(lines).and(points).and(text)
    }

    /// Push the queued glyph quads through the (now empty) triangle batch.
    fn flush_glyphs(&mut self, camera: &Camera) -> Result<(), RenderError> {
        if self.glyphs.is_empty() {
            return Ok(());
        }
        let mut result = Ok(());
        for vertex in self.glyphs.drain(..) {
            if let Err(e) = self.triangles.submit(&mut self.gfx, camera, vertex) {
                result = result.and(Err(e));
            }
        }
        result.and(self.triangles.flush(&mut self.gfx, camera))
    }

    /// Vertices waiting in the batch for `kind`. Queued glyph text is not
    /// counted; see [`pending_text`](Self::pending_text).
    pub fn pending(&self, kind: PrimitiveKind) -> usize {
        match kind {
            PrimitiveKind::Point => self.points.len(),
            PrimitiveKind::Line => self.lines.len(),
            PrimitiveKind::Triangle => self.triangles.len(),
        }
    }

    /// Glyph vertices queued for the end of the frame.
    pub fn pending_text(&self) -> usize {
        self.glyphs.len()
    }

    /// Route strings to `overlay` instead of the built-in glyph font.
    pub fn set_overlay(&mut self, overlay: impl TextOverlay + 'static) {
        self.overlay = Some(Box::new(overlay));
    }

    /// Remove the text overlay, falling back to the glyph font.
    pub fn take_overlay(&mut self) -> Option<Box<dyn TextOverlay>> {
        self.overlay.take()
    }

    pub fn text_color(&self) -> Color {
        self.text_color
    }

    pub fn context(&self) -> &G {
        &self.gfx
    }

    pub fn context_mut(&mut self) -> &mut G {
        &mut self.gfx
    }

    /// Destroy the renderers in reverse creation order and hand the context
    /// back. Pending vertices and queued text are discarded.
    pub fn destroy(mut self) -> G {
        self.triangles.destroy(&mut self.gfx);
        self.lines.destroy(&mut self.gfx);
        self.points.destroy(&mut self.gfx);
        tracing::debug!("debug draw destroyed");
        self.gfx
    }
}

impl<G: GraphicsContext> fmt::Debug for DebugDraw<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugDraw")
            .field("points", &self.points.len())
            .field("lines", &self.lines.len())
            .field("triangles", &self.triangles.len())
            .field("glyphs", &self.glyphs.len())
            .field("overlay", &self.overlay.is_some())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// DebugFrame
// ---------------------------------------------------------------------------

/// One frame of debug drawing.
///
/// Call [`finish`](Self::finish) once everything is submitted. A frame
/// dropped without it still flushes, logging any error.
pub struct DebugFrame<'a, G: GraphicsContext> {
    draw: &'a mut DebugDraw<G>,
    camera: &'a Camera,
    finished: bool,
}

fn log_flush_error(kind: PrimitiveKind, error: &RenderError) {
    tracing::warn!(kind = %kind, error = %error, "automatic batch flush failed");
}

impl<G: GraphicsContext> DebugFrame<'_, G> {
    pub fn camera(&self) -> &Camera {
        self.camera
    }

    // -- batch plumbing --

    fn point(&mut self, vertex: PointVertex) {
        let draw = &mut *self.draw;
        if let Err(e) = draw.points.submit(&mut draw.gfx, self.camera, vertex) {
            log_flush_error(PrimitiveKind::Point, &e);
        }
    }

    fn line_vertex(&mut self, vertex: ColorVertex) {
        let draw = &mut *self.draw;
        if let Err(e) = draw.lines.submit(&mut draw.gfx, self.camera, vertex) {
            log_flush_error(PrimitiveKind::Line, &e);
        }
    }

    fn triangle_vertex(&mut self, vertex: ColorVertex) {
        let draw = &mut *self.draw;
        if let Err(e) = draw.triangles.submit(&mut draw.gfx, self.camera, vertex) {
            log_flush_error(PrimitiveKind::Triangle, &e);
        }
    }

    fn line(&mut self, a: Vec2, b: Vec2, color: Color) {
        self.line_vertex(ColorVertex::new(a, color));
        self.line_vertex(ColorVertex::new(b, color));
    }

    fn triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Color) {
        self.triangle_vertex(ColorVertex::new(a, color));
        self.triangle_vertex(ColorVertex::new(b, color));
        self.triangle_vertex(ColorVertex::new(c, color));
    }

    fn outline(&mut self, vertices: &[Vec2], color: Color) {
        let Some(&last) = vertices.last() else {
            return;
        };
        let mut p1 = last;
        for &p2 in vertices {
            self.line(p1, p2, color);
            p1 = p2;
        }
    }

    fn circle_outline(&mut self, center: Vec2, radius: f32, color: Color) {
        let (sin_inc, cos_inc) = circle_increment();
        let mut r1 = Vec2::new(1.0, 0.0);
        let mut v1 = center + radius * r1;
        for _ in 0..CIRCLE_SEGMENTS {
            let r2 = rotate(r1, sin_inc, cos_inc);
            let v2 = center + radius * r2;
            self.line(v1, v2, color);
            r1 = r2;
            v1 = v2;
        }
    }

    // -- shapes --

    /// Closed outline through `vertices`, starting with the edge from the
    /// last vertex back to the first.
    pub fn draw_polygon(&mut self, vertices: &[Vec2], color: Color) {
        if vertices.is_empty() {
            tracing::debug!("draw_polygon called with no vertices");
            return;
        }
        self.outline(vertices, color);
    }

    /// Fan-filled polygon at half intensity, then its full-color outline.
    ///
    /// Fewer than three vertices produce only the outline.
    pub fn draw_solid_polygon(&mut self, vertices: &[Vec2], color: Color) {
        if vertices.is_empty() {
            tracing::debug!("draw_solid_polygon called with no vertices");
            return;
        }

        let fill = color.fill();
        let v0 = vertices[0];
        for pair in vertices[1..].windows(2) {
            self.triangle(v0, pair[0], pair[1], fill);
        }

        self.outline(vertices, color);
    }

    /// 16-segment circle outline.
    pub fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.circle_outline(center, radius, color);
    }

    /// 16-segment filled circle with its outline and a radius line along
    /// `axis` showing orientation.
    pub fn draw_solid_circle(&mut self, center: Vec2, radius: f32, axis: Vec2, color: Color) {
        let (sin_inc, cos_inc) = circle_increment();
        let fill = color.fill();

        let mut r1 = Vec2::new(cos_inc, sin_inc);
        let mut v1 = center + radius * r1;
        for _ in 0..CIRCLE_SEGMENTS {
            let r2 = rotate(r1, sin_inc, cos_inc);
            let v2 = center + radius * r2;
            self.triangle(center, v1, v2, fill);
            r1 = r2;
            v1 = v2;
        }

        self.circle_outline(center, radius, color);
        self.line(center, center + radius * axis, color);
    }

    pub fn draw_segment(&mut self, p1: Vec2, p2: Vec2, color: Color) {
        self.line(p1, p2, color);
    }

    /// X axis in red and Y axis in green, [`AXIS_SCALE`] long.
    pub fn draw_transform(&mut self, xf: Transform) {
        let p = xf.p;
        self.line(p, p + AXIS_SCALE * xf.q.x_axis(), Color::RED);
        self.line(p, p + AXIS_SCALE * xf.q.y_axis(), Color::GREEN);
    }

    /// One point `size` pixels wide.
    pub fn draw_point(&mut self, p: Vec2, size: f32, color: Color) {
        self.point(PointVertex::new(p, color, size));
    }

    pub fn draw_aabb(&mut self, aabb: Aabb, color: Color) {
        let [p1, p2, p3, p4] = aabb.corners();
        self.line(p1, p2, color);
        self.line(p2, p3, color);
        self.line(p3, p4, color);
        self.line(p4, p1, color);
    }

    // -- text --

    /// Overlay text with its top-left corner at `screen` (pixels).
    ///
    /// Without a [`TextOverlay`] the text is drawn with the glyph font after
    /// every shape of the frame.
    pub fn draw_string(&mut self, screen: Vec2, text: impl fmt::Display) {
        let text = text.to_string();
        let color = self.draw.text_color;

        if let Some(overlay) = self.draw.overlay.as_mut() {
            overlay.draw_text(screen, color, &text);
            return;
        }

        let scale = self.draw.glyph_scale;
        for pixel in text::rasterize(&text, screen, scale) {
            let top_left = self.camera.screen_to_world(pixel.min);
            let bottom_right = self.camera.screen_to_world(pixel.max);
            let top_right = Vec2::new(bottom_right.x, top_left.y);
            let bottom_left = Vec2::new(top_left.x, bottom_right.y);
            self.draw.glyphs.extend(
                [top_left, bottom_left, bottom_right, top_left, bottom_right, top_right]
                    .map(|p| ColorVertex::new(p, color)),
            );
        }
    }

    /// Screen size of `text` in the glyph font at the configured scale.
    pub fn text_size(&self, text: &str) -> Vec2 {
        let scale = self.draw.glyph_scale;
        Vec2::new(text::text_width(text, scale), text::text_height(text, scale))
    }

    /// Overlay text anchored at a world position.
    pub fn draw_string_world(&mut self, world: Vec2, text: impl fmt::Display) {
        let screen = self.camera.world_to_screen(world);
        self.draw_string(screen, text);
    }

    /// Flush every batch and end the frame.
    pub fn finish(mut self) -> Result<(), RenderError> {
        self.finished = true;
        self.draw.flush_all(self.camera)
    }
}

impl<G: GraphicsContext> Drop for DebugFrame<'_, G> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(e) = self.draw.flush_all(self.camera) {
            tracing::warn!(error = %e, "flush of unfinished debug frame failed");
        }
    }
}

fn circle_increment() -> (f32, f32) {
    let increment = 2.0 * std::f32::consts::PI / CIRCLE_SEGMENTS as f32;
    increment.sin_cos()
}

#[inline]
fn rotate(r: Vec2, sin: f32, cos: f32) -> Vec2 {
    Vec2::new(cos * r.x - sin * r.y, sin * r.x + cos * r.y)
}
