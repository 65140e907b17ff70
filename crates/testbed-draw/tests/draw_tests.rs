//! Shape decomposition and frame flushing through the facade.

use std::cell::RefCell;
use std::rc::Rc;

use testbed_draw::draw::{AXIS_SCALE, CIRCLE_SEGMENTS};
use testbed_draw::prelude::*;
use testbed_draw::text;

const EPS: f32 = 1e-4;

fn new_draw() -> DebugDraw<HeadlessContext> {
    DebugDraw::new(HeadlessContext::new(), DebugDrawConfig::default()).unwrap()
}

fn pos(v: &ColorVertex) -> Vec2 {
    Vec2::from(v.position)
}

fn close(a: Vec2, b: Vec2) -> bool {
    (a - b).length() < EPS
}

/// Line draws as (start, end) pairs.
fn segments(gfx: &HeadlessContext) -> Vec<(Vec2, Vec2)> {
    gfx.draws_of(PrimitiveKind::Line)
        .flat_map(|e| {
            e.color_vertices()
                .chunks_exact(2)
                .map(|s| (pos(&s[0]), pos(&s[1])))
                .collect::<Vec<_>>()
        })
        .collect()
}

fn line_colors(gfx: &HeadlessContext) -> Vec<[f32; 4]> {
    gfx.draws_of(PrimitiveKind::Line)
        .flat_map(|e| e.color_vertices().iter().map(|v| v.color).collect::<Vec<_>>())
        .collect()
}

fn triangle_count(gfx: &HeadlessContext) -> usize {
    gfx.vertices_drawn(PrimitiveKind::Triangle) / 3
}

// ---------------------------------------------------------------------------
// Polygons
// ---------------------------------------------------------------------------

#[test]
fn polygon_outline_is_closed() {
    let a = Vec2::new(0.0, 0.0);
    let b = Vec2::new(2.0, 0.0);
    let c = Vec2::new(1.0, 3.0);

    let mut draw = new_draw();
    let camera = Camera::new(800, 600);
    let mut frame = draw.begin(&camera);
    frame.draw_polygon(&[a, b, c], Color::WHITE);
    frame.finish().unwrap();

    assert_eq!(segments(draw.context()), vec![(c, a), (a, b), (b, c)]);
    assert_eq!(draw.context().draw_count(), 1);
}

#[test]
fn empty_polygon_draws_nothing() {
    let mut draw = new_draw();
    let camera = Camera::new(800, 600);
    let mut frame = draw.begin(&camera);
    frame.draw_polygon(&[], Color::WHITE);
    frame.draw_solid_polygon(&[], Color::WHITE);
    frame.finish().unwrap();

    assert_eq!(draw.context().draw_count(), 0);
}

#[test]
fn solid_polygon_fans_then_outlines() {
    let vertices = [
        Vec2::new(0.0, 0.0),
        Vec2::new(2.0, 0.0),
        Vec2::new(3.0, 1.0),
        Vec2::new(2.0, 2.0),
        Vec2::new(0.0, 2.0),
    ];
    let color = Color::rgb(0.8, 0.6, 0.4);

    let mut draw = new_draw();
    let camera = Camera::new(800, 600);
    let mut frame = draw.begin(&camera);
    frame.draw_solid_polygon(&vertices, color);
    frame.finish().unwrap();

    let gfx = draw.context();
    assert_eq!(triangle_count(gfx), vertices.len() - 2);
    assert_eq!(segments(gfx).len(), vertices.len());

    let tris = gfx.draws_of(PrimitiveKind::Triangle).next().unwrap().color_vertices();
    for (i, tri) in tris.chunks_exact(3).enumerate() {
        assert_eq!(pos(&tri[0]), vertices[0]);
        assert_eq!(pos(&tri[1]), vertices[i + 1]);
        assert_eq!(pos(&tri[2]), vertices[i + 2]);
        assert_eq!(tri[0].color, [0.4, 0.3, 0.2, 0.5]);
    }
    assert!(line_colors(gfx).iter().all(|c| *c == [0.8, 0.6, 0.4, 1.0]));
}

#[test]
fn degenerate_solid_polygon_has_outline_only() {
    let mut draw = new_draw();
    let camera = Camera::new(800, 600);
    let mut frame = draw.begin(&camera);
    frame.draw_solid_polygon(&[Vec2::ZERO, Vec2::new(1.0, 0.0)], Color::WHITE);
    frame.finish().unwrap();

    assert_eq!(triangle_count(draw.context()), 0);
    assert_eq!(segments(draw.context()).len(), 2);
}

// ---------------------------------------------------------------------------
// Circles
// ---------------------------------------------------------------------------

#[test]
fn circle_has_sixteen_segments_on_the_radius() {
    for radius in [0.1_f32, 1.0, 7.5, 300.0] {
        let center = Vec2::new(-3.0, 4.0);
        let mut draw = new_draw();
        let camera = Camera::new(800, 600);
        let mut frame = draw.begin(&camera);
        frame.draw_circle(center, radius, Color::WHITE);
        frame.finish().unwrap();

        let segs = segments(draw.context());
        assert_eq!(segs.len(), CIRCLE_SEGMENTS);
        for (p1, p2) in &segs {
            for p in [p1, p2] {
                let d = (*p - center).length();
                assert!(
                    (d - radius).abs() <= EPS * radius.max(1.0),
                    "radius {radius}: point at distance {d}"
                );
            }
        }
        // Chained and closed.
        assert!(close(segs[0].0, center + Vec2::new(radius, 0.0)));
        for pair in segs.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
        }
        let gap = (segs[CIRCLE_SEGMENTS - 1].1 - segs[0].0).length();
        assert!(gap <= EPS * radius.max(1.0), "radius {radius}: loop gap {gap}");
    }
}

#[test]
fn solid_circle_fills_outlines_and_shows_axis() {
    let center = Vec2::new(1.0, 1.0);
    let radius = 2.0;
    let axis = Vec2::new(0.0, 1.0);

    let mut draw = new_draw();
    let camera = Camera::new(800, 600);
    let mut frame = draw.begin(&camera);
    frame.draw_solid_circle(center, radius, axis, Color::RED);
    frame.finish().unwrap();

    let gfx = draw.context();
    assert_eq!(triangle_count(gfx), CIRCLE_SEGMENTS);
    let tris = gfx.draws_of(PrimitiveKind::Triangle).next().unwrap().color_vertices();
    assert!(tris.chunks_exact(3).all(|t| pos(&t[0]) == center));
    assert!(tris.iter().all(|v| v.color == [0.5, 0.0, 0.0, 0.5]));

    let segs = segments(gfx);
    assert_eq!(segs.len(), CIRCLE_SEGMENTS + 1);
    let (start, end) = segs[CIRCLE_SEGMENTS];
    assert_eq!(start, center);
    assert!(close(end, Vec2::new(1.0, 3.0)));
}

// ---------------------------------------------------------------------------
// Segments, transforms, points, boxes
// ---------------------------------------------------------------------------

#[test]
fn segment_is_one_line() {
    let mut draw = new_draw();
    let camera = Camera::new(800, 600);
    let mut frame = draw.begin(&camera);
    frame.draw_segment(Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0), Color::BLUE);
    frame.finish().unwrap();

    assert_eq!(
        segments(draw.context()),
        vec![(Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0))]
    );
    assert_eq!(line_colors(draw.context()), vec![[0.0, 0.0, 1.0, 1.0]; 2]);
}

#[test]
fn transform_draws_red_x_and_green_y() {
    let origin = Vec2::new(5.0, -1.0);
    let xf = Transform::new(origin, Rot::from_angle(std::f32::consts::FRAC_PI_2));

    let mut draw = new_draw();
    let camera = Camera::new(800, 600);
    let mut frame = draw.begin(&camera);
    frame.draw_transform(xf);
    frame.finish().unwrap();

    let segs = segments(draw.context());
    let colors = line_colors(draw.context());
    assert_eq!(segs.len(), 2);

    // Rotated a quarter turn: X points up, Y points left.
    assert_eq!(segs[0].0, origin);
    assert!(close(segs[0].1, origin + Vec2::new(0.0, AXIS_SCALE)));
    assert_eq!(colors[0], Color::RED.to_array());

    assert_eq!(segs[1].0, origin);
    assert!(close(segs[1].1, origin + Vec2::new(-AXIS_SCALE, 0.0)));
    assert_eq!(colors[2], Color::GREEN.to_array());
}

#[test]
fn point_keeps_size_and_color() {
    let mut draw = new_draw();
    let camera = Camera::new(800, 600);
    let mut frame = draw.begin(&camera);
    frame.draw_point(Vec2::new(0.5, 0.5), 6.0, Color::GREEN);
    frame.finish().unwrap();

    let event = draw.context().draws_of(PrimitiveKind::Point).next().unwrap();
    let points = event.point_vertices();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].position, [0.5, 0.5]);
    assert_eq!(points[0].size, 6.0);
    assert_eq!(points[0].color, [0.0, 1.0, 0.0, 1.0]);
}

#[test]
fn aabb_is_four_edges() {
    let aabb = Aabb::new(Vec2::new(-1.0, -2.0), Vec2::new(3.0, 4.0));

    let mut draw = new_draw();
    let camera = Camera::new(800, 600);
    let mut frame = draw.begin(&camera);
    frame.draw_aabb(aabb, Color::WHITE);
    frame.finish().unwrap();

    let p1 = Vec2::new(-1.0, -2.0);
    let p2 = Vec2::new(3.0, -2.0);
    let p3 = Vec2::new(3.0, 4.0);
    let p4 = Vec2::new(-1.0, 4.0);
    assert_eq!(
        segments(draw.context()),
        vec![(p1, p2), (p2, p3), (p3, p4), (p4, p1)]
    );
}

// ---------------------------------------------------------------------------
// Frame flushing
// ---------------------------------------------------------------------------

#[test]
fn finish_flushes_triangles_lines_points() {
    let mut draw = new_draw();
    let camera = Camera::new(800, 600);
    let mut frame = draw.begin(&camera);
    // Submitted in the opposite order on purpose.
    frame.draw_point(Vec2::ZERO, 4.0, Color::WHITE);
    frame.draw_segment(Vec2::ZERO, Vec2::new(1.0, 0.0), Color::WHITE);
    frame.draw_solid_polygon(
        &[Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)],
        Color::WHITE,
    );
    frame.finish().unwrap();

    let kinds: Vec<_> = draw.context().events().iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        [PrimitiveKind::Triangle, PrimitiveKind::Line, PrimitiveKind::Point]
    );
    assert_eq!(kinds, PrimitiveKind::FLUSH_ORDER);
}

#[test]
fn dropped_frame_still_flushes() {
    let mut draw = new_draw();
    let camera = Camera::new(800, 600);
    {
        let mut frame = draw.begin(&camera);
        frame.draw_point(Vec2::ZERO, 4.0, Color::WHITE);
    }
    assert_eq!(draw.context().draw_count(), 1);
    assert_eq!(draw.pending(PrimitiveKind::Point), 0);
}

#[test]
fn many_circles_auto_flush_without_splitting_segments() {
    let config = DebugDrawConfig {
        line_capacity: 10,
        ..Default::default()
    };
    let mut draw = DebugDraw::new(HeadlessContext::new(), config).unwrap();
    let camera = Camera::new(800, 600);
    let mut frame = draw.begin(&camera);
    for i in 0..5 {
        frame.draw_circle(Vec2::new(i as f32, 0.0), 1.0, Color::WHITE);
    }
    frame.finish().unwrap();

    let gfx = draw.context();
    assert_eq!(gfx.vertices_drawn(PrimitiveKind::Line), 5 * CIRCLE_SEGMENTS * 2);
    assert!(gfx.events().iter().all(|e| e.vertex_count <= 10 && e.vertex_count % 2 == 0));
    assert_eq!(segments(gfx).len(), 5 * CIRCLE_SEGMENTS);
}

#[test]
fn flush_errors_surface_from_finish() {
    let mut draw = new_draw();
    draw.context_mut().fail_draws_of(Some(PrimitiveKind::Line));
    let camera = Camera::new(800, 600);

    let mut frame = draw.begin(&camera);
    frame.draw_segment(Vec2::ZERO, Vec2::new(1.0, 0.0), Color::WHITE);
    frame.draw_point(Vec2::ZERO, 2.0, Color::WHITE);
    let err = frame.finish().unwrap_err();

    assert!(matches!(err, RenderError::Graphics { .. }));
    // The point batch after the failing line batch was still flushed.
    assert_eq!(draw.context().draw_count(), 2);
    assert_eq!(draw.pending(PrimitiveKind::Point), 0);
}

#[test]
fn destroy_releases_everything() {
    let draw = new_draw();
    assert_eq!(draw.context().live_programs(), 3);
    assert_eq!(draw.context().live_buffers(), 3);

    let gfx = draw.destroy();
    assert_eq!(gfx.live_programs(), 0);
    assert_eq!(gfx.live_buffers(), 0);
    assert_eq!(gfx.live_shaders(), 0);
}

#[test]
fn failed_init_releases_built_renderers() {
    let gfx = HeadlessContext::new().with_link_failure();
    let err = DebugDraw::new(gfx, DebugDrawConfig::default()).unwrap_err();
    assert!(matches!(err, RenderError::ShaderLink { .. }));
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

#[derive(Default, Clone)]
struct Recorder(Rc<RefCell<Vec<(Vec2, Color, String)>>>);

impl TextOverlay for Recorder {
    fn draw_text(&mut self, position: Vec2, color: Color, text: &str) {
        self.0.borrow_mut().push((position, color, text.to_owned()));
    }
}

#[test]
fn text_goes_to_the_overlay_when_installed() {
    let recorder = Recorder::default();
    let mut draw = new_draw();
    draw.set_overlay(recorder.clone());
    let camera = Camera::new(800, 600);

    let mut frame = draw.begin(&camera);
    frame.draw_string(Vec2::new(5.0, 15.0), format_args!("step {}", 42));
    frame.draw_string_world(Vec2::ZERO, "origin");
    frame.finish().unwrap();

    let calls = recorder.0.borrow();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].0, Vec2::new(5.0, 15.0));
    assert_eq!(calls[0].1, Color::from_rgb_u8(230, 153, 153));
    assert_eq!(calls[0].2, "step 42");
    assert!(close(calls[1].0, Vec2::new(400.0, 300.0)));
    assert_eq!(calls[1].2, "origin");

    assert_eq!(draw.context().draw_count(), 0, "overlay text uses no batch");
}

#[test]
fn text_falls_back_to_glyph_quads() {
    let mut draw = new_draw();
    let camera = Camera::new(800, 600);
    let origin = Vec2::new(100.0, 50.0);

    let mut frame = draw.begin(&camera);
    frame.draw_string(origin, "Hi");
    frame.finish().unwrap();

    let scale = DebugDrawConfig::default().glyph_scale;
    let pixels = text::rasterize("Hi", origin, scale);
    let gfx = draw.context();
    assert_eq!(triangle_count(gfx), pixels.len() * 2);

    // The first quad covers the first lit pixel mapped into the world.
    let tris = gfx.draws_of(PrimitiveKind::Triangle).next().unwrap().color_vertices();
    let top_left = camera.screen_to_world(pixels[0].min);
    let bottom_right = camera.screen_to_world(pixels[0].max);
    assert!(close(pos(&tris[0]), top_left));
    assert!(close(pos(&tris[2]), bottom_right));
    assert_eq!(tris[0].color, Color::from_rgb_u8(230, 153, 153).to_array());
}

#[test]
fn removing_overlay_restores_glyphs() {
    let recorder = Recorder::default();
    let mut draw = new_draw();
    draw.set_overlay(recorder.clone());
    assert!(draw.take_overlay().is_some());

    let camera = Camera::new(800, 600);
    let mut frame = draw.begin(&camera);
    frame.draw_string(Vec2::ZERO, "A");
    frame.finish().unwrap();

    assert!(recorder.0.borrow().is_empty());
    assert!(triangle_count(draw.context()) > 0);
}

#[test]
fn glyph_text_is_drawn_after_every_shape() {
    let mut draw = new_draw();
    let camera = Camera::new(800, 600);
    let text_color = Color::from_rgb_u8(230, 153, 153).to_array();

    let mut frame = draw.begin(&camera);
    frame.draw_string(Vec2::new(5.0, 15.0), "STATUS");
    frame.draw_segment(Vec2::ZERO, Vec2::new(1.0, 0.0), Color::WHITE);
    frame.draw_solid_polygon(
        &[Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)],
        Color::BLUE,
    );
    frame.draw_point(Vec2::ZERO, 4.0, Color::WHITE);
    frame.finish().unwrap();

    let gfx = draw.context();
    let kinds: Vec<_> = gfx.events().iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        [
            PrimitiveKind::Triangle,
            PrimitiveKind::Line,
            PrimitiveKind::Point,
            PrimitiveKind::Triangle,
        ]
    );

    // The shape fill went out alone; the last draw holds only text.
    let fill = gfx.events()[0].color_vertices();
    assert_eq!(fill.len(), 3);
    assert!(fill.iter().all(|v| v.color != text_color));
    let last = gfx.events().last().unwrap();
    assert_eq!(last.kind, PrimitiveKind::Triangle);
    assert!(last.color_vertices().iter().all(|v| v.color == text_color));
    assert_eq!(draw.pending_text(), 0);
}

#[test]
fn text_size_right_aligns_glyph_text() {
    let mut draw = new_draw();
    let camera = Camera::new(800, 600);
    let scale = DebugDrawConfig::default().glyph_scale;

    let mut frame = draw.begin(&camera);
    let size = frame.text_size("AB\nC");
    assert_eq!(size, Vec2::new(text::text_width("AB", scale), text::text_height("A\nB", scale)));

    let right = 795.0;
    let origin = Vec2::new(right - frame.text_size("HOME").x, 15.0);
    frame.draw_string(origin, "HOME");
    frame.finish().unwrap();

    let pixels = text::rasterize("HOME", origin, scale);
    let rightmost = pixels.iter().map(|p| p.max.x).fold(f32::MIN, f32::max);
    assert!((rightmost - right).abs() < EPS);
}
