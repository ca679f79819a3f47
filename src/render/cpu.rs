use kurbo::Shape;

use crate::foundation::core::{Affine, BezPath, Canvas, Point, Rect, Vec2};
use crate::foundation::error::{KinetexError, KinetexResult};
use crate::render::backend::{FrameRGBA, Rasterizer};
use crate::scene::payload::{AxesPayload, BRACE_DEPTH, BracePayload, Fragment, Payload};
use crate::timeline::frame::{FrameState, Outline, VisualNode};

/// Fraction of a fragment box filled by its placeholder glyph block.
const GLYPH_FILL: (f64, f64) = (0.86, 0.7);
/// Tick length on axes, in scene units.
const TICK: f64 = 0.1;
/// Outline stroke width, in scene units.
const OUTLINE_WIDTH: f64 = 0.05;

/// CPU rasterizer powered by `vello_cpu`.
///
/// Draws placeholder geometry: text and formulas as one block per fragment, curves, axes and
/// braces as strokes, markers as discs.
pub struct CpuRasterizer {
    canvas: Canvas,
    clear_rgba: [u8; 4],
    ctx: Option<vello_cpu::RenderContext>,
}

impl CpuRasterizer {
    pub fn new(canvas: Canvas) -> KinetexResult<Self> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(KinetexError::validation("canvas must be non-empty"));
        }
        u16::try_from(canvas.width)
            .and(u16::try_from(canvas.height))
            .map_err(|_| KinetexError::validation("canvas exceeds 65535 pixels on a side"))?;
        Ok(Self {
            canvas,
            clear_rgba: [0, 0, 0, 255],
            ctx: None,
        })
    }

    /// Straight-alpha background color (default opaque black).
    pub fn with_clear_rgba(mut self, clear: [u8; 4]) -> Self {
        self.clear_rgba = clear;
        self
    }
}

impl Rasterizer for CpuRasterizer {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn rasterize(&mut self, frame: &FrameState) -> KinetexResult<FrameRGBA> {
        let width = u16::try_from(self.canvas.width)
            .map_err(|_| KinetexError::evaluation("canvas width exceeds u16"))?;
        let height = u16::try_from(self.canvas.height)
            .map_err(|_| KinetexError::evaluation("canvas height exceeds u16"))?;
        let mut ctx = match self.ctx.take() {
            None => vello_cpu::RenderContext::new(width, height),
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            Some(_) => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();

        let view = self.canvas.scene_to_pixels();
        for node in &frame.nodes {
            draw_node(&mut ctx, view, node);
        }
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        clear_pixmap(&mut pixmap, premul_rgba8(self.clear_rgba));
        ctx.render_to_pixmap(&mut pixmap);
        self.ctx = Some(ctx);

        Ok(FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
        })
    }
}

fn draw_node(
    ctx: &mut vello_cpu::RenderContext,
    view: Affine,
    node: &VisualNode,
) {
    let [r, g, b, a] = node.color;
    let tr = view * node.transform.to_affine();
    let opacity = node.opacity.clamp(0.0, 1.0) as f32;
    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
    }
    ctx.set_transform(affine_to_cpu(tr));
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
    ctx.set_stroke(vello_cpu::kurbo::Stroke::new(node.stroke_width));

    match &node.payload {
        Payload::Text(t) => fill_fragments(ctx, &t.fragments, node.reveal),
        Payload::Formula(f) => fill_fragments(ctx, &f.fragments, node.reveal),
        Payload::Curve(c) => {
            ctx.stroke_path(&bezpath_to_cpu(&partial_polyline(&c.points, 0.0, node.reveal)));
        }
        Payload::Marker { radius } => {
            let disc = kurbo::Circle::new(Point::ORIGIN, *radius).to_path(1e-3);
            ctx.fill_path(&bezpath_to_cpu(&disc));
        }
        Payload::Axes(axes) => {
            for line in axes_lines(axes) {
                ctx.stroke_path(&bezpath_to_cpu(&partial_polyline(&line, 0.0, node.reveal)));
            }
        }
        Payload::Brace(brace) => {
            let pts = brace_points(brace);
            ctx.stroke_path(&bezpath_to_cpu(&partial_polyline(&pts, 0.0, node.reveal)));
        }
    }

    if let Some(outline) = &node.outline {
        draw_outline(ctx, view, outline);
    }
    if opacity < 1.0 {
        ctx.pop_layer();
    }
}

fn fill_fragments(ctx: &mut vello_cpu::RenderContext, fragments: &[Fragment], reveal: f64) {
    let shown = reveal.clamp(0.0, 1.0) * fragments.len() as f64;
    for (i, f) in fragments.iter().enumerate() {
        let part = (shown - i as f64).clamp(0.0, 1.0);
        if part <= 0.0 {
            break;
        }
        let w = f.width * GLYPH_FILL.0;
        let h = f.height * GLYPH_FILL.1;
        let x0 = f.offset.x - w * 0.5;
        let y0 = f.offset.y - h * 0.5;
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(x0, y0, x0 + w * part, y0 + h));
    }
}

fn draw_outline(ctx: &mut vello_cpu::RenderContext, view: Affine, outline: &Outline) {
    let Rect { x0, y0, x1, y1 } = outline.bounds;
    let loop_pts = [
        Point::new(x0, y1),
        Point::new(x1, y1),
        Point::new(x1, y0),
        Point::new(x0, y0),
        Point::new(x0, y1),
    ];
    let [r, g, b, a] = outline.color;
    ctx.set_transform(affine_to_cpu(view));
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
    ctx.set_stroke(vello_cpu::kurbo::Stroke::new(OUTLINE_WIDTH));
    let path = partial_polyline(&loop_pts, outline.tail, outline.head);
    ctx.stroke_path(&bezpath_to_cpu(&path));
}

/// Sub-polyline between two arc-length fractions of `points`.
pub(crate) fn partial_polyline(points: &[Point], from: f64, to: f64) -> BezPath {
    let mut out = BezPath::new();
    let total: f64 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
    if points.len() < 2 || total <= 0.0 || to <= from {
        return out;
    }
    let (a, b) = (from.clamp(0.0, 1.0) * total, to.clamp(0.0, 1.0) * total);
    let mut walked = 0.0;
    let mut started = false;
    for w in points.windows(2) {
        let len = w[0].distance(w[1]);
        let (s, e) = (walked, walked + len);
        walked = e;
        if e < a || len <= 0.0 {
            continue;
        }
        if s > b {
            break;
        }
        let t0 = ((a - s) / len).clamp(0.0, 1.0);
        let t1 = ((b - s) / len).clamp(0.0, 1.0);
        if !started {
            out.move_to(w[0].lerp(w[1], t0));
            started = true;
        }
        out.line_to(w[0].lerp(w[1], t1));
    }
    out
}

/// Axis lines and ticks in local coordinates.
fn axes_lines(axes: &AxesPayload) -> Vec<Vec<Point>> {
    let (hx, hy) = (axes.x_length * 0.5, axes.y_length * 0.5);
    let mut lines = vec![
        vec![Point::new(-hx, -hy), Point::new(hx, -hy)],
        vec![Point::new(-hx, -hy), Point::new(-hx, hy)],
    ];
    let mut x = (axes.x_range[0] / axes.x_step).ceil() * axes.x_step;
    while x <= axes.x_range[1] {
        let p = axes.coords_to_local(x, axes.y_range[0]);
        lines.push(vec![p - Vec2::new(0.0, TICK), p + Vec2::new(0.0, TICK)]);
        x += axes.x_step;
    }
    let mut y = (axes.y_range[0] / axes.y_step).ceil() * axes.y_step;
    while y <= axes.y_range[1] {
        let p = axes.coords_to_local(axes.x_range[0], y);
        lines.push(vec![p - Vec2::new(TICK, 0.0), p + Vec2::new(TICK, 0.0)]);
        y += axes.y_step;
    }
    lines
}

/// Brace outline; the tip points along `brace.direction`.
fn brace_points(brace: &BracePayload) -> Vec<Point> {
    let (s, d) = (brace.span * 0.5, BRACE_DEPTH * 0.5);
    // Built pointing down, then rotated.
    let down = [
        Point::new(-s, d),
        Point::new(-s + d, 0.0),
        Point::new(-d, 0.0),
        Point::new(0.0, -d),
        Point::new(d, 0.0),
        Point::new(s - d, 0.0),
        Point::new(s, d),
    ];
    let angle = brace.direction.atan2() - Vec2::new(0.0, -1.0).atan2();
    let rot = Affine::rotate(angle);
    down.iter().map(|p| rot * *p).collect()
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    for px in pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn premul_rgba8(rgba: [u8; 4]) -> [u8; 4] {
    let [r, g, b, a] = rgba;
    let a16 = u16::from(a);
    let premul = |c: u8| -> u8 { (((u16::from(c) * a16) + 127) / 255) as u8 };
    [premul(r), premul(g), premul(b), a]
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
