//! Off-screen rasterization of scene snapshots with `vello_cpu`.
//!
//! The rasterizer never sees a live [`crate::Surface`]: it draws from an immutable snapshot plus
//! the decoded images the caller resolved for it.

use std::collections::HashMap;
use std::sync::Arc;

use kurbo::Shape;

use crate::assets::decode::PreparedImage;
use crate::assets::store::ImageSet;
use crate::assets::text::{TextBrushRgba8, TextLayoutEngine};
use crate::foundation::core::{Affine, BezPath, Canvas, Color, Point, Rect};
use crate::foundation::error::{DeckError, DeckResult};
use crate::render::bitmap::Bitmap;
use crate::scene::model::{ElementKind, SceneObject};
use crate::scene::snapshot::SceneSnapshot;

const TOLERANCE: f64 = 0.1;
const DEFAULT_FONT_SIZE: f64 = 40.0;
const DEFAULT_LINE_HEIGHT: f64 = 1.16;
const PLACEHOLDER_FILL: Color = Color::rgb(229, 231, 235);
const PLACEHOLDER_STROKE: Color = Color::rgb(156, 163, 175);

#[derive(Clone)]
struct ImagePaint {
    pixels: Arc<Vec<u8>>,
    paint: vello_cpu::Image,
}

/// Reusable CPU rasterizer. Holds its render context, text engine and image paints between calls.
///
/// Not `Sync`: parallel callers create one per worker.
pub struct Rasterizer {
    font: Option<Arc<Vec<u8>>>,
    text: Option<TextLayoutEngine>,
    ctx: Option<vello_cpu::RenderContext>,
    paints: HashMap<String, ImagePaint>,
}

impl Rasterizer {
    /// Rasterizer drawing text with `font` (TTF/OTF bytes), or greeked bars without one.
    pub fn new(font: Option<Arc<Vec<u8>>>) -> Self {
        Self {
            font,
            text: None,
            ctx: None,
            paints: HashMap::new(),
        }
    }

    /// Render `snapshot`, authored for `canvas`, into a `width`×`height` bitmap.
    ///
    /// Images missing from `images` are drawn as placeholders.
    #[tracing::instrument(skip(self, snapshot, canvas, images), fields(fingerprint = %snapshot.fingerprint()))]
    pub fn render(
        &mut self,
        snapshot: &SceneSnapshot,
        canvas: Canvas,
        width: u32,
        height: u32,
        images: &ImageSet,
    ) -> DeckResult<Bitmap> {
        let (w16, h16) = target_dims(width, height)?;
        let base = Affine::scale_non_uniform(
            f64::from(width) / f64::from(canvas.width),
            f64::from(height) / f64::from(canvas.height),
        );

        self.with_ctx_mut(w16, h16, |this, ctx| {
            this.draw_background(ctx, snapshot, canvas, base, images)?;
            for (i, obj) in snapshot.objects().iter().enumerate() {
                if !obj.bool_or("visible", true) {
                    continue;
                }
                this.draw_object(ctx, obj, base, images).map_err(|e| {
                    DeckError::render(format!("object {i} ('{}'): {e}", obj.type_tag))
                })?;
            }
            ctx.flush();
            let mut pixmap = vello_cpu::Pixmap::new(w16, h16);
            ctx.render_to_pixmap(&mut pixmap);
            Ok(Bitmap {
                width,
                height,
                data: pixmap.data_as_u8_slice().to_vec(),
            })
        })
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> DeckResult<R>,
    ) -> DeckResult<R> {
        let mut ctx = match self.ctx.take() {
            None => vello_cpu::RenderContext::new(width, height),
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            Some(_) => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(self, &mut ctx);
        self.ctx = Some(ctx);
        out
    }

    fn text_engine(&mut self) -> DeckResult<Option<&mut TextLayoutEngine>> {
        if self.text.is_none()
            && let Some(font) = &self.font
        {
            self.text = Some(TextLayoutEngine::new(font.clone())?);
        }
        Ok(self.text.as_mut())
    }

    fn paint_for(&mut self, url: &str, image: &PreparedImage) -> DeckResult<vello_cpu::Image> {
        if let Some(p) = self.paints.get(url)
            && Arc::ptr_eq(&p.pixels, &image.rgba8_premul)
        {
            return Ok(p.paint.clone());
        }
        let paint = rgba_premul_to_image(&image.rgba8_premul, image.width, image.height)?;
        self.paints.insert(
            url.to_string(),
            ImagePaint {
                pixels: image.rgba8_premul.clone(),
                paint: paint.clone(),
            },
        );
        Ok(paint)
    }

    fn draw_background(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        snapshot: &SceneSnapshot,
        canvas: Canvas,
        base: Affine,
        images: &ImageSet,
    ) -> DeckResult<()> {
        let full = Rect::new(0.0, 0.0, f64::from(canvas.width), f64::from(canvas.height));
        reset_state(ctx);

        if let Some(c) = snapshot.background_color()
            && !c.is_transparent()
        {
            ctx.set_transform(affine_to_cpu(base));
            ctx.set_paint(cpu_color(c));
            ctx.fill_rect(&rect_to_cpu(full));
        }

        let Some(bg) = snapshot.background_image() else {
            return Ok(());
        };
        let src = bg.src().unwrap_or_default();
        let Some(img) = images.get(src) else {
            tracing::warn!(url = %src, "background image unavailable for render");
            return Ok(());
        };

        if bg.str_prop("repeat").is_none() {
            return self.draw_image(ctx, bg, base, images);
        }

        let anchor = Point::new(
            bg.f64_or("left", full.width() / 2.0),
            bg.f64_or("top", full.height() / 2.0),
        );
        let tiled = tile_pixels(img, canvas, anchor);
        let paint = rgba_premul_to_image(&tiled, canvas.width, canvas.height)?;
        ctx.set_transform(affine_to_cpu(base));
        ctx.set_paint(paint);
        with_opacity(ctx, bg.f64_or("opacity", 1.0), |ctx| {
            ctx.fill_rect(&rect_to_cpu(full));
        });
        Ok(())
    }

    fn draw_object(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        obj: &SceneObject,
        base: Affine,
        images: &ImageSet,
    ) -> DeckResult<()> {
        reset_state(ctx);
        match obj.kind() {
            ElementKind::Text => self.draw_text(ctx, obj, base),
            ElementKind::Image => self.draw_image(ctx, obj, base, images),
            ElementKind::Shape => {
                draw_shape(ctx, obj, base);
                Ok(())
            }
        }
    }

    fn draw_image(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        obj: &SceneObject,
        base: Affine,
        images: &ImageSet,
    ) -> DeckResult<()> {
        let src = obj.src().unwrap_or_default();
        let opacity = obj.f64_or("opacity", 1.0);
        let w = obj.f64_or("width", 0.0);
        let h = obj.f64_or("height", 0.0);

        let Some(img) = images.get(src) else {
            let (w, h) = (w.max(1.0), h.max(1.0));
            ctx.set_transform(affine_to_cpu(base * object_transform(obj, w, h)));
            let frame = Rect::new(0.0, 0.0, w, h).to_path(TOLERANCE);
            with_opacity(ctx, opacity, |ctx| {
                fill_path(ctx, &frame, PLACEHOLDER_FILL);
                stroke_path(ctx, &frame, PLACEHOLDER_STROKE, 2.0);
            });
            return Ok(());
        };

        let (iw, ih) = img.size();
        let (w, h) = if w > 0.0 && h > 0.0 { (w, h) } else { (iw, ih) };
        let tr = base * object_transform(obj, w, h) * Affine::scale_non_uniform(w / iw, h / ih);
        let paint = self.paint_for(src, img)?;
        ctx.set_transform(affine_to_cpu(tr));
        ctx.set_paint(paint);
        with_opacity(ctx, opacity, |ctx| {
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, iw, ih));
        });
        Ok(())
    }

    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        obj: &SceneObject,
        base: Affine,
    ) -> DeckResult<()> {
        let text = obj.text().unwrap_or_default();
        if text.trim().is_empty() {
            return Ok(());
        }
        let size = obj.f64_or("fontSize", DEFAULT_FONT_SIZE).max(1.0);
        let Some(fill) = fill_color(obj, Some(Color::BLACK)) else {
            return Ok(());
        };
        let width = obj.f64_or("width", 0.0);
        let wrap = (obj.type_tag == "textbox" && width > 0.0).then_some(width);
        let align = match obj.str_prop("textAlign") {
            Some("center") => 0.5,
            Some("right") => 1.0,
            _ => 0.0,
        };
        let opacity = obj.f64_or("opacity", 1.0);

        if let Some(engine) = self.text_engine()? {
            let brush = TextBrushRgba8 {
                r: fill.r,
                g: fill.g,
                b: fill.b,
                a: fill.a,
            };
            let layout = engine.layout_plain(text, size as f32, brush, wrap.map(|w| w as f32))?;
            let box_w = if width > 0.0 {
                width
            } else {
                f64::from(layout.width())
            };
            let box_h = f64::from(layout.height());
            ctx.set_transform(affine_to_cpu(base * object_transform(obj, box_w, box_h)));
            let font = engine.font();
            with_opacity(ctx, opacity, |ctx| {
                for line in layout.lines() {
                    let dx = ((box_w as f32 - line.metrics().advance) * align).max(0.0);
                    for item in line.items() {
                        let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                            continue;
                        };
                        let brush = run.style().brush;
                        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                            brush.r, brush.g, brush.b, brush.a,
                        ));
                        let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                            id: g.id,
                            x: g.x + dx,
                            y: g.y,
                        });
                        ctx.glyph_run(font)
                            .font_size(run.run().font_size())
                            .fill_glyphs(glyphs);
                    }
                }
            });
            return Ok(());
        }

        let bars = greeked_lines(text, size, wrap);
        let line_h = size * obj.f64_or("lineHeight", DEFAULT_LINE_HEIGHT);
        let box_w = wrap.unwrap_or_else(|| bars.iter().copied().fold(0.0, f64::max));
        let box_h = line_h * bars.len() as f64;
        ctx.set_transform(affine_to_cpu(base * object_transform(obj, box_w, box_h)));
        ctx.set_paint(cpu_color(fill));
        with_opacity(ctx, opacity, |ctx| {
            for (i, bar_w) in bars.iter().enumerate() {
                let x0 = (box_w - bar_w) * f64::from(align);
                let y0 = line_h * i as f64 + size * 0.25;
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(x0, y0, x0 + bar_w, y0 + size * 0.5));
            }
        });
        Ok(())
    }
}

/// One-shot render with a fresh [`Rasterizer`].
pub fn render_snapshot(
    snapshot: &SceneSnapshot,
    canvas: Canvas,
    width: u32,
    height: u32,
    images: &ImageSet,
    font: Option<Arc<Vec<u8>>>,
) -> DeckResult<Bitmap> {
    Rasterizer::new(font).render(snapshot, canvas, width, height, images)
}

fn target_dims(width: u32, height: u32) -> DeckResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| DeckError::render("render width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| DeckError::render("render height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(DeckError::render("render target must be non-empty"));
    }
    Ok((w, h))
}

fn reset_state(ctx: &mut vello_cpu::RenderContext) {
    ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
}

fn with_opacity(
    ctx: &mut vello_cpu::RenderContext,
    opacity: f64,
    draw: impl FnOnce(&mut vello_cpu::RenderContext),
) {
    let opacity = opacity.clamp(0.0, 1.0) as f32;
    if opacity <= 0.0 {
        return;
    }
    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
    }
    draw(ctx);
    if opacity < 1.0 {
        ctx.pop_layer();
    }
}

/// Fabric-style placement: `(left, top)` is the origin point, rotation and scale apply around it.
fn object_transform(obj: &SceneObject, w: f64, h: f64) -> Affine {
    let ox = origin_fraction(obj.str_prop("originX"));
    let oy = origin_fraction(obj.str_prop("originY"));
    Affine::translate((obj.f64_or("left", 0.0), obj.f64_or("top", 0.0)))
        * Affine::rotate(obj.f64_or("angle", 0.0).to_radians())
        * Affine::scale_non_uniform(obj.f64_or("scaleX", 1.0), obj.f64_or("scaleY", 1.0))
        * Affine::translate((-ox * w, -oy * h))
}

fn origin_fraction(origin: Option<&str>) -> f64 {
    match origin {
        Some("center") => 0.5,
        Some("right") | Some("bottom") => 1.0,
        _ => 0.0,
    }
}

/// `None` means "do not paint". A missing key falls back to `default`.
fn fill_color(obj: &SceneObject, default: Option<Color>) -> Option<Color> {
    let color = match obj.get("fill") {
        None => default,
        Some(_) => obj.color_prop("fill"),
    };
    color.filter(|c| !c.is_transparent())
}

fn draw_shape(ctx: &mut vello_cpu::RenderContext, obj: &SceneObject, base: Affine) {
    let Some(geom) = shape_geometry(obj) else {
        return;
    };
    ctx.set_transform(affine_to_cpu(base * object_transform(obj, geom.width, geom.height)));

    let fill = if geom.closed {
        fill_color(obj, Some(Color::BLACK))
    } else {
        None
    };
    let stroke_default = (!geom.closed).then_some(Color::BLACK);
    let stroke = match obj.get("stroke") {
        None => stroke_default,
        Some(_) => obj.color_prop("stroke"),
    }
    .filter(|c| !c.is_transparent());
    let stroke_width = obj.f64_or("strokeWidth", 1.0);

    with_opacity(ctx, obj.f64_or("opacity", 1.0), |ctx| {
        if let Some(c) = fill {
            fill_path(ctx, &geom.path, c);
        }
        if let Some(c) = stroke
            && stroke_width > 0.0
        {
            stroke_path(ctx, &geom.path, c, stroke_width);
        }
    });
}

struct ShapeGeometry {
    path: BezPath,
    width: f64,
    height: f64,
    closed: bool,
}

/// Local-space outline of a shape object, with its bounding box at the origin.
fn shape_geometry(obj: &SceneObject) -> Option<ShapeGeometry> {
    let w = obj.f64_or("width", 0.0);
    let h = obj.f64_or("height", 0.0);
    let closed = |path: BezPath, width: f64, height: f64| ShapeGeometry {
        path,
        width,
        height,
        closed: true,
    };

    let geom = match obj.type_tag.as_str() {
        "rect" => {
            let r = obj.f64_or("rx", 0.0).max(obj.f64_or("ry", 0.0));
            let path = if r > 0.0 {
                kurbo::RoundedRect::new(0.0, 0.0, w, h, r).to_path(TOLERANCE)
            } else {
                Rect::new(0.0, 0.0, w, h).to_path(TOLERANCE)
            };
            closed(path, w, h)
        }
        "circle" => {
            let r = obj.f64_or("radius", w / 2.0);
            closed(kurbo::Circle::new((r, r), r).to_path(TOLERANCE), 2.0 * r, 2.0 * r)
        }
        "ellipse" => {
            let rx = obj.f64_or("rx", w / 2.0);
            let ry = obj.f64_or("ry", h / 2.0);
            closed(
                kurbo::Ellipse::new((rx, ry), (rx, ry), 0.0).to_path(TOLERANCE),
                2.0 * rx,
                2.0 * ry,
            )
        }
        "triangle" => {
            let mut path = BezPath::new();
            path.move_to((w / 2.0, 0.0));
            path.line_to((w, h));
            path.line_to((0.0, h));
            path.close_path();
            closed(path, w, h)
        }
        "line" => {
            let (x1, y1) = (obj.f64_or("x1", 0.0), obj.f64_or("y1", 0.0));
            let (x2, y2) = (obj.f64_or("x2", 0.0), obj.f64_or("y2", 0.0));
            let (minx, miny) = (x1.min(x2), y1.min(y2));
            let mut path = BezPath::new();
            path.move_to((x1 - minx, y1 - miny));
            path.line_to((x2 - minx, y2 - miny));
            ShapeGeometry {
                path,
                width: (x2 - x1).abs(),
                height: (y2 - y1).abs(),
                closed: false,
            }
        }
        tag @ ("polygon" | "polyline") => {
            let points = points_prop(obj)?;
            let mut geom = normalized(polyline(&points, tag == "polygon"));
            geom.closed = tag == "polygon";
            geom
        }
        "path" => normalized(path_prop(obj)?),
        _ => {
            if !(w > 0.0 && h > 0.0) {
                return None;
            }
            closed(Rect::new(0.0, 0.0, w, h).to_path(TOLERANCE), w, h)
        }
    };
    Some(geom)
}

fn points_prop(obj: &SceneObject) -> Option<Vec<Point>> {
    let pts: Vec<Point> = obj
        .get("points")?
        .as_array()?
        .iter()
        .filter_map(|p| Some(Point::new(p.get("x")?.as_f64()?, p.get("y")?.as_f64()?)))
        .collect();
    (pts.len() >= 2).then_some(pts)
}

fn polyline(points: &[Point], close: bool) -> BezPath {
    let mut path = BezPath::new();
    for (i, p) in points.iter().enumerate() {
        if i == 0 {
            path.move_to(*p);
        } else {
            path.line_to(*p);
        }
    }
    if close {
        path.close_path();
    }
    path
}

/// Accepts both an SVG `d` string and the runtime's command-array form (`[["M", 0, 0], ...]`).
fn path_prop(obj: &SceneObject) -> Option<BezPath> {
    let d = match obj.get("path")? {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(cmds) => cmds
            .iter()
            .filter_map(|cmd| cmd.as_array())
            .flat_map(|cmd| {
                cmd.iter().map(|v| match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
            })
            .collect::<Vec<_>>()
            .join(" "),
        _ => return None,
    };
    match BezPath::from_svg(d.trim()) {
        Ok(p) => Some(p),
        Err(e) => {
            tracing::warn!(error = %e, "unparseable path object skipped");
            None
        }
    }
}

fn normalized(path: BezPath) -> ShapeGeometry {
    let bbox = path.bounding_box();
    let path = Affine::translate((-bbox.x0, -bbox.y0)) * path;
    ShapeGeometry {
        path,
        width: bbox.width(),
        height: bbox.height(),
        closed: true,
    }
}

/// Widths of the greeked bars standing in for text lines when no font is configured.
fn greeked_lines(text: &str, size: f64, wrap: Option<f64>) -> Vec<f64> {
    let char_w = size * 0.5;
    let mut out = Vec::new();
    for line in text.lines() {
        let n = line.chars().count() as f64;
        match wrap {
            Some(w) if w > 0.0 => {
                let per_line = (w / char_w).floor().max(1.0);
                let mut rest = n;
                loop {
                    let take = rest.min(per_line);
                    out.push(take * char_w);
                    rest -= take;
                    if rest <= 0.0 {
                        break;
                    }
                }
            }
            _ => out.push(n * char_w),
        }
    }
    out
}

fn tile_pixels(img: &PreparedImage, canvas: Canvas, anchor: Point) -> Vec<u8> {
    let (cw, ch) = (canvas.width as usize, canvas.height as usize);
    let (iw, ih) = (img.width as usize, img.height as usize);
    // Tile grid shifted so that one tile is centered on `anchor`.
    let ox = (anchor.x - iw as f64 / 2.0).rem_euclid(iw as f64) as usize % iw;
    let oy = (anchor.y - ih as f64 / 2.0).rem_euclid(ih as f64) as usize % ih;
    let src = img.rgba8_premul.as_slice();
    let mut out = vec![0u8; cw * ch * 4];
    for y in 0..ch {
        let sy = (y + ih - oy) % ih;
        for x in 0..cw {
            let sx = (x + iw - ox) % iw;
            let si = (sy * iw + sx) * 4;
            let di = (y * cw + x) * 4;
            out[di..di + 4].copy_from_slice(&src[si..si + 4]);
        }
    }
    out
}

fn fill_path(ctx: &mut vello_cpu::RenderContext, path: &BezPath, color: Color) {
    ctx.set_paint(cpu_color(color));
    ctx.fill_path(&bezpath_to_cpu(path));
}

fn stroke_path(ctx: &mut vello_cpu::RenderContext, path: &BezPath, color: Color, width: f64) {
    let outline = kurbo::stroke(
        path.iter(),
        &kurbo::Stroke::new(width),
        &kurbo::StrokeOpts::default(),
        TOLERANCE,
    );
    ctx.set_paint(cpu_color(color));
    ctx.fill_path(&bezpath_to_cpu(&outline));
}

fn cpu_color(c: Color) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
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

fn pixmap_from_premul_bytes(bytes: &[u8], width: u32, height: u32) -> DeckResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| DeckError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| DeckError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(DeckError::render("pixmap byte len mismatch"));
    }
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    let opaque = bytes.chunks_exact(4).all(|px| px[3] == 255);
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, !opaque))
}

fn rgba_premul_to_image(bytes: &[u8], width: u32, height: u32) -> DeckResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
