use std::sync::Arc;

use crate::foundation::core::{Affine, BezPath, Rect};
use crate::foundation::error::{GrError, GrResult};
use crate::handle::auto_ref::AsHandle;
use crate::native::color::color_rgba8;
use crate::native::image::{image_create_from_pixmap, image_pixmap, pixmap_from_premul_bytes};
use crate::native::table::{self, Object, with_table};
use crate::native::types::{ColorRef, ColorSpaceRef, ContextRef, ImageRef, require};

/// How a path is painted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawMode {
    /// Fill with the non-zero winding rule.
    Fill,
    /// Fill with the even-odd rule.
    EoFill,
    Stroke,
    FillStroke,
    EoFillStroke,
}

impl DrawMode {
    fn fill_rule(self) -> Option<vello_cpu::peniko::Fill> {
        match self {
            Self::Fill | Self::FillStroke => Some(vello_cpu::peniko::Fill::NonZero),
            Self::EoFill | Self::EoFillStroke => Some(vello_cpu::peniko::Fill::EvenOdd),
            Self::Stroke => None,
        }
    }

    fn strokes(self) -> bool {
        matches!(self, Self::Stroke | Self::FillStroke | Self::EoFillStroke)
    }
}

pub(crate) struct BitmapContext {
    pixmap: vello_cpu::Pixmap,
    pub(crate) space: ColorSpaceRef,
    /// Straight RGBA8.
    fill: [u8; 4],
    /// Straight RGBA8.
    stroke: [u8; 4],
    line_width: f64,
}

impl BitmapContext {
    fn new(pixmap: vello_cpu::Pixmap, space: ColorSpaceRef) -> Self {
        Self {
            pixmap,
            space,
            fill: [0, 0, 0, 255],
            stroke: [0, 0, 0, 255],
            line_width: 1.0,
        }
    }

    // `vello_cpu` renders into a fresh buffer, so each draw renders into a layer that is then
    // premul-over'd onto the context pixels.
    fn composite(&mut self, paint: impl FnOnce(&mut vello_cpu::RenderContext)) -> GrResult<()> {
        let (w, h) = (self.pixmap.width(), self.pixmap.height());
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        paint(&mut ctx);
        ctx.flush();
        let mut layer = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut layer);
        premul_over_in_place(self.pixmap.data_as_u8_slice_mut(), layer.data_as_u8_slice())
    }
}

fn checked_dims(width: u32, height: u32) -> GrResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| GrError::validation("context width exceeds 65535"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| GrError::validation("context height exceeds 65535"))?;
    if w == 0 || h == 0 {
        return Err(GrError::validation("context must not be empty"));
    }
    Ok((w, h))
}

fn insert_context(pixmap: vello_cpu::Pixmap, space: ColorSpaceRef) -> GrResult<ContextRef> {
    with_table(|t| {
        let space = table::retain_in(t, space)?;
        Ok(t.insert(Object::Context(BitmapContext::new(pixmap, space))))
    })
}

/// A transparent bitmap context. The context keeps `space` alive.
pub fn bitmap_context_create(
    width: u32,
    height: u32,
    space: impl AsHandle<ColorSpaceRef>,
) -> GrResult<ContextRef> {
    let space = require(space)?;
    let (w, h) = checked_dims(width, height)?;
    insert_context(vello_cpu::Pixmap::new(w, h), space)
}

/// A bitmap context initialised from caller pixels (premultiplied RGBA8, `width * height * 4`).
pub fn bitmap_context_create_with_data(
    data: Vec<u8>,
    width: u32,
    height: u32,
    space: impl AsHandle<ColorSpaceRef>,
) -> GrResult<ContextRef> {
    let space = require(space)?;
    checked_dims(width, height)?;
    let pixmap = pixmap_from_premul_bytes(&data, width, height)?;
    insert_context(pixmap, space)
}

fn with_context<R>(
    ctx: impl AsHandle<ContextRef>,
    f: impl FnOnce(&BitmapContext) -> GrResult<R>,
) -> GrResult<R> {
    let ctx = require(ctx)?;
    with_table(|t| match t.get(ctx)? {
        Object::Context(c) => f(c),
        _ => Err(GrError::invalid_handle("expected a context")),
    })
}

fn with_context_mut<R>(
    ctx: impl AsHandle<ContextRef>,
    f: impl FnOnce(&mut BitmapContext) -> GrResult<R>,
) -> GrResult<R> {
    let ctx = require(ctx)?;
    with_table(|t| match t.get_mut(ctx)? {
        Object::Context(c) => f(c),
        _ => Err(GrError::invalid_handle("expected a context")),
    })
}

pub fn bitmap_context_width(ctx: impl AsHandle<ContextRef>) -> GrResult<u32> {
    with_context(ctx, |c| Ok(u32::from(c.pixmap.width())))
}

pub fn bitmap_context_height(ctx: impl AsHandle<ContextRef>) -> GrResult<u32> {
    with_context(ctx, |c| Ok(u32::from(c.pixmap.height())))
}

/// Copy of the context pixels as premultiplied RGBA8, row-major.
pub fn bitmap_context_data(ctx: impl AsHandle<ContextRef>) -> GrResult<Vec<u8>> {
    with_context(ctx, |c| Ok(c.pixmap.data_as_u8_slice().to_vec()))
}

/// Snapshot the current pixels into a new image.
pub fn bitmap_context_create_image(ctx: impl AsHandle<ContextRef>) -> GrResult<ImageRef> {
    let pixmap = with_context(ctx, |c| {
        pixmap_from_premul_bytes(
            c.pixmap.data_as_u8_slice(),
            u32::from(c.pixmap.width()),
            u32::from(c.pixmap.height()),
        )
    })?;
    Ok(image_create_from_pixmap(pixmap))
}

pub fn context_set_fill_color(
    ctx: impl AsHandle<ContextRef>,
    color: impl AsHandle<ColorRef>,
) -> GrResult<()> {
    let rgba = color_rgba8(color)?;
    with_context_mut(ctx, |c| {
        c.fill = rgba;
        Ok(())
    })
}

pub fn context_set_stroke_color(
    ctx: impl AsHandle<ContextRef>,
    color: impl AsHandle<ColorRef>,
) -> GrResult<()> {
    let rgba = color_rgba8(color)?;
    with_context_mut(ctx, |c| {
        c.stroke = rgba;
        Ok(())
    })
}

pub fn context_set_line_width(ctx: impl AsHandle<ContextRef>, width: f64) -> GrResult<()> {
    if !width.is_finite() || width < 0.0 {
        return Err(GrError::validation(format!("invalid line width {width}")));
    }
    with_context_mut(ctx, |c| {
        c.line_width = width;
        Ok(())
    })
}

pub fn context_fill_rect(ctx: impl AsHandle<ContextRef>, rect: Rect) -> GrResult<()> {
    check_rect(rect)?;
    with_context_mut(ctx, |c| {
        let [r, g, b, a] = c.fill;
        c.composite(|rc| {
            rc.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            rc.fill_rect(&rect_to_cpu(rect));
        })
    })
}

/// Paint `path` with the context's fill/stroke state according to `mode`.
pub fn context_draw_path(
    ctx: impl AsHandle<ContextRef>,
    path: &BezPath,
    mode: DrawMode,
) -> GrResult<()> {
    let cpu_path = bezpath_to_cpu(path);
    with_context_mut(ctx, |c| {
        let [fr, fg, fb, fa] = c.fill;
        let [sr, sg, sb, sa] = c.stroke;
        let line_width = c.line_width;
        c.composite(|rc| {
            if let Some(rule) = mode.fill_rule() {
                rc.set_fill_rule(rule);
                rc.set_paint(vello_cpu::peniko::Color::from_rgba8(fr, fg, fb, fa));
                rc.fill_path(&cpu_path);
            }
            if mode.strokes() && line_width > 0.0 {
                rc.set_stroke(vello_cpu::kurbo::Stroke::new(line_width));
                rc.set_paint(vello_cpu::peniko::Color::from_rgba8(sr, sg, sb, sa));
                rc.stroke_path(&cpu_path);
            }
        })
    })
}

/// Draw `image` stretched to `rect`. Parts outside the context are clipped.
pub fn context_draw_image(
    ctx: impl AsHandle<ContextRef>,
    rect: Rect,
    image: impl AsHandle<ImageRef>,
) -> GrResult<()> {
    check_rect(rect)?;
    let pixmap = image_pixmap(image)?;
    let iw = f64::from(pixmap.width());
    let ih = f64::from(pixmap.height());
    let tr = Affine::translate((rect.x0, rect.y0))
        * Affine::scale_non_uniform(rect.width() / iw, rect.height() / ih);
    let paint = vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::clone(&pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    };
    with_context_mut(ctx, |c| {
        c.composite(|rc| {
            rc.set_transform(affine_to_cpu(tr));
            rc.set_paint(paint);
            rc.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, iw, ih));
        })
    })
}

/// Graphics-context-specific release.
pub fn context_release(ctx: ContextRef) {
    tracing::trace!(handle = ?ctx, "context release");
    table::release(ctx);
}

fn check_rect(rect: Rect) -> GrResult<()> {
    if !(rect.x0.is_finite() && rect.y0.is_finite() && rect.x1.is_finite() && rect.y1.is_finite())
    {
        return Err(GrError::validation("rect must be finite"));
    }
    Ok(())
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

fn premul_over_in_place(dst: &mut [u8], src: &[u8]) -> GrResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(GrError::validation(
            "premul_over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = s[3] as u16;
        if sa == 0 {
            continue;
        }
        let inv = 255u16 - sa;
        d[3] = add_sat_u8(sa as u8, mul_div255_u8(d[3] as u16, inv));
        for c in 0..3 {
            let dc = mul_div255_u8(d[c] as u16, inv);
            d[c] = add_sat_u8(s[c], dc);
        }
    }
    Ok(())
}

fn mul_div255_u8(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
#[path = "../../tests/unit/native/context.rs"]
mod tests;
