use kurbo::Shape;

use crate::foundation::core::{Rect, Rgba8Premul, cover_rect};
use crate::foundation::error::{GrError, GrResult};
use crate::gr::surface::bounds_of;
use crate::handle::auto_ref::{AsHandle, AutoRef};
use crate::native::{self, ContextRef, DrawMode, ImageRef};

/// Draw `image` so it covers the whole of `ctx`, keeping its aspect ratio.
///
/// The image is centred; whatever overflows the context bounds is cropped.
pub fn draw_covering_image(
    ctx: impl AsHandle<ContextRef>,
    image: impl AsHandle<ImageRef>,
) -> GrResult<()> {
    let ctx = native::require(ctx)?;
    let image = native::require(image)?;
    let bounds = bounds_of(ctx)?;
    let size = native::image_size(image)?;
    native::context_draw_image(ctx, cover_rect(size, bounds), image)
}

/// Draw `image` stretched into `rect`.
pub fn draw_image(
    ctx: impl AsHandle<ContextRef>,
    rect: Rect,
    image: impl AsHandle<ImageRef>,
) -> GrResult<()> {
    native::context_draw_image(ctx, rect, image)
}

/// Paint a rounded rectangle with the context's current fill/stroke state.
///
/// `radius` is clamped to half the shorter side.
pub fn draw_rounded_rect(
    ctx: impl AsHandle<ContextRef>,
    mode: DrawMode,
    rect: Rect,
    radius: f64,
) -> GrResult<()> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(GrError::validation(format!("invalid corner radius {radius}")));
    }
    let rect = rect.abs();
    let radius = radius.min(rect.width().min(rect.height()) * 0.5);
    let path = kurbo::RoundedRect::from_rect(rect, radius).to_path(0.1);
    native::context_draw_path(ctx, &path, mode)
}

/// Set the fill color of `ctx` from premultiplied RGBA8.
pub fn set_fill_rgba(ctx: impl AsHandle<ContextRef>, color: Rgba8Premul) -> GrResult<()> {
    let color = AutoRef::new(native::color_create_rgba8(color)?);
    native::context_set_fill_color(ctx, &color)
}

/// Set the stroke color of `ctx` from premultiplied RGBA8.
pub fn set_stroke_rgba(ctx: impl AsHandle<ContextRef>, color: Rgba8Premul) -> GrResult<()> {
    let color = AutoRef::new(native::color_create_rgba8(color)?);
    native::context_set_stroke_color(ctx, &color)
}

#[cfg(test)]
#[path = "../../tests/unit/gr/draw.rs"]
mod tests;
