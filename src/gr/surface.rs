use crate::foundation::core::Rect;
use crate::foundation::error::GrResult;
use crate::handle::auto_ref::{AsHandle, AutoRef};
use crate::native::{self, ContextRef};

/// A transparent device-RGB drawing surface. The caller owns the returned context.
#[tracing::instrument(level = "debug")]
pub fn new_context(width: u32, height: u32) -> GrResult<ContextRef> {
    let space = AutoRef::new(native::color_space_create_device_rgb());
    native::bitmap_context_create(width, height, &space)
}

/// A device-RGB drawing surface backed by caller pixels (premultiplied RGBA8).
#[tracing::instrument(level = "debug", skip(data), fields(len = data.len()))]
pub fn new_context_with_data(data: Vec<u8>, width: u32, height: u32) -> GrResult<ContextRef> {
    let space = AutoRef::new(native::color_space_create_device_rgb());
    native::bitmap_context_create_with_data(data, width, height, &space)
}

/// Pixel bounds of `ctx`, anchored at the origin.
pub fn bounds_of(ctx: impl AsHandle<ContextRef>) -> GrResult<Rect> {
    let ctx = native::require(ctx)?;
    let w = native::bitmap_context_width(ctx)?;
    let h = native::bitmap_context_height(ctx)?;
    Ok(Rect::new(0.0, 0.0, f64::from(w), f64::from(h)))
}
