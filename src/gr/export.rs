use std::path::Path;

use crate::foundation::error::{GrError, GrResult};
use crate::handle::auto_ref::{AsHandle, AutoRef};
use crate::native::{self, ContextRef, DestinationProps, ImageFormat, ImageRef};

/// Write `image` to `filename` as PNG.
pub fn export_image_as_png(
    image: impl AsHandle<ImageRef>,
    filename: impl AsRef<Path>,
) -> GrResult<()> {
    let image = native::require(image)?;
    export_image(
        image,
        filename.as_ref(),
        ImageFormat::Png,
        DestinationProps::default(),
    )
}

/// Write the current contents of `ctx` to `filename` as PNG.
pub fn export_context_as_png(
    ctx: impl AsHandle<ContextRef>,
    filename: impl AsRef<Path>,
) -> GrResult<()> {
    let image = AutoRef::new(native::bitmap_context_create_image(ctx)?);
    export_image_as_png(&image, filename)
}

/// Write `image` to `filename` as JPEG; `quality` is in 0.0..=1.0.
pub fn export_image_as_jpg(
    image: impl AsHandle<ImageRef>,
    filename: impl AsRef<Path>,
    quality: f32,
) -> GrResult<()> {
    let image = native::require(image)?;
    if !(0.0..=1.0).contains(&quality) {
        return Err(GrError::validation(format!(
            "jpeg quality must be within 0.0..=1.0, got {quality}"
        )));
    }
    export_image(
        image,
        filename.as_ref(),
        ImageFormat::Jpeg,
        DestinationProps::with_quality(quality),
    )
}

/// Write the current contents of `ctx` to `filename` as JPEG; `quality` is in 0.0..=1.0.
pub fn export_context_as_jpg(
    ctx: impl AsHandle<ContextRef>,
    filename: impl AsRef<Path>,
    quality: f32,
) -> GrResult<()> {
    let image = AutoRef::new(native::bitmap_context_create_image(ctx)?);
    export_image_as_jpg(&image, filename, quality)
}

#[tracing::instrument(level = "debug", skip(props))]
fn export_image(
    image: ImageRef,
    path: &Path,
    format: ImageFormat,
    props: DestinationProps,
) -> GrResult<()> {
    let url = AutoRef::new(native::url_create_from_file_path(path));
    let mut dest = AutoRef::new(native::destination_create_with_url(&url, format, 1)?);
    native::destination_add_image(&dest, image, props)?;
    // Finalize explicitly so a failed write reaches the caller.
    match dest.take() {
        Some(dest) => native::destination_finalize(dest),
        None => Ok(()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gr/export.rs"]
mod tests;
