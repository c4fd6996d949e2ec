use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::{Size, premultiply_rgba8_in_place};
use crate::foundation::error::{GrError, GrResult};
use crate::handle::auto_ref::AsHandle;
use crate::native::provider::provider_bytes;
use crate::native::table::{self, Object, with_table};
use crate::native::types::{DataProviderRef, ImageRef, require};

pub(crate) struct BitmapImage {
    pub(crate) pixmap: Arc<vello_cpu::Pixmap>,
    pub(crate) provider: Option<DataProviderRef>,
}

/// Decode PNG/JPEG/... bytes from `provider`. The image keeps the provider alive.
pub fn image_create_from_data_provider(
    provider: impl AsHandle<DataProviderRef>,
) -> GrResult<ImageRef> {
    let provider = require(provider)?;
    let bytes = provider_bytes(provider)?;
    let pixmap = decode_to_pixmap(&bytes)?;
    with_table(|t| {
        let provider = table::retain_in(t, provider)?;
        Ok(t.insert(Object::Image(BitmapImage {
            pixmap: Arc::new(pixmap),
            provider: Some(provider),
        })))
    })
}

pub(crate) fn image_create_from_pixmap(pixmap: vello_cpu::Pixmap) -> ImageRef {
    with_table(|t| {
        t.insert(Object::Image(BitmapImage {
            pixmap: Arc::new(pixmap),
            provider: None,
        }))
    })
}

pub fn image_width(image: impl AsHandle<ImageRef>) -> GrResult<u32> {
    image_pixmap(image).map(|p| u32::from(p.width()))
}

pub fn image_height(image: impl AsHandle<ImageRef>) -> GrResult<u32> {
    image_pixmap(image).map(|p| u32::from(p.height()))
}

pub fn image_size(image: impl AsHandle<ImageRef>) -> GrResult<Size> {
    image_pixmap(image).map(|p| Size::new(f64::from(p.width()), f64::from(p.height())))
}

/// Copy of the image pixels as premultiplied RGBA8, row-major.
pub fn image_rgba8_premul(image: impl AsHandle<ImageRef>) -> GrResult<Vec<u8>> {
    image_pixmap(image).map(|p| p.data_as_u8_slice().to_vec())
}

pub(crate) fn image_pixmap(image: impl AsHandle<ImageRef>) -> GrResult<Arc<vello_cpu::Pixmap>> {
    let image = require(image)?;
    with_table(|t| match t.get(image)? {
        Object::Image(i) => Ok(Arc::clone(&i.pixmap)),
        _ => Err(GrError::invalid_handle("expected an image")),
    })
}

fn decode_to_pixmap(bytes: &[u8]) -> GrResult<vello_cpu::Pixmap> {
    let dyn_img = image::load_from_memory(bytes)
        .context("decode image from memory")
        .map_err(|e| GrError::decode(format!("{e:#}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);
    pixmap_from_premul_bytes(&rgba8_premul, width, height)
}

pub(crate) fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> GrResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| GrError::validation("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| GrError::validation("pixmap height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(GrError::validation("pixmap must not be empty"));
    }
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(GrError::validation("pixmap byte len mismatch"));
    }
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/native/image.rs"]
mod tests;
