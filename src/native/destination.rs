use std::fs::File;
use std::io::{BufWriter, Write};
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::unpremultiply_rgba8_in_place;
use crate::foundation::error::{GrError, GrResult};
use crate::handle::auto_ref::AsHandle;
use crate::native::table::{self, Object, with_table};
use crate::native::types::{DestinationRef, ImageRef, NativeHandle, UrlRef, require};

/// Quality used for lossy output when the caller gives none.
pub const DEFAULT_JPEG_QUALITY: f32 = 0.9;

/// Output container of an image destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    Png,
    Jpeg,
}

/// Per-image encoding properties.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DestinationProps {
    /// Lossy compression quality in 0.0..=1.0. Ignored by lossless formats.
    pub quality: Option<f32>,
}

impl DestinationProps {
    pub fn with_quality(quality: f32) -> Self {
        Self {
            quality: Some(quality),
        }
    }
}

pub(crate) struct Destination {
    url: UrlRef,
    format: ImageFormat,
    images: Vec<(ImageRef, DestinationProps)>,
    finalized: bool,
}

impl Destination {
    pub(crate) fn retained(&self) -> Vec<NonZeroU64> {
        std::iter::once(self.url.id())
            .chain(self.images.iter().map(|(i, _)| i.id()))
            .collect()
    }
}

struct EncodeJob {
    path: PathBuf,
    format: ImageFormat,
    pixmap: Arc<vello_cpu::Pixmap>,
    props: DestinationProps,
}

/// Open an encoder session writing `count` images of `format` to `url`.
///
/// PNG and JPEG hold exactly one image. Nothing is written until [`destination_finalize`].
pub fn destination_create_with_url(
    url: impl AsHandle<UrlRef>,
    format: ImageFormat,
    count: usize,
) -> GrResult<DestinationRef> {
    let url = require(url)?;
    if count != 1 {
        return Err(GrError::validation(format!(
            "{format:?} destinations hold exactly one image, got {count}"
        )));
    }
    with_table(|t| {
        match t.get(url)? {
            Object::Url(locator) => {
                locator.file_path()?;
            }
            _ => return Err(GrError::invalid_handle("expected a URL")),
        }
        let url = table::retain_in(t, url)?;
        Ok(t.insert(Object::Destination(Destination {
            url,
            format,
            images: Vec::new(),
            finalized: false,
        })))
    })
}

/// Queue `image` for encoding. The destination keeps the image alive.
pub fn destination_add_image(
    dest: impl AsHandle<DestinationRef>,
    image: impl AsHandle<ImageRef>,
    props: DestinationProps,
) -> GrResult<()> {
    let dest = require(dest)?;
    let image = require(image)?;
    if let Some(q) = props.quality {
        check_quality(q)?;
    }
    with_table(|t| {
        match t.get(dest)? {
            Object::Destination(d) if d.finalized => {
                return Err(GrError::encode("destination already finalized"));
            }
            Object::Destination(d) if !d.images.is_empty() => {
                return Err(GrError::encode(format!(
                    "{:?} destination already holds an image",
                    d.format
                )));
            }
            Object::Destination(_) => {}
            _ => return Err(GrError::invalid_handle("expected an image destination")),
        }
        let image = table::retain_in(t, image)?;
        match t.get_mut(dest)? {
            Object::Destination(d) => {
                d.images.push((image, props));
                Ok(())
            }
            _ => Err(GrError::invalid_handle("expected an image destination")),
        }
    })
}

/// Flush the queued image to the destination's file and close the session.
///
/// The session's reference is dropped whether or not writing succeeded; a session that was
/// already flushed is only closed.
pub fn destination_finalize(dest: DestinationRef) -> GrResult<()> {
    let job = with_table(|t| -> GrResult<Option<EncodeJob>> {
        let (url, format, first, already) = match t.get_mut(dest)? {
            Object::Destination(d) => {
                let already = d.finalized;
                d.finalized = true;
                (d.url, d.format, d.images.first().copied(), already)
            }
            _ => return Err(GrError::invalid_handle("expected an image destination")),
        };
        if already {
            return Ok(None);
        }
        let Some((image, props)) = first else {
            return Err(GrError::encode("no image added to destination"));
        };
        let path = match t.get(url)? {
            Object::Url(locator) => locator.file_path()?.to_path_buf(),
            _ => return Err(GrError::invalid_handle("expected a URL")),
        };
        let pixmap = match t.get(image)? {
            Object::Image(i) => Arc::clone(&i.pixmap),
            _ => return Err(GrError::invalid_handle("expected an image")),
        };
        Ok(Some(EncodeJob {
            path,
            format,
            pixmap,
            props,
        }))
    });

    let out = match job {
        Ok(Some(job)) => write_image(&job),
        Ok(None) => Ok(()),
        Err(e) => Err(e),
    };
    tracing::trace!(handle = ?dest, ok = out.is_ok(), "image destination finalize");
    table::release(dest);
    out
}

fn check_quality(q: f32) -> GrResult<()> {
    if !(0.0..=1.0).contains(&q) {
        return Err(GrError::validation(format!(
            "quality must be within 0.0..=1.0, got {q}"
        )));
    }
    Ok(())
}

fn write_image(job: &EncodeJob) -> GrResult<()> {
    let width = u32::from(job.pixmap.width());
    let height = u32::from(job.pixmap.height());
    let mut rgba = job.pixmap.data_as_u8_slice().to_vec();

    let written = match job.format {
        ImageFormat::Png => {
            unpremultiply_rgba8_in_place(&mut rgba);
            image::save_buffer_with_format(
                &job.path,
                &rgba,
                width,
                height,
                image::ColorType::Rgba8,
                image::ImageFormat::Png,
            )
            .with_context(|| format!("write png '{}'", job.path.display()))
        }
        ImageFormat::Jpeg => {
            // Premultiplied color with alpha dropped is the image flattened over black.
            let rgb: Vec<u8> = rgba
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect();
            let quality = job.props.quality.unwrap_or(DEFAULT_JPEG_QUALITY);
            write_jpeg(&job.path, &rgb, width, height, jpeg_quality_u8(quality))
        }
    };
    written.map_err(|e| GrError::encode(format!("{e:#}")))?;
    tracing::debug!(path = %job.path.display(), format = ?job.format, width, height, "image written");
    Ok(())
}

fn write_jpeg(path: &Path, rgb: &[u8], width: u32, height: u32, quality: u8) -> anyhow::Result<()> {
    let file =
        File::create(path).with_context(|| format!("create jpeg '{}'", path.display()))?;
    let mut out = BufWriter::new(file);
    {
        let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality);
        encoder
            .encode(rgb, width, height, image::ExtendedColorType::Rgb8)
            .with_context(|| format!("encode jpeg '{}'", path.display()))?;
    }
    out.flush()
        .with_context(|| format!("flush jpeg '{}'", path.display()))?;
    Ok(())
}

pub(crate) fn jpeg_quality_u8(quality: f32) -> u8 {
    (quality.clamp(0.0, 1.0) * 100.0).round().clamp(1.0, 100.0) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/native/destination.rs"]
mod tests;
