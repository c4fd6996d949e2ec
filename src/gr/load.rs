use std::path::Path;

use crate::foundation::error::GrResult;
use crate::handle::auto_ref::AutoRef;
use crate::native::{self, ImageRef};

/// Load an image from `url` (`file://`, a bare path, or `http://`) into `out`.
///
/// `out` must be empty (see [`AutoRef::addr`]). On success it holds an image the caller owns;
/// on failure it is left untouched.
#[tracing::instrument(level = "debug", skip(out))]
pub fn load_from_url(out: &mut Option<ImageRef>, url: &str) -> GrResult<()> {
    let text = AutoRef::new(native::string_create(url));
    let url = AutoRef::new(native::url_create_with_string(&text)?);
    let provider = AutoRef::new(native::data_provider_create_with_url(&url)?);
    *out = Some(native::image_create_from_data_provider(&provider)?);
    Ok(())
}

/// Load an image from a local file into `out`. Same slot contract as [`load_from_url`].
#[tracing::instrument(level = "debug", skip(out, filename), fields(filename = %filename.as_ref().display()))]
pub fn load_from_file(out: &mut Option<ImageRef>, filename: impl AsRef<Path>) -> GrResult<()> {
    let provider = AutoRef::new(native::data_provider_create_with_filename(filename)?);
    *out = Some(native::image_create_from_data_provider(&provider)?);
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/gr/load.rs"]
mod tests;
