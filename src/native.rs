//! The object layer behind handle values.
//!
//! A process-wide table maps handle ids to reference-counted objects. Acquiring functions
//! (`*_create*`) hand out a handle carrying one reference that the caller must give back through
//! the kind's release entry point, normally by holding it in an [`AutoRef`](crate::AutoRef).
//! Objects that refer to other objects (a color to its color space, an image to its data
//! provider, ...) retain them and release them when freed.

mod color;
mod context;
mod destination;
mod image;
mod provider;
mod string;
mod table;
mod types;
mod url;

pub use color::{
    ColorModel, color_components, color_create, color_create_rgba8, color_release, color_rgba8,
    color_space_create_device_gray, color_space_create_device_rgb, color_space_model,
};
pub use context::{
    DrawMode, bitmap_context_create, bitmap_context_create_image, bitmap_context_create_with_data,
    bitmap_context_data, bitmap_context_height, bitmap_context_width, context_draw_image,
    context_draw_path, context_fill_rect, context_release, context_set_fill_color,
    context_set_line_width, context_set_stroke_color,
};
pub use destination::{
    DEFAULT_JPEG_QUALITY, DestinationProps, ImageFormat, destination_add_image,
    destination_create_with_url, destination_finalize,
};
pub use self::image::{
    image_create_from_data_provider, image_height, image_rgba8_premul, image_size, image_width,
};
pub use provider::{
    data_provider_create_with_data, data_provider_create_with_filename,
    data_provider_create_with_url, data_provider_len, data_provider_release,
};
pub use string::{string_create, string_value};
pub use table::{ObjectKind, is_live, release, retain, retain_count};
pub use types::{
    ColorRef, ColorSpaceRef, ContextRef, DataProviderRef, DestinationRef, ImageRef,
    NativeHandle, StringRef, UrlRef,
};
pub use url::{url_create_from_file_path, url_create_with_string, url_string};

pub(crate) use types::require;
