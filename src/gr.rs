//! Image I/O and drawing helpers over native handles.
//!
//! Helpers borrow the handles they are given (anything implementing [`AsHandle`](crate::AsHandle))
//! and never release them. Handles they produce are owned by the caller, who normally stores
//! them in an [`AutoRef`](crate::AutoRef).

mod draw;
mod export;
mod load;
mod surface;

pub use draw::{draw_covering_image, draw_image, draw_rounded_rect, set_fill_rgba, set_stroke_rgba};
pub use export::{
    export_context_as_jpg, export_context_as_png, export_image_as_jpg, export_image_as_png,
};
pub use load::{load_from_file, load_from_url};
pub use surface::{bounds_of, new_context, new_context_with_data};

pub use crate::native::DrawMode;
