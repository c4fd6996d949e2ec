//! Scoped ownership of reference-counted graphics handles.
//!
//! [`AutoRef`] owns at most one handle and runs the handle kind's registered release when the
//! value is replaced, reset or dropped. The [`native`] module is the reference-counted object
//! layer the handles point into; [`gr`] builds small drawing/IO helpers on top of both, and
//! [`stitch`] uses those to lay photos out side by side.
#![forbid(unsafe_code)]

mod foundation;
mod handle;

pub mod gr;
pub mod native;
pub mod stitch;

pub use foundation::core::{Affine, BezPath, Point, Rect, Rgba8Premul, Size, Vec2, cover_rect};
pub use foundation::error::{GrError, GrResult};
pub use handle::auto_ref::{AsHandle, AutoRef};
pub use handle::policy::{RawHandle, Release, ReleasePolicy};
pub use stitch::{StitchOpts, stitch_all, stitch_pair};
