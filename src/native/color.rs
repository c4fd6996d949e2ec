use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{GrError, GrResult};
use crate::handle::auto_ref::AsHandle;
use crate::native::table::{self, Object, with_table};
use crate::native::types::{ColorRef, ColorSpaceRef, require};

/// Color model of a color space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorModel {
    DeviceRgb,
    DeviceGray,
}

impl ColorModel {
    /// Number of color components, not counting alpha.
    pub fn components(self) -> usize {
        match self {
            Self::DeviceRgb => 3,
            Self::DeviceGray => 1,
        }
    }
}

pub(crate) struct ColorValue {
    pub(crate) space: ColorSpaceRef,
    pub(crate) model: ColorModel,
    /// Color components followed by alpha, each in 0..=1.
    pub(crate) components: Vec<f64>,
}

impl ColorValue {
    /// Straight (non-premultiplied) RGBA8.
    pub(crate) fn rgba8(&self) -> [u8; 4] {
        fn to_u8(v: f64) -> u8 {
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        match self.model {
            ColorModel::DeviceRgb => [
                to_u8(self.components[0]),
                to_u8(self.components[1]),
                to_u8(self.components[2]),
                to_u8(self.components[3]),
            ],
            ColorModel::DeviceGray => {
                let g = to_u8(self.components[0]);
                [g, g, g, to_u8(self.components[1])]
            }
        }
    }
}

pub fn color_space_create_device_rgb() -> ColorSpaceRef {
    with_table(|t| t.insert(Object::ColorSpace(ColorModel::DeviceRgb)))
}

pub fn color_space_create_device_gray() -> ColorSpaceRef {
    with_table(|t| t.insert(Object::ColorSpace(ColorModel::DeviceGray)))
}

pub fn color_space_model(space: impl AsHandle<ColorSpaceRef>) -> GrResult<ColorModel> {
    let space = require(space)?;
    with_table(|t| match t.get(space)? {
        Object::ColorSpace(model) => Ok(*model),
        _ => Err(GrError::invalid_handle("expected a color space")),
    })
}

/// Create a color in `space`. `components` holds the model's components followed by alpha.
///
/// The color keeps its color space alive.
pub fn color_create(space: impl AsHandle<ColorSpaceRef>, components: &[f64]) -> GrResult<ColorRef> {
    let space = require(space)?;
    with_table(|t| {
        let model = match t.get(space)? {
            Object::ColorSpace(model) => *model,
            _ => return Err(GrError::invalid_handle("expected a color space")),
        };
        if components.len() != model.components() + 1 {
            return Err(GrError::validation(format!(
                "{model:?} colors take {} components plus alpha, got {}",
                model.components(),
                components.len()
            )));
        }
        if components.iter().any(|c| !c.is_finite()) {
            return Err(GrError::validation("color components must be finite"));
        }
        let space = table::retain_in(t, space)?;
        Ok(t.insert(Object::Color(ColorValue {
            space,
            model,
            components: components.to_vec(),
        })))
    })
}

/// A device RGB color from premultiplied RGBA8.
pub fn color_create_rgba8(color: Rgba8Premul) -> GrResult<ColorRef> {
    let space = crate::AutoRef::new(color_space_create_device_rgb());
    color_create(&space, &color.to_straight_unit())
}

pub fn color_components(color: impl AsHandle<ColorRef>) -> GrResult<Vec<f64>> {
    let color = require(color)?;
    with_table(|t| match t.get(color)? {
        Object::Color(c) => Ok(c.components.clone()),
        _ => Err(GrError::invalid_handle("expected a color")),
    })
}

/// Straight (non-premultiplied) RGBA8 of `color`.
pub fn color_rgba8(color: impl AsHandle<ColorRef>) -> GrResult<[u8; 4]> {
    let color = require(color)?;
    with_table(|t| match t.get(color)? {
        Object::Color(c) => Ok(c.rgba8()),
        _ => Err(GrError::invalid_handle("expected a color")),
    })
}

/// Color-specific release.
pub fn color_release(color: ColorRef) {
    tracing::trace!(handle = ?color, "color release");
    table::release(color);
}

#[cfg(test)]
#[path = "../../tests/unit/native/color.rs"]
mod tests;
