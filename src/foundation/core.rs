pub use kurbo::{Affine, BezPath, Point, Rect, Size, Vec2};

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Straight (non-premultiplied) components, as unit floats.
    pub fn to_straight_unit(self) -> [f64; 4] {
        if self.a == 0 {
            return [0.0; 4];
        }
        let a = f64::from(self.a);
        [
            (f64::from(self.r) / a).min(1.0),
            (f64::from(self.g) / a).min(1.0),
            (f64::from(self.b) / a).min(1.0),
            a / 255.0,
        ]
    }
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        for c in px.iter_mut().take(3) {
            *c = ((*c as u16 * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

/// Rectangle that covers `dst` with content of size `src`, preserving aspect ratio.
///
/// The result is centred on `dst`; whatever falls outside `dst` is meant to be cropped.
pub fn cover_rect(src: Size, dst: Rect) -> Rect {
    if src.width <= 0.0 || src.height <= 0.0 {
        return dst;
    }
    let scale = (dst.width() / src.width).max(dst.height() / src.height);
    let w = src.width * scale;
    let h = src.height * scale;
    let c = dst.center();
    Rect::new(c.x - w * 0.5, c.y - h * 0.5, c.x + w * 0.5, c.y + h * 0.5)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
