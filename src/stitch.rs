//! Side-by-side photo stitching built on the [`gr`](crate::gr) helpers.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::core::{Rect, Rgba8Premul};
use crate::foundation::error::{GrError, GrResult};
use crate::gr::{self, DrawMode};
use crate::handle::auto_ref::{AsHandle, AutoRef};
use crate::native::{self, ContextRef, DEFAULT_JPEG_QUALITY, ImageRef};

/// Options for [`stitch_pair`] and [`stitch_all`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StitchOpts {
    /// JPEG quality of the output, 0.0..=1.0.
    pub jpeg_quality: f32,
    /// Horizontal gap between the two panes, in pixels.
    pub gap: u32,
    /// Fill behind the panes (visible in the gap).
    pub background: Rgba8Premul,
    /// Fixed pane aspect ratio (width / height). `None` keeps each photo's own ratio;
    /// otherwise photos are cropped to cover their pane.
    pub pane_aspect: Option<f64>,
    /// Cap on the output height. The default is the shorter photo's height.
    pub max_height: Option<u32>,
    /// Width of the frame stroked around each pane; 0 disables it.
    pub frame_width: f64,
    /// Corner radius of the frame.
    pub frame_radius: f64,
    pub frame_color: Rgba8Premul,
}

impl Default for StitchOpts {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            gap: 0,
            background: Rgba8Premul::from_straight_rgba(0, 0, 0, 255),
            pane_aspect: None,
            max_height: None,
            frame_width: 0.0,
            frame_radius: 0.0,
            frame_color: Rgba8Premul::from_straight_rgba(255, 255, 255, 255),
        }
    }
}

impl StitchOpts {
    /// Read options from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> GrResult<Self> {
        let path = path.as_ref();
        let f = File::open(path)
            .with_context(|| format!("open stitch options '{}'", path.display()))?;
        let opts: Self = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse stitch options '{}'", path.display()))?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> GrResult<()> {
        if !(0.0..=1.0).contains(&self.jpeg_quality) {
            return Err(GrError::validation("jpeg_quality must be within 0.0..=1.0"));
        }
        if let Some(aspect) = self.pane_aspect {
            if !aspect.is_finite() || aspect <= 0.0 {
                return Err(GrError::validation("pane_aspect must be > 0"));
            }
        }
        if self.max_height == Some(0) {
            return Err(GrError::validation("max_height must be > 0"));
        }
        if !self.frame_width.is_finite() || self.frame_width < 0.0 {
            return Err(GrError::validation("frame_width must be >= 0"));
        }
        if !self.frame_radius.is_finite() || self.frame_radius < 0.0 {
            return Err(GrError::validation("frame_radius must be >= 0"));
        }
        Ok(())
    }
}

/// Stitch photos `a` and `b` side by side into the JPEG `dst`.
#[tracing::instrument(
    level = "info",
    skip(a, b, dst, opts),
    fields(a = %a.display(), b = %b.display(), dst = %dst.display())
)]
pub fn stitch_pair(a: &Path, b: &Path, dst: &Path, opts: &StitchOpts) -> GrResult<()> {
    opts.validate()?;

    let mut left = AutoRef::<ImageRef>::empty();
    gr::load_from_file(left.addr(), a)?;
    let mut right = AutoRef::<ImageRef>::empty();
    gr::load_from_file(right.addr(), b)?;

    let (lw, lh) = (native::image_width(&left)?, native::image_height(&left)?);
    let (rw, rh) = (native::image_width(&right)?, native::image_height(&right)?);
    let mut height = lh.min(rh);
    if let Some(max) = opts.max_height {
        height = height.min(max);
    }
    let pane_width = |w: u32, h: u32| -> u32 {
        let aspect = opts
            .pane_aspect
            .unwrap_or_else(|| f64::from(w) / f64::from(h));
        (f64::from(height) * aspect).round().max(1.0) as u32
    };
    let left_w = pane_width(lw, lh);
    let right_w = pane_width(rw, rh);
    let width = left_w
        .checked_add(opts.gap)
        .and_then(|w| w.checked_add(right_w))
        .ok_or_else(|| GrError::validation("stitched width overflows"))?;
    tracing::debug!(width, height, left_w, right_w, "stitch layout");

    let canvas = AutoRef::new(gr::new_context(width, height)?);
    gr::set_fill_rgba(&canvas, opts.background)?;
    native::context_fill_rect(&canvas, gr::bounds_of(&canvas)?)?;

    let h = f64::from(height);
    let left_rect = Rect::new(0.0, 0.0, f64::from(left_w), h);
    let right_x = f64::from(left_w) + f64::from(opts.gap);
    let right_rect = Rect::new(right_x, 0.0, right_x + f64::from(right_w), h);
    place_pane(&canvas, &left, left_rect, opts)?;
    place_pane(&canvas, &right, right_rect, opts)?;

    gr::export_context_as_jpg(&canvas, dst, opts.jpeg_quality)
}

fn place_pane(
    canvas: impl AsHandle<ContextRef>,
    image: impl AsHandle<ImageRef>,
    rect: Rect,
    opts: &StitchOpts,
) -> GrResult<()> {
    let canvas = native::require(canvas)?;
    let pane = AutoRef::new(gr::new_context(
        rect.width().round() as u32,
        rect.height().round() as u32,
    )?);
    gr::draw_covering_image(&pane, image)?;
    let snapshot = AutoRef::new(native::bitmap_context_create_image(&pane)?);
    gr::draw_image(canvas, rect, &snapshot)?;

    if opts.frame_width > 0.0 {
        native::context_set_line_width(canvas, opts.frame_width)?;
        gr::set_stroke_rgba(canvas, opts.frame_color)?;
        // Keep the stroke inside the pane.
        let half = opts.frame_width * 0.5;
        let frame = Rect::new(rect.x0 + half, rect.y0 + half, rect.x1 - half, rect.y1 - half);
        gr::draw_rounded_rect(canvas, DrawMode::Stroke, frame, opts.frame_radius)?;
    }
    Ok(())
}

fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
}

/// Stitch every consecutive pair of JPEG photos in `photos_dir` (sorted by name) into
/// `out_dir/<a>-<b>.jpg`. Stops at the first failing pair.
pub fn stitch_all(photos_dir: &Path, out_dir: &Path, opts: &StitchOpts) -> GrResult<Vec<PathBuf>> {
    let mut photos = std::fs::read_dir(photos_dir)
        .with_context(|| format!("list photos in '{}'", photos_dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_jpeg(p))
        .collect::<Vec<_>>();
    photos.sort();
    tracing::info!(count = photos.len(), dir = %photos_dir.display(), "photos found");

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create output dir '{}'", out_dir.display()))?;

    let mut written = Vec::with_capacity(photos.len().saturating_sub(1));
    for pair in photos.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let stem = |p: &Path| {
            p.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        let dst = out_dir.join(format!("{}-{}.jpg", stem(a), stem(b)));
        stitch_pair(a, b, &dst, opts).map_err(|e| {
            GrError::Other(anyhow::Error::new(e).context(format!(
                "stitch '{}' + '{}'",
                a.display(),
                b.display()
            )))
        })?;
        written.push(dst);
    }
    Ok(written)
}

#[cfg(test)]
#[path = "../tests/unit/stitch.rs"]
mod tests;
