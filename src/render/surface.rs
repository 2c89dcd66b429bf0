use std::path::Path;

use anyhow::Context as _;
use image::imageops::{self, FilterType};
use kurbo::Rect;

use crate::foundation::core::{SurfaceSize, Viewport};
use crate::foundation::error::ScrubResult;

/// Pixel sizes of the two drawing surfaces for a given viewport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceGeometry {
    /// Exactly the viewport.
    pub foreground: SurfaceSize,
    /// The viewport scaled by the ambient factor, rounded per axis.
    pub ambient: SurfaceSize,
}

impl SurfaceGeometry {
    pub fn for_viewport(viewport: Viewport, ambient_scale: f64) -> Self {
        Self {
            foreground: viewport.size(),
            ambient: viewport.scaled(ambient_scale),
        }
    }
}

/// An RGBA8 raster target.
///
/// `revision` increases on every mutation, which lets callers detect whether a draw touched the
/// surface at all.
#[derive(Clone, Debug)]
pub struct Surface {
    pixels: image::RgbaImage,
    revision: u64,
}

impl Surface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            pixels: image::RgbaImage::new(size.width, size.height),
            revision: 0,
        }
    }

    pub fn size(&self) -> SurfaceSize {
        SurfaceSize {
            width: self.pixels.width(),
            height: self.pixels.height(),
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn pixels(&self) -> &image::RgbaImage {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut image::RgbaImage {
        self.revision += 1;
        &mut self.pixels
    }

    /// Reallocate to `size`. Like a canvas, resizing discards the contents.
    pub fn resize(&mut self, size: SurfaceSize) {
        self.pixels = image::RgbaImage::new(size.width, size.height);
        self.revision += 1;
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&mut self) {
        self.pixels_mut().fill(0);
    }

    /// Draw `src` scaled into `dest`, clipped to the surface bounds.
    ///
    /// Only the part of `src` that lands on the surface is cropped and resampled, so the cost
    /// tracks the surface size even when a cover fit overflows it by orders of magnitude.
    pub fn draw_image(&mut self, src: &image::RgbaImage, dest: Rect, filter: FilterType) {
        let Some(clip) = ClippedDraw::compute(src.dimensions(), dest, self.size()) else {
            return;
        };
        let (sx, sy, sw, sh) = clip.source;
        let (dx, dy, dw, dh) = clip.target;
        let view = imageops::crop_imm(src, sx, sy, sw, sh);
        let scaled = if (sw, sh) == (dw, dh) {
            view.to_image()
        } else {
            imageops::resize(&*view, dw, dh, filter)
        };
        imageops::replace(self.pixels_mut(), &scaled, i64::from(dx), i64::from(dy));
    }

    pub fn save_png(&self, path: &Path) -> ScrubResult<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        self.pixels
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }
}

/// Source crop and on-surface target of a draw, both as `(x, y, w, h)` in whole pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ClippedDraw {
    source: (u32, u32, u32, u32),
    target: (u32, u32, u32, u32),
}

impl ClippedDraw {
    fn compute(src: (u32, u32), dest: Rect, surface: SurfaceSize) -> Option<Self> {
        let (src_w, src_h) = src;
        if src_w == 0 || src_h == 0 || dest.width() <= 0.0 || dest.height() <= 0.0 {
            return None;
        }
        let tx0 = dest.x0.max(0.0).round();
        let ty0 = dest.y0.max(0.0).round();
        let tx1 = dest.x1.min(f64::from(surface.width)).round();
        let ty1 = dest.y1.min(f64::from(surface.height)).round();
        if tx1 - tx0 < 1.0 || ty1 - ty0 < 1.0 {
            return None;
        }

        let scale_x = f64::from(src_w) / dest.width();
        let scale_y = f64::from(src_h) / dest.height();
        let (sx, sw) = source_span(tx0, tx1, dest.x0, scale_x, src_w);
        let (sy, sh) = source_span(ty0, ty1, dest.y0, scale_y, src_h);

        Some(Self {
            source: (sx, sy, sw, sh),
            target: (tx0 as u32, ty0 as u32, (tx1 - tx0) as u32, (ty1 - ty0) as u32),
        })
    }
}

/// Map the target span `[t0, t1)` back into source pixels, at least one pixel wide.
fn source_span(t0: f64, t1: f64, origin: f64, scale: f64, len: u32) -> (u32, u32) {
    let max = f64::from(len);
    let s0 = ((t0 - origin) * scale).floor().clamp(0.0, max - 1.0);
    let s1 = ((t1 - origin) * scale).ceil().clamp(s0 + 1.0, max);
    (s0 as u32, (s1 - s0) as u32)
}
