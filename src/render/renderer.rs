use image::imageops::FilterType;

use crate::foundation::core::Viewport;
use crate::foundation::error::ScrubResult;
use crate::frames::store::FrameStore;
use crate::render::blur::blur_rgba8_in_place;
use crate::render::fit::{FitMode, fit_rect};
use crate::render::surface::{Surface, SurfaceGeometry};

#[derive(Clone, Copy, Debug, PartialEq)]
struct AmbientBlur {
    radius: u32,
    sigma: f32,
}

/// Draws frames into a contain-fit foreground surface and a cover-fit ambient surface.
#[derive(Debug)]
pub struct Renderer {
    foreground: Surface,
    ambient: Surface,
    ambient_scale: f64,
    blur: Option<AmbientBlur>,
    filter: FilterType,
    draw_count: u64,
}

impl Renderer {
    pub fn new(viewport: Viewport, ambient_scale: f64) -> Self {
        let geometry = SurfaceGeometry::for_viewport(viewport, ambient_scale);
        Self {
            foreground: Surface::new(geometry.foreground),
            ambient: Surface::new(geometry.ambient),
            ambient_scale,
            blur: None,
            filter: FilterType::Triangle,
            draw_count: 0,
        }
    }

    /// Blur the ambient surface after each draw. A zero radius disables blurring.
    pub fn with_ambient_blur(mut self, radius: u32, sigma: f32) -> Self {
        self.blur = (radius > 0).then_some(AmbientBlur { radius, sigma });
        self
    }

    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    pub fn foreground(&self) -> &Surface {
        &self.foreground
    }

    pub fn ambient(&self) -> &Surface {
        &self.ambient
    }

    pub fn geometry(&self) -> SurfaceGeometry {
        SurfaceGeometry {
            foreground: self.foreground.size(),
            ambient: self.ambient.size(),
        }
    }

    /// Number of frames actually composited so far.
    pub fn draw_count(&self) -> u64 {
        self.draw_count
    }

    /// Resize both surfaces for `viewport`. Contents are discarded.
    pub fn resize(&mut self, viewport: Viewport) -> SurfaceGeometry {
        let geometry = SurfaceGeometry::for_viewport(viewport, self.ambient_scale);
        self.foreground.resize(geometry.foreground);
        self.ambient.resize(geometry.ambient);
        tracing::debug!(?geometry, "surfaces resized");
        geometry
    }

    /// Draw frame `index` into both surfaces.
    ///
    /// Pending, failed, or out-of-range frames are a no-op and return `Ok(false)`; neither
    /// surface is touched.
    pub fn draw_frame(&mut self, store: &FrameStore, index: usize) -> ScrubResult<bool> {
        let Some(decoded) = store.frame(index).and_then(|f| f.decoded()) else {
            tracing::debug!(index, "frame unavailable; skipping draw");
            return Ok(false);
        };
        let src = decoded.pixels.as_ref();
        let dims = decoded.dimensions();

        self.foreground.clear();
        if let Some(dest) = fit_rect(FitMode::Contain, dims, self.foreground.size()) {
            self.foreground.draw_image(src, dest, self.filter);
        }

        self.ambient.clear();
        if let Some(dest) = fit_rect(FitMode::Cover, dims, self.ambient.size()) {
            self.ambient.draw_image(src, dest, self.filter);
        }
        if let Some(blur) = self.blur {
            blur_rgba8_in_place(self.ambient.pixels_mut(), blur.radius, blur.sigma)?;
        }

        self.draw_count += 1;
        tracing::trace!(index, "frame drawn");
        Ok(true)
    }
}
