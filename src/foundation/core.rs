use std::str::FromStr;

use crate::foundation::error::{ScrubError, ScrubResult};

pub use kurbo::{Rect, Size};

/// Inner window dimensions in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Viewport {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Viewport {
    /// Create a viewport, rejecting zero-area dimensions.
    pub fn new(width: u32, height: u32) -> ScrubResult<Self> {
        if width == 0 || height == 0 {
            return Err(ScrubError::validation("viewport dimensions must be > 0"));
        }
        Ok(Self { width, height })
    }

    /// The viewport scaled by `factor` on both axes, rounded half away from zero.
    pub fn scaled(self, factor: f64) -> SurfaceSize {
        SurfaceSize {
            width: (f64::from(self.width) * factor).round() as u32,
            height: (f64::from(self.height) * factor).round() as u32,
        }
    }

    pub fn size(self) -> SurfaceSize {
        SurfaceSize {
            width: self.width,
            height: self.height,
        }
    }
}

impl FromStr for Viewport {
    type Err = ScrubError;

    /// Parse `WIDTHxHEIGHT`, e.g. `1920x1080`.
    fn from_str(s: &str) -> ScrubResult<Self> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| ScrubError::validation(format!("viewport '{s}' is not WxH")))?;
        let width = w
            .trim()
            .parse::<u32>()
            .map_err(|_| ScrubError::validation(format!("viewport width '{w}' is not a number")))?;
        let height = h.trim().parse::<u32>().map_err(|_| {
            ScrubError::validation(format!("viewport height '{h}' is not a number"))
        })?;
        Self::new(width, height)
    }
}

/// Pixel dimensions of a raster surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn to_kurbo(self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }
}

/// Clamp `v` into `[0, 1]`, mapping NaN to `0`.
pub fn unit_clamp(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}
