//! Contain/cover placement of a frame inside a surface.
//!
//! Aspect ratios are compared by integer cross-multiplication so that equal ratios are detected
//! exactly, and scaled lengths are computed multiply-first to keep ties pixel-exact.

use std::cmp::Ordering;

use kurbo::Rect;

use crate::foundation::core::SurfaceSize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FitMode {
    /// Scale to fit without cropping; letterbox or pillarbox the remainder.
    Contain,
    /// Scale to fill, cropping the overflow.
    Cover,
}

/// Which dimension of the surface the scaled image spans exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FitAxis {
    Width,
    Height,
    /// Equal aspect ratios; both dimensions match.
    Both,
}

/// Compare `iw/ih` against `sw/sh` without floating point.
fn compare_aspect(image: (u32, u32), surface: SurfaceSize) -> Ordering {
    let (iw, ih) = (u64::from(image.0), u64::from(image.1));
    let (sw, sh) = (u64::from(surface.width), u64::from(surface.height));
    (iw * sh).cmp(&(sw * ih))
}

/// The axis `mode` fits against for an image of `image` dimensions.
pub fn fit_axis(mode: FitMode, image: (u32, u32), surface: SurfaceSize) -> FitAxis {
    match (compare_aspect(image, surface), mode) {
        (Ordering::Equal, _) => FitAxis::Both,
        (Ordering::Greater, FitMode::Contain) | (Ordering::Less, FitMode::Cover) => FitAxis::Width,
        (Ordering::Less, FitMode::Contain) | (Ordering::Greater, FitMode::Cover) => FitAxis::Height,
    }
}

/// Destination rectangle for drawing `image` into `surface`, centered on both axes.
///
/// Returns `None` when either side has zero area. For `Cover` the rectangle may extend past the
/// surface bounds (negative origin); the overflow is what gets cropped.
pub fn fit_rect(mode: FitMode, image: (u32, u32), surface: SurfaceSize) -> Option<Rect> {
    if image.0 == 0 || image.1 == 0 || surface.is_empty() {
        return None;
    }
    let (iw, ih) = (f64::from(image.0), f64::from(image.1));
    let (sw, sh) = (f64::from(surface.width), f64::from(surface.height));

    let (dw, dh) = match fit_axis(mode, image, surface) {
        FitAxis::Both => (sw, sh),
        FitAxis::Width => (sw, sw * ih / iw),
        FitAxis::Height => (sh * iw / ih, sh),
    };

    let dx = (sw - dw) / 2.0;
    let dy = (sh - dh) / 2.0;
    Some(Rect::new(dx, dy, dx + dw, dy + dh))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(width: u32, height: u32) -> SurfaceSize {
        SurfaceSize { width, height }
    }

    #[test]
    fn contain_wide_image_letterboxes() {
        let r = fit_rect(FitMode::Contain, (1920, 1080), size(1000, 1000)).unwrap();
        assert_eq!(r.width(), 1000.0);
        assert_eq!(r.height(), 562.5);
        assert_eq!(r.x0, 0.0);
        assert_eq!(r.y0, 218.75);
    }

    #[test]
    fn cover_wide_image_crops_sides() {
        let r = fit_rect(FitMode::Cover, (1920, 1080), size(1000, 1000)).unwrap();
        assert_eq!(r.height(), 1000.0);
        assert!((r.width() - 1777.777_777_777_777_8).abs() < 1e-9);
        assert!(r.x0 < 0.0);
        assert_eq!(r.y0, 0.0);
    }

    #[test]
    fn tie_is_exact_in_both_modes() {
        for mode in [FitMode::Contain, FitMode::Cover] {
            let r = fit_rect(mode, (1920, 1080), size(1280, 720)).unwrap();
            assert_eq!(r, Rect::new(0.0, 0.0, 1280.0, 720.0));
            assert_eq!(fit_axis(mode, (1920, 1080), size(1280, 720)), FitAxis::Both);
        }
    }

    #[test]
    fn zero_area_has_no_placement() {
        assert!(fit_rect(FitMode::Contain, (0, 10), size(10, 10)).is_none());
        assert!(fit_rect(FitMode::Cover, (10, 10), size(0, 10)).is_none());
    }
}
