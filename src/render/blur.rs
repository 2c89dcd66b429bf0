use image::{Rgba, RgbaImage};

use crate::foundation::error::{ScrubError, ScrubResult};

/// Premultiplied RGBA, channels on the 0..=255 scale.
type Premul = [f32; 4];

#[derive(Clone, Copy)]
enum Axis {
    Rows,
    Columns,
}

/// Gaussian blur of a straight-alpha RGBA8 image, in place.
///
/// The convolution runs on premultiplied color, so transparent pixels contribute no color and
/// the soft edge of an opaque region keeps its hue instead of fading towards black. Edges clamp.
/// `radius == 0` is a no-op.
pub fn blur_rgba8_in_place(img: &mut RgbaImage, radius: u32, sigma: f32) -> ScrubResult<()> {
    if radius == 0 || img.width() == 0 || img.height() == 0 {
        return Ok(());
    }
    let kernel = gaussian_weights(radius, sigma)?;
    let width = img.width() as usize;
    let height = img.height() as usize;
    let len = width
        .checked_mul(height)
        .ok_or_else(|| ScrubError::render("blur buffer size overflow"))?;

    let mut work: Vec<Premul> = img.pixels().map(premultiply).collect();
    let mut scratch = vec![[0.0; 4]; len];
    convolve(&work, &mut scratch, width, height, Axis::Rows, &kernel);
    convolve(&scratch, &mut work, width, height, Axis::Columns, &kernel);

    for (px, p) in img.pixels_mut().zip(&work) {
        *px = unpremultiply(*p);
    }
    Ok(())
}

/// Normalized weights for offsets `-radius..=radius`.
fn gaussian_weights(radius: u32, sigma: f32) -> ScrubResult<Vec<f32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(ScrubError::validation("blur sigma must be > 0"));
    }
    let r = i64::from(radius);
    let two_sigma_sq = 2.0 * f64::from(sigma).powi(2);
    let raw: Vec<f64> = (-r..=r)
        .map(|i| (-((i * i) as f64) / two_sigma_sq).exp())
        .collect();
    let total: f64 = raw.iter().sum();
    Ok(raw.into_iter().map(|w| (w / total) as f32).collect())
}

fn convolve(
    src: &[Premul],
    dst: &mut [Premul],
    width: usize,
    height: usize,
    axis: Axis,
    kernel: &[f32],
) {
    let radius = kernel.len() / 2;
    let (along, max) = match axis {
        Axis::Rows => (1, width - 1),
        Axis::Columns => (width, height - 1),
    };
    for (i, out) in dst.iter_mut().enumerate() {
        let pos = match axis {
            Axis::Rows => i % width,
            Axis::Columns => i / width,
        };
        let base = i - pos * along;
        let mut acc = [0.0f32; 4];
        for (k, &w) in kernel.iter().enumerate() {
            let tap = (pos + k).saturating_sub(radius).min(max);
            let s = src[base + tap * along];
            for c in 0..4 {
                acc[c] += w * s[c];
            }
        }
        *out = acc;
    }
    debug_assert_eq!(dst.len(), width * height);
}

fn premultiply(px: &Rgba<u8>) -> Premul {
    let [r, g, b, a] = px.0;
    let k = f32::from(a) / 255.0;
    [f32::from(r) * k, f32::from(g) * k, f32::from(b) * k, f32::from(a)]
}

fn unpremultiply(p: Premul) -> Rgba<u8> {
    let to_u8 = |v: f32| v.round().clamp(0.0, 255.0) as u8;
    let alpha = to_u8(p[3]);
    if alpha == 0 {
        return Rgba([0, 0, 0, 0]);
    }
    let k = 255.0 / p[3];
    Rgba([to_u8(p[0] * k), to_u8(p[1] * k), to_u8(p[2] * k), alpha])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_zero_leaves_image_alone() {
        let mut img = RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 4]));
        let before = img.clone();
        blur_rgba8_in_place(&mut img, 0, 1.0).unwrap();
        assert_eq!(img, before);
    }

    #[test]
    fn uniform_opaque_image_is_unchanged() {
        let mut img = RgbaImage::from_pixel(7, 5, Rgba([10, 20, 30, 255]));
        let before = img.clone();
        blur_rgba8_in_place(&mut img, 3, 2.0).unwrap();
        assert_eq!(img, before);
    }

    #[test]
    fn soft_edge_next_to_transparency_keeps_its_color() {
        // Left half opaque red, right half fully transparent (stored as black).
        let mut img = RgbaImage::from_fn(12, 3, |x, _| {
            if x < 6 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        });
        blur_rgba8_in_place(&mut img, 3, 2.0).unwrap();

        let edge = img.get_pixel(7, 1);
        assert!(edge[3] > 0 && edge[3] < 255, "edge alpha {}", edge[3]);
        for p in img.pixels().filter(|p| p[3] > 0) {
            assert!(p[0] >= 254 && p[1] == 0 && p[2] == 0, "darkened {:?}", p.0);
        }
    }

    #[test]
    fn single_pixel_spreads_to_neighbours() {
        let mut img = RgbaImage::new(5, 5);
        img.put_pixel(2, 2, Rgba([255, 255, 255, 255]));
        blur_rgba8_in_place(&mut img, 2, 1.2).unwrap();
        assert!(img.get_pixel(2, 2)[3] < 255);
        assert!(img.get_pixel(1, 2)[3] > 0);
        assert!(img.get_pixel(2, 3)[3] > 0);
        assert_eq!(img.get_pixel(1, 2).0[..3], [255, 255, 255]);
    }

    #[test]
    fn rejects_non_positive_sigma() {
        let mut img = RgbaImage::new(2, 2);
        let err = blur_rgba8_in_place(&mut img, 1, 0.0).unwrap_err();
        assert!(matches!(err, ScrubError::Validation(_)));
    }
}
