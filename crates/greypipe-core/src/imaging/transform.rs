//! Pure image transforms: bounding-box resize and greyscale conversion.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use crate::config::ResizeConfig;

/// Maximum output dimensions for [`resize_to_bounding_box`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            max_width: 500,
            max_height: 500,
        }
    }
}

impl From<&ResizeConfig> for BoundingBox {
    fn from(config: &ResizeConfig) -> Self {
        Self {
            max_width: config.max_width,
            max_height: config.max_height,
        }
    }
}

/// Compute the dimensions of `(width, height)` scaled uniformly to fit `bounds`.
///
/// Returns `None` when the image already fits (scale >= 1), since images are
/// never upscaled. Dimensions are rounded and clamped to `1..=max`.
///
/// ```
/// # use greypipe_core::imaging::{fit_within, BoundingBox};
/// let bounds = BoundingBox::default();
/// assert_eq!(fit_within(2000, 1000, bounds), Some((500, 250)));
/// assert_eq!(fit_within(300, 200, bounds), None);
/// ```
pub fn fit_within(width: u32, height: u32, bounds: BoundingBox) -> Option<(u32, u32)> {
    if width == 0 || height == 0 {
        return None;
    }

    let scale = f64::min(
        bounds.max_width as f64 / width as f64,
        bounds.max_height as f64 / height as f64,
    );
    if scale >= 1.0 {
        return None;
    }

    let new_width = ((width as f64 * scale).round() as u32).clamp(1, bounds.max_width);
    let new_height = ((height as f64 * scale).round() as u32).clamp(1, bounds.max_height);
    Some((new_width, new_height))
}

/// Downscale `image` to fit inside `bounds`, preserving aspect ratio.
///
/// Images that already fit are returned as-is.
pub fn resize_to_bounding_box(image: DynamicImage, bounds: BoundingBox) -> DynamicImage {
    let (width, height) = image.dimensions();
    match fit_within(width, height, bounds) {
        Some((new_width, new_height)) => {
            tracing::trace!(
                "Resize {}x{} -> {}x{}",
                width,
                height,
                new_width,
                new_height
            );
            image.resize_exact(new_width, new_height, FilterType::Lanczos3)
        }
        None => image,
    }
}

/// Convert `image` to single-channel 8-bit luma (Rec. 709 weights).
pub fn to_grayscale(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(_) => image,
        other => DynamicImage::ImageLuma8(other.to_luma8()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::gradient_image;
    use image::ColorType;

    fn ratio(width: u32, height: u32) -> f64 {
        width as f64 / height as f64
    }

    fn assert_fits_and_keeps_ratio(width: u32, height: u32) {
        let resized = resize_to_bounding_box(gradient_image(width, height), BoundingBox::default());
        let (w, h) = resized.dimensions();
        assert!(w <= 500 && h <= 500, "{w}x{h} exceeds the bounding box");

        let original = ratio(width, height);
        let relative = (original - ratio(w, h)).abs() / original;
        assert!(
            relative <= 0.02,
            "aspect ratio drifted: {width}x{height} -> {w}x{h}"
        );
    }

    #[test]
    fn test_resize_panoramic() {
        assert_fits_and_keeps_ratio(2400, 800);
    }

    #[test]
    fn test_resize_tall() {
        assert_fits_and_keeps_ratio(700, 1900);
    }

    #[test]
    fn test_resize_large_square() {
        let resized = resize_to_bounding_box(gradient_image(1024, 1024), BoundingBox::default());
        assert_eq!(resized.dimensions(), (500, 500));
    }

    #[test]
    fn test_resize_small_is_identity() {
        for (w, h) in [(200, 200), (500, 500), (500, 12), (1, 499)] {
            let resized = resize_to_bounding_box(gradient_image(w, h), BoundingBox::default());
            assert_eq!(resized.dimensions(), (w, h));
        }
    }

    #[test]
    fn test_fit_within_custom_bounds() {
        let bounds = BoundingBox {
            max_width: 100,
            max_height: 50,
        };
        assert_eq!(fit_within(400, 100, bounds), Some((100, 25)));
        assert_eq!(fit_within(100, 400, bounds), Some((13, 50)));
        assert_eq!(fit_within(100, 50, bounds), None);
    }

    #[test]
    fn test_fit_within_never_collapses_to_zero() {
        let (w, h) = fit_within(100_000, 10, BoundingBox::default()).unwrap();
        assert_eq!(w, 500);
        assert_eq!(h, 1);
    }

    #[test]
    fn test_grayscale_is_single_channel_same_size() {
        let gray = to_grayscale(gradient_image(97, 41));
        assert_eq!(gray.color(), ColorType::L8);
        assert_eq!(gray.dimensions(), (97, 41));
    }

    #[test]
    fn test_grayscale_drops_alpha() {
        let gray = to_grayscale(DynamicImage::new_rgba8(10, 20));
        assert_eq!(gray.color(), ColorType::L8);
        assert_eq!(gray.dimensions(), (10, 20));
    }

    #[test]
    fn test_grayscale_pure_colours_use_perceptual_weights() {
        let mut img = image::RgbImage::new(3, 1);
        img.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        img.put_pixel(1, 0, image::Rgb([0, 255, 0]));
        img.put_pixel(2, 0, image::Rgb([0, 0, 255]));

        let gray = to_grayscale(DynamicImage::ImageRgb8(img)).to_luma8();
        let (r, g, b) = (gray[(0, 0)][0], gray[(1, 0)][0], gray[(2, 0)][0]);
        assert!(g > r && r > b, "expected green > red > blue, got {r} {g} {b}");
    }
}
