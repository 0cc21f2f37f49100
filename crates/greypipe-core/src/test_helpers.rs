//! Shared test utilities: synthetic images and on-disk fixtures.

use image::{DynamicImage, Rgb, RgbImage};
use std::path::{Path, PathBuf};

/// An RGB gradient, so resizes and greyscale conversions have real content.
pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x + y) % 256) as u8,
        ])
    });
    DynamicImage::ImageRgb8(img)
}

/// Write a gradient image to `root/relative`, creating parent directories.
///
/// The format follows the extension of `relative`.
pub fn write_fixture(root: &Path, relative: &str, width: u32, height: u32) -> PathBuf {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    gradient_image(width, height).save(&path).unwrap();
    path
}

/// Write a file that claims to be an image but is not decodable.
pub fn write_corrupt_fixture(root: &Path, relative: &str) -> PathBuf {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, b"\xFF\xD8\xFF\xE0 truncated jpeg").unwrap();
    path
}
