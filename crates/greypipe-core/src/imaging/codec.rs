//! Image decoding and extension-driven encoding.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, DynamicImage, ImageError, ImageReader};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{PipelineError, PipelineResult};

/// Output encodings the save stage can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeFormat {
    /// Lossy, written at the configured quality
    Jpeg,
    /// Lossless
    Png,
}

impl EncodeFormat {
    /// Pick the encoder from the output path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> PipelineResult<Self> {
        match extension_of(path).as_str() {
            "jpg" | "jpeg" => Ok(EncodeFormat::Jpeg),
            "png" => Ok(EncodeFormat::Png),
            other => Err(PipelineError::UnsupportedFormat {
                path: path.to_path_buf(),
                format: if other.is_empty() {
                    "<none>".to_string()
                } else {
                    other.to_string()
                },
            }),
        }
    }
}

/// Read and decode an image file, detecting the format from its content.
pub fn decode(path: &Path) -> PipelineResult<DynamicImage> {
    let reader = ImageReader::open(path)
        .map_err(|e| PipelineError::io(path, e))?
        .with_guessed_format()
        .map_err(|e| PipelineError::io(path, e))?;

    if reader.format().is_none() {
        return Err(PipelineError::UnsupportedFormat {
            path: path.to_path_buf(),
            format: extension_or_unknown(path),
        });
    }

    reader.decode().map_err(|e| match e {
        ImageError::IoError(source) => PipelineError::io(path, source),
        ImageError::Unsupported(_) => PipelineError::UnsupportedFormat {
            path: path.to_path_buf(),
            format: extension_or_unknown(path),
        },
        other => PipelineError::Decode {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    })
}

/// Encode `image` to `path`, selecting the encoder by extension.
///
/// Unsupported extensions fail before the file is created.
pub fn encode(path: &Path, image: &DynamicImage, jpeg_quality: u8) -> PipelineResult<()> {
    let format = EncodeFormat::from_path(path)?;

    let file = File::create(path).map_err(|e| PipelineError::io(path, e))?;
    let mut writer = BufWriter::new(file);

    let written = match format {
        EncodeFormat::Jpeg => jpeg_compatible(image)
            .write_with_encoder(JpegEncoder::new_with_quality(&mut writer, jpeg_quality)),
        EncodeFormat::Png => png_compatible(image).write_with_encoder(PngEncoder::new(&mut writer)),
    };

    written.map_err(|e| match e {
        ImageError::IoError(source) => PipelineError::io(path, source),
        other => PipelineError::Encode {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    })?;

    writer.flush().map_err(|e| PipelineError::io(path, e))
}

/// Create the parent directory of `path` (recursively) if it is missing.
pub fn ensure_parent_dir(path: &Path) -> PipelineResult<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            std::fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))
        }
        _ => Ok(()),
    }
}

// The JPEG encoder only takes 8-bit luma or RGB.
fn jpeg_compatible(image: &DynamicImage) -> Cow<'_, DynamicImage> {
    match image.color() {
        ColorType::L8 | ColorType::Rgb8 => Cow::Borrowed(image),
        color if color.has_color() => Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())),
        _ => Cow::Owned(DynamicImage::ImageLuma8(image.to_luma8())),
    }
}

// PNG has no float sample formats.
fn png_compatible(image: &DynamicImage) -> Cow<'_, DynamicImage> {
    match image.color() {
        ColorType::Rgb32F | ColorType::Rgba32F => {
            Cow::Owned(DynamicImage::ImageRgba8(image.to_rgba8()))
        }
        _ => Cow::Borrowed(image),
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

fn extension_or_unknown(path: &Path) -> String {
    let ext = extension_of(path);
    if ext.is_empty() {
        "unknown".to_string()
    } else {
        ext
    }
}
