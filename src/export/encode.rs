use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat};

use crate::error::EncodeError;
use crate::raster::Canvas;
use crate::store::{extension_of, SourceFormat};

const ENCODABLE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tif", "tiff", "webp"];

pub fn is_encodable_extension(ext: &str) -> bool {
    ENCODABLE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeSettings {
    /// JPEG quality, 1..=100
    pub quality: u8,
    /// Multiplier applied to `quality` when the source was HEIF
    pub heif_quality_scale: f32,
}

impl EncodeSettings {
    pub fn new(quality: u8, heif_quality_scale: f32) -> Self {
        Self {
            quality,
            heif_quality_scale,
        }
    }

    /// Quality actually handed to the JPEG encoder
    pub fn effective_quality(&self, source: SourceFormat) -> u8 {
        let quality = if source.is_heif() {
            (self.quality as f32 * self.heif_quality_scale).round()
        } else {
            self.quality as f32
        };
        quality.clamp(1.0, 100.0) as u8
    }
}

/// Outcome of writing one image to disk
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReport {
    pub target: PathBuf,
    pub bytes_written: u64,
    /// Size of the source file, when it still exists
    pub original_size: Option<u64>,
}

impl SaveReport {
    /// How much smaller the output is than the source, in percent. Negative when it grew.
    pub fn reduction_percent(&self) -> Option<f64> {
        let original = self.original_size.filter(|&size| size > 0)?;
        Some((1.0 - self.bytes_written as f64 / original as f64) * 100.0)
    }
}

/// Replace a missing or non-encodable extension: `jpg` for HEIF sources, `png` otherwise.
pub fn coerce_extension(path: &Path, source: SourceFormat) -> PathBuf {
    match extension_of(path) {
        Some(ext) if is_encodable_extension(&ext) => path.to_owned(),
        _ => {
            let default = if source.is_heif() { "jpg" } else { "png" };
            path.with_extension(default)
        }
    }
}

/// Encode `canvas` in the format named by `target`'s extension.
pub fn encode(
    canvas: &Canvas,
    target: &Path,
    settings: &EncodeSettings,
    source: SourceFormat,
) -> Result<Vec<u8>, EncodeError> {
    let ext = extension_of(target).ok_or_else(|| EncodeError::MissingExtension(target.to_owned()))?;
    let mut bytes = Vec::new();
    let (width, height) = canvas.dimensions();

    match ext.as_str() {
        "jpg" | "jpeg" => {
            let quality = settings.effective_quality(source);
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgba8(canvas.clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut bytes, quality).write_image(
                rgb.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )?;
        }
        "png" => {
            PngEncoder::new_with_quality(&mut bytes, CompressionType::Best, FilterType::Adaptive)
                .write_image(canvas.as_raw(), width, height, ExtendedColorType::Rgba8)?;
        }
        "gif" | "bmp" | "tif" | "tiff" | "webp" => {
            let format = ImageFormat::from_extension(&ext)
                .ok_or_else(|| EncodeError::UnsupportedExtension(ext.clone()))?;
            canvas.write_to(&mut Cursor::new(&mut bytes), format)?;
        }
        _ => return Err(EncodeError::UnsupportedExtension(ext)),
    }

    log::debug!("Encoded {}x{} as .{} ({} bytes)", width, height, ext, bytes.len());
    Ok(bytes)
}

/// Encode and write to `target`. Nothing is written if encoding fails.
pub fn save(
    canvas: &Canvas,
    target: &Path,
    settings: &EncodeSettings,
    source: SourceFormat,
    source_path: &Path,
) -> Result<SaveReport, EncodeError> {
    let bytes = encode(canvas, target, settings, source)?;
    fs::write(target, &bytes)?;

    let original_size = match fs::metadata(source_path) {
        Ok(meta) => Some(meta.len()),
        Err(_) => {
            log::info!(
                "Source {} no longer exists; reporting output size only",
                source_path.display()
            );
            None
        }
    };
    log::info!("Saved {} ({} bytes)", target.display(), bytes.len());
    Ok(SaveReport {
        target: target.to_owned(),
        bytes_written: bytes.len() as u64,
        original_size,
    })
}
