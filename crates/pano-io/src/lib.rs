//! # pano-io
//!
//! Image I/O for panorama tooling.
//!
//! Reads and writes the still-image formats that stitched panoramas and
//! extracted frames usually come in:
//!
//! - **PNG** - Lossless, 8/16-bit, optional alpha
//! - **JPEG** - Lossy, 8-bit, quality setting
//! - **BMP** - Uncompressed 8-bit (via the `image` crate)
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use pano_io::{read, write};
//!
//! // Read any supported format (auto-detected)
//! let image = read("panorama.jpg")?;
//!
//! // Write to a different format
//! write("panorama.png", &image)?;
//! ```
//!
//! Folder enumeration for batch jobs lives in [`folder`].
//!
//! # Feature Flags
//!
//! - `png` - PNG support (default)
//! - `jpeg` - JPEG support (default)
//! - `bmp` - BMP support (default)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod detect;
mod error;
pub mod folder;

#[cfg(feature = "png")]
pub mod png;

#[cfg(feature = "jpeg")]
pub mod jpeg;

#[cfg(feature = "bmp")]
pub mod bmp;

pub use detect::Format;
pub use error::{IoError, IoResult};

use std::path::Path;
use tracing::{debug, warn};

/// Reads an image from a file, auto-detecting the format.
///
/// The format is detected by magic bytes, falling back to the extension.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be opened
/// - The format is not supported
/// - The file is corrupted
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<ImageData> {
    let path = path.as_ref();
    let format = Format::detect(path)?;
    debug!(path = %path.display(), ?format, "read");

    match format {
        #[cfg(feature = "png")]
        Format::Png => png::read(path),

        #[cfg(feature = "jpeg")]
        Format::Jpeg => jpeg::read(path),

        #[cfg(feature = "bmp")]
        Format::Bmp => bmp::read(path),

        _ => Err(unsupported(path)),
    }
}

/// Encoder settings for [`write_with_options`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// JPEG quality 1-100; ignored by lossless formats.
    pub jpeg_quality: u8,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self { jpeg_quality: 95 }
    }
}

/// Writes an image to a file, choosing the format from the extension.
///
/// Same as [`write_with_options`] with [`WriteOptions::default`].
pub fn write<P: AsRef<Path>>(path: P, image: &ImageData) -> IoResult<()> {
    write_with_options(path, image, &WriteOptions::default())
}

/// Writes an image to a file with explicit encoder settings.
///
/// # Errors
///
/// Returns an error if:
/// - The image is empty or its buffer does not hold `width * height * channels` samples
/// - The file cannot be created
/// - The extension does not name a supported format
/// - The channel count cannot be encoded by the format
pub fn write_with_options<P: AsRef<Path>>(path: P, image: &ImageData, options: &WriteOptions) -> IoResult<()> {
    let path = path.as_ref();
    let format = Format::from_extension(path);
    debug!(path = %path.display(), ?format, width = image.width, height = image.height, "write");

    if image.is_empty() {
        return Err(IoError::EncodeError(format!(
            "image is empty ({}x{}x{})",
            image.width, image.height, image.channels
        )));
    }
    if image.data.len() != image.sample_count() {
        return Err(IoError::EncodeError(format!(
            "buffer holds {} samples, {}x{}x{} needs {}",
            image.data.len(),
            image.width,
            image.height,
            image.channels,
            image.sample_count()
        )));
    }
    if matches!(image.channels, 2 | 4) && format != Format::Unknown && !format.supports_alpha() {
        warn!(path = %path.display(), ?format, "format has no alpha channel; alpha is dropped");
    }

    match format {
        #[cfg(feature = "png")]
        Format::Png => png::write(path, image),

        #[cfg(feature = "jpeg")]
        Format::Jpeg => jpeg::write_with_options(
            path,
            image,
            &jpeg::JpegWriterOptions {
                quality: options.jpeg_quality,
            },
        ),

        #[cfg(feature = "bmp")]
        Format::Bmp => bmp::write(path, image),

        _ => Err(unsupported(path)),
    }
}

/// Reads `input` and writes it back out in the format implied by `output`.
///
/// ```rust,ignore
/// pano_io::convert("frame_00012.bmp", "frame_00012.jpg", &WriteOptions { jpeg_quality: 90 })?;
/// ```
pub fn convert<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q, options: &WriteOptions) -> IoResult<()> {
    let image = read(input)?;
    write_with_options(output, &image, options)
}

fn unsupported(path: &Path) -> IoError {
    IoError::UnsupportedFormat(
        path.extension()
            .and_then(|e| e.to_str())
            .unwrap_or("unknown")
            .to_string(),
    )
}

/// Image data container for I/O operations.
///
/// Holds interleaved, row-major pixel data in whatever sample type the
/// file was stored with. Processing code converts to `f32` with
/// [`to_f32`](Self::to_f32) and back with [`from_f32`](Self::from_f32).
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Number of channels (1-4; 3 for RGB).
    pub channels: u32,
    /// Pixel data format.
    pub format: PixelFormat,
    /// Raw pixel data.
    pub data: PixelData,
}

/// Pixel data format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8-bit unsigned integer per channel.
    U8,
    /// 16-bit unsigned integer per channel.
    U16,
    /// 32-bit float per channel.
    F32,
}

/// Raw pixel data storage.
#[derive(Debug, Clone)]
pub enum PixelData {
    /// 8-bit unsigned data.
    U8(Vec<u8>),
    /// 16-bit unsigned data.
    U16(Vec<u16>),
    /// 32-bit float data.
    F32(Vec<f32>),
}

impl PixelData {
    /// Number of samples stored.
    pub fn len(&self) -> usize {
        match self {
            PixelData::U8(v) => v.len(),
            PixelData::U16(v) => v.len(),
            PixelData::F32(v) => v.len(),
        }
    }

    /// Returns true if no samples are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ImageData {
    /// Creates ImageData from f32 pixel data.
    pub fn from_f32(width: u32, height: u32, channels: u32, data: Vec<f32>) -> Self {
        Self {
            width,
            height,
            channels,
            format: PixelFormat::F32,
            data: PixelData::F32(data),
        }
    }

    /// Creates ImageData from u8 pixel data.
    pub fn from_u8(width: u32, height: u32, channels: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            channels,
            format: PixelFormat::U8,
            data: PixelData::U8(data),
        }
    }

    /// Returns true if the image has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.channels == 0
    }

    /// Returns the total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns the total number of samples (pixels * channels).
    pub fn sample_count(&self) -> usize {
        self.pixel_count() * self.channels as usize
    }

    /// Converts pixel data to f32 in [0, 1] (for processing).
    pub fn to_f32(&self) -> Vec<f32> {
        match &self.data {
            PixelData::U8(data) => data.iter().map(|&v| v as f32 / 255.0).collect(),
            PixelData::U16(data) => data.iter().map(|&v| v as f32 / 65535.0).collect(),
            PixelData::F32(data) => data.clone(),
        }
    }

    /// Converts pixel data to u8 (for saving).
    ///
    /// Float samples are clamped to [0, 1] and rounded to the nearest level,
    /// so an 8-bit image survives a trip through `to_f32` unchanged.
    pub fn to_u8(&self) -> Vec<u8> {
        match &self.data {
            PixelData::U8(data) => data.clone(),
            PixelData::U16(data) => data.iter().map(|&v| (v >> 8) as u8).collect(),
            PixelData::F32(data) => data
                .iter()
                .map(|&v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u8_f32_roundtrip_is_lossless() {
        let data: Vec<u8> = (0..=255).collect();
        let image = ImageData::from_u8(16, 16, 1, data.clone());
        let back = ImageData::from_f32(16, 16, 1, image.to_f32());
        assert_eq!(back.to_u8(), data);
    }

    #[test]
    fn test_to_u8_clamps_out_of_range() {
        let image = ImageData::from_f32(3, 1, 1, vec![-0.5, 0.5, 1.5]);
        assert_eq!(image.to_u8(), vec![0, 128, 255]);
    }

    #[test]
    fn test_sample_count_and_is_empty() {
        let image = ImageData::from_u8(4, 2, 3, vec![0; 24]);
        assert_eq!(image.pixel_count(), 8);
        assert_eq!(image.sample_count(), 24);
        assert_eq!(image.data.len(), 24);
        assert!(!image.is_empty());
        assert!(ImageData::from_f32(0, 2, 3, Vec::new()).is_empty());
    }

    #[test]
    fn test_write_rejects_empty_and_short_buffers() {
        let dir = tempfile::tempdir().unwrap();

        let empty = ImageData::from_u8(0, 4, 3, Vec::new());
        let err = write(dir.path().join("empty.png"), &empty).unwrap_err();
        assert!(matches!(err, IoError::EncodeError(_)));

        let short = ImageData::from_u8(4, 4, 3, vec![0; 10]);
        let err = write(dir.path().join("short.png"), &short).unwrap_err();
        assert!(matches!(err, IoError::EncodeError(ref m) if m.contains("10")));
        assert!(!dir.path().join("short.png").exists());
    }

    #[test]
    fn test_convert_uses_jpeg_quality() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("noise.png");
        let data: Vec<u8> = (0..64 * 64 * 3).map(|i| (i * 37 % 251) as u8).collect();
        write(&src, &ImageData::from_u8(64, 64, 3, data)).unwrap();

        let low = dir.path().join("low.jpg");
        let high = dir.path().join("high.jpg");
        convert(&src, &low, &WriteOptions { jpeg_quality: 10 }).unwrap();
        convert(&src, &high, &WriteOptions { jpeg_quality: 100 }).unwrap();

        let size = |p: &Path| std::fs::metadata(p).unwrap().len();
        assert!(size(&low) < size(&high));
        assert_eq!(read(&low).unwrap().width, 64);
    }

    #[test]
    fn test_write_unknown_extension_fails() {
        let image = ImageData::from_u8(1, 1, 3, vec![0, 0, 0]);
        let err = write(std::env::temp_dir().join("pano_io_test.xyz"), &image).unwrap_err();
        assert!(matches!(err, IoError::UnsupportedFormat(ref e) if e == "xyz"));
    }
}
