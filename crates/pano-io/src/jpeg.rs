//! JPEG format support.
//!
//! Stitched panoramas and extracted video frames are almost always JPEG,
//! so this is the format most batch jobs read and write.
//!
//! - Decoding via `jpeg-decoder` (RGB, grayscale and CMYK input, always
//!   returned as 8-bit RGB)
//! - Encoding via `jpeg-encoder` with a configurable quality
//!
//! # Example
//!
//! ```rust,ignore
//! use pano_io::jpeg::{self, JpegWriterOptions};
//!
//! let image = jpeg::read("frame_00000.jpg")?;
//! jpeg::write_with_options("curved.jpg", &image, &JpegWriterOptions { quality: 95 })?;
//! ```

use crate::{ImageData, IoError, IoResult, PixelData, PixelFormat};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Options for writing JPEG files.
#[derive(Debug, Clone)]
pub struct JpegWriterOptions {
    /// Quality level 1-100. Higher = better quality, larger files.
    pub quality: u8,
}

impl Default for JpegWriterOptions {
    fn default() -> Self {
        Self { quality: 95 }
    }
}

/// Reads a JPEG file.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<ImageData> {
    let file = File::open(path.as_ref())?;
    let mut decoder = jpeg_decoder::Decoder::new(BufReader::new(file));
    let pixels = decoder
        .decode()
        .map_err(|e| IoError::DecodeError(e.to_string()))?;

    let info = decoder
        .info()
        .ok_or_else(|| IoError::DecodeError("missing JPEG info".into()))?;

    let data = match info.pixel_format {
        jpeg_decoder::PixelFormat::RGB24 => pixels,
        jpeg_decoder::PixelFormat::L8 => pixels.iter().flat_map(|&g| [g, g, g]).collect(),
        jpeg_decoder::PixelFormat::L16 => {
            // High byte only
            pixels
                .chunks(2)
                .flat_map(|l16| [l16[0], l16[0], l16[0]])
                .collect()
        }
        jpeg_decoder::PixelFormat::CMYK32 => pixels
            .chunks(4)
            .flat_map(|cmyk| {
                let c = cmyk[0] as f32 / 255.0;
                let m = cmyk[1] as f32 / 255.0;
                let y = cmyk[2] as f32 / 255.0;
                let k = cmyk[3] as f32 / 255.0;

                [
                    ((1.0 - c) * (1.0 - k) * 255.0) as u8,
                    ((1.0 - m) * (1.0 - k) * 255.0) as u8,
                    ((1.0 - y) * (1.0 - k) * 255.0) as u8,
                ]
            })
            .collect(),
    };

    Ok(ImageData {
        width: info.width as u32,
        height: info.height as u32,
        channels: 3,
        format: PixelFormat::U8,
        data: PixelData::U8(data),
    })
}

/// Writes a JPEG file with custom options.
///
/// Alpha is dropped and grayscale is expanded to RGB.
pub fn write_with_options<P: AsRef<Path>>(
    path: P,
    image: &ImageData,
    options: &JpegWriterOptions,
) -> IoResult<()> {
    let data = encode(image, options)?;
    std::fs::write(path.as_ref(), data)?;
    Ok(())
}

/// Encodes an image to JPEG bytes in memory.
pub fn encode(image: &ImageData, options: &JpegWriterOptions) -> IoResult<Vec<u8>> {
    use jpeg_encoder::{ColorType, Encoder};

    if image.width > u16::MAX as u32 || image.height > u16::MAX as u32 {
        return Err(IoError::EncodeError(format!(
            "{}x{} exceeds the JPEG size limit",
            image.width, image.height
        )));
    }

    let u8_data = image.to_u8();
    let rgb: Vec<u8> = match image.channels {
        1 => u8_data.iter().flat_map(|&g| [g, g, g]).collect(),
        2 => u8_data.chunks(2).flat_map(|ga| [ga[0], ga[0], ga[0]]).collect(),
        3 => u8_data,
        4 => u8_data
            .chunks(4)
            .flat_map(|rgba| [rgba[0], rgba[1], rgba[2]])
            .collect(),
        n => return Err(IoError::EncodeError(format!("unsupported channel count: {}", n))),
    };

    let mut buffer = Vec::new();
    let encoder = Encoder::new(&mut buffer, options.quality.clamp(1, 100));
    encoder
        .encode(&rgb, image.width as u16, image.height as u16, ColorType::Rgb)
        .map_err(|e: jpeg_encoder::EncodingError| IoError::EncodeError(e.to_string()))?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_dimensions() {
        let width = 32;
        let height = 24;
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                data.push((x * 8) as u8);
                data.push((y * 8) as u8);
                data.push(128);
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roundtrip.jpg");

        write_with_options(&path, &ImageData::from_u8(width, height, 3, data), &JpegWriterOptions::default())
            .expect("write JPEG");
        let loaded = read(&path).expect("read JPEG");

        assert_eq!(loaded.width, width);
        assert_eq!(loaded.height, height);
        assert_eq!(loaded.channels, 3);
    }

    #[test]
    fn test_flat_color_survives() {
        let image = ImageData::from_u8(16, 16, 3, vec![128; 16 * 16 * 3]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flat.jpg");

        write_with_options(&path, &image, &JpegWriterOptions { quality: 90 }).expect("write JPEG");
        let loaded = read(&path).expect("read JPEG");

        for v in loaded.to_u8() {
            assert!((v as i32 - 128).abs() <= 2, "got {}", v);
        }
    }

    #[test]
    fn test_quality_changes_size() {
        let mut data = Vec::with_capacity(64 * 64 * 3);
        for i in 0..64 * 64 {
            data.extend_from_slice(&[(i * 7 % 256) as u8, (i * 13 % 256) as u8, (i % 256) as u8]);
        }
        let image = ImageData::from_u8(64, 64, 3, data);

        let low = encode(&image, &JpegWriterOptions { quality: 20 }).unwrap();
        let high = encode(&image, &JpegWriterOptions { quality: 100 }).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn test_alpha_is_dropped() {
        let image = ImageData::from_u8(8, 8, 4, vec![200; 8 * 8 * 4]);
        let bytes = encode(&image, &JpegWriterOptions::default()).unwrap();
        assert_eq!(&bytes[0..3], &[0xFF, 0xD8, 0xFF]);
    }
}
