//! PNG format support.
//!
//! Reads every PNG color type: palette and sub-8-bit gray are expanded to
//! 8-bit on decode, 16-bit samples are kept. Writes 8-bit PNG. Grayscale
//! input is expanded to RGB so curvature effects always see color channels.
//!
//! # Example
//!
//! ```rust,ignore
//! use pano_io::png::{read, write};
//!
//! let image = read("pano.png")?;
//! write("curved.png", &image)?;
//! ```

use crate::{ImageData, IoError, IoResult, PixelData, PixelFormat};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Reads a PNG file from the given path.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<ImageData> {
    let file = File::open(path.as_ref())?;
    let mut decoder = png::Decoder::new(BufReader::new(file));
    decoder.set_transformations(png::Transformations::EXPAND);
    let mut reader = decoder
        .read_info()
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("cannot determine output buffer size".into()))?;
    let mut buf = vec![0u8; buf_size];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;

    let bytes = &buf[..info.buffer_size()];

    let (channels, format, data) = match (info.color_type, info.bit_depth) {
        (png::ColorType::Rgb, png::BitDepth::Eight) => {
            (3, PixelFormat::U8, PixelData::U8(bytes.to_vec()))
        }
        (png::ColorType::Rgba, png::BitDepth::Eight) => {
            (4, PixelFormat::U8, PixelData::U8(bytes.to_vec()))
        }
        (png::ColorType::Rgb, png::BitDepth::Sixteen) => {
            (3, PixelFormat::U16, PixelData::U16(bytes_to_u16(bytes)))
        }
        (png::ColorType::Rgba, png::BitDepth::Sixteen) => {
            (4, PixelFormat::U16, PixelData::U16(bytes_to_u16(bytes)))
        }
        (png::ColorType::Grayscale, png::BitDepth::Eight) => {
            let rgb: Vec<u8> = bytes.iter().flat_map(|&g| [g, g, g]).collect();
            (3, PixelFormat::U8, PixelData::U8(rgb))
        }
        (png::ColorType::GrayscaleAlpha, png::BitDepth::Eight) => {
            let rgba: Vec<u8> = bytes
                .chunks(2)
                .flat_map(|ga| [ga[0], ga[0], ga[0], ga[1]])
                .collect();
            (4, PixelFormat::U8, PixelData::U8(rgba))
        }
        (png::ColorType::Grayscale, png::BitDepth::Sixteen) => {
            let rgb: Vec<u16> = bytes_to_u16(bytes).into_iter().flat_map(|g| [g, g, g]).collect();
            (3, PixelFormat::U16, PixelData::U16(rgb))
        }
        (png::ColorType::GrayscaleAlpha, png::BitDepth::Sixteen) => {
            let rgba: Vec<u16> = bytes_to_u16(bytes)
                .chunks(2)
                .flat_map(|ga| [ga[0], ga[0], ga[0], ga[1]])
                .collect();
            (4, PixelFormat::U16, PixelData::U16(rgba))
        }
        (color_type, bit_depth) => {
            return Err(IoError::UnsupportedBitDepth(format!(
                "{:?} {:?}",
                color_type, bit_depth
            )));
        }
    };

    Ok(ImageData {
        width: info.width,
        height: info.height,
        channels,
        format,
        data,
    })
}

/// Writes an image to an 8-bit PNG file.
pub fn write<P: AsRef<Path>>(path: P, image: &ImageData) -> IoResult<()> {
    let color_type = match image.channels {
        1 => png::ColorType::Grayscale,
        2 => png::ColorType::GrayscaleAlpha,
        3 => png::ColorType::Rgb,
        4 => png::ColorType::Rgba,
        n => return Err(IoError::EncodeError(format!("unsupported channel count: {}", n))),
    };

    let file = File::create(path.as_ref())?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, image.width, image.height);
    encoder.set_color(color_type);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::default());

    let mut png_writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(e.to_string()))?;

    png_writer
        .write_image_data(&image.to_u8())
        .map_err(|e| IoError::EncodeError(e.to_string()))?;

    Ok(())
}

/// Converts big-endian byte slice to u16 vector.
fn bytes_to_u16(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks(2)
        .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
        .collect()
}
