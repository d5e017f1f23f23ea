//! BMP format support.
//!
//! Read/write Windows bitmaps via the `image` crate. Always 8-bit;
//! 16-bit and float input is quantized on write.
//!
//! # Example
//!
//! ```ignore
//! use pano_io::bmp;
//!
//! let img = bmp::read("input.bmp")?;
//! bmp::write("output.bmp", &img)?;
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use image::codecs::bmp::BmpEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};

use crate::{ImageData, IoError, IoResult, PixelData, PixelFormat};

/// Reads a BMP image from file.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<ImageData> {
    let file = File::open(path.as_ref())?;
    let img = ImageReader::with_format(BufReader::new(file), ImageFormat::Bmp)
        .decode()
        .map_err(|e| IoError::DecodeError(e.to_string()))?;

    Ok(dynamic_to_image_data(img))
}

/// Writes an image to BMP.
pub fn write<P: AsRef<Path>>(path: P, image: &ImageData) -> IoResult<()> {
    let dyn_img = image_data_to_dynamic(image)?;

    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    dyn_img
        .write_with_encoder(BmpEncoder::new(&mut writer))
        .map_err(|e| IoError::EncodeError(e.to_string()))?;

    Ok(())
}

/// Converts DynamicImage to ImageData (RGB or RGBA, 8-bit).
fn dynamic_to_image_data(img: DynamicImage) -> ImageData {
    let (width, height) = (img.width(), img.height());

    if img.color().has_alpha() {
        let data = img.into_rgba8().into_raw();
        ImageData {
            width,
            height,
            channels: 4,
            format: PixelFormat::U8,
            data: PixelData::U8(data),
        }
    } else {
        let data = img.into_rgb8().into_raw();
        ImageData {
            width,
            height,
            channels: 3,
            format: PixelFormat::U8,
            data: PixelData::U8(data),
        }
    }
}

/// Converts ImageData to DynamicImage.
fn image_data_to_dynamic(image: &ImageData) -> IoResult<DynamicImage> {
    let (w, h) = (image.width, image.height);
    let data = image.to_u8();
    let size_error = || IoError::EncodeError("buffer does not match image dimensions".into());

    let img = match image.channels {
        1 => DynamicImage::ImageLuma8(image::GrayImage::from_raw(w, h, data).ok_or_else(size_error)?),
        2 => DynamicImage::ImageLumaA8(
            image::GrayAlphaImage::from_raw(w, h, data).ok_or_else(size_error)?,
        ),
        3 => DynamicImage::ImageRgb8(image::RgbImage::from_raw(w, h, data).ok_or_else(size_error)?),
        4 => DynamicImage::ImageRgba8(image::RgbaImage::from_raw(w, h, data).ok_or_else(size_error)?),
        n => return Err(IoError::EncodeError(format!("unsupported channel count: {}", n))),
    };

    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.bmp");
        let data: Vec<u8> = (0..5 * 3 * 3).map(|i| (i * 5) as u8).collect();

        write(&path, &ImageData::from_u8(5, 3, 3, data.clone())).expect("write BMP");
        let loaded = read(&path).expect("read BMP");

        assert_eq!((loaded.width, loaded.height, loaded.channels), (5, 3, 3));
        assert_eq!(loaded.to_u8(), data);
    }

    #[test]
    fn test_float_input_is_quantized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("float.bmp");

        write(&path, &ImageData::from_f32(1, 1, 3, vec![0.0, 0.5, 1.0])).expect("write BMP");
        let loaded = read(&path).expect("read BMP");

        assert_eq!(loaded.to_u8(), vec![0, 128, 255]);
    }
}
