//! Geometric transformation operations.
//!
//! - [`pad_constant`] - Add a black border
//! - [`crop`] - Extract region of interest
//!
//! # Example
//!
//! ```rust
//! use pano_ops::transform::{crop, pad_constant};
//!
//! let src = vec![0.5f32; 64 * 32 * 3];
//!
//! // 10% border on every side
//! let padded = pad_constant(&src, 64, 32, 3, 6, 3);
//! assert_eq!(padded.len(), 76 * 38 * 3);
//!
//! // Crop center region
//! let cropped = crop(&src, 64, 32, 3, 16, 8, 32, 16).unwrap();
//! assert_eq!(cropped.len(), 32 * 16 * 3);
//! ```

use crate::{OpsError, OpsResult};

/// Adds a black border of `pad_x` columns left and right and `pad_y`
/// rows top and bottom.
///
/// The result is `(width + 2 * pad_x) x (height + 2 * pad_y)`.
pub fn pad_constant(
    src: &[f32],
    width: usize,
    height: usize,
    channels: usize,
    pad_x: usize,
    pad_y: usize,
) -> Vec<f32> {
    let new_w = width + 2 * pad_x;
    let new_h = height + 2 * pad_y;
    let mut dst = vec![0.0f32; new_w * new_h * channels];

    let row_len = width * channels;
    for (y, src_row) in src.chunks_exact(row_len.max(1)).take(height).enumerate() {
        let start = ((y + pad_y) * new_w + pad_x) * channels;
        dst[start..start + row_len].copy_from_slice(src_row);
    }

    dst
}

/// Crops a region from the image.
///
/// # Arguments
///
/// * `src` - Source pixel data
/// * `src_w`, `src_h` - Source dimensions
/// * `channels` - Number of channels
/// * `x`, `y` - Crop origin (top-left)
/// * `w`, `h` - Crop dimensions
///
/// # Errors
///
/// [`OpsError::InvalidDimensions`] if the region is empty or extends past
/// the image.
#[allow(clippy::too_many_arguments)]
pub fn crop(
    src: &[f32],
    src_w: usize,
    src_h: usize,
    channels: usize,
    x: usize,
    y: usize,
    w: usize,
    h: usize,
) -> OpsResult<Vec<f32>> {
    if w == 0 || h == 0 {
        return Err(OpsError::InvalidDimensions("crop region is empty".into()));
    }
    if x.saturating_add(w) > src_w || y.saturating_add(h) > src_h {
        return Err(OpsError::InvalidDimensions(format!(
            "crop region {}x{} at ({},{}) exceeds {}x{}",
            w, h, x, y, src_w, src_h
        )));
    }

    let mut dst = Vec::with_capacity(w * h * channels);
    for row in y..(y + h) {
        let start = (row * src_w + x) * channels;
        dst.extend_from_slice(&src[start..start + w * channels]);
    }

    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_places_source_in_center() {
        // 2x1 RGB: red, green
        let src = vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let dst = pad_constant(&src, 2, 1, 3, 1, 1);
        assert_eq!(dst.len(), 4 * 3 * 3);

        let px = |x: usize, y: usize| &dst[(y * 4 + x) * 3..(y * 4 + x) * 3 + 3];
        assert_eq!(px(1, 1), &[1.0, 0.0, 0.0]);
        assert_eq!(px(2, 1), &[0.0, 1.0, 0.0]);
        assert_eq!(px(0, 1), &[0.0, 0.0, 0.0]);
        assert_eq!(px(1, 0), &[0.0, 0.0, 0.0]);
        assert_eq!(px(3, 2), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_pad_zero_is_copy() {
        let src: Vec<f32> = (0..24).map(|v| v as f32).collect();
        assert_eq!(pad_constant(&src, 4, 2, 3, 0, 0), src);
    }

    #[test]
    fn test_crop_extracts_region() {
        let src: Vec<f32> = (0..16).map(|v| v as f32).collect(); // 4x4, 1 channel
        let dst = crop(&src, 4, 4, 1, 1, 2, 2, 2).unwrap();
        assert_eq!(dst, vec![9.0, 10.0, 13.0, 14.0]);
    }

    #[test]
    fn test_crop_out_of_bounds() {
        let src = vec![0.0f32; 4 * 4];
        assert!(crop(&src, 4, 4, 1, 3, 0, 2, 2).is_err());
        assert!(crop(&src, 4, 4, 1, 0, 0, 0, 2).is_err());
        assert!(crop(&src, 4, 4, 1, usize::MAX, 0, 2, 2).is_err());
    }
}
