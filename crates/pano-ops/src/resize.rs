//! Image resize and resampling.
//!
//! Used to shrink panoramas and frames before or after curving. Scaling is
//! separable (horizontal pass, then vertical); filter weights for each
//! output column/row are computed once and reused for every line.
//!
//! # Filters
//!
//! - [`Filter::Nearest`] - Fastest, no interpolation (blocky)
//! - [`Filter::Bilinear`] - Linear interpolation (smooth but blurry)
//! - [`Filter::Bicubic`] - Mitchell-Netravali cubic (sharper than bilinear)
//! - [`Filter::Lanczos3`] - Sinc-based, best for downscaling
//!
//! # Example
//!
//! ```rust
//! use pano_ops::resize::{resize_f32, Filter};
//!
//! let src = vec![0.5f32; 64 * 32 * 3];
//! let dst = resize_f32(&src, 64, 32, 3, 32, 16, Filter::Lanczos3).unwrap();
//! assert_eq!(dst.len(), 32 * 16 * 3);
//! ```

use std::str::FromStr;

use crate::error::check_buffer;
use crate::warp::fill_rows;
use crate::{OpsError, OpsResult};

/// Resampling filter for resize operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    /// Nearest-neighbor (fastest, no interpolation).
    Nearest,
    /// Bilinear interpolation (smooth, fast).
    Bilinear,
    /// Bicubic interpolation (sharper than bilinear).
    Bicubic,
    /// Lanczos-3 (high quality, best for downscaling).
    #[default]
    Lanczos3,
}

impl Filter {
    /// Returns the support radius for this filter.
    #[inline]
    pub fn support(&self) -> f32 {
        match self {
            Filter::Nearest => 0.5,
            Filter::Bilinear => 1.0,
            Filter::Bicubic => 2.0,
            Filter::Lanczos3 => 3.0,
        }
    }

    /// Evaluates the filter kernel at position x.
    #[inline]
    pub fn weight(&self, x: f32) -> f32 {
        let ax = x.abs();
        match self {
            Filter::Nearest => {
                if ax < 0.5 { 1.0 } else { 0.0 }
            }
            Filter::Bilinear => (1.0 - ax).max(0.0),
            Filter::Bicubic => mitchell(ax),
            Filter::Lanczos3 => lanczos(ax, 3.0),
        }
    }
}

impl FromStr for Filter {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nearest" | "box" => Ok(Filter::Nearest),
            "bilinear" | "linear" => Ok(Filter::Bilinear),
            "bicubic" | "cubic" | "mitchell" => Ok(Filter::Bicubic),
            "lanczos" | "lanczos3" => Ok(Filter::Lanczos3),
            other => Err(OpsError::InvalidParameter(format!(
                "unknown filter '{}'. Valid: nearest, bilinear, bicubic, lanczos",
                other
            ))),
        }
    }
}

/// Mitchell-Netravali, B = C = 1/3.
fn mitchell(ax: f32) -> f32 {
    const B: f32 = 1.0 / 3.0;
    const C: f32 = 1.0 / 3.0;

    if ax < 1.0 {
        ((12.0 - 9.0 * B - 6.0 * C) * ax * ax * ax
            + (-18.0 + 12.0 * B + 6.0 * C) * ax * ax
            + (6.0 - 2.0 * B))
            / 6.0
    } else if ax < 2.0 {
        ((-B - 6.0 * C) * ax * ax * ax
            + (6.0 * B + 30.0 * C) * ax * ax
            + (-12.0 * B - 48.0 * C) * ax
            + (8.0 * B + 24.0 * C))
            / 6.0
    } else {
        0.0
    }
}

fn lanczos(ax: f32, a: f32) -> f32 {
    if ax < 1e-8 {
        1.0
    } else if ax < a {
        let pi_x = std::f32::consts::PI * ax;
        let pi_x_a = pi_x / a;
        (pi_x.sin() / pi_x) * (pi_x_a.sin() / pi_x_a)
    } else {
        0.0
    }
}

/// Source taps and normalized weights for one output coordinate.
struct Contribution {
    first: usize,
    weights: Vec<f32>,
}

/// Computes the contributions for resampling `src_len` samples to `dst_len`.
fn contributions(src_len: usize, dst_len: usize, filter: Filter) -> Vec<Contribution> {
    let scale = src_len as f32 / dst_len as f32;
    // Widen the kernel when shrinking so every source sample is covered.
    let stretch = scale.max(1.0);
    let support = filter.support() * stretch;

    (0..dst_len)
        .map(|i| {
            let center = (i as f32 + 0.5) * scale - 0.5;
            let first = ((center - support).floor().max(0.0)) as usize;
            let last = ((center + support).ceil().max(0.0) as usize).min(src_len - 1);

            let mut weights: Vec<f32> = (first..=last)
                .map(|s| filter.weight((s as f32 - center) / stretch))
                .collect();

            let total: f32 = weights.iter().sum();
            if total > 0.0 {
                weights.iter_mut().for_each(|w| *w /= total);
            } else {
                // Nearest can miss every tap on exact half-pixel centers.
                let nearest = (center.round().max(0.0) as usize).clamp(first, last);
                weights.iter_mut().for_each(|w| *w = 0.0);
                weights[nearest - first] = 1.0;
            }

            Contribution { first, weights }
        })
        .collect()
}

/// Resizes f32 image data.
///
/// # Errors
///
/// [`OpsError::InvalidDimensions`] if either size is zero,
/// [`OpsError::SizeMismatch`] if `src` does not match its dimensions.
pub fn resize_f32(
    src: &[f32],
    src_w: usize,
    src_h: usize,
    channels: usize,
    dst_w: usize,
    dst_h: usize,
    filter: Filter,
) -> OpsResult<Vec<f32>> {
    check_buffer(src, src_w, src_h, channels)?;
    if dst_w == 0 || dst_h == 0 {
        return Err(OpsError::InvalidDimensions(
            "destination size must be > 0".into(),
        ));
    }

    // Horizontal: src_w x src_h -> dst_w x src_h
    let cols = contributions(src_w, dst_w, filter);
    let mut temp = vec![0.0f32; dst_w * src_h * channels];
    fill_rows(&mut temp, dst_w * channels, |y, row| {
        let src_row = &src[y * src_w * channels..(y + 1) * src_w * channels];
        for (px, contrib) in row.chunks_mut(channels).zip(&cols) {
            for (k, &w) in contrib.weights.iter().enumerate() {
                let s = (contrib.first + k) * channels;
                for (o, &v) in px.iter_mut().zip(&src_row[s..s + channels]) {
                    *o += v * w;
                }
            }
        }
    });

    // Vertical: dst_w x src_h -> dst_w x dst_h
    let rows = contributions(src_h, dst_h, filter);
    let line = dst_w * channels;
    let mut dst = vec![0.0f32; dst_w * dst_h * channels];
    fill_rows(&mut dst, line, |y, row| {
        let contrib = &rows[y];
        for (k, &w) in contrib.weights.iter().enumerate() {
            let s = (contrib.first + k) * line;
            for (o, &v) in row.iter_mut().zip(&temp[s..s + line]) {
                *o += v * w;
            }
        }
    });

    Ok(dst)
}
