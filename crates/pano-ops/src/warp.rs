//! Warp operations and the shared resampler.
//!
//! Every warp here is an inverse mapping: for each destination pixel a
//! coordinate function yields the source position, which is sampled
//! bilinearly. Samples that fall outside the source read as black, the
//! same as a constant-border remap.
//!
//! When the `parallel` feature is enabled, rows are processed with rayon.
//! Each row is computed independently, so the output is identical with
//! and without the feature.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::check_buffer;
use crate::{OpsError, OpsResult};

/// Bilinearly samples `src` at `(x, y)` into `out`.
///
/// Taps outside the image contribute black, so a coordinate half a pixel
/// past the border fades to half intensity and anything further is black.
/// Non-finite coordinates produce black.
pub fn sample_bilinear(src: &[f32], w: usize, h: usize, ch: usize, x: f32, y: f32, out: &mut [f32]) {
    out.fill(0.0);

    if !x.is_finite() || !y.is_finite() {
        return;
    }

    let xf = x.floor();
    let yf = y.floor();
    if xf < -1.0 || yf < -1.0 || xf >= w as f32 || yf >= h as f32 {
        return;
    }

    let fx = x - xf;
    let fy = y - yf;
    let x0 = xf as isize;
    let y0 = yf as isize;

    let taps = [
        (x0, y0, (1.0 - fx) * (1.0 - fy)),
        (x0 + 1, y0, fx * (1.0 - fy)),
        (x0, y0 + 1, (1.0 - fx) * fy),
        (x0 + 1, y0 + 1, fx * fy),
    ];

    for (tx, ty, weight) in taps {
        if weight == 0.0 || tx < 0 || ty < 0 || tx as usize >= w || ty as usize >= h {
            continue;
        }
        let idx = (ty as usize * w + tx as usize) * ch;
        for (o, &s) in out.iter_mut().zip(&src[idx..idx + ch]) {
            *o += s * weight;
        }
    }
}

/// Fills `dst` row by row; `row_fn(y, row)` writes one output row.
#[cfg(feature = "parallel")]
pub(crate) fn fill_rows<F>(dst: &mut [f32], row_len: usize, row_fn: F)
where
    F: Fn(usize, &mut [f32]) + Sync + Send,
{
    dst.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| row_fn(y, row));
}

/// Fills `dst` row by row (single-threaded fallback).
#[cfg(not(feature = "parallel"))]
pub(crate) fn fill_rows<F>(dst: &mut [f32], row_len: usize, row_fn: F)
where
    F: Fn(usize, &mut [f32]) + Sync + Send,
{
    dst.chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| row_fn(y, row));
}

/// Applies a same-size warp given a coordinate function.
///
/// `coord_fn(x, y)` returns the source position for destination `(x, y)`.
pub fn apply_warp<F>(src: &[f32], w: usize, h: usize, ch: usize, coord_fn: F) -> OpsResult<Vec<f32>>
where
    F: Fn(usize, usize) -> (f32, f32) + Sync + Send,
{
    check_buffer(src, w, h, ch)?;

    let mut dst = vec![0.0f32; w * h * ch];
    fill_rows(&mut dst, w * ch, |y, row| {
        for (x, px) in row.chunks_mut(ch).enumerate() {
            let (sx, sy) = coord_fn(x, y);
            sample_bilinear(src, w, h, ch, sx, sy, px);
        }
    });

    Ok(dst)
}

// === Barrel distortion ===

/// Source coordinate for destination `(x, y)` under barrel distortion.
///
/// Coordinates are normalized to [-1, 1] as `(2x - w) / w`, pushed
/// outward radially by `r_d = r * (1 + strength * r²)` and mapped back to
/// pixels with `(n + 1) * size / 2`. At `strength == 0` the result is
/// exactly `(x, y)`.
pub fn barrel_source(x: usize, y: usize, w: usize, h: usize, strength: f64) -> (f64, f64) {
    let (wf, hf) = (w as f64, h as f64);
    let nx = (2.0 * x as f64 - wf) / wf;
    let ny = (2.0 * y as f64 - hf) / hf;

    // Scaling along the ray is the polar round trip
    // (r, atan2(ny, nx)) -> (r_d cos, r_d sin) without the trig.
    let r2 = nx * nx + ny * ny;
    let factor = 1.0 + strength * r2;

    let dx = nx * factor;
    let dy = ny * factor;

    ((dx + 1.0) * wf / 2.0, (dy + 1.0) * hf / 2.0)
}

/// Applies barrel distortion (inward-bulging "wrap" look).
///
/// Positive `strength` pulls samples from further out, so the edges of
/// the image bend away and the corners fill with black. Typical values
/// are 0.2-0.5.
///
/// # Errors
///
/// [`OpsError::InvalidDimensions`] or [`OpsError::SizeMismatch`] for a bad buffer and
/// [`OpsError::InvalidParameter`] for a non-finite `strength`.
pub fn barrel_distortion(src: &[f32], w: usize, h: usize, ch: usize, strength: f64) -> OpsResult<Vec<f32>> {
    if !strength.is_finite() {
        return Err(OpsError::InvalidParameter(format!(
            "barrel strength must be finite, got {}",
            strength
        )));
    }

    apply_warp(src, w, h, ch, |x, y| {
        let (sx, sy) = barrel_source(x, y, w, h, strength);
        (sx as f32, sy as f32)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: usize, h: usize, ch: usize) -> Vec<f32> {
        let mut data = Vec::with_capacity(w * h * ch);
        for y in 0..h {
            for x in 0..w {
                for c in 0..ch {
                    data.push(((x * 7 + y * 13 + c * 29) % 97) as f32 / 96.0);
                }
            }
        }
        data
    }

    #[test]
    fn test_sample_at_integer_is_exact() {
        let src = gradient(8, 6, 3);
        let mut px = [0.0f32; 3];
        sample_bilinear(&src, 8, 6, 3, 5.0, 2.0, &mut px);
        let idx = (2 * 8 + 5) * 3;
        assert_eq!(&px[..], &src[idx..idx + 3]);
    }

    #[test]
    fn test_sample_interpolates() {
        let src = vec![0.0, 1.0, 0.0, 1.0];
        let mut px = [0.0f32; 1];
        sample_bilinear(&src, 2, 2, 1, 0.25, 0.5, &mut px);
        assert!((px[0] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_sample_outside_is_black() {
        let src = vec![1.0f32; 4 * 4 * 3];
        let mut px = [9.0f32; 3];

        sample_bilinear(&src, 4, 4, 3, -1.5, 1.0, &mut px);
        assert_eq!(px, [0.0; 3]);

        sample_bilinear(&src, 4, 4, 3, 1.0, 4.0, &mut px);
        assert_eq!(px, [0.0; 3]);

        sample_bilinear(&src, 4, 4, 3, f32::NAN, 1.0, &mut px);
        assert_eq!(px, [0.0; 3]);
    }

    #[test]
    fn test_sample_fades_at_border() {
        let src = vec![1.0f32; 4 * 4];
        let mut px = [0.0f32; 1];
        sample_bilinear(&src, 4, 4, 1, 3.5, 1.0, &mut px);
        assert!((px[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_barrel_identity_at_zero_strength() {
        let src = gradient(33, 20, 3);
        let dst = barrel_distortion(&src, 33, 20, 3, 0.0).unwrap();
        for (a, b) in src.iter().zip(&dst) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn test_barrel_preserves_center() {
        let src = vec![0.5f32; 64 * 64 * 3];
        let dst = barrel_distortion(&src, 64, 64, 3, 0.3).unwrap();
        let center = (32 * 64 + 32) * 3;
        assert!((dst[center] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_barrel_blackens_corners() {
        let src = vec![1.0f32; 64 * 48 * 3];
        let dst = barrel_distortion(&src, 64, 48, 3, 0.5).unwrap();
        // Corner (0, 0) samples from far outside the source.
        assert_eq!(&dst[0..3], &[0.0, 0.0, 0.0]);
        let last = dst.len() - 3;
        assert_eq!(&dst[last..], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_barrel_source_pushes_outward() {
        let (sx, sy) = barrel_source(0, 24, 64, 48, 0.3);
        assert!(sx < 0.0);
        assert!((sy - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_barrel_matches_serial_reference() {
        let (w, h, ch) = (211, 77, 4);
        let src = gradient(w, h, ch);
        let out = barrel_distortion(&src, w, h, ch, 0.35).unwrap();

        let mut expected = vec![0.0f32; w * h * ch];
        for y in 0..h {
            for x in 0..w {
                let (sx, sy) = barrel_source(x, y, w, h, 0.35);
                let px = &mut expected[(y * w + x) * ch..][..ch];
                sample_bilinear(&src, w, h, ch, sx as f32, sy as f32, px);
            }
        }

        assert_eq!(out, expected);
    }

    #[test]
    fn test_fill_rows_passes_row_index() {
        let mut dst = vec![0.0f32; 64 * 5];
        fill_rows(&mut dst, 5, |y, row| {
            for (x, v) in row.iter_mut().enumerate() {
                *v = (y * 10 + x) as f32;
            }
        });
        let expected: Vec<f32> = (0..64)
            .flat_map(|y| (0..5).map(move |x| (y * 10 + x) as f32))
            .collect();
        assert_eq!(dst, expected);
    }

    #[test]
    fn test_barrel_rejects_bad_input() {
        assert!(matches!(
            barrel_distortion(&[], 0, 0, 3, 0.3),
            Err(OpsError::InvalidDimensions(_))
        ));
        assert!(matches!(
            barrel_distortion(&[0.0; 12], 2, 2, 3, f64::NAN),
            Err(OpsError::InvalidParameter(_))
        ));
    }
}
