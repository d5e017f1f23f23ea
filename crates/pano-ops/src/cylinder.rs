//! Cylindrical remaps for stitched panoramas.
//!
//! Two independent projections live here. Their outputs differ pixel for
//! pixel:
//!
//! - [`remap_cylindrical`] - the padded, auto-scaled **inverse** remap.
//!   Every output pixel is either a bilinear sample of the padded source
//!   or exactly black. The canvas size depends on the parameters.
//! - [`project_forward`] - the legacy **forward** projection. Each source
//!   pixel is pushed to its cylinder position in a same-size canvas;
//!   destinations nothing lands on stay black, so the result can have gaps.
//!
//! # Inverse remap geometry
//!
//! ```text
//! pad_x       = floor(w * pad_ratio)          pad_y = floor(h * pad_ratio)
//! W, H        = padded size
//! f           = W * curvature_factor
//! max_theta   = atan((W / 2) / f)
//! safe_scale  = (2 f max_theta / W) * 1.6
//! output      = round(W * safe_scale) x round(H * safe_scale)
//!
//! x_n = (x - out_w / 2) / f        y_n = (y - out_h / 2) / f
//! src_x = f atan(x_n) + W / 2
//! src_y = f y_n / sqrt(x_n² + 1) + H / 2
//! ```
//!
//! Smaller `curvature_factor` means a shorter focal length and stronger
//! curvature.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use tracing::debug;

use crate::error::check_buffer;
use crate::transform::pad_constant;
use crate::warp::{fill_rows, sample_bilinear};
use crate::{OpsError, OpsResult, Warped};

/// Margin applied to the auto-computed output scale so the curved edges
/// are not clipped by the canvas.
pub const SAFETY_MARGIN: f64 = 1.6;

/// Largest output canvas, in pixels, a remap will allocate.
pub const MAX_CANVAS_PIXELS: usize = 1 << 30;

/// Map entry meaning "no source pixel".
pub const SENTINEL: f32 = -1.0;

/// Parameters of the inverse cylindrical remap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderParams {
    /// Focal length as a fraction of the padded width (> 0, typical 0.1-0.4).
    pub curvature_factor: f64,
    /// Black border added on each side, as a fraction of width/height (>= 0).
    pub pad_ratio: f64,
}

impl Default for CylinderParams {
    fn default() -> Self {
        Self {
            curvature_factor: 0.2,
            pad_ratio: 0.3,
        }
    }
}

impl CylinderParams {
    /// Creates parameters.
    pub fn new(curvature_factor: f64, pad_ratio: f64) -> Self {
        Self {
            curvature_factor,
            pad_ratio,
        }
    }

    /// Checks `curvature_factor > 0` and `pad_ratio >= 0`, both finite.
    pub fn validate(&self) -> OpsResult<()> {
        if !(self.curvature_factor.is_finite() && self.curvature_factor > 0.0) {
            return Err(OpsError::InvalidParameter(format!(
                "curvature_factor must be > 0, got {}",
                self.curvature_factor
            )));
        }
        if !(self.pad_ratio.is_finite() && self.pad_ratio >= 0.0) {
            return Err(OpsError::InvalidParameter(format!(
                "pad_ratio must be >= 0, got {}",
                self.pad_ratio
            )));
        }
        Ok(())
    }
}

/// Derived sizes and constants of one inverse remap.
///
/// Depends only on the source dimensions and [`CylinderParams`], never
/// on pixel content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderGeometry {
    /// Border width added left and right.
    pub pad_x: usize,
    /// Border height added top and bottom.
    pub pad_y: usize,
    /// Width of the padded source.
    pub padded_width: usize,
    /// Height of the padded source.
    pub padded_height: usize,
    /// Focal length in pixels.
    pub focal_length: f64,
    /// Half-angle subtended by the padded source.
    pub max_theta: f64,
    /// Output size relative to the padded source.
    pub safe_scale: f64,
    /// Output canvas width.
    pub output_width: usize,
    /// Output canvas height.
    pub output_height: usize,
}

impl CylinderGeometry {
    /// Computes the geometry for a `width x height` source.
    ///
    /// Fails with [`OpsError::InvalidDimensions`] when the padded or output
    /// canvas would exceed [`MAX_CANVAS_PIXELS`].
    pub fn new(width: usize, height: usize, params: &CylinderParams) -> OpsResult<Self> {
        params.validate()?;
        if width == 0 || height == 0 {
            return Err(OpsError::InvalidDimensions(format!(
                "image is empty ({}x{})",
                width, height
            )));
        }

        let pad_x = canvas_side(width as f64 * params.pad_ratio, "horizontal padding")?;
        let pad_y = canvas_side(height as f64 * params.pad_ratio, "vertical padding")?;
        let padded_width = padded_side(width, pad_x)?;
        let padded_height = padded_side(height, pad_y)?;
        map_len(padded_width, padded_height, 1)?;

        let pw = padded_width as f64;
        let focal_length = pw * params.curvature_factor;
        let max_theta = ((pw / 2.0) / focal_length).atan();
        let safe_scale = (2.0 * focal_length * max_theta / pw) * SAFETY_MARGIN;

        let output_width = canvas_side((pw * safe_scale).round(), "output width")?.max(1);
        let output_height =
            canvas_side((padded_height as f64 * safe_scale).round(), "output height")?.max(1);
        map_len(output_width, output_height, 2)?;

        Ok(Self {
            pad_x,
            pad_y,
            padded_width,
            padded_height,
            focal_length,
            max_theta,
            safe_scale,
            output_width,
            output_height,
        })
    }

    /// Horizontal center of the output canvas.
    pub fn x_center(&self) -> f64 {
        self.output_width as f64 / 2.0
    }

    /// Vertical center of the output canvas.
    pub fn y_center(&self) -> f64 {
        self.output_height as f64 / 2.0
    }

    /// Padded-source coordinate seen by output pixel `(x, y)`, unbounded.
    pub fn source_coord(&self, x: usize, y: usize) -> (f64, f64) {
        let f = self.focal_length;
        let x_norm = (x as f64 - self.x_center()) / f;
        let y_norm = (y as f64 - self.y_center()) / f;

        let theta = x_norm.atan();
        let z = (x_norm * x_norm + 1.0).sqrt();

        let src_x = f * theta + self.padded_width as f64 / 2.0;
        let src_y = f * y_norm / z + self.padded_height as f64 / 2.0;
        (src_x, src_y)
    }

    /// Like [`source_coord`](Self::source_coord), but `None` outside
    /// `[0, padded_width) x [0, padded_height)`.
    pub fn map_pixel(&self, x: usize, y: usize) -> Option<(f32, f32)> {
        let (sx, sy) = self.source_coord(x, y);
        let inside = (0.0..self.padded_width as f64).contains(&sx)
            && (0.0..self.padded_height as f64).contains(&sy);
        inside.then_some((sx as f32, sy as f32))
    }
}

/// Truncates a non-negative size to an integer that fits an image side.
fn canvas_side(value: f64, what: &str) -> OpsResult<usize> {
    let value = value.floor();
    if !(value >= 0.0 && value <= u32::MAX as f64) {
        return Err(OpsError::InvalidDimensions(format!(
            "{} of {} pixels is too large",
            what, value
        )));
    }
    Ok(value as usize)
}

/// `size + 2 * pad`, bounded like [`canvas_side`].
fn padded_side(size: usize, pad: usize) -> OpsResult<usize> {
    pad.checked_mul(2)
        .and_then(|p| p.checked_add(size))
        .filter(|&v| v <= u32::MAX as usize)
        .ok_or_else(|| {
            OpsError::InvalidDimensions(format!("padded size {} + 2 * {} is too large", size, pad))
        })
}

/// Number of entries in a `w x h` buffer with `per_pixel` values each.
fn map_len(w: usize, h: usize, per_pixel: usize) -> OpsResult<usize> {
    w.checked_mul(h)
        .filter(|&n| n <= MAX_CANVAS_PIXELS)
        .and_then(|n| n.checked_mul(per_pixel))
        .ok_or_else(|| OpsError::InvalidDimensions(format!("{}x{} canvas is too large", w, h)))
}

/// Per-pixel source coordinates for an output canvas.
///
/// Entries equal to [`SENTINEL`] in both maps have no source pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordMap {
    /// Canvas width.
    pub width: usize,
    /// Canvas height.
    pub height: usize,
    /// Source x per output pixel, row-major.
    pub map_x: Vec<f32>,
    /// Source y per output pixel, row-major.
    pub map_y: Vec<f32>,
}

impl CoordMap {
    /// Source coordinate for output `(x, y)`, or `None` for the sentinel.
    pub fn get(&self, x: usize, y: usize) -> Option<(f32, f32)> {
        let i = y * self.width + x;
        let (mx, my) = (self.map_x[i], self.map_y[i]);
        if mx == SENTINEL && my == SENTINEL {
            None
        } else {
            Some((mx, my))
        }
    }

    /// Number of entries that point into the source.
    pub fn valid_count(&self) -> usize {
        self.map_x
            .iter()
            .zip(&self.map_y)
            .filter(|&(&mx, &my)| !(mx == SENTINEL && my == SENTINEL))
            .count()
    }
}

/// Builds the inverse map for `geometry`'s output canvas.
///
/// # Errors
///
/// [`OpsError::InvalidDimensions`] if the canvas size overflows.
pub fn build_inverse_map(geometry: &CylinderGeometry) -> OpsResult<CoordMap> {
    let w = geometry.output_width;
    let h = geometry.output_height;

    // Interleaved (x, y) pairs so one row fill covers both maps.
    let mut pairs = vec![0.0f32; map_len(w, h, 2)?];
    fill_rows(&mut pairs, w * 2, |y, row| {
        for (x, entry) in row.chunks_mut(2).enumerate() {
            let (mx, my) = geometry.map_pixel(x, y).unwrap_or((SENTINEL, SENTINEL));
            entry[0] = mx;
            entry[1] = my;
        }
    });

    let (map_x, map_y) = pairs.chunks(2).map(|p| (p[0], p[1])).unzip();
    Ok(CoordMap {
        width: w,
        height: h,
        map_x,
        map_y,
    })
}

/// Resamples `src` through `map`; sentinel entries become black.
pub fn remap(src: &[f32], w: usize, h: usize, ch: usize, map: &CoordMap) -> OpsResult<Vec<f32>> {
    check_buffer(src, w, h, ch)?;

    let mut dst = vec![0.0f32; map_len(map.width, map.height, ch)?];
    if dst.is_empty() {
        return Ok(dst);
    }

    fill_rows(&mut dst, map.width * ch, |y, row| {
        for (x, px) in row.chunks_mut(ch).enumerate() {
            match map.get(x, y) {
                Some((sx, sy)) => sample_bilinear(src, w, h, ch, sx, sy, px),
                None => px.fill(0.0),
            }
        }
    });

    Ok(dst)
}

/// Wraps a flat panorama around the inside of a cylinder.
///
/// Pads the source with a black border, derives the focal length and a
/// safe output size, builds the inverse map and resamples bilinearly.
///
/// # Errors
///
/// [`OpsError::InvalidDimensions`] for an empty image or a padded/output
/// canvas above [`MAX_CANVAS_PIXELS`], [`OpsError::SizeMismatch`] when
/// `src` does not hold `w * h * ch` samples, [`OpsError::InvalidParameter`]
/// for out-of-range parameters. Out-of-bounds samples are never an error;
/// pixels with no source are black.
pub fn remap_cylindrical(
    src: &[f32],
    w: usize,
    h: usize,
    ch: usize,
    params: &CylinderParams,
) -> OpsResult<Warped> {
    check_buffer(src, w, h, ch)?;
    let geometry = CylinderGeometry::new(w, h, params)?;

    debug!(
        src_w = w,
        src_h = h,
        padded_w = geometry.padded_width,
        padded_h = geometry.padded_height,
        focal = geometry.focal_length,
        safe_scale = geometry.safe_scale,
        out_w = geometry.output_width,
        out_h = geometry.output_height,
        "cylinder geometry"
    );

    let padded = pad_constant(src, w, h, ch, geometry.pad_x, geometry.pad_y);
    let map = build_inverse_map(&geometry)?;
    let data = remap(&padded, geometry.padded_width, geometry.padded_height, ch, &map)?;

    Ok(Warped {
        data,
        width: geometry.output_width,
        height: geometry.output_height,
        channels: ch,
    })
}

// === Legacy forward projection ===

/// Destination pixel for source `(x, y)` under the forward projection.
///
/// Uses `cx = w / 2`, `cy = h / 2`:
/// `x_cyl = f atan((x - cx) / f) + cx`,
/// `y_cyl = f (y - cy) / sqrt((x - cx)² + f²) + cy`.
/// Returns `None` when the position falls outside the canvas; otherwise
/// the position truncated to integers.
pub fn forward_target(x: usize, y: usize, w: usize, h: usize, focal_length: f64) -> Option<(usize, usize)> {
    let cx = w as f64 / 2.0;
    let cy = h as f64 / 2.0;
    let dx = x as f64 - cx;
    let dy = y as f64 - cy;

    let theta = (dx / focal_length).atan();
    let h_ = dy / (dx * dx + focal_length * focal_length).sqrt();

    let x_cyl = focal_length * theta + cx;
    let y_cyl = focal_length * h_ + cy;

    if (0.0..w as f64).contains(&x_cyl) && (0.0..h as f64).contains(&y_cyl) {
        Some((x_cyl as usize, y_cyl as usize))
    } else {
        None
    }
}

/// Legacy forward cylindrical projection into a same-size canvas.
///
/// Each source pixel is copied to its [`forward_target`]. Destinations no
/// source pixel reaches stay black. When several source pixels land on
/// one destination, the one visited last in row-major order wins; the
/// targets are computed in parallel but written serially in that order,
/// so the result is deterministic.
///
/// # Errors
///
/// [`OpsError::InvalidDimensions`] or [`OpsError::SizeMismatch`] for a bad buffer,
/// [`OpsError::InvalidParameter`] unless `focal_length` is finite and > 0.
pub fn project_forward(src: &[f32], w: usize, h: usize, ch: usize, focal_length: f64) -> OpsResult<Vec<f32>> {
    check_buffer(src, w, h, ch)?;
    if !(focal_length.is_finite() && focal_length > 0.0) {
        return Err(OpsError::InvalidParameter(format!(
            "focal_length must be > 0, got {}",
            focal_length
        )));
    }

    let targets = forward_targets(w, h, focal_length);

    let mut dst = vec![0.0f32; w * h * ch];
    for (i, target) in targets.into_iter().enumerate() {
        if let Some(t) = target {
            dst[t * ch..(t + 1) * ch].copy_from_slice(&src[i * ch..(i + 1) * ch]);
        }
    }

    Ok(dst)
}

/// Flat destination index for every source pixel, row-major.
#[cfg(feature = "parallel")]
fn forward_targets(w: usize, h: usize, focal_length: f64) -> Vec<Option<usize>> {
    (0..w * h)
        .into_par_iter()
        .map(|i| forward_target(i % w, i / w, w, h, focal_length).map(|(tx, ty)| ty * w + tx))
        .collect()
}

/// Flat destination index for every source pixel (single-threaded fallback).
#[cfg(not(feature = "parallel"))]
fn forward_targets(w: usize, h: usize, focal_length: f64) -> Vec<Option<usize>> {
    (0..w * h)
        .map(|i| forward_target(i % w, i / w, w, h, focal_length).map(|(tx, ty)| ty * w + tx))
        .collect()
}
