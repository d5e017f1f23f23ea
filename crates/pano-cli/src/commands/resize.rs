//! Resize command
//!
//! Scales images using various resampling filters.

use crate::ResizeArgs;
use anyhow::{bail, Result};
use pano_io::{ImageData, WriteOptions};
use pano_ops::cylinder::MAX_CANVAS_PIXELS;
use pano_ops::resize::resize_f32;
use tracing::{debug, trace};

pub fn run(args: ResizeArgs, write: &WriteOptions, verbose: u8) -> Result<()> {
    trace!(input = %args.input.display(), filter = ?args.filter, "resize::run");

    let image = super::load_image(&args.input)?;
    let src_w = image.width as usize;
    let src_h = image.height as usize;

    let (dst_w, dst_h) = target_size(src_w, src_h, args.width, args.height, args.scale)?;
    debug!(src_w, src_h, dst_w, dst_h, "resize target");

    if verbose > 0 {
        println!("Resizing {}x{} -> {}x{}", src_w, src_h, dst_w, dst_h);
    }

    let channels = image.channels as usize;
    let resized = resize_f32(&image.to_f32(), src_w, src_h, channels, dst_w, dst_h, args.filter)?;

    let output = ImageData::from_f32(dst_w as u32, dst_h as u32, image.channels, resized);
    super::save_image(&args.output, &output, write)?;

    if verbose > 0 {
        println!("Done.");
    }

    Ok(())
}

/// Output size from `-w`/`-H`/`-s`; a single side keeps the aspect ratio.
///
/// Fails when the result has a side above `u32::MAX` or more than
/// [`MAX_CANVAS_PIXELS`] pixels.
fn target_size(
    src_w: usize,
    src_h: usize,
    width: Option<usize>,
    height: Option<usize>,
    scale: Option<f32>,
) -> Result<(usize, usize)> {
    let (w, h) = match (width, height, scale) {
        (Some(_), _, Some(_)) | (_, Some(_), Some(_)) => {
            bail!("--scale cannot be combined with --width or --height")
        }
        (Some(w), Some(h), None) => (w as f64, h as f64),
        (Some(w), None, None) => (w as f64, (src_h as f64 * w as f64 / src_w as f64).round()),
        (None, Some(h), None) => ((src_w as f64 * h as f64 / src_h as f64).round(), h as f64),
        (None, None, Some(s)) if s.is_finite() && s > 0.0 => (
            (src_w as f64 * s as f64).round(),
            (src_h as f64 * s as f64).round(),
        ),
        (None, None, Some(s)) => bail!("Scale must be a positive number, got {}", s),
        (None, None, None) => bail!("Specify --width, --height, or --scale"),
    };

    let (w, h) = (w.max(1.0), h.max(1.0));
    if w > u32::MAX as f64 || h > u32::MAX as f64 || w * h > MAX_CANVAS_PIXELS as f64 {
        bail!("Target size {}x{} is too large", w, h);
    }
    Ok((w as usize, h as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_aspect_for_single_side() {
        assert_eq!(target_size(400, 200, Some(100), None, None).unwrap(), (100, 50));
        assert_eq!(target_size(400, 200, None, Some(50), None).unwrap(), (100, 50));
        assert_eq!(target_size(400, 200, Some(10), Some(10), None).unwrap(), (10, 10));
    }

    #[test]
    fn test_scale_and_errors() {
        assert_eq!(target_size(400, 200, None, None, Some(0.5)).unwrap(), (200, 100));
        assert_eq!(target_size(3, 3, None, None, Some(0.01)).unwrap(), (1, 1));
        assert!(target_size(400, 200, None, None, None).is_err());
        assert!(target_size(400, 200, None, None, Some(-1.0)).is_err());
    }

    #[test]
    fn test_huge_targets_are_rejected() {
        assert!(target_size(400, 200, None, None, Some(1e9)).is_err());
        assert!(target_size(400, 200, None, None, Some(f32::MAX)).is_err());
        assert!(target_size(1, 100_000, Some(100_000), None, None).is_err());
        assert!(target_size(400, 200, Some(usize::MAX), Some(1), None).is_err());
        assert_eq!(target_size(400, 200, None, None, Some(4.0)).unwrap(), (1600, 800));
    }

    #[test]
    fn test_scale_conflicts_with_sides() {
        assert!(target_size(400, 200, Some(100), None, Some(0.5)).is_err());
        assert!(target_size(400, 200, None, Some(100), Some(0.5)).is_err());
    }

    #[test]
    fn test_cli_rejects_scale_with_width() {
        use clap::Parser;

        let parsed = crate::Cli::try_parse_from(["pano", "resize", "in.png", "-o", "out.png", "-w", "10", "-s", "2"]);
        assert!(parsed.is_err());
        let parsed = crate::Cli::try_parse_from(["pano", "resize", "in.png", "-o", "out.png", "-s", "2", "-q", "80"]);
        assert!(parsed.is_ok());
    }
}
