//! CLI command implementations

pub mod barrel;
pub mod batch;
pub mod convert;
pub mod crop;
pub mod curve;
pub mod cylinder;
pub mod resize;

use anyhow::{Context, Result};
use pano_io::{ImageData, WriteOptions};
use pano_ops::{CurvatureEffect, Warped};
use std::path::Path;
use tracing::info;

/// Load image from path
pub fn load_image(path: &Path) -> Result<ImageData> {
    pano_io::read(path)
        .with_context(|| format!("Failed to load: {}", path.display()))
}

/// Save image to path
pub fn save_image(path: &Path, image: &ImageData, options: &WriteOptions) -> Result<()> {
    pano_io::write_with_options(path, image, options)
        .with_context(|| format!("Failed to save: {}", path.display()))
}

/// Wraps effect output back into an image with the source's channel count.
pub fn warped_to_image(warped: Warped) -> Result<ImageData> {
    let width = u32::try_from(warped.width).context("Output width out of range")?;
    let height = u32::try_from(warped.height).context("Output height out of range")?;
    let channels = u32::try_from(warped.channels).context("Channel count out of range")?;
    Ok(ImageData::from_f32(width, height, channels, warped.data))
}

/// Loads `input`, applies `effect`, saves to `output`.
///
/// Shared by the single-image effect commands.
pub fn apply_effect(
    input: &Path,
    output: &Path,
    effect: &dyn CurvatureEffect,
    write: &WriteOptions,
    verbose: u8,
) -> Result<()> {
    let image = load_image(input)?;
    let (w, h, ch) = (image.width as usize, image.height as usize, image.channels as usize);

    if verbose > 0 {
        println!("Applying {} to {} ({}x{}, {} ch)", effect.name(), input.display(), w, h, ch);
    }

    let warped = effect
        .apply(&image.to_f32(), w, h, ch)
        .with_context(|| format!("{} failed on {}", effect.name(), input.display()))?;

    info!(
        effect = effect.name(),
        src_w = w,
        src_h = h,
        out_w = warped.width,
        out_h = warped.height,
        "effect applied"
    );

    let result = warped_to_image(warped)?;
    save_image(output, &result, write)?;

    if verbose > 0 {
        println!("Saved: {} ({}x{})", output.display(), result.width, result.height);
    }

    Ok(())
}
