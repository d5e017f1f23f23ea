//! Crop command

use crate::CropArgs;
use anyhow::Result;
use pano_io::{ImageData, WriteOptions};
use pano_ops::transform::crop;
use tracing::trace;

pub fn run(args: CropArgs, write: &WriteOptions, verbose: u8) -> Result<()> {
    trace!(input = %args.input.display(), x = args.x, y = args.y, w = args.w, h = args.h, "crop::run");

    let image = super::load_image(&args.input)?;
    let w = image.width as usize;
    let h = image.height as usize;
    let c = image.channels as usize;

    if verbose > 0 {
        println!("Cropping {}x{} @ ({},{}) from {}x{}", args.w, args.h, args.x, args.y, w, h);
    }

    let cropped = crop(&image.to_f32(), w, h, c, args.x, args.y, args.w, args.h)?;

    let output = ImageData::from_f32(args.w as u32, args.h as u32, image.channels, cropped);
    super::save_image(&args.output, &output, write)?;

    if verbose > 0 {
        println!("Done.");
    }

    Ok(())
}
