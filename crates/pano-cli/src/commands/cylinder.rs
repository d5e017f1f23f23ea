//! Cylinder command - legacy forward projection

use crate::config::{EffectFlags, Preset};
use pano_io::WriteOptions;
use crate::CylinderArgs;
use anyhow::{bail, Result};
use pano_ops::ForwardCylinder;
use tracing::trace;

pub fn run(args: CylinderArgs, preset: &Preset, write: &WriteOptions, verbose: u8) -> Result<()> {
    trace!(input = %args.input.display(), focal = ?args.focal, "cylinder::run");

    let settings = preset.settings(EffectFlags {
        focal: args.focal,
        ..Default::default()
    });
    if let Some(f) = settings.focal_length {
        if !(f.is_finite() && f > 0.0) {
            bail!("--focal must be a positive number of pixels, got {}", f);
        }
    }

    let effect = ForwardCylinder {
        focal_length: settings.focal_length,
    };
    super::apply_effect(&args.input, &args.output, &effect, write, verbose)
}
