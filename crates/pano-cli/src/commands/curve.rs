//! Curve command - padded, auto-scaled inverse cylinder remap

use crate::config::{EffectFlags, Preset};
use pano_io::WriteOptions;
use crate::CurveArgs;
use anyhow::Result;
use pano_ops::InverseCylinder;
use tracing::{debug, trace};

pub fn run(args: CurveArgs, preset: &Preset, write: &WriteOptions, verbose: u8) -> Result<()> {
    trace!(input = %args.input.display(), output = %args.output.display(), "curve::run");

    let settings = preset.settings(EffectFlags {
        curvature: args.curvature,
        pad: args.pad,
        ..Default::default()
    });
    debug!(params = ?settings.cylinder, "cylinder params");

    let effect = InverseCylinder {
        params: settings.cylinder,
    };
    super::apply_effect(&args.input, &args.output, &effect, write, verbose)
}
