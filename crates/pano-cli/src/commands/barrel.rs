//! Barrel command

use crate::config::{EffectFlags, Preset};
use pano_io::WriteOptions;
use crate::BarrelArgs;
use anyhow::Result;
use pano_ops::BarrelWrap;
use tracing::trace;

pub fn run(args: BarrelArgs, preset: &Preset, write: &WriteOptions, verbose: u8) -> Result<()> {
    trace!(input = %args.input.display(), strength = ?args.strength, "barrel::run");

    let settings = preset.settings(EffectFlags {
        strength: args.strength,
        ..Default::default()
    });

    let effect = BarrelWrap {
        strength: settings.strength,
    };
    super::apply_effect(&args.input, &args.output, &effect, write, verbose)
}
