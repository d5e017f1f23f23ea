//! Format conversion command

use crate::ConvertArgs;
use anyhow::{Context, Result};
use pano_io::{Format, WriteOptions};
use tracing::{info, trace};

/// Runs the convert command.
pub fn run(args: ConvertArgs, write: &WriteOptions, verbose: u8) -> Result<()> {
    trace!(input = %args.input.display(), output = %args.output.display(), "convert::run");

    let input_format = Format::detect(&args.input).unwrap_or(Format::Unknown);
    let output_format = Format::from_extension(&args.output);

    info!(
        input = %args.input.display(),
        input_format = ?input_format,
        output = %args.output.display(),
        output_format = ?output_format,
        "Converting image"
    );

    if verbose > 0 {
        println!(
            "Converting {} ({:?}) -> {} ({:?})",
            args.input.display(),
            input_format,
            args.output.display(),
            output_format
        );
    }

    pano_io::convert(&args.input, &args.output, write).with_context(|| {
        format!("Failed to convert {} -> {}", args.input.display(), args.output.display())
    })?;

    if verbose > 0 {
        println!("Done.");
    }

    Ok(())
}
