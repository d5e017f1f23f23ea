//! Batch processing command

use crate::config::{EffectFlags, Preset};
use crate::BatchArgs;
use anyhow::{bail, Context, Result};
use pano_io::WriteOptions;
use pano_ops::batch::{self, BatchOptions};
use std::path::{Path, PathBuf};
use tracing::{info, trace};

pub fn run(args: BatchArgs, preset: &Preset, write: &WriteOptions, verbose: u8) -> Result<()> {
    trace!(input = %args.input, effect = %args.effect, "batch::run");

    let files = collect_inputs(&args.input, args.max)?;
    if files.is_empty() {
        bail!("No images match: {}", args.input);
    }

    info!(files = files.len(), input = %args.input, effect = %args.effect, "Starting batch processing");

    if verbose > 0 {
        println!("Found {} images in '{}'", files.len(), args.input);
    }

    let settings = preset.settings(EffectFlags {
        curvature: args.curvature,
        pad: args.pad,
        focal: args.focal,
        strength: args.strength,
    });
    let effect = args.effect.build(&settings);

    let options = BatchOptions {
        output_dir: args.output_dir,
        format: args.format.or_else(|| preset.format.clone()),
        suffix: args.suffix.or_else(|| preset.suffix.clone()).unwrap_or_default(),
        write_options: *write,
    };

    let report = batch::run(&files, &options, effect.as_ref())
        .with_context(|| format!("Failed to prepare output directory: {}", options.output_dir.display()))?;

    for (path, reason) in &report.failed {
        eprintln!("Skipped {}: {}", path.display(), reason);
    }
    if verbose > 0 {
        for path in &report.written {
            println!("  {}", path.display());
        }
    }
    println!("Processed: {} success, {} failed", report.written.len(), report.failed.len());

    if !report.is_clean() {
        bail!("{} files failed", report.failed.len());
    }

    Ok(())
}

/// Expands the `-i` argument: a folder is listed in file-name order,
/// anything else is treated as a glob pattern.
fn collect_inputs(input: &str, max: Option<usize>) -> Result<Vec<PathBuf>> {
    let path = Path::new(input);
    if path.is_dir() {
        return pano_io::folder::list_images(path, max)
            .with_context(|| format!("Failed to list folder: {}", path.display()));
    }

    let mut files: Vec<PathBuf> = glob::glob(input)
        .with_context(|| format!("Invalid glob pattern: {}", input))?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file() && pano_io::folder::is_image_path(p))
        .collect();
    files.sort();

    if let Some(max) = max {
        files.truncate(max);
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_and_glob_inputs() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.jpg", "c.bmp", "readme.md"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let listed = collect_inputs(dir.path().to_str().unwrap(), None).unwrap();
        let names: Vec<String> = listed
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.png", "c.bmp"]);

        let pattern = format!("{}/*.png", dir.path().display());
        assert_eq!(collect_inputs(&pattern, None).unwrap(), vec![dir.path().join("b.png")]);

        let capped = collect_inputs(dir.path().to_str().unwrap(), Some(2)).unwrap();
        assert_eq!(capped.len(), 2);
    }

    #[test]
    fn test_unmatched_glob_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/*.jpg", dir.path().display());
        assert!(collect_inputs(&pattern, None).unwrap().is_empty());
    }
}
