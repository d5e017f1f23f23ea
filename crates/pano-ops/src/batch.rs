//! Batch application of a curvature effect.
//!
//! Items are processed one after another on the calling thread. A file
//! that cannot be read, warped or written is logged and recorded in the
//! [`BatchReport`], and the run moves on to the next one.
//!
//! ```rust,ignore
//! use pano_ops::batch::{run, BatchOptions};
//! use pano_ops::InverseCylinder;
//!
//! let inputs = pano_io::folder::list_images("frames".as_ref(), None)?;
//! let report = run(&inputs, &BatchOptions::new("curved"), &InverseCylinder::default())?;
//! println!("{} written, {} failed", report.written.len(), report.failed.len());
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use pano_io::{ImageData, WriteOptions};
use tracing::{debug, info, trace, warn};

use crate::{CurvatureEffect, OpsError, OpsResult};

/// Where and how batch outputs are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Directory receiving the outputs; created if missing.
    pub output_dir: PathBuf,
    /// Output extension (e.g. `"png"`); `None` keeps the input's.
    pub format: Option<String>,
    /// Appended to the input stem, e.g. `"_curved"`.
    pub suffix: String,
    /// Encoder settings for the outputs.
    pub write_options: WriteOptions,
}

impl BatchOptions {
    /// Options writing into `output_dir` with the input format and no suffix.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            format: None,
            suffix: String::new(),
            write_options: WriteOptions::default(),
        }
    }

    /// Output path for `input`: `output_dir/<stem><suffix>.<ext>`.
    pub fn output_path(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_else(|| "output".into());

        let ext = match &self.format {
            Some(f) => f.trim_start_matches('.').to_string(),
            None => input
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_else(|| "png".into()),
        };

        self.output_dir.join(format!("{}{}.{}", stem, self.suffix, ext))
    }
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Output files written, in input order.
    pub written: Vec<PathBuf>,
    /// Inputs that were skipped, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    /// Number of inputs seen.
    pub fn total(&self) -> usize {
        self.written.len() + self.failed.len()
    }

    /// `true` if nothing failed.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Applies `effect` to every input in order.
///
/// An input whose output path was already written by an earlier input
/// (`a.png` and `a.bmp` with `format: Some("png")`) is recorded as failed
/// and not processed, so the first output is never overwritten.
///
/// # Errors
///
/// Only failing to create `options.output_dir` is fatal; per-item failures
/// end up in [`BatchReport::failed`].
pub fn run<P: AsRef<Path>>(
    inputs: &[P],
    options: &BatchOptions,
    effect: &dyn CurvatureEffect,
) -> OpsResult<BatchReport> {
    trace!(
        inputs = inputs.len(),
        effect = effect.name(),
        out = %options.output_dir.display(),
        "batch::run"
    );

    std::fs::create_dir_all(&options.output_dir).map_err(pano_io::IoError::from)?;

    let mut report = BatchReport::default();
    let mut claimed: HashSet<PathBuf> = HashSet::new();
    for (i, input) in inputs.iter().enumerate() {
        let input = input.as_ref();
        debug!(index = i, path = %input.display(), "processing");

        let output = options.output_path(input);
        if claimed.contains(&output) {
            warn!(path = %input.display(), output = %output.display(), "output name collides; skipping");
            report.failed.push((
                input.to_path_buf(),
                format!("output {} already written by an earlier input", output.display()),
            ));
            continue;
        }

        match process_file(input, options, effect) {
            Ok(output) => {
                claimed.insert(output.clone());
                report.written.push(output);
            }
            Err(e) => {
                warn!(path = %input.display(), error = %e, "skipping");
                report.failed.push((input.to_path_buf(), e.to_string()));
            }
        }
    }

    info!(
        effect = effect.name(),
        written = report.written.len(),
        failed = report.failed.len(),
        "batch complete"
    );

    Ok(report)
}

/// Reads one image, applies `effect` and writes the result.
///
/// Returns the output path.
pub fn process_file(input: &Path, options: &BatchOptions, effect: &dyn CurvatureEffect) -> OpsResult<PathBuf> {
    let image = pano_io::read(input)?;
    if image.is_empty() {
        return Err(OpsError::InvalidDimensions(format!(
            "{} has no pixels",
            input.display()
        )));
    }
    let (w, h, ch) = (
        image.width as usize,
        image.height as usize,
        image.channels as usize,
    );

    let warped = effect.apply(&image.to_f32(), w, h, ch)?;

    let (width, height) = match (u32::try_from(warped.width), u32::try_from(warped.height)) {
        (Ok(width), Ok(height)) => (width, height),
        _ => {
            return Err(OpsError::InvalidDimensions(format!(
                "output {}x{} is too large",
                warped.width, warped.height
            )));
        }
    };
    let out_image = ImageData::from_f32(width, height, image.channels, warped.data);

    let output = options.output_path(input);
    pano_io::write_with_options(&output, &out_image, &options.write_options)?;
    Ok(output)
}
