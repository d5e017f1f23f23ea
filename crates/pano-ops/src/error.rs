//! Error types for image operations.

use pano_io::IoError;
use thiserror::Error;

/// Error type for image operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Invalid dimensions specified.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Buffer length does not match the stated dimensions.
    #[error("buffer size mismatch: expected {expected} samples, got {actual}")]
    SizeMismatch {
        /// Samples implied by the dimensions.
        expected: usize,
        /// Samples actually provided.
        actual: usize,
    },

    /// Reading or writing an image failed.
    #[error(transparent)]
    Io(#[from] IoError),
}

/// Result type for image operations.
pub type OpsResult<T> = Result<T, OpsError>;

/// Checks that `src` holds a non-empty `width x height x channels` image.
pub(crate) fn check_buffer(src: &[f32], width: usize, height: usize, channels: usize) -> OpsResult<()> {
    if width == 0 || height == 0 || channels == 0 {
        return Err(OpsError::InvalidDimensions(format!(
            "image is empty ({}x{}, {} channels)",
            width, height, channels
        )));
    }

    let expected = width
        .checked_mul(height)
        .and_then(|v| v.checked_mul(channels))
        .ok_or_else(|| OpsError::InvalidDimensions("image dimensions overflow".into()))?;

    if src.len() != expected {
        return Err(OpsError::SizeMismatch {
            expected,
            actual: src.len(),
        });
    }

    Ok(())
}
