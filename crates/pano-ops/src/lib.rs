//! # pano-ops
//!
//! Image operations for curved panorama views.
//!
//! All operations work on interleaved, row-major `f32` buffers
//! (`[R G B R G B ...]`) described by `width`, `height` and `channels`,
//! the same layout [`pano_io::ImageData::to_f32`] produces.
//!
//! # Modules
//!
//! - [`cylinder`] - Cylindrical remaps (padded inverse engine, legacy forward projection)
//! - [`warp`] - Barrel distortion and the shared bilinear sampler
//! - [`effect`] - [`CurvatureEffect`] strategies over the warps above
//! - [`batch`] - Folder/glob batch runs that skip failing items
//! - [`transform`] - Padding and cropping
//! - [`resize`] - Image scaling and resampling
//!
//! # Example
//!
//! ```rust
//! use pano_ops::cylinder::{remap_cylindrical, CylinderParams};
//!
//! let src = vec![0.5f32; 64 * 32 * 3];
//! let out = remap_cylindrical(&src, 64, 32, 3, &CylinderParams::new(0.2, 0.3)).unwrap();
//! assert_eq!(out.data.len(), out.width * out.height * 3);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod batch;
pub mod cylinder;
pub mod effect;
pub mod resize;
pub mod transform;
pub mod warp;

pub use effect::{BarrelWrap, CurvatureEffect, EffectKind, EffectSettings, ForwardCylinder, InverseCylinder, Warped};
pub use error::{OpsError, OpsResult};
pub use resize::Filter;
