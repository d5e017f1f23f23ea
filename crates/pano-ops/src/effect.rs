//! Curvature effects behind one interface.
//!
//! The padded inverse remap, the legacy forward projection and the barrel
//! warp are separate named strategies. Their outputs differ pixel for pixel
//! even for similar-looking parameters.
//!
//! ```rust
//! use pano_ops::{CurvatureEffect, EffectKind};
//! use pano_ops::effect::EffectSettings;
//!
//! let kind: EffectKind = "barrel".parse().unwrap();
//! let effect = kind.build(&EffectSettings::default());
//! let out = effect.apply(&vec![0.5f32; 16 * 8 * 3], 16, 8, 3).unwrap();
//! assert_eq!((out.width, out.height), (16, 8));
//! ```

use std::fmt;
use std::str::FromStr;

use crate::cylinder::{project_forward, remap_cylindrical, CylinderParams};
use crate::warp::barrel_distortion;
use crate::{OpsError, OpsResult};

/// Output of a curvature effect.
///
/// The size may differ from the source (the inverse cylinder picks its own
/// canvas); `data.len() == width * height * channels`.
#[derive(Debug, Clone, PartialEq)]
pub struct Warped {
    /// Interleaved `f32` samples.
    pub data: Vec<f32>,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Channels per pixel.
    pub channels: usize,
}

/// A named image warp that gives a flat panorama a curved look.
pub trait CurvatureEffect: Send + Sync {
    /// Short name used on the command line and in logs.
    fn name(&self) -> &'static str;

    /// Applies the effect to an interleaved `w x h x ch` buffer.
    fn apply(&self, src: &[f32], w: usize, h: usize, ch: usize) -> OpsResult<Warped>;
}

/// Padded, auto-scaled inverse cylindrical remap.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InverseCylinder {
    /// Remap parameters.
    pub params: CylinderParams,
}

impl CurvatureEffect for InverseCylinder {
    fn name(&self) -> &'static str {
        "cylinder"
    }

    fn apply(&self, src: &[f32], w: usize, h: usize, ch: usize) -> OpsResult<Warped> {
        remap_cylindrical(src, w, h, ch, &self.params)
    }
}

/// Legacy forward cylindrical projection into a same-size canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ForwardCylinder {
    /// Focal length in pixels; `None` uses the image width.
    pub focal_length: Option<f64>,
}

impl CurvatureEffect for ForwardCylinder {
    fn name(&self) -> &'static str {
        "cylinder-forward"
    }

    fn apply(&self, src: &[f32], w: usize, h: usize, ch: usize) -> OpsResult<Warped> {
        let focal = self.focal_length.unwrap_or(w as f64);
        let data = project_forward(src, w, h, ch, focal)?;
        Ok(Warped {
            data,
            width: w,
            height: h,
            channels: ch,
        })
    }
}

/// Radial barrel warp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarrelWrap {
    /// Distortion strength; 0 is the identity.
    pub strength: f64,
}

impl Default for BarrelWrap {
    fn default() -> Self {
        Self { strength: 0.3 }
    }
}

impl CurvatureEffect for BarrelWrap {
    fn name(&self) -> &'static str {
        "barrel"
    }

    fn apply(&self, src: &[f32], w: usize, h: usize, ch: usize) -> OpsResult<Warped> {
        let data = barrel_distortion(src, w, h, ch, self.strength)?;
        Ok(Warped {
            data,
            width: w,
            height: h,
            channels: ch,
        })
    }
}

/// Which effect to build, parsed from a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EffectKind {
    /// [`InverseCylinder`].
    #[default]
    Cylinder,
    /// [`ForwardCylinder`].
    CylinderForward,
    /// [`BarrelWrap`].
    Barrel,
}

/// Parameters for every effect; each kind reads only its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectSettings {
    /// Used by [`EffectKind::Cylinder`].
    pub cylinder: CylinderParams,
    /// Used by [`EffectKind::CylinderForward`].
    pub focal_length: Option<f64>,
    /// Used by [`EffectKind::Barrel`].
    pub strength: f64,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            cylinder: CylinderParams::default(),
            focal_length: None,
            strength: BarrelWrap::default().strength,
        }
    }
}

impl EffectKind {
    /// All kinds, in display order.
    pub const ALL: [EffectKind; 3] = [EffectKind::Cylinder, EffectKind::CylinderForward, EffectKind::Barrel];

    /// Canonical name, same as the built effect's [`CurvatureEffect::name`].
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectKind::Cylinder => "cylinder",
            EffectKind::CylinderForward => "cylinder-forward",
            EffectKind::Barrel => "barrel",
        }
    }

    /// Boxes the strategy for this kind.
    pub fn build(&self, settings: &EffectSettings) -> Box<dyn CurvatureEffect> {
        match self {
            EffectKind::Cylinder => Box::new(InverseCylinder {
                params: settings.cylinder,
            }),
            EffectKind::CylinderForward => Box::new(ForwardCylinder {
                focal_length: settings.focal_length,
            }),
            EffectKind::Barrel => Box::new(BarrelWrap {
                strength: settings.strength,
            }),
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EffectKind {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "cylinder" | "curve" | "curved" | "inverse" => Ok(EffectKind::Cylinder),
            "cylinder-forward" | "forward" | "legacy" => Ok(EffectKind::CylinderForward),
            "barrel" | "wrap" => Ok(EffectKind::Barrel),
            other => Err(OpsError::InvalidParameter(format!(
                "unknown effect '{}'. Valid: cylinder, cylinder-forward, barrel",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(w: usize, h: usize) -> Vec<f32> {
        (0..w * h * 3).map(|i| (i % 11) as f32 / 10.0).collect()
    }

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!("cylinder".parse::<EffectKind>().unwrap(), EffectKind::Cylinder);
        assert_eq!("Curve".parse::<EffectKind>().unwrap(), EffectKind::Cylinder);
        assert_eq!("cylinder_forward".parse::<EffectKind>().unwrap(), EffectKind::CylinderForward);
        assert_eq!("legacy".parse::<EffectKind>().unwrap(), EffectKind::CylinderForward);
        assert_eq!("BARREL".parse::<EffectKind>().unwrap(), EffectKind::Barrel);
        assert!(matches!(
            "fisheye".parse::<EffectKind>(),
            Err(OpsError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_display_roundtrips_and_matches_name() {
        let settings = EffectSettings::default();
        for kind in EffectKind::ALL {
            assert_eq!(kind.to_string().parse::<EffectKind>().unwrap(), kind);
            assert_eq!(kind.build(&settings).name(), kind.as_str());
        }
    }

    #[test]
    fn test_inverse_cylinder_grows_canvas() {
        let effect = InverseCylinder::default();
        let out = effect.apply(&flat(40, 20), 40, 20, 3).unwrap();
        let direct = remap_cylindrical(&flat(40, 20), 40, 20, 3, &CylinderParams::default()).unwrap();
        assert_eq!(out, direct);
        assert!(out.width > 40 && out.height > 20);
        assert_eq!(out.data.len(), out.width * out.height * out.channels);
    }

    #[test]
    fn test_forward_defaults_focal_to_width() {
        let src = flat(30, 12);
        let out = ForwardCylinder::default().apply(&src, 30, 12, 3).unwrap();
        let explicit = project_forward(&src, 30, 12, 3, 30.0).unwrap();
        assert_eq!((out.width, out.height), (30, 12));
        assert_eq!(out.data, explicit);
    }

    #[test]
    fn test_barrel_zero_is_identity() {
        let src = flat(20, 10);
        let out = BarrelWrap { strength: 0.0 }.apply(&src, 20, 10, 3).unwrap();
        for (a, b) in src.iter().zip(&out.data) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn test_build_uses_settings() {
        let settings = EffectSettings {
            cylinder: CylinderParams::new(0.35, 0.1),
            focal_length: Some(12.0),
            strength: 0.0,
        };
        let src = flat(24, 10);

        let inv = EffectKind::Cylinder.build(&settings).apply(&src, 24, 10, 3).unwrap();
        let direct = remap_cylindrical(&src, 24, 10, 3, &settings.cylinder).unwrap();
        assert_eq!(inv, direct);

        let fwd = EffectKind::CylinderForward.build(&settings).apply(&src, 24, 10, 3).unwrap();
        assert_eq!(fwd.data, project_forward(&src, 24, 10, 3, 12.0).unwrap());
    }

    #[test]
    fn test_errors_propagate() {
        let effect = EffectKind::Cylinder.build(&EffectSettings::default());
        assert!(effect.apply(&[], 0, 0, 3).is_err());
    }
}
