//! YAML presets for effect parameters.
//!
//! A preset holds defaults for a shot or a rig so they need not be repeated
//! on every invocation. Flags given on the command line win over the preset,
//! and the preset wins over the built-in defaults.
//!
//! ```yaml
//! curvature: 0.25
//! pad: 0.3
//! strength: 0.4
//! quality: 90
//! format: png
//! suffix: _curved
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use pano_io::WriteOptions;
use pano_ops::cylinder::CylinderParams;
use pano_ops::EffectSettings;

/// Values read from `--config <preset.yaml>`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Preset {
    /// Cylinder curvature factor.
    pub curvature: Option<f64>,
    /// Cylinder pad ratio.
    pub pad: Option<f64>,
    /// Barrel strength.
    pub strength: Option<f64>,
    /// Forward-projection focal length in pixels.
    pub focal: Option<f64>,
    /// JPEG output quality, 1-100.
    pub quality: Option<u8>,
    /// Batch output extension.
    pub format: Option<String>,
    /// Batch output file-name suffix.
    pub suffix: Option<String>,
}

/// Effect parameters given as flags; `None` means "not on the command line".
#[derive(Debug, Clone, Copy, Default)]
pub struct EffectFlags {
    pub curvature: Option<f64>,
    pub pad: Option<f64>,
    pub focal: Option<f64>,
    pub strength: Option<f64>,
}

impl Preset {
    /// Loads a preset file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read preset: {}", path.display()))?;
        let preset = Self::from_yaml(&text)
            .with_context(|| format!("Invalid preset: {}", path.display()))?;
        debug!(path = %path.display(), ?preset, "loaded preset");
        Ok(preset)
    }

    /// Parses preset YAML. An empty document is an empty preset.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Resolves effect parameters: flags, then preset, then defaults.
    pub fn settings(&self, flags: EffectFlags) -> EffectSettings {
        let defaults = EffectSettings::default();
        EffectSettings {
            cylinder: CylinderParams::new(
                flags.curvature.or(self.curvature).unwrap_or(defaults.cylinder.curvature_factor),
                flags.pad.or(self.pad).unwrap_or(defaults.cylinder.pad_ratio),
            ),
            focal_length: flags.focal.or(self.focal),
            strength: flags.strength.or(self.strength).unwrap_or(defaults.strength),
        }
    }

    /// Resolves encoder settings: `--quality`, then preset, then default.
    /// Out-of-range preset values are clamped to 1-100.
    pub fn write_options(&self, quality: Option<u8>) -> WriteOptions {
        match quality.or(self.quality) {
            Some(q) => WriteOptions {
                jpeg_quality: q.clamp(1, 100),
            },
            None => WriteOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_all_keys() {
        let preset = Preset::from_yaml(
            "curvature: 0.25\npad: 0.1\nstrength: 0.4\nfocal: 800\nformat: png\nsuffix: _curved\n",
        )
        .unwrap();
        assert_eq!(preset.curvature, Some(0.25));
        assert_eq!(preset.pad, Some(0.1));
        assert_eq!(preset.strength, Some(0.4));
        assert_eq!(preset.focal, Some(800.0));
        assert_eq!(preset.format.as_deref(), Some("png"));
        assert_eq!(preset.suffix.as_deref(), Some("_curved"));
    }

    #[test]
    fn test_empty_and_partial_presets() {
        assert_eq!(Preset::from_yaml("").unwrap(), Preset::default());
        assert_eq!(Preset::from_yaml("  \n").unwrap(), Preset::default());

        let preset = Preset::from_yaml("pad: 0.0").unwrap();
        assert_eq!(preset.pad, Some(0.0));
        assert_eq!(preset.curvature, None);
    }

    #[test]
    fn test_rejects_unknown_keys() {
        assert!(Preset::from_yaml("curvatur: 0.2").is_err());
    }

    #[test]
    fn test_flags_override_preset_override_defaults() {
        let preset = Preset {
            curvature: Some(0.3),
            strength: Some(0.5),
            ..Default::default()
        };

        let s = preset.settings(EffectFlags::default());
        assert_eq!(s.cylinder, CylinderParams::new(0.3, 0.3));
        assert_eq!(s.strength, 0.5);
        assert_eq!(s.focal_length, None);

        let s = preset.settings(EffectFlags {
            curvature: Some(0.1),
            focal: Some(640.0),
            ..Default::default()
        });
        assert_eq!(s.cylinder.curvature_factor, 0.1);
        assert_eq!(s.focal_length, Some(640.0));
        assert_eq!(s.strength, 0.5);
    }

    #[test]
    fn test_quality_flag_overrides_preset() {
        assert_eq!(Preset::default().write_options(None), WriteOptions::default());

        let preset = Preset::from_yaml("quality: 80").unwrap();
        assert_eq!(preset.write_options(None).jpeg_quality, 80);
        assert_eq!(preset.write_options(Some(60)).jpeg_quality, 60);

        let loud = Preset::from_yaml("quality: 250").unwrap();
        assert_eq!(loud.write_options(None).jpeg_quality, 100);
    }

    #[test]
    fn test_load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Preset::load(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(err.to_string().contains("missing.yaml"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rig.yaml");
        std::fs::write(&path, "curvature: 0.15\n").unwrap();
        assert_eq!(Preset::load(&path).unwrap().curvature, Some(0.15));
    }
}
