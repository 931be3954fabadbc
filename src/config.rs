//! TOML-driven construction of a mask stack.
//!
//! A configuration names the grid resolution, the minimum-area gate, and any
//! subset of the masking functions; omitted sections simply leave that
//! function out of the stack. Angles are plain degrees in the file and are
//! validated by each function's constructor, not here.

use std::path::Path;

use anyhow::Context;
use log::{debug, info};
use qtty::{Degrees, Minutes};
use serde::Deserialize;

use crate::basis::area_check::AreaCheckMask;
use crate::basis::masks::{
    AltAzShadowMask, AzimuthMask, BulkCloudMask, HourAngleMask, MoonAvoidanceMask, PlanetMask,
    SolarElongationLimitMask, SolarElongationRangeMask, ZenithMask,
};
use crate::basis::BasisFunction;
use crate::error::MaskError;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaskStackConfig {
    /// HEALPix resolution parameter; must be a power of two.
    pub nside: u32,
    /// Minimum unmasked sky area required for the tick to be feasible.
    pub min_area_deg2: f64,
    #[serde(default)]
    pub solar_elongation: Option<SolarElongationConfig>,
    #[serde(default)]
    pub hour_angle: Option<HourAngleConfig>,
    #[serde(default)]
    pub zenith: Option<AltBandConfig>,
    #[serde(default)]
    pub moon: Option<MoonConfig>,
    #[serde(default)]
    pub planets: Option<PlanetConfig>,
    #[serde(default)]
    pub cloud: Option<CloudConfig>,
    #[serde(default)]
    pub azimuth: Option<AzRangeConfig>,
    #[serde(default)]
    pub alt_az_shadow: Option<ShadowConfig>,
}

/// Either a single upper limit or a [min, max] band; setting both is an
/// error.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolarElongationConfig {
    pub limit_deg: Option<f64>,
    pub min_deg: Option<f64>,
    pub max_deg: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HourAngleConfig {
    pub min_hours: Option<f64>,
    pub max_hours: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AltBandConfig {
    pub min_alt_deg: f64,
    pub max_alt_deg: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MoonConfig {
    pub distance_deg: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanetConfig {
    pub mask_radius_deg: f64,
    /// Planet names to mask; defaults to venus, mars, jupiter.
    pub names: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CloudConfig {
    pub max_cloud: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AzRangeConfig {
    pub min_az_deg: f64,
    pub max_az_deg: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShadowConfig {
    pub min_alt_deg: f64,
    pub max_alt_deg: f64,
    #[serde(default)]
    pub min_az_deg: f64,
    #[serde(default = "full_circle")]
    pub max_az_deg: f64,
    #[serde(default = "default_shadow_minutes")]
    pub shadow_minutes: f64,
    #[serde(default = "default_pad_deg")]
    pub pad_deg: f64,
}

fn full_circle() -> f64 {
    360.0
}

fn default_shadow_minutes() -> f64 {
    40.0
}

fn default_pad_deg() -> f64 {
    2.0
}

impl MaskStackConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, MaskError> {
        toml::from_str(text).map_err(|e| MaskError::config(format!("invalid mask config: {e}")))
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading mask config {}", path.display()))?;
        let config = Self::from_toml_str(&text)
            .with_context(|| format!("parsing mask config {}", path.display()))?;
        Ok(config)
    }

    /// Build the configured stack. Construction order fixes evaluation
    /// order, cheapest functions first so the fail-fast area gate gives up
    /// early on bad ticks.
    pub fn build(&self) -> Result<AreaCheckMask, MaskError> {
        let mut masks: Vec<Box<dyn BasisFunction>> = Vec::new();

        if let Some(zenith) = &self.zenith {
            masks.push(Box::new(ZenithMask::new(
                self.nside,
                Degrees::new(zenith.min_alt_deg),
                Degrees::new(zenith.max_alt_deg),
            )?));
        }
        if let Some(azimuth) = &self.azimuth {
            masks.push(Box::new(AzimuthMask::new(
                self.nside,
                Degrees::new(azimuth.min_az_deg),
                Degrees::new(azimuth.max_az_deg),
            )?));
        }
        if let Some(ha) = &self.hour_angle {
            masks.push(Box::new(HourAngleMask::new(
                self.nside,
                ha.min_hours,
                ha.max_hours,
            )?));
        }
        if let Some(elong) = &self.solar_elongation {
            masks.push(build_solar_elongation(self.nside, elong)?);
        }
        if let Some(cloud) = &self.cloud {
            masks.push(Box::new(BulkCloudMask::new(
                self.nside,
                None,
                cloud.max_cloud,
            )?));
        }
        if let Some(moon) = &self.moon {
            masks.push(Box::new(MoonAvoidanceMask::new(
                self.nside,
                Degrees::new(moon.distance_deg),
            )?));
        }
        if let Some(planets) = &self.planets {
            masks.push(Box::new(PlanetMask::new(
                self.nside,
                Degrees::new(planets.mask_radius_deg),
                planets.names.clone(),
            )?));
        }
        if let Some(shadow) = &self.alt_az_shadow {
            masks.push(Box::new(AltAzShadowMask::new(
                self.nside,
                Degrees::new(shadow.min_alt_deg),
                Degrees::new(shadow.max_alt_deg),
                Degrees::new(shadow.min_az_deg),
                Degrees::new(shadow.max_az_deg),
                Minutes::new(shadow.shadow_minutes),
                Degrees::new(shadow.pad_deg),
            )?));
        }

        info!(
            "built mask stack: nside={}, {} functions, min area {} deg^2",
            self.nside,
            masks.len(),
            self.min_area_deg2
        );
        for mask in &masks {
            debug!("  mask: {}", mask.label());
        }
        AreaCheckMask::new(self.nside, masks, self.min_area_deg2)
    }
}

fn build_solar_elongation(
    nside: u32,
    config: &SolarElongationConfig,
) -> Result<Box<dyn BasisFunction>, MaskError> {
    match (config.limit_deg, config.min_deg, config.max_deg) {
        (Some(limit), None, None) => Ok(Box::new(SolarElongationLimitMask::new(
            nside,
            Degrees::new(limit),
        )?)),
        (None, Some(min), Some(max)) => Ok(Box::new(SolarElongationRangeMask::new(
            nside,
            Degrees::new(min),
            Degrees::new(max),
        )?)),
        (None, None, None) => Err(MaskError::config(
            "solar_elongation section needs limit_deg or min_deg/max_deg",
        )),
        (None, _, _) => Err(MaskError::config(
            "solar_elongation band needs both min_deg and max_deg",
        )),
        (Some(_), _, _) => Err(MaskError::config(
            "solar_elongation takes limit_deg or min_deg/max_deg, not both",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let config = MaskStackConfig::from_toml_str(
            r#"
            nside = 32
            min_area_deg2 = 1000.0
            "#,
        )
        .unwrap();
        assert_eq!(config.nside, 32);
        assert_eq!(config.min_area_deg2, 1000.0);
        assert!(config.zenith.is_none());
        let stack = config.build().unwrap();
        assert!(stack.masks().is_empty());
    }

    #[test]
    fn test_parse_full_stack() {
        let config = MaskStackConfig::from_toml_str(
            r#"
            nside = 32
            min_area_deg2 = 1000.0

            [zenith]
            min_alt_deg = 20.0
            max_alt_deg = 82.0

            [azimuth]
            min_az_deg = 120.0
            max_az_deg = 240.0

            [hour_angle]
            min_hours = 2.0
            max_hours = 22.0

            [solar_elongation]
            limit_deg = 145.0

            [cloud]
            max_cloud = 0.7

            [moon]
            distance_deg = 30.0

            [planets]
            mask_radius_deg = 3.5

            [alt_az_shadow]
            min_alt_deg = 20.0
            max_alt_deg = 82.0
            shadow_minutes = 40.0
            pad_deg = 2.0
            "#,
        )
        .unwrap();
        let stack = config.build().unwrap();
        assert_eq!(stack.masks().len(), 8);
        let labels: Vec<_> = stack.masks().iter().map(|m| m.label()).collect();
        assert!(labels.contains(&"alt_az_shadow"));
        assert!(labels.contains(&"solar_elongation_limit"));
    }

    #[test]
    fn test_shadow_defaults() {
        let config = MaskStackConfig::from_toml_str(
            r#"
            nside = 32
            min_area_deg2 = 0.0

            [alt_az_shadow]
            min_alt_deg = 20.0
            max_alt_deg = 82.0
            "#,
        )
        .unwrap();
        let shadow = config.alt_az_shadow.as_ref().unwrap();
        assert_eq!(shadow.min_az_deg, 0.0);
        assert_eq!(shadow.max_az_deg, 360.0);
        assert_eq!(shadow.shadow_minutes, 40.0);
        assert_eq!(shadow.pad_deg, 2.0);
        config.build().unwrap();
    }

    #[test]
    fn test_elongation_exclusive_forms() {
        let both = MaskStackConfig::from_toml_str(
            r#"
            nside = 32
            min_area_deg2 = 0.0

            [solar_elongation]
            limit_deg = 145.0
            min_deg = 30.0
            max_deg = 60.0
            "#,
        )
        .unwrap();
        assert!(both.build().is_err());

        let band = MaskStackConfig::from_toml_str(
            r#"
            nside = 32
            min_area_deg2 = 0.0

            [solar_elongation]
            min_deg = 30.0
            max_deg = 60.0
            "#,
        )
        .unwrap();
        let stack = band.build().unwrap();
        assert_eq!(stack.masks()[0].label(), "solar_elongation_range");
    }

    #[test]
    fn test_invalid_values_rejected_at_build() {
        let config = MaskStackConfig::from_toml_str(
            r#"
            nside = 32
            min_area_deg2 = 0.0

            [zenith]
            min_alt_deg = 82.0
            max_alt_deg = 20.0
            "#,
        )
        .unwrap();
        let err = config.build().unwrap_err();
        assert!(matches!(err, MaskError::Config { .. }));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result = MaskStackConfig::from_toml_str(
            r#"
            nside = 32
            min_area_deg2 = 0.0
            not_a_field = 1
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_non_power_of_two_nside_rejected_at_build() {
        let config = MaskStackConfig::from_toml_str(
            r#"
            nside = 17
            min_area_deg2 = 0.0
            "#,
        )
        .unwrap();
        assert!(config.build().is_err());
    }
}
