//! Concrete masking functions.
//!
//! Every mask here follows the same shape: immutable thresholds fixed at
//! construction (validated, never clamped), a precomputed template map copied
//! on each call, and threshold comparisons made through [`Rounded`] so the
//! masked set is identical across platforms even at exact boundaries. All
//! masks emit `0.0` for feasible pixels and NaN for masked ones.

use std::f64::consts::TAU;

use log::debug;
use qtty::{Day, Degrees, Minutes, Quantity, Radian};

use crate::algorithms::sphere::{angular_separation, wrap_tau};
use crate::algorithms::Rounded;
use crate::basis::{npix_for, BasisFunction, PixelMap};
use crate::error::MaskError;
use crate::fov::FieldOfView;
use crate::models::conditions::Conditions;
use crate::models::grid::SkyGrid;

const MASKED: f64 = f64::NAN;
const FEASIBLE: f64 = 0.0;

fn to_rad(angle: Degrees) -> f64 {
    angle.to::<Radian>().value()
}

/// Mask everything beyond a single solar-elongation limit.
#[derive(Debug, Clone)]
pub struct SolarElongationLimitMask {
    nside: u32,
    /// Elongation limit, radians.
    limit: f64,
    template: PixelMap,
}

impl SolarElongationLimitMask {
    pub fn new(nside: u32, limit: Degrees) -> Result<Self, MaskError> {
        SkyGrid::new(nside)?;
        if !(0.0..=180.0).contains(&limit.value()) {
            return Err(MaskError::config(format!(
                "solar elongation limit {} out of range [0, 180] degrees",
                limit.value()
            )));
        }
        Ok(SolarElongationLimitMask {
            nside,
            limit: to_rad(limit),
            template: vec![FEASIBLE; npix_for(nside)],
        })
    }
}

impl BasisFunction for SolarElongationLimitMask {
    fn nside(&self) -> u32 {
        self.nside
    }

    fn label(&self) -> &'static str {
        "solar_elongation_limit"
    }

    fn evaluate(&self, conditions: &Conditions) -> Result<PixelMap, MaskError> {
        conditions.ensure_npix(self.template.len())?;
        let mut result = self.template.clone();
        let limit = Rounded::new(self.limit);
        for (value, &elong) in result.iter_mut().zip(&conditions.solar_elongation) {
            if Rounded::new(elong) > limit {
                *value = MASKED;
            }
        }
        Ok(result)
    }
}

/// Keep only pixels within a solar-elongation band (inclusive bounds).
#[derive(Debug, Clone)]
pub struct SolarElongationRangeMask {
    nside: u32,
    min_elong: f64,
    max_elong: f64,
    template: PixelMap,
}

impl SolarElongationRangeMask {
    pub fn new(nside: u32, min_elong: Degrees, max_elong: Degrees) -> Result<Self, MaskError> {
        SkyGrid::new(nside)?;
        if min_elong.value() < 0.0 || max_elong.value() > 180.0 {
            return Err(MaskError::config(format!(
                "solar elongation band [{}, {}] out of range [0, 180] degrees",
                min_elong.value(),
                max_elong.value()
            )));
        }
        if min_elong.value() > max_elong.value() {
            return Err(MaskError::config(format!(
                "solar elongation band inverted: min {} > max {}",
                min_elong.value(),
                max_elong.value()
            )));
        }
        Ok(SolarElongationRangeMask {
            nside,
            min_elong: to_rad(min_elong),
            max_elong: to_rad(max_elong),
            template: vec![MASKED; npix_for(nside)],
        })
    }
}

impl BasisFunction for SolarElongationRangeMask {
    fn nside(&self) -> u32 {
        self.nside
    }

    fn label(&self) -> &'static str {
        "solar_elongation_range"
    }

    fn evaluate(&self, conditions: &Conditions) -> Result<PixelMap, MaskError> {
        conditions.ensure_npix(self.template.len())?;
        let mut result = self.template.clone();
        let lo = Rounded::new(self.min_elong);
        let hi = Rounded::new(self.max_elong);
        for (value, &elong) in result.iter_mut().zip(&conditions.solar_elongation) {
            let e = Rounded::new(elong);
            if e >= lo && e <= hi {
                *value = FEASIBLE;
            }
        }
        Ok(result)
    }
}

/// Limit the sky by local hour angle.
///
/// Bounds are in hours; either side may be omitted. A pixel is masked when
/// its hour angle falls below `ha_min` or above `ha_max` (hours convert to
/// radians as `h / 12 · π`).
#[derive(Debug, Clone)]
pub struct HourAngleMask {
    nside: u32,
    /// Lower bound, radians, if configured.
    ha_min: Option<f64>,
    /// Upper bound, radians, if configured.
    ha_max: Option<f64>,
    template: PixelMap,
}

impl HourAngleMask {
    pub fn new(nside: u32, ha_min: Option<f64>, ha_max: Option<f64>) -> Result<Self, MaskError> {
        SkyGrid::new(nside)?;
        for (name, bound) in [("ha_min", ha_min), ("ha_max", ha_max)] {
            if let Some(hours) = bound {
                if !(0.0..=24.0).contains(&hours) {
                    return Err(MaskError::config(format!(
                        "{name} {hours} out of range [0, 24] hours"
                    )));
                }
            }
        }
        if let (Some(lo), Some(hi)) = (ha_min, ha_max) {
            if lo > hi {
                return Err(MaskError::config(format!(
                    "hour angle bounds inverted: min {lo} > max {hi}"
                )));
            }
        }
        Ok(HourAngleMask {
            nside,
            ha_min: ha_min.map(|h| h / 12.0 * std::f64::consts::PI),
            ha_max: ha_max.map(|h| h / 12.0 * std::f64::consts::PI),
            template: vec![FEASIBLE; npix_for(nside)],
        })
    }
}

impl BasisFunction for HourAngleMask {
    fn nside(&self) -> u32 {
        self.nside
    }

    fn label(&self) -> &'static str {
        "hour_angle"
    }

    fn evaluate(&self, conditions: &Conditions) -> Result<PixelMap, MaskError> {
        conditions.ensure_npix(self.template.len())?;
        let mut result = self.template.clone();
        if let Some(lo) = self.ha_min {
            let lo = Rounded::new(lo);
            for (value, &ha) in result.iter_mut().zip(&conditions.hour_angle) {
                if Rounded::new(ha) < lo {
                    *value = MASKED;
                }
            }
        }
        if let Some(hi) = self.ha_max {
            let hi = Rounded::new(hi);
            for (value, &ha) in result.iter_mut().zip(&conditions.hour_angle) {
                if Rounded::new(ha) > hi {
                    *value = MASKED;
                }
            }
        }
        Ok(result)
    }
}

/// Keep an altitude band, masking the zenith region and the low sky.
#[derive(Debug, Clone)]
pub struct ZenithMask {
    nside: u32,
    min_alt: f64,
    max_alt: f64,
    template: PixelMap,
}

impl ZenithMask {
    pub fn new(nside: u32, min_alt: Degrees, max_alt: Degrees) -> Result<Self, MaskError> {
        SkyGrid::new(nside)?;
        validate_alt_band(min_alt, max_alt)?;
        Ok(ZenithMask {
            nside,
            min_alt: to_rad(min_alt),
            max_alt: to_rad(max_alt),
            template: vec![MASKED; npix_for(nside)],
        })
    }
}

impl BasisFunction for ZenithMask {
    fn nside(&self) -> u32 {
        self.nside
    }

    fn label(&self) -> &'static str {
        "zenith"
    }

    fn evaluate(&self, conditions: &Conditions) -> Result<PixelMap, MaskError> {
        conditions.ensure_npix(self.template.len())?;
        let mut result = self.template.clone();
        let lo = Rounded::new(self.min_alt);
        let hi = Rounded::new(self.max_alt);
        for (value, &alt) in result.iter_mut().zip(&conditions.alt) {
            let a = Rounded::new(alt);
            if a > lo && a < hi {
                *value = FEASIBLE;
            }
        }
        Ok(result)
    }

    fn recompute_on_new_observation(&self) -> bool {
        false
    }
}

/// Avoid pointing too close to the moon.
#[derive(Debug, Clone)]
pub struct MoonAvoidanceMask {
    nside: u32,
    /// Minimum allowed moon separation, radians.
    moon_distance: f64,
    template: PixelMap,
}

impl MoonAvoidanceMask {
    pub fn new(nside: u32, moon_distance: Degrees) -> Result<Self, MaskError> {
        SkyGrid::new(nside)?;
        if !(0.0..=180.0).contains(&moon_distance.value()) {
            return Err(MaskError::config(format!(
                "moon distance {} out of range [0, 180] degrees",
                moon_distance.value()
            )));
        }
        Ok(MoonAvoidanceMask {
            nside,
            moon_distance: to_rad(moon_distance),
            template: vec![FEASIBLE; npix_for(nside)],
        })
    }
}

impl BasisFunction for MoonAvoidanceMask {
    fn nside(&self) -> u32 {
        self.nside
    }

    fn label(&self) -> &'static str {
        "moon_avoidance"
    }

    fn evaluate(&self, conditions: &Conditions) -> Result<PixelMap, MaskError> {
        conditions.ensure_npix(self.template.len())?;
        let mut result = self.template.clone();
        let min_distance = Rounded::new(self.moon_distance);
        for i in 0..result.len() {
            let separation = angular_separation(
                conditions.az[i],
                conditions.alt[i],
                conditions.moon_az,
                conditions.moon_alt,
            );
            if Rounded::new(separation) < min_distance {
                result[i] = MASKED;
            }
        }
        Ok(result)
    }

    fn recompute_on_new_observation(&self) -> bool {
        false
    }
}

/// Mask the bright planets.
///
/// Saturn is left out of the default list: it moves slowly and averages
/// apparent magnitude ~0.4, fainter than Vega.
#[derive(Debug, Clone)]
pub struct PlanetMask {
    nside: u32,
    planets: Vec<String>,
    fov: FieldOfView,
    template: PixelMap,
}

impl PlanetMask {
    pub fn new(
        nside: u32,
        mask_radius: Degrees,
        planets: Option<Vec<String>>,
    ) -> Result<Self, MaskError> {
        let grid = SkyGrid::new(nside)?;
        let fov = FieldOfView::new(&grid, mask_radius)?;
        let planets = planets.unwrap_or_else(|| {
            vec!["venus".to_string(), "mars".to_string(), "jupiter".to_string()]
        });
        Ok(PlanetMask {
            nside,
            planets,
            fov,
            template: vec![FEASIBLE; npix_for(nside)],
        })
    }
}

impl BasisFunction for PlanetMask {
    fn nside(&self) -> u32 {
        self.nside
    }

    fn label(&self) -> &'static str {
        "planet"
    }

    fn evaluate(&self, conditions: &Conditions) -> Result<PixelMap, MaskError> {
        conditions.ensure_npix(self.template.len())?;
        let mut result = self.template.clone();
        for planet in &conditions.planet_positions {
            if !self
                .planets
                .iter()
                .any(|name| name.eq_ignore_ascii_case(&planet.name))
            {
                continue;
            }
            for ipix in self.fov.query(planet.ra, planet.dec) {
                result[ipix] = MASKED;
            }
        }
        Ok(result)
    }
}

/// Mask pixels whose maximum-allowed-cloud value is at or below the current
/// bulk cloud measurement.
#[derive(Debug, Clone)]
pub struct BulkCloudMask {
    nside: u32,
    /// Per-pixel ceiling on acceptable cloud fraction.
    max_cloud_map: Vec<f64>,
    template: PixelMap,
}

impl BulkCloudMask {
    /// `max_cloud_map` defaults to a uniform map at `max_val` when omitted.
    pub fn new(
        nside: u32,
        max_cloud_map: Option<Vec<f64>>,
        max_val: f64,
    ) -> Result<Self, MaskError> {
        SkyGrid::new(nside)?;
        let npix = npix_for(nside);
        if !(0.0..=1.0).contains(&max_val) {
            return Err(MaskError::config(format!(
                "max cloud value {max_val} out of range [0, 1]"
            )));
        }
        let max_cloud_map = match max_cloud_map {
            Some(map) => {
                if map.len() != npix {
                    return Err(MaskError::config(format!(
                        "max cloud map has {} entries, expected {npix}",
                        map.len()
                    )));
                }
                map
            }
            None => vec![max_val; npix],
        };
        Ok(BulkCloudMask {
            nside,
            max_cloud_map,
            template: vec![FEASIBLE; npix],
        })
    }
}

impl BasisFunction for BulkCloudMask {
    fn nside(&self) -> u32 {
        self.nside
    }

    fn label(&self) -> &'static str {
        "bulk_cloud"
    }

    fn evaluate(&self, conditions: &Conditions) -> Result<PixelMap, MaskError> {
        conditions.ensure_npix(self.template.len())?;
        let mut result = self.template.clone();
        let bulk = Rounded::new(conditions.bulk_cloud);
        for (value, &ceiling) in result.iter_mut().zip(&self.max_cloud_map) {
            if Rounded::new(ceiling) <= bulk {
                *value = MASKED;
            }
        }
        Ok(result)
    }

    fn recompute_on_new_observation(&self) -> bool {
        false
    }
}

/// Mask pixels whose azimuth falls strictly inside an open interval.
///
/// The interval is on the plain numeric line: with `az_min > az_max` no
/// azimuth satisfies `min < az < max` and the mask removes nothing. Use
/// [`AltAzShadowMask`] for ranges that wrap the 0/360 seam.
#[derive(Debug, Clone)]
pub struct AzimuthMask {
    nside: u32,
    az_min: f64,
    az_max: f64,
    template: PixelMap,
}

impl AzimuthMask {
    pub fn new(nside: u32, az_min: Degrees, az_max: Degrees) -> Result<Self, MaskError> {
        SkyGrid::new(nside)?;
        validate_az_range(az_min, az_max)?;
        Ok(AzimuthMask {
            nside,
            az_min: to_rad(az_min),
            az_max: to_rad(az_max),
            template: vec![FEASIBLE; npix_for(nside)],
        })
    }
}

impl BasisFunction for AzimuthMask {
    fn nside(&self) -> u32 {
        self.nside
    }

    fn label(&self) -> &'static str {
        "azimuth"
    }

    fn evaluate(&self, conditions: &Conditions) -> Result<PixelMap, MaskError> {
        conditions.ensure_npix(self.template.len())?;
        let mut result = self.template.clone();
        let lo = Rounded::new(self.az_min);
        let hi = Rounded::new(self.az_max);
        for (value, &az) in result.iter_mut().zip(&conditions.az) {
            let a = Rounded::new(az);
            if a > lo && a < hi {
                *value = MASKED;
            }
        }
        Ok(result)
    }
}

/// Mask altitude/azimuth limits, extended so a pointing chosen now is still
/// legal `shadow_minutes` later.
///
/// The allowed altitude band is the intersection of the configured band and
/// the telescope's hardware limits (hardware shrunk inward by `pad` on each
/// side); a pixel must sit inside it both now and at the projected time.
/// Azimuth is tested the same way against both the configured range and the
/// padded hardware range, on the circular domain: a range with
/// `min_az > max_az` wraps the 0/360 seam, and ranges spanning a full
/// circle impose no restriction. A hardware band that closes to nothing
/// after padding masks the whole sky; that is a caller error and is not
/// corrected here.
#[derive(Debug, Clone)]
pub struct AltAzShadowMask {
    nside: u32,
    min_alt: f64,
    max_alt: f64,
    min_az: f64,
    max_az: f64,
    /// Look-ahead interval, days.
    shadow_time: Quantity<Day>,
    /// Slew/pointing tolerance applied to hardware limits, radians.
    pad: f64,
    template: PixelMap,
}

impl AltAzShadowMask {
    pub fn new(
        nside: u32,
        min_alt: Degrees,
        max_alt: Degrees,
        min_az: Degrees,
        max_az: Degrees,
        shadow_minutes: Minutes,
        pad: Degrees,
    ) -> Result<Self, MaskError> {
        SkyGrid::new(nside)?;
        validate_alt_band(min_alt, max_alt)?;
        validate_az_range(min_az, max_az)?;
        if shadow_minutes.value() < 0.0 {
            return Err(MaskError::config(format!(
                "shadow interval {} minutes is negative",
                shadow_minutes.value()
            )));
        }
        if pad.value() < 0.0 {
            return Err(MaskError::config(format!(
                "pad {} degrees is negative",
                pad.value()
            )));
        }
        Ok(AltAzShadowMask {
            nside,
            min_alt: to_rad(min_alt),
            max_alt: to_rad(max_alt),
            min_az: to_rad(min_az),
            max_az: to_rad(max_az),
            shadow_time: shadow_minutes.to::<Day>(),
            pad: to_rad(pad),
            template: vec![MASKED; npix_for(nside)],
        })
    }

    /// Circular-range membership: `az` lies within `span` of `origin`,
    /// measured forward around the circle.
    fn in_span(az: f64, origin: f64, span: f64) -> bool {
        Rounded::new(wrap_tau(az - origin)) <= Rounded::new(span)
    }
}

impl BasisFunction for AltAzShadowMask {
    fn nside(&self) -> u32 {
        self.nside
    }

    fn label(&self) -> &'static str {
        "alt_az_shadow"
    }

    fn evaluate(&self, conditions: &Conditions) -> Result<PixelMap, MaskError> {
        let npix = self.template.len();
        conditions.ensure_npix(npix)?;
        let mut result = self.template.clone();

        let (future_alt, future_az) = conditions.future_alt_az(conditions.mjd + self.shadow_time);

        // Tighter bound wins on each side; hardware limits carry the pad.
        let min_alt = Rounded::new((conditions.tel_alt_min + self.pad).max(self.min_alt));
        let max_alt = Rounded::new((conditions.tel_alt_max - self.pad).min(self.max_alt));
        if min_alt > max_alt {
            debug!(
                "alt_az_shadow: padded altitude window is empty, whole sky masked"
            );
        }

        // A range numerically spanning a full circle imposes no restriction;
        // the quantized keys make the test exact.
        let tau_key = Rounded::new(TAU).key();
        let hw_open =
            Rounded::new(conditions.tel_az_max).key() - Rounded::new(conditions.tel_az_min).key()
                >= tau_key;
        let own_open = Rounded::new(self.max_az).key() - Rounded::new(self.min_az).key() >= tau_key;
        let hw_origin = conditions.tel_az_min + self.pad;
        let hw_span = wrap_tau(conditions.tel_az_max - conditions.tel_az_min) - 2.0 * self.pad;
        let own_span = wrap_tau(self.max_az - self.min_az);

        for i in 0..npix {
            let now = Rounded::new(conditions.alt[i]);
            let later = Rounded::new(future_alt[i]);
            if now < min_alt || now > max_alt || later < min_alt || later > max_alt {
                continue;
            }
            let hw_ok = hw_open
                || (Self::in_span(conditions.az[i], hw_origin, hw_span)
                    && Self::in_span(future_az[i], hw_origin, hw_span));
            let own_ok = own_open
                || (Self::in_span(conditions.az[i], self.min_az, own_span)
                    && Self::in_span(future_az[i], self.min_az, own_span));
            if hw_ok && own_ok {
                result[i] = FEASIBLE;
            }
        }
        Ok(result)
    }
}

fn validate_alt_band(min_alt: Degrees, max_alt: Degrees) -> Result<(), MaskError> {
    if min_alt.value() < -90.0 || max_alt.value() > 90.0 {
        return Err(MaskError::config(format!(
            "altitude band [{}, {}] out of range [-90, 90] degrees",
            min_alt.value(),
            max_alt.value()
        )));
    }
    if min_alt.value() >= max_alt.value() {
        return Err(MaskError::config(format!(
            "altitude band inverted: min {} >= max {}",
            min_alt.value(),
            max_alt.value()
        )));
    }
    Ok(())
}

// Azimuth is circular, so `min > max` is a legal range crossing the 0/360
// seam; only the absolute bounds are checked.
fn validate_az_range(az_min: Degrees, az_max: Degrees) -> Result<(), MaskError> {
    for az in [az_min, az_max] {
        if !(0.0..=360.0).contains(&az.value()) {
            return Err(MaskError::config(format!(
                "azimuth {} out of range [0, 360] degrees",
                az.value()
            )));
        }
    }
    Ok(())
}
