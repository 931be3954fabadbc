//! Per-tick environment snapshot.
//!
//! A [`Conditions`] value describes telescope and sky state at one scheduling
//! instant: per-pixel pointing geometry, moon and planet positions, hardware
//! travel limits, and the bulk cloud measurement. It is read-only from the
//! masking subsystem's perspective and must stay internally consistent for
//! the duration of one evaluation tick — every array describes the same
//! instant on the same grid.
//!
//! Snapshots can be assembled field by field by an upstream telemetry source,
//! or derived from site geometry with [`Conditions::for_site`].

use std::f64::consts::{FRAC_PI_2, TAU};

use qtty::{Degrees, Radian};

use crate::algorithms::sphere::{
    angular_separation, hadec_to_alt_az, local_sidereal_time, wrap_tau, SIDEREAL_RATE,
};
use crate::error::MaskError;
use crate::models::grid::SkyGrid;
use crate::models::time::ModifiedJulianDate;

/// Observer location on the Earth's surface.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeographicLocation {
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Longitude in degrees, positive east.
    pub longitude: f64,
    /// Elevation above sea level in meters.
    pub elevation_m: Option<f64>,
}

impl GeographicLocation {
    /// Create a location, validating coordinate ranges.
    pub fn new(latitude: f64, longitude: f64, elevation_m: Option<f64>) -> Result<Self, MaskError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(MaskError::config(format!(
                "latitude {latitude} out of range [-90, 90]"
            )));
        }
        if !(-180.0..=360.0).contains(&longitude) {
            return Err(MaskError::config(format!(
                "longitude {longitude} out of range [-180, 360]"
            )));
        }
        Ok(GeographicLocation {
            latitude,
            longitude,
            elevation_m,
        })
    }
}

/// Current equatorial position of a named solar-system body.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlanetPosition {
    pub name: String,
    /// Right ascension, radians.
    pub ra: f64,
    /// Declination, radians.
    pub dec: f64,
}

/// Environment state at one scheduling instant.
///
/// All per-pixel arrays are in radians and indexed by grid pixel; lengths must
/// equal the grid's pixel count ([`Conditions::ensure_npix`] enforces this at
/// each mask's point of use, since a truncated array would silently mis-mask
/// the sky).
#[derive(Debug, Clone)]
pub struct Conditions {
    /// Grid resolution the arrays were computed for.
    pub nside: u32,
    /// Evaluation instant.
    pub mjd: ModifiedJulianDate,
    /// Per-pixel altitude.
    pub alt: Vec<f64>,
    /// Per-pixel azimuth, east of north, `[0, 2π)`.
    pub az: Vec<f64>,
    /// Pixel-center right ascension.
    pub ra: Vec<f64>,
    /// Pixel-center declination.
    pub dec: Vec<f64>,
    /// Per-pixel angular distance from the sun.
    pub solar_elongation: Vec<f64>,
    /// Per-pixel local hour angle, `[0, 2π)`.
    pub hour_angle: Vec<f64>,
    /// Moon altitude.
    pub moon_alt: f64,
    /// Moon azimuth.
    pub moon_az: f64,
    /// Positions of the bright planets tracked this tick.
    pub planet_positions: Vec<PlanetPosition>,
    /// Telescope altitude travel limits.
    pub tel_alt_min: f64,
    pub tel_alt_max: f64,
    /// Telescope azimuth travel limits.
    pub tel_az_min: f64,
    pub tel_az_max: f64,
    /// Scalar bulk cloud fraction, `[0, 1]`.
    pub bulk_cloud: f64,
    /// Observer latitude, radians. Needed to project alt/az forward.
    pub site_latitude: f64,
    /// Local sidereal time at `mjd`, radians.
    pub lst: f64,
}

impl Conditions {
    /// Derive a snapshot from site geometry and the sun's current position.
    ///
    /// Computes per-pixel hour angle, alt/az, and solar elongation from the
    /// grid's pixel centers. Moon, planets, limits, and cloud start at
    /// permissive defaults and can be adjusted with the `with_*` builders.
    pub fn for_site(
        grid: &SkyGrid,
        location: &GeographicLocation,
        mjd: ModifiedJulianDate,
        sun_ra: f64,
        sun_dec: f64,
    ) -> Conditions {
        let latitude = Degrees::new(location.latitude).to::<Radian>().value();
        let longitude = Degrees::new(location.longitude).to::<Radian>().value();
        let lst = local_sidereal_time(mjd.value(), longitude);

        let (ra, dec) = grid.pixel_centers();
        let npix = ra.len();
        let mut alt = Vec::with_capacity(npix);
        let mut az = Vec::with_capacity(npix);
        let mut hour_angle = Vec::with_capacity(npix);
        let mut solar_elongation = Vec::with_capacity(npix);
        for i in 0..npix {
            let ha = wrap_tau(lst - ra[i]);
            let (a, z) = hadec_to_alt_az(ha, dec[i], latitude);
            alt.push(a);
            az.push(z);
            hour_angle.push(ha);
            solar_elongation.push(angular_separation(ra[i], dec[i], sun_ra, sun_dec));
        }

        Conditions {
            nside: grid.nside(),
            mjd,
            alt,
            az,
            ra,
            dec,
            solar_elongation,
            hour_angle,
            moon_alt: -FRAC_PI_2,
            moon_az: 0.0,
            planet_positions: Vec::new(),
            tel_alt_min: -FRAC_PI_2,
            tel_alt_max: FRAC_PI_2,
            tel_az_min: 0.0,
            tel_az_max: TAU,
            bulk_cloud: 0.0,
            site_latitude: latitude,
            lst,
        }
    }

    /// Set the moon's horizontal position.
    pub fn with_moon(mut self, alt: Degrees, az: Degrees) -> Self {
        self.moon_alt = alt.to::<Radian>().value();
        self.moon_az = az.to::<Radian>().value();
        self
    }

    /// Set the tracked planet positions.
    pub fn with_planets(mut self, planets: Vec<PlanetPosition>) -> Self {
        self.planet_positions = planets;
        self
    }

    /// Set the telescope's hardware travel limits.
    pub fn with_telescope_limits(
        mut self,
        alt_min: Degrees,
        alt_max: Degrees,
        az_min: Degrees,
        az_max: Degrees,
    ) -> Self {
        self.tel_alt_min = alt_min.to::<Radian>().value();
        self.tel_alt_max = alt_max.to::<Radian>().value();
        self.tel_az_min = az_min.to::<Radian>().value();
        self.tel_az_max = az_max.to::<Radian>().value();
        self
    }

    /// Set the scalar bulk cloud fraction.
    pub fn with_bulk_cloud(mut self, fraction: f64) -> Self {
        self.bulk_cloud = fraction;
        self
    }

    /// Project per-pixel alt/az forward to a (usually future) instant.
    ///
    /// Re-derives the horizontal coordinates of every pixel center after
    /// advancing local sidereal time at the sidereal rate. A projection at or
    /// before `self.mjd` is not an error: it returns the current geometry
    /// unchanged, so a zero-width shadow window degenerates to the plain
    /// alt/az test.
    pub fn future_alt_az(&self, mjd: ModifiedJulianDate) -> (Vec<f64>, Vec<f64>) {
        let dt = (mjd - self.mjd).value();
        if dt <= 0.0 {
            return (self.alt.clone(), self.az.clone());
        }
        let lst = wrap_tau(self.lst + dt * TAU * SIDEREAL_RATE);
        let npix = self.ra.len();
        let mut alt = Vec::with_capacity(npix);
        let mut az = Vec::with_capacity(npix);
        for i in 0..npix {
            let ha = wrap_tau(lst - self.ra[i]);
            let (a, z) = hadec_to_alt_az(ha, self.dec[i], self.site_latitude);
            alt.push(a);
            az.push(z);
        }
        (alt, az)
    }

    /// Verify every per-pixel array matches the expected pixel count.
    pub fn ensure_npix(&self, expected: usize) -> Result<(), MaskError> {
        let arrays: [(&'static str, usize); 6] = [
            ("alt", self.alt.len()),
            ("az", self.az.len()),
            ("ra", self.ra.len()),
            ("dec", self.dec.len()),
            ("solar_elongation", self.solar_elongation.len()),
            ("hour_angle", self.hour_angle.len()),
        ];
        for (what, actual) in arrays {
            if actual != expected {
                return Err(MaskError::Snapshot {
                    what,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }
}
