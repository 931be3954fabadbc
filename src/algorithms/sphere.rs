//! Spherical geometry helpers.
//!
//! Small, allocation-free routines shared by the conditions snapshot, the
//! field-of-view index, and the moon/planet avoidance masks. Angles are
//! radians throughout; right ascension / azimuth are longitudes, declination /
//! altitude are latitudes.

use std::f64::consts::TAU;

/// Sidereal days per solar day. Used to advance local sidereal time when
/// projecting pointings forward for the shadow mask.
pub const SIDEREAL_RATE: f64 = 1.002_737_909_35;

/// Wrap an angle into `[0, 2π)`.
pub fn wrap_tau(angle: f64) -> f64 {
    angle.rem_euclid(TAU)
}

/// Angular separation between two directions, via the haversine form.
///
/// Stable for small separations where the plain spherical cosine rule loses
/// precision.
pub fn angular_separation(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let sdlon = ((lon2 - lon1) / 2.0).sin();
    let sdlat = ((lat2 - lat1) / 2.0).sin();
    let h = sdlat * sdlat + lat1.cos() * lat2.cos() * sdlon * sdlon;
    2.0 * h.sqrt().min(1.0).asin()
}

/// Unit vector for a direction given as (ra, dec) radians.
pub fn radec_to_xyz(ra: f64, dec: f64) -> [f64; 3] {
    let (sin_dec, cos_dec) = dec.sin_cos();
    let (sin_ra, cos_ra) = ra.sin_cos();
    [cos_dec * cos_ra, cos_dec * sin_ra, sin_dec]
}

/// Convert hour angle and declination to horizontal (alt, az) for an observer
/// at the given latitude. Azimuth is measured eastward from north, in
/// `[0, 2π)`.
pub fn hadec_to_alt_az(ha: f64, dec: f64, latitude: f64) -> (f64, f64) {
    let (sin_dec, cos_dec) = dec.sin_cos();
    let (sin_lat, cos_lat) = latitude.sin_cos();
    let sin_alt = (sin_dec * sin_lat + cos_dec * cos_lat * ha.cos()).clamp(-1.0, 1.0);
    let alt = sin_alt.asin();

    let cos_alt = alt.cos();
    let az = if cos_alt.abs() < 1e-12 {
        // At the pole of the horizontal system azimuth is degenerate.
        0.0
    } else {
        let cos_az = ((sin_dec - sin_alt * sin_lat) / (cos_alt * cos_lat)).clamp(-1.0, 1.0);
        let az = cos_az.acos();
        if ha.sin() > 0.0 {
            TAU - az
        } else {
            az
        }
    };
    (alt, wrap_tau(az))
}

/// Local sidereal time in radians from MJD and an east longitude.
///
/// Earth-rotation-angle approximation; adequate for feasibility masking,
/// where the comparator lattice is far coarser than the formula's error.
pub fn local_sidereal_time(mjd: f64, longitude: f64) -> f64 {
    let era = TAU * (0.779_057_273_264 + 1.002_737_811_911_354_4 * (mjd - 51544.5));
    wrap_tau(era + longitude)
}
