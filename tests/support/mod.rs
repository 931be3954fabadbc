//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use skymask::models::{Conditions, GeographicLocation, ModifiedJulianDate, SkyGrid};

/// Cerro Pachón.
pub fn test_site() -> GeographicLocation {
    GeographicLocation::new(-30.2444, -70.7494, Some(2650.0)).unwrap()
}

/// Snapshot derived from real site geometry at a fixed instant.
pub fn site_conditions(nside: u32) -> Conditions {
    let grid = SkyGrid::new(nside).unwrap();
    Conditions::for_site(
        &grid,
        &test_site(),
        ModifiedJulianDate::new(60676.0),
        0.0,
        0.0,
    )
}

/// Snapshot with every pixel at the same altitude and azimuth, real pixel
/// ra/dec, and permissive defaults everywhere else.
pub fn uniform_conditions(nside: u32, alt_deg: f64, az_deg: f64) -> Conditions {
    let grid = SkyGrid::new(nside).unwrap();
    let npix = grid.npix();
    let (ra, dec) = grid.pixel_centers();
    Conditions {
        nside,
        mjd: ModifiedJulianDate::new(60676.0),
        alt: vec![alt_deg.to_radians(); npix],
        az: vec![az_deg.to_radians(); npix],
        ra,
        dec,
        solar_elongation: vec![PI; npix],
        hour_angle: vec![0.0; npix],
        moon_alt: -FRAC_PI_2,
        moon_az: 0.0,
        planet_positions: Vec::new(),
        tel_alt_min: -FRAC_PI_2,
        tel_alt_max: FRAC_PI_2,
        tel_az_min: 0.0,
        tel_az_max: TAU,
        bulk_cloud: 0.0,
        site_latitude: (-30.2444_f64).to_radians(),
        lst: 0.0,
    }
}

pub fn masked_count(map: &[f64]) -> usize {
    map.iter().filter(|v| v.is_nan()).count()
}
