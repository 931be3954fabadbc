//! Fixed equal-area sky discretization (HEALPix, ring ordering).
//!
//! The masking subsystem only consumes the grid contract: pixel count, pixel
//! area, and pixel-center lookup. `npix = 12 * nside^2`; index `i` refers to
//! the same sky pixel for the lifetime of a resolution, so per-pixel arrays
//! from different producers line up by construction.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::error::GridError;

/// Equal-area sky grid at a fixed resolution parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkyGrid {
    nside: u32,
}

impl SkyGrid {
    /// Build a grid. `nside` must be a positive power of two.
    pub fn new(nside: u32) -> Result<Self, GridError> {
        if nside == 0 || !nside.is_power_of_two() {
            return Err(GridError::BadNside(nside));
        }
        Ok(SkyGrid { nside })
    }

    /// The resolution parameter.
    pub fn nside(&self) -> u32 {
        self.nside
    }

    /// Total pixel count, `12 * nside^2`.
    pub fn npix(&self) -> usize {
        12 * (self.nside as usize) * (self.nside as usize)
    }

    /// Area of one pixel in square degrees. All pixels share the same area.
    pub fn pixel_area_deg2(&self) -> f64 {
        let sphere_deg2 = 4.0 * PI * (180.0 / PI) * (180.0 / PI);
        sphere_deg2 / self.npix() as f64
    }

    /// Center of pixel `ipix` as `(ra, dec)` in radians, ring ordering.
    pub fn pixel_center(&self, ipix: usize) -> Result<(f64, f64), GridError> {
        let npix = self.npix();
        if ipix >= npix {
            return Err(GridError::PixelOutOfRange { ipix, npix });
        }

        let nside = self.nside as u64;
        let pix = ipix as u64;
        let npix = npix as u64;
        let ncap = 2 * nside * (nside - 1);

        let (z, phi) = if pix < ncap {
            // North polar cap.
            let iring = (1 + isqrt(1 + 2 * pix)) >> 1;
            let iphi = (pix + 1) - 2 * iring * (iring - 1);
            let z = 1.0 - (iring * iring) as f64 / (3.0 * (nside * nside) as f64);
            let phi = (iphi as f64 - 0.5) * FRAC_PI_2 / iring as f64;
            (z, phi)
        } else if pix < npix - ncap {
            // Equatorial belt.
            let ip = pix - ncap;
            let iring = ip / (4 * nside) + nside;
            let iphi = ip % (4 * nside) + 1;
            // Ring phase: odd rings are offset by half a pixel.
            let fodd = if (iring + nside) & 1 == 1 { 1.0 } else { 0.5 };
            let z = 2.0 * (2 * nside as i64 - iring as i64) as f64 / (3.0 * nside as f64);
            let phi = (iphi as f64 - fodd) * PI / (2.0 * nside as f64);
            (z, phi)
        } else {
            // South polar cap, counted from the south pole.
            let ip = npix - pix;
            let iring = (1 + isqrt(2 * ip - 1)) >> 1;
            let iphi = 4 * iring + 1 - (ip - 2 * iring * (iring - 1));
            let z = -1.0 + (iring * iring) as f64 / (3.0 * (nside * nside) as f64);
            let phi = (iphi as f64 - 0.5) * FRAC_PI_2 / iring as f64;
            (z, phi)
        };

        Ok((phi, z.clamp(-1.0, 1.0).asin()))
    }

    /// All pixel centers as parallel `(ra, dec)` arrays.
    pub fn pixel_centers(&self) -> (Vec<f64>, Vec<f64>) {
        let npix = self.npix();
        let mut ra = Vec::with_capacity(npix);
        let mut dec = Vec::with_capacity(npix);
        for ipix in 0..npix {
            // In-range by construction of the loop.
            let (r, d) = self
                .pixel_center(ipix)
                .unwrap_or_else(|_| unreachable!("ipix bounded by npix"));
            ra.push(r);
            dec.push(d);
        }
        (ra, dec)
    }
}

/// Integer square root, exact for the pixel-index magnitudes used here.
fn isqrt(v: u64) -> u64 {
    let mut r = (v as f64).sqrt() as u64;
    while (r + 1) * (r + 1) <= v {
        r += 1;
    }
    while r * r > v {
        r -= 1;
    }
    r
}
