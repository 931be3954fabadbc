//! Field-of-view spatial index.
//!
//! Maps a target direction to the set of grid pixels whose centers fall
//! within a fixed angular radius. Pixel-center unit vectors are precomputed
//! at construction so each query is a trig-free dot-product sweep; the index
//! is read-only after construction and shares no state with its callers.
//! The planet-avoidance mask is the primary consumer.

use qtty::{Degrees, Radian};

use crate::algorithms::sphere::radec_to_xyz;
use crate::algorithms::Rounded;
use crate::error::MaskError;
use crate::models::grid::SkyGrid;

/// Pixel lookup within a fixed angular radius of a sky position.
#[derive(Debug, Clone)]
pub struct FieldOfView {
    /// Cosine of the query radius; membership is `dot >= cos_radius`.
    cos_radius: f64,
    /// Unit vectors of all pixel centers, ring ordering.
    centers: Vec<[f64; 3]>,
}

impl FieldOfView {
    /// Build an index over the grid's pixel centers.
    pub fn new(grid: &SkyGrid, radius: Degrees) -> Result<Self, MaskError> {
        let radius_deg = radius.value();
        if !(0.0..=180.0).contains(&radius_deg) {
            return Err(MaskError::config(format!(
                "field-of-view radius {radius_deg} out of range [0, 180] degrees"
            )));
        }
        let radius_rad = radius.to::<Radian>().value();
        let (ra, dec) = grid.pixel_centers();
        let centers = ra
            .iter()
            .zip(dec.iter())
            .map(|(&r, &d)| radec_to_xyz(r, d))
            .collect();
        Ok(FieldOfView {
            cos_radius: radius_rad.cos(),
            centers,
        })
    }

    /// Indices of pixels whose centers lie within the radius of `(ra, dec)`.
    pub fn query(&self, ra: f64, dec: f64) -> Vec<usize> {
        let target = radec_to_xyz(ra, dec);
        let threshold = Rounded::new(self.cos_radius);
        self.centers
            .iter()
            .enumerate()
            .filter(|(_, c)| {
                let dot = c[0] * target[0] + c[1] * target[1] + c[2] * target[2];
                Rounded::new(dot) >= threshold
            })
            .map(|(i, _)| i)
            .collect()
    }
}
