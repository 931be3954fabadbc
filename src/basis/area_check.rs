//! Aggregate feasibility over a stack of masking functions.

use log::debug;
use serde::Serialize;

use crate::basis::{npix_for, BasisFunction, PixelMap};
use crate::error::MaskError;
use crate::models::conditions::Conditions;
use crate::models::grid::SkyGrid;

/// Combines a stack of masking functions into one feasibility verdict.
///
/// `evaluate` multiplies the individual maps together, so a pixel survives
/// only if every function left it at `0.0`; a NaN anywhere propagates.
/// `check_feasibility` then requires the surviving sky area to reach
/// `min_area_deg2`.
pub struct AreaCheckMask {
    nside: u32,
    masks: Vec<Box<dyn BasisFunction>>,
    min_area_deg2: f64,
    pixel_area_deg2: f64,
    template: PixelMap,
}

impl AreaCheckMask {
    pub fn new(
        nside: u32,
        masks: Vec<Box<dyn BasisFunction>>,
        min_area_deg2: f64,
    ) -> Result<Self, MaskError> {
        let grid = SkyGrid::new(nside)?;
        if min_area_deg2 < 0.0 {
            return Err(MaskError::config(format!(
                "minimum area {min_area_deg2} deg^2 is negative"
            )));
        }
        for mask in &masks {
            if mask.nside() != nside {
                return Err(MaskError::config(format!(
                    "mask '{}' built for nside {}, aggregate expects {}",
                    mask.label(),
                    mask.nside(),
                    nside
                )));
            }
        }
        Ok(AreaCheckMask {
            nside,
            masks,
            min_area_deg2,
            pixel_area_deg2: grid.pixel_area_deg2(),
            template: vec![0.0; npix_for(nside)],
        })
    }

    pub fn masks(&self) -> &[Box<dyn BasisFunction>] {
        &self.masks
    }

    /// Area in square degrees of the pixels left unmasked in `map`.
    pub fn unmasked_area_deg2(&self, map: &[f64]) -> f64 {
        let count = map.iter().filter(|v| !v.is_nan()).count();
        count as f64 * self.pixel_area_deg2
    }

    /// Evaluate every mask and report per-mask unmasked areas alongside the
    /// combined verdict. Unlike [`check_feasibility`], this never stops
    /// early, so it shows which function in the stack is the binding one.
    ///
    /// [`check_feasibility`]: BasisFunction::check_feasibility
    pub fn diagnose(&self, conditions: &Conditions) -> Result<FeasibilityReport, MaskError> {
        let mut entries = Vec::with_capacity(self.masks.len());
        let mut combined = self.template.clone();
        for mask in &self.masks {
            let map = mask.evaluate(conditions)?;
            entries.push(MaskReport {
                label: mask.label().to_string(),
                unmasked_area_deg2: self.unmasked_area_deg2(&map),
            });
            for (acc, value) in combined.iter_mut().zip(&map) {
                *acc *= value;
            }
        }
        let combined_area_deg2 = self.unmasked_area_deg2(&combined);
        Ok(FeasibilityReport {
            min_area_deg2: self.min_area_deg2,
            combined_area_deg2,
            feasible: combined_area_deg2 >= self.min_area_deg2,
            masks: entries,
        })
    }
}

impl std::fmt::Debug for AreaCheckMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AreaCheckMask")
            .field("nside", &self.nside)
            .field(
                "masks",
                &self.masks.iter().map(|m| m.label()).collect::<Vec<_>>(),
            )
            .field("min_area_deg2", &self.min_area_deg2)
            .field("pixel_area_deg2", &self.pixel_area_deg2)
            .finish()
    }
}

impl BasisFunction for AreaCheckMask {
    fn nside(&self) -> u32 {
        self.nside
    }

    fn label(&self) -> &'static str {
        "area_check"
    }

    fn evaluate(&self, conditions: &Conditions) -> Result<PixelMap, MaskError> {
        conditions.ensure_npix(self.template.len())?;
        let mut combined = self.template.clone();
        for mask in &self.masks {
            let map = mask.evaluate(conditions)?;
            for (acc, value) in combined.iter_mut().zip(&map) {
                *acc *= value;
            }
        }
        Ok(combined)
    }

    /// Fail-fast area gate: each mask's own feasibility check runs first,
    /// then masks are applied in order and the check returns false as soon
    /// as the surviving area can no longer reach the minimum.
    fn check_feasibility(&self, conditions: &Conditions) -> Result<bool, MaskError> {
        conditions.ensure_npix(self.template.len())?;
        for mask in &self.masks {
            if !mask.check_feasibility(conditions)? {
                debug!("mask '{}' reports infeasible on its own", mask.label());
                return Ok(false);
            }
        }
        let mut combined = self.template.clone();
        for mask in &self.masks {
            let map = mask.evaluate(conditions)?;
            for (acc, value) in combined.iter_mut().zip(&map) {
                *acc *= value;
            }
            let area = self.unmasked_area_deg2(&combined);
            if area < self.min_area_deg2 {
                debug!(
                    "area check failed after '{}': {:.1} deg^2 < {:.1} deg^2",
                    mask.label(),
                    area,
                    self.min_area_deg2
                );
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Per-tick diagnostic produced by [`AreaCheckMask::diagnose`].
#[derive(Debug, Clone, Serialize)]
pub struct FeasibilityReport {
    pub min_area_deg2: f64,
    pub combined_area_deg2: f64,
    pub feasible: bool,
    pub masks: Vec<MaskReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MaskReport {
    pub label: String,
    pub unmasked_area_deg2: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::masks::{SolarElongationLimitMask, ZenithMask};
    use crate::models::conditions::GeographicLocation;
    use crate::models::time::ModifiedJulianDate;
    use qtty::Degrees;

    fn site_conditions(nside: u32) -> Conditions {
        let grid = SkyGrid::new(nside).unwrap();
        let location = GeographicLocation::new(-30.2444, -70.7494, Some(2650.0)).unwrap();
        Conditions::for_site(&grid, &location, ModifiedJulianDate::new(60676.0), 0.0, 0.0)
    }

    fn zenith(nside: u32) -> Box<dyn BasisFunction> {
        Box::new(ZenithMask::new(nside, Degrees::new(20.0), Degrees::new(82.0)).unwrap())
    }

    #[test]
    fn test_empty_stack_is_whole_sky() {
        let agg = AreaCheckMask::new(8, Vec::new(), 1000.0).unwrap();
        let cond = site_conditions(8);
        let map = agg.evaluate(&cond).unwrap();
        assert!(map.iter().all(|v| *v == 0.0));
        assert!(agg.check_feasibility(&cond).unwrap());
    }

    #[test]
    fn test_combination_is_union_of_masked_sets() {
        let cond = site_conditions(8);
        let elong: Box<dyn BasisFunction> =
            Box::new(SolarElongationLimitMask::new(8, Degrees::new(120.0)).unwrap());

        let zenith_map = zenith(8).evaluate(&cond).unwrap();
        let elong_map = elong.evaluate(&cond).unwrap();

        let agg = AreaCheckMask::new(8, vec![zenith(8), elong], 0.0).unwrap();
        let combined = agg.evaluate(&cond).unwrap();

        for i in 0..combined.len() {
            let expect_masked = zenith_map[i].is_nan() || elong_map[i].is_nan();
            assert_eq!(
                combined[i].is_nan(),
                expect_masked,
                "pixel {i} combination mismatch"
            );
            if !expect_masked {
                assert_eq!(combined[i], 0.0);
            }
        }
    }

    #[test]
    fn test_area_gate_exact_boundary_passes() {
        let grid = SkyGrid::new(8).unwrap();
        let cond = site_conditions(8);
        let agg = AreaCheckMask::new(8, vec![zenith(8)], 0.0).unwrap();
        let map = agg.evaluate(&cond).unwrap();
        let unmasked = map.iter().filter(|v| !v.is_nan()).count();
        let exact_area = unmasked as f64 * grid.pixel_area_deg2();

        // Gate equal to the available area: >= passes.
        let at_boundary = AreaCheckMask::new(8, vec![zenith(8)], exact_area).unwrap();
        assert!(at_boundary.check_feasibility(&cond).unwrap());

        // One pixel more than available: fails.
        let over = AreaCheckMask::new(
            8,
            vec![zenith(8)],
            exact_area + grid.pixel_area_deg2(),
        )
        .unwrap();
        assert!(!over.check_feasibility(&cond).unwrap());
    }

    #[test]
    fn test_diagnose_reports_every_mask() {
        let cond = site_conditions(8);
        let elong: Box<dyn BasisFunction> =
            Box::new(SolarElongationLimitMask::new(8, Degrees::new(120.0)).unwrap());
        let agg = AreaCheckMask::new(8, vec![zenith(8), elong], 1000.0).unwrap();

        let report = agg.diagnose(&cond).unwrap();
        assert_eq!(report.masks.len(), 2);
        assert_eq!(report.masks[0].label, "zenith");
        assert_eq!(report.masks[1].label, "solar_elongation_limit");
        for entry in &report.masks {
            assert!(entry.unmasked_area_deg2 >= report.combined_area_deg2);
        }
        assert_eq!(
            report.feasible,
            report.combined_area_deg2 >= report.min_area_deg2
        );

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"combined_area_deg2\""));
    }

    #[test]
    fn test_nside_mismatch_rejected() {
        let wrong = zenith(16);
        let err = AreaCheckMask::new(8, vec![wrong], 0.0).unwrap_err();
        assert!(matches!(err, MaskError::Config { .. }));
    }
}
