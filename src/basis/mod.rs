//! Basis functions: composable per-pixel constraint evaluators.
//!
//! Each basis function scores every pixel of the sky grid against one
//! feasibility rule and returns a [`PixelMap`]. The convention is uniform
//! across the crate: `0.0` marks a feasible pixel and `f64::NAN` marks a
//! masked one, so maps from independently-authored functions compose by
//! elementwise product without any sentinel translation — a single masked
//! vote poisons the pixel, and agreement stays at exactly zero.
//!
//! Concrete masks live in [`masks`]; [`area_check::AreaCheckMask`] combines a
//! stack of them and gates on remaining sky area.

pub mod area_check;
pub mod masks;

use crate::error::MaskError;
use crate::models::conditions::Conditions;

/// One value per sky pixel; `0.0` = feasible, NaN = masked.
pub type PixelMap = Vec<f64>;

/// A per-pixel constraint evaluator.
///
/// Implementations hold immutable configuration and a precomputed template
/// array; `evaluate` copies the template, so repeated calls never observe
/// each other. Everything takes `&self` with no interior mutability, which
/// makes a stack of functions safe to evaluate concurrently against one
/// immutable snapshot.
pub trait BasisFunction: Send + Sync {
    /// Grid resolution this function was configured for.
    fn nside(&self) -> u32;

    /// Short stable name used in logs and reports.
    fn label(&self) -> &'static str;

    /// Produce the per-pixel map for this snapshot.
    ///
    /// Fails only on a snapshot contract violation (array length vs the
    /// configured grid); constraint outcomes are expressed in the map, never
    /// as errors.
    fn evaluate(&self, conditions: &Conditions) -> Result<PixelMap, MaskError>;

    /// Cheap pre-check: can this function already certify infeasibility from
    /// summary conditions, without materializing the whole map? Default:
    /// nothing to certify.
    fn check_feasibility(&self, conditions: &Conditions) -> Result<bool, MaskError> {
        let _ = conditions;
        Ok(true)
    }

    /// Hint to the upstream scheduler: can this function's output change as a
    /// result of the most recent completed observation? Masks driven purely
    /// by slow-moving environment report `false`. Consumed outside this
    /// subsystem.
    fn recompute_on_new_observation(&self) -> bool {
        true
    }
}

/// Pixel count for a mask's template, from its configured nside.
pub(crate) fn npix_for(nside: u32) -> usize {
    12 * (nside as usize) * (nside as usize)
}
