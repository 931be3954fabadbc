//! Deterministic floating-point comparison.
//!
//! Angles that should be identical can differ by representation error when
//! they are re-derived through different trigonometric paths (say, converting
//! degrees at construction time versus reading a precomputed radian array from
//! a snapshot). Near a threshold that error flips individual pixels in or out
//! of a mask depending on platform and optimization level. [`Rounded`]
//! removes the ambiguity: values are quantized onto a fixed integer lattice
//! before any relational comparison, so ordering is reproducible everywhere.
//!
//! All threshold comparisons in the masking functions wrap *both* operands in
//! [`Rounded`]; raw `f64` relational operators are never used on derived
//! angles.

/// Quantization scale: lattice steps per unit. At 1e5 steps per radian two
/// angles closer than ~2 arcseconds compare equal, comfortably below the
/// pixel scale of any practical grid resolution.
const SCALE: f64 = 1e5;

/// An `f64` quantized for deterministic ordering.
///
/// Construction is cheap and intended to be transient: wrap the two values
/// immediately before comparing and discard the wrappers afterwards.
///
/// ```
/// use skymask::algorithms::Rounded;
///
/// let a = Rounded::new(45.0_f64.to_radians());
/// let b = Rounded::new(std::f64::consts::FRAC_PI_4);
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rounded(i64);

impl Rounded {
    /// Quantize a value. NaN maps to the top of the order so comparisons
    /// against masked sentinels stay total instead of panicking; infinities
    /// saturate at the lattice extremes.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Rounded(i64::MAX);
        }
        // `as` saturates for out-of-range floats, which is the ordering we want
        // for +/- infinity.
        Rounded((value * SCALE).round() as i64)
    }

    /// The integer lattice key. Differences of keys are meaningful (the
    /// shadow mask uses them to test whether an azimuth span covers a full
    /// circle without a floating subtraction).
    pub fn key(self) -> i64 {
        self.0
    }
}

impl From<f64> for Rounded {
    fn from(value: f64) -> Self {
        Rounded::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{PI, TAU};

    #[test]
    fn test_rederived_angles_compare_equal() {
        // 82 degrees through two different conversion paths.
        let a = Rounded::new(82.0_f64.to_radians());
        let b = Rounded::new(82.0 * PI / 180.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_ordering_preserved_away_from_lattice() {
        assert!(Rounded::new(0.5) < Rounded::new(0.5001));
        assert!(Rounded::new(-0.2) < Rounded::new(0.0));
        assert!(Rounded::new(TAU) > Rounded::new(PI));
    }

    #[test]
    fn test_values_within_one_step_collapse() {
        // 1e-7 rad is far below the 1e-5 lattice step.
        let a = Rounded::new(1.0);
        let b = Rounded::new(1.0 + 1e-7);
        assert_eq!(a, b);
    }

    #[test]
    fn test_nan_sorts_above_everything() {
        let nan = Rounded::new(f64::NAN);
        assert!(nan > Rounded::new(f64::MAX / 1e10));
        assert!(nan > Rounded::new(TAU));
        assert_eq!(nan, Rounded::new(f64::NAN));
    }

    #[test]
    fn test_infinities_saturate() {
        assert!(Rounded::new(f64::INFINITY) > Rounded::new(1e12));
        assert!(Rounded::new(f64::NEG_INFINITY) < Rounded::new(-1e12));
    }

    #[test]
    fn test_key_differences() {
        let lo = Rounded::new(0.0);
        let hi = Rounded::new(TAU);
        let span = Rounded::new(TAU).key() - Rounded::new(0.0).key();
        assert_eq!(span, hi.key() - lo.key());
        assert!(span >= Rounded::new(TAU).key());
    }
}
