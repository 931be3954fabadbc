//! # Skymask
//!
//! Sky feasibility masking for survey-telescope scheduling.
//!
//! Each scheduler tick a set of masking functions decides which portion of
//! the sky is worth considering at all: pixels too close to the moon, outside
//! the telescope's travel limits, behind clouds, or about to set below the
//! altitude limit are struck out before any ranking logic runs. Every
//! function produces a per-pixel map over a HEALPix grid where `0.0` means
//! feasible and NaN means masked, so downstream code combines maps by plain
//! multiplication.
//!
//! ## Architecture
//!
//! - [`models`]: the sky grid, conditions snapshot, and MJD time handling
//! - [`basis`]: the [`BasisFunction`] trait, the individual masks, and the
//!   aggregate area check
//! - [`fov`]: pixel lookup within an angular radius of a sky position
//! - [`algorithms`]: deterministic quantized comparison and spherical
//!   geometry helpers
//! - [`config`]: TOML-driven construction of a whole mask stack
//!
//! ## Determinism
//!
//! Threshold comparisons go through [`algorithms::Rounded`], which quantizes
//! floats onto an integer lattice before comparing. Two angle values that
//! differ only by trigonometric round-off land on the same lattice point, so
//! the masked set is reproducible across platforms and across repeated
//! evaluations of the same snapshot.
//!
//! ## Example
//!
//! ```
//! use skymask::basis::BasisFunction;
//! use skymask::config::MaskStackConfig;
//! use skymask::models::{Conditions, GeographicLocation, ModifiedJulianDate, SkyGrid};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = MaskStackConfig::from_toml_str(
//!     r#"
//!     nside = 32
//!     min_area_deg2 = 1000.0
//!
//!     [zenith]
//!     min_alt_deg = 20.0
//!     max_alt_deg = 82.0
//!     "#,
//! )?;
//! let stack = config.build()?;
//!
//! let grid = SkyGrid::new(32)?;
//! let site = GeographicLocation::new(-30.2444, -70.7494, Some(2650.0))?;
//! let conditions = Conditions::for_site(
//!     &grid,
//!     &site,
//!     ModifiedJulianDate::new(60676.0),
//!     0.0,
//!     0.0,
//! );
//!
//! if stack.check_feasibility(&conditions)? {
//!     let map = stack.evaluate(&conditions)?;
//!     let open = map.iter().filter(|v| !v.is_nan()).count();
//!     println!("{open} pixels available");
//! }
//! # Ok(())
//! # }
//! ```

pub mod algorithms;
pub mod basis;
pub mod config;
pub mod error;
pub mod fov;
pub mod models;

pub use basis::area_check::AreaCheckMask;
pub use basis::{BasisFunction, PixelMap};
pub use error::MaskError;
pub use fov::FieldOfView;
