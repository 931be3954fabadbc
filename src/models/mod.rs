//! Core data model: sky grid, time scale, and the per-tick conditions
//! snapshot consumed by every masking function.

pub mod conditions;
pub mod grid;
pub mod time;

pub use conditions::{Conditions, GeographicLocation, PlanetPosition};
pub use grid::SkyGrid;
pub use time::ModifiedJulianDate;
