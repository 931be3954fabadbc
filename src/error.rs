//! Library error types.
//!
//! Two failure families exist in this crate: configuration rejected at
//! construction time (inverted thresholds, negative radii, bad grid
//! resolution), and conditions snapshots whose arrays do not match the grid
//! resolution a mask was built for. Neither is ever clamped or corrected
//! silently; evaluation itself is otherwise total.

use thiserror::Error;

/// Errors surfaced by mask construction and evaluation.
#[derive(Debug, Error)]
pub enum MaskError {
    /// Invalid configuration, rejected at construction time.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// A conditions snapshot array does not match the expected grid size.
    #[error("snapshot contract violation: {what} has {actual} entries, expected {expected}")]
    Snapshot {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Invalid sky grid parameters.
    #[error(transparent)]
    Grid(#[from] GridError),
}

impl MaskError {
    /// Shorthand for a configuration error with a formatted message.
    pub(crate) fn config(message: impl Into<String>) -> Self {
        MaskError::Config {
            message: message.into(),
        }
    }
}

/// Errors from the spherical pixel grid.
#[derive(Debug, Error)]
pub enum GridError {
    /// The resolution parameter must be a positive power of two.
    #[error("nside must be a positive power of two, got {0}")]
    BadNside(u32),

    /// A pixel index fell outside the grid.
    #[error("pixel index {ipix} out of range for grid with {npix} pixels")]
    PixelOutOfRange { ipix: usize, npix: usize },
}
