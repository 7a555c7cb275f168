//! # Engine Error Types
//!
//! Failures an [`IntegrationEngine`](crate::IntegrationEngine) can report.
//! Workers turn each of these into an operator-facing failure message and
//! keep running, so an `EngineError` never terminates anything beyond the
//! computation that produced it.
//!
//! ## Usage Example
//!
//! ```rust
//! use quadrant_api::errors::EngineError;
//!
//! fn describe(error: &EngineError) -> &'static str {
//!     match error {
//!         EngineError::InvalidTolerance(_) => "fix the tolerance",
//!         EngineError::NonFiniteBound { .. } => "fix the bounds",
//!         _ => "integrand misbehaved",
//!     }
//! }
//!
//! assert_eq!(describe(&EngineError::InvalidTolerance(0.0)), "fix the tolerance");
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The requested tolerance is zero, negative or NaN.
    #[error("Tolerance must be a positive number, got {0}")]
    InvalidTolerance(f64),

    /// One of the bounds is infinite or NaN.
    #[error("Integration bounds must be finite, got [{lower}, {upper}]")]
    NonFiniteBound { lower: f64, upper: f64 },

    /// The integrand produced an infinite or NaN value.
    #[error("Integrand is not finite at x = {x}")]
    NonFiniteValue { x: f64 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
