//! # Quadrant API
//!
//! Shared contracts for the Quadrant integration worker pool. The runtime
//! crate (`quadrant`) depends only on what is declared here when it talks to
//! an integration engine or describes a request, which keeps the engine
//! swappable and the request type free of runtime concerns.
//!
//! ## Core Components
//!
//! - **Requests**: [`PendingRequest`], an immutable `(lower, upper, tolerance)`
//!   triple tagged with a [`RequestId`]
//! - **Integrands**: the [`Integrand`] trait, implemented for plain closures
//!   and for [`NamedIntegrand`]
//! - **Engines**: the [`IntegrationEngine`] trait and its success value
//!   [`Integral`]
//! - **Errors**: [`EngineError`]
//!
//! ## Usage Example
//!
//! ```rust
//! use quadrant_api::{Integrand, IntegrationEngine, Integral, EngineError, PendingRequest};
//!
//! struct Midpoint;
//!
//! impl IntegrationEngine for Midpoint {
//!     fn integrate(
//!         &self,
//!         f: &dyn Integrand,
//!         lower: f64,
//!         upper: f64,
//!         _tolerance: f64,
//!     ) -> Result<Integral, EngineError> {
//!         let value = (upper - lower) * f.evaluate((lower + upper) / 2.0);
//!         Ok(Integral::new(value, f64::NAN, 1, 0))
//!     }
//! }
//!
//! let request = PendingRequest::new(0.0, 1.0, 1e-9);
//! let double = |x: f64| 2.0 * x;
//! let integral = Midpoint.integrate(&double, request.lower(), request.upper(), request.tolerance());
//! assert_eq!(integral.unwrap().value, 1.0);
//! ```
//!
//! ## Module Organization
//!
//! - [`request`]: request value types
//! - [`integrand`]: integrand functions
//! - [`engine`]: the integration engine contract
//! - [`errors`]: error types

pub mod engine;
pub mod errors;
pub mod integrand;
pub mod request;

pub use engine::{IntegrationEngine, Integral};
pub use errors::EngineError;
pub use integrand::{Integrand, NamedIntegrand};
pub use request::{PendingRequest, RequestId};
