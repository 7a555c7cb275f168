use crate::errors::EngineError;
use crate::integrand::Integrand;

/// Successful outcome of an integration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Integral {
    /// The computed definite integral.
    pub value: f64,

    /// Absolute error estimate reported by the engine. `NaN` when the engine
    /// does not estimate its error.
    pub error_estimate: f64,

    /// Number of integrand evaluations performed.
    pub evaluations: usize,

    /// Refinement levels used to reach the estimate.
    pub levels: u32,
}

impl Integral {
    pub fn new(value: f64, error_estimate: f64, evaluations: usize, levels: u32) -> Self {
        Self {
            value,
            error_estimate,
            evaluations,
            levels,
        }
    }
}

/// A numeric quadrature routine.
///
/// Implementations must be synchronous and deterministic for fixed inputs,
/// and must be safe to call from many threads at once without sharing
/// mutable state between calls. An engine reports failure through
/// [`EngineError`] rather than by panicking.
pub trait IntegrationEngine: Send + Sync {
    /// Integrates `f` over `[lower, upper]` to the absolute `tolerance`.
    fn integrate(
        &self,
        f: &dyn Integrand,
        lower: f64,
        upper: f64,
        tolerance: f64,
    ) -> Result<Integral, EngineError>;

    /// Name used in diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
