use std::fmt;

/// A real function of one real variable.
///
/// Integrands are evaluated concurrently from every worker thread, so they
/// must be pure with respect to shared state. Any `Fn(f64) -> f64` that is
/// `Send + Sync` already qualifies.
pub trait Integrand: Send + Sync {
    fn evaluate(&self, x: f64) -> f64;

    /// Human readable name used in diagnostics.
    fn name(&self) -> &str {
        "anonymous"
    }
}

impl<F> Integrand for F
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn evaluate(&self, x: f64) -> f64 {
        self(x)
    }
}

/// A plain function pointer paired with a name, suitable for static
/// registries.
#[derive(Clone, Copy)]
pub struct NamedIntegrand {
    name: &'static str,
    formula: &'static str,
    func: fn(f64) -> f64,
}

impl NamedIntegrand {
    pub const fn new(name: &'static str, formula: &'static str, func: fn(f64) -> f64) -> Self {
        Self { name, formula, func }
    }

    /// The registered name, with the static lifetime `Integrand::name`
    /// cannot express.
    pub fn key(&self) -> &'static str {
        self.name
    }

    /// The formula as shown to the operator, e.g. `2x`.
    pub fn formula(&self) -> &'static str {
        self.formula
    }
}

impl Integrand for NamedIntegrand {
    fn evaluate(&self, x: f64) -> f64 {
        (self.func)(x)
    }

    fn name(&self) -> &str {
        self.name
    }
}

impl fmt::Debug for NamedIntegrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedIntegrand")
            .field("name", &self.name)
            .field("formula", &self.formula)
            .finish()
    }
}
