//! Named integrands selectable from the command line.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use quadrant_api::NamedIntegrand;

/// The integrand used when none is configured.
pub const DEFAULT_INTEGRAND: &str = "linear";

fn linear(x: f64) -> f64 {
    2.0 * x
}

fn codeproject(x: f64) -> f64 {
    (1.0 - x).powi(5) * x.powf(-1.0 / 3.0)
}

fn gaussian(x: f64) -> f64 {
    (-x * x).exp()
}

fn sine(x: f64) -> f64 {
    x.sin()
}

fn reciprocal(x: f64) -> f64 {
    1.0 / x
}

lazy_static! {
    static ref CATALOG: BTreeMap<&'static str, NamedIntegrand> = [
        NamedIntegrand::new("linear", "2x", linear),
        NamedIntegrand::new("codeproject", "(1 - x)^5 * x^(-1/3)", codeproject),
        NamedIntegrand::new("gaussian", "exp(-x^2)", gaussian),
        NamedIntegrand::new("sine", "sin(x)", sine),
        NamedIntegrand::new("reciprocal", "1/x", reciprocal),
    ]
    .into_iter()
    .map(|integrand| (integrand.key(), integrand))
    .collect();
}

pub fn lookup(name: &str) -> Option<NamedIntegrand> {
    CATALOG.get(name).copied()
}

/// Registered names in alphabetical order.
pub fn names() -> Vec<&'static str> {
    CATALOG.keys().copied().collect()
}
