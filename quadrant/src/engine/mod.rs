//! Integration engines and integrands shipped with Quadrant.

pub mod catalog;
pub mod tanh_sinh;

pub use catalog::{DEFAULT_INTEGRAND, lookup, names};
pub use tanh_sinh::TanhSinh;
