// Quadrant Integration Worker Pool
//
// This crate runs numeric integration requests on a fixed pool of worker
// threads. Requests are handed over through a single-slot mailbox guarded by
// a mutex and a condition variable, and the pool shuts down cooperatively:
// workers finish whatever they already claimed before exiting.

pub mod engine;
pub mod input;
pub mod logging;
pub mod session;
pub mod thread;

// Re-export commonly used types
pub use engine::TanhSinh;
pub use quadrant_api::{
    EngineError, Integrand, IntegrationEngine, Integral, NamedIntegrand, PendingRequest, RequestId,
};
pub use session::{Session, SessionSummary};
pub use thread::*;
