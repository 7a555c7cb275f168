use std::fmt;

use serde::Serialize;
use uuid::Uuid;

/// Identity of a single submitted request.
///
/// Two requests with identical bounds are still distinct submissions, so
/// every `PendingRequest` carries its own id for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

/// An integration request: integrate over `[lower, upper]` to within
/// `tolerance`.
///
/// The value is immutable once constructed. Workers take a copy of it when
/// they claim it, so nothing downstream ever shares a request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PendingRequest {
    id: RequestId,
    lower: f64,
    upper: f64,
    tolerance: f64,
}

impl PendingRequest {
    pub fn new(lower: f64, upper: f64, tolerance: f64) -> Self {
        Self {
            id: RequestId::new(),
            lower,
            upper,
            tolerance,
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Whether `other` has the same bounds and tolerance, ignoring identity.
    pub fn same_parameters(&self, other: &PendingRequest) -> bool {
        self.lower == other.lower && self.upper == other.upper && self.tolerance == other.tolerance
    }
}

impl fmt::Display for PendingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}] tol={:e}", self.lower, self.upper, self.tolerance)
    }
}
