//! Diagnostics sink for best-effort fetch failures.

use crate::AuthError;
use std::fmt;
use tracing::warn;

/// Which best-effort operation gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    Connections,
    Graph,
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStage::Connections => f.write_str("connections"),
            FetchStage::Graph => f.write_str("graph"),
        }
    }
}

/// A failure that was converted into "no data".
#[derive(Debug)]
pub struct Swallowed {
    pub stage: FetchStage,
    pub error: AuthError,
}

impl Swallowed {
    pub(crate) fn at(stage: FetchStage) -> impl FnOnce(AuthError) -> Swallowed {
        move |error| Swallowed { stage, error }
    }
}

impl fmt::Display for Swallowed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} fetch failed: {}", self.stage, self.error)
    }
}

/// Receives every swallowed fetch failure.
pub trait FailureObserver: Send + Sync {
    fn on_swallowed(&self, failure: &Swallowed);
}

/// Default observer: one `warn!` per failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl FailureObserver for TracingObserver {
    fn on_swallowed(&self, failure: &Swallowed) {
        warn!(
            stage = %failure.stage,
            transient = failure.error.is_transient(),
            error = %failure.error,
            "Best-effort fetch returned no data"
        );
    }
}
