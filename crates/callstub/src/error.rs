//! Engine-level error taxonomy.
//!
//! Every variant is terminal for the call being dispatched; nothing here is
//! retried or downgraded inside the engine.

use crate::method::Method;
use crate::stub::{IncomingCall, StubSnapshot};

/// Errors surfaced by [`MockSession::dispatch`](crate::MockSession::dispatch).
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    /// One or more registered stubs lack a uri or an outcome.
    #[error(
        "{} stub definition(s) are incomplete (missing uri or outcome):\n{}",
        .0.len(),
        list_snapshots(.0)
    )]
    InvalidDefinitions(Vec<StubSnapshot>),

    /// No registered stub accepted the call.
    #[error(
        "No stub matched {call}; {} stub(s) registered:\n{}",
        .registered.len(),
        list_snapshots(.registered)
    )]
    NoMatch {
        call: IncomingCall,
        registered: Vec<StubSnapshot>,
    },

    /// The matched stub was configured to fail at the transport level.
    #[error("Connectivity failure: {cause}")]
    ConnectivityFailure { cause: String },

    /// A stub reached materialization without an outcome.
    #[error("Stub {method} {uri} has no configured outcome")]
    UnconfiguredOutcome { method: Method, uri: String },

    #[error("Unknown HTTP method: {0}")]
    UnknownMethod(String),
}

impl EngineError {
    /// True for simulated transport failures, which the adapter boundary
    /// reports the same way as a real network error.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, EngineError::ConnectivityFailure { .. })
    }

    /// Structured diagnostics for the configuration errors, as JSON.
    pub fn diagnostics(&self) -> Option<serde_json::Value> {
        match self {
            EngineError::InvalidDefinitions(stubs) => Some(serde_json::json!({
                "invalid": stubs,
            })),
            EngineError::NoMatch { call, registered } => Some(serde_json::json!({
                "call": call,
                "registered": registered,
            })),
            _ => None,
        }
    }
}

fn list_snapshots(stubs: &[StubSnapshot]) -> String {
    if stubs.is_empty() {
        return "  (none)".to_string();
    }
    stubs
        .iter()
        .map(|s| format!("  - {s}"))
        .collect::<Vec<_>>()
        .join("\n")
}
