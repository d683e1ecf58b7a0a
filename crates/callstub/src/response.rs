//! Turning a selected stub's outcome into a result.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::EngineError;
use crate::stub::{Outcome, StubDefinition};

/// Response produced for a successfully matched call. Whether `status`
/// counts as success is decided at the client boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterializedResponse {
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Count the invocation and produce the stub's outcome.
///
/// Failure outcomes still count as an invocation.
pub fn materialize(stub: &mut StubDefinition) -> Result<MaterializedResponse, EngineError> {
    let Some(outcome) = stub.outcome().cloned() else {
        return Err(EngineError::UnconfiguredOutcome {
            method: stub.method(),
            uri: stub.uri().unwrap_or_default().to_string(),
        });
    };

    stub.record_invocation();

    match outcome {
        Outcome::Success {
            status,
            body,
            headers,
        } => Ok(MaterializedResponse {
            status,
            body,
            headers,
        }),
        Outcome::Failure { cause } => Err(EngineError::ConnectivityFailure { cause }),
    }
}
