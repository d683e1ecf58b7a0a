//! Turning a dispatch result into the client's resolution.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::EngineError;
use crate::response::MaterializedResponse;

/// Decides whether a status resolves or rejects the request.
pub type ValidateStatus = fn(u16) -> bool;

/// Accepts `2xx`.
pub fn default_validate_status(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Response handed back to the code under test.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub data: Option<Value>,
    pub headers: BTreeMap<String, String>,
}

impl From<MaterializedResponse> for Response {
    fn from(response: MaterializedResponse) -> Self {
        Self {
            status: response.status,
            data: response.body,
            headers: response.headers,
        }
    }
}

/// Errors seen by code that sends requests through a [`MockClient`](crate::MockClient).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The stub answered with a status the validator rejected.
    #[error("Request failed with status code {}", .0.status)]
    Status(Response),

    /// Transport-level failure.
    #[error("Transport error: {cause}")]
    Transport { cause: String },

    /// Stub configuration problem (no match, incomplete stubs).
    #[error(transparent)]
    Engine(EngineError),
}

impl ClientError {
    /// The rejected response, for status errors.
    pub fn response(&self) -> Option<&Response> {
        match self {
            ClientError::Status(response) => Some(response),
            _ => None,
        }
    }
}

impl From<EngineError> for ClientError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::ConnectivityFailure { cause } => ClientError::Transport { cause },
            other => ClientError::Engine(other),
        }
    }
}

/// Resolve or reject according to `validate_status`.
pub fn settle(
    result: Result<MaterializedResponse, EngineError>,
    validate_status: ValidateStatus,
) -> Result<Response, ClientError> {
    let response = Response::from(result?);
    if validate_status(response.status) {
        Ok(response)
    } else {
        Err(ClientError::Status(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn materialized(status: u16) -> MaterializedResponse {
        MaterializedResponse {
            status,
            body: Some(json!({"ok": status < 400})),
            headers: BTreeMap::new(),
        }
    }

    #[test]
    fn test_success_status_resolves() {
        let response = settle(Ok(materialized(204)), default_validate_status).unwrap();
        assert_eq!(response.status, 204);
        assert_eq!(response.data, Some(json!({"ok": true})));
    }

    #[test]
    fn test_error_status_rejects_with_response() {
        let err = settle(Ok(materialized(500)), default_validate_status).unwrap_err();
        assert_eq!(err.to_string(), "Request failed with status code 500");
        assert_eq!(err.response().unwrap().status, 500);
    }

    #[test]
    fn test_custom_validator() {
        let accept_all: ValidateStatus = |_| true;
        assert!(settle(Ok(materialized(503)), accept_all).is_ok());
    }

    #[test]
    fn test_connectivity_failure_becomes_transport_error() {
        let err = settle(
            Err(EngineError::ConnectivityFailure {
                cause: "timeout".into(),
            }),
            default_validate_status,
        )
        .unwrap_err();
        assert!(matches!(err, ClientError::Transport { ref cause } if cause == "timeout"));
        assert!(err.response().is_none());
    }

    #[test]
    fn test_engine_errors_pass_through() {
        let err = settle(
            Err(EngineError::InvalidDefinitions(vec![])),
            default_validate_status,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Engine(EngineError::InvalidDefinitions(_))
        ));
    }
}
