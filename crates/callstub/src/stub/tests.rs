//! Tests for the stub data model and its handle.

use super::*;
use crate::method::Method;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;

fn handle(method: Method) -> (StubHandle, SharedStub) {
    let shared: SharedStub = Arc::new(Mutex::new(StubDefinition::new(method)));
    (StubHandle::new(shared.clone()), shared)
}

#[test]
fn test_new_definition_is_incomplete_and_invokable() {
    let stub = StubDefinition::new(Method::Get);
    assert!(!stub.is_complete());
    assert!(stub.is_invokable());
    assert_eq!(stub.invocation_count(), 0);
    assert!(stub.attributes().is_empty());
}

#[test]
fn test_complete_requires_uri_and_outcome() {
    let mut stub = StubDefinition::new(Method::Post);
    stub.set_uri("/orders");
    assert!(!stub.is_complete());

    stub.set_outcome(Outcome::Success {
        status: 201,
        body: None,
        headers: Default::default(),
    });
    assert!(stub.is_complete());

    let mut failing = StubDefinition::new(Method::Post);
    failing.set_outcome(Outcome::Failure {
        cause: "timeout".into(),
    });
    assert!(!failing.is_complete());
}

#[test]
fn test_invocation_limit_controls_invokable() {
    let mut stub = StubDefinition::new(Method::Get);
    stub.set_invocation_limit(2);
    assert!(stub.is_invokable());
    stub.record_invocation();
    assert!(stub.is_invokable());
    stub.record_invocation();
    assert!(!stub.is_invokable());
    assert_eq!(stub.invocation_count(), 2);
}

#[test]
fn test_zero_limit_is_never_invokable() {
    let mut stub = StubDefinition::new(Method::Get);
    stub.set_invocation_limit(0);
    assert!(!stub.is_invokable());
}

#[test]
fn test_attribute_merge_is_shallow_per_field() {
    let mut attrs = MatchAttributes::default()
        .header("Accept", "application/json")
        .param("page", 1);

    attrs.merge(MatchAttributes::default().header("X-Trace", "abc"));

    // headers replaced wholesale, params untouched
    let headers = attrs.headers.as_ref().unwrap();
    assert_eq!(headers.len(), 1);
    assert_eq!(headers["X-Trace"], "abc");
    assert_eq!(attrs.params.as_ref().unwrap()["page"], json!(1));
    assert!(attrs.body.is_none());
}

#[test]
fn test_handle_chains_configuration() {
    let (stub, shared) = handle(Method::Get);
    stub.to("/users")
        .with_headers([("Accept", "application/json")])
        .with_params([("q", "v")])
        .once()
        .respond_with(200, json!({"key": "value"}));

    let def = shared.lock();
    assert_eq!(def.uri(), Some("/users"));
    assert_eq!(def.invocation_limit(), Some(1));
    assert_eq!(
        def.attributes().headers.as_ref().unwrap()["Accept"],
        "application/json"
    );
    assert_eq!(def.attributes().params.as_ref().unwrap()["q"], json!("v"));
    assert_eq!(
        def.outcome(),
        Some(&Outcome::Success {
            status: 200,
            body: Some(json!({"key": "value"})),
            headers: Default::default(),
        })
    );
}

#[test]
fn test_handle_outcome_last_setter_wins() {
    let (stub, shared) = handle(Method::Delete);
    stub.to("/items/1").respond(204).timeout();

    assert_eq!(
        shared.lock().outcome(),
        Some(&Outcome::Failure {
            cause: TIMEOUT_CAUSE.to_string()
        })
    );
}

#[test]
fn test_handle_respond_with_headers() {
    let (stub, shared) = handle(Method::Get);
    stub.to("/file")
        .respond_with_headers(200, Some(json!("bytes")), [("Content-Type", "text/plain")]);

    let def = shared.lock();
    match def.outcome() {
        Some(Outcome::Success { headers, body, .. }) => {
            assert_eq!(headers["Content-Type"], "text/plain");
            assert_eq!(body, &Some(json!("bytes")));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn test_snapshot_display() {
    let (stub, _) = handle(Method::Put);
    stub.to("/profile")
        .with_body(json!({"name": "x"}))
        .times(3)
        .network_error();

    assert_eq!(
        stub.snapshot().to_string(),
        "PUT /profile [body] -> fail(network error) (0/3 used)"
    );
}

#[test]
fn test_outcome_serialization_is_tagged() {
    let outcome = Outcome::Success {
        status: 200,
        body: Some(json!({"ok": true})),
        headers: Default::default(),
    };
    assert_eq!(
        serde_json::to_value(&outcome).unwrap(),
        json!({"type": "success", "status": 200, "body": {"ok": true}})
    );

    let failure: Outcome =
        serde_json::from_value(json!({"type": "failure", "cause": "timeout"})).unwrap();
    assert_eq!(
        failure,
        Outcome::Failure {
            cause: "timeout".into()
        }
    );
}
