//! Fluent configuration handle returned by registration.

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::types::{MatchAttributes, Outcome, StubDefinition, StubSnapshot};

/// Cause used by [`StubHandle::timeout`].
pub const TIMEOUT_CAUSE: &str = "timeout";
/// Cause used by [`StubHandle::network_error`].
pub const NETWORK_ERROR_CAUSE: &str = "network error";

pub(crate) type SharedStub = Arc<Mutex<StubDefinition>>;

/// Handle to a registered stub. Clones share the same definition, so a
/// handle kept by a test observes the invocation count as calls come in.
///
/// ```
/// use callstub::{MatchAttributes, Method, MockSession};
///
/// let session = MockSession::new();
/// session
///     .on(Method::Get)
///     .to("/users")
///     .with(MatchAttributes::default().param("page", 1))
///     .once()
///     .respond_with(200, serde_json::json!([{"id": 1}]));
/// ```
#[derive(Debug, Clone)]
pub struct StubHandle {
    inner: SharedStub,
}

impl StubHandle {
    pub(crate) fn new(inner: SharedStub) -> Self {
        Self { inner }
    }

    pub fn to(&self, uri: impl Into<String>) -> &Self {
        self.inner.lock().set_uri(uri);
        self
    }

    /// Merge match attributes into the stub; fields set here replace earlier ones.
    pub fn with(&self, attributes: MatchAttributes) -> &Self {
        self.inner.lock().merge_attributes(attributes);
        self
    }

    pub fn with_headers<K, V>(&self, headers: impl IntoIterator<Item = (K, V)>) -> &Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.with(MatchAttributes {
            headers: Some(
                headers
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            ..MatchAttributes::default()
        })
    }

    pub fn with_params<K, V>(&self, params: impl IntoIterator<Item = (K, V)>) -> &Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.with(MatchAttributes {
            params: Some(
                params
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            ..MatchAttributes::default()
        })
    }

    pub fn with_body(&self, body: impl Into<Value>) -> &Self {
        self.with(MatchAttributes::default().body(body))
    }

    /// Match at most once.
    pub fn once(&self) -> &Self {
        self.times(1)
    }

    pub fn times(&self, limit: u32) -> &Self {
        self.inner.lock().set_invocation_limit(limit);
        self
    }

    pub fn respond(&self, status: u16) -> &Self {
        self.set_success(status, None, BTreeMap::new())
    }

    pub fn respond_with(&self, status: u16, body: impl Into<Value>) -> &Self {
        self.set_success(status, Some(body.into()), BTreeMap::new())
    }

    pub fn respond_with_headers<K, V>(
        &self,
        status: u16,
        body: Option<Value>,
        headers: impl IntoIterator<Item = (K, V)>,
    ) -> &Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let headers = headers
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.set_success(status, body, headers)
    }

    /// Fail the call at the transport level with `cause`.
    pub fn fail(&self, cause: impl Into<String>) -> &Self {
        self.inner.lock().set_outcome(Outcome::Failure {
            cause: cause.into(),
        });
        self
    }

    pub fn timeout(&self) -> &Self {
        self.fail(TIMEOUT_CAUSE)
    }

    pub fn network_error(&self) -> &Self {
        self.fail(NETWORK_ERROR_CAUSE)
    }

    pub fn invocation_count(&self) -> u32 {
        self.inner.lock().invocation_count()
    }

    pub fn snapshot(&self) -> StubSnapshot {
        self.inner.lock().snapshot()
    }

    fn set_success(
        &self,
        status: u16,
        body: Option<Value>,
        headers: BTreeMap<String, String>,
    ) -> &Self {
        self.inner.lock().set_outcome(Outcome::Success {
            status,
            body,
            headers,
        });
        self
    }
}
