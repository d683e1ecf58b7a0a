//! Type definitions for registered stubs and intercepted calls.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::method::Method;

// ============================================================================
// Outcome
// ============================================================================

/// Canned result of a matched call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum Outcome {
    /// An HTTP response; the engine never interprets the status.
    Success {
        status: u16,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        body: Option<Value>,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        headers: BTreeMap<String, String>,
    },
    /// A simulated transport failure such as a timeout.
    Failure { cause: String },
}

// ============================================================================
// Match attributes
// ============================================================================

/// Optional request attributes a stub can require and a call can carry.
///
/// Each field is independently present or absent; presence is significant
/// for matching, so an empty map is not the same as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl MatchAttributes {
    pub const fn none() -> Self {
        Self {
            headers: None,
            params: None,
            body: None,
        }
    }

    /// Add one header, creating the header map if absent.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Add one query parameter, creating the parameter map if absent.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_none() && self.params.is_none() && self.body.is_none()
    }

    /// Shallow merge: every field present in `other` replaces ours.
    pub fn merge(&mut self, other: MatchAttributes) {
        if other.headers.is_some() {
            self.headers = other.headers;
        }
        if other.params.is_some() {
            self.params = other.params;
        }
        if other.body.is_some() {
            self.body = other.body;
        }
    }

    fn present_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.headers.is_some() {
            fields.push("headers");
        }
        if self.params.is_some() {
            fields.push("params");
        }
        if self.body.is_some() {
            fields.push("body");
        }
        fields
    }
}

pub(crate) static NO_ATTRIBUTES: MatchAttributes = MatchAttributes::none();

// ============================================================================
// Stub definition
// ============================================================================

/// One registered call expectation.
#[derive(Debug, Clone)]
pub struct StubDefinition {
    method: Method,
    uri: Option<String>,
    attributes: Option<MatchAttributes>,
    outcome: Option<Outcome>,
    invocation_limit: Option<u32>,
    invocation_count: u32,
}

impl StubDefinition {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            uri: None,
            attributes: None,
            outcome: None,
            invocation_limit: None,
            invocation_count: 0,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    /// Configured attributes, or an all-absent set when none were given.
    pub fn attributes(&self) -> &MatchAttributes {
        self.attributes.as_ref().unwrap_or(&NO_ATTRIBUTES)
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn invocation_limit(&self) -> Option<u32> {
        self.invocation_limit
    }

    pub fn invocation_count(&self) -> u32 {
        self.invocation_count
    }

    /// Usable only once both a uri and an outcome are set.
    pub fn is_complete(&self) -> bool {
        self.uri.is_some() && self.outcome.is_some()
    }

    /// False once the invocation limit has been reached.
    pub fn is_invokable(&self) -> bool {
        self.invocation_limit
            .map_or(true, |limit| self.invocation_count < limit)
    }

    pub fn set_uri(&mut self, uri: impl Into<String>) {
        self.uri = Some(uri.into());
    }

    pub fn merge_attributes(&mut self, attributes: MatchAttributes) {
        self.attributes
            .get_or_insert_with(MatchAttributes::default)
            .merge(attributes);
    }

    pub fn set_invocation_limit(&mut self, limit: u32) {
        self.invocation_limit = Some(limit);
    }

    pub fn set_outcome(&mut self, outcome: Outcome) {
        self.outcome = Some(outcome);
    }

    pub(crate) fn record_invocation(&mut self) {
        self.invocation_count = self.invocation_count.saturating_add(1);
    }

    /// Serializable copy for diagnostics.
    pub fn snapshot(&self) -> StubSnapshot {
        StubSnapshot {
            method: self.method,
            uri: self.uri.clone(),
            attributes: self.attributes.clone(),
            outcome: self.outcome.clone(),
            invocation_limit: self.invocation_limit,
            invocation_count: self.invocation_count,
        }
    }
}

/// Point-in-time view of a stub, carried by configuration errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StubSnapshot {
    pub method: Method,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<MatchAttributes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invocation_limit: Option<u32>,
    pub invocation_count: u32,
}

impl fmt::Display for StubSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.method,
            self.uri.as_deref().unwrap_or("<no uri>")
        )?;
        if let Some(fields) = self
            .attributes
            .as_ref()
            .map(MatchAttributes::present_fields)
            .filter(|f| !f.is_empty())
        {
            write!(f, " [{}]", fields.join(", "))?;
        }
        match &self.outcome {
            Some(Outcome::Success { status, .. }) => write!(f, " -> {status}")?,
            Some(Outcome::Failure { cause }) => write!(f, " -> fail({cause})")?,
            None => write!(f, " -> <no outcome>")?,
        }
        if let Some(limit) = self.invocation_limit {
            write!(f, " ({}/{limit} used)", self.invocation_count)?;
        }
        Ok(())
    }
}

// ============================================================================
// Incoming call
// ============================================================================

/// Neutral description of one intercepted outbound call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingCall {
    pub method: Method,
    pub uri: String,
    #[serde(default)]
    pub attributes: MatchAttributes,
}

impl IncomingCall {
    pub fn new(method: Method, uri: impl Into<String>, attributes: MatchAttributes) -> Self {
        Self {
            method,
            uri: uri.into(),
            attributes,
        }
    }
}

impl fmt::Display for IncomingCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.uri)?;
        let fields = self.attributes.present_fields();
        if !fields.is_empty() {
            write!(f, " [{}]", fields.join(", "))?;
        }
        Ok(())
    }
}
