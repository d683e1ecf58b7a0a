//! Declarative stub files.
//!
//! ```yaml
//! matchMode: partial
//! stubs:
//!   - method: GET
//!     uri: /users
//!     match:
//!       params: { page: 1 }
//!     limit: 1
//!     respond: { status: 200, body: [] }
//!   - method: POST
//!     uri: /users
//!     fail: timeout
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use crate::config::{is_yaml, MatchMode, MockConfig};
use crate::method::Method;
use crate::session::MockSession;
use crate::stub::MatchAttributes;

/// A stub file: optional match mode plus stub entries in registration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StubFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_mode: Option<MatchMode>,
    #[serde(default)]
    pub stubs: Vec<StubEntry>,
}

/// One stub as written in a file. `uri` and an outcome may be missing; such
/// entries are registered anyway so that validation reports them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StubEntry {
    pub method: Method,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, rename = "match", skip_serializing_if = "Option::is_none")]
    pub attributes: Option<MatchAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respond: Option<RespondEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RespondEntry {
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl StubFile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read stub file {}", path.display()))?;
        if is_yaml(path) {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Invalid YAML stub file {}", path.display()))
        } else {
            serde_json::from_str(&contents)
                .with_context(|| format!("Invalid JSON stub file {}", path.display()))
        }
    }

    /// A new session using this file's match mode, with every stub registered.
    pub fn into_session(self, mut config: MockConfig) -> MockSession {
        if let Some(mode) = self.match_mode {
            config.match_mode = mode;
        }
        let session = MockSession::with_config(config);
        load_fixtures(&session, &self);
        session
    }
}

/// Register every entry of `file` on `session`, in file order.
///
/// When an entry has both `respond` and `fail`, the failure wins.
pub fn load_fixtures(session: &MockSession, file: &StubFile) -> usize {
    for entry in &file.stubs {
        let stub = session.on(entry.method);
        if let Some(uri) = &entry.uri {
            stub.to(uri.clone());
        }
        if let Some(attributes) = &entry.attributes {
            stub.with(attributes.clone());
        }
        if let Some(limit) = entry.limit {
            stub.times(limit);
        }
        if let Some(respond) = &entry.respond {
            stub.respond_with_headers(respond.status, respond.body.clone(), respond.headers.clone());
        }
        if let Some(cause) = &entry.fail {
            stub.fail(cause.clone());
        }
    }
    info!("Loaded {} stub(s) from fixture", file.stubs.len());
    file.stubs.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use serde_json::json;
    use std::io::Write;

    const YAML: &str = r#"
matchMode: partial
stubs:
  - method: GET
    uri: /users
    respond: { status: 200, body: { match: generic } }
  - method: GET
    uri: /users
    match:
      params: { page: 1 }
    limit: 1
    respond:
      status: 206
      body: { match: specific }
      headers: { X-Page: "1" }
  - method: POST
    uri: /users
    fail: timeout
"#;

    #[test]
    fn test_yaml_stub_file_round_trip_into_session() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        file.write_all(YAML.as_bytes()).unwrap();

        let stub_file = StubFile::from_file(file.path()).unwrap();
        assert_eq!(stub_file.stubs.len(), 3);

        let session = stub_file.into_session(MockConfig::default());
        assert_eq!(session.match_mode(), MatchMode::Partial);

        let attrs = MatchAttributes::default().param("page", 1);
        let first = session
            .dispatch(Method::Get, "/users", Some(attrs.clone()))
            .unwrap();
        assert_eq!(first.status, 206);
        assert_eq!(first.headers["X-Page"], "1");

        let second = session.dispatch(Method::Get, "/users", Some(attrs)).unwrap();
        assert_eq!(second.body, Some(json!({"match": "generic"})));

        let err = session.dispatch(Method::Post, "/users", None).unwrap_err();
        assert!(err.is_connectivity());
    }

    #[test]
    fn test_incomplete_entries_are_registered() {
        let stub_file: StubFile = serde_json::from_value(json!({
            "stubs": [
                {"method": "GET", "uri": "/ok", "respond": {"status": 200}},
                {"method": "DELETE", "uri": "/no-outcome"}
            ]
        }))
        .unwrap();

        let session = MockSession::new();
        assert_eq!(load_fixtures(&session, &stub_file), 2);
        assert!(matches!(
            session.dispatch(Method::Get, "/ok", None),
            Err(EngineError::InvalidDefinitions(ref invalid)) if invalid.len() == 1
        ));
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = StubFile::from_file("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read stub file"));
    }
}
