//! In-process HTTP call stubbing for tests.
//!
//! A test registers expected calls on a [`MockSession`]; the code under test
//! sends its requests through a [`MockClient`] (or any adapter calling
//! [`MockSession::dispatch`]) and gets the canned outcome of the best
//! matching stub instead of touching the network.
//!
//! # Example
//!
//! ```
//! use callstub::{EngineError, MatchAttributes, Method, MockSession};
//! use serde_json::json;
//!
//! let session = MockSession::new();
//! session
//!     .on_get("/path")
//!     .with_headers([("Accept", "application/json")])
//!     .respond_with(200, json!({"key": "value"}));
//!
//! let headers = MatchAttributes::default().header("Accept", "application/json");
//! let response = session.dispatch(Method::Get, "/path", Some(headers)).unwrap();
//! assert_eq!(response.status, 200);
//!
//! let err = session.dispatch(Method::Get, "/path", None).unwrap_err();
//! assert!(matches!(err, EngineError::NoMatch { .. }));
//! ```
//!
//! # Module Structure
//!
//! - `stub`: stub data model and the fluent [`StubHandle`]
//! - `registry`: per-method stub storage and pre-dispatch validation
//! - `matching`: structural equality and strict/partial selection
//! - `response`: outcome materialization
//! - `session`: [`MockSession`], the dispatch entry point
//! - `adapter`: request extraction, status settling, [`MockClient`]
//! - `fixtures`: YAML/JSON stub files

pub mod adapter;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod history;
pub mod matching;
pub mod method;
pub mod registry;
pub mod response;
pub mod session;
pub mod stub;

pub use adapter::{ClientError, MockClient, RequestConfig, Response};
pub use config::{MatchMode, MockConfig};
pub use error::EngineError;
pub use fixtures::{load_fixtures, StubFile};
pub use method::Method;
pub use response::MaterializedResponse;
pub use session::MockSession;
pub use stub::{IncomingCall, MatchAttributes, Outcome, StubHandle, StubSnapshot};
