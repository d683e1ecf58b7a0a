//! Client-side glue between an HTTP client's request shape and the engine.
//!
//! - `request`: URL joining, query-string extraction, header flattening
//! - `settle`: status validation and client-facing errors
//! - `client`: async `MockClient`

mod client;
mod request;
mod settle;

pub use client::MockClient;
pub use request::{
    extract_call, flatten_headers, join_url, parse_query, HeaderDefaults, RequestConfig,
};
pub use settle::{default_validate_status, settle, ClientError, Response, ValidateStatus};
