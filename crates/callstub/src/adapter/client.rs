//! Async client facade over a [`MockSession`].

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::request::{extract_call, RequestConfig};
use super::settle::{default_validate_status, settle, ClientError, Response, ValidateStatus};
use crate::session::MockSession;

/// Sends requests into a mock session instead of over the network.
#[derive(Debug, Clone)]
pub struct MockClient {
    session: Arc<MockSession>,
    validate_status: ValidateStatus,
}

impl MockClient {
    pub fn new(session: Arc<MockSession>) -> Self {
        Self {
            session,
            validate_status: default_validate_status,
        }
    }

    pub fn with_validate_status(mut self, validate_status: ValidateStatus) -> Self {
        self.validate_status = validate_status;
        self
    }

    pub fn session(&self) -> &MockSession {
        &self.session
    }

    /// Resolve `config` against the session.
    ///
    /// Matching and invocation accounting complete before the first await,
    /// so concurrent requests are counted in the order they were issued.
    pub async fn request(&self, config: RequestConfig) -> Result<Response, ClientError> {
        let call = extract_call(&config);
        let result = self.session.dispatch_call(call);

        let delay = self.session.config().delay_response_ms;
        if delay > 0 {
            debug!("Delaying mocked response by {}ms", delay);
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        settle(result, self.validate_status)
    }
}
