//! Mock session: the registry, call history and the dispatch entry point.

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::{MatchMode, MockConfig};
use crate::error::EngineError;
use crate::history::CallHistory;
use crate::matching::select;
use crate::method::Method;
use crate::registry::StubRegistry;
use crate::response::{materialize, MaterializedResponse};
use crate::stub::{IncomingCall, MatchAttributes, StubHandle, StubSnapshot};

/// Holds every stub registered by a test and resolves intercepted calls
/// against them.
///
/// Each dispatch holds the registry lock from validation through the
/// invocation count update, so two overlapping calls can never both consume
/// a stub limited to one use.
#[derive(Debug, Default)]
pub struct MockSession {
    config: MockConfig,
    registry: Mutex<StubRegistry>,
    history: Mutex<CallHistory>,
}

impl MockSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &MockConfig {
        &self.config
    }

    pub fn match_mode(&self) -> MatchMode {
        self.config.match_mode
    }

    /// Register a new stub for `method`; configure it through the handle.
    pub fn on(&self, method: Method) -> StubHandle {
        let stub = self.registry.lock().register(method);
        debug!("Registered stub for {}", method);
        StubHandle::new(stub)
    }

    pub fn on_get(&self, uri: impl Into<String>) -> StubHandle {
        self.on_uri(Method::Get, uri)
    }

    pub fn on_post(&self, uri: impl Into<String>) -> StubHandle {
        self.on_uri(Method::Post, uri)
    }

    pub fn on_put(&self, uri: impl Into<String>) -> StubHandle {
        self.on_uri(Method::Put, uri)
    }

    pub fn on_patch(&self, uri: impl Into<String>) -> StubHandle {
        self.on_uri(Method::Patch, uri)
    }

    pub fn on_delete(&self, uri: impl Into<String>) -> StubHandle {
        self.on_uri(Method::Delete, uri)
    }

    fn on_uri(&self, method: Method, uri: impl Into<String>) -> StubHandle {
        let handle = self.on(method);
        handle.to(uri);
        handle
    }

    /// Remove all stubs and the call history.
    pub fn reset(&self) {
        self.reset_handlers();
        self.reset_history();
    }

    /// Remove all stubs; the history is kept.
    pub fn reset_handlers(&self) {
        self.registry.lock().reset();
        info!("Cleared all registered stubs");
    }

    pub fn reset_history(&self) {
        self.history.lock().clear();
    }

    /// Calls dispatched for `method`, oldest first.
    pub fn history(&self, method: Method) -> Vec<IncomingCall> {
        self.history.lock().get(method)
    }

    /// Snapshots of every registered stub.
    pub fn registered(&self) -> Vec<StubSnapshot> {
        self.registry.lock().snapshot()
    }

    /// Run the pre-dispatch validation without dispatching anything.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.registry.lock().validate()
    }

    /// Resolve one intercepted call.
    pub fn dispatch(
        &self,
        method: Method,
        uri: &str,
        attributes: Option<MatchAttributes>,
    ) -> Result<MaterializedResponse, EngineError> {
        self.dispatch_call(IncomingCall::new(
            method,
            uri,
            attributes.unwrap_or_default(),
        ))
    }

    pub fn dispatch_call(&self, call: IncomingCall) -> Result<MaterializedResponse, EngineError> {
        if self.config.record_history {
            self.history.lock().record(&call);
        }

        let registry = self.registry.lock();
        registry.validate()?;

        let mut stubs: Vec<_> = registry
            .stubs_for(call.method)
            .iter()
            .map(|stub| stub.lock())
            .collect();

        let mode = self.config.match_mode;
        let Some(index) = select(stubs.iter().map(|stub| &**stub), &call, mode) else {
            drop(stubs);
            warn!("No stub matched {} ({} mode)", call, mode.as_str());
            return Err(EngineError::NoMatch {
                call,
                registered: registry.snapshot(),
            });
        };

        debug!(
            "Matched {} to stub #{} of {} ({} mode)",
            call,
            index,
            call.method,
            mode.as_str()
        );
        materialize(&mut stubs[index])
    }
}
