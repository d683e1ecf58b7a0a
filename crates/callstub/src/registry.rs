//! Per-method stub storage and the pre-dispatch validator.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

use crate::error::EngineError;
use crate::method::Method;
use crate::stub::{SharedStub, StubDefinition, StubSnapshot};

/// Ordered stubs per method. Registration order is the tie-break order
/// used by matching, so stubs are only ever appended.
#[derive(Debug)]
pub struct StubRegistry {
    stubs: BTreeMap<Method, Vec<SharedStub>>,
}

impl Default for StubRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StubRegistry {
    /// Create a registry with an empty sequence for every method.
    pub fn new() -> Self {
        Self {
            stubs: Method::ALL.into_iter().map(|m| (m, Vec::new())).collect(),
        }
    }

    /// Append a fresh stub for `method` and return it for configuration.
    pub(crate) fn register(&mut self, method: Method) -> SharedStub {
        let stub = Arc::new(Mutex::new(StubDefinition::new(method)));
        self.stubs.entry(method).or_default().push(stub.clone());
        stub
    }

    /// Empty every method's sequence; method keys stay.
    pub fn reset(&mut self) {
        for stubs in self.stubs.values_mut() {
            stubs.clear();
        }
    }

    pub(crate) fn stubs_for(&self, method: Method) -> &[SharedStub] {
        self.stubs.get(&method).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn methods(&self) -> impl Iterator<Item = Method> + '_ {
        self.stubs.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.stubs.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshots of every stub, grouped by method then registration order.
    pub fn snapshot(&self) -> Vec<StubSnapshot> {
        self.stubs
            .values()
            .flatten()
            .map(|stub| stub.lock().snapshot())
            .collect()
    }

    /// Reject the whole registry if any stub, for any method, is incomplete.
    pub fn validate(&self) -> Result<(), EngineError> {
        let invalid: Vec<StubSnapshot> = self
            .stubs
            .values()
            .flatten()
            .filter_map(|stub| {
                let stub = stub.lock();
                (!stub.is_complete()).then(|| stub.snapshot())
            })
            .collect();

        if invalid.is_empty() {
            Ok(())
        } else {
            warn!(
                "Rejecting dispatch: {} incomplete stub definition(s)",
                invalid.len()
            );
            Err(EngineError::InvalidDefinitions(invalid))
        }
    }
}
