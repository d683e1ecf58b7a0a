//! Record of dispatched calls, per method.

use std::collections::BTreeMap;

use crate::method::Method;
use crate::stub::IncomingCall;

#[derive(Debug, Default)]
pub struct CallHistory {
    calls: BTreeMap<Method, Vec<IncomingCall>>,
}

impl CallHistory {
    pub fn record(&mut self, call: &IncomingCall) {
        self.calls.entry(call.method).or_default().push(call.clone());
    }

    pub fn get(&self, method: Method) -> Vec<IncomingCall> {
        self.calls.get(&method).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.calls.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}
