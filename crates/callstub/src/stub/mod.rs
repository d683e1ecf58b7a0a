//! Registered call expectations.
//!
//! - `types`: the stub data model (outcome, match attributes, definition, snapshot)
//! - `handle`: fluent handle returned by registration

mod handle;
mod types;

#[cfg(test)]
mod tests;

pub use handle::{StubHandle, NETWORK_ERROR_CAUSE, TIMEOUT_CAUSE};
pub use types::{IncomingCall, MatchAttributes, Outcome, StubDefinition, StubSnapshot};

pub(crate) use handle::SharedStub;
