//! Stub selection for an incoming call.
//!
//! Candidates are the stubs with exactly the call's uri that have not
//! exhausted their invocation limit, in registration order. Selection then
//! depends on the [`MatchMode`]:
//!
//! - `Strict`: first candidate whose headers, params and body are all equal
//!   to the call's (absent on both sides counts as equal).
//! - `Partial`: a field is ignored when either side lacks it; fields present
//!   on both sides must be equal. Passing candidates are ranked by the number
//!   of fields that matched on both sides, ties going to the earlier stub.

use tracing::trace;

use super::deep_equals::{optional_equals, DeepEquals};
use crate::config::MatchMode;
use crate::stub::{IncomingCall, MatchAttributes, StubDefinition};

/// Points awarded per field present and equal on both sides.
const FIELD_SCORE: u8 = 2;

/// Pick a stub for `call` from one method's stubs, returning its index.
pub fn select<'a, I>(stubs: I, call: &IncomingCall, mode: MatchMode) -> Option<usize>
where
    I: IntoIterator<Item = &'a StubDefinition>,
{
    let mut candidates = stubs
        .into_iter()
        .enumerate()
        .filter(|(_, stub)| stub.uri() == Some(call.uri.as_str()) && stub.is_invokable());

    match mode {
        MatchMode::Strict => candidates
            .find(|(_, stub)| strict_matches(stub.attributes(), &call.attributes))
            .map(|(index, _)| index),
        MatchMode::Partial => {
            let mut ranked: Vec<(usize, u8)> = candidates
                .filter(|(_, stub)| partial_passes(stub.attributes(), &call.attributes))
                .map(|(index, stub)| (index, specificity(stub.attributes(), &call.attributes)))
                .collect();
            // stable: equal scores keep registration order
            ranked.sort_by(|a, b| b.1.cmp(&a.1));
            trace!(?ranked, "Ranked partial candidates");
            ranked.first().map(|(index, _)| *index)
        }
    }
}

/// All three fields equal, including absent-vs-absent.
pub fn strict_matches(configured: &MatchAttributes, incoming: &MatchAttributes) -> bool {
    optional_equals(configured.headers.as_ref(), incoming.headers.as_ref())
        && optional_equals(configured.params.as_ref(), incoming.params.as_ref())
        && optional_equals(configured.body.as_ref(), incoming.body.as_ref())
}

/// Every field is either missing on one side or equal on both.
pub fn partial_passes(configured: &MatchAttributes, incoming: &MatchAttributes) -> bool {
    lenient_equals(configured.headers.as_ref(), incoming.headers.as_ref())
        && lenient_equals(configured.params.as_ref(), incoming.params.as_ref())
        && lenient_equals(configured.body.as_ref(), incoming.body.as_ref())
}

/// Specificity score in `{0, 2, 4, 6}`.
pub fn specificity(configured: &MatchAttributes, incoming: &MatchAttributes) -> u8 {
    let matched = [
        both_equal(configured.headers.as_ref(), incoming.headers.as_ref()),
        both_equal(configured.params.as_ref(), incoming.params.as_ref()),
        both_equal(configured.body.as_ref(), incoming.body.as_ref()),
    ];
    matched.iter().filter(|m| **m).count() as u8 * FIELD_SCORE
}

fn lenient_equals<T: DeepEquals>(a: Option<&T>, b: Option<&T>) -> bool {
    a.is_none() || b.is_none() || optional_equals(a, b)
}

fn both_equal<T: DeepEquals>(a: Option<&T>, b: Option<&T>) -> bool {
    a.is_some() && b.is_some() && optional_equals(a, b)
}
