//! Pre-built [`tracing::Span`] constructors for the node's flows.
//!
//! Consistent span names and field sets make it easy to follow one badge
//! through issue, show and the counterparties that answered.

use badge_types::{PartyName, RecordId};
use tracing::{info_span, Span};

/// Span covering one issue invocation, from proposal to confirmation.
pub fn issue_span(badge_name: &str, holder: &PartyName) -> Span {
    info_span!("issue", badge = %badge_name, holder = %holder)
}

/// Span covering one show invocation.
pub fn show_span(record_id: &RecordId) -> Span {
    info_span!("show", record_id = %record_id)
}

/// Span covering one inbound session served for another party.
pub fn respond_span(me: &PartyName, initiator: &PartyName) -> Span {
    info_span!("respond", me = %me, initiator = %initiator)
}
