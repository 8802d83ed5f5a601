//! Pre-built [`tracing::Span`] constructors for common node operations.
//!
//! Consistent span names and field sets make it easy to filter and correlate
//! a flow's log lines with the finality sessions it drives.

use tracing::{info_span, Span};

/// Span covering one issue, transfer, redeem or balance flow.
pub fn flow_span(flow: &str, node: &str) -> Span {
    info_span!("flow", flow = %flow, node = %node)
}

/// Span covering one inbound finality session served by a node.
pub fn responder_span(node: &str, peer: &str) -> Span {
    info_span!("responder", node = %node, peer = %peer)
}
