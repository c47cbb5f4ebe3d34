//! # Inbound Ports
//!
//! API trait defining what the Block Delivery subsystem does.

use async_trait::async_trait;

use super::outbound::DeliverStream;
use crate::domain::{DeliverError, SessionOutcome};

/// Deliver handler - inbound port.
///
/// Serves one client connection for its whole lifetime: an unbounded
/// sequence of seek requests, each answered with zero or more blocks and
/// exactly one status.
#[async_trait]
pub trait DeliverApi: Send + Sync {
    /// Run the session until the client hangs up, a terminal status is
    /// sent, or the transport fails.
    async fn handle(&self, stream: &mut dyn DeliverStream)
        -> Result<SessionOutcome, DeliverError>;
}
