//! # Outbound Ports
//!
//! Traits for the collaborators a deliver session depends on: the chain
//! registry, policy evaluation, the ledger reader and its cursors, and the
//! client transport.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    Block, DeliverError, DeliverResponse, Envelope, PolicyError, SeekPosition, SignedData, Status,
};

/// Policy evaluated for every deliver request.
pub const CHANNEL_READERS: &str = "/Channel/Readers";

/// A named authorization rule over a signature set.
pub trait Policy: Send + Sync {
    /// `Ok` when the signatures satisfy the policy.
    fn evaluate(&self, signatures: &[SignedData]) -> Result<(), PolicyError>;
}

/// Resolves policy names to the channel's current policies.
pub trait PolicyManager: Send + Sync {
    /// The policy registered under `name`, if any.
    fn get_policy(&self, name: &str) -> Option<Arc<dyn Policy>>;
}

/// Position-bound iterator over committed blocks of one channel.
///
/// Owned by a single session for a single seek request.
#[async_trait]
pub trait Cursor: Send {
    /// Wait until [`Cursor::next`] can answer without blocking.
    ///
    /// Resolves when the next block is committed, or when the cursor can
    /// no longer succeed and `next` will report a failure status.
    async fn ready(&mut self);

    /// Non-blocking readiness poll.
    fn is_ready(&self) -> bool;

    /// Pull the next block and advance.
    fn next(&mut self) -> Result<Block, Status>;
}

/// Read access to one channel ledger.
pub trait LedgerReader: Send + Sync {
    /// Open a cursor at `start`, returning it with the resolved start number.
    fn iterator(&self, start: &SeekPosition) -> (Box<dyn Cursor>, u64);

    /// One past the newest committed block number.
    fn height(&self) -> u64;
}

/// Backing resources for deliver on one channel.
pub trait Support: Send + Sync {
    /// Current policy manager of the channel.
    fn policy_manager(&self) -> Arc<dyn PolicyManager>;

    /// Ledger reader of the channel.
    fn reader(&self) -> Arc<dyn LedgerReader>;
}

/// Looks up the [`Support`] for a channel.
pub trait SupportManager: Send + Sync {
    /// The support for `channel_id`, or `None` if the channel does not exist.
    fn get_chain(&self, channel_id: &str) -> Option<Arc<dyn Support>>;
}

/// Duplex message stream to one deliver client.
#[async_trait]
pub trait DeliverStream: Send {
    /// Next envelope; `Ok(None)` on a clean close.
    async fn recv(&mut self) -> Result<Option<Envelope>, DeliverError>;

    /// Transmit one response.
    async fn send(&mut self, response: DeliverResponse) -> Result<(), DeliverError>;
}
