//! # Domain Errors
//!
//! Error types for Block Delivery.
//!
//! Client-visible failures are not errors in this sense: they are
//! [`Status`](super::Status) replies. The types here cover the conditions
//! that produce those replies (`RequestError`, `PolicyError`) and the
//! faults that end a session without one (`DeliverError`).

use thiserror::Error;

use super::value_objects::Status;

/// Hash type alias (32-byte SHA-256)
pub type Hash = [u8; 32];

/// Faults that terminate a deliver session with an error.
#[derive(Debug, Error)]
pub enum DeliverError {
    /// The transport failed while receiving or sending.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The peer went away while a response was being sent.
    #[error("Connection closed by peer")]
    ConnectionClosed,

    /// A frame could not be encoded or decoded.
    #[error("Codec error: {0}")]
    Codec(String),

    /// An inbound frame exceeded the configured limit.
    #[error("Frame too large: {size} > {max}")]
    FrameTooLarge {
        /// Announced frame size
        size: usize,
        /// Configured maximum
        max: usize,
    },

    /// Underlying socket error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<bincode::Error> for DeliverError {
    fn from(err: bincode::Error) -> Self {
        DeliverError::Codec(err.to_string())
    }
}

/// Reasons a deliver request is rejected as malformed.
///
/// Every variant maps to [`Status::BadRequest`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    /// The envelope payload could not be decoded.
    #[error("Envelope has no decodable payload: {0}")]
    MalformedPayload(String),

    /// The payload carries no header.
    #[error("Payload header is missing")]
    MissingHeader,

    /// The channel header could not be decoded.
    #[error("Malformed channel header: {0}")]
    MalformedChannelHeader(String),

    /// The signature header could not be decoded.
    #[error("Malformed signature header: {0}")]
    MalformedSignatureHeader(String),

    /// The payload data is not a seek info.
    #[error("Malformed seek info: {0}")]
    MalformedSeekInfo(String),

    /// Start or stop position absent.
    #[error("Seek info missing position (start present: {start}, stop present: {stop})")]
    MissingSeekPosition {
        /// Was a start position supplied?
        start: bool,
        /// Was a stop position supplied?
        stop: bool,
    },

    /// The stop position resolves below the start position.
    #[error("Invalid seek range: start {start} is greater than stop {stop}")]
    InvalidRange {
        /// Resolved start number
        start: u64,
        /// Requested stop number
        stop: u64,
    },
}

impl RequestError {
    /// Status reported to the client for this rejection.
    pub fn status(&self) -> Status {
        Status::BadRequest
    }
}

/// Policy evaluation failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyError {
    /// No policy is registered under the requested name.
    #[error("Policy not found: {0}")]
    PolicyNotFound(String),

    /// Too few valid signatures from allowed identities.
    #[error("Signature set did not satisfy policy: {got} < {required}")]
    NotSatisfied {
        /// Valid signatures from allowed identities
        got: usize,
        /// Signatures required
        required: usize,
    },

    /// The policy rejects every request.
    #[error("Policy rejects all requests")]
    Rejected,
}

/// Ledger write failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Appended block does not extend the ledger height.
    #[error("Block number mismatch: expected {expected}, got {got}")]
    InvalidBlockNumber {
        /// Ledger height at append time
        expected: u64,
        /// Number carried by the block
        got: u64,
    },

    /// Appended block does not link to the newest header.
    #[error("Previous hash mismatch at block {number}")]
    PreviousHashMismatch {
        /// Number of the rejected block
        number: u64,
    },

    /// A channel with this id already exists.
    #[error("Channel already exists: {0}")]
    ChannelExists(String),
}
