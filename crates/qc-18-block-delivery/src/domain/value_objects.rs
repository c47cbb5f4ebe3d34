//! # Domain Value Objects
//!
//! Seek requests and the response vocabulary of the deliver protocol.

use serde::{Deserialize, Serialize};

use super::entities::Block;
use super::errors::RequestError;

/// A position in a channel ledger.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SeekPosition {
    /// The lowest retained block.
    Oldest,
    /// The most recently committed block (`height - 1`).
    Newest,
    /// An explicit block number.
    Specified(u64),
}

/// What to do when the next block is not yet committed.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum SeekBehavior {
    /// Wait until the block is committed.
    #[default]
    BlockUntilReady,
    /// Reply `NOT_FOUND` immediately.
    FailIfNotReady,
}

/// Client-specified read range.
///
/// Positions are optional on the wire; [`SeekInfo::positions`] enforces
/// that both are present.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeekInfo {
    /// Where iteration begins.
    pub start: Option<SeekPosition>,
    /// Where iteration ends (inclusive).
    pub stop: Option<SeekPosition>,
    /// Behavior when the next block is not ready.
    pub behavior: SeekBehavior,
}

impl SeekInfo {
    /// Create a seek info with both positions set.
    pub fn new(start: SeekPosition, stop: SeekPosition, behavior: SeekBehavior) -> Self {
        Self {
            start: Some(start),
            stop: Some(stop),
            behavior,
        }
    }

    /// Both positions, or a rejection naming which one is absent.
    pub fn positions(&self) -> Result<(SeekPosition, SeekPosition), RequestError> {
        match (self.start, self.stop) {
            (Some(start), Some(stop)) => Ok((start, stop)),
            (start, stop) => Err(RequestError::MissingSeekPosition {
                start: start.is_some(),
                stop: stop.is_some(),
            }),
        }
    }
}

/// Outcome code sent to clients.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Status {
    /// Unclassified outcome.
    Unknown,
    /// The requested range was delivered.
    Success,
    /// Malformed request or invalid range.
    BadRequest,
    /// Authorization denied.
    Forbidden,
    /// Unknown channel, or no block available.
    NotFound,
    /// Request exceeded a size limit.
    RequestEntityTooLarge,
    /// Ledger or server fault.
    InternalServerError,
    /// Ledger temporarily unable to serve.
    ServiceUnavailable,
}

impl Status {
    /// Numeric code (HTTP-style).
    pub fn code(&self) -> u16 {
        match self {
            Status::Unknown => 0,
            Status::Success => 200,
            Status::BadRequest => 400,
            Status::Forbidden => 403,
            Status::NotFound => 404,
            Status::RequestEntityTooLarge => 413,
            Status::InternalServerError => 500,
            Status::ServiceUnavailable => 503,
        }
    }

    /// Parse a numeric code.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Status::Unknown),
            200 => Some(Status::Success),
            400 => Some(Status::BadRequest),
            403 => Some(Status::Forbidden),
            404 => Some(Status::NotFound),
            413 => Some(Status::RequestEntityTooLarge),
            500 => Some(Status::InternalServerError),
            503 => Some(Status::ServiceUnavailable),
            _ => None,
        }
    }

    /// Is this the success code?
    pub fn is_success(&self) -> bool {
        matches!(self, Status::Success)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Status::Unknown => "UNKNOWN",
            Status::Success => "SUCCESS",
            Status::BadRequest => "BAD_REQUEST",
            Status::Forbidden => "FORBIDDEN",
            Status::NotFound => "NOT_FOUND",
            Status::RequestEntityTooLarge => "REQUEST_ENTITY_TOO_LARGE",
            Status::InternalServerError => "INTERNAL_SERVER_ERROR",
            Status::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        };
        write!(f, "{} ({})", name, self.code())
    }
}

/// One message sent to a deliver client.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeliverResponse {
    /// A committed block.
    Block(Block),
    /// Terminal status for a request or session.
    Status(Status),
}

impl DeliverResponse {
    /// The status, if this is a status response.
    pub fn as_status(&self) -> Option<Status> {
        match self {
            DeliverResponse::Status(status) => Some(*status),
            DeliverResponse::Block(_) => None,
        }
    }

    /// The block, if this is a block response.
    pub fn as_block(&self) -> Option<&Block> {
        match self {
            DeliverResponse::Block(block) => Some(block),
            DeliverResponse::Status(_) => None,
        }
    }
}

/// How a deliver session ended without a transport fault.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The client closed the stream between requests.
    Hangup,
    /// The session sent a terminal status and stopped reading.
    Terminated(Status),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_present() {
        let info = SeekInfo::new(
            SeekPosition::Oldest,
            SeekPosition::Newest,
            SeekBehavior::BlockUntilReady,
        );
        assert_eq!(
            info.positions(),
            Ok((SeekPosition::Oldest, SeekPosition::Newest))
        );
    }

    #[test]
    fn test_missing_stop_rejected() {
        let info = SeekInfo {
            start: Some(SeekPosition::Oldest),
            stop: None,
            behavior: SeekBehavior::FailIfNotReady,
        };
        assert_eq!(
            info.positions(),
            Err(RequestError::MissingSeekPosition {
                start: true,
                stop: false
            })
        );
    }

    #[test]
    fn test_missing_both_rejected() {
        assert!(SeekInfo::default().positions().is_err());
    }

    #[test]
    fn test_default_behavior_blocks() {
        assert_eq!(SeekBehavior::default(), SeekBehavior::BlockUntilReady);
    }

    #[test]
    fn test_status_codes_roundtrip() {
        for status in [
            Status::Unknown,
            Status::Success,
            Status::BadRequest,
            Status::Forbidden,
            Status::NotFound,
            Status::RequestEntityTooLarge,
            Status::InternalServerError,
            Status::ServiceUnavailable,
        ] {
            assert_eq!(Status::from_code(status.code()), Some(status));
        }
        assert_eq!(Status::from_code(418), None);
    }

    #[test]
    fn test_only_success_is_success() {
        assert!(Status::Success.is_success());
        assert!(!Status::NotFound.is_success());
        assert!(!Status::Unknown.is_success());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(Status::Forbidden.to_string(), "FORBIDDEN (403)");
    }

    #[test]
    fn test_response_accessors() {
        let status = DeliverResponse::Status(Status::Success);
        assert_eq!(status.as_status(), Some(Status::Success));
        assert!(status.as_block().is_none());

        let block = DeliverResponse::Block(Block::genesis(vec![]));
        assert_eq!(block.as_block().map(Block::number), Some(0));
        assert!(block.as_status().is_none());
    }
}
