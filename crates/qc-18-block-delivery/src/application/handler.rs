//! # Deliver Handler
//!
//! Per-connection session loop of the deliver protocol.
//!
//! ## Request Flow
//!
//! ```text
//! recv ─→ decode ─→ channel lookup ─→ readers policy ─→ seek info
//!                                                          │
//!            ┌─────────────────────────────────────────────┘
//!            ↓
//!      resolve range ─→ AWAIT_READY ⇄ DELIVER ─→ SUCCESS ─→ recv
//! ```
//!
//! Malformed, unauthorized and unknown-channel requests end the whole
//! session after their status is sent. Clients recover by reconnecting.
//! A request that merely finds no block (non-blocking seek, or a position
//! the ledger no longer serves) ends with `NOT_FOUND` and the session
//! keeps reading.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use super::replies::{send_block_reply, send_status_reply};
use crate::algorithms::{resolve_range, FilterResult, SeekRange, SignatureFilter};
use crate::domain::{
    unmarshal, ChannelHeader, DeliverError, Envelope, RequestError, SeekBehavior, SeekInfo,
    SessionOutcome, Status,
};
use crate::ports::{Cursor, DeliverApi, DeliverStream, SupportManager, CHANNEL_READERS};

/// How a single seek request ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RequestEnd {
    /// Send the status, then read the next request.
    Continue(Status),
    /// Send the status, then end the session.
    Close(Status),
}

impl RequestEnd {
    /// Classify a failure status reported by a cursor.
    fn from_ledger(status: Status) -> Self {
        match status {
            Status::NotFound => RequestEnd::Continue(status),
            other => RequestEnd::Close(other),
        }
    }

    fn status(&self) -> Status {
        match *self {
            RequestEnd::Continue(status) | RequestEnd::Close(status) => status,
        }
    }
}

impl From<RequestError> for RequestEnd {
    fn from(err: RequestError) -> Self {
        RequestEnd::Close(err.status())
    }
}

/// Deliver handler serving sessions against the channels of a registry.
pub struct DeliverHandler<M: SupportManager> {
    support_manager: Arc<M>,
}

impl<M: SupportManager> DeliverHandler<M> {
    /// Create a handler resolving channels through `support_manager`.
    pub fn new(support_manager: Arc<M>) -> Self {
        Self { support_manager }
    }

    /// Validate one envelope and stream its range.
    ///
    /// `Err` only for transport failures while sending blocks.
    async fn deliver_request(
        &self,
        stream: &mut dyn DeliverStream,
        envelope: &Envelope,
    ) -> Result<RequestEnd, DeliverError> {
        let payload = match envelope.unmarshal_payload() {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Received an envelope with no payload");
                return Ok(e.into());
            }
        };

        let Some(header) = payload.header.as_ref() else {
            warn!("Malformed envelope received with bad header");
            return Ok(RequestError::MissingHeader.into());
        };

        let channel_header = match header.channel_header() {
            Ok(channel_header) => channel_header,
            Err(e) => {
                warn!(error = %e, "Failed to unmarshal channel header");
                return Ok(e.into());
            }
        };
        let channel_id = channel_header.channel_id.as_str();

        let Some(chain) = self.support_manager.get_chain(channel_id) else {
            // SDKs poll for channels that are about to be created.
            debug!(channel_id, "Client request for channel not found");
            return Ok(RequestEnd::Close(Status::NotFound));
        };

        let filter = SignatureFilter::new(CHANNEL_READERS, chain.policy_manager());
        if filter.apply(envelope) != FilterResult::Forward {
            warn!(channel_id, "Received unauthorized deliver request");
            return Ok(RequestEnd::Close(Status::Forbidden));
        }

        let seek_info: SeekInfo = match unmarshal(&payload.data) {
            Ok(seek_info) => seek_info,
            Err(e) => {
                warn!(channel_id, error = %e, "Received a signed deliver request with malformed seek info");
                return Ok(RequestError::MalformedSeekInfo(e.to_string()).into());
            }
        };

        let (start, stop) = match seek_info.positions() {
            Ok(positions) => positions,
            Err(e) => {
                warn!(channel_id, error = %e, "Received seek info with missing start or stop");
                return Ok(e.into());
            }
        };

        debug!(
            channel_id,
            tx_id = %channel_header.tx_id,
            ?start,
            ?stop,
            behavior = ?seek_info.behavior,
            "Received seek info"
        );

        let reader = chain.reader();
        let (cursor, number) = reader.iterator(&start);
        let range = match resolve_range(number, &stop, reader.height()) {
            Ok(range) => range,
            Err(e) => {
                warn!(channel_id, error = %e, "Received invalid seek info");
                return Ok(e.into());
            }
        };

        self.stream_range(stream, cursor, range, seek_info.behavior, &channel_header)
            .await
    }

    /// Cursor loop: `AWAIT_READY → DELIVER` until the stop block is sent.
    async fn stream_range(
        &self,
        stream: &mut dyn DeliverStream,
        mut cursor: Box<dyn Cursor>,
        range: SeekRange,
        behavior: SeekBehavior,
        channel_header: &ChannelHeader,
    ) -> Result<RequestEnd, DeliverError> {
        let channel_id = channel_header.channel_id.as_str();

        loop {
            match behavior {
                SeekBehavior::BlockUntilReady => cursor.ready().await,
                SeekBehavior::FailIfNotReady => {
                    if !cursor.is_ready() {
                        debug!(channel_id, "No block ready for non-blocking seek");
                        return Ok(RequestEnd::Continue(Status::NotFound));
                    }
                }
            }

            let block = match cursor.next() {
                Ok(block) => block,
                Err(status) => {
                    let end = RequestEnd::from_ledger(status);
                    match end {
                        RequestEnd::Continue(_) => {
                            warn!(channel_id, %status, "Requested block not available")
                        }
                        RequestEnd::Close(_) => {
                            error!(channel_id, %status, "Error reading from channel")
                        }
                    }
                    return Ok(end);
                }
            };

            let number = block.number();
            debug!(channel_id, block_number = number, "Delivering block");
            if let Err(e) = send_block_reply(stream, block).await {
                warn!(channel_id, error = %e, "Error sending to stream");
                return Err(e);
            }

            if range.is_last(number) {
                return Ok(RequestEnd::Continue(Status::Success));
            }
        }
    }
}

#[async_trait]
impl<M: SupportManager + 'static> DeliverApi for DeliverHandler<M> {
    async fn handle(
        &self,
        stream: &mut dyn DeliverStream,
    ) -> Result<SessionOutcome, DeliverError> {
        debug!("Starting new deliver loop");
        loop {
            debug!("Attempting to read seek info message");
            let envelope = match stream.recv().await {
                Ok(Some(envelope)) => envelope,
                Ok(None) => {
                    debug!("Received EOF, hangup");
                    return Ok(SessionOutcome::Hangup);
                }
                Err(e) => {
                    warn!(error = %e, "Error reading from stream");
                    return Err(e);
                }
            };

            let end = self.deliver_request(stream, &envelope).await?;
            if let Err(e) = send_status_reply(stream, end.status()).await {
                warn!(error = %e, "Error sending to stream");
                return Err(e);
            }

            match end {
                RequestEnd::Continue(status) if status.is_success() => {
                    debug!("Done delivering, waiting for new seek info");
                }
                RequestEnd::Continue(status) => {
                    debug!(%status, "Request ended early, waiting for new seek info");
                }
                RequestEnd::Close(status) => return Ok(SessionOutcome::Terminated(status)),
            }
        }
    }
}
