//! # Deliver Client
//!
//! Builds signed seek requests and reads deliver streams.

use std::net::SocketAddr;
use std::time::{SystemTime, UNIX_EPOCH};

use ed25519_dalek::{Signer, SigningKey};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use uuid::Uuid;

use crate::adapters::FramedStream;
use crate::domain::{
    build_envelope, marshal, Block, ChannelHeader, DeliverError, DeliverResponse, Envelope,
    HeaderType, SeekBehavior, SeekInfo, SeekPosition, SignatureHeader, Status,
};

/// Builder for deliver request envelopes.
#[derive(Clone, Debug)]
pub struct SeekRequest {
    channel_id: String,
    seek_info: SeekInfo,
    tx_id: String,
}

impl SeekRequest {
    /// Request `[start, stop]` on `channel_id`, blocking until ready.
    pub fn new(channel_id: impl Into<String>, start: SeekPosition, stop: SeekPosition) -> Self {
        Self {
            channel_id: channel_id.into(),
            seek_info: SeekInfo::new(start, stop, SeekBehavior::BlockUntilReady),
            tx_id: Uuid::new_v4().to_string(),
        }
    }

    /// Set the not-ready behavior.
    pub fn behavior(mut self, behavior: SeekBehavior) -> Self {
        self.seek_info.behavior = behavior;
        self
    }

    /// Override the request id.
    pub fn tx_id(mut self, tx_id: impl Into<String>) -> Self {
        self.tx_id = tx_id.into();
        self
    }

    /// The seek info carried by the request.
    pub fn seek_info(&self) -> &SeekInfo {
        &self.seek_info
    }

    /// Envelope signed by `key`; the creator is its verifying key.
    pub fn signed(&self, key: &SigningKey) -> Result<Envelope, bincode::Error> {
        let creator = key.verifying_key().to_bytes().to_vec();
        self.envelope(creator, |payload| key.sign(payload).to_bytes().to_vec())
    }

    /// Envelope with no creator and no signature, for open channels.
    pub fn unsigned(&self) -> Result<Envelope, bincode::Error> {
        self.envelope(Vec::new(), |_| Vec::new())
    }

    fn envelope(
        &self,
        creator: Vec<u8>,
        sign: impl FnOnce(&[u8]) -> Vec<u8>,
    ) -> Result<Envelope, bincode::Error> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let channel_header = ChannelHeader {
            header_type: HeaderType::DeliverSeekInfo,
            version: 0,
            timestamp,
            channel_id: self.channel_id.clone(),
            tx_id: self.tx_id.clone(),
            epoch: 0,
        };
        let signature_header = SignatureHeader {
            creator,
            nonce: Uuid::new_v4().as_bytes().to_vec(),
        };
        build_envelope(
            &channel_header,
            &signature_header,
            marshal(&self.seek_info)?,
            sign,
        )
    }
}

/// Blocks and terminal status of one seek request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeekResult {
    /// Delivered blocks, in order.
    pub blocks: Vec<Block>,
    /// Terminal status.
    pub status: Status,
}

impl SeekResult {
    /// Numbers of the delivered blocks.
    pub fn numbers(&self) -> Vec<u64> {
        self.blocks.iter().map(Block::number).collect()
    }
}

/// Client side of a framed deliver connection.
pub struct DeliverClient<T> {
    stream: FramedStream<T>,
}

impl DeliverClient<TcpStream> {
    /// Connect to a deliver server.
    pub async fn connect(addr: SocketAddr, max_frame_size: usize) -> Result<Self, DeliverError> {
        let socket = TcpStream::connect(addr).await?;
        Ok(Self::new(socket, max_frame_size))
    }
}

impl<T> DeliverClient<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap an established byte stream.
    pub fn new(io: T, max_frame_size: usize) -> Self {
        Self {
            stream: FramedStream::new(io, max_frame_size),
        }
    }

    /// Send one request envelope.
    pub async fn send(&mut self, envelope: &Envelope) -> Result<(), DeliverError> {
        self.stream.write_frame(envelope).await
    }

    /// Next response; `None` once the server closed the connection.
    pub async fn recv(&mut self) -> Result<Option<DeliverResponse>, DeliverError> {
        self.stream.read_frame().await
    }

    /// Send `envelope` and collect responses up to its terminal status.
    pub async fn seek(&mut self, envelope: &Envelope) -> Result<SeekResult, DeliverError> {
        self.send(envelope).await?;

        let mut blocks = Vec::new();
        loop {
            match self.recv().await? {
                Some(DeliverResponse::Block(block)) => blocks.push(block),
                Some(DeliverResponse::Status(status)) => return Ok(SeekResult { blocks, status }),
                None => return Err(DeliverError::ConnectionClosed),
            }
        }
    }

    /// Close the request direction (a clean hangup).
    pub async fn close(&mut self) -> Result<(), DeliverError> {
        self.stream.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsigned_request_layers() {
        let envelope = SeekRequest::new("orders", SeekPosition::Oldest, SeekPosition::Newest)
            .behavior(SeekBehavior::FailIfNotReady)
            .tx_id("req-1")
            .unsigned()
            .unwrap();

        let payload = envelope.unmarshal_payload().unwrap();
        let header = payload.header.unwrap();
        let channel_header = header.channel_header().unwrap();
        assert_eq!(channel_header.channel_id, "orders");
        assert_eq!(channel_header.tx_id, "req-1");
        assert_eq!(channel_header.header_type, HeaderType::DeliverSeekInfo);

        let seek_info: SeekInfo = crate::domain::unmarshal(&payload.data).unwrap();
        assert_eq!(seek_info.behavior, SeekBehavior::FailIfNotReady);
        assert!(envelope.signature.is_empty());
    }

    #[test]
    fn test_signed_request_carries_creator() {
        let key = SigningKey::from_bytes(&[5u8; 32]);
        let envelope = SeekRequest::new("orders", SeekPosition::Oldest, SeekPosition::Newest)
            .signed(&key)
            .unwrap();

        let signed = envelope.as_signed_data().unwrap();
        assert_eq!(signed[0].identity, key.verifying_key().to_bytes().to_vec());
        assert_eq!(signed[0].signature.len(), 64);
    }

    #[test]
    fn test_seek_result_numbers() {
        let genesis = Block::genesis(vec![]);
        let result = SeekResult {
            blocks: vec![genesis.clone(), genesis.next(vec![])],
            status: Status::Success,
        };
        assert_eq!(result.numbers(), vec![0, 1]);
    }
}
