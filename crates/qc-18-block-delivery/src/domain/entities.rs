//! # Domain Entities
//!
//! Blocks produced by the ledger and the signed envelopes clients send.
//!
//! Envelopes nest their parts as opaque byte strings, so each layer is
//! decoded separately and a failure can be attributed to the layer that
//! caused it.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::codec::{marshal, unmarshal};
use super::errors::{Hash, RequestError};

// =============================================================================
// Blocks
// =============================================================================

/// Header of a committed block.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockHeader {
    /// Position in the channel ledger, starting at 0 for genesis.
    pub number: u64,
    /// Hash of the previous block header (zero for genesis).
    pub previous_hash: Hash,
    /// SHA-256 over the block data.
    pub data_hash: Hash,
}

impl BlockHeader {
    /// SHA-256 over the header fields.
    pub fn hash(&self) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(self.number.to_be_bytes());
        hasher.update(self.previous_hash);
        hasher.update(self.data_hash);
        hasher.finalize().into()
    }
}

/// Opaque block payload.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockData {
    /// Serialized transactions, in commit order.
    pub data: Vec<Vec<u8>>,
}

impl BlockData {
    /// SHA-256 over the length-prefixed entries.
    pub fn hash(&self) -> Hash {
        let mut hasher = Sha256::new();
        for entry in &self.data {
            hasher.update((entry.len() as u64).to_be_bytes());
            hasher.update(entry);
        }
        hasher.finalize().into()
    }
}

/// An immutable committed block.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    /// Block header.
    pub header: BlockHeader,
    /// Block payload.
    pub data: BlockData,
}

impl Block {
    /// Create a block at `number` linked to `previous_hash`.
    pub fn new(number: u64, previous_hash: Hash, data: Vec<Vec<u8>>) -> Self {
        let data = BlockData { data };
        Self {
            header: BlockHeader {
                number,
                previous_hash,
                data_hash: data.hash(),
            },
            data,
        }
    }

    /// Create a genesis block.
    pub fn genesis(data: Vec<Vec<u8>>) -> Self {
        Self::new(0, [0u8; 32], data)
    }

    /// Create the block that follows `self`.
    pub fn next(&self, data: Vec<Vec<u8>>) -> Self {
        Self::new(self.header.number + 1, self.header.hash(), data)
    }

    /// Block number.
    pub fn number(&self) -> u64 {
        self.header.number
    }
}

// =============================================================================
// Envelopes
// =============================================================================

/// Kind of message carried by an envelope.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum HeaderType {
    /// Unclassified message.
    Message,
    /// Channel configuration update.
    Config,
    /// Deliver seek request.
    DeliverSeekInfo,
}

/// Identifies the target channel and request metadata.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelHeader {
    /// Message kind.
    pub header_type: HeaderType,
    /// Message format version.
    pub version: u32,
    /// Unix timestamp (seconds) set by the client.
    pub timestamp: u64,
    /// Target channel.
    pub channel_id: String,
    /// Client-chosen request identifier.
    pub tx_id: String,
    /// Epoch the request was created in.
    pub epoch: u64,
}

/// Identifies the creator of a signed message.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Serialized creator identity (an ed25519 verifying key).
    pub creator: Vec<u8>,
    /// Anti-replay nonce.
    pub nonce: Vec<u8>,
}

/// Payload header: nested channel and signature headers.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Header {
    /// Encoded [`ChannelHeader`].
    pub channel_header: Vec<u8>,
    /// Encoded [`SignatureHeader`].
    pub signature_header: Vec<u8>,
}

impl Header {
    /// Decode the channel header.
    pub fn channel_header(&self) -> Result<ChannelHeader, RequestError> {
        unmarshal(&self.channel_header)
            .map_err(|e| RequestError::MalformedChannelHeader(e.to_string()))
    }

    /// Decode the signature header.
    pub fn signature_header(&self) -> Result<SignatureHeader, RequestError> {
        unmarshal(&self.signature_header)
            .map_err(|e| RequestError::MalformedSignatureHeader(e.to_string()))
    }
}

/// Signed content of an envelope.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Payload {
    /// Request header; required for every deliver request.
    pub header: Option<Header>,
    /// Message body (an encoded seek info for deliver requests).
    pub data: Vec<u8>,
}

/// A signed client message.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Envelope {
    /// Encoded [`Payload`].
    pub payload: Vec<u8>,
    /// Creator signature over `payload`.
    pub signature: Vec<u8>,
}

impl Envelope {
    /// Decode the payload.
    pub fn unmarshal_payload(&self) -> Result<Payload, RequestError> {
        unmarshal(&self.payload).map_err(|e| RequestError::MalformedPayload(e.to_string()))
    }

    /// Build the signature set a policy evaluates.
    pub fn as_signed_data(&self) -> Result<Vec<SignedData>, RequestError> {
        let payload = self.unmarshal_payload()?;
        let header = payload.header.ok_or(RequestError::MissingHeader)?;
        let signature_header = header.signature_header()?;

        Ok(vec![SignedData {
            data: self.payload.clone(),
            identity: signature_header.creator,
            signature: self.signature.clone(),
        }])
    }
}

/// One signature claim handed to a policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedData {
    /// Signed bytes.
    pub data: Vec<u8>,
    /// Serialized signer identity.
    pub identity: Vec<u8>,
    /// Signature over `data`.
    pub signature: Vec<u8>,
}

/// Assemble an envelope from its parts.
pub fn build_envelope(
    channel_header: &ChannelHeader,
    signature_header: &SignatureHeader,
    data: Vec<u8>,
    sign: impl FnOnce(&[u8]) -> Vec<u8>,
) -> Result<Envelope, bincode::Error> {
    let payload = Payload {
        header: Some(Header {
            channel_header: marshal(channel_header)?,
            signature_header: marshal(signature_header)?,
        }),
        data,
    };
    let payload = marshal(&payload)?;
    let signature = sign(&payload);
    Ok(Envelope { payload, signature })
}
