//! # Block Delivery Configuration
//!
//! Listener, framing and channel settings for a deliver node.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adapters::{AcceptAllPolicy, SignaturePolicy};
use crate::ports::Policy;

/// Default deliver port.
pub const DEFAULT_DELIVER_PORT: u16 = 7050;

/// Default maximum inbound frame (1MB).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Default number of blocks retained per channel.
pub const DEFAULT_LEDGER_RETENTION: usize = 1000;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Frame limit of zero.
    #[error("max_frame_size cannot be 0")]
    ZeroFrameSize,

    /// Retention of zero.
    #[error("ledger_retention cannot be 0")]
    ZeroRetention,

    /// A reader key is not 32 hex-encoded bytes.
    #[error("Invalid reader key {0}: expected 64 hex chars")]
    InvalidReaderKey(String),

    /// Threshold larger than the reader set.
    #[error("reader_threshold {threshold} exceeds {keys} reader keys")]
    ThresholdTooHigh {
        /// Configured threshold
        threshold: usize,
        /// Configured keys
        keys: usize,
    },

    /// Reader keys configured with a threshold of zero.
    #[error("reader_threshold cannot be 0 when reader keys are configured")]
    ZeroThreshold,

    /// Channel id empty.
    #[error("Channel ids cannot be empty")]
    EmptyChannelId,
}

/// Block delivery configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DeliverConfig {
    /// Address the deliver server binds.
    pub listen_addr: SocketAddr,

    /// Largest inbound frame accepted, in bytes.
    pub max_frame_size: usize,

    /// Blocks retained per channel ledger.
    pub ledger_retention: usize,

    /// Channels created at startup.
    pub channels: Vec<String>,

    /// Hex-encoded ed25519 keys allowed to read. Empty means open channels.
    pub reader_keys: Vec<String>,

    /// Distinct reader signatures required per request.
    pub reader_threshold: usize,
}

impl Default for DeliverConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_DELIVER_PORT),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            ledger_retention: DEFAULT_LEDGER_RETENTION,
            channels: vec!["testchainid".to_string()],
            reader_keys: Vec::new(),
            reader_threshold: 1,
        }
    }
}

impl DeliverConfig {
    /// Create a config for testing (ephemeral port, small limits).
    pub fn for_testing() -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0),
            max_frame_size: 64 * 1024,
            ledger_retention: 16,
            channels: vec!["testchainid".to_string()],
            reader_keys: Vec::new(),
            reader_threshold: 1,
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_frame_size == 0 {
            return Err(ConfigError::ZeroFrameSize);
        }
        if self.ledger_retention == 0 {
            return Err(ConfigError::ZeroRetention);
        }
        if self.channels.iter().any(|c| c.is_empty()) {
            return Err(ConfigError::EmptyChannelId);
        }
        let keys = self.reader_key_bytes()?;
        if !keys.is_empty() && self.reader_threshold == 0 {
            return Err(ConfigError::ZeroThreshold);
        }
        if !keys.is_empty() && self.reader_threshold > keys.len() {
            return Err(ConfigError::ThresholdTooHigh {
                threshold: self.reader_threshold,
                keys: keys.len(),
            });
        }
        Ok(())
    }

    /// Decode the configured reader keys.
    pub fn reader_key_bytes(&self) -> Result<Vec<[u8; 32]>, ConfigError> {
        self.reader_keys
            .iter()
            .map(|key| {
                hex::decode(key)
                    .ok()
                    .and_then(|bytes| <[u8; 32]>::try_from(bytes.as_slice()).ok())
                    .ok_or_else(|| ConfigError::InvalidReaderKey(key.clone()))
            })
            .collect()
    }

    /// Policy installed as the channel readers policy.
    pub fn reader_policy(&self) -> Result<Arc<dyn Policy>, ConfigError> {
        let keys = self.reader_key_bytes()?;
        if keys.is_empty() {
            return Ok(Arc::new(AcceptAllPolicy));
        }
        if self.reader_threshold == 0 {
            return Err(ConfigError::ZeroThreshold);
        }
        Ok(Arc::new(SignaturePolicy::new(keys, self.reader_threshold)))
    }
}
