//! # Genesis Block Builder
//!
//! Creates the genesis block of each channel served by the node.

use std::time::{SystemTime, UNIX_EPOCH};

use qc_18_block_delivery::Block;
use thiserror::Error;

/// Maximum genesis extra data.
pub const MAX_EXTRA_DATA: usize = 32;

/// Genesis block creation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenesisError {
    /// Invalid genesis configuration.
    #[error("Invalid genesis configuration: {0}")]
    InvalidConfig(String),
}

/// Genesis block configuration.
#[derive(Debug, Clone)]
pub struct GenesisConfig {
    /// Genesis timestamp (Unix seconds). If None, uses current time.
    pub timestamp: Option<u64>,

    /// Extra data (max 32 bytes).
    pub extra_data: Vec<u8>,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            timestamp: None,
            extra_data: b"Quantum-Chain Genesis".to_vec(),
        }
    }
}

/// Builds channel genesis blocks.
pub struct GenesisBuilder {
    config: GenesisConfig,
}

impl GenesisBuilder {
    /// Create a builder.
    pub fn new(config: GenesisConfig) -> Self {
        Self { config }
    }

    /// Genesis block for `channel_id`.
    ///
    /// The block data records the channel id, the timestamp and the extra
    /// data, so every channel starts from a distinct genesis hash.
    pub fn build(&self, channel_id: &str) -> Result<Block, GenesisError> {
        if self.config.extra_data.len() > MAX_EXTRA_DATA {
            return Err(GenesisError::InvalidConfig(format!(
                "extra_data is {} bytes (max {})",
                self.config.extra_data.len(),
                MAX_EXTRA_DATA
            )));
        }
        if channel_id.is_empty() {
            return Err(GenesisError::InvalidConfig("empty channel id".to_string()));
        }

        let timestamp = self.config.timestamp.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0)
        });

        Ok(Block::genesis(vec![
            channel_id.as_bytes().to_vec(),
            timestamp.to_be_bytes().to_vec(),
            self.config.extra_data.clone(),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> GenesisBuilder {
        GenesisBuilder::new(GenesisConfig {
            timestamp: Some(1_700_000_000),
            ..GenesisConfig::default()
        })
    }

    #[test]
    fn test_genesis_is_block_zero() {
        let genesis = builder().build("orders").unwrap();
        assert_eq!(genesis.number(), 0);
        assert_eq!(genesis.header.previous_hash, [0u8; 32]);
    }

    #[test]
    fn test_channels_get_distinct_genesis() {
        let a = builder().build("a").unwrap();
        let b = builder().build("b").unwrap();
        assert_ne!(a.header.hash(), b.header.hash());
    }

    #[test]
    fn test_deterministic_with_fixed_timestamp() {
        assert_eq!(builder().build("a").unwrap(), builder().build("a").unwrap());
    }

    #[test]
    fn test_oversized_extra_data_rejected() {
        let builder = GenesisBuilder::new(GenesisConfig {
            extra_data: vec![0u8; 33],
            ..GenesisConfig::default()
        });
        assert!(builder.build("a").is_err());
    }
}
