//! # Node Container
//!
//! Builds the channel registry and deliver handler from configuration.

pub mod config;

use std::sync::Arc;

use qc_18_block_delivery::{
    ChainRegistry, ChainSupport, ConfigError, DeliverHandler, LedgerError, RamLedger,
    StaticPolicyManager, CHANNEL_READERS,
};
use thiserror::Error;
use tracing::info;

use crate::genesis::{GenesisBuilder, GenesisError};
pub use config::NodeConfig;

/// Node assembly errors.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Configuration rejected.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Genesis creation failed.
    #[error("Genesis failed: {0}")]
    Genesis(#[from] GenesisError),

    /// Channel creation failed.
    #[error("Channel setup failed: {0}")]
    Ledger(#[from] LedgerError),
}

/// Everything a running deliver node shares across sessions.
pub struct NodeContainer {
    /// Node configuration.
    pub config: NodeConfig,
    /// Channels served by this node.
    pub registry: Arc<ChainRegistry>,
    /// Session handler over `registry`.
    pub handler: Arc<DeliverHandler<ChainRegistry>>,
}

impl NodeContainer {
    /// Validate `config` and create every configured channel from genesis.
    pub fn new(config: NodeConfig) -> Result<Self, ContainerError> {
        config.deliver.validate()?;

        let reader_policy = config.deliver.reader_policy()?;
        let genesis = GenesisBuilder::new(config.genesis.clone());
        let registry = Arc::new(ChainRegistry::new());

        for channel_id in &config.deliver.channels {
            let block = genesis.build(channel_id)?;
            let ledger = RamLedger::with_genesis(config.deliver.ledger_retention, block)?;
            let policies = StaticPolicyManager::new();
            policies.set_policy(CHANNEL_READERS, Arc::clone(&reader_policy));
            registry.create_channel(channel_id.clone(), ChainSupport::new(policies, ledger))?;
        }

        info!(
            channels = ?registry.channel_ids(),
            open_readers = config.deliver.reader_keys.is_empty(),
            "Node container initialized"
        );

        let handler = Arc::new(DeliverHandler::new(Arc::clone(&registry)));
        Ok(Self {
            config,
            registry,
            handler,
        })
    }
}
