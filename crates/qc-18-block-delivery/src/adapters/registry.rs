//! # Chain Registry
//!
//! Channel id → deliver support, safe to extend while sessions are running.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use super::policy::StaticPolicyManager;
use super::ram_ledger::RamLedger;
use crate::domain::LedgerError;
use crate::ports::{LedgerReader, PolicyManager, Support, SupportManager};

/// Policy manager and ledger of one channel.
pub struct ChainSupport {
    policy_manager: Arc<StaticPolicyManager>,
    ledger: Arc<RamLedger>,
}

impl ChainSupport {
    /// Bundle a channel's policies and ledger.
    pub fn new(policy_manager: StaticPolicyManager, ledger: RamLedger) -> Self {
        Self {
            policy_manager: Arc::new(policy_manager),
            ledger: Arc::new(ledger),
        }
    }

    /// Writable handle to the channel ledger.
    pub fn ledger(&self) -> &RamLedger {
        &self.ledger
    }

    /// Mutable policy set of the channel.
    pub fn policies(&self) -> &StaticPolicyManager {
        &self.policy_manager
    }
}

impl Support for ChainSupport {
    fn policy_manager(&self) -> Arc<dyn PolicyManager> {
        self.policy_manager.clone()
    }

    fn reader(&self) -> Arc<dyn LedgerReader> {
        self.ledger.clone()
    }
}

/// Registry of the channels this node serves.
#[derive(Default)]
pub struct ChainRegistry {
    chains: RwLock<HashMap<String, Arc<ChainSupport>>>,
}

impl ChainRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new channel.
    pub fn create_channel(
        &self,
        channel_id: impl Into<String>,
        support: ChainSupport,
    ) -> Result<Arc<ChainSupport>, LedgerError> {
        let channel_id = channel_id.into();
        let mut chains = self.chains.write();
        if chains.contains_key(&channel_id) {
            return Err(LedgerError::ChannelExists(channel_id));
        }

        let support = Arc::new(support);
        chains.insert(channel_id.clone(), Arc::clone(&support));
        info!(channel_id = %channel_id, "Channel registered");
        Ok(support)
    }

    /// Concrete support for `channel_id`.
    pub fn channel(&self, channel_id: &str) -> Option<Arc<ChainSupport>> {
        self.chains.read().get(channel_id).cloned()
    }

    /// Ids of all registered channels, sorted.
    pub fn channel_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.chains.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl SupportManager for ChainRegistry {
    fn get_chain(&self, channel_id: &str) -> Option<Arc<dyn Support>> {
        self.channel(channel_id).map(|s| s as Arc<dyn Support>)
    }
}
