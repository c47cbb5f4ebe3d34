//! # Node Configuration
//!
//! Deliver and genesis settings, with environment overrides.
//!
//! | Variable | Field |
//! |----------|-------|
//! | `QC_DELIVER_ADDR` | `deliver.listen_addr` |
//! | `QC_DELIVER_MAX_FRAME` | `deliver.max_frame_size` |
//! | `QC_LEDGER_RETENTION` | `deliver.ledger_retention` |
//! | `QC_DELIVER_CHANNELS` | `deliver.channels` (comma separated) |
//! | `QC_READER_KEYS` | `deliver.reader_keys` (comma separated hex) |
//! | `QC_READER_THRESHOLD` | `deliver.reader_threshold` |

use qc_18_block_delivery::DeliverConfig;
use tracing::{info, warn};

use crate::genesis::GenesisConfig;

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// Block delivery configuration.
    pub deliver: DeliverConfig,
    /// Genesis configuration shared by all channels.
    pub genesis: GenesisConfig,
}

impl NodeConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Overlay values from `lookup`. Unparsable values are ignored with a warning.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("QC_DELIVER_ADDR") {
            match addr.parse() {
                Ok(addr) => self.deliver.listen_addr = addr,
                Err(_) => warn!(value = %addr, "QC_DELIVER_ADDR must be host:port"),
            }
        }

        if let Some(size) = lookup("QC_DELIVER_MAX_FRAME") {
            match size.parse() {
                Ok(size) => self.deliver.max_frame_size = size,
                Err(_) => warn!(value = %size, "QC_DELIVER_MAX_FRAME must be a byte count"),
            }
        }

        if let Some(retention) = lookup("QC_LEDGER_RETENTION") {
            match retention.parse() {
                Ok(retention) => self.deliver.ledger_retention = retention,
                Err(_) => warn!(value = %retention, "QC_LEDGER_RETENTION must be a block count"),
            }
        }

        if let Some(channels) = lookup("QC_DELIVER_CHANNELS") {
            self.deliver.channels = split_list(&channels);
        }

        if let Some(keys) = lookup("QC_READER_KEYS") {
            self.deliver.reader_keys = split_list(&keys);
            info!(count = self.deliver.reader_keys.len(), "Loaded reader keys from environment");
        }

        if let Some(threshold) = lookup("QC_READER_THRESHOLD") {
            match threshold.parse() {
                Ok(threshold) => self.deliver.reader_threshold = threshold,
                Err(_) => warn!(value = %threshold, "QC_READER_THRESHOLD must be a count"),
            }
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
