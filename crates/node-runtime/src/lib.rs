//! # Node Runtime Library
//!
//! Wiring for a deliver node, exposed for tests. The main entry point is
//! the `qc-deliver-node` binary.
//!
//! ## Modular Structure
//!
//! - `container/` - Node configuration and the channel registry it builds
//! - `genesis/` - Genesis block creation per channel
//! - `runtime` - Server lifecycle (start, shutdown)

#![warn(missing_docs)]

pub mod container;
pub mod genesis;
pub mod runtime;

pub use container::{ContainerError, NodeConfig, NodeContainer};
pub use genesis::{GenesisBuilder, GenesisConfig, GenesisError};
pub use runtime::NodeRuntime;
