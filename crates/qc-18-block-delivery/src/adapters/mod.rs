//! # Adapters Module
//!
//! Concrete implementations of the outbound ports: an in-memory channel
//! ledger, policies, the chain registry, and client transports.

pub mod framed;
pub mod memory_stream;
pub mod policy;
pub mod ram_ledger;
pub mod registry;
pub mod server;

pub use framed::FramedStream;
pub use memory_stream::{memory_stream, MemoryClient, MemoryStream};
pub use policy::{AcceptAllPolicy, RejectAllPolicy, SignaturePolicy, StaticPolicyManager};
pub use ram_ledger::{LedgerBounds, NotFoundCursor, RamCursor, RamLedger};
pub use registry::{ChainRegistry, ChainSupport};
pub use server::DeliverServer;
