//! # QC-18 Block Delivery
//!
//! Serves committed blocks of a channel ledger to remote clients.
//!
//! **Subsystem ID:** 18  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! A client opens a session and sends signed seek requests. Each request
//! names a channel and a range (`Oldest`, `Newest` or a block number at
//! either end); the node answers with the blocks of that range in order,
//! then a single status. Seeking past the newest block waits for new
//! appends, which is how clients tail a channel.
//!
//! ## Status Semantics
//!
//! | Condition | Status | Session |
//! |-----------|--------|---------|
//! | Range delivered | `SUCCESS` | continues |
//! | Malformed envelope, header or seek info | `BAD_REQUEST` | ends |
//! | Stop before start | `BAD_REQUEST` | ends |
//! | Unknown channel | `NOT_FOUND` | ends |
//! | Readers policy not satisfied | `FORBIDDEN` | ends |
//! | Non-blocking seek, block not ready | `NOT_FOUND` | continues |
//! | Position outside the retained range | `NOT_FOUND` | continues |
//! | Other ledger failure | forwarded | ends |
//!
//! ## Module Structure
//!
//! ```text
//! qc-18-block-delivery/
//! ├── domain/          # Blocks, envelopes, seek info, status, errors
//! ├── algorithms/      # Range resolution, signature filter
//! ├── ports/           # DeliverApi (inbound) + ledger/policy/transport traits
//! ├── application/     # DeliverHandler session loop, response encoder
//! ├── adapters/        # RamLedger, policies, registry, transports, server
//! ├── client.rs        # SeekRequest builder, DeliverClient
//! └── config.rs        # DeliverConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod client;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{
    memory_stream, AcceptAllPolicy, ChainRegistry, ChainSupport, DeliverServer, FramedStream,
    LedgerBounds, MemoryClient, MemoryStream, RamLedger, RejectAllPolicy, SignaturePolicy,
    StaticPolicyManager,
};
pub use algorithms::{resolve_range, FilterResult, SeekRange, SignatureFilter};
pub use application::DeliverHandler;
pub use client::{DeliverClient, SeekRequest, SeekResult};
pub use config::{ConfigError, DeliverConfig};
pub use domain::{
    build_envelope, marshal, unmarshal, Block, BlockData, BlockHeader, ChannelHeader,
    DeliverError, DeliverResponse, Envelope, Header, HeaderType, LedgerError, Payload,
    PolicyError, RequestError, SeekBehavior, SeekInfo, SeekPosition, SessionOutcome,
    SignatureHeader, SignedData, Status,
};
pub use ports::{
    Cursor, DeliverApi, DeliverStream, LedgerReader, Policy, PolicyManager, Support,
    SupportManager, CHANNEL_READERS,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
