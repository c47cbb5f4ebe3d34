//! # Integration Tests
//!
//! Full nodes started on an ephemeral port, driven by `DeliverClient`.

pub mod deliver_flow;
