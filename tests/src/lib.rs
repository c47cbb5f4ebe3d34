//! # Quantum-Chain Deliver Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # Node-level deliver sessions over TCP
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p qc-tests integration::
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
