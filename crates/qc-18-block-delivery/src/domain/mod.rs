//! # Domain Module
//!
//! Core domain types for Block Delivery: envelopes, blocks, seek requests
//! and the response vocabulary sent back to clients.

pub mod codec;
pub mod entities;
pub mod errors;
pub mod value_objects;

pub use codec::{marshal, unmarshal};
pub use entities::*;
pub use errors::*;
pub use value_objects::*;
