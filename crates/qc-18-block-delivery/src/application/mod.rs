//! # Application Module
//!
//! The deliver session state machine and its response encoder.

pub mod handler;
pub mod replies;

pub use handler::DeliverHandler;
pub use replies::{block_reply, send_block_reply, send_status_reply, status_reply};
