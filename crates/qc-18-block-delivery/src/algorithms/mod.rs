//! # Algorithms Module
//!
//! Pure request-processing steps of a deliver session: seek range
//! resolution and signature-policy filtering.

pub mod range_resolver;
pub mod sigfilter;

pub use range_resolver::{resolve_range, SeekRange};
pub use sigfilter::{FilterResult, SignatureFilter};
