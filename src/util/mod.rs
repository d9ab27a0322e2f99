//! Utility types and functions shared across the parser.
//!
//! - [`Error`] / [`Result`] - Error handling
//! - [`fixed`] - Fixed-point scalars and packed colors
//! - [`base64`] - Inline data-URI payload decoding

pub mod base64;
mod error;
pub mod fixed;

pub use error::*;
