//! Binary encoding support for descriptors.
//!
//! This module provides the write side of the descriptor buffer, complementing
//! [`crate::bit_reader`] with serialization capabilities.

/// Bit-level writer for encoding binary data.
pub mod writer;


pub use writer::BitWriter;
