//! Board configuration
//!
//! Configuration comes either from a text file (see [`parse`]) or, with the
//! `serde` feature, from postcard-serialized binary data.

pub mod hardware;
pub mod parse;

pub use hardware::*;
pub use parse::{parse_config, parse_pin_string, ParseError, ParseErrorKind};

/// Errors from the binary configuration format
#[cfg(feature = "serde")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Output buffer too small
    BufferTooSmall,
    /// Stored bytes do not decode to a configuration
    Deserialize,
}

/// Serialize a board configuration into `buf`, returning the used prefix
#[cfg(feature = "serde")]
pub fn to_bytes<'a>(
    config: &BoardConfig,
    buf: &'a mut [u8],
) -> Result<&'a mut [u8], StoreError> {
    postcard::to_slice(config, buf).map_err(|_| StoreError::BufferTooSmall)
}

/// Deserialize a board configuration stored with [`to_bytes`]
#[cfg(feature = "serde")]
pub fn from_bytes(bytes: &[u8]) -> Result<BoardConfig, StoreError> {
    postcard::from_bytes(bytes).map_err(|_| StoreError::Deserialize)
}
