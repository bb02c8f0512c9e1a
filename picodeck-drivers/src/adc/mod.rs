//! Analog-to-digital converter drivers

pub mod mcp3208;

pub use mcp3208::{AdcError, ConversionSample, Mcp3208, VrefError};
