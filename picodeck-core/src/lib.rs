//! Board-agnostic types for the picodeck peripheral drivers
//!
//! This crate contains everything that does not touch hardware:
//!
//! - Range-checked channel numbers for the ADC and the multiplexer
//! - Board configuration (pin map, bus settings, reference voltage)
//! - A small text parser for board configuration files

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod channel;
pub mod config;

pub use channel::{AdcChannel, MuxChannel, RangeError};
