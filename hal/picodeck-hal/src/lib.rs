//! picodeck Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the picodeck drivers are written
//! against. Chip-specific HALs either implement them directly or go through
//! the [`eh`] adapters, which wrap any `embedded-hal` 1.0 implementation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (board bring-up, loops)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  picodeck-drivers (ST7789, MCP3208,     │
//! │  CD74HC4067)                            │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  picodeck-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  embedded-hal 1.0 implementation        │
//! │  (embassy-rp, rp2040-hal, ...)          │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`spi::SpiBus`] - SPI bus operations
//! - [`spi::SpiDevice`] - Chip-select scoped transactions on a shared bus
//! - [`pwm::PwmPin`] - Duty-cycle outputs
//! - [`pins::PinBank`] - Lines and buses by GPIO number, for config-driven setup
//! - [`delay::DelayMs`] - Blocking delays

#![no_std]
#![deny(unsafe_code)]

pub mod delay;
pub mod eh;
pub mod gpio;
pub mod pins;
pub mod pwm;
pub mod spi;

// Re-export key traits at crate root for convenience
pub use delay::DelayMs;
pub use gpio::{ConfiguredPin, InputPin, OutputPin};
pub use pins::{PinBank, PinError, SpiPins};
pub use pwm::PwmPin;
pub use spi::{SpiBus, SpiConfig, SpiDevice};
