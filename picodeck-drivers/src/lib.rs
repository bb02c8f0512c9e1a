//! Peripheral drivers for the picodeck board
//!
//! This crate provides drivers for the SPI and GPIO peripherals, written
//! against the `picodeck-hal` traits:
//!
//! - Display pack (ST7789 320x240 panel, backlight, buttons, RGB LED)
//! - MCP3208 8-channel 12-bit ADC
//! - CD74HC4067 16-channel analog multiplexer
//!
//! [`board`] builds all of them from a parsed board configuration.
//!
//! Drivers own their control lines but never the SPI bus. Every operation
//! that talks to a device borrows the bus for its whole duration, so the
//! display and the ADC can share one bus without interleaving.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod adc;
pub mod board;
pub mod config;
pub mod display;
pub mod mux;

#[cfg(test)]
mod mock;
