//! Config-driven pin allocation
//!
//! Board configuration names pins by GPIO number. A [`PinBank`] turns those
//! numbers into owned lines and buses; the chip-specific implementation
//! decides how (embassy `AnyPin`, rp2040-hal dynamic pins, ...).

use crate::gpio::{InputPin, OutputPin};
use crate::pwm::PwmPin;
use crate::spi::{SpiBus, SpiConfig};

/// Error when requesting a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number out of range
    InvalidPin,
    /// Pin already taken
    AlreadyTaken,
    /// Pin cannot serve the requested function (e.g. no PWM slice, not an
    /// SPI pin)
    Unsupported,
}

/// Source of GPIO lines and buses, addressed by pin number
pub trait PinBank {
    type Output: OutputPin;
    type Input: InputPin;
    type Pwm: PwmPin;
    type Bus: SpiBus;

    /// Take `pin` as a push-pull output, starting at physical level `high`
    fn output(&mut self, pin: u8, high: bool) -> Result<Self::Output, PinError>;

    /// Take `pin` as an input, with the internal pull-up if `pull_up`
    fn input(&mut self, pin: u8, pull_up: bool) -> Result<Self::Input, PinError>;

    /// Take `pin` as a PWM output running at `frequency_hz`
    fn pwm(&mut self, pin: u8, frequency_hz: u32) -> Result<Self::Pwm, PinError>;

    /// Take the bus pins and bring the SPI peripheral up with `config`
    fn spi(&mut self, pins: &SpiPins, config: &SpiConfig) -> Result<Self::Bus, PinError>;
}

/// Pins of one SPI bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiPins {
    pub sck: u8,
    pub mosi: u8,
    /// `None` for write-only buses
    pub miso: Option<u8>,
    /// Internal pull-up on MISO, so the line idles high when no chip drives it
    pub miso_pull_up: bool,
}
