//! MCP3208 8-channel 12-bit ADC (SPI)
//!
//! # Protocol
//!
//! One conversion is a 3-byte full-duplex exchange with chip-select held
//! low throughout:
//!
//! ```text
//! MOSI: 0 0 0 0 0 1 SGL D2 | D1 D0 x x x x x x | x x x x x x x x
//! MISO: ? ? ? ? ? ? ? ?    | ? ? ? 0 B11..B8   | B7 .. B0
//! ```
//!
//! The start bit and single-ended mode bit sit at the bottom of the first
//! byte so that the 12 result bits land right-aligned in bytes 1 and 2.

use picodeck_core::config::Mcp3208Config;
use picodeck_core::{AdcChannel, RangeError};
use picodeck_hal::{OutputPin, SpiBus, SpiConfig, SpiDevice};

use crate::config::spi_config;

/// Start bit + single-ended mode in the first request byte
pub const START_SINGLE_ENDED: u8 = 0b0000_0110;

/// Result bits present in the second response byte
pub const RESULT_HIGH_MASK: u8 = 0x0F;

/// Largest raw conversion value (12-bit)
pub const FULL_SCALE: u16 = 4095;

/// Bytes written by the connection self-test
pub const SELF_TEST_PATTERN: [u8; 2] = [0xFF, 0xFF];

/// One conversion result
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConversionSample {
    /// Channel that was converted
    pub channel: AdcChannel,
    /// Raw 12-bit reading (0-4095)
    pub raw: u16,
    /// Reading scaled by the reference voltage
    pub voltage: f32,
}

/// MCP3208 errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcError<E> {
    /// Channel outside 0-7; nothing was sent
    Range(RangeError),
    /// SPI transfer failed
    Bus(E),
}

/// Reference voltage rejected at construction
///
/// The reference must be finite and strictly positive; anything else would
/// scale every reading to zero, a negative value or NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VrefError {
    pub vref: f32,
}

fn check_vref(vref: f32) -> Result<f32, VrefError> {
    if vref.is_finite() && vref > 0.0 {
        Ok(vref)
    } else {
        Err(VrefError { vref })
    }
}

impl<E> From<RangeError> for AdcError<E> {
    fn from(err: RangeError) -> Self {
        AdcError::Range(err)
    }
}

/// Build the 3-byte request that selects `channel` in single-ended mode
pub fn encode_request(channel: AdcChannel) -> [u8; 3] {
    [
        START_SINGLE_ENDED | channel.high_bit(),
        channel.low_bits() << 6,
        0x00,
    ]
}

/// Extract the 12-bit reading from a 3-byte response
pub fn decode_response(response: &[u8; 3]) -> u16 {
    (((response[1] & RESULT_HIGH_MASK) as u16) << 8) | response[2] as u16
}

/// Scale a raw reading to volts
pub fn raw_to_voltage(raw: u16, vref: f32) -> f32 {
    (raw as f32 / FULL_SCALE as f32) * vref
}

/// MCP3208 driver
///
/// Owns the chip-select line; the SPI bus is borrowed per call.
pub struct Mcp3208<CS> {
    device: SpiDevice<CS>,
    /// Reference voltage in volts
    vref: f32,
}

impl<CS: OutputPin> Mcp3208<CS> {
    /// Default bus settings (1 MHz, mode 0; the chip supports up to 2 MHz at 5V)
    pub fn default_spi() -> SpiConfig {
        spi_config(&Mcp3208Config::DEFAULT_SPI)
    }

    /// Create a driver with default bus settings
    ///
    /// # Arguments
    /// - `cs`: Chip-select line (driven high immediately)
    /// - `vref`: Reference voltage in volts (typically 3.3)
    ///
    /// Fails if `vref` is not a finite, positive voltage. The chip-select
    /// line is left untouched in that case.
    pub fn new(cs: CS, vref: f32) -> Result<Self, VrefError> {
        Self::with_spi(cs, Self::default_spi(), vref)
    }

    /// Create a driver with explicit bus settings
    pub fn with_spi(cs: CS, spi: SpiConfig, vref: f32) -> Result<Self, VrefError> {
        let vref = check_vref(vref)?;
        Ok(Self {
            device: SpiDevice::new(cs, spi),
            vref,
        })
    }

    /// Create a driver from board configuration
    ///
    /// Fails for a configured reference of 0 mV.
    pub fn from_config(cs: CS, config: &Mcp3208Config) -> Result<Self, VrefError> {
        Self::with_spi(cs, spi_config(&config.spi), config.vref_volts())
    }

    /// Reference voltage in volts
    pub fn vref(&self) -> f32 {
        self.vref
    }

    /// Convert one channel
    ///
    /// Channels outside 0-7 fail with [`AdcError::Range`] before any bus
    /// activity.
    pub fn read_channel<B: SpiBus>(
        &mut self,
        bus: &mut B,
        channel: u8,
    ) -> Result<ConversionSample, AdcError<B::Error>> {
        let channel = AdcChannel::new(channel)?;
        self.read(bus, channel).map_err(AdcError::Bus)
    }

    /// Convert one already-validated channel
    pub fn read<B: SpiBus>(
        &mut self,
        bus: &mut B,
        channel: AdcChannel,
    ) -> Result<ConversionSample, B::Error> {
        let request = encode_request(channel);
        let mut response = [0u8; 3];

        self.device
            .transaction(bus, |bus| bus.transfer(&mut response, &request))?;

        let raw = decode_response(&response);
        Ok(ConversionSample {
            channel,
            raw,
            voltage: raw_to_voltage(raw, self.vref),
        })
    }

    /// Convert channels 0-7 in ascending order, one after another
    ///
    /// Stops at the first failed conversion.
    pub fn read_all_channels<B: SpiBus>(
        &mut self,
        bus: &mut B,
    ) -> Result<[ConversionSample; AdcChannel::COUNT], AdcError<B::Error>> {
        let mut samples = [ConversionSample::default(); AdcChannel::COUNT];
        for (slot, channel) in samples.iter_mut().zip(AdcChannel::all()) {
            *slot = self.read(bus, channel).map_err(AdcError::Bus)?;
        }
        Ok(samples)
    }

    /// Convert one channel and return only the raw reading (0-4095)
    pub fn read_channel_raw<B: SpiBus>(
        &mut self,
        bus: &mut B,
        channel: u8,
    ) -> Result<u16, AdcError<B::Error>> {
        self.read_channel(bus, channel).map(|s| s.raw)
    }

    /// Convert one channel and return only the voltage
    pub fn read_channel_voltage<B: SpiBus>(
        &mut self,
        bus: &mut B,
        channel: u8,
    ) -> Result<f32, AdcError<B::Error>> {
        self.read_channel(bus, channel).map(|s| s.voltage)
    }

    /// Best-effort link check
    ///
    /// Writes `FF FF`, reads two bytes back and reports whether both read
    /// `FF`. Bus errors are reported as `false` rather than returned; this
    /// is a diagnostic, not a correctness check.
    ///
    /// Relies on MISO idling high while the chip is not driving it. That
    /// holds with a pull-up on the line and is board-dependent: a floating
    /// or pulled-down MISO makes this return `false` even when the chip is
    /// fine.
    pub fn validate_connection<B: SpiBus>(&mut self, bus: &mut B) -> bool {
        let result = self.device.transaction(bus, |bus| {
            bus.write(&SELF_TEST_PATTERN)?;
            let mut echo = [0u8; 2];
            bus.read(&mut echo)?;
            Ok(echo)
        });

        match result {
            Ok(echo) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("MCP3208 self-test read {:02x}", echo);
                echo == SELF_TEST_PATTERN
            }
            Err(_) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("MCP3208 self-test: bus error");
                false
            }
        }
    }

    /// Release the chip-select line
    pub fn release(self) -> CS {
        self.device.release()
    }
}
