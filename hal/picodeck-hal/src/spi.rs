//! SPI bus abstractions
//!
//! [`SpiBus`] is the byte-level transfer primitive. It knows nothing about
//! chip-select; devices sharing one bus each own a [`SpiDevice`], which
//! asserts its chip-select line for exactly the duration of one
//! [`SpiDevice::transaction`].
//!
//! The bus is never owned by a driver. Every driver operation borrows it
//! mutably, so two transactions on the same bus cannot overlap. Callers
//! sharing a bus between cores must still put their own mutex around it.

use crate::gpio::OutputPin;

/// SPI bus master
///
/// Provides basic SPI transfer operations for communicating with
/// peripheral devices.
pub trait SpiBus {
    /// Error type for SPI operations
    type Error;

    /// Transfer data (simultaneous read/write)
    ///
    /// Writes data from `write` buffer while reading into `read` buffer.
    /// Both buffers must be the same length.
    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error>;

    /// Write data without reading
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Read data (writes zeros)
    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Apply clock rate and mode before talking to a device
    ///
    /// Buses dedicated to a single device may leave this as a no-op.
    fn configure(&mut self, _config: &SpiConfig) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Wait until all queued words have left the shift register
    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<T: SpiBus + ?Sized> SpiBus for &mut T {
    type Error = T::Error;

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        T::transfer(self, read, write)
    }

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        T::write(self, data)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        T::read(self, buf)
    }

    fn configure(&mut self, config: &SpiConfig) -> Result<(), Self::Error> {
        T::configure(self, config)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        T::flush(self)
    }
}

/// SPI configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Clock polarity
    pub polarity: Polarity,
    /// Clock phase
    pub phase: Phase,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            frequency: 1_000_000, // 1 MHz
            polarity: Polarity::IdleLow,
            phase: Phase::CaptureOnFirstTransition,
        }
    }
}

impl SpiConfig {
    /// Create a configuration from a clock rate and SPI mode
    pub fn new(frequency: u32, mode: Mode) -> Self {
        let (polarity, phase) = mode.into();
        Self {
            frequency,
            polarity,
            phase,
        }
    }

    /// Combined polarity and phase as an SPI mode
    pub fn mode(&self) -> Mode {
        match (self.polarity, self.phase) {
            (Polarity::IdleLow, Phase::CaptureOnFirstTransition) => Mode::Mode0,
            (Polarity::IdleLow, Phase::CaptureOnSecondTransition) => Mode::Mode1,
            (Polarity::IdleHigh, Phase::CaptureOnFirstTransition) => Mode::Mode2,
            (Polarity::IdleHigh, Phase::CaptureOnSecondTransition) => Mode::Mode3,
        }
    }
}

/// SPI clock polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Clock idles low (CPOL=0)
    IdleLow,
    /// Clock idles high (CPOL=1)
    IdleHigh,
}

/// SPI clock phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Data captured on first clock transition (CPHA=0)
    CaptureOnFirstTransition,
    /// Data captured on second clock transition (CPHA=1)
    CaptureOnSecondTransition,
}

/// SPI mode (combined polarity and phase)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Mode 0: CPOL=0, CPHA=0
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

impl From<Mode> for (Polarity, Phase) {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Mode0 => (Polarity::IdleLow, Phase::CaptureOnFirstTransition),
            Mode::Mode1 => (Polarity::IdleLow, Phase::CaptureOnSecondTransition),
            Mode::Mode2 => (Polarity::IdleHigh, Phase::CaptureOnFirstTransition),
            Mode::Mode3 => (Polarity::IdleHigh, Phase::CaptureOnSecondTransition),
        }
    }
}

/// One device on a shared SPI bus
///
/// Owns the device's chip-select line (active-low) and the bus settings
/// the device needs. The line is driven high (deselected) on construction.
pub struct SpiDevice<CS> {
    cs: CS,
    config: SpiConfig,
}

impl<CS: OutputPin> SpiDevice<CS> {
    /// Create a device and deselect it
    pub fn new(mut cs: CS, config: SpiConfig) -> Self {
        cs.set_high();
        Self { cs, config }
    }

    /// Bus settings applied at the start of every transaction
    pub fn config(&self) -> &SpiConfig {
        &self.config
    }

    /// Check whether chip-select is currently asserted
    pub fn is_selected(&self) -> bool {
        self.cs.is_set_low()
    }

    /// Run `body` with this device selected
    ///
    /// Applies the device's bus settings, asserts chip-select, runs `body`,
    /// flushes the bus and deasserts chip-select. Chip-select is released on
    /// every exit path: normal return, an error from `body` or the flush, or
    /// a panic unwinding through `body`. The first error is returned.
    pub fn transaction<B, T, F>(&mut self, bus: &mut B, body: F) -> Result<T, B::Error>
    where
        B: SpiBus,
        F: FnOnce(&mut B) -> Result<T, B::Error>,
    {
        bus.configure(&self.config)?;

        let _selected = Selected::assert(&mut self.cs);
        let value = body(bus)?;
        bus.flush()?;

        Ok(value)
    }

    /// Release the chip-select line
    pub fn release(self) -> CS {
        self.cs
    }
}

/// Chip-select held low until dropped
struct Selected<'a, CS: OutputPin> {
    cs: &'a mut CS,
}

impl<'a, CS: OutputPin> Selected<'a, CS> {
    fn assert(cs: &'a mut CS) -> Self {
        cs.set_low();
        Self { cs }
    }
}

impl<CS: OutputPin> Drop for Selected<'_, CS> {
    fn drop(&mut self) {
        self.cs.set_high();
    }
}
