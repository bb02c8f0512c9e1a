//! Adapters from `embedded-hal` 1.0
//!
//! Chip HALs (embassy-rp, rp2040-hal, stm32 HALs, ...) implement the
//! `embedded-hal` traits. Wrapping their types in these adapters makes
//! them usable by the picodeck drivers without a per-chip HAL crate.
//!
//! ```ignore
//! let bus = EhSpi::new(embassy_rp::spi::Spi::new_blocking(/* ... */));
//! let cs = EhOutput::new(Output::new(p.PIN_17, Level::High));
//! let delay = EhDelay(embassy_time::Delay);
//! ```
//!
//! Digital lines are expected to be infallible (`Error = Infallible`),
//! which is the case for on-chip GPIO and PWM on all supported MCUs.

use core::cell::RefCell;
use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital;
use embedded_hal::pwm::SetDutyCycle;
use embedded_hal::spi;

use crate::delay::DelayMs;
use crate::gpio::{InputPin, OutputPin};
use crate::pwm::PwmPin;
use crate::spi::{SpiBus, SpiConfig};

/// Hook used to re-clock a bus before a device's transaction
pub type Reconfigure<S> = fn(&mut S, &SpiConfig) -> Result<(), <S as spi::ErrorType>::Error>;

/// [`SpiBus`] over an `embedded_hal::spi::SpiBus`
pub struct EhSpi<S: spi::ErrorType> {
    spi: S,
    reconfigure: Option<Reconfigure<S>>,
}

impl<S: spi::SpiBus> EhSpi<S> {
    /// Wrap a bus that is already configured for every attached device
    pub fn new(spi: S) -> Self {
        Self {
            spi,
            reconfigure: None,
        }
    }

    /// Wrap a bus whose clock/mode must be set per device
    pub fn with_reconfigure(spi: S, reconfigure: Reconfigure<S>) -> Self {
        Self {
            spi,
            reconfigure: Some(reconfigure),
        }
    }

    /// Unwrap the underlying bus
    pub fn into_inner(self) -> S {
        self.spi
    }
}

impl<S: spi::SpiBus> SpiBus for EhSpi<S> {
    type Error = S::Error;

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        self.spi.transfer(read, write)
    }

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.spi.write(data)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.spi.read(buf)
    }

    fn configure(&mut self, config: &SpiConfig) -> Result<(), Self::Error> {
        match self.reconfigure {
            Some(reconfigure) => reconfigure(&mut self.spi, config),
            None => Ok(()),
        }
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.spi.flush()
    }
}

/// [`OutputPin`] over an `embedded_hal::digital::OutputPin`
///
/// Tracks the last written level so the pin does not need to be readable.
pub struct EhOutput<P> {
    pin: P,
    high: bool,
}

impl<P: digital::OutputPin<Error = Infallible>> EhOutput<P> {
    /// Wrap a pin, driving it low
    pub fn new(pin: P) -> Self {
        let mut out = Self { pin, high: true };
        out.set_low();
        out
    }

    /// Wrap a pin, driving it high
    pub fn new_high(pin: P) -> Self {
        let mut out = Self { pin, high: false };
        out.set_high();
        out
    }
}

impl<P: digital::OutputPin<Error = Infallible>> OutputPin for EhOutput<P> {
    fn set_high(&mut self) {
        self.pin.set_high().unwrap_or_else(|e| match e {});
        self.high = true;
    }

    fn set_low(&mut self) {
        self.pin.set_low().unwrap_or_else(|e| match e {});
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// [`InputPin`] over an `embedded_hal::digital::InputPin`
pub struct EhInput<P> {
    pin: RefCell<P>,
}

impl<P: digital::InputPin<Error = Infallible>> EhInput<P> {
    /// Wrap an input pin
    pub fn new(pin: P) -> Self {
        Self {
            pin: RefCell::new(pin),
        }
    }
}

impl<P: digital::InputPin<Error = Infallible>> InputPin for EhInput<P> {
    fn is_high(&self) -> bool {
        self.pin
            .borrow_mut()
            .is_high()
            .unwrap_or_else(|e| match e {})
    }
}

/// [`PwmPin`] over an `embedded_hal::pwm::SetDutyCycle`
pub struct EhPwm<P>(pub P);

impl<P: SetDutyCycle<Error = Infallible>> PwmPin for EhPwm<P> {
    fn max_duty(&self) -> u16 {
        self.0.max_duty_cycle()
    }

    fn set_duty(&mut self, duty: u16) {
        self.0
            .set_duty_cycle(duty.min(self.0.max_duty_cycle()))
            .unwrap_or_else(|e| match e {})
    }
}

/// [`DelayMs`] over an `embedded_hal::delay::DelayNs`
pub struct EhDelay<D>(pub D);

impl<D: DelayNs> DelayMs for EhDelay<D> {
    fn delay_ms(&mut self, ms: u32) {
        DelayNs::delay_ms(&mut self.0, ms)
    }
}
