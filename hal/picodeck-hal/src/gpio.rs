//! GPIO pin abstractions
//!
//! Digital lines used for chip-select, data/command select, reset,
//! multiplexer addressing, buttons and indicator LEDs.

use crate::pwm::PwmPin;

/// Digital output pin
///
/// Line writes are treated as infallible, as on every MCU the drivers
/// target. Implementations that can fail should latch the error themselves.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently set low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Digital input pin
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

impl<T: OutputPin + ?Sized> OutputPin for &mut T {
    fn set_high(&mut self) {
        T::set_high(self)
    }

    fn set_low(&mut self) {
        T::set_low(self)
    }

    fn is_set_high(&self) -> bool {
        T::is_set_high(self)
    }
}

/// Line with board-level polarity applied
///
/// Drivers talk in logical levels; when `inverted` is set (an inverter or
/// active-low wiring between the GPIO and the chip), every write and read
/// is flipped on the way to the physical pin.
pub struct ConfiguredPin<P> {
    pin: P,
    inverted: bool,
}

impl<P> ConfiguredPin<P> {
    /// Wrap a physical pin
    pub fn new(pin: P, inverted: bool) -> Self {
        Self { pin, inverted }
    }

    /// Check whether levels are flipped
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Unwrap the physical pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> OutputPin for ConfiguredPin<P> {
    fn set_high(&mut self) {
        // Normal: logical high -> physical high
        // Inverted: logical high -> physical low
        self.pin.set_state(!self.inverted);
    }

    fn set_low(&mut self) {
        self.pin.set_state(self.inverted);
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high() != self.inverted
    }
}

impl<P: InputPin> InputPin for ConfiguredPin<P> {
    fn is_high(&self) -> bool {
        self.pin.is_high() != self.inverted
    }
}

/// Inverted PWM: duty is measured from the top, so 100% logical on-time is
/// 0% at the pin
impl<P: PwmPin> PwmPin for ConfiguredPin<P> {
    fn max_duty(&self) -> u16 {
        self.pin.max_duty()
    }

    fn set_duty(&mut self, duty: u16) {
        let max = self.pin.max_duty();
        let duty = duty.min(max);
        self.pin.set_duty(if self.inverted { max - duty } else { duty });
    }
}
