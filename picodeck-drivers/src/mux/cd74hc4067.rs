//! CD74HC4067 16-channel analog multiplexer
//!
//! Routes one of 16 inputs onto a shared analog pin. The channel is set by
//! four parallel address lines (S0-S3); an optional active-low enable line
//! disconnects all inputs. No bus is involved.

use picodeck_core::config::MuxConfig;
use picodeck_core::{MuxChannel, RangeError};
use picodeck_hal::{ConfiguredPin, OutputPin, PinBank};

use crate::board::{self, BoardError};

/// CD74HC4067 driver
pub struct Cd74hc4067<P> {
    /// Address lines, S0 (LSB) first
    select: [P; MuxChannel::ADDRESS_BITS],
    /// Active-low enable, if wired
    enable: Option<P>,
}

impl<P: OutputPin> Cd74hc4067<P> {
    /// Create a new multiplexer driver
    ///
    /// If an enable line is given, the multiplexer starts enabled.
    pub fn new(select: [P; MuxChannel::ADDRESS_BITS], enable: Option<P>) -> Self {
        let mut mux = Self { select, enable };
        mux.enable();
        mux
    }

    /// Route `channel` (0-15) to the common pin
    ///
    /// Fails with a range error, without touching any line, for channels
    /// above 15.
    pub fn select_channel(&mut self, channel: u8) -> Result<(), RangeError> {
        let channel = MuxChannel::new(channel)?;
        self.select(channel);
        Ok(())
    }

    /// Route an already-validated channel to the common pin
    pub fn select(&mut self, channel: MuxChannel) {
        for (pin, bit) in self.select.iter_mut().zip(channel.address_bits()) {
            pin.set_state(bit);
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("mux channel {}", channel.index());
    }

    /// Connect the selected input (enable line low)
    ///
    /// No-op without an enable line.
    pub fn enable(&mut self) {
        if let Some(en) = self.enable.as_mut() {
            en.set_low();
        }
    }

    /// Disconnect all inputs (enable line high)
    ///
    /// No-op without an enable line.
    pub fn disable(&mut self) {
        if let Some(en) = self.enable.as_mut() {
            en.set_high();
        }
    }

    /// Check whether the multiplexer has an enable line
    pub fn has_enable(&self) -> bool {
        self.enable.is_some()
    }
}

impl<O: OutputPin> Cd74hc4067<ConfiguredPin<O>> {
    /// Take the configured lines from `bank` and start enabled on channel 0
    ///
    /// EN is active-low at the chip. An inverted (`!`) enable pin therefore
    /// sits physically high while enabled.
    pub fn from_config<B>(bank: &mut B, config: &MuxConfig) -> Result<Self, BoardError>
    where
        B: PinBank<Output = O>,
    {
        let [s0, s1, s2, s3] = &config.select;
        let select = [
            board::output(bank, s0, false)?,
            board::output(bank, s1, false)?,
            board::output(bank, s2, false)?,
            board::output(bank, s3, false)?,
        ];
        // Held disabled until the address lines are settled
        let enable = config
            .enable
            .as_ref()
            .map(|en| board::output(bank, en, true))
            .transpose()?;
        Ok(Self::new(select, enable))
    }
}
