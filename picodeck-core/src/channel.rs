//! Range-checked channel numbers
//!
//! Channel arguments arrive as plain integers from application code.
//! Converting them into [`AdcChannel`] or [`MuxChannel`] is the single
//! place they are validated; drivers only ever see in-range values.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Channel argument outside its valid domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RangeError {
    /// Value that was rejected
    pub value: u8,
    /// Largest accepted value
    pub max: u8,
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "channel {} out of range 0-{}", self.value, self.max)
    }
}

/// MCP3208 input channel (0-7)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct AdcChannel(u8);

impl AdcChannel {
    /// Number of single-ended inputs
    pub const COUNT: usize = 8;
    /// Highest channel number
    pub const MAX: u8 = 7;

    /// Validate a channel number
    pub const fn new(channel: u8) -> Result<Self, RangeError> {
        if channel > Self::MAX {
            return Err(RangeError {
                value: channel,
                max: Self::MAX,
            });
        }
        Ok(Self(channel))
    }

    /// All channels in ascending order
    pub fn all() -> impl Iterator<Item = Self> {
        (0..=Self::MAX).map(Self)
    }

    /// Channel number
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Most significant of the three channel bits (D2)
    pub const fn high_bit(self) -> u8 {
        (self.0 & 0b100) >> 2
    }

    /// Two least significant channel bits (D1, D0)
    pub const fn low_bits(self) -> u8 {
        self.0 & 0b011
    }
}

impl TryFrom<u8> for AdcChannel {
    type Error = RangeError;

    fn try_from(channel: u8) -> Result<Self, Self::Error> {
        Self::new(channel)
    }
}

impl From<AdcChannel> for u8 {
    fn from(channel: AdcChannel) -> u8 {
        channel.0
    }
}

/// CD74HC4067 input channel (0-15)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct MuxChannel(u8);

impl MuxChannel {
    /// Number of routable inputs
    pub const COUNT: usize = 16;
    /// Highest channel number
    pub const MAX: u8 = 15;
    /// Address lines needed to encode a channel
    pub const ADDRESS_BITS: usize = 4;

    /// Validate a channel number
    pub const fn new(channel: u8) -> Result<Self, RangeError> {
        if channel > Self::MAX {
            return Err(RangeError {
                value: channel,
                max: Self::MAX,
            });
        }
        Ok(Self(channel))
    }

    /// Channel number
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Address line levels, S0 (LSB) first
    pub fn address_bits(self) -> [bool; Self::ADDRESS_BITS] {
        core::array::from_fn(|i| (self.0 >> i) & 1 == 1)
    }
}

impl TryFrom<u8> for MuxChannel {
    type Error = RangeError;

    fn try_from(channel: u8) -> Result<Self, Self::Error> {
        Self::new(channel)
    }
}

impl From<MuxChannel> for u8 {
    fn from(channel: MuxChannel) -> u8 {
        channel.0
    }
}
