//! Hardware configuration types
//!
//! Pin assignments and bus settings for the display pack, the ADC and the
//! multiplexer. Defaults reproduce the PIM580 Display Pack 2.0 wiring on a
//! Raspberry Pi Pico.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    /// GPIO pin number (0-29 for RP2040)
    pub pin: u8,
    /// Inverter between the GPIO and the device pin; drivers keep working
    /// in the device's own levels and the flip happens at the GPIO
    pub inverted: bool,
    /// Enable internal pull-up
    pub pull_up: bool,
}

impl PinConfig {
    /// Create a new pin config
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: false,
        }
    }

    /// Create a pin behind an inverter
    pub const fn inverted(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
            pull_up: false,
        }
    }

    /// Create a pin with pull-up enabled
    pub const fn with_pullup(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: true,
        }
    }
}

/// SPI clock mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SpiMode {
    /// CPOL=0, CPHA=0
    #[default]
    Mode0,
    /// CPOL=0, CPHA=1
    Mode1,
    /// CPOL=1, CPHA=0
    Mode2,
    /// CPOL=1, CPHA=1
    Mode3,
}

impl SpiMode {
    /// Look up a mode by its number (0-3)
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            0 => Some(SpiMode::Mode0),
            1 => Some(SpiMode::Mode1),
            2 => Some(SpiMode::Mode2),
            3 => Some(SpiMode::Mode3),
            _ => None,
        }
    }
}

/// Per-device SPI settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpiBusConfig {
    /// Clock frequency in Hz
    pub frequency_hz: u32,
    /// Clock polarity/phase
    pub mode: SpiMode,
}

/// PIM580 display pack wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayPackConfig {
    /// SPI clock
    pub sck: PinConfig,
    /// SPI data out
    pub mosi: PinConfig,
    /// Panel chip-select
    pub cs: PinConfig,
    /// Data/command select
    pub dc: PinConfig,
    /// Panel reset
    pub rst: PinConfig,
    /// Backlight PWM output
    pub backlight: PinConfig,
    /// Backlight PWM frequency in Hz
    pub backlight_frequency_hz: u32,
    /// Buttons A, B, X, Y (active-low, pulled up)
    pub buttons: [PinConfig; 4],
    /// RGB LED red, green, blue
    pub led: [PinConfig; 3],
    /// Panel bus settings
    pub spi: SpiBusConfig,
}

impl Default for DisplayPackConfig {
    fn default() -> Self {
        Self {
            sck: PinConfig::new(18),
            mosi: PinConfig::new(19),
            cs: PinConfig::new(17),
            dc: PinConfig::new(16),
            rst: PinConfig::new(20),
            backlight: PinConfig::new(21),
            backlight_frequency_hz: 1_000,
            buttons: [
                PinConfig::with_pullup(12),
                PinConfig::with_pullup(13),
                PinConfig::with_pullup(14),
                PinConfig::with_pullup(15),
            ],
            led: [PinConfig::new(6), PinConfig::new(7), PinConfig::new(8)],
            spi: SpiBusConfig {
                frequency_hz: 62_500_000,
                mode: SpiMode::Mode3,
            },
        }
    }
}

/// MCP3208 ADC wiring
///
/// The ADC has no fixed position on the board, so there is no default pin
/// map; every field other than the reference voltage and bus settings must
/// come from the board configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Mcp3208Config {
    /// Chip-select
    pub cs: PinConfig,
    /// Bus data-in line (chip DOUT), shared with any other reader on the bus
    pub miso: Option<PinConfig>,
    /// Reference voltage in millivolts
    pub vref_mv: u16,
    /// ADC bus settings
    pub spi: SpiBusConfig,
}

impl Mcp3208Config {
    /// Default reference voltage (3.3V rail)
    pub const DEFAULT_VREF_MV: u16 = 3300;

    /// Default bus settings: 1 MHz, mode 0
    pub const DEFAULT_SPI: SpiBusConfig = SpiBusConfig {
        frequency_hz: 1_000_000,
        mode: SpiMode::Mode0,
    };

    /// Create a config for the given chip-select with default settings
    pub const fn new(cs: PinConfig) -> Self {
        Self {
            cs,
            miso: None,
            vref_mv: Self::DEFAULT_VREF_MV,
            spi: Self::DEFAULT_SPI,
        }
    }

    /// Reference voltage in volts
    pub fn vref_volts(&self) -> f32 {
        self.vref_mv as f32 / 1000.0
    }
}

/// CD74HC4067 multiplexer wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MuxConfig {
    /// Address lines S0 (LSB) to S3
    pub select: [PinConfig; 4],
    /// Enable line, if wired (active-low at the chip, before `inverted`)
    pub enable: Option<PinConfig>,
}

/// Complete board configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoardConfig {
    /// Display pack (always present)
    pub display: DisplayPackConfig,
    /// External ADC, if fitted
    pub adc: Option<Mcp3208Config>,
    /// External multiplexer, if fitted
    pub mux: Option<MuxConfig>,
}
