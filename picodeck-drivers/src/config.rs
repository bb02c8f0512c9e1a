//! Board configuration to HAL settings

use picodeck_core::config::{SpiBusConfig, SpiMode};
use picodeck_hal::spi::{Mode, SpiConfig};

/// Convert configured bus settings into a HAL `SpiConfig`
pub fn spi_config(bus: &SpiBusConfig) -> SpiConfig {
    let mode = match bus.mode {
        SpiMode::Mode0 => Mode::Mode0,
        SpiMode::Mode1 => Mode::Mode1,
        SpiMode::Mode2 => Mode::Mode2,
        SpiMode::Mode3 => Mode::Mode3,
    };
    SpiConfig::new(bus.frequency_hz, mode)
}
