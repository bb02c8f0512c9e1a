//! Board bring-up from configuration
//!
//! Turns a [`BoardConfig`] into drivers. Every line is requested from a
//! [`PinBank`] by its configured GPIO number and wrapped in a
//! [`ConfiguredPin`], so `inverted` is applied between the driver's logical
//! level and the physical pin, and `pull_up` reaches the input setup.
//!
//! ```ignore
//! let config = parse_config(BOARD_TOML)?;
//! let mut bus = board::spi_bus(&mut bank, &config)?;
//! let mut pack = board::display_pack(&mut bank, frame, &config.display)?;
//! let mut adc = config.adc.as_ref().map(|c| board::mcp3208(&mut bank, c)).transpose()?;
//! ```

use picodeck_core::config::{BoardConfig, DisplayPackConfig, Mcp3208Config, MuxConfig, PinConfig};
use picodeck_hal::{ConfiguredPin, PinBank, PinError, SpiPins};

use crate::adc::{Mcp3208, VrefError};
use crate::config::spi_config;
use crate::display::{DisplayPack, Frame, St7789};
use crate::mux::Cd74hc4067;

/// Output line with configured polarity
pub type Line<P> = ConfiguredPin<<P as PinBank>::Output>;
/// Input line with configured polarity
pub type Input<P> = ConfiguredPin<<P as PinBank>::Input>;
/// PWM output with configured polarity
pub type Pwm<P> = ConfiguredPin<<P as PinBank>::Pwm>;

/// Panel driver on configured lines
pub type Panel<P> = St7789<Line<P>, Line<P>, Line<P>>;
/// Display pack on configured lines
pub type Pack<'a, P> = DisplayPack<'a, Line<P>, Line<P>, Line<P>, Pwm<P>, Input<P>, Line<P>>;

/// Bring-up errors
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BoardError {
    /// The bank refused a pin
    Pin { pin: u8, error: PinError },
    /// SCK, MOSI and MISO cannot be inverted
    InvertedBusPin { pin: u8 },
    /// ADC reference voltage rejected
    Vref(VrefError),
}

impl From<VrefError> for BoardError {
    fn from(err: VrefError) -> Self {
        BoardError::Vref(err)
    }
}

fn refused(pin: u8) -> impl FnOnce(PinError) -> BoardError {
    move |error| {
        #[cfg(feature = "defmt")]
        defmt::warn!("gpio{}: {}", pin, error);
        BoardError::Pin { pin, error }
    }
}

/// Take a configured output, starting at logical level `high`
///
/// The physical start level already accounts for inversion, so the line
/// never glitches through the wrong state.
pub fn output<P: PinBank>(
    bank: &mut P,
    config: &PinConfig,
    high: bool,
) -> Result<Line<P>, BoardError> {
    let pin = bank
        .output(config.pin, high != config.inverted)
        .map_err(refused(config.pin))?;
    Ok(ConfiguredPin::new(pin, config.inverted))
}

/// Take a configured input
pub fn input<P: PinBank>(bank: &mut P, config: &PinConfig) -> Result<Input<P>, BoardError> {
    let pin = bank
        .input(config.pin, config.pull_up)
        .map_err(refused(config.pin))?;
    Ok(ConfiguredPin::new(pin, config.inverted))
}

/// Take a configured PWM output
pub fn pwm<P: PinBank>(
    bank: &mut P,
    config: &PinConfig,
    frequency_hz: u32,
) -> Result<Pwm<P>, BoardError> {
    let pin = bank
        .pwm(config.pin, frequency_hz)
        .map_err(refused(config.pin))?;
    Ok(ConfiguredPin::new(pin, config.inverted))
}

fn bus_pin(config: &PinConfig) -> Result<u8, BoardError> {
    if config.inverted {
        return Err(BoardError::InvertedBusPin { pin: config.pin });
    }
    Ok(config.pin)
}

/// Bring up the shared SPI bus
///
/// Clock and data-out come from the display wiring, data-in from the ADC
/// (write-only without one). The bus starts with the panel's settings;
/// every device reconfigures it at the start of its own transactions.
pub fn spi_bus<P: PinBank>(bank: &mut P, config: &BoardConfig) -> Result<P::Bus, BoardError> {
    let miso = config.adc.as_ref().and_then(|adc| adc.miso);
    let pins = SpiPins {
        sck: bus_pin(&config.display.sck)?,
        mosi: bus_pin(&config.display.mosi)?,
        miso: miso.as_ref().map(bus_pin).transpose()?,
        miso_pull_up: miso.is_some_and(|m| m.pull_up),
    };
    let spi = spi_config(&config.display.spi);

    #[cfg(feature = "defmt")]
    defmt::info!("SPI: sck=gpio{} mosi=gpio{} {}Hz", pins.sck, pins.mosi, spi.frequency);

    bank.spi(&pins, &spi).map_err(|error| BoardError::Pin {
        pin: pins.sck,
        error,
    })
}

/// Panel driver on the configured CS, DC and RST lines
///
/// CS starts deselected, RST released.
pub fn st7789<P: PinBank>(
    bank: &mut P,
    config: &DisplayPackConfig,
) -> Result<Panel<P>, BoardError> {
    let cs = output(bank, &config.cs, true)?;
    let dc = output(bank, &config.dc, false)?;
    let rst = output(bank, &config.rst, true)?;
    Ok(St7789::from_config(cs, dc, rst, config))
}

/// Complete display pack: panel, backlight, buttons and LED
pub fn display_pack<'a, P: PinBank>(
    bank: &mut P,
    frame: Frame<'a>,
    config: &DisplayPackConfig,
) -> Result<Pack<'a, P>, BoardError> {
    let panel = st7789(bank, config)?;
    let backlight = pwm(bank, &config.backlight, config.backlight_frequency_hz)?;

    let [a, b, x, y] = &config.buttons;
    let buttons = [input(bank, a)?, input(bank, b)?, input(bank, x)?, input(bank, y)?];

    let [r, g, bl] = &config.led;
    let led = [
        output(bank, r, false)?,
        output(bank, g, false)?,
        output(bank, bl, false)?,
    ];

    Ok(DisplayPack::new(panel, frame, backlight, buttons, led))
}

/// ADC on its configured chip-select
pub fn mcp3208<P: PinBank>(
    bank: &mut P,
    config: &Mcp3208Config,
) -> Result<Mcp3208<Line<P>>, BoardError> {
    // Checked before the pin is taken
    if config.vref_mv == 0 {
        return Err(VrefError { vref: 0.0 }.into());
    }
    let cs = output(bank, &config.cs, true)?;
    Ok(Mcp3208::from_config(cs, config)?)
}

/// Multiplexer on its configured address and enable lines
pub fn mux<P: PinBank>(
    bank: &mut P,
    config: &MuxConfig,
) -> Result<Cd74hc4067<Line<P>>, BoardError> {
    Cd74hc4067::from_config(bank, config)
}
