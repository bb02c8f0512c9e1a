//! ST7789 TFT controller (SPI, 4-wire)
//!
//! Every command byte goes out with DC low in its own chip-select
//! transaction; its parameter bytes follow with DC high in a second
//! transaction. The panel is brought up in two steps:
//!
//! ```text
//! Uninitialized --reset()--> Resetting --initialize()--> AwakeningPanel
//!     --> ConfiguringColorMode --> ConfiguringAddressMode --> On
//! ```
//!
//! A failed `initialize` leaves the state at the stage that failed; the
//! panel must be reset again before retrying.

use picodeck_core::config::DisplayPackConfig;
use picodeck_hal::{DelayMs, OutputPin, SpiBus, SpiConfig, SpiDevice};

use super::frame::Frame;
use super::{HEIGHT, WIDTH};
use crate::config::spi_config;

/// ST7789 command bytes
pub mod cmd {
    pub const SWRESET: u8 = 0x01;
    pub const SLPOUT: u8 = 0x11;
    pub const DISPON: u8 = 0x29;
    pub const CASET: u8 = 0x2A;
    pub const RASET: u8 = 0x2B;
    pub const RAMWR: u8 = 0x2C;
    pub const MADCTL: u8 = 0x36;
    pub const COLMOD: u8 = 0x3A;
}

/// COLMOD parameter: 16 bits per pixel, RGB565
pub const COLMOD_RGB565: u8 = 0x55;

/// MADCTL parameter: default scan order, RGB
pub const MADCTL_DEFAULT: u8 = 0x00;

/// Reset line held low
pub const RESET_PULSE_MS: u32 = 50;
/// Wait after releasing reset
pub const RESET_RECOVERY_MS: u32 = 50;
/// Wait after SWRESET
pub const SWRESET_DELAY_MS: u32 = 150;
/// Wait after SLPOUT
pub const SLPOUT_DELAY_MS: u32 = 10;
/// Wait after DISPON
pub const DISPON_DELAY_MS: u32 = 100;

/// Panel bring-up stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelState {
    #[default]
    Uninitialized,
    /// Hardware reset pulse complete
    Resetting,
    /// SWRESET / SLPOUT
    AwakeningPanel,
    /// COLMOD
    ConfiguringColorMode,
    /// MADCTL / DISPON
    ConfiguringAddressMode,
    /// Accepting pixel data
    On,
}

/// Display errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError<E> {
    /// SPI transfer failed
    Bus(E),
    /// `initialize` called without a completed reset
    NotReset,
    /// Pixel operation before the panel is on
    NotReady,
}

/// Invalid window bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WindowError {
    /// Start is past end on some axis
    Inverted,
    /// End lies outside the panel
    OutOfBounds,
}

/// Inclusive rectangle of panel addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Window {
    x0: u16,
    y0: u16,
    x1: u16,
    y1: u16,
}

impl Window {
    /// Validate `x0 <= x1 < WIDTH` and `y0 <= y1 < HEIGHT`
    pub fn new(x0: u16, y0: u16, x1: u16, y1: u16) -> Result<Self, WindowError> {
        if x0 > x1 || y0 > y1 {
            return Err(WindowError::Inverted);
        }
        if x1 >= WIDTH || y1 >= HEIGHT {
            return Err(WindowError::OutOfBounds);
        }
        Ok(Self { x0, y0, x1, y1 })
    }

    /// The whole panel, (0, 0) to (319, 239)
    pub const fn full() -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: WIDTH - 1,
            y1: HEIGHT - 1,
        }
    }

    /// CASET parameters: start and end column, big-endian
    pub fn encode_columns(&self) -> [u8; 4] {
        encode_range(self.x0, self.x1)
    }

    /// RASET parameters: start and end row, big-endian
    pub fn encode_rows(&self) -> [u8; 4] {
        encode_range(self.y0, self.y1)
    }

    pub fn x0(&self) -> u16 {
        self.x0
    }

    pub fn y0(&self) -> u16 {
        self.y0
    }

    pub fn x1(&self) -> u16 {
        self.x1
    }

    pub fn y1(&self) -> u16 {
        self.y1
    }
}

fn encode_range(start: u16, end: u16) -> [u8; 4] {
    let [s0, s1] = start.to_be_bytes();
    let [e0, e1] = end.to_be_bytes();
    [s0, s1, e0, e1]
}

/// ST7789 driver
///
/// Owns chip-select, data/command and reset lines; the SPI bus is borrowed
/// per call.
pub struct St7789<CS, DC, RST> {
    device: SpiDevice<CS>,
    dc: DC,
    rst: RST,
    state: PanelState,
}

impl<CS, DC, RST> St7789<CS, DC, RST>
where
    CS: OutputPin,
    DC: OutputPin,
    RST: OutputPin,
{
    /// Default bus settings (62.5 MHz, mode 3)
    pub fn default_spi() -> SpiConfig {
        spi_config(&DisplayPackConfig::default().spi)
    }

    /// Create a driver with default bus settings
    pub fn new(cs: CS, dc: DC, rst: RST) -> Self {
        Self::with_spi(cs, dc, rst, Self::default_spi())
    }

    /// Create a driver with explicit bus settings
    ///
    /// Reset is left released (high); nothing is sent until `reset`.
    pub fn with_spi(cs: CS, dc: DC, mut rst: RST, spi: SpiConfig) -> Self {
        rst.set_high();
        Self {
            device: SpiDevice::new(cs, spi),
            dc,
            rst,
            state: PanelState::Uninitialized,
        }
    }

    /// Create a driver from board configuration
    pub fn from_config(cs: CS, dc: DC, rst: RST, config: &DisplayPackConfig) -> Self {
        Self::with_spi(cs, dc, rst, spi_config(&config.spi))
    }

    /// Current bring-up stage
    pub fn state(&self) -> PanelState {
        self.state
    }

    /// Pulse the reset line
    pub fn reset<D: DelayMs>(&mut self, delay: &mut D) {
        self.rst.set_low();
        delay.delay_ms(RESET_PULSE_MS);
        self.rst.set_high();
        delay.delay_ms(RESET_RECOVERY_MS);
        self.enter(PanelState::Resetting);
    }

    /// Run the init sequence on a freshly reset panel
    pub fn initialize<B: SpiBus, D: DelayMs>(
        &mut self,
        bus: &mut B,
        delay: &mut D,
    ) -> Result<(), DisplayError<B::Error>> {
        if self.state != PanelState::Resetting {
            return Err(DisplayError::NotReset);
        }

        self.enter(PanelState::AwakeningPanel);
        self.command(bus, cmd::SWRESET)?;
        delay.delay_ms(SWRESET_DELAY_MS);
        self.command(bus, cmd::SLPOUT)?;
        delay.delay_ms(SLPOUT_DELAY_MS);

        self.enter(PanelState::ConfiguringColorMode);
        self.command(bus, cmd::COLMOD)?;
        self.data(bus, &[COLMOD_RGB565])?;

        self.enter(PanelState::ConfiguringAddressMode);
        self.command(bus, cmd::MADCTL)?;
        self.data(bus, &[MADCTL_DEFAULT])?;
        self.command(bus, cmd::DISPON)?;
        delay.delay_ms(DISPON_DELAY_MS);

        self.enter(PanelState::On);
        Ok(())
    }

    /// Reset and initialize
    pub fn begin<B: SpiBus, D: DelayMs>(
        &mut self,
        bus: &mut B,
        delay: &mut D,
    ) -> Result<(), DisplayError<B::Error>> {
        self.reset(delay);
        self.initialize(bus, delay)
    }

    /// Set the address window for the next RAMWR
    pub fn set_window<B: SpiBus>(
        &mut self,
        bus: &mut B,
        window: &Window,
    ) -> Result<(), DisplayError<B::Error>> {
        if !self.is_on() {
            return Err(DisplayError::NotReady);
        }

        self.command(bus, cmd::CASET)?;
        self.data(bus, &window.encode_columns())?;
        self.command(bus, cmd::RASET)?;
        self.data(bus, &window.encode_rows())
    }

    /// Push a whole frame to the panel
    pub fn write_frame<B: SpiBus>(
        &mut self,
        bus: &mut B,
        frame: &Frame<'_>,
    ) -> Result<(), DisplayError<B::Error>> {
        if !self.is_on() {
            return Err(DisplayError::NotReady);
        }

        self.set_window(bus, &Window::full())?;
        self.command(bus, cmd::RAMWR)?;
        self.data(bus, frame.as_bytes())
    }

    /// Release the owned lines
    pub fn release(self) -> (CS, DC, RST) {
        (self.device.release(), self.dc, self.rst)
    }

    /// Check whether the panel accepts pixel data
    pub fn is_on(&self) -> bool {
        self.state == PanelState::On
    }

    fn enter(&mut self, state: PanelState) {
        #[cfg(feature = "defmt")]
        defmt::debug!("st7789: {} -> {}", self.state, state);

        self.state = state;
    }

    fn command<B: SpiBus>(
        &mut self,
        bus: &mut B,
        command: u8,
    ) -> Result<(), DisplayError<B::Error>> {
        self.dc.set_low();
        self.device
            .transaction(bus, |bus| bus.write(&[command]))
            .map_err(DisplayError::Bus)
    }

    fn data<B: SpiBus>(
        &mut self,
        bus: &mut B,
        data: &[u8],
    ) -> Result<(), DisplayError<B::Error>> {
        self.dc.set_high();
        self.device
            .transaction(bus, |bus| bus.write(data))
            .map_err(DisplayError::Bus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{BusError, Event, Log, MockBus, MockDelay, MockPin};
    use picodeck_hal::spi::Mode;
    use std::vec;
    use std::vec::Vec;

    type Panel = St7789<MockPin, MockPin, MockPin>;

    fn panel(log: &Log) -> Panel {
        St7789::new(
            MockPin::new("cs", log),
            MockPin::new("dc", log),
            MockPin::new("rst", log),
        )
    }

    fn ready(log: &Log) -> (Panel, MockBus) {
        let mut p = panel(log);
        let mut bus = MockBus::new(log);
        p.begin(&mut bus, &mut MockDelay::new(log)).unwrap();
        log.clear();
        (p, bus)
    }

    #[test]
    fn test_default_spi() {
        assert_eq!(
            Panel::default_spi(),
            SpiConfig::new(62_500_000, Mode::Mode3)
        );
    }

    #[test]
    fn test_reset_pulse() {
        let log = Log::new();
        let mut p = panel(&log);
        log.clear();

        p.reset(&mut MockDelay::new(&log));
        assert_eq!(
            log.events(),
            [
                Event::Pin("rst", false),
                Event::Delay(50),
                Event::Pin("rst", true),
                Event::Delay(50),
            ]
        );
        assert_eq!(p.state(), PanelState::Resetting);
    }

    #[test]
    fn test_init_sequence() {
        let log = Log::new();
        let mut p = panel(&log);
        let mut bus = MockBus::new(&log);
        let mut delay = MockDelay::new(&log);
        p.reset(&mut delay);
        log.clear();

        p.initialize(&mut bus, &mut delay).unwrap();
        assert_eq!(p.state(), PanelState::On);

        assert_eq!(
            log.writes_while("dc", false),
            [
                vec![cmd::SWRESET],
                vec![cmd::SLPOUT],
                vec![cmd::COLMOD],
                vec![cmd::MADCTL],
                vec![cmd::DISPON],
            ]
        );
        assert_eq!(log.writes_while("dc", true), [vec![0x55], vec![0x00]]);

        let delays: Vec<u32> = log
            .events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Delay(ms) => Some(ms),
                _ => None,
            })
            .collect();
        assert_eq!(delays, [150, 10, 100]);
    }

    #[test]
    fn test_each_byte_group_in_own_transaction() {
        let log = Log::new();
        let mut p = panel(&log);
        let mut bus = MockBus::new(&log);
        let mut delay = MockDelay::new(&log);
        p.reset(&mut delay);
        log.clear();
        p.initialize(&mut bus, &mut delay).unwrap();

        // 5 commands + 2 parameter writes, each framed by CS low ... CS high
        let events = log.events();
        let selects = events
            .iter()
            .filter(|e| **e == Event::Pin("cs", false))
            .count();
        let releases = events
            .iter()
            .filter(|e| **e == Event::Pin("cs", true))
            .count();
        assert_eq!(selects, 7);
        assert_eq!(releases, 7);

        // COLMOD: DC low, CS low, write, CS high, then DC high for the parameter
        let colmod = events
            .iter()
            .position(|e| *e == Event::Write(vec![cmd::COLMOD]))
            .unwrap();
        assert_eq!(events[colmod - 1], Event::Pin("cs", false));
        assert_eq!(events[colmod + 1], Event::Flush);
        assert_eq!(events[colmod + 2], Event::Pin("cs", true));
        assert_eq!(events[colmod + 3], Event::Pin("dc", true));
    }

    #[test]
    fn test_initialize_requires_reset() {
        let log = Log::new();
        let mut p = panel(&log);
        let mut bus = MockBus::new(&log);
        log.clear();

        assert_eq!(
            p.initialize(&mut bus, &mut MockDelay::new(&log)),
            Err(DisplayError::NotReset)
        );
        assert!(log.events().is_empty());
        assert_eq!(p.state(), PanelState::Uninitialized);
    }

    #[test]
    fn test_pixel_ops_require_on() {
        let log = Log::new();
        let mut p = panel(&log);
        let mut bus = MockBus::new(&log);
        let mut buf = vec![0u8; Frame::BYTES];
        let frame = Frame::new(&mut buf).unwrap();

        assert_eq!(
            p.set_window(&mut bus, &Window::full()),
            Err(DisplayError::NotReady)
        );
        p.reset(&mut MockDelay::new(&log));
        log.clear();
        assert_eq!(p.write_frame(&mut bus, &frame), Err(DisplayError::NotReady));
        assert_eq!(log.bus_activity(), 0);
    }

    #[test]
    fn test_failed_init_needs_new_reset() {
        let log = Log::new();
        let mut p = panel(&log);
        // SWRESET and SLPOUT succeed, COLMOD fails
        let mut bus = MockBus::new(&log).failing_after(2);
        let mut delay = MockDelay::new(&log);
        p.reset(&mut delay);

        assert_eq!(
            p.initialize(&mut bus, &mut delay),
            Err(DisplayError::Bus(BusError))
        );
        assert_eq!(p.state(), PanelState::ConfiguringColorMode);
        assert_eq!(
            p.initialize(&mut MockBus::new(&log), &mut delay),
            Err(DisplayError::NotReset)
        );

        p.begin(&mut MockBus::new(&log), &mut delay).unwrap();
        assert_eq!(p.state(), PanelState::On);
    }

    #[test]
    fn test_bus_failure_releases_cs() {
        let log = Log::new();
        let mut p = panel(&log);
        let mut bus = MockBus::new(&log).failing_after(0);
        let mut delay = MockDelay::new(&log);
        p.reset(&mut delay);

        assert!(p.initialize(&mut bus, &mut delay).is_err());
        assert_eq!(log.events().last(), Some(&Event::Pin("cs", true)));
        assert_eq!(p.state(), PanelState::AwakeningPanel);
    }

    #[test]
    fn test_set_window_bytes() {
        let log = Log::new();
        let (mut p, mut bus) = ready(&log);

        let w = Window::new(10, 20, 299, 200).unwrap();
        p.set_window(&mut bus, &w).unwrap();
        assert_eq!(
            log.writes_while("dc", false),
            [vec![cmd::CASET], vec![cmd::RASET]]
        );
        assert_eq!(
            log.writes_while("dc", true),
            [vec![0x00, 0x0A, 0x01, 0x2B], vec![0x00, 0x14, 0x00, 0xC8]]
        );
    }

    #[test]
    fn test_write_frame() {
        let log = Log::new();
        let (mut p, mut bus) = ready(&log);
        let mut buf = vec![0u8; Frame::BYTES];
        let mut frame = Frame::new(&mut buf).unwrap();
        frame.set_pixel(0, 0, embedded_graphics::pixelcolor::Rgb565::new(31, 0, 0));

        p.write_frame(&mut bus, &frame).unwrap();

        assert_eq!(
            log.writes_while("dc", false),
            [vec![cmd::CASET], vec![cmd::RASET], vec![cmd::RAMWR]]
        );
        let data = log.writes_while("dc", true);
        assert_eq!(data.len(), 3);
        assert_eq!(data[0], [0x00, 0x00, 0x01, 0x3F]);
        assert_eq!(data[1], [0x00, 0x00, 0x00, 0xEF]);
        assert_eq!(data[2].len(), 153_600);
        assert_eq!(&data[2][..2], &[0xF8, 0x00]);
    }

    #[test]
    fn test_window_validation() {
        assert_eq!(Window::new(5, 0, 4, 0), Err(WindowError::Inverted));
        assert_eq!(Window::new(0, 9, 0, 8), Err(WindowError::Inverted));
        assert_eq!(Window::new(0, 0, 320, 0), Err(WindowError::OutOfBounds));
        assert_eq!(Window::new(0, 0, 0, 240), Err(WindowError::OutOfBounds));
        assert_eq!(Window::new(0, 0, 319, 239), Ok(Window::full()));
    }

    #[test]
    fn test_full_window_encoding() {
        let w = Window::full();
        assert_eq!(w.encode_columns(), [0x00, 0x00, 0x01, 0x3F]);
        assert_eq!(w.encode_rows(), [0x00, 0x00, 0x00, 0xEF]);
    }
}
