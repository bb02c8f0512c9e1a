//! PIM580 display pack: ST7789 panel, backlight, four buttons, RGB LED
//!
//! Drawing happens in the in-memory [`Frame`]; nothing reaches the panel
//! until [`DisplayPack::show`].

use embedded_graphics::pixelcolor::Rgb565;
use picodeck_hal::{DelayMs, InputPin, OutputPin, PwmPin, SpiBus};

use super::frame::Frame;
use super::st7789::{DisplayError, St7789};

/// Front-panel buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    A,
    B,
    X,
    Y,
}

impl Button {
    /// All buttons, in wiring order
    pub const ALL: [Button; 4] = [Button::A, Button::B, Button::X, Button::Y];

    fn index(self) -> usize {
        match self {
            Button::A => 0,
            Button::B => 1,
            Button::X => 2,
            Button::Y => 3,
        }
    }
}

/// Snapshot of all four buttons (true = pressed)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Buttons {
    pub a: bool,
    pub b: bool,
    pub x: bool,
    pub y: bool,
}

impl Buttons {
    pub fn is_pressed(&self, button: Button) -> bool {
        match button {
            Button::A => self.a,
            Button::B => self.b,
            Button::X => self.x,
            Button::Y => self.y,
        }
    }

    pub fn any(&self) -> bool {
        self.a || self.b || self.x || self.y
    }
}

/// Display pack
///
/// Type parameters: panel lines (`CS`, `DC`, `RST`), backlight PWM (`BL`),
/// button inputs (`BTN`) and LED outputs (`LED`).
pub struct DisplayPack<'a, CS, DC, RST, BL, BTN, LED> {
    panel: St7789<CS, DC, RST>,
    frame: Frame<'a>,
    backlight: BL,
    /// A, B, X, Y; active-low
    buttons: [BTN; 4],
    /// Red, green, blue
    led: [LED; 3],
}

impl<'a, CS, DC, RST, BL, BTN, LED> DisplayPack<'a, CS, DC, RST, BL, BTN, LED>
where
    CS: OutputPin,
    DC: OutputPin,
    RST: OutputPin,
    BL: PwmPin,
    BTN: InputPin,
    LED: OutputPin,
{
    /// Assemble the pack; the backlight starts at full brightness
    ///
    /// The panel is not touched; call [`begin`](Self::begin) before
    /// [`show`](Self::show).
    pub fn new(
        panel: St7789<CS, DC, RST>,
        frame: Frame<'a>,
        backlight: BL,
        buttons: [BTN; 4],
        led: [LED; 3],
    ) -> Self {
        let mut pack = Self {
            panel,
            frame,
            backlight,
            buttons,
            led,
        };
        pack.set_backlight(1.0);
        pack
    }

    /// Reset and initialize the panel
    pub fn begin<B: SpiBus, D: DelayMs>(
        &mut self,
        bus: &mut B,
        delay: &mut D,
    ) -> Result<(), DisplayError<B::Error>> {
        self.panel.begin(bus, delay)
    }

    /// Fill the frame with `color` (no bus activity)
    pub fn clear(&mut self, color: Rgb565) {
        self.frame.clear(color);
    }

    /// Push the frame to the panel
    pub fn show<B: SpiBus>(&mut self, bus: &mut B) -> Result<(), DisplayError<B::Error>> {
        self.panel.write_frame(bus, &self.frame)
    }

    /// Drawing surface
    pub fn frame_mut(&mut self) -> &mut Frame<'a> {
        &mut self.frame
    }

    pub fn frame(&self) -> &Frame<'a> {
        &self.frame
    }

    pub fn panel(&self) -> &St7789<CS, DC, RST> {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut St7789<CS, DC, RST> {
        &mut self.panel
    }

    /// Set backlight brightness
    ///
    /// Clamped to 0.0..=1.0; NaN turns the backlight off.
    pub fn set_backlight(&mut self, brightness: f32) {
        self.backlight.set_duty_fraction(brightness);
    }

    /// Check one button
    pub fn is_pressed(&self, button: Button) -> bool {
        !self.buttons[button.index()].is_high()
    }

    /// Sample all four buttons
    pub fn pressed(&self) -> Buttons {
        Buttons {
            a: self.is_pressed(Button::A),
            b: self.is_pressed(Button::B),
            x: self.is_pressed(Button::X),
            y: self.is_pressed(Button::Y),
        }
    }

    /// Drive the RGB LED channels on or off
    pub fn set_led(&mut self, r: bool, g: bool, b: bool) {
        for (line, on) in self.led.iter_mut().zip([r, g, b]) {
            line.set_state(on);
        }
    }
}
