//! Board configuration file parser
//!
//! A minimal parser for the TOML subset used by board configuration files.
//! It does NOT support the full TOML spec.
//!
//! Supported features:
//! - `[display]`, `[adc]` and `[mux]` section headers
//! - Key = value pairs (quoted pin strings, integers, decimals)
//! - Underscore digit separators in integers (`62_500_000`)
//! - Comments (# ...)
//!
//! ```toml
//! [display]
//! cs = "gpio17"
//! spi_frequency = 62_500_000
//!
//! [adc]
//! cs = "gpio5"
//! vref = 3.3
//!
//! [mux]
//! s0 = "gpio0"
//! s1 = "gpio1"
//! s2 = "gpio2"
//! s3 = "gpio3"
//! enable = "!gpio4"
//! ```
//!
//! Pin strings are `gpioN`, optionally prefixed with `!` (inverted) and `^`
//! (internal pull-up). `!` describes the board, not the chip: it marks an
//! inverter between the GPIO and the device pin, so the driver's logical
//! level is flipped once more at the GPIO. The mux enable is active-low at
//! the chip, so `enable = "!gpio4"` drives GPIO4 high to enable.
//!
//! Keys not given keep their defaults. The `[adc]` and `[mux]` sections are
//! optional, but when present every pin without a default must be set.

use super::hardware::{
    BoardConfig, DisplayPackConfig, Mcp3208Config, MuxConfig, PinConfig, SpiMode,
};

/// Maximum GPIO number accepted in pin strings (RP2040 has GPIO0-29)
pub const GPIO_COUNT: u8 = 30;

/// Highest accepted reference voltage in millivolts (MCP3208 VDD limit)
const MAX_VREF_MV: u32 = 5_500;

/// Parse error with the 1-based line it occurred on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParseError {
    /// Line number (0 for errors found after the last line)
    pub line: usize,
    /// What went wrong
    pub kind: ParseErrorKind,
}

/// Kinds of parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseErrorKind {
    /// Unknown or malformed section header
    InvalidSection,
    /// Line is not `key = value`
    InvalidLine,
    /// Key not valid in the current section
    UnknownKey,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// Invalid pin string
    InvalidPin,
    /// A section is missing a required pin
    MissingPin,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Display,
    Adc,
    Mux,
}

/// `[adc]` section under construction
#[derive(Default)]
struct AdcSection {
    present: bool,
    cs: Option<PinConfig>,
    miso: Option<PinConfig>,
    vref_mv: Option<u16>,
    frequency_hz: Option<u32>,
    mode: Option<SpiMode>,
}

impl AdcSection {
    fn apply(&mut self, key: &str, value: &str) -> Result<(), ParseErrorKind> {
        match key {
            "cs" => self.cs = Some(parse_pin_value(value)?),
            "miso" => self.miso = Some(parse_pin_value(value)?),
            "vref" => self.vref_mv = Some(parse_volts_as_mv(value)?),
            "vref_mv" => {
                let mv = parse_u32(value)?;
                if mv == 0 || mv > MAX_VREF_MV {
                    return Err(ParseErrorKind::InvalidValue);
                }
                self.vref_mv = Some(mv as u16);
            }
            "spi_frequency" => self.frequency_hz = Some(parse_frequency(value)?),
            "spi_mode" => self.mode = Some(parse_mode(value)?),
            _ => return Err(ParseErrorKind::UnknownKey),
        }
        Ok(())
    }

    fn finish(self) -> Result<Option<Mcp3208Config>, ParseErrorKind> {
        if !self.present {
            return Ok(None);
        }
        let cs = self.cs.ok_or(ParseErrorKind::MissingPin)?;
        let mut config = Mcp3208Config::new(cs);
        config.miso = self.miso;
        if let Some(mv) = self.vref_mv {
            config.vref_mv = mv;
        }
        if let Some(hz) = self.frequency_hz {
            config.spi.frequency_hz = hz;
        }
        if let Some(mode) = self.mode {
            config.spi.mode = mode;
        }
        Ok(Some(config))
    }
}

/// `[mux]` section under construction
#[derive(Default)]
struct MuxSection {
    present: bool,
    select: [Option<PinConfig>; 4],
    enable: Option<PinConfig>,
}

impl MuxSection {
    fn apply(&mut self, key: &str, value: &str) -> Result<(), ParseErrorKind> {
        let slot = match key {
            "s0" => &mut self.select[0],
            "s1" => &mut self.select[1],
            "s2" => &mut self.select[2],
            "s3" => &mut self.select[3],
            "enable" => &mut self.enable,
            _ => return Err(ParseErrorKind::UnknownKey),
        };
        *slot = Some(parse_pin_value(value)?);
        Ok(())
    }

    fn finish(self) -> Result<Option<MuxConfig>, ParseErrorKind> {
        if !self.present {
            return Ok(None);
        }
        let [s0, s1, s2, s3] = self.select;
        let missing = ParseErrorKind::MissingPin;
        Ok(Some(MuxConfig {
            select: [
                s0.ok_or(missing)?,
                s1.ok_or(missing)?,
                s2.ok_or(missing)?,
                s3.ok_or(missing)?,
            ],
            enable: self.enable,
        }))
    }
}

/// Parse board configuration text, starting from the default board
pub fn parse_config(input: &str) -> Result<BoardConfig, ParseError> {
    let mut config = BoardConfig::default();
    let mut section = Section::Root;
    let mut adc = AdcSection::default();
    let mut mux = MuxSection::default();

    for (idx, raw) in input.lines().enumerate() {
        let line_no = idx + 1;
        let at = |kind| ParseError {
            line: line_no,
            kind,
        };

        // Pin strings never contain '#', so the first one starts a comment
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') {
            section = parse_section(line).ok_or(at(ParseErrorKind::InvalidSection))?;
            match section {
                Section::Adc => adc.present = true,
                Section::Mux => mux.present = true,
                _ => {}
            }
            continue;
        }

        let (key, value) = split_key_value(line).ok_or(at(ParseErrorKind::InvalidLine))?;
        let result = match section {
            Section::Root => Err(ParseErrorKind::UnknownKey),
            Section::Display => apply_display(&mut config.display, key, value),
            Section::Adc => adc.apply(key, value),
            Section::Mux => mux.apply(key, value),
        };
        result.map_err(at)?;
    }

    let at_end = |kind| ParseError { line: 0, kind };
    config.adc = adc.finish().map_err(at_end)?;
    config.mux = mux.finish().map_err(at_end)?;

    Ok(config)
}

fn parse_section(line: &str) -> Option<Section> {
    let name = line.strip_prefix('[')?.strip_suffix(']')?.trim();
    match name {
        "display" => Some(Section::Display),
        "adc" => Some(Section::Adc),
        "mux" => Some(Section::Mux),
        _ => None,
    }
}

fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

fn apply_display(
    display: &mut DisplayPackConfig,
    key: &str,
    value: &str,
) -> Result<(), ParseErrorKind> {
    match key {
        "sck" => display.sck = parse_pin_value(value)?,
        "mosi" => display.mosi = parse_pin_value(value)?,
        "cs" => display.cs = parse_pin_value(value)?,
        "dc" => display.dc = parse_pin_value(value)?,
        "rst" => display.rst = parse_pin_value(value)?,
        "backlight" => display.backlight = parse_pin_value(value)?,
        "backlight_frequency" => display.backlight_frequency_hz = parse_frequency(value)?,
        "button_a" => display.buttons[0] = parse_button_value(value)?,
        "button_b" => display.buttons[1] = parse_button_value(value)?,
        "button_x" => display.buttons[2] = parse_button_value(value)?,
        "button_y" => display.buttons[3] = parse_button_value(value)?,
        "led_r" => display.led[0] = parse_pin_value(value)?,
        "led_g" => display.led[1] = parse_pin_value(value)?,
        "led_b" => display.led[2] = parse_pin_value(value)?,
        "spi_frequency" => display.spi.frequency_hz = parse_frequency(value)?,
        "spi_mode" => display.spi.mode = parse_mode(value)?,
        _ => return Err(ParseErrorKind::UnknownKey),
    }
    Ok(())
}

/// Parse a pin string from config
///
/// Supports formats:
/// - "gpio11" -> pin 11
/// - "!gpio12" -> pin 12, inverted (active-low)
/// - "^gpio4" -> pin 4 with pull-up
/// - "!^gpio4" -> both
pub fn parse_pin_string(s: &str) -> Option<PinConfig> {
    let s = s.trim();

    let (s, inverted) = match s.strip_prefix('!') {
        Some(rest) => (rest, true),
        None => (s, false),
    };
    let (s, pull_up) = match s.strip_prefix('^') {
        Some(rest) => (rest, true),
        None => (s, false),
    };

    let num_str = s.strip_prefix("gpio")?;
    if num_str.is_empty() || !num_str.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let pin: u8 = num_str.parse().ok()?;
    if pin >= GPIO_COUNT {
        return None;
    }

    Some(PinConfig {
        pin,
        inverted,
        pull_up,
    })
}

fn unquote(value: &str) -> Option<&str> {
    value.strip_prefix('"')?.strip_suffix('"')
}

fn parse_pin_value(value: &str) -> Result<PinConfig, ParseErrorKind> {
    let s = unquote(value).ok_or(ParseErrorKind::InvalidValue)?;
    parse_pin_string(s).ok_or(ParseErrorKind::InvalidPin)
}

/// Buttons are active-low and always need the pull-up
fn parse_button_value(value: &str) -> Result<PinConfig, ParseErrorKind> {
    let mut pin = parse_pin_value(value)?;
    pin.pull_up = true;
    Ok(pin)
}

/// Decimal integer; `_` is only allowed between two digits
fn parse_u32(value: &str) -> Result<u32, ParseErrorKind> {
    let mut result: u32 = 0;
    let mut digits = 0;
    let mut after_digit = false;
    for b in value.bytes() {
        match b {
            b'_' if after_digit => after_digit = false,
            b'0'..=b'9' => {
                result = result
                    .checked_mul(10)
                    .and_then(|r| r.checked_add((b - b'0') as u32))
                    .ok_or(ParseErrorKind::InvalidValue)?;
                digits += 1;
                after_digit = true;
            }
            _ => return Err(ParseErrorKind::InvalidValue),
        }
    }
    // Empty, or ends on a separator
    if digits == 0 || !after_digit {
        return Err(ParseErrorKind::InvalidValue);
    }
    Ok(result)
}

fn parse_frequency(value: &str) -> Result<u32, ParseErrorKind> {
    match parse_u32(value)? {
        0 => Err(ParseErrorKind::InvalidValue),
        hz => Ok(hz),
    }
}

fn parse_mode(value: &str) -> Result<SpiMode, ParseErrorKind> {
    let n = parse_u32(value)?;
    u8::try_from(n)
        .ok()
        .and_then(SpiMode::from_number)
        .ok_or(ParseErrorKind::InvalidValue)
}

/// Parse a decimal voltage ("3.3") into whole millivolts
fn parse_volts_as_mv(value: &str) -> Result<u16, ParseErrorKind> {
    let volts: f32 = value.parse().map_err(|_| ParseErrorKind::InvalidValue)?;
    if !volts.is_finite() || volts <= 0.0 {
        return Err(ParseErrorKind::InvalidValue);
    }
    let mv = (volts * 1000.0 + 0.5) as u32;
    if mv == 0 || mv > MAX_VREF_MV {
        return Err(ParseErrorKind::InvalidValue);
    }
    Ok(mv as u16)
}
