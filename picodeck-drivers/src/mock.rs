//! Recording mocks for driver tests
//!
//! Every mock appends to one shared [`Log`], so tests can assert the exact
//! interleaving of line changes, bus transfers and delays.

use core::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use picodeck_hal::{
    DelayMs, InputPin, OutputPin, PinBank, PinError, PwmPin, SpiBus, SpiConfig, SpiPins,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Named output line driven to a level
    Pin(&'static str, bool),
    Configure(SpiConfig),
    Write(Vec<u8>),
    Transfer(Vec<u8>),
    Read(usize),
    Flush,
    Delay(u32),
}

#[derive(Clone, Default)]
pub struct Log(Rc<RefCell<Vec<Event>>>);

impl Log {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Number of bus operations recorded (pins and delays excluded)
    pub fn bus_activity(&self) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    Event::Configure(_)
                        | Event::Write(_)
                        | Event::Transfer(_)
                        | Event::Read(_)
                        | Event::Flush
                )
            })
            .count()
    }

    /// Data written on the bus while the named line was at `level`
    pub fn writes_while(&self, line: &'static str, level: bool) -> Vec<Vec<u8>> {
        let mut current = None;
        let mut out = Vec::new();
        for event in self.0.borrow().iter() {
            match event {
                Event::Pin(name, l) if *name == line => current = Some(*l),
                Event::Write(data) if current == Some(level) => out.push(data.clone()),
                _ => {}
            }
        }
        out
    }

    /// Total delay recorded, in milliseconds
    pub fn total_delay_ms(&self) -> u32 {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Delay(ms) => Some(*ms),
                _ => None,
            })
            .sum()
    }
}

pub struct MockPin {
    name: &'static str,
    log: Log,
    high: bool,
}

impl MockPin {
    pub fn new(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            log: log.clone(),
            high: false,
        }
    }
}

impl OutputPin for MockPin {
    fn set_high(&mut self) {
        self.high = true;
        self.log.push(Event::Pin(self.name, true));
    }

    fn set_low(&mut self) {
        self.high = false;
        self.log.push(Event::Pin(self.name, false));
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// Input whose level the test controls through a shared cell
#[derive(Clone)]
pub struct MockInput(pub Rc<Cell<bool>>);

impl MockInput {
    pub fn new(high: bool) -> Self {
        Self(Rc::new(Cell::new(high)))
    }

    pub fn set(&self, high: bool) {
        self.0.set(high);
    }
}

impl InputPin for MockInput {
    fn is_high(&self) -> bool {
        self.0.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusError;

pub struct MockBus {
    log: Log,
    /// Bytes clocked in by successive `transfer`/`read` calls
    responses: VecDeque<Vec<u8>>,
    /// Level MISO idles at when no response is queued
    idle: u8,
    /// Successful data operations left before every call fails
    fail_after: Option<usize>,
}

impl MockBus {
    pub fn new(log: &Log) -> Self {
        Self {
            log: log.clone(),
            responses: VecDeque::new(),
            idle: 0x00,
            fail_after: None,
        }
    }

    pub fn respond(&mut self, bytes: &[u8]) {
        self.responses.push_back(bytes.to_vec());
    }

    pub fn idle_high(mut self) -> Self {
        self.idle = 0xFF;
        self
    }

    pub fn failing_after(mut self, ops: usize) -> Self {
        self.fail_after = Some(ops);
        self
    }

    fn check(&mut self) -> Result<(), BusError> {
        match self.fail_after {
            Some(0) => Err(BusError),
            Some(ref mut n) => {
                *n -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn fill(&mut self, buf: &mut [u8]) {
        match self.responses.pop_front() {
            Some(bytes) => {
                for (dst, src) in buf.iter_mut().zip(bytes.iter().chain(core::iter::repeat(&0))) {
                    *dst = *src;
                }
            }
            None => buf.fill(self.idle),
        }
    }
}

impl SpiBus for MockBus {
    type Error = BusError;

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), BusError> {
        self.check()?;
        self.log.push(Event::Transfer(write.to_vec()));
        self.fill(read);
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), BusError> {
        self.check()?;
        self.log.push(Event::Write(data.to_vec()));
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), BusError> {
        self.check()?;
        self.log.push(Event::Read(buf.len()));
        self.fill(buf);
        Ok(())
    }

    fn configure(&mut self, config: &SpiConfig) -> Result<(), BusError> {
        self.log.push(Event::Configure(*config));
        Ok(())
    }

    fn flush(&mut self) -> Result<(), BusError> {
        self.log.push(Event::Flush);
        Ok(())
    }
}

pub struct MockDelay(Log);

impl MockDelay {
    pub fn new(log: &Log) -> Self {
        Self(log.clone())
    }
}

impl DelayMs for MockDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.0.push(Event::Delay(ms));
    }
}

pub struct MockPwm {
    pub duty: Rc<Cell<u16>>,
    max: u16,
}

impl MockPwm {
    pub fn new(max: u16) -> Self {
        Self {
            duty: Rc::new(Cell::new(0)),
            max,
        }
    }
}

impl PwmPin for MockPwm {
    fn max_duty(&self) -> u16 {
        self.max
    }

    fn set_duty(&mut self, duty: u16) {
        self.duty.set(duty);
    }
}

const GPIO_COUNT: usize = 30;

/// Line names as they appear in [`Event::Pin`]
const GPIO_NAMES: [&str; GPIO_COUNT] = [
    "gpio0", "gpio1", "gpio2", "gpio3", "gpio4", "gpio5", "gpio6", "gpio7", "gpio8", "gpio9",
    "gpio10", "gpio11", "gpio12", "gpio13", "gpio14", "gpio15", "gpio16", "gpio17", "gpio18",
    "gpio19", "gpio20", "gpio21", "gpio22", "gpio23", "gpio24", "gpio25", "gpio26", "gpio27",
    "gpio28", "gpio29",
];

/// What a bank pin was taken as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    Output,
    Input { pull_up: bool },
    Pwm { frequency_hz: u32 },
    Spi,
}

/// RP2040-sized pin bank handing out recording mocks
///
/// Outputs are [`MockPin`]s named `gpioN`. Inputs follow their pull-up
/// (high with, low without) until a test drives them through
/// [`input_line`](Self::input_line).
pub struct MockBank {
    log: Log,
    claims: [Option<Claim>; GPIO_COUNT],
    inputs: Vec<(u8, MockInput)>,
    pwm: Vec<(u8, Rc<Cell<u16>>)>,
    spi: Option<(SpiPins, SpiConfig)>,
}

impl MockBank {
    pub fn new(log: &Log) -> Self {
        Self {
            log: log.clone(),
            claims: [None; GPIO_COUNT],
            inputs: Vec::new(),
            pwm: Vec::new(),
            spi: None,
        }
    }

    pub fn claim(&self, pin: u8) -> Option<Claim> {
        self.claims.get(pin as usize).copied().flatten()
    }

    pub fn input_line(&self, pin: u8) -> Option<MockInput> {
        self.inputs
            .iter()
            .find(|(p, _)| *p == pin)
            .map(|(_, line)| line.clone())
    }

    pub fn duty(&self, pin: u8) -> Option<u16> {
        self.pwm
            .iter()
            .find(|(p, _)| *p == pin)
            .map(|(_, duty)| duty.get())
    }

    pub fn spi_pins(&self) -> Option<SpiPins> {
        self.spi.map(|(pins, _)| pins)
    }

    pub fn spi_config(&self) -> Option<SpiConfig> {
        self.spi.map(|(_, config)| config)
    }

    fn take(&mut self, pin: u8, claim: Claim) -> Result<(), PinError> {
        let slot = self
            .claims
            .get_mut(pin as usize)
            .ok_or(PinError::InvalidPin)?;
        if slot.is_some() {
            return Err(PinError::AlreadyTaken);
        }
        *slot = Some(claim);
        Ok(())
    }
}

impl PinBank for MockBank {
    type Output = MockPin;
    type Input = MockInput;
    type Pwm = MockPwm;
    type Bus = MockBus;

    fn output(&mut self, pin: u8, high: bool) -> Result<MockPin, PinError> {
        self.take(pin, Claim::Output)?;
        let mut line = MockPin::new(GPIO_NAMES[pin as usize], &self.log);
        line.set_state(high);
        Ok(line)
    }

    fn input(&mut self, pin: u8, pull_up: bool) -> Result<MockInput, PinError> {
        self.take(pin, Claim::Input { pull_up })?;
        let line = MockInput::new(pull_up);
        self.inputs.push((pin, line.clone()));
        Ok(line)
    }

    fn pwm(&mut self, pin: u8, frequency_hz: u32) -> Result<MockPwm, PinError> {
        self.take(pin, Claim::Pwm { frequency_hz })?;
        let pwm = MockPwm::new(u16::MAX);
        self.pwm.push((pin, pwm.duty.clone()));
        Ok(pwm)
    }

    fn spi(&mut self, pins: &SpiPins, config: &SpiConfig) -> Result<MockBus, PinError> {
        self.take(pins.sck, Claim::Spi)?;
        self.take(pins.mosi, Claim::Spi)?;
        if let Some(miso) = pins.miso {
            self.take(miso, Claim::Spi)?;
        }
        self.spi = Some((*pins, *config));

        let bus = MockBus::new(&self.log);
        Ok(if pins.miso_pull_up { bus.idle_high() } else { bus })
    }
}
