#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin, StatefulOutputPin};
use grove_led_bar::{DigitalBus, DigitalPort, PortMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Data,
    Clock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Set(Line, bool),
    Toggle(Line),
    DelayNs(u32),
}

pub type Log = Rc<RefCell<Vec<Event>>>;

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

fn record(log: &Log, event: Event) {
    if SECTION_DEPTH.get() == 0 {
        EVENTS_OUTSIDE_SECTION.set(EVENTS_OUTSIDE_SECTION.get() + 1);
    }
    log.borrow_mut().push(event);
}

thread_local! {
    static SECTION_DEPTH: Cell<u32> = const { Cell::new(0) };
    static SECTIONS_ENTERED: Cell<u32> = const { Cell::new(0) };
    static EVENTS_OUTSIDE_SECTION: Cell<u32> = const { Cell::new(0) };
}

/// Critical section that counts how often it is entered on this thread
struct CountingSection;

critical_section::set_impl!(CountingSection);

unsafe impl critical_section::Impl for CountingSection {
    unsafe fn acquire() -> critical_section::RawRestoreState {
        SECTION_DEPTH.set(SECTION_DEPTH.get() + 1);
        SECTIONS_ENTERED.set(SECTIONS_ENTERED.get() + 1);
    }

    unsafe fn release(_restore_state: critical_section::RawRestoreState) {
        SECTION_DEPTH.set(SECTION_DEPTH.get() - 1);
    }
}

/// Critical section bookkeeping of the current thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionStats {
    /// Sections currently held
    pub depth: u32,
    /// Sections entered since the last reset
    pub entered: u32,
    /// Recorded line or delay events outside any section
    pub events_outside: u32,
}

pub fn section_stats() -> SectionStats {
    SectionStats {
        depth: SECTION_DEPTH.get(),
        entered: SECTIONS_ENTERED.get(),
        events_outside: EVENTS_OUTSIDE_SECTION.get(),
    }
}

pub fn reset_section_stats() {
    SECTIONS_ENTERED.set(0);
    EVENTS_OUTSIDE_SECTION.set(0);
}

/// Output line that records every level change
pub struct RecordingPin {
    line: Line,
    high: bool,
    log: Log,
}

impl RecordingPin {
    pub fn new(line: Line, log: &Log) -> Self {
        Self {
            line,
            high: false,
            log: log.clone(),
        }
    }
}

impl ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.high = false;
        record(&self.log, Event::Set(self.line, false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.high = true;
        record(&self.log, Event::Set(self.line, true));
        Ok(())
    }
}

impl StatefulOutputPin for RecordingPin {
    fn is_set_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.high)
    }

    fn is_set_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.high)
    }

    fn toggle(&mut self) -> Result<(), Infallible> {
        self.high = !self.high;
        record(&self.log, Event::Toggle(self.line));
        Ok(())
    }
}

pub struct RecordingDelay {
    log: Log,
}

impl RecordingDelay {
    pub fn new(log: &Log) -> Self {
        Self { log: log.clone() }
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        record(&self.log, Event::DelayNs(ns));
    }
}

/// Board with a fixed set of free ports
pub struct RecordingBus {
    log: Log,
    free_ports: Vec<u8>,
}

impl RecordingBus {
    pub fn new(log: &Log, free_ports: &[u8]) -> Self {
        Self {
            log: log.clone(),
            free_ports: free_ports.to_vec(),
        }
    }
}

impl DigitalBus for RecordingBus {
    type Pin = RecordingPin;

    fn claim(&mut self, port: u8, mode: PortMode) -> Option<DigitalPort<RecordingPin>> {
        assert_eq!(mode, PortMode::DualOutput);
        let slot = self.free_ports.iter().position(|&free| free == port)?;
        self.free_ports.remove(slot);
        Some(DigitalPort {
            pin1: RecordingPin::new(Line::Data, &self.log),
            pin2: RecordingPin::new(Line::Clock, &self.log),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineFault;

impl embedded_hal::digital::Error for LineFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Line that fails level changes or toggles on request
pub struct FaultyPin {
    pub fail_set: bool,
    pub fail_toggle: bool,
}

impl FaultyPin {
    pub fn new(fail_set: bool, fail_toggle: bool) -> Self {
        Self {
            fail_set,
            fail_toggle,
        }
    }
}

impl ErrorType for FaultyPin {
    type Error = LineFault;
}

impl OutputPin for FaultyPin {
    fn set_low(&mut self) -> Result<(), LineFault> {
        if self.fail_set { Err(LineFault) } else { Ok(()) }
    }

    fn set_high(&mut self) -> Result<(), LineFault> {
        if self.fail_set { Err(LineFault) } else { Ok(()) }
    }
}

impl StatefulOutputPin for FaultyPin {
    fn is_set_high(&mut self) -> Result<bool, LineFault> {
        Ok(false)
    }

    fn is_set_low(&mut self) -> Result<bool, LineFault> {
        Ok(true)
    }

    fn toggle(&mut self) -> Result<(), LineFault> {
        if self.fail_toggle { Err(LineFault) } else { Ok(()) }
    }
}

/// Board whose single port hands out lines that cannot be driven
pub struct FaultyBus {
    pub claimed: bool,
}

impl DigitalBus for FaultyBus {
    type Pin = FaultyPin;

    fn claim(&mut self, _port: u8, _mode: PortMode) -> Option<DigitalPort<FaultyPin>> {
        if self.claimed {
            return None;
        }
        self.claimed = true;
        Some(DigitalPort {
            pin1: FaultyPin::new(true, false),
            pin2: FaultyPin::new(true, false),
        })
    }
}

pub fn recording_port(log: &Log) -> DigitalPort<RecordingPin> {
    DigitalPort {
        pin1: RecordingPin::new(Line::Data, log),
        pin2: RecordingPin::new(Line::Clock, log),
    }
}

/// Data line level sampled at every clock toggle
pub fn clocked_bits(events: &[Event]) -> Vec<bool> {
    let mut data = false;
    let mut bits = Vec::new();
    for event in events {
        match *event {
            Event::Set(Line::Data, level) => data = level,
            Event::Toggle(Line::Data) => data = !data,
            Event::Toggle(Line::Clock) => bits.push(data),
            Event::Set(Line::Clock, _) | Event::DelayNs(_) => {}
        }
    }
    bits
}

/// Fold clocked bits into 16-bit MSB-first words
pub fn words(bits: &[bool]) -> Vec<u16> {
    bits.chunks(16)
        .map(|chunk| {
            chunk
                .iter()
                .fold(0u16, |word, &bit| (word << 1) | u16::from(bit))
        })
        .collect()
}

/// Grayscale words of every bar, in emission order
///
/// A bar frame is 13 words: command, ten grayscale words and a two word tail.
pub fn bar_frames(events: &[Event]) -> Vec<Vec<u16>> {
    words(&clocked_bits(events))
        .chunks(13)
        .map(|frame| frame.to_vec())
        .collect()
}

/// Events emitted after the last clock toggle
pub fn latch_events(events: &[Event]) -> Vec<Event> {
    let last_clock = events
        .iter()
        .rposition(|event| *event == Event::Toggle(Line::Clock))
        .map_or(0, |index| index + 1);
    events[last_clock..].to_vec()
}
