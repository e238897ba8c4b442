//! Shift-out engine
//!
//! Bit-bangs a frame onto the driver chain. Every bar receives a 16-bit
//! command word, ten 16-bit grayscale words and a 32-bit clear tail, MSB
//! first. The clock line is toggled once per bit; the driver samples on both
//! edges. After the last bar the data line is pulsed to latch the shift
//! registers into the outputs.

use embassy_time::Duration;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState, StatefulOutputPin};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::buffer::BrightnessBuffer;
use crate::bus::DigitalPort;
use crate::level::LEDS_PER_BAR;

/// Command word sent ahead of every bar (8-bit grayscale mode)
pub const COMMAND_DATA: u16 = 0x0000;

/// Bits per command or grayscale word
pub const WORD_BITS: usize = 16;

/// Bits clocked out after the grayscale words to flush the register
pub const TAIL_BITS: usize = 32;

/// Clock toggles emitted per bar
pub const BITS_PER_BAR: usize = WORD_BITS + LEDS_PER_BAR * WORD_BITS + TAIL_BITS;

/// Requested state of the whole chain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PowerState {
    /// Push the buffer contents
    On,
    /// Push an all-dark frame
    #[default]
    Off,
}

impl From<bool> for PowerState {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

/// Latch timing of the driver chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftTimings {
    /// Data line hold time before the latch pulses
    pub latch_setup: Duration,
    /// Delay after every latch toggle
    pub latch_pulse: Duration,
    /// Number of data line toggles forming the latch
    pub latch_toggles: u8,
}

impl ShiftTimings {
    /// 300 us setup, eight toggles 400 us apart
    pub const DEFAULT: Self = Self {
        latch_setup: Duration::from_micros(300),
        latch_pulse: Duration::from_micros(400),
        latch_toggles: 8,
    };
}

impl Default for ShiftTimings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Grayscale payload of one bar
#[derive(Debug, Clone, Copy)]
enum Burst<'a> {
    /// Every grayscale bit zero, buffer untouched
    Dark,
    /// Ten grayscale values in shift order
    Leds(&'a [u8]),
}

/// Bit writer over the data and clock lines
struct ShiftOut<'a, P, D> {
    data: &'a mut P,
    clock: &'a mut P,
    delay: &'a mut D,
}

impl<P, D> ShiftOut<'_, P, D>
where
    P: StatefulOutputPin,
    D: DelayNs,
{
    /// Write one word, MSB first
    fn word(&mut self, word: u16) -> Result<(), P::Error> {
        for bit in (0..WORD_BITS).rev() {
            self.data.set_state(PinState::from(word & (1 << bit) != 0))?;
            self.clock.toggle()?;
        }
        Ok(())
    }

    /// Clock out `bits` zero bits
    fn zeros(&mut self, bits: usize) -> Result<(), P::Error> {
        self.data.set_low()?;
        for _ in 0..bits {
            self.clock.toggle()?;
        }
        Ok(())
    }

    fn bar(&mut self, burst: Burst<'_>) -> Result<(), P::Error> {
        self.word(COMMAND_DATA)?;
        match burst {
            Burst::Leds(leds) => {
                for &grayscale in leds {
                    self.word(u16::from(grayscale))?;
                }
            }
            Burst::Dark => self.zeros(LEDS_PER_BAR * WORD_BITS)?,
        }
        self.zeros(TAIL_BITS)
    }

    fn latch(&mut self, timings: &ShiftTimings) -> Result<(), P::Error> {
        self.data.set_low()?;
        self.delay.delay_us(micros(timings.latch_setup));
        for _ in 0..timings.latch_toggles {
            self.data.toggle()?;
            self.delay.delay_us(micros(timings.latch_pulse));
        }
        Ok(())
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn micros(duration: Duration) -> u32 {
    duration.as_micros() as u32
}

/// Push one frame onto the chain
///
/// With [`PowerState::On`] the buffer is drained from its start, one bar
/// per module. With [`PowerState::Off`] the buffer is never read and every
/// grayscale bit is zero. The frame runs inside a critical section; the
/// cursor is rewound before the frame and again afterwards whether or not a
/// line failed.
pub fn program<P, D, const N: usize>(
    port: &mut DigitalPort<P>,
    delay: &mut D,
    buffer: &mut BrightnessBuffer<N>,
    state: PowerState,
    timings: &ShiftTimings,
) -> Result<(), P::Error>
where
    P: StatefulOutputPin,
    D: DelayNs,
{
    #[cfg(feature = "esp32-log")]
    println!(
        "[shift::program] {:?} frame for {} bars",
        state,
        buffer.bar_count()
    );

    buffer.rewind();
    let result = critical_section::with(|_cs| {
        let mut out = ShiftOut {
            data: &mut port.pin1,
            clock: &mut port.pin2,
            delay,
        };
        match state {
            // The buffer holds exactly one slice per bar
            PowerState::On => {
                while let Some(leds) = buffer.next_bar() {
                    out.bar(Burst::Leds(leds))?;
                }
            }
            PowerState::Off => {
                for _ in 0..buffer.bar_count() {
                    out.bar(Burst::Dark)?;
                }
            }
        }
        out.latch(timings)
    });
    buffer.rewind();
    result
}
