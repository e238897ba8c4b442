//! Grove LED bar device
//!
//! Owns the brightness buffer of a chain of bars and the two lines it is
//! attached to. Configuration only touches the buffer; nothing reaches the
//! hardware until [`GroveDevice::set`] pushes a frame.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, StatefulOutputPin};
use smart_leds::SmartLedsWrite;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::GroveDevice;
use crate::buffer::BrightnessBuffer;
use crate::bus::{DigitalBus, DigitalPort, PortMode};
use crate::error::{CapacityError, Error};
use crate::level::Direction;
use crate::shift::{PowerState, ShiftTimings, program};

/// Buffer configuration request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedBarConfig {
    /// Set the grayscale of a single LED
    Led {
        /// Bar index, 1-based
        bar: u8,
        /// LED index within the bar, 1..=10
        led: u8,
        /// 0 = off, 255 = full
        grayscale: u8,
    },
    /// Fill a bar like a bar graph
    Bar {
        /// Bar index, 1-based
        bar: u8,
        /// Fill level, 0..=89
        level: u8,
        direction: Direction,
    },
}

/// A chain of daisy-chained LED bars
///
/// `MAX_LEDS` bounds the chain length (ten LEDs per bar).
pub struct LedBar<P, D, const MAX_LEDS: usize> {
    port: Option<DigitalPort<P>>,
    delay: D,
    timings: ShiftTimings,
    buffer: BrightnessBuffer<MAX_LEDS>,
}

impl<P, D, const MAX_LEDS: usize> LedBar<P, D, MAX_LEDS>
where
    P: StatefulOutputPin,
    D: DelayNs,
{
    /// Create a detached chain of `bar_count` bars with every LED off
    pub fn new(bar_count: u8, delay: D) -> Result<Self, CapacityError> {
        Self::with_timings(bar_count, delay, ShiftTimings::DEFAULT)
    }

    /// Create a detached chain with custom latch timing
    pub fn with_timings(
        bar_count: u8,
        delay: D,
        timings: ShiftTimings,
    ) -> Result<Self, CapacityError> {
        Ok(Self {
            port: None,
            delay,
            timings,
            buffer: BrightnessBuffer::new(bar_count)?,
        })
    }

    /// Number of bars in the chain
    pub const fn bar_count(&self) -> u8 {
        self.buffer.bar_count()
    }

    /// Grayscale values in shift order
    pub fn buffer(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    /// Current buffer cursor
    pub const fn cursor(&self) -> usize {
        self.buffer.cursor()
    }

    /// Whether the device holds the lines of a port
    pub const fn is_attached(&self) -> bool {
        self.port.is_some()
    }

    /// Grayscale of a single LED
    pub fn led(&self, bar: u8, led: u8) -> Result<u8, Error<P::Error>> {
        Ok(self.buffer.get(bar, led)?)
    }

    /// Set a single LED; shorthand for [`LedBarConfig::Led`]
    pub fn set_led(&mut self, bar: u8, led: u8, grayscale: u8) -> Result<(), Error<P::Error>> {
        self.configure(LedBarConfig::Led {
            bar,
            led,
            grayscale,
        })
    }

    /// Fill a bar; shorthand for [`LedBarConfig::Bar`]
    pub fn set_level(
        &mut self,
        bar: u8,
        level: u8,
        direction: Direction,
    ) -> Result<(), Error<P::Error>> {
        self.configure(LedBarConfig::Bar {
            bar,
            level,
            direction,
        })
    }

    /// Turn every LED off in the buffer
    ///
    /// The hardware keeps showing the last frame until the next `set`.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Release the lines of the attached port
    pub fn detach(&mut self) -> Option<DigitalPort<P>> {
        self.port.take()
    }

    fn push_frame(&mut self, state: PowerState) -> Result<(), Error<P::Error>> {
        let port = self.port.as_mut().ok_or(Error::NotAttached)?;
        program(port, &mut self.delay, &mut self.buffer, state, &self.timings).map_err(Error::Pin)
    }
}

impl<P, D, const MAX_LEDS: usize> GroveDevice for LedBar<P, D, MAX_LEDS>
where
    P: StatefulOutputPin,
    D: DelayNs,
{
    type Pin = P;
    type Config = LedBarConfig;
    type State = PowerState;
    type Error = Error<P::Error>;

    fn attach<B>(&mut self, bus: &mut B, port: u8) -> Result<(), Error<P::Error>>
    where
        B: DigitalBus<Pin = Self::Pin>,
    {
        if self.port.is_some() {
            return Err(Error::AlreadyAttached);
        }
        let claimed = bus
            .claim(port, PortMode::DualOutput)
            .ok_or(Error::PortUnavailable(port))?;
        // Kept even if driving the lines low fails, so `detach` can hand them back
        let lines = self.port.insert(claimed);
        lines.pin2.set_low().map_err(Error::Pin)?;
        lines.pin1.set_low().map_err(Error::Pin)?;

        #[cfg(feature = "esp32-log")]
        println!(
            "[LedBar.attach] {} bars attached to port {}",
            self.buffer.bar_count(),
            port
        );

        self.push_frame(PowerState::Off)
    }

    fn configure(&mut self, config: LedBarConfig) -> Result<(), Error<P::Error>> {
        let result = match config {
            LedBarConfig::Led {
                bar,
                led,
                grayscale,
            } => self.buffer.set_led(bar, led, grayscale),
            LedBarConfig::Bar {
                bar,
                level,
                direction,
            } => self.buffer.fill_bar(bar, level, direction),
        };

        #[cfg(feature = "esp32-log")]
        if let Err(err) = result {
            println!("[LedBar.configure] rejected {:?}: {:?}", config, err);
        }

        Ok(result?)
    }

    fn set(&mut self, state: PowerState) -> Result<(), Error<P::Error>> {
        self.buffer.rewind();
        self.push_frame(state)
    }
}

impl<P, D, const MAX_LEDS: usize> SmartLedsWrite for LedBar<P, D, MAX_LEDS>
where
    P: StatefulOutputPin,
    D: DelayNs,
{
    type Error = Error<P::Error>;
    type Color = u8;

    /// Load grayscale values in logical order (bar 1 LED 1 first) and push
    /// them to the chain
    fn write<T, I>(&mut self, iterator: T) -> Result<(), Error<P::Error>>
    where
        T: IntoIterator<Item = I>,
        I: Into<u8>,
    {
        self.buffer.load(iterator.into_iter().map(Into::into));
        self.set(PowerState::On)
    }
}
