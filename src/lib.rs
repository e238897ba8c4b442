#![no_std]

pub mod buffer;
pub mod bus;
pub mod error;
pub mod led_bar;
pub mod level;
pub mod shift;

pub use buffer::BrightnessBuffer;
pub use bus::{DigitalBus, DigitalPort, PortMode};
pub use error::{AddressError, CapacityError, Error};
pub use led_bar::{LedBar, LedBarConfig};
pub use level::{BarFill, Direction, LEDS_PER_BAR, LEVEL_MAX};
pub use shift::{COMMAND_DATA, PowerState, ShiftTimings};

pub use embassy_time::Duration;

use embedded_hal::digital::OutputPin;

/// Abstract Grove device trait
///
/// Every device plugged into a Grove board follows the same lifecycle:
/// construct, attach to a bus port, configure, set. Construction and
/// destruction are left to the device type itself.
pub trait GroveDevice {
    /// Line type the device drives
    type Pin: OutputPin;
    /// Configuration request accepted by `configure`
    type Config;
    /// Output state accepted by `set`
    type State;
    /// Failure reported by every lifecycle step
    type Error;

    /// Claim the lines of `port` from `bus` and bring the device to its
    /// initial state
    fn attach<B>(&mut self, bus: &mut B, port: u8) -> Result<(), Self::Error>
    where
        B: DigitalBus<Pin = Self::Pin>;

    /// Apply a configuration request
    fn configure(&mut self, config: Self::Config) -> Result<(), Self::Error>;

    /// Drive the device into `state`
    fn set(&mut self, state: Self::State) -> Result<(), Self::Error>;
}
