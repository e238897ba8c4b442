//! Digital bus attachment
//!
//! The board side of a Grove device: a bus hands out the GPIO lines of a
//! numbered port, configured for the role the device needs.

use embedded_hal::digital::OutputPin;

/// Line configuration requested from a port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortMode {
    /// Both lines as push-pull outputs
    DualOutput,
}

/// The two lines of a digital port
#[derive(Debug)]
pub struct DigitalPort<P> {
    /// First line (data)
    pub pin1: P,
    /// Second line (clock)
    pub pin2: P,
}

/// Board-level allocator of digital port lines
///
/// Implement this trait for the board the devices are plugged into.
pub trait DigitalBus {
    /// Line type handed out by the bus
    type Pin: OutputPin;

    /// Claim the lines of port `port` in the given mode
    ///
    /// Returns None if the port does not exist or is already in use.
    fn claim(&mut self, port: u8, mode: PortMode) -> Option<DigitalPort<Self::Pin>>;
}
