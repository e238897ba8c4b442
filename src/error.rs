//! Error types for the LED bar driver.

/// Returned when the brightness buffer cannot hold the requested chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityError {
    /// Number of LEDs the chain needs
    pub requested: usize,
    /// Number of LEDs the buffer can hold
    pub capacity: usize,
}

/// Logical address outside the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressError {
    /// Bar index outside `1..=bar_count`
    Bar(u8),
    /// LED index outside `1..=10`
    Led(u8),
}

/// Driver error
///
/// `E` is the error type of the GPIO lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// Buffer allocation failed at construction
    Capacity(CapacityError),
    /// The bus could not allocate the lines of this port
    PortUnavailable(u8),
    /// Bar or LED index out of range
    Address(AddressError),
    /// Frame requested before the device was attached
    NotAttached,
    /// Attach requested while the device already holds a port
    AlreadyAttached,
    /// GPIO line failure
    Pin(E),
}

impl<E> From<CapacityError> for Error<E> {
    fn from(err: CapacityError) -> Self {
        Self::Capacity(err)
    }
}

impl<E> From<AddressError> for Error<E> {
    fn from(err: AddressError) -> Self {
        Self::Address(err)
    }
}
