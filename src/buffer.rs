//! Brightness buffer and logical addressing
//!
//! The buffer stores one grayscale value per LED of the whole chain in
//! shift order: the chain is filled furthest LED first, so index 0 is the
//! last LED of the last bar and the final index is LED 1 of bar 1.

use heapless::Vec;

use crate::error::{AddressError, CapacityError};
use crate::level::{BarFill, DARK, Direction, LEDS_PER_BAR};

/// Per-LED grayscale values for a chain of bars
///
/// `N` is the maximum number of LEDs the buffer can hold.
#[derive(Debug, Clone)]
pub struct BrightnessBuffer<const N: usize> {
    bar_count: u8,
    values: Vec<u8, N>,
    cursor: usize,
}

impl<const N: usize> BrightnessBuffer<N> {
    /// Allocate a zeroed buffer for `bar_count` bars
    ///
    /// Fails if the chain is empty or does not fit in `N` LEDs.
    pub fn new(bar_count: u8) -> Result<Self, CapacityError> {
        let requested = LEDS_PER_BAR * usize::from(bar_count);
        let capacity_error = CapacityError {
            requested,
            capacity: N,
        };
        if bar_count == 0 {
            return Err(capacity_error);
        }

        let mut values = Vec::new();
        values
            .resize(requested, DARK)
            .map_err(|()| capacity_error)?;

        Ok(Self {
            bar_count,
            values,
            cursor: 0,
        })
    }

    /// Number of bars in the chain
    pub const fn bar_count(&self) -> u8 {
        self.bar_count
    }

    /// Number of LEDs in the chain
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True only for a chain without LEDs, which `new` never builds
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw values in shift order
    pub fn as_slice(&self) -> &[u8] {
        &self.values
    }

    /// Turn every LED off and rewind the cursor
    pub fn clear(&mut self) {
        self.values.iter_mut().for_each(|value| *value = DARK);
        self.cursor = 0;
    }

    /// Current cursor position
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor back to the buffer start
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Take the next bar worth of values and advance the cursor
    ///
    /// Returns None once the cursor has passed the last bar.
    pub fn next_bar(&mut self) -> Option<&[u8]> {
        let start = self.cursor;
        let bar = self.values.get(start..start + LEDS_PER_BAR)?;
        self.cursor += LEDS_PER_BAR;
        Some(bar)
    }

    /// Buffer index of LED `led` (1-based) in bar `bar` (1-based)
    pub fn index_of(&self, bar: u8, led: u8) -> Result<usize, AddressError> {
        if bar == 0 || bar > self.bar_count {
            return Err(AddressError::Bar(bar));
        }
        if led == 0 || usize::from(led) > LEDS_PER_BAR {
            return Err(AddressError::Led(led));
        }
        Ok(LEDS_PER_BAR * usize::from(self.bar_count)
            - usize::from(led)
            - usize::from(bar - 1) * LEDS_PER_BAR)
    }

    /// Grayscale of a single LED
    pub fn get(&self, bar: u8, led: u8) -> Result<u8, AddressError> {
        let index = self.index_of(bar, led)?;
        Ok(self.values[index])
    }

    /// Write the grayscale of a single LED
    ///
    /// Leaves the cursor on the written slot.
    pub fn set_led(&mut self, bar: u8, led: u8, grayscale: u8) -> Result<(), AddressError> {
        let index = self.index_of(bar, led)?;
        self.values[index] = grayscale;
        self.cursor = index;
        Ok(())
    }

    /// Fill bar `bar` up to `level` (0..=89) in the given direction
    ///
    /// Leaves the cursor on the last written slot.
    #[allow(clippy::cast_possible_truncation)]
    pub fn fill_bar(&mut self, bar: u8, level: u8, direction: Direction) -> Result<(), AddressError> {
        let fill = BarFill::from_level(level);
        for led in 1..=LEDS_PER_BAR as u8 {
            self.set_led(bar, led, fill.grayscale(led - 1, direction))?;
        }
        Ok(())
    }

    /// Overwrite values in logical order, bar 1 LED 1 first
    ///
    /// Values beyond the end of the chain are ignored. Returns the number of
    /// LEDs written.
    pub fn load<I: IntoIterator<Item = u8>>(&mut self, grayscale: I) -> usize {
        let last = self.values.len();
        let mut written = 0;
        for (logical, value) in grayscale.into_iter().take(last).enumerate() {
            self.values[last - 1 - logical] = value;
            written += 1;
        }
        written
    }
}
