//! Bar-graph level decomposition
//!
//! A bar level selects how far a single bar is filled. The level is split
//! into a number of fully lit LEDs and a residue (in tenths of an LED) for
//! the boundary LED, so a bar fills smoothly in 100 integer steps.

/// Number of LEDs in one bar module
pub const LEDS_PER_BAR: usize = 10;

/// Highest accepted bar level; larger values saturate
pub const LEVEL_MAX: u8 = 89;

/// Grayscale added to the boundary LED per tenth of residue
pub const RESIDUE_STEP: u8 = 25;

/// Grayscale of a fully lit LED
pub const FULL: u8 = 0xFF;

/// Grayscale of a dark LED
pub const DARK: u8 = 0x00;

/// Fill direction of a bar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum Direction {
    /// Lit LEDs grow from LED 1 upwards
    #[default]
    Forward = 0,
    /// Lit and dark LEDs are swapped
    Reverse = 1,
}

/// Decomposed bar level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarFill {
    /// Fully lit LEDs, 0..=10
    pub lit: u8,
    /// Tenths of the boundary LED, 0..=9
    pub residue: u8,
}

impl BarFill {
    /// Split a level into lit LEDs and boundary residue
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_level(level: u8) -> Self {
        let level = if level > LEVEL_MAX { LEVEL_MAX } else { level };
        let tenths = (level as u16 * 100) / LEVEL_MAX as u16;
        Self {
            lit: (tenths / 10) as u8,
            residue: (tenths % 10) as u8,
        }
    }

    /// Grayscale of the LED at zero-based `position` within the bar
    pub const fn grayscale(self, position: u8, direction: Direction) -> u8 {
        let forward = if position < self.lit {
            FULL
        } else if position == self.lit {
            self.residue.saturating_mul(RESIDUE_STEP)
        } else {
            DARK
        };
        match direction {
            Direction::Forward => forward,
            Direction::Reverse => FULL - forward,
        }
    }

    /// Number of LEDs that are not dark
    #[allow(clippy::cast_possible_truncation)]
    pub fn lit_count(self, direction: Direction) -> usize {
        (0..LEDS_PER_BAR as u8)
            .filter(|&position| self.grayscale(position, direction) != DARK)
            .count()
    }
}
