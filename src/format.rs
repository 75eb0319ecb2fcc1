//! Device format bitmask.
//!
//! ```text
//! bit   6      5        4      3..2        1..0
//!     TASK  FUNCTION  FILE  TIMESTAMP     LEVEL
//!                           01 simple     01 letter
//!                           10 short      10 short
//!                           11 full       11 full
//! ```

use core::ops::{BitOr, BitOrAssign};

/// Level tag style (2-bit subfield).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelStyle {
    /// `[I] `
    Letter,
    /// `[INF] `
    Short,
    /// `[INFO] `
    Full,
}

/// Timestamp tag style (2-bit subfield).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimestampStyle {
    /// `0000012345.678 `
    Simple,
    /// `HH:MM:SS `
    Short,
    /// `YYYY-MM-DD HH:MM:SS.mmm `
    Full,
}

/// Format bitmask selecting which rendering steps a device performs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Format(u8);

impl Format {
    /// Message only, no separator.
    pub const NONE: Format = Format(0);

    pub const LEVEL_LETTER: Format = Format(0b01);
    pub const LEVEL_SHORT: Format = Format(0b10);
    pub const LEVEL_FULL: Format = Format(0b11);

    pub const TIMESTAMP_SIMPLE: Format = Format(0b01 << 2);
    pub const TIMESTAMP_SHORT: Format = Format(0b10 << 2);
    pub const TIMESTAMP_FULL: Format = Format(0b11 << 2);

    pub const FILE_TRACE: Format = Format(1 << 4);
    pub const FUNCTION_TRACE: Format = Format(1 << 5);
    pub const TASK_TRACE: Format = Format(1 << 6);

    const LEVEL_MASK: u8 = 0b11;
    const TIMESTAMP_MASK: u8 = 0b11 << 2;

    /// Create from raw bits.
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Format(bits)
    }

    /// Raw bits.
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Const-friendly `|`.
    #[inline]
    pub const fn union(self, other: Format) -> Self {
        Format(self.0 | other.0)
    }

    /// True if every bit of `other` is set.
    #[inline]
    pub const fn contains(self, other: Format) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Selected level tag style, if any.
    pub fn level_style(self) -> Option<LevelStyle> {
        match self.0 & Self::LEVEL_MASK {
            0b01 => Some(LevelStyle::Letter),
            0b10 => Some(LevelStyle::Short),
            0b11 => Some(LevelStyle::Full),
            _ => None,
        }
    }

    /// Selected timestamp tag style, if any.
    pub fn timestamp_style(self) -> Option<TimestampStyle> {
        match (self.0 & Self::TIMESTAMP_MASK) >> 2 {
            0b01 => Some(TimestampStyle::Simple),
            0b10 => Some(TimestampStyle::Short),
            0b11 => Some(TimestampStyle::Full),
            _ => None,
        }
    }

    #[inline]
    pub fn file_trace(self) -> bool {
        self.contains(Self::FILE_TRACE)
    }

    #[inline]
    pub fn function_trace(self) -> bool {
        self.contains(Self::FUNCTION_TRACE)
    }

    #[inline]
    pub fn task_trace(self) -> bool {
        self.contains(Self::TASK_TRACE)
    }
}

impl BitOr for Format {
    type Output = Format;

    fn bitor(self, rhs: Format) -> Format {
        self.union(rhs)
    }
}

impl BitOrAssign for Format {
    fn bitor_assign(&mut self, rhs: Format) {
        self.0 |= rhs.0;
    }
}

impl From<u8> for Format {
    fn from(bits: u8) -> Self {
        Format(bits)
    }
}
