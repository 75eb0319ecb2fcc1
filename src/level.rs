//! Log levels.
//!
//! Levels are totally ordered from [`Level::Nothing`] (sentinel, no tag)
//! through increasing verbosity up to [`Level::Always`].
//!
//! A device with threshold `T` renders an entry at level `L` when `L <= T`.
//! `Always` entries bypass the threshold check entirely.

/// Log level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Level {
    /// Sentinel: as a device threshold it disables output.
    #[default]
    Nothing = 0,
    Fatal = 1,
    Error = 2,
    Warn = 3,
    Notice = 4,
    Info = 5,
    Debug = 6,
    Trace = 7,
    Verbose = 8,
    Always = 9,
}

/// Single letter tags, indexed by `level - 1`.
const LETTERS: &[u8; 9] = b"FEWNIDTVA";

/// Three letter tags, indexed by `level - 1`.
const SHORT: [&str; 9] = ["FAT", "ERR", "WAR", "NOT", "INF", "DEB", "TRA", "VER", "ALW"];

/// Full word tags, indexed by `level - 1`.
const FULL: [&str; 9] = [
    "FATAL", "ERROR", "WARN", "NOTICE", "INFO", "DEBUG", "TRACE", "VERBOSE", "ALWAYS",
];

/// Platform core debug level (0..=6) to `Level`.
const CORE_LEVEL_MAPPING: [Level; 7] = [
    Level::Nothing,
    Level::Error,
    Level::Warn,
    Level::Info,
    Level::Debug,
    Level::Verbose,
    Level::Always,
];

impl Level {
    /// All levels in ascending order.
    pub const ALL: [Level; 10] = [
        Level::Nothing,
        Level::Fatal,
        Level::Error,
        Level::Warn,
        Level::Notice,
        Level::Info,
        Level::Debug,
        Level::Trace,
        Level::Verbose,
        Level::Always,
    ];

    /// Convert from raw u8 value. Returns `None` above `Always`.
    pub const fn from_u8(value: u8) -> Option<Self> {
        if (value as usize) < Self::ALL.len() {
            Some(Self::ALL[value as usize])
        } else {
            None
        }
    }

    /// Map a platform core debug level (0 = none .. 5 = verbose) onto a level.
    ///
    /// Values past the table clamp to `Always`.
    pub const fn from_core_debug_level(value: u8) -> Self {
        if (value as usize) < CORE_LEVEL_MAPPING.len() {
            CORE_LEVEL_MAPPING[value as usize]
        } else {
            Level::Always
        }
    }

    /// Raw numeric value.
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Index into the tag tables, `None` for the sentinel.
    #[inline]
    fn tag_index(self) -> Option<usize> {
        (self as usize).checked_sub(1)
    }

    /// Single letter tag (`I` for info). `None` for `Nothing`.
    pub fn letter(self) -> Option<char> {
        self.tag_index().map(|i| LETTERS[i] as char)
    }

    /// Three letter tag (`INF` for info). `None` for `Nothing`.
    pub fn short_name(self) -> Option<&'static str> {
        self.tag_index().map(|i| SHORT[i])
    }

    /// Full word tag (`INFO`). `None` for `Nothing`.
    pub fn full_name(self) -> Option<&'static str> {
        self.tag_index().map(|i| FULL[i])
    }

    /// Whether a device configured at `threshold` renders entries at this level.
    #[inline]
    pub fn passes(self, threshold: Level) -> bool {
        self == Level::Always || self <= threshold
    }
}

impl core::fmt::Display for Level {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.full_name().unwrap_or("NOTHING"))
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Level::Error,
            log::Level::Warn => Level::Warn,
            log::Level::Info => Level::Info,
            log::Level::Debug => Level::Debug,
            log::Level::Trace => Level::Trace,
        }
    }
}
