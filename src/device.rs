//! Logging devices: turn an [`Entry`] into a line of text on a byte sink.
//!
//! # Contract
//!
//! A device supplies setup ([`Device::initialize`]) and a minimal byte sink
//! ([`Device::put_byte`], [`Device::available_for_write`], [`Device::flush`]).
//! Everything else has a default built on top of those and can be replaced
//! per step.
//!
//! # Line layout
//!
//! ```text
//! [I] 12:34:56 [main.rs:7 setup] [task: main] - Hello World!\n
//! └┬┘ └──┬───┘ └──────┬───────┘ └─────┬────┘ └┬┘ └────┬─────┘
//! level timestamp   trace        task trace  sep   message
//! ```
//!
//! Every part is gated by its own bits of the device [`Format`]. The
//! separator appears whenever the format is non-zero.
//!
//! A device only borrows the entry for the duration of [`Device::write`].

use core::fmt;

use chrono::DateTime;

use crate::config::{DEFAULT_FORMAT, DEFAULT_LEVEL};
use crate::entry::Entry;
use crate::format::{Format, LevelStyle, TimestampStyle};
use crate::level::Level;
use crate::platform::NO_TASK_NAME;

/// Filtering and formatting state carried by every device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceSettings {
    pub level: Level,
    pub format: Format,
}

impl DeviceSettings {
    pub const fn new(level: Level, format: Format) -> Self {
        Self { level, format }
    }
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL, DEFAULT_FORMAT)
    }
}

/// A logging device.
///
/// Override `write_start` / `write_end` for prologue and epilogue behavior
/// (record separators, color codes), or any `write_*` step to change how
/// that part is rendered. `write` itself drives the steps and should be
/// left alone.
pub trait Device: Send {
    /// Prepare the sink. `false` means the device is unusable.
    fn initialize(&mut self) -> bool;

    /// Emit one byte. Returns the number of bytes written (0 or 1).
    fn put_byte(&mut self, byte: u8) -> usize;

    /// Free space in the sink's output buffer (0 when unknown).
    fn available_for_write(&mut self) -> usize;

    /// Push buffered output to the physical sink.
    fn flush(&mut self);

    fn settings(&self) -> &DeviceSettings;

    fn settings_mut(&mut self) -> &mut DeviceSettings;

    /// Emit a run of bytes. Sinks with a bulk write should override this.
    fn put_bytes(&mut self, bytes: &[u8]) -> usize {
        bytes.iter().map(|&byte| self.put_byte(byte)).sum()
    }

    #[inline]
    fn level(&self) -> Level {
        self.settings().level
    }

    #[inline]
    fn format(&self) -> Format {
        self.settings().format
    }

    fn set_level(&mut self, level: Level) {
        self.settings_mut().level = level;
    }

    fn set_format(&mut self, format: Format) {
        self.settings_mut().format = format;
    }

    /// Render formatted text through `put_bytes`.
    fn print(&mut self, args: fmt::Arguments<'_>) {
        let _ = fmt::Write::write_fmt(&mut Printer(self), args);
    }

    /// Render `entry` if it passes this device's level.
    fn write(&mut self, entry: &Entry) {
        if !entry.level().passes(self.level()) {
            return;
        }

        self.write_start(entry);

        self.write_level(entry);
        self.write_timestamp(entry);
        self.write_trace(entry);
        self.write_task_trace(entry);

        if !self.format().is_empty() {
            self.put_bytes(b"- ");
        }

        self.put_bytes(entry.message().as_bytes());
        self.put_bytes(b"\n");
        self.flush();

        self.write_end(entry);
    }

    /// Called before anything else is rendered.
    fn write_start(&mut self, _entry: &Entry) {}

    /// Called after the line was flushed.
    fn write_end(&mut self, _entry: &Entry) {}

    /// `[INFO] `, `[I] ` or `[INF] `.
    fn write_level(&mut self, entry: &Entry) {
        let level = entry.level();
        match self.format().level_style() {
            Some(LevelStyle::Full) => {
                if let Some(name) = level.full_name() {
                    self.print(format_args!("[{}] ", name));
                }
            }
            Some(LevelStyle::Letter) => {
                if let Some(letter) = level.letter() {
                    self.print(format_args!("[{}] ", letter));
                }
            }
            Some(LevelStyle::Short) => {
                if let Some(name) = level.short_name() {
                    self.print(format_args!("[{}] ", name));
                }
            }
            None => {}
        }
    }

    /// `YYYY-MM-DD HH:MM:SS.mmm `, `SSSSSSSSSS.mmm ` or `HH:MM:SS ` (UTC).
    fn write_timestamp(&mut self, entry: &Entry) {
        let timestamp = entry.timestamp();
        let pattern = match self.format().timestamp_style() {
            Some(TimestampStyle::Full) => "%Y-%m-%d %H:%M:%S%.3f ",
            Some(TimestampStyle::Short) => "%H:%M:%S ",
            Some(TimestampStyle::Simple) => {
                self.print(format_args!("{:010}.{:03} ", timestamp.secs, timestamp.millis()));
                return;
            }
            None => return,
        };

        match DateTime::from_timestamp(timestamp.secs, timestamp.micros * 1000) {
            Some(utc) => self.print(format_args!("{}", utc.format(pattern))),
            // Outside the calendar range: fall back to raw seconds
            None => self.print(format_args!("{:010}.{:03} ", timestamp.secs, timestamp.millis())),
        }
    }

    /// `[file:line function] `, either half omitted when absent or disabled.
    fn write_trace(&mut self, entry: &Entry) {
        let format = self.format();
        let file = entry.file().filter(|_| format.file_trace());
        let function = entry.function().filter(|_| format.function_trace());

        match (file, function) {
            (Some(file), Some(function)) => {
                self.print(format_args!("[{}:{} {}] ", file, entry.line(), function));
            }
            (Some(file), None) => self.print(format_args!("[{}:{}] ", file, entry.line())),
            (None, Some(function)) => self.print(format_args!("[{}] ", function)),
            (None, None) => {}
        }
    }

    /// `[task: name] `.
    fn write_task_trace(&mut self, entry: &Entry) {
        if !self.format().task_trace() {
            return;
        }
        match entry.task() {
            Some(task) => task.with_name(|name| {
                self.print(format_args!("[task: {}] ", name.unwrap_or(NO_TASK_NAME)));
            }),
            None => self.print(format_args!("[task: {}] ", NO_TASK_NAME)),
        }
    }
}

/// Construction of a device kind by the logger.
///
/// `Args` are whatever the sink needs besides level and format (a port, a
/// baud rate, ...).
pub trait DeviceKind: Device + Sized + 'static {
    type Args;

    fn create(settings: DeviceSettings, args: Self::Args) -> Self;
}

/// `fmt::Write` adapter over a device.
struct Printer<'a, D: Device + ?Sized>(&'a mut D);

impl<'a, D: Device + ?Sized> fmt::Write for Printer<'a, D> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.put_bytes(s.as_bytes());
        Ok(())
    }
}
