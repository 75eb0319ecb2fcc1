//! Fixed-capacity in-memory log device.
//!
//! Keeps the first `N` bytes written; everything past that is counted and
//! discarded. Useful for post-mortem dumps and for tests.

use crate::device::{Device, DeviceKind, DeviceSettings};

/// In-memory log device.
pub struct MemoryLog<const N: usize> {
    settings: DeviceSettings,
    buf: [u8; N],
    len: usize,
    overflow: usize,
}

impl<const N: usize> MemoryLog<N> {
    pub const fn new(settings: DeviceSettings) -> Self {
        Self {
            settings,
            buf: [0; N],
            len: 0,
            overflow: 0,
        }
    }

    /// Captured bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Captured text (up to the last complete character).
    pub fn as_str(&self) -> &str {
        match core::str::from_utf8(self.as_bytes()) {
            Ok(text) => text,
            Err(e) => core::str::from_utf8(&self.buf[..e.valid_up_to()]).unwrap_or(""),
        }
    }

    /// Bytes discarded because the buffer was full.
    pub fn overflow(&self) -> usize {
        self.overflow
    }

    /// Drop everything captured so far.
    pub fn clear(&mut self) {
        self.len = 0;
        self.overflow = 0;
    }
}

impl<const N: usize> Device for MemoryLog<N> {
    fn initialize(&mut self) -> bool {
        N > 0
    }

    fn put_byte(&mut self, byte: u8) -> usize {
        if self.len < N {
            self.buf[self.len] = byte;
            self.len += 1;
            1
        } else {
            self.overflow += 1;
            0
        }
    }

    fn put_bytes(&mut self, bytes: &[u8]) -> usize {
        let to_write = bytes.len().min(N - self.len);
        self.buf[self.len..self.len + to_write].copy_from_slice(&bytes[..to_write]);
        self.len += to_write;
        self.overflow += bytes.len() - to_write;
        to_write
    }

    fn available_for_write(&mut self) -> usize {
        N - self.len
    }

    fn flush(&mut self) {}

    fn settings(&self) -> &DeviceSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut DeviceSettings {
        &mut self.settings
    }
}

impl<const N: usize> DeviceKind for MemoryLog<N> {
    type Args = ();

    fn create(settings: DeviceSettings, _args: ()) -> Self {
        Self::new(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Entry;
    use crate::format::Format;
    use crate::level::Level;

    #[test]
    fn test_memory_capture() {
        let mut dev = MemoryLog::<64>::new(DeviceSettings::new(Level::Info, Format::LEVEL_LETTER));
        assert!(dev.initialize());
        dev.write(&Entry::plain(Level::Warn, format_args!("low battery")));
        assert_eq!(dev.as_str(), "[W] - low battery\n");
        assert_eq!(dev.available_for_write(), 64 - 18);
    }

    #[test]
    fn test_memory_overflow() {
        let mut dev = MemoryLog::<8>::new(DeviceSettings::new(Level::Info, Format::NONE));
        dev.write(&Entry::plain(Level::Info, format_args!("0123456789")));
        assert_eq!(dev.as_str(), "01234567");
        assert_eq!(dev.overflow(), 3);
        assert_eq!(dev.available_for_write(), 0);
        assert_eq!(dev.put_byte(b'x'), 0);

        dev.clear();
        assert_eq!(dev.as_str(), "");
        assert_eq!(dev.overflow(), 0);
    }

    #[test]
    fn test_zero_capacity_fails_initialize() {
        let mut dev = MemoryLog::<0>::new(DeviceSettings::default());
        assert!(!dev.initialize());
    }
}
