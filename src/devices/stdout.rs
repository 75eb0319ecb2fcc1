//! Log device writing to the process stdout.
//!
//! On ESP-IDF stdout is the IDF console (UART0 or USB-Serial-JTAG).

use std::io::{self, Write};

use crate::device::{Device, DeviceKind, DeviceSettings};

/// Stdout log device.
pub struct StdoutLog {
    settings: DeviceSettings,
    out: io::Stdout,
}

impl StdoutLog {
    pub fn new(settings: DeviceSettings) -> Self {
        Self {
            settings,
            out: io::stdout(),
        }
    }
}

impl Device for StdoutLog {
    fn initialize(&mut self) -> bool {
        true
    }

    fn put_byte(&mut self, byte: u8) -> usize {
        self.put_bytes(&[byte])
    }

    fn put_bytes(&mut self, bytes: &[u8]) -> usize {
        match self.out.lock().write_all(bytes) {
            Ok(()) => bytes.len(),
            Err(_) => 0,
        }
    }

    /// Stdout has no visible buffer level.
    fn available_for_write(&mut self) -> usize {
        0
    }

    fn flush(&mut self) {
        let _ = self.out.lock().flush();
    }

    fn settings(&self) -> &DeviceSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut DeviceSettings {
        &mut self.settings
    }
}

impl DeviceKind for StdoutLog {
    type Args = ();

    fn create(settings: DeviceSettings, _args: ()) -> Self {
        Self::new(settings)
    }
}
