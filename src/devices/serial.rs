//! UART log device.
//!
//! TX-only UART driver, created in `initialize()`.
//! Requires an external USB-UART adapter (CH340, CP2102, etc) on the TX pin.
//!
//! # Hardware Setup
//!
//! ```text
//! ESP32-S3 GPIO6 (TX) ──────▶ USB-UART RX
//!                              └─▶ PC Serial Monitor
//! ```
//!
//! **WARNING**: GPIO6 conflicts with Octal PSRAM. Only use on Quad flash boards!

use esp_idf_svc::hal::delay::BLOCK;
use esp_idf_svc::hal::gpio::{self, AnyOutputPin};
use esp_idf_svc::hal::uart::{self, UartTxDriver, UART1};
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::sys;

use crate::config::SERIAL_BAUD_RATE;
use crate::device::{Device, DeviceKind, DeviceSettings};

/// What `SerialLog` needs to open its UART.
pub struct SerialArgs {
    pub uart: UART1,
    pub tx_pin: AnyOutputPin,
    pub baud_rate: u32,
}

impl SerialArgs {
    /// UART1 on `tx_pin` at the configured default baud rate.
    pub fn new(uart: UART1, tx_pin: AnyOutputPin) -> Self {
        Self {
            uart,
            tx_pin,
            baud_rate: SERIAL_BAUD_RATE,
        }
    }

    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }
}

/// Serial (UART TX) log device.
pub struct SerialLog {
    settings: DeviceSettings,
    baud_rate: u32,
    pins: Option<(UART1, AnyOutputPin)>,
    driver: Option<UartTxDriver<'static>>,
}

impl SerialLog {
    /// Configured baud rate.
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }
}

impl DeviceKind for SerialLog {
    type Args = SerialArgs;

    fn create(settings: DeviceSettings, args: SerialArgs) -> Self {
        Self {
            settings,
            baud_rate: args.baud_rate,
            pins: Some((args.uart, args.tx_pin)),
            driver: None,
        }
    }
}

impl Device for SerialLog {
    /// Open UART1 TX-only on the configured pin.
    fn initialize(&mut self) -> bool {
        if self.driver.is_some() {
            return true;
        }
        let Some((uart, tx_pin)) = self.pins.take() else {
            return false;
        };

        let uart_config = uart::config::Config::default().baudrate(Hertz(self.baud_rate));
        match UartTxDriver::new(
            uart,
            tx_pin,
            Option::<gpio::AnyIOPin>::None, // CTS
            Option::<gpio::AnyIOPin>::None, // RTS
            &uart_config,
        ) {
            Ok(driver) => {
                self.driver = Some(driver);
                true
            }
            Err(e) => {
                log::error!("serial log device: UART init failed: {}", e);
                false
            }
        }
    }

    fn put_byte(&mut self, byte: u8) -> usize {
        self.put_bytes(&[byte])
    }

    fn put_bytes(&mut self, bytes: &[u8]) -> usize {
        let Some(driver) = self.driver.as_mut() else {
            return 0;
        };
        let mut written = 0;
        while written < bytes.len() {
            match driver.write(&bytes[written..]) {
                Ok(0) | Err(_) => break,
                Ok(n) => written += n,
            }
        }
        written
    }

    fn available_for_write(&mut self) -> usize {
        let Some(driver) = self.driver.as_ref() else {
            return 0;
        };
        let mut free: usize = 0;
        // SAFETY: the port is owned by our driver, `free` is a valid out pointer.
        let err = unsafe { sys::uart_get_tx_buffer_free_size(driver.port(), &mut free) };
        if err == sys::ESP_OK {
            free
        } else {
            0
        }
    }

    fn flush(&mut self) {
        if let Some(driver) = self.driver.as_ref() {
            let _ = driver.wait_done(BLOCK);
        }
    }

    fn settings(&self) -> &DeviceSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut DeviceSettings {
        &mut self.settings
    }
}
