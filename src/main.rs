//! logger-demo: one line at startup, then a debug line every two seconds.
//!
//! On ESP-IDF the lines go to UART1 (GPIO6 TX) and to the IDF console;
//! on a host they go to stdout.

use std::error::Error;
use std::thread;
use std::time::{Duration, Instant};

use esp_async_logger::devices::StdoutLog;
use esp_async_logger::{alog_d, alog_i, Format, Level, Logger};

static LOGGER: Logger = Logger::new();

fn main() -> Result<(), Box<dyn Error>> {
    #[cfg(target_os = "espidf")]
    esp_idf_svc::sys::link_patches();

    LOGGER.start()?;
    LOGGER.install(log::LevelFilter::Info)?;

    let format = Format::LEVEL_LETTER
        | Format::TIMESTAMP_SHORT
        | Format::FILE_TRACE
        | Format::FUNCTION_TRACE;

    #[cfg(target_os = "espidf")]
    register_serial(format)?;

    let console = LOGGER.register_device::<StdoutLog>(Level::Debug, format, ());
    if console.is_empty() {
        return Err("stdout log device unavailable".into());
    }

    alog_i!(LOGGER, "Hello World!");
    log::info!("log facade routed through the async logger");

    let boot = Instant::now();
    loop {
        alog_d!(LOGGER, "Millis {}", boot.elapsed().as_millis());
        thread::sleep(Duration::from_millis(2000));
    }
}

#[cfg(target_os = "espidf")]
fn register_serial(format: Format) -> Result<(), Box<dyn Error>> {
    use esp_async_logger::devices::{SerialArgs, SerialLog};
    use esp_idf_svc::hal::peripherals::Peripherals;

    let peripherals = Peripherals::take()?;
    let args = SerialArgs::new(peripherals.uart1, peripherals.pins.gpio6.into());
    let serial = LOGGER.register_device::<SerialLog>(Level::Debug, format, args);
    if serial.is_empty() {
        log::warn!("serial log device unavailable, console only");
    }
    Ok(())
}
