//! `log` facade bridge tests.
//!
//! The global logger can be installed once per process, so everything that
//! needs it lives in a single test.

mod common;

use common::{logger, Sink, Capture};
use esp_async_logger::{Format, Level, LoggerError};

#[test]
fn test_log_facade_routes_to_devices() {
    let logger = logger::<8>();
    let sink = Sink::new();
    logger.register_device::<Capture>(
        Level::Info,
        Format::LEVEL_FULL | Format::FUNCTION_TRACE,
        sink.clone(),
    );

    logger.install(log::LevelFilter::Trace).unwrap();
    assert_eq!(
        logger.install(log::LevelFilter::Trace),
        Err(LoggerError::InstallFailed)
    );

    log::info!("link up");
    log::warn!(target: "net", "rssi {}", -71);
    log::debug!("filtered by the device level");
    assert_eq!(logger.pending(), 3);

    logger.dispatch_pending();
    assert_eq!(
        sink.lines(),
        [
            "[INFO] [bridge_tests] - link up",
            "[WARN] [bridge_tests] - rssi -71",
        ]
    );
}
