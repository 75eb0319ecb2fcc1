//! Logger engine tests: registration, dispatch, overload and the consumer.

mod common;

use std::sync::atomic::Ordering;

use common::{logger, wait_for, Broken, Capture, Gated, Sink};
use esp_async_logger::{DeviceHandle, DeviceSettings, Entry, Format, Level, Timestamp};

/// 2024-02-29 12:34:56.789 UTC
const T: Timestamp = Timestamp::new(1_709_210_096, 789_000);

#[test]
fn test_golden_line() {
    let logger = logger::<8>();
    let sink = Sink::new();
    let format =
        Format::LEVEL_LETTER | Format::TIMESTAMP_SHORT | Format::FILE_TRACE | Format::FUNCTION_TRACE;
    logger.register_device::<Capture>(Level::Debug, format, sink.clone());

    let entry = Entry::new(
        Level::Info,
        Some("main.rs"),
        12,
        Some("setup"),
        Some(format_args!("Hello World!")),
    )
    .with_timestamp(T);
    logger.log(&entry);
    assert_eq!(logger.dispatch_pending(), 1);

    assert_eq!(sink.text(), "[I] 12:34:56 [main.rs:12 setup] - Hello World!\n");
}

#[test]
fn test_error_and_debug_devices() {
    let logger = logger::<8>();
    let errors = Sink::new();
    let debug = Sink::new();
    logger.register_device::<Capture>(Level::Error, Format::NONE, errors.clone());
    logger.register_device::<Capture>(Level::Debug, Format::NONE, debug.clone());

    logger.log_fmt(Level::Debug, format_args!("sensor ok"));
    logger.dispatch_pending();
    assert!(errors.is_empty());
    assert_eq!(debug.text(), "sensor ok\n");

    logger.log_fmt(Level::Error, format_args!("sensor lost"));
    logger.dispatch_pending();
    assert_eq!(errors.text(), "sensor lost\n");
    assert_eq!(debug.lines(), ["sensor ok", "sensor lost"]);
}

#[test]
fn test_fifo_across_devices() {
    let logger = logger::<16>();
    let a = Sink::new();
    let b = Sink::new();
    logger.register_device::<Capture>(Level::Verbose, Format::NONE, a.clone());
    logger.register_device::<Capture>(Level::Verbose, Format::NONE, b.clone());

    for n in 0..10 {
        logger.log_fmt(Level::Info, format_args!("{}", n));
    }
    assert_eq!(logger.dispatch_pending(), 10);

    let expected: Vec<String> = (0..10).map(|n| n.to_string()).collect();
    assert_eq!(a.lines(), expected);
    assert_eq!(b.lines(), expected);
}

#[test]
fn test_failed_device_gets_empty_handle() {
    let logger = logger::<4>();
    let handle = logger.register_device::<Broken>(Level::Debug, Format::NONE, ());
    assert!(handle.is_empty());
    assert_eq!(logger.device_count(), 0);

    // Nothing registered: dispatch is a no-op
    logger.log_fmt(Level::Error, format_args!("x"));
    assert_eq!(logger.dispatch_pending(), 1);
}

#[test]
fn test_unregister() {
    let logger = logger::<4>();
    let kept = Sink::new();
    let removed = Sink::new();
    logger.register_device::<Capture>(Level::Debug, Format::NONE, kept.clone());
    let handle = logger.register_device::<Capture>(Level::Debug, Format::NONE, removed.clone());

    logger.unregister_device(handle);
    logger.unregister_device(handle);
    logger.unregister_device(DeviceHandle::EMPTY);
    assert_eq!(logger.device_count(), 1);

    logger.log_fmt(Level::Info, format_args!("after"));
    logger.dispatch_pending();
    assert_eq!(kept.text(), "after\n");
    assert!(removed.is_empty());
}

#[test]
fn test_handles_not_reused() {
    let logger = logger::<4>();
    let first = logger.register_device::<Capture>(Level::Debug, Format::NONE, Sink::new());
    logger.unregister_device(first);
    let second = logger.register_device::<Capture>(Level::Debug, Format::NONE, Sink::new());
    assert_ne!(first, second);

    // The stale handle must not reach the new device
    logger.unregister_device(first);
    assert_eq!(logger.device_count(), 1);
}

#[test]
fn test_with_device_changes_level() {
    let logger = logger::<4>();
    let sink = Sink::new();
    let handle = logger.register_device::<Capture>(Level::Error, Format::NONE, sink.clone());

    let previous = logger.with_device(handle, |dev| {
        let level = dev.level();
        dev.set_level(Level::Info);
        level
    });
    assert_eq!(previous, Some(Level::Error));

    logger.log_fmt(Level::Info, format_args!("now visible"));
    logger.dispatch_pending();
    assert_eq!(sink.text(), "now visible\n");
}

#[test]
fn test_burst_over_capacity() {
    let logger = logger::<4>();
    let sink = Sink::new();
    logger.register_device::<Capture>(Level::Verbose, Format::NONE, sink.clone());

    for n in 0..3 {
        logger.log_fmt(Level::Info, format_args!("task {}", n));
    }
    for n in 0..3 {
        logger.log_isr(&Entry::plain(Level::Info, format_args!("isr {}", n)));
    }

    assert_eq!(logger.pending(), 4);
    assert_eq!(logger.dropped(), 2);
    assert_eq!(logger.dispatch_pending(), 4);
    assert_eq!(sink.lines(), ["task 0", "task 1", "task 2", "isr 0"]);
}

#[test]
fn test_long_message_truncated() {
    let logger = logger::<4>();
    let sink = Sink::new();
    logger.register_device::<Capture>(Level::Debug, Format::NONE, sink.clone());

    logger.log_fmt(Level::Info, format_args!("{}", "x".repeat(200)));
    logger.dispatch_pending();
    assert_eq!(sink.text(), format!("{}\n", "x".repeat(94)));
}

#[test]
fn test_consumer_delivers() {
    let logger = logger::<8>();
    let sink = Sink::new();
    logger.register_device::<Capture>(Level::Debug, Format::LEVEL_SHORT, sink.clone());

    logger.start().unwrap();
    logger.log_fmt(Level::Warn, format_args!("from task"));
    logger.log_isr(&Entry::plain(Level::Error, format_args!("from isr")));

    assert!(wait_for(|| sink.lines().len() == 2));
    assert_eq!(sink.lines(), ["[WAR] - from task", "[ERR] - from isr"]);

    logger.shutdown();
    assert_eq!(logger.pending(), 0);
}

#[test]
fn test_entries_before_start_are_kept() {
    let logger = logger::<8>();
    let sink = Sink::new();
    logger.register_device::<Capture>(Level::Debug, Format::NONE, sink.clone());

    logger.log_fmt(Level::Info, format_args!("early boot"));
    assert!(!logger.is_started());
    assert_eq!(logger.pending(), 1);
    assert_eq!(logger.dropped(), 0);

    logger.start().unwrap();
    assert!(wait_for(|| sink.lines().len() == 1));
    assert_eq!(sink.text(), "early boot\n");
    logger.shutdown();
}

#[test]
fn test_consumer_reports_drops() {
    let logger = logger::<2>();
    let sink = Sink::new();
    let gated = Gated::new(DeviceSettings::new(Level::Debug, Format::NONE), sink.clone());
    let entered = gated.entered.clone();
    let open = gated.open.clone();
    logger.add_device(gated);

    logger.start().unwrap();
    logger.log_fmt(Level::Info, format_args!("a"));
    assert!(wait_for(|| entered.load(Ordering::SeqCst)));

    // Consumer is parked inside the first write: fill, then overflow
    for text in ["b", "c", "d", "e"] {
        logger.log_fmt(Level::Info, format_args!("{}", text));
    }
    assert_eq!(logger.dropped(), 2);

    open.store(true, Ordering::SeqCst);
    assert!(wait_for(|| sink.lines().len() == 4));
    assert_eq!(sink.lines(), ["a", "b", "c", "async logger dropped 2 entries"]);

    logger.shutdown();
}

#[test]
fn test_shutdown_keeps_pending_for_drain() {
    let logger = logger::<8>();
    let sink = Sink::new();
    logger.start().unwrap();
    logger.shutdown();

    // Closed: further entries are counted as dropped
    logger.log_fmt(Level::Info, format_args!("late"));
    assert_eq!(logger.dropped(), 1);

    logger.register_device::<Capture>(Level::Debug, Format::NONE, sink.clone());
    assert_eq!(logger.dispatch_pending(), 0);
    assert!(sink.is_empty());
}
