//! The logging engine.
//!
//! # Architecture
//!
//! ```text
//! Task ──log()──────┐                      ┌──▶ device 0 .write()
//!                   ├──▶ EntryQueue ──▶ consumer ──▶ device 1 .write()
//! ISR  ──log_isr()──┘   (bounded)      (one task)  └──▶ device N .write()
//! ~non-blocking          drop if full    blocks on     registration order
//!                                        receive only
//! ```
//!
//! # Rules
//!
//! - Producers never block and never see an error: a full queue drops the entry
//! - The ISR path touches nothing but the queue's ISR send and the ISR yield
//! - One consumer per logger; it dispatches one entry at a time, to every
//!   device in registration order
//! - The device list is locked for a whole dispatch, so (un)registration is
//!   safe at any time and never observed mid-entry

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::device::{Device, DeviceKind, DeviceSettings};
use crate::entry::Entry;
use crate::error::LoggerError;
use crate::format::Format;
use crate::level::Level;
use crate::platform::{self, Consume, ConsumerSlot, DefaultQueue};
use crate::queue::EntryQueue;

/// Reference to a registered device.
///
/// Only good for [`Logger::unregister_device`] and [`Logger::with_device`];
/// the logger keeps ownership of the device. The empty handle refers to
/// nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DeviceHandle(Option<NonZeroU32>);

impl DeviceHandle {
    /// Handle returned when registration fails.
    pub const EMPTY: DeviceHandle = DeviceHandle(None);

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

struct Registered {
    id: NonZeroU32,
    device: Box<dyn Device>,
}

/// Asynchronous logger.
///
/// # Example
///
/// ```ignore
/// static LOGGER: Logger = Logger::new();
///
/// LOGGER.start()?;
/// LOGGER.register_device::<SerialLog>(
///     Level::Debug,
///     Format::LEVEL_LETTER | Format::TIMESTAMP_SHORT | Format::FILE_TRACE,
///     SerialArgs::new(peripherals.uart1, peripherals.pins.gpio6.into()),
/// );
/// LOGGER.log_fmt(Level::Info, format_args!("Hello World!"));
/// ```
pub struct Logger<Q: EntryQueue = DefaultQueue> {
    queue: Q,
    devices: Mutex<Vec<Registered>>,
    next_id: AtomicU32,
    dropped: AtomicU32,
    started: AtomicBool,
    consumer: ConsumerSlot,
}

impl Logger<DefaultQueue> {
    /// Logger over the platform's default queue (`QUEUE_LENGTH` entries).
    pub const fn new() -> Self {
        Self::with_queue(DefaultQueue::new())
    }
}

impl Default for Logger<DefaultQueue> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q: EntryQueue> Logger<Q> {
    /// Logger over a caller-supplied queue.
    pub const fn with_queue(queue: Q) -> Self {
        Self {
            queue,
            devices: Mutex::new(Vec::new()),
            next_id: AtomicU32::new(1),
            dropped: AtomicU32::new(0),
            started: AtomicBool::new(false),
            consumer: ConsumerSlot::new(),
        }
    }

    fn devices(&self) -> MutexGuard<'_, Vec<Registered>> {
        self.devices.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Construct, initialize and append a device of kind `D`.
    ///
    /// Returns [`DeviceHandle::EMPTY`] if `initialize()` fails; the device is
    /// dropped and never sees an entry.
    pub fn register_device<D: DeviceKind>(
        &self,
        level: Level,
        format: Format,
        args: D::Args,
    ) -> DeviceHandle {
        self.add_device(D::create(DeviceSettings::new(level, format), args))
    }

    /// Register a device with the configured default level and format.
    pub fn register_default<D: DeviceKind>(&self, args: D::Args) -> DeviceHandle {
        self.add_device(D::create(DeviceSettings::default(), args))
    }

    /// Initialize and append an already constructed device.
    ///
    /// Handle ids are never reused; once they run out, registration fails
    /// before the device is initialized.
    pub fn add_device<D: Device + 'static>(&self, mut device: D) -> DeviceHandle {
        let id = self
            .next_id
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |id| id.checked_add(1))
            .ok()
            .and_then(NonZeroU32::new);
        let Some(id) = id else {
            log::warn!("log device rejected: device ids exhausted");
            return DeviceHandle::EMPTY;
        };

        if !device.initialize() {
            log::warn!("log device rejected: initialize() failed");
            return DeviceHandle::EMPTY;
        }
        self.devices().push(Registered {
            id,
            device: Box::new(device),
        });
        DeviceHandle(Some(id))
    }

    /// Remove and drop a device. No-op for empty or stale handles.
    pub fn unregister_device(&self, handle: DeviceHandle) {
        let Some(id) = handle.0 else {
            return;
        };
        self.devices().retain(|registered| registered.id != id);
    }

    /// Run `f` on a registered device, between dispatches.
    ///
    /// Returns `None` for empty or stale handles.
    pub fn with_device<R>(
        &self,
        handle: DeviceHandle,
        f: impl FnOnce(&mut dyn Device) -> R,
    ) -> Option<R> {
        let id = handle.0?;
        let mut devices = self.devices();
        let registered = devices.iter_mut().find(|registered| registered.id == id)?;
        Some(f(registered.device.as_mut()))
    }

    /// Number of active devices.
    pub fn device_count(&self) -> usize {
        self.devices().len()
    }

    /// Queue an entry from task context. Dropped silently if the queue is full.
    #[inline]
    pub fn log(&self, entry: &Entry) {
        if self.queue.send(entry).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Build an entry without source location and queue it.
    #[inline]
    pub fn log_fmt(&self, level: Level, args: core::fmt::Arguments<'_>) {
        self.log(&Entry::plain(level, args));
    }

    /// Queue an entry from an interrupt handler.
    ///
    /// Never blocks, never allocates. Yields on interrupt exit when the
    /// consumer was woken by this entry.
    #[inline]
    pub fn log_isr(&self, entry: &Entry) {
        match self.queue.send_from_isr(entry) {
            Ok(true) => platform::yield_from_isr(),
            Ok(false) => {}
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Hand `entry` to every device, in registration order.
    pub fn dispatch(&self, entry: &Entry) {
        for registered in self.devices().iter_mut() {
            registered.device.write(entry);
        }
    }

    /// Dispatch everything currently queued without waiting.
    ///
    /// Returns the number of entries dispatched.
    pub fn dispatch_pending(&self) -> usize {
        let mut count = 0;
        while let Some(entry) = self.queue.try_receive() {
            self.dispatch(&entry);
            count += 1;
        }
        count
    }

    /// Entries dropped since boot (queue full or closed).
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Entries waiting for the consumer.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Queue capacity.
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Stop the consumer. Entries still queued stay there until
    /// [`dispatch_pending`](Self::dispatch_pending) drains them.
    pub fn shutdown(&self) {
        log::debug!("async logger stopping, {} entries pending", self.queue.len());
        self.queue.close();
        self.consumer.join();
    }

    /// Report drops since the last report, straight to the devices.
    fn report_drops(&self, reported: &mut u32) {
        let dropped = self.dropped();
        if dropped != *reported && self.queue.is_empty() {
            let missed = dropped.wrapping_sub(*reported);
            *reported = dropped;
            self.dispatch(&Entry::plain(
                Level::Warn,
                format_args!("async logger dropped {} entries", missed),
            ));
        }
    }
}

impl<Q: EntryQueue + 'static> Logger<Q> {
    /// Open the queue and start the consumer task.
    pub fn start(&'static self) -> Result<(), LoggerError> {
        if self.started.swap(true, Ordering::AcqRel) {
            return Err(LoggerError::AlreadyStarted);
        }
        if !self.queue.open() {
            self.started.store(false, Ordering::Release);
            return Err(LoggerError::QueueUnavailable);
        }
        if let Err(e) = self.consumer.spawn(self) {
            self.started.store(false, Ordering::Release);
            return Err(e);
        }
        log::debug!("async logger started, queue length {}", self.queue.capacity());
        Ok(())
    }
}

impl<Q: EntryQueue + 'static> Consume for Logger<Q> {
    fn consume(&'static self) {
        let mut reported = self.dropped();
        while let Some(entry) = self.queue.receive() {
            self.dispatch(&entry);
            self.report_drops(&mut reported);
        }
    }
}
