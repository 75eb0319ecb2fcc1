//! Shared test devices.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use esp_async_logger::{Device, DeviceKind, DeviceSettings, Entry, Logger, RingQueue};

/// Bytes written by a [`Capture`] device, readable from the test.
#[derive(Clone, Default)]
pub struct Sink(Arc<Mutex<Vec<u8>>>);

impl Sink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn lines(&self) -> Vec<String> {
        self.text().lines().map(str::to_owned).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().unwrap().is_empty()
    }
}

/// Device appending everything to a [`Sink`].
pub struct Capture {
    settings: DeviceSettings,
    sink: Sink,
}

impl Device for Capture {
    fn initialize(&mut self) -> bool {
        true
    }

    fn put_byte(&mut self, byte: u8) -> usize {
        self.sink.0.lock().unwrap().push(byte);
        1
    }

    fn put_bytes(&mut self, bytes: &[u8]) -> usize {
        self.sink.0.lock().unwrap().extend_from_slice(bytes);
        bytes.len()
    }

    fn available_for_write(&mut self) -> usize {
        usize::MAX
    }

    fn flush(&mut self) {}

    fn settings(&self) -> &DeviceSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut DeviceSettings {
        &mut self.settings
    }
}

impl DeviceKind for Capture {
    type Args = Sink;

    fn create(settings: DeviceSettings, sink: Sink) -> Self {
        Self { settings, sink }
    }
}

/// Device whose `initialize` always fails.
pub struct Broken(DeviceSettings);

impl Device for Broken {
    fn initialize(&mut self) -> bool {
        false
    }

    fn put_byte(&mut self, _byte: u8) -> usize {
        panic!("broken device must never be written");
    }

    fn available_for_write(&mut self) -> usize {
        0
    }

    fn flush(&mut self) {}

    fn settings(&self) -> &DeviceSettings {
        &self.0
    }

    fn settings_mut(&mut self) -> &mut DeviceSettings {
        &mut self.0
    }
}

impl DeviceKind for Broken {
    type Args = ();

    fn create(settings: DeviceSettings, _args: ()) -> Self {
        Self(settings)
    }
}

/// Capture device that parks in `write_start` until the gate opens.
pub struct Gated {
    inner: Capture,
    pub entered: Arc<AtomicBool>,
    pub open: Arc<AtomicBool>,
}

impl Gated {
    pub fn new(settings: DeviceSettings, sink: Sink) -> Self {
        Self {
            inner: Capture::create(settings, sink),
            entered: Arc::new(AtomicBool::new(false)),
            open: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Device for Gated {
    fn initialize(&mut self) -> bool {
        true
    }

    fn put_byte(&mut self, byte: u8) -> usize {
        self.inner.put_byte(byte)
    }

    fn available_for_write(&mut self) -> usize {
        usize::MAX
    }

    fn flush(&mut self) {}

    fn settings(&self) -> &DeviceSettings {
        self.inner.settings()
    }

    fn settings_mut(&mut self) -> &mut DeviceSettings {
        self.inner.settings_mut()
    }

    fn write_start(&mut self, _entry: &Entry) {
        self.entered.store(true, Ordering::SeqCst);
        while !self.open.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(1));
        }
    }
}

/// Fresh `'static` logger over a small host queue.
pub fn logger<const N: usize>() -> &'static Logger<RingQueue<N>> {
    Box::leak(Box::new(Logger::with_queue(RingQueue::new())))
}

/// Poll `cond` for up to two seconds.
pub fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    cond()
}
