//! # ESP Async Logger
//!
//! Interrupt-safe asynchronous logging for ESP32 (ESP-IDF / FreeRTOS).
//!
//! ## Architecture
//!
//! Producers never render and never wait on a device:
//! - Tasks and interrupt handlers build an [`Entry`] and copy it into a
//!   bounded queue (dropped if full)
//! - One consumer task drains the queue and hands every entry to every
//!   registered [`Device`], in registration order
//! - Each device filters by its own [`Level`] and renders by its own [`Format`]
//!
//! Off-target (host builds) the same engine runs on std threads, which is
//! how the test suite exercises it.

pub mod config;
pub mod level;
pub mod format;
pub mod entry;
pub mod queue;
pub mod platform;
pub mod device;
pub mod devices;
pub mod logger;
pub mod bridge;
pub mod error;
pub mod macros;

pub use device::{Device, DeviceKind, DeviceSettings};
pub use entry::{Entry, TaskId, Timestamp};
pub use error::LoggerError;
pub use format::Format;
pub use level::Level;
pub use logger::{DeviceHandle, Logger};
pub use queue::{EntryQueue, RingQueue, SendError};
