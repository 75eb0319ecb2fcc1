//! Concrete logging devices.
//!
//! - [`SerialLog`]: UART TX (ESP-IDF only)
//! - [`StdoutLog`]: process stdout
//! - [`MemoryLog`]: fixed-size in-memory capture

pub mod memory;
#[cfg(target_os = "espidf")]
pub mod serial;
pub mod stdout;

pub use memory::MemoryLog;
#[cfg(target_os = "espidf")]
pub use serial::{SerialArgs, SerialLog};
pub use stdout::StdoutLog;
