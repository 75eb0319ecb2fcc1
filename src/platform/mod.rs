//! Platform primitives behind the engine.
//!
//! - **rtos** (`target_os = "espidf"`): FreeRTOS static queue, static consumer
//!   task, `gettimeofday`, task handles and names, yield from ISR
//! - **host**: std threads and [`RingQueue`](crate::queue::RingQueue), so the
//!   engine runs and is tested off-target
//!
//! Both expose the same free functions plus [`ConsumerSlot`] and
//! [`DefaultQueue`].

#[cfg(target_os = "espidf")]
mod rtos;
#[cfg(target_os = "espidf")]
pub use rtos::*;

#[cfg(not(target_os = "espidf"))]
mod host;
#[cfg(not(target_os = "espidf"))]
pub use host::*;

/// Body of the consumer execution context.
///
/// Implemented by the logger; the platform only knows how to start it.
pub trait Consume: Sync + 'static {
    /// Runs until the queue is closed.
    fn consume(&'static self);
}

/// Placeholder rendered when a task has no resolvable name.
pub const NO_TASK_NAME: &str = "<null>";
