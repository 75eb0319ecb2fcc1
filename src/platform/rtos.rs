//! FreeRTOS / ESP-IDF platform.
//!
//! Queue storage, queue control block, consumer stack and consumer TCB are
//! all static: nothing here touches the heap.
//!
//! # Rules
//!
//! - `send_from_isr` only calls `xQueueGenericSendFromISR`
//! - The yield after an ISR send goes through `portYIELD_FROM_ISR`
//!   (`esp_idf_hal::task::do_yield` inside an interrupt)
//! - The consumer blocks on the queue without timeout; `close` wakes it with
//!   a marker entry sent to the front of the queue
//! - Task names are resolved at render time with `pcTaskGetName`; a task
//!   deleted before its entries are rendered yields a dangling name, as in C

use core::cell::UnsafeCell;
use core::ffi::{c_char, c_void, CStr};
use core::mem::{size_of, MaybeUninit};
use core::num::NonZeroUsize;
use core::ptr;
use core::sync::atomic::{AtomicBool, AtomicPtr, AtomicU8, Ordering};

use esp_idf_svc::hal::delay::{FreeRtos, BLOCK};
use esp_idf_svc::hal::{interrupt, task};
use esp_idf_svc::sys;

use super::Consume;
use crate::config::{QUEUE_LENGTH, TASK_CORE_ID, TASK_PRIORITY, TASK_STACK_SIZE};
use crate::entry::{Entry, TaskId, Timestamp};
use crate::error::LoggerError;
use crate::queue::{EntryQueue, SendError};

/// Queue used by `Logger::new()`.
pub type DefaultQueue = RtosQueue<QUEUE_LENGTH>;

const PD_TRUE: sys::BaseType_t = 1;

/// Current wall-clock time (`gettimeofday`).
pub fn now() -> Timestamp {
    let mut tv = sys::timeval { tv_sec: 0, tv_usec: 0 };
    // SAFETY: valid out pointer, no timezone requested.
    unsafe { sys::gettimeofday(&mut tv, ptr::null_mut()) };
    Timestamp::new(tv.tv_sec as i64, tv.tv_usec as u32)
}

/// Handle of the running task.
pub fn current_task() -> Option<TaskId> {
    // SAFETY: always safe to call once the scheduler runs.
    let handle = unsafe { sys::xTaskGetCurrentTaskHandle() };
    NonZeroUsize::new(handle as usize).map(TaskId::new)
}

/// Resolve the FreeRTOS task name of `task`.
pub fn with_task_name<R>(task: TaskId, f: impl FnOnce(Option<&str>) -> R) -> R {
    // SAFETY: the handle was captured from a live task.
    let name = unsafe { sys::pcTaskGetName(task.raw() as sys::TaskHandle_t) };
    if name.is_null() {
        return f(None);
    }
    // SAFETY: FreeRTOS task names are zero terminated.
    let name = unsafe { CStr::from_ptr(name as *const c_char) };
    f(name.to_str().ok())
}

/// True inside an interrupt handler.
#[inline]
pub fn in_isr() -> bool {
    interrupt::active()
}

/// `portYIELD_FROM_ISR`.
#[inline]
pub fn yield_from_isr() {
    task::do_yield();
}

/// Queue states.
const UNOPENED: u8 = 0;
const OPENING: u8 = 1;
const OPEN: u8 = 2;

/// FreeRTOS queue over static storage.
///
/// The FreeRTOS queue is created on the first task-context send, or by
/// `open()`, whichever comes first. An ISR send before that is dropped:
/// queue creation is not interrupt safe.
pub struct RtosQueue<const N: usize> {
    storage: UnsafeCell<MaybeUninit<[Entry; N]>>,
    control: UnsafeCell<MaybeUninit<sys::StaticQueue_t>>,
    handle: AtomicPtr<sys::QueueDefinition>,
    state: AtomicU8,
    closed: AtomicBool,
}

// SAFETY: storage and control block are handed to FreeRTOS exactly once
// (guarded by `state`), which serialises access from then on.
unsafe impl<const N: usize> Sync for RtosQueue<N> {}
unsafe impl<const N: usize> Send for RtosQueue<N> {}

impl<const N: usize> RtosQueue<N> {
    pub const fn new() -> Self {
        Self {
            storage: UnsafeCell::new(MaybeUninit::uninit()),
            control: UnsafeCell::new(MaybeUninit::uninit()),
            handle: AtomicPtr::new(ptr::null_mut()),
            state: AtomicU8::new(UNOPENED),
            closed: AtomicBool::new(false),
        }
    }

    /// Create the FreeRTOS queue unless it exists or is being created.
    ///
    /// Returns `true` once the queue exists. Task context only.
    fn create(&self) -> bool {
        match self
            .state
            .compare_exchange(UNOPENED, OPENING, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {}
            Err(state) => return state == OPEN,
        }

        // SAFETY: storage holds N entries and lives as long as the queue;
        // the state guard makes this the only creation.
        let handle = unsafe {
            sys::xQueueGenericCreateStatic(
                N as _,
                size_of::<Entry>() as _,
                self.storage.get() as *mut u8,
                self.control.get() as *mut sys::StaticQueue_t,
                sys::queueQUEUE_TYPE_BASE as _,
            )
        };
        if handle.is_null() {
            self.state.store(UNOPENED, Ordering::Release);
            return false;
        }
        self.handle.store(handle, Ordering::Release);
        self.state.store(OPEN, Ordering::Release);
        true
    }

    /// Queue handle, if the queue was created.
    #[inline]
    fn opened(&self) -> Option<sys::QueueHandle_t> {
        if self.state.load(Ordering::Acquire) == OPEN {
            Some(self.handle.load(Ordering::Acquire))
        } else {
            None
        }
    }

    /// Handle for a send, creating the queue from task context.
    #[inline]
    fn send_handle(&self, from_isr: bool) -> Result<sys::QueueHandle_t, SendError> {
        if self.closed.load(Ordering::Relaxed) {
            return Err(SendError::Closed);
        }
        if let Some(handle) = self.opened() {
            return Ok(handle);
        }
        if !from_isr && self.create() {
            return self.opened().ok_or(SendError::Closed);
        }
        Err(SendError::Closed)
    }

    fn receive_within(&self, ticks: sys::TickType_t) -> Option<Entry> {
        let handle = self.opened()?;
        let mut slot = MaybeUninit::<Entry>::uninit();
        // SAFETY: slot is large enough for one item of the queue.
        let received =
            unsafe { sys::xQueueReceive(handle, slot.as_mut_ptr() as *mut c_void, ticks) };
        if received == PD_TRUE {
            // SAFETY: FreeRTOS copied a whole Entry into the slot.
            Some(unsafe { slot.assume_init() })
        } else {
            None
        }
    }
}

impl<const N: usize> Default for RtosQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> EntryQueue for RtosQueue<N> {
    fn open(&self) -> bool {
        loop {
            if self.create() {
                return true;
            }
            if self.state.load(Ordering::Acquire) == UNOPENED {
                return false;
            }
            // Another task is creating it: let it finish
            FreeRtos::delay_ms(1);
        }
    }

    fn send(&self, entry: &Entry) -> Result<(), SendError> {
        let handle = self.send_handle(false)?;
        // SAFETY: FreeRTOS copies size_of::<Entry>() bytes out of `entry`.
        let sent = unsafe {
            sys::xQueueGenericSend(
                handle,
                entry as *const Entry as *const c_void,
                0,
                sys::queueSEND_TO_BACK as _,
            )
        };
        if sent == PD_TRUE {
            Ok(())
        } else {
            Err(SendError::Full)
        }
    }

    fn send_from_isr(&self, entry: &Entry) -> Result<bool, SendError> {
        let handle = self.send_handle(true)?;
        let mut woken: sys::BaseType_t = 0;
        // SAFETY: ISR-safe send, copies the entry.
        let sent = unsafe {
            sys::xQueueGenericSendFromISR(
                handle,
                entry as *const Entry as *const c_void,
                &mut woken,
                sys::queueSEND_TO_BACK as _,
            )
        };
        if sent == PD_TRUE {
            Ok(woken != 0)
        } else {
            Err(SendError::Full)
        }
    }

    fn receive(&self) -> Option<Entry> {
        if self.opened().is_none() && !self.open() {
            return None;
        }
        loop {
            if self.closed.load(Ordering::Acquire) {
                return None;
            }
            match self.receive_within(BLOCK) {
                Some(entry) if !entry.is_wake() => return Some(entry),
                Some(_) | None => {}
            }
        }
    }

    fn try_receive(&self) -> Option<Entry> {
        loop {
            let entry = self.receive_within(0)?;
            if !entry.is_wake() {
                return Some(entry);
            }
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
        let Some(handle) = self.opened() else {
            return;
        };
        // A full queue means the consumer is not parked; it sees `closed`
        // on its next receive.
        // SAFETY: FreeRTOS copies the marker entry.
        unsafe {
            sys::xQueueGenericSend(
                handle,
                &Entry::WAKE as *const Entry as *const c_void,
                0,
                sys::queueSEND_TO_FRONT as _,
            )
        };
    }

    fn len(&self) -> usize {
        let Some(handle) = self.opened() else {
            return 0;
        };
        // SAFETY: valid queue handle.
        unsafe {
            if in_isr() {
                sys::uxQueueMessagesWaitingFromISR(handle) as usize
            } else {
                sys::uxQueueMessagesWaiting(handle) as usize
            }
        }
    }

    fn capacity(&self) -> usize {
        N
    }
}

/// Static stack and TCB for the single consumer task.
pub struct ConsumerSlot {
    stack: UnsafeCell<[sys::StackType_t; TASK_STACK_SIZE as usize]>,
    tcb: UnsafeCell<MaybeUninit<sys::StaticTask_t>>,
    handle: AtomicPtr<sys::tskTaskControlBlock>,
}

// SAFETY: the stack and TCB are handed to FreeRTOS once, in `spawn`.
unsafe impl Sync for ConsumerSlot {}
unsafe impl Send for ConsumerSlot {}

impl ConsumerSlot {
    pub const fn new() -> Self {
        Self {
            stack: UnsafeCell::new([0; TASK_STACK_SIZE as usize]),
            tcb: UnsafeCell::new(MaybeUninit::uninit()),
            handle: AtomicPtr::new(ptr::null_mut()),
        }
    }

    /// Create the pinned consumer task running `ctx.consume()`.
    pub fn spawn<T: Consume>(&'static self, ctx: &'static T) -> Result<(), LoggerError> {
        if !self.handle.load(Ordering::Acquire).is_null() {
            return Err(LoggerError::AlreadyStarted);
        }
        let core = if TASK_CORE_ID < 0 {
            sys::tskNO_AFFINITY as sys::BaseType_t
        } else {
            TASK_CORE_ID as sys::BaseType_t
        };
        let task_fn = consumer_task::<T> as unsafe extern "C" fn(*mut c_void);

        // SAFETY: stack and TCB are 'static and used by this task only.
        let handle = unsafe {
            sys::xTaskCreateStaticPinnedToCore(
                Some(task_fn),
                c"asyncLoggingTask".as_ptr(),
                TASK_STACK_SIZE as _,
                ctx as *const T as *mut c_void,
                TASK_PRIORITY as _,
                self.stack.get() as *mut sys::StackType_t,
                self.tcb.get() as *mut sys::StaticTask_t,
                core,
            )
        };
        if handle.is_null() {
            return Err(LoggerError::TaskSpawnFailed);
        }
        self.handle.store(handle, Ordering::Release);
        Ok(())
    }

    /// The consumer task deletes itself once the queue closes.
    pub fn join(&self) {
        self.handle.store(ptr::null_mut(), Ordering::Release);
    }
}

impl Default for ConsumerSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// FreeRTOS entry point of the consumer task.
unsafe extern "C" fn consumer_task<T: Consume>(arg: *mut c_void) {
    // SAFETY: `arg` is the &'static T given to `spawn`.
    let ctx = unsafe { &*(arg as *const T) };
    ctx.consume();
    // SAFETY: deleting the calling task.
    unsafe { sys::vTaskDelete(ptr::null_mut()) };
}
