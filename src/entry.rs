//! Log entry: the fixed-size record copied through the queue.
//!
//! An entry is fully built at the call site: the timestamp and the producing
//! task are captured when the entry is constructed, not when it is queued or
//! rendered.
//!
//! The message lives in a `[u8; MAX_MSG_LEN]` buffer. At most
//! `MAX_MSG_LEN - 1` bytes are kept and a terminating zero always follows
//! them. Longer messages are silently cut on a character boundary.

use core::fmt;
use core::num::NonZeroUsize;

use crate::config::MAX_MSG_LEN;
use crate::level::Level;
use crate::platform;

/// Wall-clock capture time (seconds + microseconds since the Unix epoch).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp {
    pub secs: i64,
    pub micros: u32,
}

impl Timestamp {
    pub const fn new(secs: i64, micros: u32) -> Self {
        Self { secs, micros }
    }

    /// Current wall-clock time.
    #[inline]
    pub fn now() -> Self {
        platform::now()
    }

    /// Millisecond part (0..=999).
    #[inline]
    pub const fn millis(&self) -> u32 {
        self.micros / 1000
    }
}

/// Opaque identity of the task that produced an entry.
///
/// On ESP-IDF this is the FreeRTOS task handle, elsewhere a per-thread id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(NonZeroUsize);

impl TaskId {
    pub const fn new(raw: NonZeroUsize) -> Self {
        Self(raw)
    }

    /// Identity of the calling task, if it has one.
    #[inline]
    pub fn current() -> Option<Self> {
        platform::current_task()
    }

    #[inline]
    pub const fn raw(self) -> usize {
        self.0.get()
    }

    /// Resolve the human-readable task name and hand it to `f`.
    pub fn with_name<R>(self, f: impl FnOnce(Option<&str>) -> R) -> R {
        platform::with_task_name(self, f)
    }
}

/// A single log entry.
#[derive(Clone, Copy)]
pub struct Entry {
    timestamp: Timestamp,
    file: Option<&'static str>,
    line: u32,
    function: Option<&'static str>,
    task: Option<TaskId>,
    /// Message bytes, zero terminated at `len`.
    message: [u8; MAX_MSG_LEN],
    len: u8,
    level: Level,
}

impl Entry {
    /// Empty entry: level `Nothing`, no metadata, epoch timestamp.
    pub const EMPTY: Entry = Entry {
        timestamp: Timestamp::new(0, 0),
        file: None,
        line: 0,
        function: None,
        task: None,
        message: [0; MAX_MSG_LEN],
        len: 0,
        level: Level::Nothing,
    };

    /// Marker posted to a queue to wake a parked consumer. Never dispatched.
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    pub(crate) const WAKE: Entry = Entry {
        line: u32::MAX,
        ..Entry::EMPTY
    };

    /// Whether this is the [`WAKE`](Self::WAKE) marker.
    #[inline]
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    pub(crate) fn is_wake(&self) -> bool {
        self.line == u32::MAX
            && self.level == Level::Nothing
            && self.file.is_none()
            && self.function.is_none()
            && self.task.is_none()
            && self.len == 0
    }

    /// Build an entry, capturing the current time and task.
    ///
    /// `message` is rendered into the fixed buffer; `None` leaves it empty.
    pub fn new(
        level: Level,
        file: Option<&'static str>,
        line: u32,
        function: Option<&'static str>,
        message: Option<fmt::Arguments<'_>>,
    ) -> Self {
        let mut entry = Self {
            timestamp: Timestamp::now(),
            file,
            line,
            function,
            task: TaskId::current(),
            message: [0; MAX_MSG_LEN],
            len: 0,
            level,
        };
        if let Some(args) = message {
            let len = format_to_buffer(&mut entry.message[..MAX_MSG_LEN - 1], args);
            entry.len = len as u8;
        }
        entry
    }

    /// Build an entry without source location.
    #[inline]
    pub fn plain(level: Level, message: fmt::Arguments<'_>) -> Self {
        Self::new(level, None, 0, None, Some(message))
    }

    /// Replace the captured timestamp.
    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Replace the captured task identity.
    pub fn with_task(mut self, task: Option<TaskId>) -> Self {
        self.task = task;
        self
    }

    #[inline]
    pub fn level(&self) -> Level {
        self.level
    }

    #[inline]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    #[inline]
    pub fn file(&self) -> Option<&'static str> {
        self.file
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[inline]
    pub fn function(&self) -> Option<&'static str> {
        self.function
    }

    #[inline]
    pub fn task(&self) -> Option<TaskId> {
        self.task
    }

    /// Message text (without terminator).
    #[inline]
    pub fn message(&self) -> &str {
        // Only whole characters are ever copied in.
        core::str::from_utf8(&self.message[..self.len as usize]).unwrap_or("")
    }

    /// Message bytes including the terminating zero.
    #[inline]
    pub fn message_with_nul(&self) -> &[u8] {
        &self.message[..=self.len as usize]
    }
}

impl Default for Entry {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("level", &self.level)
            .field("timestamp", &self.timestamp)
            .field("file", &self.file)
            .field("line", &self.line)
            .field("function", &self.function)
            .field("task", &self.task)
            .field("message", &self.message())
            .finish()
    }
}

/// Format a message into a buffer, truncating on a character boundary.
///
/// Returns the number of bytes written.
#[inline]
pub fn format_to_buffer(buf: &mut [u8], args: fmt::Arguments<'_>) -> usize {
    struct BufWriter<'a> {
        buf: &'a mut [u8],
        pos: usize,
    }

    impl<'a> fmt::Write for BufWriter<'a> {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            let remaining = self.buf.len() - self.pos;
            if s.len() <= remaining {
                self.buf[self.pos..self.pos + s.len()].copy_from_slice(s.as_bytes());
                self.pos += s.len();
                return Ok(());
            }

            let mut cut = remaining;
            while !s.is_char_boundary(cut) {
                cut -= 1;
            }
            self.buf[self.pos..self.pos + cut].copy_from_slice(&s.as_bytes()[..cut]);
            self.pos += cut;
            // Full: stop formatting the rest.
            Err(fmt::Error)
        }
    }

    let mut writer = BufWriter { buf, pos: 0 };
    let _ = fmt::write(&mut writer, args);
    writer.pos
}
