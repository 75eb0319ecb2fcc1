//! Module: config
//!
//! Purpose: Compile-time configuration for ESPAsyncLogger.
//!
//! Architecture:
//! - ASYNC_LOG_* environment variables: read once by build.rs
//! - Generated code: $OUT_DIR/config.rs (queue, task and serial parameters)
//! - Nothing here changes at runtime
//!
//! | variable                     | constant           | default |
//! |------------------------------|--------------------|---------|
//! | `ASYNC_LOG_QUEUE_LENGTH`     | [`QUEUE_LENGTH`]   | 32      |
//! | `ASYNC_LOG_TASK_SIZE`        | [`TASK_STACK_SIZE`]| 4096 (bytes) |
//! | `ASYNC_LOG_TASK_PRIORITY`    | [`TASK_PRIORITY`]  | 0       |
//! | `ASYNC_LOG_TASK_COREID`      | [`TASK_CORE_ID`]   | -1      |
//! | `ASYNC_LOG_DEFAULT_LEVEL`    | [`DEFAULT_LEVEL`]  | WARN    |
//! | `ASYNC_LOG_CORE_DEBUG_LEVEL` | [`CORE_DEBUG_LEVEL`] | unset |
//! | `ASYNC_LOG_SERIAL_BAUD_RATE` | [`SERIAL_BAUD_RATE`] | 115200 |

use crate::format::Format;
use crate::level::Level;

// Include auto-generated code
include!(concat!(env!("OUT_DIR"), "/config.rs"));

/// Message buffer size: 94 printable bytes plus terminator.
pub const MAX_MSG_LEN: usize = 95;

/// Name of the consumer task / thread.
pub const TASK_NAME: &str = "asyncLoggingTask";

/// Level devices get when none is given.
///
/// A core debug level, when given, wins over `ASYNC_LOG_DEFAULT_LEVEL`.
pub const DEFAULT_LEVEL: Level = match CORE_DEBUG_LEVEL {
    Some(core) => Level::from_core_debug_level(core),
    None => match Level::from_u8(DEFAULT_LEVEL_VALUE) {
        Some(level) => level,
        None => Level::Warn,
    },
};

/// Core debug level the per-level macros are compiled against.
///
/// Without a core debug level every macro stays enabled.
pub const MACRO_CORE_LEVEL: u8 = match CORE_DEBUG_LEVEL {
    Some(core) => core,
    None => u8::MAX,
};

/// Format devices get when none is given.
pub const DEFAULT_FORMAT: Format = Format::LEVEL_SHORT
    .union(Format::TIMESTAMP_FULL)
    .union(Format::FILE_TRACE)
    .union(Format::FUNCTION_TRACE)
    .union(Format::TASK_TRACE);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level_follows_core_debug_level() {
        match CORE_DEBUG_LEVEL {
            Some(core) => {
                assert_eq!(DEFAULT_LEVEL, Level::from_core_debug_level(core));
                assert_eq!(MACRO_CORE_LEVEL, core);
            }
            None => {
                assert_eq!(Level::from_u8(DEFAULT_LEVEL_VALUE), Some(DEFAULT_LEVEL));
                assert_eq!(MACRO_CORE_LEVEL, u8::MAX);
            }
        }
    }

    #[test]
    fn test_stack_holds_entry_and_formatter() {
        // Bytes: the consumer keeps an Entry on its stack while rendering
        let entry = core::mem::size_of::<crate::entry::Entry>() as u32;
        assert!(TASK_STACK_SIZE >= 4 * entry);
    }
}
