//! Call-site macros.
//!
//! Entries built here carry `file!()`, `line!()` and the name of the
//! enclosing function.
//!
//! Built with `ASYNC_LOG_CORE_DEBUG_LEVEL`, the per-level macros below that
//! core level compile to nothing: neither the entry nor its arguments are
//! evaluated. `alog_a!`, `alog!` and `alog_isr!` are never gated.
//!
//! # Example
//!
//! ```ignore
//! alog_register!(LOGGER, SerialLog, Level::Debug, Format::LEVEL_LETTER, args);
//! alog!(LOGGER, "always shown");
//! alog_i!(LOGGER, "Hello World!");
//! alog_w!(LOGGER, "battery at {}%", pct);
//! alog_isr!(LOGGER, Level::Debug, "edge on gpio {}", pin);
//! ```

use crate::level::Level;

/// Lowest core debug level at which a per-level macro is compiled in.
#[doc(hidden)]
pub const fn __macro_enabled(level: Level, core_level: u8) -> bool {
    let required = match level {
        Level::Nothing | Level::Always => 0,
        Level::Fatal | Level::Error => 1,
        Level::Warn | Level::Notice => 2,
        Level::Info => 3,
        Level::Debug => 4,
        Level::Trace | Level::Verbose => 5,
    };
    core_level >= required
}

/// Last path segment of a `type_name` of a function item nested in the
/// caller, with closure segments skipped.
#[doc(hidden)]
pub fn __function_name(path: &'static str) -> &'static str {
    let path = path.strip_suffix("::__f").unwrap_or(path);
    path.rsplit("::")
        .find(|segment| *segment != "{{closure}}")
        .unwrap_or(path)
}

/// Name of the enclosing function.
#[doc(hidden)]
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __f() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::core::any::type_name::<T>()
        }
        $crate::macros::__function_name(__type_name_of(__f))
    }};
}

/// Build an [`Entry`](crate::Entry) at the call site.
#[macro_export]
macro_rules! entry {
    ($level:expr, $($arg:tt)+) => {
        $crate::Entry::new(
            $level,
            ::core::option::Option::Some(::core::file!()),
            ::core::line!(),
            ::core::option::Option::Some($crate::function_name!()),
            ::core::option::Option::Some(::core::format_args!($($arg)+)),
        )
    };
}

/// Queue an entry from task context.
///
/// Without a level the entry is logged at ALWAYS.
#[macro_export]
macro_rules! alog {
    ($logger:expr, $fmt:literal $($arg:tt)*) => {
        $logger.log(&$crate::entry!($crate::Level::Always, $fmt $($arg)*))
    };
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log(&$crate::entry!($level, $($arg)+))
    };
}

/// Per-level macro body, compiled out below `core` (a core debug level).
#[doc(hidden)]
#[macro_export]
macro_rules! __alog_gated {
    ($core:expr; $logger:expr, $level:expr, $($arg:tt)+) => {
        if const { $crate::macros::__macro_enabled($level, $core) } {
            $crate::alog!($logger, $level, $($arg)+)
        }
    };
}

/// Register a device on a logger.
///
/// `alog_register!(logger, Kind, args)` uses the configured default level
/// and format; `alog_register!(logger, Kind, level, format, args)` sets them.
#[macro_export]
macro_rules! alog_register {
    ($logger:expr, $device:ty, $args:expr $(,)?) => {
        $logger.register_default::<$device>($args)
    };
    ($logger:expr, $device:ty, $level:expr, $format:expr, $args:expr $(,)?) => {
        $logger.register_device::<$device>($level, $format, $args)
    };
}

/// Queue an entry from an interrupt handler.
#[macro_export]
macro_rules! alog_isr {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log_isr(&$crate::entry!($level, $($arg)+))
    };
}

/// Log at FATAL level.
#[macro_export]
macro_rules! alog_f {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__alog_gated!($crate::config::MACRO_CORE_LEVEL; $logger, $crate::Level::Fatal, $($arg)+)
    };
}

/// Log at ERROR level.
#[macro_export]
macro_rules! alog_e {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__alog_gated!($crate::config::MACRO_CORE_LEVEL; $logger, $crate::Level::Error, $($arg)+)
    };
}

/// Log at WARN level.
#[macro_export]
macro_rules! alog_w {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__alog_gated!($crate::config::MACRO_CORE_LEVEL; $logger, $crate::Level::Warn, $($arg)+)
    };
}

/// Log at NOTICE level.
#[macro_export]
macro_rules! alog_n {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__alog_gated!($crate::config::MACRO_CORE_LEVEL; $logger, $crate::Level::Notice, $($arg)+)
    };
}

/// Log at INFO level.
#[macro_export]
macro_rules! alog_i {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__alog_gated!($crate::config::MACRO_CORE_LEVEL; $logger, $crate::Level::Info, $($arg)+)
    };
}

/// Log at DEBUG level.
#[macro_export]
macro_rules! alog_d {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__alog_gated!($crate::config::MACRO_CORE_LEVEL; $logger, $crate::Level::Debug, $($arg)+)
    };
}

/// Log at TRACE level.
#[macro_export]
macro_rules! alog_t {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__alog_gated!($crate::config::MACRO_CORE_LEVEL; $logger, $crate::Level::Trace, $($arg)+)
    };
}

/// Log at VERBOSE level.
#[macro_export]
macro_rules! alog_v {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__alog_gated!($crate::config::MACRO_CORE_LEVEL; $logger, $crate::Level::Verbose, $($arg)+)
    };
}

/// Log regardless of device levels.
#[macro_export]
macro_rules! alog_a {
    ($logger:expr, $($arg:tt)+) => {
        $crate::alog!($logger, $crate::Level::Always, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Format;
    use crate::logger::Logger;
    use crate::queue::RingQueue;

    #[test]
    fn test_function_name_trim() {
        assert_eq!(__function_name("app::net::connect::__f"), "connect");
        assert_eq!(__function_name("app::net::connect::{{closure}}::__f"), "connect");
        assert_eq!(__function_name("main::__f"), "main");
    }

    #[test]
    fn test_entry_captures_call_site() {
        let line = line!() + 1;
        let entry = crate::entry!(Level::Notice, "v={}", 3);
        assert_eq!(entry.level(), Level::Notice);
        assert_eq!(entry.file(), Some(file!()));
        assert_eq!(entry.line(), line);
        assert_eq!(entry.function(), Some("test_entry_captures_call_site"));
        assert_eq!(entry.message(), "v=3");
    }

    #[test]
    fn test_macro_gate_table() {
        assert!(__macro_enabled(Level::Error, 1));
        assert!(!__macro_enabled(Level::Warn, 1));
        assert!(__macro_enabled(Level::Notice, 2));
        assert!(!__macro_enabled(Level::Info, 2));
        assert!(!__macro_enabled(Level::Debug, 3));
        assert!(!__macro_enabled(Level::Verbose, 4));
        assert!(__macro_enabled(Level::Verbose, 5));
        assert!(__macro_enabled(Level::Always, 0));
        assert!(!__macro_enabled(Level::Fatal, 0));
        assert!(__macro_enabled(Level::Trace, u8::MAX));
    }

    #[test]
    fn test_gated_level_never_queued() {
        let logger: Logger<RingQueue<4>> = Logger::with_queue(RingQueue::new());
        let mut evaluated = 0;
        let mut count = || {
            evaluated += 1;
            evaluated
        };

        crate::__alog_gated!(2; logger, Level::Debug, "n={}", count());
        assert_eq!(logger.pending(), 0);

        crate::__alog_gated!(2; logger, Level::Warn, "n={}", count());
        assert_eq!(logger.pending(), 1);
        assert_eq!(evaluated, 1);
        assert_eq!(logger.dispatch_pending(), 1);
    }

    #[test]
    fn test_default_build_gates_nothing() {
        if crate::config::CORE_DEBUG_LEVEL.is_some() {
            return;
        }
        let logger: Logger<RingQueue<4>> = Logger::with_queue(RingQueue::new());
        crate::alog_v!(logger, "v");
        crate::alog_t!(logger, "t");
        assert_eq!(logger.pending(), 2);
    }

    #[test]
    fn test_register_shorthand() {
        use crate::devices::MemoryLog;

        let logger: Logger<RingQueue<4>> = Logger::with_queue(RingQueue::new());
        let a = crate::alog_register!(logger, MemoryLog<64>, ());
        let b = crate::alog_register!(logger, MemoryLog<64>, Level::Error, Format::NONE, ());
        assert!(!a.is_empty() && !b.is_empty());
        assert_eq!(logger.with_device(b, |dev| dev.level()), Some(Level::Error));

        crate::alog!(logger, "shown at {}", "always");
        logger.dispatch_pending();
        // "shown at always\n" despite the ERROR threshold
        assert_eq!(logger.with_device(b, |dev| 64 - dev.available_for_write()), Some(16));
    }

    #[test]
    fn test_entry_inside_closure() {
        let build = || crate::entry!(Level::Info, "x");
        assert_eq!(build().function(), Some("test_entry_inside_closure"));
    }
}
