//! Setup error types.
//!
//! Only setup calls return these. Producers never see an error: drops and
//! truncation are silent.

/// Logger setup error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerError {
    /// `start` was already called on this logger
    AlreadyStarted,
    /// The entry queue could not be created
    QueueUnavailable,
    /// The consumer task could not be created
    TaskSpawnFailed,
    /// Another global `log` logger is already installed
    InstallFailed,
}

impl LoggerError {
    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::AlreadyStarted => "logger already started",
            Self::QueueUnavailable => "entry queue unavailable",
            Self::TaskSpawnFailed => "consumer task could not be created",
            Self::InstallFailed => "a global logger is already installed",
        }
    }
}

impl core::fmt::Display for LoggerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for LoggerError {}
