//! `log` facade adapter.
//!
//! Lets code that uses `log::info!` and friends (including esp-idf-svc and
//! this crate's own diagnostics) feed the async logger. Records become
//! entries with the module path standing in for the function trace.

use log::{LevelFilter, Metadata, Record};

use crate::entry::Entry;
use crate::error::LoggerError;
use crate::level::Level;
use crate::logger::Logger;
use crate::platform;
use crate::queue::EntryQueue;

impl<Q: EntryQueue + 'static> log::Log for Logger<Q> {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        // Filtering is per device, after the queue
        true
    }

    fn log(&self, record: &Record) {
        let entry = Entry::new(
            Level::from(record.level()),
            record.file_static(),
            record.line().unwrap_or(0),
            record.module_path_static(),
            Some(*record.args()),
        );

        if platform::in_isr() {
            self.log_isr(&entry);
        } else {
            Logger::log(self, &entry);
        }
    }

    fn flush(&self) {}
}

impl<Q: EntryQueue + 'static> Logger<Q> {
    /// Install this logger as the global `log` logger.
    ///
    /// `max_level` is the facade's own filter; devices still filter on their
    /// own level.
    pub fn install(&'static self, max_level: LevelFilter) -> Result<(), LoggerError> {
        log::set_logger(self).map_err(|_| LoggerError::InstallFailed)?;
        log::set_max_level(max_level);
        Ok(())
    }
}
