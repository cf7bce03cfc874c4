//! Logger injection.
//!
//! The store never reaches for the process-wide `log` macros directly.
//! Instead it holds a [`SharedLogger`] handed to it at construction and
//! emits records through [`store_log!`]. The default, [`GlobalLogger`],
//! forwards to whatever the host installed via the `log` facade (for
//! example `env_logger`), so most callers never need to think about it.

use std::sync::Arc;

use log::{Log, Metadata, Record};

/// Target attached to every record emitted by the store.
pub const LOG_TARGET: &str = "screenshots";

pub type SharedLogger = Arc<dyn Log>;

/// Forwards to the logger installed through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlobalLogger;

impl Log for GlobalLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level() && log::logger().enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            log::logger().log(record);
        }
    }

    fn flush(&self) {
        log::logger().flush();
    }
}

pub fn global_logger() -> SharedLogger {
    Arc::new(GlobalLogger)
}

/// Emits a record to an injected logger.
///
/// ```ignore
/// store_log!(self.logger, log::Level::Warn, "Unable to delete {}", path.display());
/// ```
macro_rules! store_log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let logger: &dyn ::log::Log = &*$logger;
        let metadata = ::log::Metadata::builder()
            .level($level)
            .target($crate::logging::LOG_TARGET)
            .build();
        if logger.enabled(&metadata) {
            logger.log(
                &::log::Record::builder()
                    .metadata(metadata)
                    .args(format_args!($($arg)+))
                    .module_path(Some(module_path!()))
                    .file(Some(file!()))
                    .line(Some(line!()))
                    .build(),
            );
        }
    }};
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use log::{Level, Log, Metadata, Record};

    /// Keeps every record it receives so tests can assert on them.
    #[derive(Default)]
    pub struct RecordingLogger {
        records: Mutex<Vec<(Level, String)>>,
    }

    impl RecordingLogger {
        pub fn messages(&self, level: Level) -> Vec<String> {
            self.records
                .lock()
                .unwrap()
                .iter()
                .filter(|(l, _)| *l == level)
                .map(|(_, m)| m.clone())
                .collect()
        }
    }

    impl Log for RecordingLogger {
        fn enabled(&self, _metadata: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            self.records
                .lock()
                .unwrap()
                .push((record.level(), record.args().to_string()));
        }

        fn flush(&self) {}
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingLogger;
    use super::*;
    use log::Level;

    #[test]
    fn store_log_reaches_the_injected_logger() {
        let recorder = Arc::new(RecordingLogger::default());
        let logger: SharedLogger = recorder.clone();
        store_log!(logger, Level::Warn, "Wrong filename: {}", "abc.png");
        store_log!(logger, Level::Debug, "count={}", 3);

        assert_eq!(recorder.messages(Level::Warn), vec!["Wrong filename: abc.png"]);
        assert_eq!(recorder.messages(Level::Debug), vec!["count=3"]);
    }

    #[test]
    fn global_logger_is_silent_without_a_host_logger() {
        // No logger installed in unit tests: max_level is Off.
        let logger = global_logger();
        store_log!(logger, Level::Error, "dropped");
    }
}
