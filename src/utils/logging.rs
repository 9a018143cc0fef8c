use log::{Level, LevelFilter, Log, Metadata, Record};

/// Minimal `log` backend writing to stderr.
///
/// Verbose mode shows debug records from this crate; otherwise only warnings
/// and errors get through.
pub struct VerboseLogger {
    enabled: bool,
}

impl VerboseLogger {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn level_filter(&self) -> LevelFilter {
        if self.enabled {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        }
    }

    /// Install as the global logger. A second call is a no-op.
    pub fn init(verbose: bool) {
        let logger = Self::new(verbose);
        let filter = logger.level_filter();
        if log::set_boxed_logger(Box::new(logger)).is_ok() {
            log::set_max_level(filter);
        }
    }

    fn format_record(record: &Record) -> String {
        let prefix = match record.level() {
            Level::Error => "Error",
            Level::Warn => "Warning",
            Level::Info => "Info",
            Level::Debug | Level::Trace => "Verbose",
        };
        format!("{}: {}", prefix, record.args())
    }
}

impl Log for VerboseLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        if metadata.level() <= Level::Warn {
            return true;
        }
        // Keep dependency chatter (hyper, reqwest) out of verbose output
        self.enabled && metadata.target().starts_with(env!("CARGO_CRATE_NAME"))
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{}", Self::format_record(record));
        }
    }

    fn flush(&self) {}
}
