use std::{collections::VecDeque, fmt::Display, io::Write, sync::Mutex};

use log::{Level, LevelFilter, Record, SetLoggerError};
use once_cell::sync::Lazy;

/// Most lines kept in the log store. Older lines are dropped first.
pub const MAX_LOG_LINES: usize = 1024;

static LOG_STORE: Lazy<Mutex<LogStore>> = Lazy::new(|| Mutex::new(LogStore::new(MAX_LOG_LINES)));

#[derive(Debug)]
struct LogStore {
    lines: VecDeque<String>,
    capacity: usize,
}

impl LogStore {
    fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            capacity,
        }
    }

    fn push(&mut self, line: String) {
        self.lines.push_back(line);
        while self.lines.len() > self.capacity {
            self.lines.pop_front();
        }
    }

    fn to_vec(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }
}

fn add_to_log_store(message: String) {
    if let Ok(mut store) = LOG_STORE.lock() {
        store.push(message);
    }
}

/// A copy of the last [MAX_LOG_LINES] lines written by the installed logger, oldest first.
pub fn log_store() -> Vec<String> {
    match LOG_STORE.lock() {
        Ok(v) => v.to_vec(),
        Err(_) => vec![],
    }
}

fn format_record(record: &Record) -> String {
    format!(
        "{} [{}] {}: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        record.level(),
        record.target(),
        record.args()
    )
}

fn builder(level: LevelFilter) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level)
        .target(env_logger::Target::Stderr)
        .format(|buf, record| {
            let line = format_record(record);
            writeln!(buf, "{line}")?;
            add_to_log_store(line);

            Ok(())
        });

    builder
}

/// Install the stderr logger as the global `log` backend.
///
/// Can only succeed once per process.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    builder(level).try_init()
}

/// A named logger. The name is used as the `log` target so output from
/// different components can be told apart.
#[derive(Debug, Clone)]
pub struct Logger {
    name: String,
}

impl Logger {
    pub fn create(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn emit(&self, level: Level, message: impl Display) {
        log::log!(target: self.name.as_str(), level, "{message}");
    }

    pub fn debug(&self, message: impl Display) {
        self.emit(Level::Debug, message);
    }

    pub fn info(&self, message: impl Display) {
        self.emit(Level::Info, message);
    }

    pub fn warn(&self, message: impl Display) {
        self.emit(Level::Warn, message);
    }

    pub fn error(&self, message: impl Display) {
        self.emit(Level::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use log::{Log, Metadata};

    use super::*;

    #[test]
    fn logger_keeps_name() {
        let logger = Logger::create("FacePuppet");

        assert_eq!(logger.name(), "FacePuppet");
    }

    #[test]
    fn format_contains_level_and_target() {
        let line = format_record(
            &Record::builder()
                .args(format_args!("hello"))
                .level(Level::Warn)
                .target("TalkService")
                .build(),
        );

        assert!(line.ends_with("[WARN] TalkService: hello"));
    }

    #[test]
    fn logger_stores_lines() {
        let logger = builder(LevelFilter::Debug).build();

        logger.log(
            &Record::builder()
                .args(format_args!("stored line"))
                .level(Level::Debug)
                .target("ClipPlayer")
                .build(),
        );

        assert!(log_store()
            .iter()
            .any(|v| v.ends_with("[DEBUG] ClipPlayer: stored line")));
    }

    #[test]
    fn logger_respects_level() {
        let logger = builder(LevelFilter::Info).build();

        assert!(logger.enabled(&Metadata::builder().level(Level::Error).build()));
        assert!(!logger.enabled(&Metadata::builder().level(Level::Debug).build()));
    }

    #[test]
    fn store_drops_oldest_lines() {
        let mut store = LogStore::new(3);

        for i in 0..5 {
            store.push(format!("line {i}"));
        }

        assert_eq!(store.to_vec(), vec!["line 2", "line 3", "line 4"]);
    }

    #[test]
    fn global_store_is_capped() {
        for i in 0..MAX_LOG_LINES + 8 {
            add_to_log_store(format!("filler {i}"));
        }

        assert!(log_store().len() <= MAX_LOG_LINES);
    }
}
