// Ring-buffer logger - keeps recent lines for the debug screen
//
// Nothing goes to stderr while the TUI owns the terminal; lines can also be
// appended to a log file.
use log::{Level, LevelFilter, Log, Metadata, Record};
use once_cell::sync::Lazy;
use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const MAX_DEBUG_LOGS: usize = 1000;

static LINES_LOGGED: AtomicUsize = AtomicUsize::new(0);

static LOG_BUFFER: Lazy<Mutex<VecDeque<String>>> =
    Lazy::new(|| Mutex::new(VecDeque::with_capacity(MAX_DEBUG_LOGS)));

struct RingLogger {
    level: LevelFilter,
    file: Option<Mutex<File>>,
}

impl Log for RingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(record.level(), record.target(), &record.args().to_string());

        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = writeln!(file, "{}", line);
            }
        }
        push_line(line);
    }

    fn flush(&self) {
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}

fn format_line(level: Level, target: &str, message: &str) -> String {
    let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");
    let target = target.strip_prefix("readerchunks::").unwrap_or(target);
    format!("[{}] {:<5} {}: {}", timestamp, level, target, message)
}

fn push_line(line: String) {
    if let Ok(mut logs) = LOG_BUFFER.lock() {
        if logs.len() >= MAX_DEBUG_LOGS {
            logs.pop_front();
        }
        logs.push_back(line);
    }
    LINES_LOGGED.fetch_add(1, Ordering::Relaxed);
}

/// Total lines logged so far; lets the UI notice new output cheaply.
pub fn lines_logged() -> usize {
    LINES_LOGGED.load(Ordering::Relaxed)
}

/// Install the logger. Safe to call more than once; later calls are ignored.
pub fn init(level: LevelFilter, log_file: Option<&Path>) -> std::io::Result<()> {
    let file = match log_file {
        Some(path) => Some(Mutex::new(
            OpenOptions::new().create(true).append(true).open(path)?,
        )),
        None => None,
    };
    let logger = RingLogger { level, file };
    if log::set_boxed_logger(Box::new(logger)).is_ok() {
        log::set_max_level(level);
    }
    Ok(())
}

/// Copy of the buffered lines, oldest first.
pub fn snapshot() -> Vec<String> {
    LOG_BUFFER
        .lock()
        .map(|logs| logs.iter().cloned().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_carry_level_and_short_target() {
        let line = format_line(Level::Warn, "readerchunks::app", "slow");
        assert!(line.ends_with("WARN  app: slow"), "{}", line);
    }

    #[test]
    fn installed_logger_appends_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reader.log");
        init(LevelFilter::Debug, Some(&path)).unwrap();

        log::warn!(target: "readerchunks::picker", "disk is slow");
        log::logger().flush();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("WARN  picker: disk is slow"), "{}", written);
    }

    #[test]
    fn buffer_is_bounded() {
        let before = lines_logged();
        for i in 0..(MAX_DEBUG_LOGS + 10) {
            push_line(format!("line {}", i));
        }
        let logs = snapshot();
        assert!(logs.len() <= MAX_DEBUG_LOGS);
        assert!(lines_logged() >= before + MAX_DEBUG_LOGS + 10);
        assert_eq!(logs.last().map(String::as_str), Some(format!("line {}", MAX_DEBUG_LOGS + 9).as_str()));
    }
}
