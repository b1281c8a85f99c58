//! Unit tests for the logging system
//!
//! Uses a capture logger installed via set_logger. Tests that swap the
//! global logger run serially.

use super::*;
use serial_test::serial;
use std::sync::{Arc, Mutex};

struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn install_capture() -> Arc<Mutex<Vec<LogEntry>>> {
    let entries = Arc::new(Mutex::new(Vec::new()));
    set_logger(Box::new(CaptureLogger {
        entries: entries.clone(),
    }));
    entries
}

#[test]
fn test_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
#[serial]
fn test_simple_log_has_no_location() {
    let entries = install_capture();

    log(LogSeverity::Info, "test::simple", "hello".to_string());

    let captured = entries.lock().unwrap();
    let entry = captured
        .iter()
        .find(|e| e.source == "test::simple")
        .expect("entry captured");
    assert_eq!(entry.severity, LogSeverity::Info);
    assert_eq!(entry.message, "hello");
    assert!(entry.file.is_none());
    assert!(entry.line.is_none());

    drop(captured);
    reset_logger();
}

#[test]
#[serial]
fn test_error_macro_records_location() {
    let entries = install_capture();

    crate::render_error!("test::detailed", "failed with code {}", 7);

    let captured = entries.lock().unwrap();
    let entry = captured
        .iter()
        .find(|e| e.source == "test::detailed")
        .expect("entry captured");
    assert_eq!(entry.severity, LogSeverity::Error);
    assert_eq!(entry.message, "failed with code 7");
    assert!(entry.file.is_some());
    assert!(entry.line.is_some());

    drop(captured);
    reset_logger();
}
