//! Mock implementations for testing

use parking_lot::Mutex;
use rotlog_core::{Error, LogSink, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// A sink that records every record written to it
#[derive(Default)]
pub struct MockSink {
    records: Mutex<Vec<String>>,
    close_count: AtomicUsize,
    should_fail: AtomicBool,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink whose writes and close always fail
    pub fn failing() -> Self {
        Self {
            should_fail: AtomicBool::new(true),
            ..Default::default()
        }
    }

    pub fn records(&self) -> Vec<String> {
        self.records.lock().clone()
    }

    pub fn close_count(&self) -> usize {
        self.close_count.load(Ordering::SeqCst)
    }
}

impl LogSink for MockSink {
    fn write(&self, record: &[u8]) -> Result<usize> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(Error::Closed("mock".to_string()));
        }
        self.records
            .lock()
            .push(String::from_utf8_lossy(record).into_owned());
        Ok(record.len())
    }

    fn close(&self) -> Result<()> {
        self.close_count.fetch_add(1, Ordering::SeqCst);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(Error::Closed("mock".to_string()));
        }
        Ok(())
    }
}
