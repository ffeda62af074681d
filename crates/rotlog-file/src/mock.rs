//! Mock implementations for testing

use parking_lot::Mutex;

use crate::diagnostics::{Diagnostics, FileEvent};

/// Diagnostics sink that keeps every event it receives
#[derive(Default)]
pub struct RecordingDiagnostics {
    events: Mutex<Vec<FileEvent>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<FileEvent> {
        self.events.lock().clone()
    }

    pub fn rotations(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, FileEvent::Rotated { .. }))
            .count()
    }

    pub fn callback_failures(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, FileEvent::CallbackFailed { .. }))
            .count()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn record(&self, event: FileEvent) {
        self.events.lock().push(event);
    }
}
