use rotlog_core::{EventMessage, Result};

use super::EventFormatter;

/// Formats events as single-line JSON objects
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl EventFormatter for JsonFormatter {
    fn format(&self, event: &EventMessage) -> Result<String> {
        Ok(serde_json::to_string(event)?)
    }

    fn name(&self) -> &str {
        "json"
    }
}
