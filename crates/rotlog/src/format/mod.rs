//! Event formatters
//!
//! A formatter turns one [`EventMessage`] into the text of a single log
//! record. The manager hands the result to every sink unchanged.

mod json;
mod plain;

pub use json::JsonFormatter;
pub use plain::PlainTextFormatter;

use rotlog_core::{EventMessage, FormatKind, Result};

/// Strategy for rendering events as log records
pub trait EventFormatter: Send + Sync {
    /// Render one event
    fn format(&self, event: &EventMessage) -> Result<String>;

    /// Short name of the format
    fn name(&self) -> &str;
}

/// Build the formatter for a configured format
pub fn formatter_for(kind: FormatKind, separator: char) -> Box<dyn EventFormatter> {
    match kind {
        FormatKind::Json => Box::new(JsonFormatter::new()),
        FormatKind::Plain => Box::new(PlainTextFormatter::new().with_separator(separator)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatter_for_kind() {
        assert_eq!(formatter_for(FormatKind::Json, '|').name(), "json");
        assert_eq!(formatter_for(FormatKind::Plain, ';').name(), "plain_text");
    }
}
