use chrono::SecondsFormat;
use rotlog_core::{EventMessage, Result, DEFAULT_FIELD_SEPARATOR};
use std::fmt::Write;

use super::EventFormatter;

/// Formats events as separator-delimited text
///
/// `timestamp|severity|hostname|appname|pid|msg_id|message|[k=v,k=v]`
#[derive(Debug, Clone, Copy)]
pub struct PlainTextFormatter {
    separator: char,
}

impl Default for PlainTextFormatter {
    fn default() -> Self {
        Self {
            separator: DEFAULT_FIELD_SEPARATOR,
        }
    }
}

impl PlainTextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different field separator
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn separator(&self) -> char {
        self.separator
    }
}

impl EventFormatter for PlainTextFormatter {
    fn format(&self, event: &EventMessage) -> Result<String> {
        let sep = self.separator;
        let mut line = String::new();
        write!(
            line,
            "{ts}{sep}{sev}{sep}{host}{sep}{app}{sep}{pid}{sep}{id}{sep}{msg}{sep}[",
            ts = event.timestamp.to_rfc3339_opts(SecondsFormat::Micros, false),
            sev = event.severity,
            host = event.hostname,
            app = event.appname,
            pid = event.pid,
            id = event.msg_id,
            msg = event.message,
        )
        .map_err(|e| rotlog_core::Error::format(e.to_string()))?;

        let params: Vec<String> = event
            .params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        line.push_str(&params.join(","));
        line.push(']');
        Ok(line)
    }

    fn name(&self) -> &str {
        "plain_text"
    }
}
