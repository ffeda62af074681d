//! Event messages handed from the log manager to the formatters

use chrono::{DateTime, DurationRound, Local, TimeDelta};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::severity::Severity;

/// Host name used when the machine name cannot be resolved
pub const UNKNOWN_HOSTNAME: &str = "unknown";

/// A single log event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventMessage {
    pub timestamp: DateTime<Local>,
    pub severity: Severity,
    pub hostname: String,
    pub appname: String,
    pub pid: u32,
    pub msg_id: String,
    pub message: String,
    pub params: BTreeMap<String, String>,
}

impl EventMessage {
    /// Create an event stamped with the current time and process id
    pub fn new(
        severity: Severity,
        msg_id: impl Into<String>,
        message: impl Into<String>,
        params: BTreeMap<String, String>,
    ) -> Self {
        Self {
            timestamp: round_micros(Local::now()),
            severity,
            hostname: String::new(),
            appname: String::new(),
            pid: std::process::id(),
            msg_id: msg_id.into(),
            message: message.into(),
            params,
        }
    }

    pub fn with_source(mut self, hostname: impl Into<String>, appname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self.appname = appname.into();
        self
    }

    /// Fill in missing host and pid, and trim the source names
    pub fn normalized(mut self) -> Self {
        if self.hostname.trim().is_empty() {
            self.hostname = local_hostname();
        }
        self.hostname = self.hostname.trim().to_string();
        self.appname = self.appname.trim().to_string();
        if self.pid == 0 {
            self.pid = std::process::id();
        }
        self
    }
}

/// Resolve the machine host name
pub fn local_hostname() -> String {
    nix::unistd::gethostname()
        .ok()
        .and_then(|h| h.into_string().ok())
        .filter(|h| !h.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_HOSTNAME.to_string())
}

fn round_micros(ts: DateTime<Local>) -> DateTime<Local> {
    ts.duration_round(TimeDelta::microseconds(1)).unwrap_or(ts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_event_defaults() {
        let event = EventMessage::new(Severity::Info, "START", "started", BTreeMap::new());
        assert_eq!(event.pid, std::process::id());
        assert_eq!(event.timestamp.timestamp_subsec_nanos() % 1000, 0);
        assert!(event.hostname.is_empty());
    }

    #[test]
    fn test_normalized_fills_and_trims() {
        let mut event = EventMessage::new(Severity::Info, "ID", "msg", BTreeMap::new())
            .with_source("", "  myapp ");
        event.pid = 0;

        let event = event.normalized();
        assert!(!event.hostname.is_empty());
        assert_eq!(event.appname, "myapp");
        assert_eq!(event.pid, std::process::id());
    }

    #[test]
    fn test_normalized_keeps_given_host() {
        let event = EventMessage::new(Severity::Debug, "ID", "msg", BTreeMap::new())
            .with_source(" web-01 ", "app")
            .normalized();
        assert_eq!(event.hostname, "web-01");
    }
}
