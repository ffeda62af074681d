//! Log manager: filters, formats and fans events out to sinks

use parking_lot::RwLock;
use rotlog_core::event::local_hostname;
use rotlog_core::{ConfigFile, EventMessage, LogSink, Result, Severity};
use rotlog_file::{FileOptions, RotatingFile};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::format::{formatter_for, EventFormatter, JsonFormatter};

/// Writes events for one application to a set of sinks
///
/// Every method takes `&self`, so a manager can be shared between threads
/// behind an `Arc`. Failures while formatting or writing are reported
/// through `tracing` and never returned to the caller.
pub struct LogManager {
    hostname: String,
    appname: String,
    filter: RwLock<Severity>,
    formatter: RwLock<Arc<dyn EventFormatter>>,
    sinks: RwLock<Vec<Arc<dyn LogSink>>>,
}

impl LogManager {
    /// Create a manager writing JSON records to `sink`, admitting every severity
    pub fn new(appname: impl Into<String>, sink: Arc<dyn LogSink>) -> Self {
        Self::with_sinks(appname.into(), vec![sink])
    }

    fn with_sinks(appname: String, sinks: Vec<Arc<dyn LogSink>>) -> Self {
        Self {
            hostname: local_hostname(),
            appname,
            filter: RwLock::new(Severity::Debug),
            formatter: RwLock::new(Arc::new(JsonFormatter::new())),
            sinks: RwLock::new(sinks),
        }
    }

    /// Build a manager from a configuration file, opening every sink
    pub fn from_config(config: &ConfigFile) -> Result<Self> {
        Self::from_config_with(config, FileOptions::default())
    }

    /// Like [`LogManager::from_config`], with explicit file options
    ///
    /// A zone configured on a sink overrides the zone in `options`. If any
    /// sink fails to open, the ones already opened are closed again.
    pub fn from_config_with(config: &ConfigFile, options: FileOptions) -> Result<Self> {
        let mut sinks: Vec<Arc<dyn LogSink>> = Vec::with_capacity(config.sinks.len());

        for sink in &config.sinks {
            let opened = sink.policy().and_then(|policy| {
                let mut options = options.clone();
                if let Some(zone) = sink.zone()? {
                    options = options.with_zone(zone);
                }
                RotatingFile::open(&sink.prefix, policy, options)
            });

            match opened {
                Ok(file) => sinks.push(Arc::new(file)),
                Err(e) => {
                    close_all(&sinks);
                    return Err(e);
                }
            }
        }

        let manager = Self::with_sinks(config.appname.clone(), sinks);
        manager.set_filter(config.severity);
        manager.set_formatter(formatter_for(config.format, config.separator()));
        Ok(manager)
    }

    /// Override the host name stamped on events
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    pub fn appname(&self) -> &str {
        &self.appname
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Register another sink
    pub fn add_sink(&self, sink: Arc<dyn LogSink>) {
        self.sinks.write().push(sink);
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.read().len()
    }

    pub fn set_formatter(&self, formatter: Box<dyn EventFormatter>) {
        *self.formatter.write() = Arc::from(formatter);
    }

    /// Name of the active formatter
    pub fn formatter_name(&self) -> String {
        self.formatter.read().name().to_string()
    }

    /// Only write events at least as severe as `severity`
    pub fn set_filter(&self, severity: Severity) {
        *self.filter.write() = severity;
    }

    pub fn filter(&self) -> Severity {
        *self.filter.read()
    }

    /// Log an event to every sink
    pub fn log_event(
        &self,
        severity: Severity,
        msg_id: &str,
        message: &str,
        params: BTreeMap<String, String>,
    ) {
        if !severity.passes(self.filter()) {
            return;
        }

        let event = EventMessage::new(severity, msg_id, message, params)
            .with_source(self.hostname.as_str(), self.appname.as_str())
            .normalized();

        let formatter = Arc::clone(&*self.formatter.read());
        let record = match formatter.format(&event) {
            Ok(record) => record,
            Err(e) => {
                warn!(
                    formatter = formatter.name(),
                    msg_id,
                    "Failed to format log event, dropping it: {}",
                    e
                );
                return;
            }
        };

        // Writes happen outside the lock so a slow sink does not block add_sink
        let sinks = self.sinks.read().clone();
        for sink in &sinks {
            if let Err(e) = sink.write(record.as_bytes()) {
                warn!(msg_id, "Failed to write log event: {}", e);
            }
        }
    }

    /// System is unusable
    pub fn emergency(&self, msg_id: &str, message: &str, params: BTreeMap<String, String>) {
        self.log_event(Severity::Emergency, msg_id, message, params);
    }

    /// Action must be taken immediately
    pub fn alert(&self, msg_id: &str, message: &str, params: BTreeMap<String, String>) {
        self.log_event(Severity::Alert, msg_id, message, params);
    }

    /// Component unavailable or unexpected exception
    pub fn critical(&self, msg_id: &str, message: &str, params: BTreeMap<String, String>) {
        self.log_event(Severity::Critical, msg_id, message, params);
    }

    pub fn error(&self, msg_id: &str, message: &str, params: BTreeMap<String, String>) {
        self.log_event(Severity::Error, msg_id, message, params);
    }

    pub fn warning(&self, msg_id: &str, message: &str, params: BTreeMap<String, String>) {
        self.log_event(Severity::Warning, msg_id, message, params);
    }

    /// Normal but significant events
    pub fn notice(&self, msg_id: &str, message: &str, params: BTreeMap<String, String>) {
        self.log_event(Severity::Notice, msg_id, message, params);
    }

    pub fn info(&self, msg_id: &str, message: &str, params: BTreeMap<String, String>) {
        self.log_event(Severity::Info, msg_id, message, params);
    }

    pub fn debug(&self, msg_id: &str, message: &str, params: BTreeMap<String, String>) {
        self.log_event(Severity::Debug, msg_id, message, params);
    }

    /// Close every sink and forget them
    pub fn close(&self) {
        let sinks = std::mem::take(&mut *self.sinks.write());
        close_all(&sinks);
        debug!(app = %self.appname, sinks = sinks.len(), "log manager closed");
    }
}

impl std::fmt::Debug for LogManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogManager")
            .field("hostname", &self.hostname)
            .field("appname", &self.appname)
            .field("filter", &self.filter())
            .field("formatter", &self.formatter_name())
            .field("sinks", &self.sink_count())
            .finish()
    }
}

fn close_all(sinks: &[Arc<dyn LogSink>]) {
    for sink in sinks {
        if let Err(e) = sink.close() {
            warn!("Failed to close log sink: {}", e);
        }
    }
}
