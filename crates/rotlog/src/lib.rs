//! rotlog - Structured event logging to rotating files
//!
//! A [`LogManager`] stamps each event with its source, drops events below
//! the severity filter, renders the rest with an [`EventFormatter`] and
//! hands the record to every registered sink. Sinks are usually
//! [`RotatingFile`]s, but anything implementing [`LogSink`] works.
//!
//! ```no_run
//! use rotlog::{LogManager, RotatingFile};
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//!
//! let file = RotatingFile::daily("/var/log/myapp/events")?;
//! let log = LogManager::new("myapp", Arc::new(file));
//! log.info("STARTUP", "service started", BTreeMap::new());
//! log.close();
//! # Ok::<(), rotlog::Error>(())
//! ```

pub mod format;
mod manager;
#[cfg(test)]
pub(crate) mod mock;

pub use format::{formatter_for, EventFormatter, JsonFormatter, PlainTextFormatter};
pub use manager::LogManager;

pub use rotlog_core::{
    ConfigFile, Error, EventMessage, FileWriter, LogSink, Result, RotationPolicy, Severity,
};
pub use rotlog_file::{FileOptions, RotatingFile, Scheduler};
