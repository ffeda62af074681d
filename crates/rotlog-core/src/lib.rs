//! rotlog Core - Shared types, configuration, and error handling

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod policy;
pub mod severity;
pub mod sink;

pub use config::*;
pub use constants::*;
pub use error::{Error, Result};
pub use event::EventMessage;
pub use policy::RotationPolicy;
pub use severity::Severity;
pub use sink::{FileWriter, LogSink};
