//! rotlog File - Rotating log files and time based rotation scheduling

mod diagnostics;
#[cfg(test)]
pub(crate) mod mock;
mod naming;
mod rotating;
mod scheduler;

pub use diagnostics::{Diagnostics, FileEvent, TracingDiagnostics};
pub use naming::{clamp_size_limit, normalize_record};
pub use rotating::{FileOptions, RotatingFile};
pub use scheduler::Scheduler;
