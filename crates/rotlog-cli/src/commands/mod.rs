//! Command implementations

pub mod event;
pub mod tee;
