//! Event command - log one event through a configured set of sinks

use anyhow::{Context, Result};
use rotlog::LogManager;
use rotlog_core::ConfigFile;
use std::collections::BTreeMap;

use crate::cli::EventArgs;

pub fn execute(args: EventArgs) -> Result<()> {
    let config = match args.config {
        Some(path) => ConfigFile::load(&path)?,
        None => {
            let cwd = std::env::current_dir().context("Failed to get current directory")?;
            ConfigFile::find_and_load(&cwd)?.0
        }
    };

    let manager = LogManager::from_config(&config)?;
    let params: BTreeMap<String, String> = args.params.into_iter().collect();
    manager.log_event(args.severity, &args.msg_id, &args.message, params);
    manager.close();
    Ok(())
}
