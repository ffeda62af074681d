//! Tee command - log stdin lines to a rotating file

use anyhow::{Context, Result};
use rotlog::{formatter_for, FileOptions, LogManager, RotatingFile};
use rotlog_core::SinkConfig;
use std::collections::BTreeMap;
use std::io::{self, BufRead};
use std::sync::Arc;
use tracing::info;

use crate::cli::TeeArgs;

pub fn execute(args: TeeArgs) -> Result<()> {
    let sink = SinkConfig {
        prefix: args.prefix,
        policy: args.policy,
        size_limit: args.size,
        cycle_secs: args.cycle_secs,
        utc_offset_secs: None,
    };
    let policy = sink.policy()?;

    let file = RotatingFile::open(&sink.prefix, policy, FileOptions::default())
        .with_context(|| format!("Failed to open log file {}", sink.prefix.display()))?;
    let manager = LogManager::new(args.app, Arc::new(file));
    manager.set_formatter(formatter_for(args.format, args.separator));

    let mut lines = 0usize;
    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read stdin")?;
        manager.log_event(args.severity, &args.msg_id, &line, BTreeMap::new());
        lines += 1;
    }

    info!(lines, policy = %policy, "stdin closed");
    manager.close();
    Ok(())
}
