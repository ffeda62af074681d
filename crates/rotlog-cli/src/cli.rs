//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use rotlog_core::{FormatKind, PolicyName, Severity};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rotlog")]
#[command(version, about = "Structured event logging to rotating log files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log every line read from stdin as an event
    Tee(TeeArgs),

    /// Log a single event through the sinks of a config file
    Event(EventArgs),
}

#[derive(Args)]
pub struct TeeArgs {
    /// Path and base name of the log files
    #[arg(long)]
    pub prefix: PathBuf,

    /// Rotation policy: none, size, daily or timed
    #[arg(long, default_value = "none")]
    pub policy: PolicyName,

    /// Size limit in bytes (size policy)
    #[arg(long)]
    pub size: Option<u64>,

    /// Rotation cycle in seconds (timed policy)
    #[arg(long)]
    pub cycle_secs: Option<u64>,

    /// Severity of the logged lines
    #[arg(long, default_value = "INFO")]
    pub severity: Severity,

    /// Message id of the logged lines
    #[arg(long, default_value = "STDIN")]
    pub msg_id: String,

    /// Record format: json or plain
    #[arg(long, default_value = "json")]
    pub format: FormatKind,

    /// Field separator for the plain format
    #[arg(long, default_value_t = rotlog_core::DEFAULT_FIELD_SEPARATOR)]
    pub separator: char,

    /// Application name stamped on every event
    #[arg(long, default_value = "rotlog")]
    pub app: String,
}

#[derive(Args)]
pub struct EventArgs {
    /// Config file (defaults to rotlog.toml/yaml/json in the current directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Event severity
    #[arg(long, default_value = "INFO")]
    pub severity: Severity,

    /// Event message id
    #[arg(long)]
    pub msg_id: String,

    /// Event message
    pub message: String,

    /// Event parameter as KEY=VALUE (repeatable)
    #[arg(short = 'p', long = "param", value_parser = parse_param)]
    pub params: Vec<(String, String)>,
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("invalid parameter '{}', expected KEY=VALUE", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_param() {
        assert_eq!(
            parse_param("user=alice").unwrap(),
            ("user".to_string(), "alice".to_string())
        );
        assert_eq!(
            parse_param("query=a=b").unwrap(),
            ("query".to_string(), "a=b".to_string())
        );
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=value").is_err());
    }

    #[test]
    fn test_parse_tee_args() {
        let cli = Cli::try_parse_from([
            "rotlog", "tee", "--prefix", "/tmp/app", "--policy", "size", "--size", "2000000",
            "--severity", "warn",
        ])
        .unwrap();
        match cli.command {
            Commands::Tee(args) => {
                assert_eq!(args.policy, PolicyName::Size);
                assert_eq!(args.size, Some(2_000_000));
                assert_eq!(args.severity, Severity::Warning);
                assert_eq!(args.format, FormatKind::Json);
            }
            _ => panic!("expected tee"),
        }
    }
}
