//! Syslog style severity levels

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Event severity, ordered from most to least severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Severity {
    /// System is unusable
    Emergency,
    /// Action must be taken immediately
    Alert,
    /// Critical conditions
    Critical,
    /// Runtime errors that need monitoring but no immediate action
    Error,
    /// Exceptional occurrences that are not errors
    Warning,
    /// Normal but significant events
    Notice,
    Info,
    Debug,
}

impl Severity {
    pub const ALL: [Severity; 8] = [
        Severity::Emergency,
        Severity::Alert,
        Severity::Critical,
        Severity::Error,
        Severity::Warning,
        Severity::Notice,
        Severity::Info,
        Severity::Debug,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Emergency => "EMERG",
            Severity::Alert => "ALERT",
            Severity::Critical => "CRIT",
            Severity::Error => "ERROR",
            Severity::Warning => "WARN",
            Severity::Notice => "NOTIC",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
        }
    }

    /// Check if an event of this severity passes a filter threshold
    pub fn passes(&self, threshold: Severity) -> bool {
        *self <= threshold
    }

    /// Check if a string names a severity (case-insensitive)
    pub fn is_valid(s: &str) -> bool {
        s.parse::<Severity>().is_ok()
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_uppercase();
        Severity::ALL
            .into_iter()
            .find(|sev| sev.as_str() == upper)
            .ok_or_else(|| Error::InvalidSeverity(s.to_string()))
    }
}

impl TryFrom<String> for Severity {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Severity> for String {
    fn from(sev: Severity) -> Self {
        sev.as_str().to_string()
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Debug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("warn".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!("Notic".parse::<Severity>().unwrap(), Severity::Notice);
        assert_eq!("EMERG".parse::<Severity>().unwrap(), Severity::Emergency);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            "WARNING".parse::<Severity>(),
            Err(Error::InvalidSeverity(_))
        ));
        assert!(!Severity::is_valid("verbose"));
    }

    #[test]
    fn test_display_round_trips_all_levels() {
        for sev in Severity::ALL {
            assert_eq!(sev.to_string().parse::<Severity>().unwrap(), sev);
        }
    }

    #[test]
    fn test_filter_threshold() {
        assert!(Severity::Error.passes(Severity::Warning));
        assert!(Severity::Warning.passes(Severity::Warning));
        assert!(!Severity::Info.passes(Severity::Warning));
        assert!(Severity::Debug.passes(Severity::default()));
    }

    #[test]
    fn test_serde_uses_display_strings() {
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"CRIT\"");
        let back: Severity = serde_json::from_str("\"info\"").unwrap();
        assert_eq!(back, Severity::Info);
    }
}
