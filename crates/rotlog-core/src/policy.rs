//! File rotation policies

use std::time::Duration;

/// The rotation strategy attached to a file stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationPolicy {
    /// A single file that never rotates
    None,
    /// Rotates at local midnight
    Daily,
    /// Rotates every `cycle`
    TimeLimit(Duration),
    /// Rotates before the file grows past the limit (bytes)
    FileSize(u64),
    /// Reserved for writers that implement their own strategy
    Custom(u8),
}

impl RotationPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RotationPolicy::None => "PolicyNone",
            RotationPolicy::Daily => "PolicyDaily",
            RotationPolicy::TimeLimit(_) => "PolicyTimeLimit",
            RotationPolicy::FileSize(_) => "PolicyFileSize",
            RotationPolicy::Custom(_) => "PolicyCustom",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, RotationPolicy::None)
    }

    pub fn is_daily(&self) -> bool {
        matches!(self, RotationPolicy::Daily)
    }

    pub fn is_timed(&self) -> bool {
        matches!(self, RotationPolicy::TimeLimit(_))
    }

    pub fn is_size_limited(&self) -> bool {
        matches!(self, RotationPolicy::FileSize(_))
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, RotationPolicy::Custom(_))
    }

    /// Rotation cycle for time based policies
    pub fn cycle(&self) -> Option<Duration> {
        match self {
            RotationPolicy::Daily => Some(Duration::from_secs(crate::DAILY_CYCLE_SECS)),
            RotationPolicy::TimeLimit(cycle) => Some(*cycle),
            _ => None,
        }
    }

    /// Size limit for the size based policy
    pub fn size_limit(&self) -> Option<u64> {
        match self {
            RotationPolicy::FileSize(limit) => Some(*limit),
            _ => None,
        }
    }
}

impl std::fmt::Display for RotationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all() -> Vec<RotationPolicy> {
        vec![
            RotationPolicy::None,
            RotationPolicy::Daily,
            RotationPolicy::TimeLimit(Duration::from_secs(60)),
            RotationPolicy::FileSize(crate::LOG_MIN_FILE_SIZE),
            RotationPolicy::Custom(1),
        ]
    }

    #[test]
    fn test_each_predicate_matches_one_variant() {
        for policy in all() {
            let hits = [
                policy.is_none(),
                policy.is_daily(),
                policy.is_timed(),
                policy.is_size_limited(),
                policy.is_custom(),
            ];
            assert_eq!(hits.iter().filter(|h| **h).count(), 1, "{policy}");
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(RotationPolicy::None.to_string(), "PolicyNone");
        assert_eq!(RotationPolicy::Daily.to_string(), "PolicyDaily");
        assert_eq!(
            RotationPolicy::TimeLimit(Duration::from_secs(1)).to_string(),
            "PolicyTimeLimit"
        );
        assert_eq!(RotationPolicy::FileSize(1).to_string(), "PolicyFileSize");
    }

    #[test]
    fn test_cycle_and_limit() {
        assert_eq!(
            RotationPolicy::Daily.cycle(),
            Some(Duration::from_secs(86_400))
        );
        assert_eq!(RotationPolicy::None.cycle(), None);
        assert_eq!(RotationPolicy::FileSize(42).size_limit(), Some(42));
        assert_eq!(RotationPolicy::Daily.size_limit(), None);
    }
}
