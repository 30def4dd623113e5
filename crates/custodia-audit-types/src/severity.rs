//! Audit event severity levels.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use strum::{Display, EnumString};

/// Severity level for audit events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AuditSeverity {
    /// Routine register reads and assessments.
    #[default]
    Info,
    Low,
    Medium,
    /// Suspensions, rejections and failed operations.
    High,
    Critical,
}

impl AuditSeverity {
    /// Numeric value for comparison (higher = more severe).
    pub fn level(&self) -> u8 {
        match self {
            Self::Info => 0,
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }

    /// Check if this severity meets a minimum threshold.
    pub fn meets_threshold(&self, threshold: Self) -> bool {
        self.level() >= threshold.level()
    }
}

impl PartialOrd for AuditSeverity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AuditSeverity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.level().cmp(&other.level())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn severity() -> impl Strategy<Value = AuditSeverity> {
        prop_oneof![
            Just(AuditSeverity::Info),
            Just(AuditSeverity::Low),
            Just(AuditSeverity::Medium),
            Just(AuditSeverity::High),
            Just(AuditSeverity::Critical),
        ]
    }

    #[test]
    fn test_ordering() {
        assert!(AuditSeverity::Critical > AuditSeverity::High);
        assert!(AuditSeverity::High.meets_threshold(AuditSeverity::Medium));
        assert!(!AuditSeverity::Info.meets_threshold(AuditSeverity::Low));
    }

    proptest! {
        #[test]
        fn threshold_agrees_with_ordering(a in severity(), b in severity()) {
            prop_assert_eq!(a.meets_threshold(b), a >= b);
        }
    }
}
