//! Dashboard statistics over a set of activities.

use crate::activity::{ActivityStatus, LegalBasis, ProcessingActivity, ProcessingPurpose};
use custodia_common_core::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary counts for the dashboard.
///
/// Enum-keyed maps always contain every variant, zero when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityStats {
    pub total: u64,
    pub by_status: BTreeMap<ActivityStatus, u64>,
    pub high_risk: u64,
    pub international_transfer: u64,
    pub by_department: BTreeMap<String, u64>,
    pub without_department: u64,
    pub by_purpose: BTreeMap<ProcessingPurpose, u64>,
    pub by_legal_basis: BTreeMap<LegalBasis, u64>,
    pub without_legal_basis: u64,
    pub created_this_month: u64,
}

impl Default for ActivityStats {
    fn default() -> Self {
        Self {
            total: 0,
            by_status: ActivityStatus::all().map(|s| (s, 0)).collect(),
            high_risk: 0,
            international_transfer: 0,
            by_department: BTreeMap::new(),
            without_department: 0,
            by_purpose: ProcessingPurpose::all().map(|p| (p, 0)).collect(),
            by_legal_basis: LegalBasis::all().map(|b| (b, 0)).collect(),
            without_legal_basis: 0,
            created_this_month: 0,
        }
    }
}

impl ActivityStats {
    pub fn status_count(&self, status: ActivityStatus) -> u64 {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

/// Count activities in a single pass.
///
/// Departments are grouped by their trimmed name; blank names count as
/// missing. "This month" is the UTC calendar month of `now`.
pub fn aggregate(activities: &[ProcessingActivity], now: Timestamp) -> ActivityStats {
    let mut stats = ActivityStats::default();

    for activity in activities {
        stats.total += 1;
        *stats.by_status.entry(activity.status).or_insert(0) += 1;
        *stats.by_purpose.entry(activity.purpose).or_insert(0) += 1;

        if activity.is_high_risk {
            stats.high_risk += 1;
        }
        if activity.has_international_transfer {
            stats.international_transfer += 1;
        }

        match activity
            .department
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
        {
            Some(department) => {
                *stats.by_department.entry(department.to_string()).or_insert(0) += 1;
            }
            None => stats.without_department += 1,
        }

        match activity.legal_basis {
            Some(basis) => *stats.by_legal_basis.entry(basis).or_insert(0) += 1,
            None => stats.without_legal_basis += 1,
        }

        if activity.created_at.same_month_as(&now) {
            stats.created_this_month += 1;
        }
    }

    stats
}

/// Statistics, or the reason they could not be computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StatsSnapshot {
    Available(ActivityStats),
    Unavailable { reason: String },
}

impl StatsSnapshot {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    pub fn stats(&self) -> Option<&ActivityStats> {
        match self {
            Self::Available(stats) => Some(stats),
            Self::Unavailable { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custodia_common_core::TenantId;
    use custodia_test_utils::utc_date;
    use proptest::prelude::*;

    fn activity(status: ActivityStatus, department: Option<&str>) -> ProcessingActivity {
        let mut a = ProcessingActivity::new(TenantId::new(), "a", "b", ProcessingPurpose::Payroll);
        a.status = status;
        a.department = department.map(String::from);
        a
    }

    #[test]
    fn test_empty_input_has_every_key() {
        let stats = aggregate(&[], Timestamp::now());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.by_status.len(), 3);
        assert_eq!(stats.by_purpose.len(), 15);
        assert_eq!(stats.by_legal_basis.len(), 10);
        assert!(stats.by_purpose.values().all(|v| *v == 0));
    }

    #[test]
    fn test_counts() {
        let now = Timestamp::from(utc_date(2024, 3, 15));
        let mut records = vec![
            activity(ActivityStatus::Active, Some("RH")),
            activity(ActivityStatus::Active, Some(" RH ")),
            activity(ActivityStatus::Suspended, None),
            activity(ActivityStatus::UnderReview, Some("")),
        ];
        records[0].is_high_risk = true;
        records[1].has_international_transfer = true;
        records[1].legal_basis = Some(LegalBasis::Contract);
        records[0].created_at = Timestamp::from(utc_date(2024, 3, 1));
        records[1].created_at = Timestamp::from(utc_date(2024, 2, 29));
        records[2].created_at = Timestamp::from(utc_date(2023, 3, 10));
        records[3].created_at = Timestamp::from(utc_date(2024, 3, 31));

        let stats = aggregate(&records, now);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.status_count(ActivityStatus::Active), 2);
        assert_eq!(stats.status_count(ActivityStatus::Suspended), 1);
        assert_eq!(stats.high_risk, 1);
        assert_eq!(stats.international_transfer, 1);
        assert_eq!(stats.by_department.get("RH"), Some(&2));
        assert_eq!(stats.without_department, 2);
        assert_eq!(stats.by_legal_basis[&LegalBasis::Contract], 1);
        assert_eq!(stats.without_legal_basis, 3);
        assert_eq!(stats.by_purpose[&ProcessingPurpose::Payroll], 4);
        assert_eq!(stats.created_this_month, 2);
    }

    #[test]
    fn test_snapshot_serialization() {
        let snapshot = StatsSnapshot::Unavailable {
            reason: "backend offline".into(),
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["state"], "unavailable");
        assert!(snapshot.stats().is_none());
    }

    fn status() -> impl Strategy<Value = ActivityStatus> {
        prop_oneof![
            Just(ActivityStatus::Active),
            Just(ActivityStatus::Suspended),
            Just(ActivityStatus::UnderReview),
        ]
    }

    proptest! {
        #[test]
        fn totals_are_consistent(
            entries in proptest::collection::vec(
                (status(), proptest::option::of(prop_oneof![Just("RH"), Just("TI"), Just("Jurídico")])),
                0..40,
            )
        ) {
            let records: Vec<_> = entries
                .iter()
                .map(|(s, d)| activity(*s, *d))
                .collect();
            let stats = aggregate(&records, Timestamp::now());

            prop_assert_eq!(stats.total, records.len() as u64);
            prop_assert_eq!(stats.by_status.values().sum::<u64>(), stats.total);
            prop_assert_eq!(
                stats.by_department.values().sum::<u64>() + stats.without_department,
                stats.total
            );
            prop_assert_eq!(stats.by_purpose.values().sum::<u64>(), stats.total);
            prop_assert_eq!(
                stats.by_legal_basis.values().sum::<u64>() + stats.without_legal_basis,
                stats.total
            );
        }

        #[test]
        fn aggregate_is_deterministic(count in 0usize..20) {
            let records: Vec<_> = (0..count)
                .map(|i| activity(ActivityStatus::Active, Some(if i % 2 == 0 { "RH" } else { "TI" })))
                .collect();
            let now = Timestamp::now();
            prop_assert_eq!(aggregate(&records, now), aggregate(&records, now));
        }
    }
}
