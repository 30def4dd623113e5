//! Record of processing activities (RAT) report.

use crate::activity::{ActivityStatus, ProcessingActivity};
use crate::risk::{classify, DpiaAssessment, RiskLevel};
use custodia_common_core::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::IntoEnumIterator;

/// Which activities a report covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatReportOptions {
    /// Include activities still awaiting review.
    #[serde(default = "default_true")]
    pub include_under_review: bool,
    /// Restrict to one department.
    #[serde(default)]
    pub department: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for RatReportOptions {
    fn default() -> Self {
        Self {
            include_under_review: true,
            department: None,
        }
    }
}

impl RatReportOptions {
    pub fn department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn active_only(mut self) -> Self {
        self.include_under_review = false;
        self
    }

    fn admits(&self, activity: &ProcessingActivity) -> bool {
        let status_ok = match activity.status {
            ActivityStatus::Active => true,
            ActivityStatus::UnderReview => self.include_under_review,
            ActivityStatus::Suspended => false,
        };
        let department_ok = match self.department.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(wanted) => activity
                .department
                .as_deref()
                .is_some_and(|d| d.trim().eq_ignore_ascii_case(wanted)),
        };
        status_ok && department_ok
    }
}

/// One activity with its impact classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatEntry {
    pub activity: ProcessingActivity,
    pub assessment: DpiaAssessment,
}

/// Totals over the report entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatSummary {
    pub total: u64,
    pub requiring_dpia: u64,
    pub by_risk_level: BTreeMap<RiskLevel, u64>,
}

impl Default for RatSummary {
    fn default() -> Self {
        Self {
            total: 0,
            requiring_dpia: 0,
            by_risk_level: RiskLevel::iter().map(|level| (level, 0)).collect(),
        }
    }
}

/// The register as presented to a supervisory authority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatReport {
    pub generated_at: Timestamp,
    pub entries: Vec<RatEntry>,
    pub summary: RatSummary,
}

impl RatReport {
    /// Classify every admitted activity, keeping input order.
    pub fn build(
        activities: &[ProcessingActivity],
        options: &RatReportOptions,
        generated_at: Timestamp,
    ) -> Self {
        let mut summary = RatSummary::default();
        let entries: Vec<RatEntry> = activities
            .iter()
            .filter(|a| options.admits(a))
            .map(|activity| {
                let assessment = classify(activity);
                summary.total += 1;
                if assessment.requires_impact_assessment {
                    summary.requiring_dpia += 1;
                }
                *summary.by_risk_level.entry(assessment.risk_level).or_insert(0) += 1;
                RatEntry {
                    activity: activity.clone(),
                    assessment,
                }
            })
            .collect();

        Self {
            generated_at,
            entries,
            summary,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
