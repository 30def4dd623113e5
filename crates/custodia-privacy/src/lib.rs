//! LGPD processing activity register.
//!
//! An organization declares each purpose for which it processes personal
//! data as a [`ProcessingActivity`]. This crate provides:
//!
//! - [`ActivityStore`]: tenant-scoped CRUD and lifecycle over any
//!   [`DataBackend`](custodia_backend::DataBackend), with audit capture.
//! - [`classify`]: the data protection impact assessment (RIPD/DPIA) heuristic.
//! - [`aggregate`]: dashboard statistics.
//! - [`RatReport`]: the record of processing activities.

mod activity;
mod export;
mod filter;
mod lifecycle;
mod outcome;
mod report;
mod risk;
mod sanitize;
mod stats;
mod store;

pub use activity::{
    ActivityPatch, ActivityStatus, LegalBasis, NewActivity, ProcessingActivity,
    ProcessingPurpose, ReviewStatus,
};
pub use filter::{ActivityFilter, ACTIVITY_TABLE, SEARCH_COLUMNS};
pub use lifecycle::{apply_transition, transition, InvalidTransition, LifecycleAction};
pub use outcome::OperationOutcome;
pub use report::{RatEntry, RatReport, RatReportOptions, RatSummary};
pub use risk::{
    classify, DpiaAssessment, RiskFactor, RiskLevel, RECOMMEND_DPIA, RECOMMEND_MAINTAIN,
    RECOMMEND_MONITORING,
};
pub use sanitize::{sanitize_optional, sanitize_text};
pub use stats::{aggregate, ActivityStats, StatsSnapshot};
pub use store::{ActivityStore, ReviewDecision, StoreConfig, StoreError, StoreResult};
