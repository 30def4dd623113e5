//! The processing activity register.

use crate::activity::{
    ActivityPatch, ActivityStatus, NewActivity, ProcessingActivity, ReviewStatus,
};
use crate::filter::{ActivityFilter, ACTIVITY_TABLE};
use crate::lifecycle::{apply_transition, InvalidTransition, LifecycleAction};
use crate::report::{RatReport, RatReportOptions};
use crate::risk::{classify, DpiaAssessment};
use crate::sanitize::{sanitize_optional, sanitize_text};
use crate::stats::{aggregate, StatsSnapshot};
use custodia_audit_capture::{AuditAction, AuditCapture, AuditEventBuilder, AuditTarget};
use custodia_backend::{BackendError, DataBackend, Query, Row};
use custodia_common_core::{ActivityId, SessionContext, Timestamp};
use custodia_common_log::spans::{backend_span, instrument_future, Timer};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

/// Errors returned by [`ActivityStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("processing activity not found: {0}")]
    NotFound(ActivityId),

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Reviewer decision on an activity under review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

/// Register settings.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Days from an approval to the next scheduled review.
    pub review_interval_days: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            review_interval_days: 365,
        }
    }
}

const LIFECYCLE_FIELDS: &[&str] = &[
    "status",
    "suspension_reason",
    "suspended_at",
    "updated_at",
    "updated_by",
];

const REVIEW_FIELDS: &[&str] = &[
    "review_status",
    "review_notes",
    "reviewed_by",
    "reviewed_at",
    "next_review_date",
];

const VALIDATION_FIELDS: &[&str] = &[
    "is_compliant",
    "validated_by",
    "validated_at",
    "validation_notes",
    "updated_at",
    "updated_by",
];

fn to_row<T: Serialize>(value: &T) -> StoreResult<Row> {
    match serde_json::to_value(value)? {
        Value::Object(row) => Ok(row),
        _ => Err(StoreError::Serialization(serde::ser::Error::custom(
            "expected a JSON object",
        ))),
    }
}

fn decode(row: Row) -> StoreResult<ProcessingActivity> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

fn pick(row: &Row, fields: &[&str]) -> Row {
    fields
        .iter()
        .filter_map(|f| row.get(*f).map(|v| (f.to_string(), v.clone())))
        .collect()
}

fn sanitize_set(values: &BTreeSet<String>) -> BTreeSet<String> {
    values
        .iter()
        .map(|v| sanitize_text(v))
        .filter(|v| !v.is_empty())
        .collect()
}

fn require_text(value: &str, field: &str) -> StoreResult<String> {
    let clean = sanitize_text(value);
    if clean.is_empty() {
        return Err(StoreError::validation(format!("{field} is required")));
    }
    Ok(clean)
}

/// Tenant-scoped register of processing activities.
///
/// Every call takes the caller's [`SessionContext`]; each backend query is
/// pinned to its effective tenant. Mutations emit audit events through the
/// non-blocking capture handle.
pub struct ActivityStore<B> {
    backend: B,
    audit: AuditCapture,
    config: StoreConfig,
}

impl<B: DataBackend> ActivityStore<B> {
    pub fn new(backend: B, audit: AuditCapture) -> Self {
        Self {
            backend,
            audit,
            config: StoreConfig::default(),
        }
    }

    pub fn with_config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn record_query(&self, ctx: &SessionContext, id: ActivityId) -> Query {
        Query::table(ACTIVITY_TABLE)
            .eq("tenant_id", ctx.effective_tenant().to_storage())
            .eq("id", id.to_storage())
    }

    fn event(&self, ctx: &SessionContext, action: AuditAction, id: ActivityId) -> AuditEventBuilder {
        self.audit
            .builder(action)
            .session(ctx)
            .target(AuditTarget::activity(id.to_storage()))
    }

    /// Log, audit and wrap a backend failure.
    fn backend_failure(
        &self,
        ctx: &SessionContext,
        operation: &'static str,
        action: AuditAction,
        target: Option<ActivityId>,
        err: BackendError,
    ) -> StoreError {
        error!(operation, %action, error = %err, "Backend operation failed");

        let mut builder = self
            .audit
            .builder(action)
            .session(ctx)
            .metadata("operation", operation)
            .failure(err.to_string());
        if let Some(id) = target {
            builder = builder.target(AuditTarget::activity(id.to_storage()));
        }
        self.audit.record(builder.build());

        StoreError::Backend(err)
    }

    async fn load(
        &self,
        ctx: &SessionContext,
        id: ActivityId,
        action: AuditAction,
    ) -> StoreResult<ProcessingActivity> {
        let query = self.record_query(ctx, id).range(0, Some(1));
        let rows = instrument_future(
            self.backend.select(&query),
            backend_span(ACTIVITY_TABLE, "select"),
        )
        .await
        .map_err(|e| self.backend_failure(ctx, "load", action, Some(id), e))?;

        match rows.into_iter().next() {
            Some(row) => decode(row),
            None => Err(StoreError::NotFound(id)),
        }
    }

    /// Write a subset of an activity's fields in one backend call.
    async fn write_fields(
        &self,
        ctx: &SessionContext,
        activity: &ProcessingActivity,
        fields: &[&[&str]],
        action: AuditAction,
    ) -> StoreResult<()> {
        let full = to_row(activity)?;
        let patch: Row = fields.iter().flat_map(|set| pick(&full, set)).collect();

        let affected = instrument_future(
            self.backend.update(&self.record_query(ctx, activity.id), patch),
            backend_span(ACTIVITY_TABLE, "update"),
        )
        .await
        .map_err(|e| self.backend_failure(ctx, "update", action.clone(), Some(activity.id), e))?;

        if affected == 0 {
            return Err(StoreError::NotFound(activity.id));
        }
        Ok(())
    }

    /// List activities matching `filter`, newest first.
    #[instrument(skip_all, fields(tenant = %ctx.effective_tenant()))]
    pub async fn fetch(
        &self,
        ctx: &SessionContext,
        filter: &ActivityFilter,
    ) -> StoreResult<Vec<ProcessingActivity>> {
        let timer = Timer::start("activity_fetch");
        let query = filter.to_query(ctx.effective_tenant());
        let rows = instrument_future(
            self.backend.select(&query),
            backend_span(ACTIVITY_TABLE, "select"),
        )
        .await
        .map_err(|e| self.backend_failure(ctx, "fetch", AuditAction::SystemError, None, e))?;

        let activities = rows.into_iter().map(decode).collect::<StoreResult<Vec<_>>>()?;
        debug!(count = activities.len(), "Fetched processing activities");
        timer.finish();
        Ok(activities)
    }

    /// One activity of the caller's tenant.
    #[instrument(skip_all, fields(tenant = %ctx.effective_tenant(), activity = %id))]
    pub async fn get(&self, ctx: &SessionContext, id: ActivityId) -> StoreResult<ProcessingActivity> {
        self.load(ctx, id, AuditAction::SystemError).await
    }

    /// Number of activities matching `filter`, ignoring paging.
    #[instrument(skip_all, fields(tenant = %ctx.effective_tenant()))]
    pub async fn count(&self, ctx: &SessionContext, filter: &ActivityFilter) -> StoreResult<u64> {
        let query = filter.to_query(ctx.effective_tenant());
        instrument_future(
            self.backend.count(&query),
            backend_span(ACTIVITY_TABLE, "count"),
        )
        .await
        .map_err(|e| self.backend_failure(ctx, "count", AuditAction::SystemError, None, e))
    }

    /// Register a new activity. It starts under review, pending approval.
    #[instrument(skip_all, fields(tenant = %ctx.effective_tenant()))]
    pub async fn create(&self, ctx: &SessionContext, input: NewActivity) -> StoreResult<ActivityId> {
        let name = require_text(&input.name, "name")?;
        let description = require_text(&input.description, "description")?;

        let mut activity =
            ProcessingActivity::new(ctx.effective_tenant(), name, description, input.purpose);
        activity.department = sanitize_optional(input.department.as_deref());
        activity.controller_name = sanitize_optional(input.controller_name.as_deref());
        activity.processor_name = sanitize_optional(input.processor_name.as_deref());
        activity.legal_basis = input.legal_basis;
        activity.data_categories = sanitize_set(&input.data_categories);
        activity.data_subjects = sanitize_set(&input.data_subjects);
        activity.is_high_risk = input.is_high_risk;
        activity.has_international_transfer = input.has_international_transfer;
        activity.created_by = Some(ctx.user_id);
        activity.updated_by = Some(ctx.user_id);

        let row = to_row(&activity)?;
        instrument_future(
            self.backend.insert(ACTIVITY_TABLE, vec![row]),
            backend_span(ACTIVITY_TABLE, "insert"),
        )
        .await
        .map_err(|e| {
            self.backend_failure(ctx, "create", AuditAction::ActivityCreated, Some(activity.id), e)
        })?;

        self.audit.record(
            self.event(ctx, AuditAction::ActivityCreated, activity.id)
                .metadata("name", &activity.name)
                .metadata("purpose", activity.purpose)
                .build(),
        );
        info!(activity = %activity.id, "Registered processing activity");
        Ok(activity.id)
    }

    /// Change descriptive and classification fields.
    #[instrument(skip_all, fields(tenant = %ctx.effective_tenant(), activity = %id))]
    pub async fn update(
        &self,
        ctx: &SessionContext,
        id: ActivityId,
        patch: ActivityPatch,
    ) -> StoreResult<()> {
        if patch.is_empty() {
            return Err(StoreError::validation("nothing to update"));
        }

        let mut patch = patch;
        if let Some(name) = &patch.name {
            patch.name = Some(require_text(name, "name")?);
        }
        if let Some(description) = &patch.description {
            patch.description = Some(require_text(description, "description")?);
        }
        for field in [
            &mut patch.department,
            &mut patch.controller_name,
            &mut patch.processor_name,
        ] {
            if let Some(value) = field.as_mut() {
                *value = sanitize_optional(value.as_deref());
            }
        }
        if let Some(categories) = &patch.data_categories {
            patch.data_categories = Some(sanitize_set(categories));
        }
        if let Some(subjects) = &patch.data_subjects {
            patch.data_subjects = Some(sanitize_set(subjects));
        }

        let mut row = to_row(&patch)?;
        let changed: Vec<String> = row.keys().cloned().collect();
        row.insert("updated_at".into(), serde_json::to_value(Timestamp::now())?);
        row.insert("updated_by".into(), serde_json::to_value(ctx.user_id)?);

        let affected = instrument_future(
            self.backend.update(&self.record_query(ctx, id), row),
            backend_span(ACTIVITY_TABLE, "update"),
        )
        .await
        .map_err(|e| self.backend_failure(ctx, "update", AuditAction::ActivityUpdated, Some(id), e))?;

        if affected == 0 {
            return Err(StoreError::NotFound(id));
        }

        self.audit.record(
            self.event(ctx, AuditAction::ActivityUpdated, id)
                .metadata("fields", &changed)
                .build(),
        );
        debug!(fields = ?changed, "Updated processing activity");
        Ok(())
    }

    /// Suspend an active activity.
    #[instrument(skip_all, fields(tenant = %ctx.effective_tenant(), activity = %id))]
    pub async fn suspend(&self, ctx: &SessionContext, id: ActivityId, reason: &str) -> StoreResult<()> {
        let reason = require_text(reason, "suspension reason")?;
        let mut activity = self.load(ctx, id, AuditAction::ActivitySuspended).await?;

        let now = Timestamp::now();
        apply_transition(
            &mut activity,
            &LifecycleAction::Suspend {
                reason: reason.clone(),
            },
            now,
        )?;
        activity.updated_by = Some(ctx.user_id);

        self.write_fields(ctx, &activity, &[LIFECYCLE_FIELDS], AuditAction::ActivitySuspended)
            .await?;

        self.audit.record(
            self.event(ctx, AuditAction::ActivitySuspended, id)
                .metadata("reason", &reason)
                .build(),
        );
        info!("Suspended processing activity");
        Ok(())
    }

    /// Return a suspended activity to active.
    ///
    /// Fails with [`StoreError::InvalidTransition`] when the activity is not
    /// suspended.
    #[instrument(skip_all, fields(tenant = %ctx.effective_tenant(), activity = %id))]
    pub async fn reactivate(&self, ctx: &SessionContext, id: ActivityId) -> StoreResult<()> {
        let mut activity = self.load(ctx, id, AuditAction::ActivityReactivated).await?;

        let previous_reason = activity.suspension_reason.clone();
        apply_transition(&mut activity, &LifecycleAction::Reactivate, Timestamp::now())?;
        activity.updated_by = Some(ctx.user_id);

        self.write_fields(ctx, &activity, &[LIFECYCLE_FIELDS], AuditAction::ActivityReactivated)
            .await?;

        self.audit.record(
            self.event(ctx, AuditAction::ActivityReactivated, id)
                .metadata("previous_reason", previous_reason)
                .build(),
        );
        info!("Reactivated processing activity");
        Ok(())
    }

    /// Approve or reject an activity under review.
    ///
    /// Rejection suspends the activity and requires notes, which become the
    /// suspension reason. Approval schedules the next review.
    #[instrument(skip_all, fields(tenant = %ctx.effective_tenant(), activity = %id, ?decision))]
    pub async fn review(
        &self,
        ctx: &SessionContext,
        id: ActivityId,
        decision: ReviewDecision,
        notes: Option<&str>,
    ) -> StoreResult<()> {
        let notes = sanitize_optional(notes);
        let (action, audit_action) = match decision {
            ReviewDecision::Approve => (LifecycleAction::Approve, AuditAction::ActivityApproved),
            ReviewDecision::Reject => {
                let reason = notes
                    .clone()
                    .ok_or_else(|| StoreError::validation("rejection requires notes"))?;
                (LifecycleAction::Reject { reason }, AuditAction::ActivityRejected)
            }
        };

        let mut activity = self.load(ctx, id, audit_action.clone()).await?;
        let now = Timestamp::now();
        apply_transition(&mut activity, &action, now)?;

        activity.review_status = match decision {
            ReviewDecision::Approve => ReviewStatus::Approved,
            ReviewDecision::Reject => ReviewStatus::Rejected,
        };
        activity.review_notes = notes.clone();
        activity.reviewed_by = Some(ctx.user_id);
        activity.reviewed_at = Some(now);
        activity.next_review_date = match decision {
            ReviewDecision::Approve => {
                Some(now.plus_days(i64::from(self.config.review_interval_days)))
            }
            ReviewDecision::Reject => None,
        };
        activity.updated_by = Some(ctx.user_id);

        self.write_fields(
            ctx,
            &activity,
            &[LIFECYCLE_FIELDS, REVIEW_FIELDS],
            audit_action.clone(),
        )
        .await?;

        self.audit.record(
            self.event(ctx, audit_action, id)
                .metadata("notes", notes)
                .metadata("next_review_date", activity.next_review_date)
                .build(),
        );
        info!(status = %activity.status, "Reviewed processing activity");
        Ok(())
    }

    /// Record a compliance validation. Status is unchanged.
    #[instrument(skip_all, fields(tenant = %ctx.effective_tenant(), activity = %id, is_compliant = is_compliant))]
    pub async fn validate(
        &self,
        ctx: &SessionContext,
        id: ActivityId,
        is_compliant: bool,
        notes: Option<&str>,
    ) -> StoreResult<()> {
        let mut activity = self.load(ctx, id, AuditAction::ActivityValidated).await?;

        let now = Timestamp::now();
        activity.is_compliant = Some(is_compliant);
        activity.validated_by = Some(ctx.user_id);
        activity.validated_at = Some(now);
        activity.validation_notes = sanitize_optional(notes);
        activity.updated_at = now;
        activity.updated_by = Some(ctx.user_id);

        self.write_fields(ctx, &activity, &[VALIDATION_FIELDS], AuditAction::ActivityValidated)
            .await?;

        self.audit.record(
            self.event(ctx, AuditAction::ActivityValidated, id)
                .metadata("is_compliant", is_compliant)
                .build(),
        );
        Ok(())
    }

    /// Classify one activity and record the evaluation.
    #[instrument(skip_all, fields(tenant = %ctx.effective_tenant(), activity = %id))]
    pub async fn evaluate_dpia(
        &self,
        ctx: &SessionContext,
        id: ActivityId,
    ) -> StoreResult<DpiaAssessment> {
        let activity = self
            .load(ctx, id, AuditAction::ImpactAssessmentEvaluated)
            .await?;
        let assessment = classify(&activity);

        self.audit.record(
            self.event(ctx, AuditAction::ImpactAssessmentEvaluated, id)
                .metadata("risk_level", assessment.risk_level)
                .metadata("requires_impact_assessment", assessment.requires_impact_assessment)
                .build(),
        );
        debug!(risk_level = %assessment.risk_level, "Evaluated DPIA");
        Ok(assessment)
    }

    /// Dashboard statistics for the caller's tenant.
    ///
    /// A failed fetch yields [`StatsSnapshot::Unavailable`].
    #[instrument(skip_all, fields(tenant = %ctx.effective_tenant()))]
    pub async fn stats(&self, ctx: &SessionContext) -> StatsSnapshot {
        match self.fetch(ctx, &ActivityFilter::default()).await {
            Ok(activities) => StatsSnapshot::Available(aggregate(&activities, Timestamp::now())),
            Err(e) => {
                warn!(error = %e, "Statistics unavailable");
                StatsSnapshot::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Build the record of processing activities (RAT).
    #[instrument(skip_all, fields(tenant = %ctx.effective_tenant()))]
    pub async fn rat_report(
        &self,
        ctx: &SessionContext,
        options: &RatReportOptions,
    ) -> StoreResult<RatReport> {
        let activities = self.fetch(ctx, &ActivityFilter::default()).await?;
        let report = RatReport::build(&activities, options, Timestamp::now());

        self.audit.record(
            self.audit
                .builder(AuditAction::RegisterReportGenerated)
                .session(ctx)
                .metadata("entries", report.summary.total)
                .metadata("requiring_dpia", report.summary.requiring_dpia)
                .build(),
        );
        Ok(report)
    }

    /// Audit a finished export of `records` rows.
    pub fn record_export(&self, ctx: &SessionContext, subject: &str, format: &str, records: usize) {
        self.audit.record(
            self.audit
                .builder(AuditAction::DataExported)
                .session(ctx)
                .metadata("subject", subject)
                .metadata("format", format)
                .metadata("records", records)
                .build(),
        );
        info!(subject, format, records, "Exported register data");
    }

    /// Activities due for periodic review at `now`.
    #[instrument(skip_all, fields(tenant = %ctx.effective_tenant()))]
    pub async fn due_for_review(
        &self,
        ctx: &SessionContext,
        now: Timestamp,
    ) -> StoreResult<Vec<ProcessingActivity>> {
        let active = self
            .fetch(ctx, &ActivityFilter::new().status(ActivityStatus::Active))
            .await?;
        Ok(active
            .into_iter()
            .filter(|a| a.next_review_date.is_some_and(|due| due <= now))
            .collect())
    }
}
