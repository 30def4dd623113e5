//! Activity search filters.

use crate::activity::{ActivityStatus, ProcessingPurpose};
use custodia_backend::{Direction, Query};
use custodia_common_core::{TenantId, Timestamp};
use serde::{Deserialize, Serialize};

/// Table holding processing activities.
pub const ACTIVITY_TABLE: &str = "processing_activities";

/// Columns matched by free-text search.
pub const SEARCH_COLUMNS: [&str; 3] = ["name", "description", "department"];

/// Optional constraints for listing activities. Set fields are AND-combined;
/// unset fields impose nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityFilter {
    #[serde(default)]
    pub status: Option<ActivityStatus>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub purpose: Option<ProcessingPurpose>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub is_high_risk: Option<bool>,
    #[serde(default)]
    pub has_international_transfer: Option<bool>,
    #[serde(default)]
    pub created_from: Option<Timestamp>,
    #[serde(default)]
    pub created_to: Option<Timestamp>,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl ActivityFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: ActivityStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn purpose(mut self, purpose: ProcessingPurpose) -> Self {
        self.purpose = Some(purpose);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn high_risk(mut self, value: bool) -> Self {
        self.is_high_risk = Some(value);
        self
    }

    pub fn international_transfer(mut self, value: bool) -> Self {
        self.has_international_transfer = Some(value);
        self
    }

    /// Inclusive creation range.
    pub fn created_between(mut self, from: Option<Timestamp>, to: Option<Timestamp>) -> Self {
        self.created_from = from;
        self.created_to = to;
        self
    }

    pub fn page(mut self, offset: usize, limit: Option<usize>) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    /// Backend query for one tenant, newest first.
    pub fn to_query(&self, tenant: TenantId) -> Query {
        let mut query = Query::table(ACTIVITY_TABLE).eq("tenant_id", tenant.to_storage());

        if let Some(status) = self.status {
            query = query.eq("status", status.to_string());
        }
        if let Some(department) = self.department.as_deref().map(str::trim) {
            if !department.is_empty() {
                query = query.eq("department", department);
            }
        }
        if let Some(purpose) = self.purpose {
            query = query.eq("purpose", purpose.to_string());
        }
        if let Some(term) = &self.search {
            query = query.search(&SEARCH_COLUMNS, term);
        }
        if let Some(flag) = self.is_high_risk {
            query = query.eq("is_high_risk", flag);
        }
        if let Some(flag) = self.has_international_transfer {
            query = query.eq("has_international_transfer", flag);
        }
        if let Some(from) = self.created_from {
            query = query.gte("created_at", from.to_iso8601());
        }
        if let Some(to) = self.created_to {
            query = query.lte("created_at", to.to_iso8601());
        }

        query
            .order("created_at", Direction::Desc)
            .range(self.offset, self.limit)
    }
}
