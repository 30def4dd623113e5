//! Data backends for the Custodia register.
//!
//! The register talks to storage through the [`DataBackend`] trait: a small
//! table-oriented contract of select, count, insert, update, delete and
//! named procedures over JSON rows. Two implementations ship here:
//!
//! - [`MemoryBackend`] keeps tables in process, for tests and ephemeral use.
//! - [`SqliteBackend`] stores rows as JSON documents in a SQLite file.
//!
//! [`BackendAuditSink`] persists captured audit events into the
//! `audit_logs` table of any backend.

mod audit_sink;
mod error;
mod memory;
mod procedure;
mod query;
mod sqlite;
mod value;

pub use audit_sink::{BackendAuditSink, AUDIT_TABLE};
pub use error::{BackendError, Result};
pub use memory::MemoryBackend;
pub use procedure::{Procedure, ProcedureRegistry};
pub use query::{merge_row, Direction, Order, Predicate, Query, Row};
pub use sqlite::SqliteBackend;
pub use value::{compare_values, values_equal};

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Table-oriented storage used by the register.
///
/// Tenant scoping is the caller's job: every query the register issues
/// carries a `tenant_id` equality predicate.
#[async_trait]
pub trait DataBackend: Send + Sync {
    /// Rows matching the query, ordered and paged.
    async fn select(&self, query: &Query) -> Result<Vec<Row>>;

    /// Number of rows matching the query predicates. Paging is ignored.
    async fn count(&self, query: &Query) -> Result<u64>;

    /// Insert rows and return them as stored.
    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>>;

    /// Merge `patch` into every matching row; returns rows affected.
    async fn update(&self, query: &Query, patch: Row) -> Result<u64>;

    /// Delete every matching row; returns rows affected.
    async fn delete(&self, query: &Query) -> Result<u64>;

    /// Call a named procedure.
    async fn rpc(&self, name: &str, params: Value) -> Result<Value>;
}

#[async_trait]
impl<T: DataBackend + ?Sized> DataBackend for Arc<T> {
    async fn select(&self, query: &Query) -> Result<Vec<Row>> {
        (**self).select(query).await
    }

    async fn count(&self, query: &Query) -> Result<u64> {
        (**self).count(query).await
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>> {
        (**self).insert(table, rows).await
    }

    async fn update(&self, query: &Query, patch: Row) -> Result<u64> {
        (**self).update(query, patch).await
    }

    async fn delete(&self, query: &Query) -> Result<u64> {
        (**self).delete(query).await
    }

    async fn rpc(&self, name: &str, params: Value) -> Result<Value> {
        (**self).rpc(name, params).await
    }
}

/// Ensure a row carries a string `id`, generating one when absent.
pub(crate) fn ensure_id(row: &mut Row) -> Result<String> {
    match row.get("id") {
        Some(Value::String(id)) if !id.trim().is_empty() => Ok(id.clone()),
        None | Some(Value::Null) => {
            let id = uuid::Uuid::new_v4().to_string();
            row.insert("id".to_string(), Value::String(id.clone()));
            Ok(id)
        }
        Some(other) => Err(BackendError::InvalidRow(format!(
            "id must be a non-empty string, got {other}"
        ))),
    }
}
