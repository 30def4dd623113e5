//! In-process backend.

use crate::{
    ensure_id, merge_row, BackendError, DataBackend, ProcedureRegistry, Query, Result, Row,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Backend keeping every table in memory.
///
/// Tables are created on first insert. Row order within a table is
/// insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    tables: Arc<RwLock<HashMap<String, Vec<Row>>>>,
    procedures: ProcedureRegistry,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a procedure callable through `rpc`.
    pub fn register_procedure<F>(&self, name: impl Into<String>, procedure: F)
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.procedures.register(name, procedure);
    }

    /// Copy of every row in a table.
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.tables.read().get(table).cloned().unwrap_or_default()
    }

    /// Number of rows in a table.
    pub fn len(&self, table: &str) -> usize {
        self.tables.read().get(table).map_or(0, Vec::len)
    }

    pub fn is_empty(&self, table: &str) -> bool {
        self.len(table) == 0
    }
}

#[async_trait]
impl DataBackend for MemoryBackend {
    async fn select(&self, query: &Query) -> Result<Vec<Row>> {
        let tables = self.tables.read();
        let rows = tables.get(&query.table).map(|rows| rows.iter().cloned());
        Ok(rows.map(|rows| query.apply(rows)).unwrap_or_default())
    }

    async fn count(&self, query: &Query) -> Result<u64> {
        let tables = self.tables.read();
        let count = tables
            .get(&query.table)
            .map_or(0, |rows| rows.iter().filter(|r| query.matches(r)).count());
        Ok(count as u64)
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>> {
        let mut prepared = Vec::with_capacity(rows.len());
        for mut row in rows {
            ensure_id(&mut row)?;
            prepared.push(row);
        }

        let mut tables = self.tables.write();
        let stored = tables.entry(table.to_string()).or_default();
        for (index, row) in prepared.iter().enumerate() {
            let duplicate = stored
                .iter()
                .chain(&prepared[..index])
                .any(|existing| existing.get("id") == row.get("id"));
            if duplicate {
                return Err(BackendError::InvalidRow(format!(
                    "duplicate id {} in {}",
                    row.get("id").unwrap_or(&Value::Null),
                    table
                )));
            }
        }
        stored.extend(prepared.iter().cloned());
        debug!(table, count = prepared.len(), "Inserted rows");
        Ok(prepared)
    }

    async fn update(&self, query: &Query, patch: Row) -> Result<u64> {
        let mut tables = self.tables.write();
        let Some(rows) = tables.get_mut(&query.table) else {
            return Ok(0);
        };

        let mut affected = 0;
        for row in rows.iter_mut().filter(|r| query.matches(r)) {
            merge_row(row, &patch);
            affected += 1;
        }
        Ok(affected)
    }

    async fn delete(&self, query: &Query) -> Result<u64> {
        let mut tables = self.tables.write();
        let Some(rows) = tables.get_mut(&query.table) else {
            return Ok(0);
        };

        let before = rows.len();
        rows.retain(|r| !query.matches(r));
        Ok((before - rows.len()) as u64)
    }

    async fn rpc(&self, name: &str, params: Value) -> Result<Value> {
        self.procedures.call(name, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_insert_generates_ids() {
        let backend = MemoryBackend::new();
        let stored = backend
            .insert("t", vec![row(json!({"name": "a"}))])
            .await
            .unwrap();

        assert!(stored[0]["id"].is_string());
        assert_eq!(backend.len("t"), 1);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let backend = MemoryBackend::new();
        backend.insert("t", vec![row(json!({"id": "x"}))]).await.unwrap();

        let result = backend.insert("t", vec![row(json!({"id": "x"}))]).await;
        assert!(matches!(result, Err(BackendError::InvalidRow(_))));
        assert_eq!(backend.len("t"), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_counts() {
        let backend = MemoryBackend::new();
        backend
            .insert(
                "t",
                vec![
                    row(json!({"id": "1", "tenant_id": "a", "status": "active"})),
                    row(json!({"id": "2", "tenant_id": "a", "status": "active"})),
                    row(json!({"id": "3", "tenant_id": "b", "status": "active"})),
                ],
            )
            .await
            .unwrap();

        let q = Query::table("t").eq("tenant_id", "a");
        let affected = backend
            .update(&q, row(json!({"status": "suspended"})))
            .await
            .unwrap();
        assert_eq!(affected, 2);
        assert_eq!(
            backend.count(&Query::table("t").eq("status", "suspended")).await.unwrap(),
            2
        );

        assert_eq!(backend.delete(&q).await.unwrap(), 2);
        assert_eq!(backend.len("t"), 1);
    }

    #[tokio::test]
    async fn test_missing_table_is_empty() {
        let backend = MemoryBackend::new();
        let q = Query::table("nothing");
        assert!(backend.select(&q).await.unwrap().is_empty());
        assert_eq!(backend.count(&q).await.unwrap(), 0);
        assert_eq!(backend.update(&q, Row::new()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rpc() {
        let backend = MemoryBackend::new();
        backend.register_procedure("double", |params| {
            let n = params.as_i64().ok_or_else(|| BackendError::Procedure {
                name: "double".into(),
                message: "expected a number".into(),
            })?;
            Ok(json!(n * 2))
        });

        assert_eq!(backend.rpc("double", json!(21)).await.unwrap(), json!(42));
        assert!(matches!(
            backend.rpc("triple", json!(1)).await,
            Err(BackendError::UnknownProcedure(_))
        ));
    }
}
