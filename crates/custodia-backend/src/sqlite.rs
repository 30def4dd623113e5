//! SQLite backend storing rows as JSON documents.

use crate::{
    ensure_id, merge_row, BackendError, DataBackend, ProcedureRegistry, Query, Result, Row,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS records (
    table_name TEXT NOT NULL,
    id         TEXT NOT NULL,
    tenant_id  TEXT,
    body       TEXT NOT NULL,
    created_at TEXT,
    PRIMARY KEY (table_name, id)
);
CREATE INDEX IF NOT EXISTS idx_records_tenant ON records (table_name, tenant_id);
";

/// Backend persisting every table into a single SQLite `records` table.
///
/// Table name and tenant equality are evaluated in SQL; the remaining
/// predicates, ordering and paging run over the decoded rows.
#[derive(Clone)]
pub struct SqliteBackend {
    conn: Arc<Mutex<Connection>>,
    procedures: ProcedureRegistry,
}

impl SqliteBackend {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                BackendError::Unavailable(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }
        let conn = Connection::open(path)?;
        info!(path = %path.display(), "Opened SQLite backend");
        Self::with_connection(conn)
    }

    /// Database living only as long as the backend.
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            procedures: ProcedureRegistry::new(),
        })
    }

    /// Register a procedure callable through `rpc`.
    pub fn register_procedure<F>(&self, name: impl Into<String>, procedure: F)
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.procedures.register(name, procedure);
    }

    /// Decoded rows of a table, narrowed by tenant when the query pins one.
    fn candidates(conn: &Connection, query: &Query) -> Result<Vec<Row>> {
        let bodies: Vec<String> = match query.eq_str("tenant_id") {
            Some(tenant) => {
                let mut stmt = conn.prepare(
                    "SELECT body FROM records WHERE table_name = ?1 AND tenant_id = ?2
                     ORDER BY rowid",
                )?;
                let rows = stmt.query_map(params![query.table, tenant], |row| row.get(0))?;
                rows.collect::<rusqlite::Result<_>>()?
            }
            None => {
                let mut stmt = conn
                    .prepare("SELECT body FROM records WHERE table_name = ?1 ORDER BY rowid")?;
                let rows = stmt.query_map(params![query.table], |row| row.get(0))?;
                rows.collect::<rusqlite::Result<_>>()?
            }
        };

        bodies.iter().map(|body| decode(body)).collect()
    }
}

impl std::fmt::Debug for SqliteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBackend")
            .field("procedures", &self.procedures)
            .finish_non_exhaustive()
    }
}

fn decode(body: &str) -> Result<Row> {
    match serde_json::from_str::<Value>(body)? {
        Value::Object(row) => Ok(row),
        other => Err(BackendError::InvalidRow(format!("expected object, got {other}"))),
    }
}

fn text_field(row: &Row, field: &str) -> Option<String> {
    row.get(field).and_then(Value::as_str).map(str::to_string)
}

#[async_trait]
impl DataBackend for SqliteBackend {
    async fn select(&self, query: &Query) -> Result<Vec<Row>> {
        let conn = self.conn.lock();
        let rows = Self::candidates(&conn, query)?;
        Ok(query.apply(rows))
    }

    async fn count(&self, query: &Query) -> Result<u64> {
        let conn = self.conn.lock();
        let rows = Self::candidates(&conn, query)?;
        Ok(rows.iter().filter(|r| query.matches(r)).count() as u64)
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<Vec<Row>> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let mut stored = Vec::with_capacity(rows.len());

        for mut row in rows {
            let id = ensure_id(&mut row)?;
            let exists = tx
                .query_row(
                    "SELECT 1 FROM records WHERE table_name = ?1 AND id = ?2",
                    params![table, id],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            if exists {
                return Err(BackendError::InvalidRow(format!("duplicate id {id} in {table}")));
            }

            tx.execute(
                "INSERT INTO records (table_name, id, tenant_id, body, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    table,
                    id,
                    text_field(&row, "tenant_id"),
                    serde_json::to_string(&row)?,
                    text_field(&row, "created_at"),
                ],
            )?;
            stored.push(row);
        }

        tx.commit()?;
        debug!(table, count = stored.len(), "Inserted rows");
        Ok(stored)
    }

    async fn update(&self, query: &Query, patch: Row) -> Result<u64> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let matching: Vec<Row> = Self::candidates(&tx, query)?
            .into_iter()
            .filter(|r| query.matches(r))
            .collect();

        for mut row in matching.iter().cloned() {
            let id = ensure_id(&mut row)?;
            merge_row(&mut row, &patch);
            tx.execute(
                "UPDATE records SET body = ?3, tenant_id = ?4, created_at = ?5
                 WHERE table_name = ?1 AND id = ?2",
                params![
                    query.table,
                    id,
                    serde_json::to_string(&row)?,
                    text_field(&row, "tenant_id"),
                    text_field(&row, "created_at"),
                ],
            )?;
        }

        tx.commit()?;
        Ok(matching.len() as u64)
    }

    async fn delete(&self, query: &Query) -> Result<u64> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let ids: Vec<String> = Self::candidates(&tx, query)?
            .into_iter()
            .filter(|r| query.matches(r))
            .filter_map(|r| text_field(&r, "id"))
            .collect();

        for id in &ids {
            tx.execute(
                "DELETE FROM records WHERE table_name = ?1 AND id = ?2",
                params![query.table, id],
            )?;
        }

        tx.commit()?;
        Ok(ids.len() as u64)
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
    async fn test_tenant_pushdown_keeps_other_predicates() {
        let backend = SqliteBackend::in_memory().unwrap();
        backend
            .insert(
                "t",
                vec![
                    row(json!({"id": "1", "tenant_id": "a", "name": "x"})),
                    row(json!({"id": "2", "tenant_id": "a", "name": "y"})),
                    row(json!({"id": "3", "tenant_id": "b", "name": "x"})),
                ],
            )
            .await
            .unwrap();

        let q = Query::table("t").eq("tenant_id", "a").eq("name", "x");
        let rows = backend.select(&q).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], "1");
    }

    #[tokio::test]
    async fn test_update_moves_tenant_column() {
        let backend = SqliteBackend::in_memory().unwrap();
        backend
            .insert("t", vec![row(json!({"id": "1", "tenant_id": "a"}))])
            .await
            .unwrap();

        backend
            .update(&Query::table("t").eq("id", "1"), row(json!({"tenant_id": "b"})))
            .await
            .unwrap();

        assert_eq!(backend.count(&Query::table("t").eq("tenant_id", "b")).await.unwrap(), 1);
        assert_eq!(backend.count(&Query::table("t").eq("tenant_id", "a")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_insert_rolls_back() {
        let backend = SqliteBackend::in_memory().unwrap();
        let result = backend
            .insert("t", vec![row(json!({"id": "1"})), row(json!({"id": "1"}))])
            .await;

        assert!(matches!(result, Err(BackendError::InvalidRow(_))));
        assert_eq!(backend.count(&Query::table("t")).await.unwrap(), 0);
    }
}
