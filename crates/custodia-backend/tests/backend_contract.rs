//! Behaviour every bundled backend must share.

use custodia_backend::{
    BackendError, DataBackend, Direction, MemoryBackend, Query, Row, SqliteBackend,
};
use custodia_test_utils::{assert_err, assert_ok, temp_dir};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn row(value: Value) -> Row {
    value.as_object().cloned().unwrap()
}

fn seed() -> Vec<Row> {
    vec![
        row(json!({
            "id": "a1", "tenant_id": "tnt_a", "name": "Folha de pagamento",
            "department": "RH", "status": "active",
            "created_at": "2024-01-10T09:00:00Z"
        })),
        row(json!({
            "id": "a2", "tenant_id": "tnt_a", "name": "Campanha de e-mail",
            "department": "Marketing", "status": "under_review",
            "created_at": "2024-03-05T12:00:00-03:00"
        })),
        row(json!({
            "id": "a3", "tenant_id": "tnt_a", "name": "Controle de acesso",
            "department": null, "status": "suspended",
            "created_at": "2024-03-05T14:00:00Z"
        })),
        row(json!({
            "id": "b1", "tenant_id": "tnt_b", "name": "Folha de pagamento",
            "department": "RH", "status": "active",
            "created_at": "2024-02-01T00:00:00Z"
        })),
    ]
}

fn ids(rows: &[Row]) -> Vec<String> {
    rows.iter()
        .filter_map(|r| r.get("id").and_then(Value::as_str).map(String::from))
        .collect()
}

async fn exercise<B: DataBackend>(backend: B) {
    let stored = assert_ok!(backend.insert("activities", seed()).await);
    assert_eq!(stored.len(), 4);

    // Tenant isolation
    let tenant_a = Query::table("activities").eq("tenant_id", "tnt_a");
    assert_eq!(assert_ok!(backend.count(&tenant_a).await), 3);

    // Chronological order across offsets: a2 is 15:00Z, a3 is 14:00Z
    let ordered = assert_ok!(
        backend
            .select(&tenant_a.clone().order("created_at", Direction::Desc))
            .await
    );
    assert_eq!(ids(&ordered), vec!["a2", "a3", "a1"]);

    // Search is case-insensitive across columns
    let search = tenant_a
        .clone()
        .search(&["name", "department"], "marketing");
    assert_eq!(ids(&assert_ok!(backend.select(&search).await)), vec!["a2"]);

    // Range predicates
    let march = tenant_a
        .clone()
        .gte("created_at", "2024-03-01T00:00:00Z")
        .lte("created_at", "2024-03-31T23:59:59Z");
    assert_eq!(assert_ok!(backend.count(&march).await), 2);

    // Paging applies after ordering; count ignores paging
    let page = tenant_a
        .clone()
        .order("created_at", Direction::Desc)
        .range(1, Some(1));
    assert_eq!(ids(&assert_ok!(backend.select(&page).await)), vec!["a3"]);
    assert_eq!(assert_ok!(backend.count(&page).await), 3);

    // Shallow merge update
    let target = tenant_a.clone().eq("id", "a3");
    let patch = row(json!({"status": "active", "suspension_reason": null}));
    assert_eq!(assert_ok!(backend.update(&target, patch).await), 1);
    let updated = assert_ok!(backend.select(&target).await);
    assert_eq!(updated[0]["status"], "active");
    assert_eq!(updated[0]["name"], "Controle de acesso");

    // Updates never cross tenants
    let other = Query::table("activities").eq("tenant_id", "tnt_b").eq("id", "a1");
    assert_eq!(assert_ok!(backend.update(&other, Row::new()).await), 0);

    // Delete
    assert_eq!(assert_ok!(backend.delete(&target).await), 1);
    assert_eq!(assert_ok!(backend.count(&tenant_a).await), 2);

    // A batch repeating an id is rejected as a whole
    let repeated = vec![
        row(json!({"id": "c1", "tenant_id": "tnt_c"})),
        row(json!({"id": "c1", "tenant_id": "tnt_c"})),
    ];
    assert_err!(
        backend.insert("activities", repeated).await,
        BackendError::InvalidRow(_)
    );
    let tenant_c = Query::table("activities").eq("tenant_id", "tnt_c");
    assert_eq!(assert_ok!(backend.count(&tenant_c).await), 0);

    // Unknown procedures
    assert_err!(
        backend.rpc("recalculate", json!({})).await,
        BackendError::UnknownProcedure(_)
    );
}

#[tokio::test]
async fn memory_backend_contract() {
    exercise(MemoryBackend::new()).await;
}

#[tokio::test]
async fn sqlite_backend_contract() {
    let dir = temp_dir();
    let backend = assert_ok!(SqliteBackend::open(dir.path().join("data/custodia.db")));
    exercise(backend).await;
}

#[tokio::test]
async fn sqlite_backend_persists_between_opens() {
    let dir = temp_dir();
    let path = dir.path().join("custodia.db");

    {
        let backend = assert_ok!(SqliteBackend::open(&path));
        assert_ok!(backend.insert("activities", seed()).await);
    }

    let reopened = assert_ok!(SqliteBackend::open(&path));
    let rows = assert_ok!(reopened.select(&Query::table("activities")).await);
    assert_eq!(ids(&rows), vec!["a1", "a2", "a3", "b1"]);
}

#[tokio::test]
async fn shared_backend_through_arc() {
    let backend = std::sync::Arc::new(MemoryBackend::new());
    assert_ok!(backend.insert("activities", seed()).await);
    assert_eq!(backend.len("activities"), 4);
}
