//! Table queries.

use crate::value::{compare_values, sort_order, values_equal};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// A stored record: a JSON object.
pub type Row = serde_json::Map<String, Value>;

/// A single condition on a row. Predicates in a query are AND-combined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    Eq { field: String, value: Value },
    Gte { field: String, value: Value },
    Lte { field: String, value: Value },
    /// Case-insensitive substring match on any of the columns.
    Search { columns: Vec<String>, term: String },
}

impl Predicate {
    /// Check whether a row satisfies this predicate.
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Self::Eq { field, value } => {
                let actual = row.get(field).unwrap_or(&Value::Null);
                values_equal(actual, value)
            }
            Self::Gte { field, value } => row
                .get(field)
                .and_then(|actual| compare_values(actual, value))
                .is_some_and(|ord| ord != Ordering::Less),
            Self::Lte { field, value } => row
                .get(field)
                .and_then(|actual| compare_values(actual, value))
                .is_some_and(|ord| ord != Ordering::Greater),
            Self::Search { columns, term } => {
                let needle = term.to_lowercase();
                columns.iter().any(|column| {
                    row.get(column)
                        .and_then(Value::as_str)
                        .is_some_and(|text| text.to_lowercase().contains(&needle))
                })
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub field: String,
    pub direction: Direction,
}

/// Query against one table.
///
/// ```
/// use custodia_backend::{Direction, Query};
///
/// let query = Query::table("processing_activities")
///     .eq("tenant_id", "tnt_1")
///     .search(&["name", "description"], "folha")
///     .order("created_at", Direction::Desc)
///     .range(0, Some(20));
/// assert_eq!(query.predicates.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub table: String,
    pub predicates: Vec<Predicate>,
    pub order: Option<Order>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl Query {
    /// Start a query on `table` with no constraints.
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            table: name.into(),
            predicates: Vec::new(),
            order: None,
            offset: 0,
            limit: None,
        }
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate::Eq {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn gte(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate::Gte {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn lte(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate::Lte {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Free-text search. A blank term adds no constraint.
    pub fn search(mut self, columns: &[&str], term: impl AsRef<str>) -> Self {
        let term = term.as_ref().trim();
        if !term.is_empty() {
            self.predicates.push(Predicate::Search {
                columns: columns.iter().map(|c| c.to_string()).collect(),
                term: term.to_string(),
            });
        }
        self
    }

    pub fn order(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order = Some(Order {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn range(mut self, offset: usize, limit: Option<usize>) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    /// Check whether a row satisfies every predicate.
    pub fn matches(&self, row: &Row) -> bool {
        self.predicates.iter().all(|p| p.matches(row))
    }

    /// String value of an equality predicate on `field`, if any.
    pub fn eq_str(&self, field: &str) -> Option<&str> {
        self.predicates.iter().find_map(|p| match p {
            Predicate::Eq { field: f, value } if f == field => value.as_str(),
            _ => None,
        })
    }

    /// Filter, order and page a set of rows.
    pub fn apply(&self, rows: impl IntoIterator<Item = Row>) -> Vec<Row> {
        let mut selected: Vec<Row> = rows.into_iter().filter(|r| self.matches(r)).collect();

        if let Some(order) = &self.order {
            let descending = order.direction == Direction::Desc;
            selected.sort_by(|a, b| sort_order(a.get(&order.field), b.get(&order.field), descending));
        }

        let paged = selected.into_iter().skip(self.offset);
        match self.limit {
            Some(limit) => paged.take(limit).collect(),
            None => paged.collect(),
        }
    }
}

/// Shallow merge of `patch` into `row`.
pub fn merge_row(row: &mut Row, patch: &Row) {
    for (key, value) in patch {
        row.insert(key.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            row(json!({"id": "1", "name": "Folha de pagamento", "dept": "RH", "created_at": "2024-01-10T00:00:00Z"})),
            row(json!({"id": "2", "name": "Campanha", "dept": "Marketing", "created_at": "2024-03-05T00:00:00Z"})),
            row(json!({"id": "3", "name": "Controle de acesso", "created_at": "2024-02-01T00:00:00Z"})),
        ]
    }

    fn ids(rows: &[Row]) -> Vec<&str> {
        rows.iter().filter_map(|r| r["id"].as_str()).collect()
    }

    #[test]
    fn test_empty_query_returns_everything() {
        assert_eq!(Query::table("t").apply(rows()).len(), 3);
    }

    #[test]
    fn test_eq_and_search_combine() {
        let q = Query::table("t").eq("dept", "RH").search(&["name"], "FOLHA");
        assert_eq!(ids(&q.apply(rows())), vec!["1"]);

        let q = Query::table("t").eq("dept", "RH").search(&["name"], "campanha");
        assert!(q.apply(rows()).is_empty());
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let q = Query::table("t").search(&["name"], "   ");
        assert!(q.predicates.is_empty());
    }

    #[test]
    fn test_date_range_and_order() {
        let q = Query::table("t")
            .gte("created_at", "2024-01-15T00:00:00Z")
            .lte("created_at", "2024-12-31T23:59:59Z")
            .order("created_at", Direction::Desc);
        assert_eq!(ids(&q.apply(rows())), vec!["2", "3"]);
    }

    #[test]
    fn test_range_pages_after_ordering() {
        let q = Query::table("t")
            .order("created_at", Direction::Asc)
            .range(1, Some(1));
        assert_eq!(ids(&q.apply(rows())), vec!["3"]);
    }

    #[test]
    fn test_eq_null_matches_missing_field() {
        let q = Query::table("t").eq("dept", Value::Null);
        assert_eq!(ids(&q.apply(rows())), vec!["3"]);
    }

    #[test]
    fn test_eq_str_lookup() {
        let q = Query::table("t").eq("tenant_id", "tnt_1").eq("status", "active");
        assert_eq!(q.eq_str("tenant_id"), Some("tnt_1"));
        assert_eq!(q.eq_str("missing"), None);
    }
}
