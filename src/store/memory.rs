use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{ReadQuery, StoreClient, StoreError};

/// In-process table store with the same filter/order/limit semantics as the
/// hosted store. Backs local development (loaded from a YAML fixture file)
/// and tests. Reading a table that was never seeded yields zero rows.
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// Load a fixture file mapping table names to row lists:
    ///
    /// ```yaml
    /// chatbots:
    ///   - id: support-bot
    ///     name: Support Bot
    /// tasks:
    ///   - { id: "1", title: "Ship it", team_id: t1 }
    /// ```
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read fixtures file {}", path.display()))?;
        let tables: HashMap<String, Vec<Value>> = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse fixtures file {}", path.display()))?;
        tracing::info!(
            tables = tables.len(),
            rows = tables.values().map(Vec::len).sum::<usize>(),
            "loaded store fixtures"
        );
        Ok(Self {
            tables: RwLock::new(tables),
        })
    }

    pub async fn insert(&self, table: &str, row: Value) {
        self.tables
            .write()
            .await
            .entry(table.to_string())
            .or_default()
            .push(row);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn matches_filter(row: &Value, column: &str, value: &str) -> bool {
    match row.get(column) {
        Some(Value::String(s)) => s == value,
        Some(Value::Number(n)) => n.to_string() == value,
        Some(Value::Bool(b)) => b.to_string() == value,
        _ => false,
    }
}

/// Column comparison mirroring how the hosted store orders: timestamps as
/// instants, numbers numerically, everything else lexicographically.
/// Rows missing the column sort first.
fn compare_column(a: &Value, b: &Value, column: &str) -> Ordering {
    let (a, b) = match (a.get(column), b.get(column)) {
        (Some(a), Some(b)) => (a, b),
        (Some(_), None) => return Ordering::Greater,
        (None, Some(_)) => return Ordering::Less,
        (None, None) => return Ordering::Equal,
    };
    let as_instant = |v: &Value| {
        v.as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    };
    if let (Some(a), Some(b)) = (as_instant(a), as_instant(b)) {
        return a.cmp(&b);
    }
    if let (Some(a), Some(b)) = (a.as_f64(), b.as_f64()) {
        return a.partial_cmp(&b).unwrap_or(Ordering::Equal);
    }
    match (a.as_str(), b.as_str()) {
        (Some(a), Some(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

fn project(row: &Value, select: &[String]) -> Value {
    let Some(object) = row.as_object() else {
        return row.clone();
    };
    let projected: serde_json::Map<String, Value> = select
        .iter()
        .filter_map(|col| object.get(col).map(|v| (col.clone(), v.clone())))
        .collect();
    Value::Object(projected)
}

#[async_trait]
impl StoreClient for MemoryStore {
    async fn read(&self, query: ReadQuery) -> Result<Vec<Value>, StoreError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Value> = tables
            .get(&query.table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| match &query.filter {
                        Some(f) => matches_filter(row, &f.column, &f.value),
                        None => true,
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        rows.sort_by(|a, b| {
            let ord = compare_column(a, b, &query.order_by);
            if query.descending { ord.reverse() } else { ord }
        });

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        Ok(rows.iter().map(|row| project(row, &query.select)).collect())
    }
}
