use std::time::Duration;

use serde_json::Value;

use super::UserContext;
use super::datasources::data_source_config;
use super::scope::{FilterDecision, Scope, resolve_filter};
use crate::store::{ReadQuery, StoreClient};

/// Cap on rows included in a prompt per data source.
pub const MAX_DATA_ROWS: usize = 30;

/// Per-fetch timeout; a slow store read degrades like a failed one.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const NO_ROWS_SENTINEL: &str = "(No rows for this context)";

/// Outcome of one data access node's fetch. `Skipped` (no query was made —
/// unknown source, unsatisfiable scope, or a store failure) contributes
/// nothing to the prompt; `Empty` (query ran, zero rows) renders an explicit
/// sentinel. The two are distinguishable in the admin explainability view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataBlock {
    Skipped,
    Empty,
    Rows(String),
}

impl DataBlock {
    /// Text for the prompt's data sub-section, if this block contributes one.
    pub fn prompt_text(&self) -> Option<&str> {
        match self {
            DataBlock::Skipped => None,
            DataBlock::Empty => Some(NO_ROWS_SENTINEL),
            DataBlock::Rows(rows) => Some(rows),
        }
    }
}

/// Run the scoped, bounded read for one data source. Store failures and
/// timeouts are absorbed: one bad source must not break the whole prompt.
pub async fn fetch_data_for_source(
    store: &dyn StoreClient,
    data_source: &str,
    scope: Scope,
    context: &UserContext,
) -> DataBlock {
    let Some(config) = data_source_config(data_source) else {
        tracing::debug!(data_source, "data source not in catalogue, skipping fetch");
        return DataBlock::Skipped;
    };

    let mut query = ReadQuery::new(config.table, config.select).limit(MAX_DATA_ROWS);
    match resolve_filter(config, scope, context) {
        FilterDecision::Unfiltered => {}
        FilterDecision::ByColumn { column, value } => {
            query = query.filter_eq(column, value);
        }
        FilterDecision::Deny => return DataBlock::Skipped,
    }

    let rows = match tokio::time::timeout(FETCH_TIMEOUT, store.read(query)).await {
        Ok(Ok(rows)) => rows,
        Ok(Err(e)) => {
            tracing::warn!(data_source, error = %e, "data fetch failed");
            return DataBlock::Skipped;
        }
        Err(_) => {
            tracing::warn!(data_source, "data fetch timed out");
            return DataBlock::Skipped;
        }
    };

    if rows.is_empty() {
        return DataBlock::Empty;
    }
    match serde_json::to_string_pretty(&Value::Array(rows)) {
        Ok(serialized) => DataBlock::Rows(serialized),
        Err(e) => {
            tracing::warn!(data_source, error = %e, "failed to serialize fetched rows");
            DataBlock::Skipped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use crate::store::{ReadQuery, StoreError};
    use async_trait::async_trait;
    use serde_json::json;

    struct FailingStore;

    #[async_trait]
    impl StoreClient for FailingStore {
        async fn read(&self, _query: ReadQuery) -> Result<Vec<Value>, StoreError> {
            Err(StoreError::Transport("connection reset".into()))
        }
    }

    fn ctx(user_id: Option<&str>, team_id: Option<&str>) -> UserContext {
        UserContext::new(user_id.map(String::from), team_id.map(String::from))
    }

    async fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .insert(
                "tasks",
                json!({ "id": "1", "title": "Review SOPs", "team_id": "t1", "created_at": "2026-01-02T00:00:00Z" }),
            )
            .await;
        store
            .insert(
                "tasks",
                json!({ "id": "2", "title": "Call supplier", "team_id": "t2", "created_at": "2026-01-03T00:00:00Z" }),
            )
            .await;
        store
    }

    #[tokio::test]
    async fn fetches_team_scoped_rows() {
        let store = seeded_store().await;
        let block = fetch_data_for_source(
            &store,
            "tasks",
            Scope::TeamSpecific,
            &ctx(Some("u1"), Some("t1")),
        )
        .await;
        let DataBlock::Rows(rows) = block else {
            panic!("expected rows, got {block:?}");
        };
        assert!(rows.contains("Review SOPs"));
        assert!(!rows.contains("Call supplier"));
    }

    #[tokio::test]
    async fn zero_rows_is_empty_not_skipped() {
        let store = seeded_store().await;
        let block = fetch_data_for_source(
            &store,
            "tasks",
            Scope::TeamSpecific,
            &ctx(Some("u1"), Some("t-unknown")),
        )
        .await;
        assert_eq!(block, DataBlock::Empty);
        assert_eq!(block.prompt_text(), Some("(No rows for this context)"));
    }

    #[tokio::test]
    async fn unsatisfiable_scope_never_queries() {
        let store = seeded_store().await;
        let block =
            fetch_data_for_source(&store, "tasks", Scope::UserSpecific, &ctx(None, Some("t1")))
                .await;
        assert_eq!(block, DataBlock::Skipped);
        assert_eq!(block.prompt_text(), None);
    }

    #[tokio::test]
    async fn unknown_source_is_skipped() {
        let store = seeded_store().await;
        let block = fetch_data_for_source(
            &store,
            "crm_contacts",
            Scope::All,
            &ctx(Some("u1"), Some("t1")),
        )
        .await;
        assert_eq!(block, DataBlock::Skipped);
    }

    #[tokio::test]
    async fn store_failure_degrades_to_skipped() {
        let block = fetch_data_for_source(
            &FailingStore,
            "tasks",
            Scope::TeamSpecific,
            &ctx(Some("u1"), Some("t1")),
        )
        .await;
        assert_eq!(block, DataBlock::Skipped);
    }

    #[tokio::test]
    async fn all_scope_reads_every_row() {
        let store = seeded_store().await;
        let block =
            fetch_data_for_source(&store, "tasks", Scope::All, &UserContext::empty()).await;
        let DataBlock::Rows(rows) = block else {
            panic!("expected rows, got {block:?}");
        };
        assert!(rows.contains("Review SOPs"));
        assert!(rows.contains("Call supplier"));
    }
}
