pub mod memory;
pub mod postgrest;

use async_trait::async_trait;
use serde_json::Value;

/// Equality filter on a single column. The assembly engine never needs more:
/// every scoped read is "ownership column = caller id".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

/// A bounded, ordered, read-only query against one table of the hosted store.
#[derive(Debug, Clone)]
pub struct ReadQuery {
    pub table: String,
    pub select: Vec<String>,
    pub filter: Option<Filter>,
    pub order_by: String,
    pub descending: bool,
    pub limit: Option<usize>,
}

impl ReadQuery {
    pub fn new(table: impl Into<String>, select: &[&str]) -> Self {
        Self {
            table: table.into(),
            select: select.iter().map(|c| c.to_string()).collect(),
            filter: None,
            order_by: "created_at".to_string(),
            descending: true,
            limit: None,
        }
    }

    pub fn filter_eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter = Some(Filter {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    pub fn order_asc(mut self, column: impl Into<String>) -> Self {
        self.order_by = column.into();
        self.descending = false;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Errors from store reads.
///
/// The data fetcher absorbs all of these into an empty data block; only
/// configuration reads let them influence the response (a chatbot that cannot
/// be loaded is indistinguishable from one that does not exist).
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("transport: {0}")]
    Transport(String),

    #[error("store responded {status}: {body}")]
    Status { status: u16, body: String },

    #[error("decode: {0}")]
    Decode(String),
}

/// Read-only interface to the hosted relational store. The assembly engine
/// never writes through this interface.
#[async_trait]
pub trait StoreClient: Send + Sync {
    async fn read(&self, query: ReadQuery) -> Result<Vec<Value>, StoreError>;

    /// Single-row convenience: first row of a limit-1 read, or None.
    async fn read_one(&self, query: ReadQuery) -> Result<Option<Value>, StoreError> {
        let rows = self.read(query.limit(1)).await?;
        Ok(rows.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_displays_message() {
        let err = StoreError::Transport("connection refused".into());
        assert_eq!(err.to_string(), "transport: connection refused");
    }

    #[test]
    fn status_displays_code_and_body() {
        let err = StoreError::Status {
            status: 401,
            body: "bad key".into(),
        };
        assert_eq!(err.to_string(), "store responded 401: bad key");
    }

    #[test]
    fn decode_displays_message() {
        let err = StoreError::Decode("expected array".into());
        assert_eq!(err.to_string(), "decode: expected array");
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StoreError>();
    }

    #[test]
    fn read_query_builder() {
        let q = ReadQuery::new("tasks", &["id", "title"])
            .filter_eq("team_id", "t1")
            .limit(30);
        assert_eq!(q.table, "tasks");
        assert_eq!(q.select, vec!["id", "title"]);
        assert_eq!(
            q.filter,
            Some(Filter {
                column: "team_id".into(),
                value: "t1".into()
            })
        );
        assert_eq!(q.order_by, "created_at");
        assert!(q.descending);
        assert_eq!(q.limit, Some(30));
    }

    #[test]
    fn read_query_order_asc() {
        let q = ReadQuery::new("chatbot_flow_node_links", &["node_key"]).order_asc("order_index");
        assert_eq!(q.order_by, "order_index");
        assert!(!q.descending);
    }
}
