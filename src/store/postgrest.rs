use async_trait::async_trait;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Client;
use serde_json::Value;

use super::{ReadQuery, StoreClient, StoreError};

/// HTTP client for a PostgREST-style hosted store. All requests carry the
/// service-role key; row scoping happens in the scope resolver, not here.
pub struct PostgrestStore {
    client: Client,
    base_url: String,
    service_key: String,
}

impl PostgrestStore {
    pub fn new(client: Client, base_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            service_key: service_key.into(),
        }
    }

    fn url_for(&self, query: &ReadQuery) -> String {
        build_url(&self.base_url, query)
    }
}

/// Render a ReadQuery as a PostgREST URL. Filter values are percent-encoded;
/// column names come from the static catalogue and are passed through.
fn build_url(base_url: &str, query: &ReadQuery) -> String {
    let mut url = format!(
        "{}/{}?select={}",
        base_url,
        query.table,
        query.select.join(",")
    );
    if let Some(filter) = &query.filter {
        let value = utf8_percent_encode(&filter.value, NON_ALPHANUMERIC);
        url.push_str(&format!("&{}=eq.{}", filter.column, value));
    }
    let direction = if query.descending { "desc" } else { "asc" };
    url.push_str(&format!("&order={}.{}", query.order_by, direction));
    if let Some(limit) = query.limit {
        url.push_str(&format!("&limit={limit}"));
    }
    url
}

#[async_trait]
impl StoreClient for PostgrestStore {
    async fn read(&self, query: ReadQuery) -> Result<Vec<Value>, StoreError> {
        let url = self.url_for(&query);
        let resp = self
            .client
            .get(&url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<Vec<Value>>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}
