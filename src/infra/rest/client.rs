//! Reqwest-backed client for the relational store's REST surface.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use super::query::{parse_content_range, Query};
use crate::config::{Config, REST_PATH};
use crate::domain::Table;
use crate::errors::{AppError, AppResult};

/// Raw outcome of one store call, passed through to clients.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct QueryResult {
    #[schema(value_type = Object)]
    pub data: Value,
    pub count: Option<u64>,
    pub status: u16,
}

impl QueryResult {
    pub fn new(data: Value, count: Option<u64>, status: u16) -> Self {
        Self {
            data,
            count,
            status,
        }
    }

    /// Rows as a slice; non-array payloads read as empty.
    pub fn rows(&self) -> &[Value] {
        self.data.as_array().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn into_rows(self) -> Vec<Value> {
        match self.data {
            Value::Array(rows) => rows,
            _ => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }
}

/// Table access used by services and handlers.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Read rows matching `query`.
    async fn select(&self, table: Table, query: Query) -> AppResult<QueryResult>;

    /// Insert one row (object) or many (array).
    async fn insert(&self, table: Table, rows: Value, query: Query) -> AppResult<QueryResult>;

    /// Patch every row matching `query`.
    async fn update(&self, table: Table, patch: Value, query: Query) -> AppResult<QueryResult>;

    /// Delete every row matching `query`.
    async fn delete(&self, table: Table, query: Query) -> AppResult<QueryResult>;

    /// Call a stored function.
    async fn rpc(&self, function: &str, args: Value) -> AppResult<Value>;

    /// Connectivity check for the health endpoint.
    async fn ping(&self) -> AppResult<()>;
}

/// Error payload returned by the store
#[derive(Debug, Default, Deserialize)]
struct StoreErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

/// Relational store client authenticated with the service key.
pub struct RestClient {
    client: Client,
    base_url: String,
}

impl RestClient {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: &Config) -> AppResult<Self> {
        let key = config.service_role_key();
        let mut headers = HeaderMap::new();
        headers.insert("apikey", header_value(key)?);
        headers.insert(AUTHORIZATION, header_value(&format!("Bearer {}", key))?);

        let client = Client::builder()
            .timeout(config.http_timeout())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: format!("{}/{}", config.supabase_url, REST_PATH),
        })
    }

    fn request(&self, method: Method, path: &str, query: &Query) -> RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}/{}", self.base_url, path))
            .query(&query.to_params());
        if let Some(prefer) = query.prefer_header() {
            builder = builder.header("Prefer", prefer);
        }
        builder
    }

    async fn execute(&self, builder: RequestBuilder, table: &str) -> AppResult<QueryResult> {
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let count = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|h| h.to_str().ok())
            .and_then(parse_content_range);

        if !response.status().is_success() {
            return Err(map_error(response, table).await);
        }

        let body = response.bytes().await?;
        let data = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).map_err(|e| {
                AppError::internal(format!("Invalid JSON from {}: {}", table, e))
            })?
        };

        Ok(QueryResult::new(data, count, status))
    }
}

#[async_trait]
impl TableStore for RestClient {
    async fn select(&self, table: Table, query: Query) -> AppResult<QueryResult> {
        tracing::debug!(table = %table, params = ?query.to_params(), "select");
        let builder = self.request(Method::GET, table.as_str(), &query);
        self.execute(builder, table.as_str()).await
    }

    async fn insert(&self, table: Table, rows: Value, query: Query) -> AppResult<QueryResult> {
        tracing::debug!(table = %table, "insert");
        let builder = self
            .request(Method::POST, table.as_str(), &query)
            .json(&rows);
        self.execute(builder, table.as_str()).await
    }

    async fn update(&self, table: Table, patch: Value, query: Query) -> AppResult<QueryResult> {
        if !query.has_filters() {
            return Err(AppError::internal("Refusing unfiltered update"));
        }
        tracing::debug!(table = %table, params = ?query.to_params(), "update");
        let builder = self
            .request(Method::PATCH, table.as_str(), &query)
            .json(&patch);
        self.execute(builder, table.as_str()).await
    }

    async fn delete(&self, table: Table, query: Query) -> AppResult<QueryResult> {
        if !query.has_filters() {
            return Err(AppError::internal("Refusing unfiltered delete"));
        }
        tracing::debug!(table = %table, params = ?query.to_params(), "delete");
        let builder = self.request(Method::DELETE, table.as_str(), &query);
        self.execute(builder, table.as_str()).await
    }

    async fn rpc(&self, function: &str, args: Value) -> AppResult<Value> {
        let path = format!("rpc/{}", function);
        let builder = self
            .request(Method::POST, &path, &Query::new())
            .json(&args);
        Ok(self.execute(builder, &path).await?.data)
    }

    async fn ping(&self) -> AppResult<()> {
        let response = self
            .client
            .get(format!("{}/", self.base_url))
            .send()
            .await?;
        if response.status().is_server_error() {
            return Err(map_error(response, "health").await);
        }
        Ok(())
    }
}

async fn map_error(response: Response, table: &str) -> AppError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let body: StoreErrorBody = serde_json::from_str(&text).unwrap_or_default();

    tracing::warn!(
        table,
        status = status.as_u16(),
        code = ?body.code,
        details = ?body.details,
        hint = ?body.hint,
        "Store rejected request"
    );

    let message = body
        .message
        .filter(|m| !m.is_empty())
        .or_else(|| (!text.is_empty()).then(|| text.clone()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Store request failed")
                .to_string()
        });

    AppError::upstream(status.as_u16(), body.code, message)
}

fn header_value(value: &str) -> AppResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| AppError::internal("Store key contains invalid header characters"))
}
