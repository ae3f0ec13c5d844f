//! Identity store: admin user management and access-token lookup.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use crate::config::{Config, AUTH_PATH};
use crate::domain::{AuthUser, AuthUserUpdate, NewAuthUser};
use crate::errors::{AppError, AppResult};

/// Operations on identity-store users.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Create a user; fails if the email is taken.
    async fn create_user(&self, user: NewAuthUser) -> AppResult<AuthUser>;

    /// One page of users (1-indexed).
    async fn list_users(&self, page: u32, per_page: u32) -> AppResult<Vec<AuthUser>>;

    /// Look up a user by id; `None` when it does not exist.
    async fn get_user(&self, id: Uuid) -> AppResult<Option<AuthUser>>;

    async fn update_user(&self, id: Uuid, update: AuthUserUpdate) -> AppResult<AuthUser>;

    async fn delete_user(&self, id: Uuid) -> AppResult<()>;

    /// Resolve the user owning an access token.
    async fn get_user_by_token(&self, token: &str) -> AppResult<AuthUser>;

    async fn ping(&self) -> AppResult<()>;
}

#[derive(Debug, Deserialize)]
struct UserPage {
    #[serde(default)]
    users: Vec<AuthUser>,
}

/// Client for a GoTrue-compatible identity service.
pub struct GoTrueClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl GoTrueClient {
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
            base_url: format!("{}/{}", config.supabase_url, AUTH_PATH),
            anon_key: config.anon_key().to_string(),
        })
    }

    fn admin_url(&self, suffix: &str) -> String {
        format!("{}/admin/users{}", self.base_url, suffix)
    }
}

#[async_trait]
impl IdentityStore for GoTrueClient {
    async fn create_user(&self, user: NewAuthUser) -> AppResult<AuthUser> {
        tracing::debug!(email = %user.email, "Creating identity user");
        let response = self.client.post(self.admin_url("")).json(&user).send().await?;
        parse_json(response).await
    }

    async fn list_users(&self, page: u32, per_page: u32) -> AppResult<Vec<AuthUser>> {
        let response = self
            .client
            .get(self.admin_url(""))
            .query(&[("page", page), ("per_page", per_page)])
            .send()
            .await?;
        let page: UserPage = parse_json(response).await?;
        Ok(page.users)
    }

    async fn get_user(&self, id: Uuid) -> AppResult<Option<AuthUser>> {
        let response = self
            .client
            .get(self.admin_url(&format!("/{}", id)))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        parse_json(response).await.map(Some)
    }

    async fn update_user(&self, id: Uuid, update: AuthUserUpdate) -> AppResult<AuthUser> {
        let response = self
            .client
            .put(self.admin_url(&format!("/{}", id)))
            .json(&update)
            .send()
            .await?;
        parse_json(response).await
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        tracing::debug!(user_id = %id, "Deleting identity user");
        let response = self
            .client
            .delete(self.admin_url(&format!("/{}", id)))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(map_error(response).await);
        }
        Ok(())
    }

    async fn get_user_by_token(&self, token: &str) -> AppResult<AuthUser> {
        let response = self
            .client
            .get(format!("{}/user", self.base_url))
            .header("apikey", self.anon_key.as_str())
            .bearer_auth(token)
            .send()
            .await?;
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AppError::Unauthorized),
            _ => parse_json(response).await,
        }
    }

    async fn ping(&self) -> AppResult<()> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(map_error(response).await);
        }
        Ok(())
    }
}

async fn parse_json<T: serde::de::DeserializeOwned>(response: Response) -> AppResult<T> {
    if !response.status().is_success() {
        return Err(map_error(response).await);
    }
    let body = response.bytes().await?;
    serde_json::from_slice(&body)
        .map_err(|e| AppError::internal(format!("Invalid identity store response: {}", e)))
}

/// The identity store reports errors under several keys depending on version.
async fn map_error(response: Response) -> AppError {
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    let message = ["msg", "message", "error_description", "error"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Identity store request failed")
                .to_string()
        });
    let code = body
        .get("error_code")
        .and_then(Value::as_str)
        .map(str::to_string);

    tracing::warn!(status = status.as_u16(), code = ?code, "Identity store rejected request: {}", message);
    AppError::upstream(status.as_u16(), code, message)
}

fn header_value(value: &str) -> AppResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| AppError::internal("Identity key contains invalid header characters"))
}
