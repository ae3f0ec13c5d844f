//! Authentication service - resolves a bearer token to an identity user.
//!
//! Tokens are issued by the identity store. With a configured JWT secret they
//! are verified locally (HS256, `authenticated` audience); otherwise the
//! identity store is asked who owns the token.

use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use crate::config::TOKEN_AUDIENCE;
use crate::domain::AuthUser;
use crate::errors::{AppError, AppResult};
use crate::infra::IdentityStore;

/// Access-token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    pub aud: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
}

/// Authentication service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Resolve a bearer token to its user. Any failure is `Unauthorized`.
    async fn authenticate(&self, token: &str) -> AppResult<AuthUser>;
}

/// Concrete [`AuthService`] backed by the identity store.
pub struct Authenticator {
    identity: Arc<dyn IdentityStore>,
    jwt_secret: Option<Vec<u8>>,
}

impl Authenticator {
    pub fn new(identity: Arc<dyn IdentityStore>, jwt_secret: Option<&[u8]>) -> Self {
        Self {
            identity,
            jwt_secret: jwt_secret.map(<[u8]>::to_vec),
        }
    }

    fn verify_locally(&self, secret: &[u8], token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[TOKEN_AUDIENCE]);
        let data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)?;
        Ok(data.claims)
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn authenticate(&self, token: &str) -> AppResult<AuthUser> {
        if token.trim().is_empty() {
            return Err(AppError::Unauthorized);
        }

        if let Some(secret) = &self.jwt_secret {
            let claims = self.verify_locally(secret, token)?;
            return Ok(AuthUser {
                id: claims.sub,
                email: claims.email,
                email_confirmed_at: None,
                created_at: None,
            });
        }

        self.identity.get_user_by_token(token).await.map_err(|e| {
            tracing::debug!(error = %e, "Token lookup failed");
            AppError::Unauthorized
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    use super::*;
    use crate::infra::MockIdentityStore;

    const SECRET: &[u8] = b"test-secret-key-for-testing-only-32chars";

    fn token(secret: &[u8], sub: Uuid, aud: &str, exp_offset: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub,
            email: Some("owner@example.com".into()),
            role: Some("authenticated".into()),
            aud: aud.into(),
            exp: now + exp_offset,
            iat: Some(now),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    #[tokio::test]
    async fn test_local_verification_accepts_valid_token() {
        let id = Uuid::new_v4();
        let service = Authenticator::new(Arc::new(MockIdentityStore::new()), Some(SECRET));

        let user = service
            .authenticate(&token(SECRET, id, TOKEN_AUDIENCE, 3600))
            .await
            .unwrap();

        assert_eq!(user.id, id);
        assert_eq!(user.email.as_deref(), Some("owner@example.com"));
    }

    #[tokio::test]
    async fn test_local_verification_rejects_bad_tokens() {
        let service = Authenticator::new(Arc::new(MockIdentityStore::new()), Some(SECRET));
        let id = Uuid::new_v4();

        for bad in [
            token(b"another-secret-entirely-not-matching!!", id, TOKEN_AUDIENCE, 3600),
            token(SECRET, id, "anon", 3600),
            token(SECRET, id, TOKEN_AUDIENCE, -3600),
            "not-a-jwt".to_string(),
        ] {
            let err = service.authenticate(&bad).await.unwrap_err();
            assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn test_remote_lookup_without_secret() {
        let id = Uuid::new_v4();
        let mut identity = MockIdentityStore::new();
        identity
            .expect_get_user_by_token()
            .withf(|token| token == "opaque-token")
            .returning(move |_| {
                Ok(AuthUser {
                    id,
                    email: Some("staff@example.com".into()),
                    email_confirmed_at: None,
                    created_at: None,
                })
            });
        identity
            .expect_get_user_by_token()
            .withf(|token| token != "opaque-token")
            .returning(|_| Err(AppError::upstream(500, None, "down")));

        let service = Authenticator::new(Arc::new(identity), None);

        assert_eq!(service.authenticate("opaque-token").await.unwrap().id, id);
        assert!(matches!(
            service.authenticate("other").await,
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            service.authenticate("  ").await,
            Err(AppError::Unauthorized)
        ));
    }
}
