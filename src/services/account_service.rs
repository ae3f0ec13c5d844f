//! Account service - identity user + profile row as one logical unit.
//!
//! The two halves live in different stores, so every multi-store write runs
//! through a [`Saga`]: a failed profile write removes (or restores) the
//! identity-store half. Leftovers from crashes mid-saga are orphans and are
//! reclaimed here on re-registration or by the orphan sweep.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use super::container::parallel;
use super::directory::find_user_by_email;
use super::saga::Saga;
use crate::config::ALREADY_REGISTERED_MESSAGE;
use crate::domain::{AuthUser, AuthUserUpdate, NewAuthUser, NewProfile, ProfileKind};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{IdentityStore, ProfileRepository};

/// Request to create a fully provisioned account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub profile: NewProfile,
}

/// Result of provisioning
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProvisionedAccount {
    #[serde(rename = "userID")]
    pub user_id: Uuid,
    #[serde(rename = "profileData")]
    #[schema(value_type = Object)]
    pub profile_data: Value,
}

/// Email change for an existing account.
#[derive(Debug, Clone)]
pub struct EmailChange {
    pub user_id: Uuid,
    pub email: String,
    /// Address to restore if the profile update fails; looked up when absent.
    pub previous_email: Option<String>,
    /// Profile table to keep in sync; resolved from the id when absent.
    pub profile: Option<ProfileKind>,
}

/// Account service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Create identity user + profile row, or neither.
    async fn provision(&self, account: NewAccount) -> AppResult<ProvisionedAccount>;

    /// Current identity-store email of a user.
    async fn email_of(&self, user_id: Uuid) -> AppResult<String>;

    async fn change_email(&self, change: EmailChange) -> AppResult<()>;

    async fn change_password(&self, user_id: Uuid, password: String) -> AppResult<()>;

    /// Update credentials and profile columns of a personnel account.
    async fn update_personnel(
        &self,
        user_id: Uuid,
        fields: Map<String, Value>,
    ) -> AppResult<Value>;

    /// Remove the identity user.
    async fn delete_account(&self, user_id: Uuid) -> AppResult<()>;
}

/// Concrete [`AccountService`].
pub struct AccountManager {
    identity: Arc<dyn IdentityStore>,
    profiles: Arc<dyn ProfileRepository>,
}

impl AccountManager {
    pub fn new(identity: Arc<dyn IdentityStore>, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { identity, profiles }
    }

    /// Which profile table holds `user_id`, if any.
    async fn profile_kind(&self, user_id: Uuid) -> AppResult<Option<ProfileKind>> {
        let (personnel, pet_owner) = parallel::join2(
            self.profiles.exists(ProfileKind::Personnel, user_id),
            self.profiles.exists(ProfileKind::PetOwner, user_id),
        )
        .await?;

        Ok(if personnel {
            Some(ProfileKind::Personnel)
        } else if pet_owner {
            Some(ProfileKind::PetOwner)
        } else {
            None
        })
    }

    /// Delete an identity user holding the email if it has no profile;
    /// refuse if it has one in either table.
    async fn reclaim_orphan(&self, existing: &AuthUser) -> AppResult<()> {
        if self.profile_kind(existing.id).await?.is_some() {
            return Err(AppError::bad_request(ALREADY_REGISTERED_MESSAGE));
        }
        tracing::warn!(user_id = %existing.id, "Deleting orphan identity user before provisioning");
        self.identity.delete_user(existing.id).await
    }

    fn restore_email(
        &self,
        user_id: Uuid,
        email: String,
    ) -> impl std::future::Future<Output = AppResult<()>> + Send + 'static {
        let identity = self.identity.clone();
        async move {
            identity
                .update_user(
                    user_id,
                    AuthUserUpdate {
                        email: Some(email),
                        password: None,
                    },
                )
                .await
                .map(|_| ())
        }
    }
}

/// Identity-store rejections (taken email, weak password...) are client errors.
fn client_error(err: AppError) -> AppError {
    if err.is_client_upstream() {
        AppError::BadRequest(err.to_string())
    } else {
        err
    }
}

#[async_trait]
impl AccountService for AccountManager {
    async fn provision(&self, account: NewAccount) -> AppResult<ProvisionedAccount> {
        let email = account.email.trim().to_string();
        if email.is_empty() || account.password.is_empty() {
            return Err(AppError::validation("Email and password are required"));
        }
        let kind = account.profile.kind();

        if self.profiles.email_registered(kind, &email).await? {
            return Err(AppError::bad_request(ALREADY_REGISTERED_MESSAGE));
        }
        if let Some(existing) = find_user_by_email(self.identity.as_ref(), &email).await? {
            self.reclaim_orphan(&existing).await?;
        }

        let mut saga = Saga::new("provision_account");
        let user = saga
            .run(
                "create identity user",
                self.identity
                    .create_user(NewAuthUser::confirmed(email.as_str(), account.password.as_str())),
            )
            .await
            .map_err(client_error)?;

        let user_id = user.id;
        let identity = self.identity.clone();
        saga.on_failure("delete identity user", async move {
            identity.delete_user(user_id).await
        });

        let profile = account.profile.with_default_email(&email);
        let profile_data = saga
            .run("insert profile", self.profiles.insert(user_id, profile))
            .await
            .map_err(|e| {
                if e.is_client_upstream() {
                    AppError::BadRequest(format!("Profile creation failed: {}", e))
                } else {
                    e
                }
            })?;
        saga.complete();

        tracing::info!(user_id = %user_id, table = %kind.table(), "Account provisioned");
        Ok(ProvisionedAccount {
            user_id,
            profile_data,
        })
    }

    async fn email_of(&self, user_id: Uuid) -> AppResult<String> {
        self.identity
            .get_user(user_id)
            .await?
            .and_then(|user| user.email)
            .ok_or_not_found("User")
    }

    async fn change_email(&self, change: EmailChange) -> AppResult<()> {
        let user_id = change.user_id;
        let email = change.email.trim().to_string();
        if email.is_empty() {
            return Err(AppError::validation("Email is required"));
        }

        let previous = match change.previous_email.filter(|e| !e.trim().is_empty()) {
            Some(previous) => Some(previous),
            None => self.identity.get_user(user_id).await?.and_then(|u| u.email),
        };
        let kind = match change.profile {
            Some(kind) => Some(kind),
            None => self.profile_kind(user_id).await?,
        };

        let mut saga = Saga::new("change_email");
        saga.run(
            "update identity email",
            self.identity.update_user(
                user_id,
                AuthUserUpdate {
                    email: Some(email.clone()),
                    password: None,
                },
            ),
        )
        .await
        .map_err(client_error)?;

        if let Some(previous) = previous {
            saga.on_failure("restore identity email", self.restore_email(user_id, previous));
        }

        if let Some(kind) = kind {
            saga.run(
                "update profile email",
                self.profiles.update(kind, user_id, json!({ "email": email })),
            )
            .await?;
        }
        saga.complete();

        tracing::info!(user_id = %user_id, "Email changed");
        Ok(())
    }

    async fn change_password(&self, user_id: Uuid, password: String) -> AppResult<()> {
        if password.is_empty() {
            return Err(AppError::validation("Password is required"));
        }
        self.identity
            .update_user(
                user_id,
                AuthUserUpdate {
                    email: None,
                    password: Some(password),
                },
            )
            .await
            .map_err(client_error)?;
        tracing::info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    async fn update_personnel(
        &self,
        user_id: Uuid,
        mut fields: Map<String, Value>,
    ) -> AppResult<Value> {
        fields.remove("id");
        let password = match fields.remove("password") {
            Some(Value::String(p)) if !p.is_empty() => Some(p),
            _ => None,
        };
        let email = fields
            .get("email")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string);

        let update = AuthUserUpdate {
            email: email.clone(),
            password,
        };

        let mut saga = Saga::new("update_personnel");
        if !update.is_empty() {
            let previous = match &email {
                Some(_) => self.identity.get_user(user_id).await?.and_then(|u| u.email),
                None => None,
            };
            saga.run(
                "update identity credentials",
                self.identity.update_user(user_id, update),
            )
            .await
            .map_err(client_error)?;
            if let Some(previous) = previous {
                saga.on_failure("restore identity email", self.restore_email(user_id, previous));
            }
        }

        let data = if fields.is_empty() {
            Value::Null
        } else {
            saga.run(
                "update personnel profile",
                self.profiles
                    .update(ProfileKind::Personnel, user_id, Value::Object(fields)),
            )
            .await?
        };
        saga.complete();
        Ok(data)
    }

    async fn delete_account(&self, user_id: Uuid) -> AppResult<()> {
        self.identity.delete_user(user_id).await.map_err(client_error)?;
        tracing::info!(user_id = %user_id, "Identity user deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;
    use mockall::Sequence;

    use super::*;
    use crate::domain::{PersonnelFields, PetOwnerFields};
    use crate::infra::{MockIdentityStore, MockProfileRepository};

    fn auth_user(id: Uuid, email: &str) -> AuthUser {
        AuthUser {
            id,
            email: Some(email.to_string()),
            email_confirmed_at: None,
            created_at: None,
        }
    }

    fn pet_owner_account(email: &str) -> NewAccount {
        NewAccount {
            email: email.to_string(),
            password: "secret123".to_string(),
            profile: NewProfile::PetOwner(PetOwnerFields {
                first_name: "Ana".into(),
                last_name: "Reyes".into(),
                ..Default::default()
            }),
        }
    }

    #[tokio::test]
    async fn test_provision_creates_user_then_profile() {
        let new_id = Uuid::new_v4();
        let mut identity = MockIdentityStore::new();
        identity.expect_list_users().returning(|_, _| Ok(vec![]));
        identity
            .expect_create_user()
            .withf(|u| u.email == "a@x.com" && u.email_confirm)
            .returning(move |u| Ok(auth_user(new_id, &u.email)));
        identity.expect_delete_user().never();

        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_email_registered()
            .withf(|kind, email| *kind == ProfileKind::PetOwner && email == "a@x.com")
            .returning(|_, _| Ok(false));
        profiles
            .expect_insert()
            .withf(move |id, profile| *id == new_id && profile.kind() == ProfileKind::PetOwner)
            .returning(|_, _| Ok(json!([{"first_name": "Ana"}])));

        let service = AccountManager::new(Arc::new(identity), Arc::new(profiles));
        let account = service.provision(pet_owner_account(" a@x.com ")).await.unwrap();

        assert_eq!(account.user_id, new_id);
        assert_eq!(account.profile_data[0]["first_name"], "Ana");
    }

    #[tokio::test]
    async fn test_provision_rejects_email_with_profile() {
        let mut identity = MockIdentityStore::new();
        identity.expect_create_user().never();

        let mut profiles = MockProfileRepository::new();
        profiles.expect_email_registered().returning(|_, _| Ok(true));

        let service = AccountManager::new(Arc::new(identity), Arc::new(profiles));
        let err = service.provision(pet_owner_account("a@x.com")).await.unwrap_err();

        assert_eq!(err.to_string(), ALREADY_REGISTERED_MESSAGE);
    }

    #[tokio::test]
    async fn test_provision_rejects_identity_user_with_profile_in_other_table() {
        let existing = Uuid::new_v4();
        let mut identity = MockIdentityStore::new();
        identity
            .expect_list_users()
            .returning(move |_, _| Ok(vec![auth_user(existing, "a@x.com")]));
        identity.expect_delete_user().never();
        identity.expect_create_user().never();

        let mut profiles = MockProfileRepository::new();
        profiles.expect_email_registered().returning(|_, _| Ok(false));
        profiles
            .expect_exists()
            .returning(|kind, _| Ok(kind == ProfileKind::Personnel));

        let service = AccountManager::new(Arc::new(identity), Arc::new(profiles));
        let err = service.provision(pet_owner_account("a@x.com")).await.unwrap_err();

        assert!(matches!(err, AppError::BadRequest(ref m) if m == ALREADY_REGISTERED_MESSAGE));
    }

    #[tokio::test]
    async fn test_provision_deletes_orphan_before_creating() {
        let orphan = Uuid::new_v4();
        let new_id = Uuid::new_v4();
        let mut seq = Sequence::new();
        let mut identity = MockIdentityStore::new();
        identity
            .expect_list_users()
            .returning(move |_, _| Ok(vec![auth_user(orphan, "A@X.com")]));
        identity
            .expect_delete_user()
            .with(eq(orphan))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        identity
            .expect_create_user()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |u| Ok(auth_user(new_id, &u.email)));

        let mut profiles = MockProfileRepository::new();
        profiles.expect_email_registered().returning(|_, _| Ok(false));
        profiles.expect_exists().returning(|_, _| Ok(false));
        profiles.expect_insert().returning(|_, _| Ok(Value::Null));

        let service = AccountManager::new(Arc::new(identity), Arc::new(profiles));
        let account = service.provision(pet_owner_account("a@x.com")).await.unwrap();
        assert_eq!(account.user_id, new_id);
    }

    #[tokio::test]
    async fn test_failed_profile_insert_deletes_created_user() {
        let new_id = Uuid::new_v4();
        let mut identity = MockIdentityStore::new();
        identity.expect_list_users().returning(|_, _| Ok(vec![]));
        identity
            .expect_create_user()
            .returning(move |u| Ok(auth_user(new_id, &u.email)));
        identity
            .expect_delete_user()
            .with(eq(new_id))
            .times(1)
            .returning(|_| Ok(()));

        let mut profiles = MockProfileRepository::new();
        profiles.expect_email_registered().returning(|_, _| Ok(false));
        profiles.expect_insert().returning(|_, _| {
            Err(AppError::upstream(
                400,
                Some("23502".into()),
                "null value in column \"first_name\"",
            ))
        });

        let service = AccountManager::new(Arc::new(identity), Arc::new(profiles));
        let account = NewAccount {
            email: "p@x.com".into(),
            password: "secret123".into(),
            profile: NewProfile::Personnel(PersonnelFields::default()),
        };
        let err = service.provision(account).await.unwrap_err();

        assert!(matches!(err, AppError::BadRequest(ref m) if m.starts_with("Profile creation failed")));
    }

    #[tokio::test]
    async fn test_identity_rejection_is_bad_request() {
        let mut identity = MockIdentityStore::new();
        identity.expect_list_users().returning(|_, _| Ok(vec![]));
        identity.expect_create_user().returning(|_| {
            Err(AppError::upstream(
                422,
                Some("weak_password".into()),
                "Password should be at least 6 characters",
            ))
        });

        let mut profiles = MockProfileRepository::new();
        profiles.expect_email_registered().returning(|_, _| Ok(false));
        profiles.expect_insert().never();

        let service = AccountManager::new(Arc::new(identity), Arc::new(profiles));
        let err = service.provision(pet_owner_account("a@x.com")).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_change_email_restores_identity_on_profile_failure() {
        let id = Uuid::new_v4();
        let mut seq = Sequence::new();
        let mut identity = MockIdentityStore::new();
        identity
            .expect_update_user()
            .withf(|_, u| u.email.as_deref() == Some("new@x.com"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|id, _| Ok(auth_user(id, "new@x.com")));
        identity
            .expect_update_user()
            .withf(|_, u| u.email.as_deref() == Some("old@x.com"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|id, _| Ok(auth_user(id, "old@x.com")));

        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_update()
            .returning(|_, _, _| Err(AppError::upstream(409, None, "duplicate key value")));

        let service = AccountManager::new(Arc::new(identity), Arc::new(profiles));
        let result = service
            .change_email(EmailChange {
                user_id: id,
                email: "new@x.com".into(),
                previous_email: Some("old@x.com".into()),
                profile: Some(ProfileKind::PetOwner),
            })
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_change_email_for_admin_skips_profile() {
        let id = Uuid::new_v4();
        let mut identity = MockIdentityStore::new();
        identity
            .expect_get_user()
            .returning(|id| Ok(Some(auth_user(id, "old@x.com"))));
        identity
            .expect_update_user()
            .times(1)
            .returning(|id, _| Ok(auth_user(id, "new@x.com")));

        let mut profiles = MockProfileRepository::new();
        profiles.expect_exists().returning(|_, _| Ok(false));
        profiles.expect_update().never();

        let service = AccountManager::new(Arc::new(identity), Arc::new(profiles));
        service
            .change_email(EmailChange {
                user_id: id,
                email: "new@x.com".into(),
                previous_email: None,
                profile: None,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_personnel_strips_password_from_profile_patch() {
        let id = Uuid::new_v4();
        let mut identity = MockIdentityStore::new();
        identity
            .expect_update_user()
            .withf(|_, u| u.password.as_deref() == Some("n3wpass!") && u.email.is_none())
            .returning(|id, _| Ok(auth_user(id, "p@x.com")));

        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_update()
            .withf(|kind, _, patch| {
                *kind == ProfileKind::Personnel
                    && patch.get("password").is_none()
                    && patch["address"] == "Purok 3"
            })
            .returning(|_, _, patch| Ok(json!([patch])));

        let service = AccountManager::new(Arc::new(identity), Arc::new(profiles));
        let mut fields = Map::new();
        fields.insert("password".into(), json!("n3wpass!"));
        fields.insert("address".into(), json!("Purok 3"));

        let data = service.update_personnel(id, fields).await.unwrap();
        assert_eq!(data[0]["address"], "Purok 3");
    }
}
