//! Orphan sweep: identity users with no profile row in either table.
//!
//! A full scan of the identity store and a set difference against both
//! profile tables. Seeded accounts listed in `protected_emails` are left
//! alone since they legitimately have no profile (admins).

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use super::container::parallel;
use super::directory::collect_all_users;
use crate::domain::{AuthUser, ProfileKind};
use crate::errors::AppResult;
use crate::infra::{IdentityStore, ProfileRepository};

/// Outcome of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Identity users examined
    pub scanned: usize,
    /// Orphans skipped because their email is on the allow-list
    pub protected: usize,
    /// Orphans eligible for deletion
    pub orphans: usize,
    pub deleted: usize,
    pub failed: usize,
    /// Ids of the eligible orphans, in scan order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub orphan_ids: Vec<Uuid>,
}

pub struct OrphanSweeper {
    identity: Arc<dyn IdentityStore>,
    profiles: Arc<dyn ProfileRepository>,
    protected: HashSet<String>,
}

impl OrphanSweeper {
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        profiles: Arc<dyn ProfileRepository>,
        protected_emails: &[String],
    ) -> Self {
        let protected = protected_emails
            .iter()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self {
            identity,
            profiles,
            protected,
        }
    }

    fn is_protected(&self, user: &AuthUser) -> bool {
        user.email
            .as_deref()
            .map(|e| self.protected.contains(&e.trim().to_lowercase()))
            .unwrap_or(false)
    }

    /// Scan and, unless `dry_run`, delete every unprotected orphan.
    ///
    /// Listing failures abort the sweep. A failed delete is logged and
    /// counted; the sweep carries on with the next user.
    pub async fn sweep(&self, dry_run: bool) -> AppResult<SweepReport> {
        let (users, (personnel, pet_owners)) = parallel::join2(
            collect_all_users(self.identity.as_ref()),
            parallel::join2(
                self.profiles.ids(ProfileKind::Personnel),
                self.profiles.ids(ProfileKind::PetOwner),
            ),
        )
        .await?;

        let mut report = SweepReport {
            scanned: users.len(),
            ..Default::default()
        };

        for user in users {
            if personnel.contains(&user.id) || pet_owners.contains(&user.id) {
                continue;
            }
            if self.is_protected(&user) {
                report.protected += 1;
                continue;
            }
            report.orphans += 1;
            report.orphan_ids.push(user.id);

            if dry_run {
                tracing::info!(user_id = %user.id, email = ?user.email, "Orphan (dry run)");
                continue;
            }

            match self.identity.delete_user(user.id).await {
                Ok(()) => {
                    tracing::info!(user_id = %user.id, email = ?user.email, "Deleted orphan user");
                    report.deleted += 1;
                }
                Err(e) => {
                    tracing::error!(user_id = %user.id, error = %e, "Failed to delete orphan user");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            scanned = report.scanned,
            protected = report.protected,
            orphans = report.orphans,
            deleted = report.deleted,
            failed = report.failed,
            dry_run,
            "Orphan sweep finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::errors::AppError;
    use crate::infra::{MockIdentityStore, MockProfileRepository};

    fn user(email: &str) -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
            email_confirmed_at: None,
            created_at: None,
        }
    }

    struct Fixture {
        staff: AuthUser,
        owner: AuthUser,
        orphan: AuthUser,
        admin: AuthUser,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                staff: user("staff@example.com"),
                owner: user("owner@example.com"),
                orphan: user("orphan@example.com"),
                admin: user("Admin@PetVac.com"),
            }
        }

        fn identity(&self) -> MockIdentityStore {
            let users = vec![
                self.staff.clone(),
                self.owner.clone(),
                self.orphan.clone(),
                self.admin.clone(),
            ];
            let mut identity = MockIdentityStore::new();
            identity
                .expect_list_users()
                .returning(move |_, _| Ok(users.clone()));
            identity
        }

        fn profiles(&self) -> MockProfileRepository {
            let staff = self.staff.id;
            let owner = self.owner.id;
            let mut profiles = MockProfileRepository::new();
            profiles
                .expect_ids()
                .with(eq(ProfileKind::Personnel))
                .returning(move |_| Ok(HashSet::from([staff])));
            profiles
                .expect_ids()
                .with(eq(ProfileKind::PetOwner))
                .returning(move |_| Ok(HashSet::from([owner])));
            profiles
        }
    }

    fn protected() -> Vec<String> {
        vec!["admin@petvac.com".to_string()]
    }

    #[tokio::test]
    async fn test_deletes_only_unprotected_orphans() {
        let fx = Fixture::new();
        let mut identity = fx.identity();
        identity
            .expect_delete_user()
            .with(eq(fx.orphan.id))
            .times(1)
            .returning(|_| Ok(()));

        let sweeper = OrphanSweeper::new(Arc::new(identity), Arc::new(fx.profiles()), &protected());
        let report = sweeper.sweep(false).await.unwrap();

        assert_eq!(report.scanned, 4);
        assert_eq!(report.protected, 1);
        assert_eq!(report.orphans, 1);
        assert_eq!(report.deleted, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(report.orphan_ids, vec![fx.orphan.id]);
    }

    #[tokio::test]
    async fn test_dry_run_deletes_nothing() {
        let fx = Fixture::new();
        let mut identity = fx.identity();
        identity.expect_delete_user().never();

        let sweeper = OrphanSweeper::new(Arc::new(identity), Arc::new(fx.profiles()), &protected());
        let report = sweeper.sweep(true).await.unwrap();

        assert_eq!(report.orphans, 1);
        assert_eq!(report.deleted, 0);
    }

    #[tokio::test]
    async fn test_delete_failure_is_counted_not_fatal() {
        let fx = Fixture::new();
        let mut identity = fx.identity();
        identity
            .expect_delete_user()
            .returning(|_| Err(AppError::upstream(500, None, "boom")));

        let sweeper = OrphanSweeper::new(Arc::new(identity), Arc::new(fx.profiles()), &[]);
        let report = sweeper.sweep(false).await.unwrap();

        assert_eq!(report.orphans, 2);
        assert_eq!(report.deleted, 0);
        assert_eq!(report.failed, 2);
    }

    #[tokio::test]
    async fn test_profile_listing_failure_aborts() {
        let fx = Fixture::new();
        let mut identity = fx.identity();
        identity.expect_delete_user().never();
        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_ids()
            .returning(|_| Err(AppError::upstream(503, None, "unavailable")));

        let sweeper = OrphanSweeper::new(Arc::new(identity), Arc::new(profiles), &protected());
        assert!(sweeper.sweep(false).await.is_err());
    }
}
