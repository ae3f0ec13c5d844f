//! Walks the identity store's paginated user listing.

use crate::config::IDENTITY_PAGE_SIZE;
use crate::domain::AuthUser;
use crate::errors::AppResult;
use crate::infra::IdentityStore;

/// Every identity user, fetched page by page until a short page.
pub async fn collect_all_users(identity: &dyn IdentityStore) -> AppResult<Vec<AuthUser>> {
    let mut users = Vec::new();
    let mut page = 1;
    loop {
        let batch = identity.list_users(page, IDENTITY_PAGE_SIZE).await?;
        let short = batch.len() < IDENTITY_PAGE_SIZE as usize;
        users.extend(batch);
        if short {
            break;
        }
        page += 1;
    }
    tracing::debug!(count = users.len(), pages = page, "Collected identity users");
    Ok(users)
}

/// First identity user whose email matches (case-insensitive).
pub async fn find_user_by_email(
    identity: &dyn IdentityStore,
    email: &str,
) -> AppResult<Option<AuthUser>> {
    let mut page = 1;
    loop {
        let batch = identity.list_users(page, IDENTITY_PAGE_SIZE).await?;
        let short = batch.len() < IDENTITY_PAGE_SIZE as usize;
        if let Some(user) = batch.into_iter().find(|u| u.has_email(email)) {
            return Ok(Some(user));
        }
        if short {
            return Ok(None);
        }
        page += 1;
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;
    use uuid::Uuid;

    use super::*;
    use crate::infra::MockIdentityStore;

    fn users(n: usize) -> Vec<AuthUser> {
        (0..n)
            .map(|i| AuthUser {
                id: Uuid::new_v4(),
                email: Some(format!("user{}@example.com", i)),
                email_confirmed_at: None,
                created_at: None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_collect_stops_on_short_page() {
        let mut identity = MockIdentityStore::new();
        identity
            .expect_list_users()
            .with(eq(1), eq(IDENTITY_PAGE_SIZE))
            .times(1)
            .returning(|_, per_page| Ok(users(per_page as usize)));
        identity
            .expect_list_users()
            .with(eq(2), eq(IDENTITY_PAGE_SIZE))
            .times(1)
            .returning(|_, _| Ok(users(3)));

        let all = collect_all_users(&identity).await.unwrap();
        assert_eq!(all.len(), IDENTITY_PAGE_SIZE as usize + 3);
    }

    #[tokio::test]
    async fn test_find_by_email_is_case_insensitive() {
        let mut identity = MockIdentityStore::new();
        identity.expect_list_users().times(1).returning(|_, _| {
            let mut page = users(2);
            page[1].email = Some("Owner@Example.com".into());
            Ok(page)
        });

        let found = find_user_by_email(&identity, "owner@example.com")
            .await
            .unwrap();
        assert_eq!(
            found.and_then(|u| u.email).as_deref(),
            Some("Owner@Example.com")
        );
    }
}
