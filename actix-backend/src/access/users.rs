use crate::{
    models::{timestamp_now, Identity, User, UserProfile},
    store::Repository,
};

use super::{require_identity, AccessError, AccessResult};

/// Creates the caller's profile on first sign-in, refreshes name and email
/// afterwards. The subscription tier is never touched here.
pub async fn sync_user(repo: &dyn Repository, identity: Option<&Identity>) -> AccessResult<User> {
    let identity = require_identity(identity)?;

    let name = identity
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .or_else(|| {
            identity
                .email
                .as_deref()
                .and_then(|email| email.split('@').next())
                .filter(|local| !local.is_empty())
        })
        .unwrap_or(&identity.subject)
        .to_string();

    let user = repo
        .upsert_user(&UserProfile {
            user_id: identity.subject.clone(),
            email: identity.email.clone(),
            name,
            created_at: timestamp_now(),
        })
        .await?;

    log::debug!("synced user {}", user.user_id);
    Ok(user)
}

pub async fn get_user(repo: &dyn Repository, user_id: &str) -> AccessResult<User> {
    repo.find_user(user_id).await?.ok_or(AccessError::UserNotFound)
}

pub async fn upgrade_to_pro(repo: &dyn Repository, user_id: &str) -> AccessResult<User> {
    let user = repo
        .set_pro(user_id, timestamp_now())
        .await?
        .ok_or(AccessError::UserNotFound)?;
    log::info!("user {} upgraded to pro", user.user_id);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{access::testing::identity, store::MemoryRepository};

    #[actix_web::test]
    async fn first_sync_creates_free_user_and_later_syncs_keep_tier() {
        let repo = MemoryRepository::new();
        let mut caller = identity("user_1");

        let user = sync_user(&repo, Some(&caller)).await.unwrap();
        assert_eq!(user.name, "user_1 name");
        assert!(!user.is_pro);

        upgrade_to_pro(&repo, "user_1").await.unwrap();
        caller.name = Some("Renamed".into());
        let user = sync_user(&repo, Some(&caller)).await.unwrap();
        assert_eq!(user.name, "Renamed");
        assert!(user.is_pro);
        assert!(user.pro_since.is_some());
    }

    #[actix_web::test]
    async fn name_falls_back_to_email_then_subject() {
        let repo = MemoryRepository::new();
        let caller = Identity { subject: "user_2".into(), name: None, email: Some("grace@example.com".into()) };
        assert_eq!(sync_user(&repo, Some(&caller)).await.unwrap().name, "grace");

        let caller = Identity { subject: "user_3".into(), name: Some("  ".into()), email: None };
        assert_eq!(sync_user(&repo, Some(&caller)).await.unwrap().name, "user_3");
    }

    #[actix_web::test]
    async fn anonymous_sync_and_unknown_users_fail() {
        let repo = MemoryRepository::new();
        assert!(matches!(sync_user(&repo, None).await, Err(AccessError::Unauthenticated)));
        assert!(matches!(get_user(&repo, "ghost").await, Err(AccessError::UserNotFound)));
        assert!(matches!(upgrade_to_pro(&repo, "ghost").await, Err(AccessError::UserNotFound)));
    }
}
