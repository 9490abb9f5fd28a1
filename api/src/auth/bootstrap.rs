use berth_db::{
    models::{DbUser, hash_token},
    storage::{StoreError, UserStore},
};
use thiserror::Error;
use tracing::{error, info, instrument};

pub const ADMIN_USERNAME: &str = "admin";

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("User {ADMIN_USERNAME} exists but is not an administrator")]
    NotAdmin,

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Make sure an `admin` user exists and answers to `token`.
///
/// An existing `admin` user keeps its ID but has its token replaced. A
/// non-admin user holding the name is left alone and startup fails.
#[instrument(skip_all)]
pub async fn ensure_admin<S: UserStore + ?Sized>(
    db: &S,
    token: &str,
) -> Result<DbUser, BootstrapError> {
    let token_hash = hash_token(token);

    if let Some(mut user) = UserStore::get_by_username(db, ADMIN_USERNAME).await? {
        if !user.is_admin {
            error!(user_id = %user.id, "Bootstrap user exists without the admin flag");
            return Err(BootstrapError::NotAdmin);
        }

        UserStore::set_token_hash(db, &user.id.to_string(), &token_hash).await?;
        user.token_hash = token_hash;
        info!(user_id = %user.id, "Rotated bootstrap admin token");
        return Ok(user);
    }

    let user = UserStore::create(db, DbUser::new(ADMIN_USERNAME.into(), token_hash, true)).await?;
    info!(user_id = %user.id, "Created bootstrap admin user");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use berth_db::storage::memory::MemoryStorage;

    use super::*;

    #[tokio::test]
    async fn creates_admin_on_first_start() {
        let db = MemoryStorage::new();
        let user = ensure_admin(&db, "first-token").await.unwrap();

        assert!(user.is_admin);
        let found = UserStore::get_by_token_hash(&db, &hash_token("first-token"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, user.id);
    }

    #[tokio::test]
    async fn rotates_token_on_later_starts() {
        let db = MemoryStorage::new();
        let first = ensure_admin(&db, "first-token").await.unwrap();
        let second = ensure_admin(&db, "second-token").await.unwrap();

        assert_eq!(first.id, second.id);
        assert!(
            UserStore::get_by_token_hash(&db, &hash_token("first-token"))
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            UserStore::get_by_token_hash(&db, &hash_token("second-token"))
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn refuses_to_hand_the_token_to_a_regular_user() {
        let db = MemoryStorage::new();
        let (user, token) = DbUser::with_new_token(ADMIN_USERNAME.into(), false);
        UserStore::create(&db, user).await.unwrap();

        let err = ensure_admin(&db, "bootstrap-token").await.unwrap_err();
        assert!(matches!(err, BootstrapError::NotAdmin));

        // The existing token keeps working and the new one grants nothing.
        assert!(
            UserStore::get_by_token_hash(&db, &hash_token(&token))
                .await
                .unwrap()
                .is_some()
        );
        assert!(
            UserStore::get_by_token_hash(&db, &hash_token("bootstrap-token"))
                .await
                .unwrap()
                .is_none()
        );
    }
}
