use berth_db::{models::DbUser, storage::UserStore};
use clap::Parser;

#[derive(Clone, Debug, Parser)]
pub struct CreateUserParams {
    #[clap(short, long)]
    pub username: String,

    /// Make the user a platform administrator.
    #[clap(long, default_value_t = false)]
    pub admin: bool,
}

pub async fn create_user(
    stg: &impl UserStore,
    CreateUserParams { username, admin }: CreateUserParams,
) -> anyhow::Result<()> {
    let (user, token) = DbUser::with_new_token(username, admin);
    let new_user = UserStore::create(stg, user).await?;

    println!("Created user {} with ID {}", new_user.username, new_user.id);
    println!("API token (shown once): {token}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use berth_db::{
        models::hash_token,
        storage::{StoreError, memory::MemoryStorage},
    };

    use super::*;

    fn params(username: &str, admin: bool) -> CreateUserParams {
        CreateUserParams {
            username: username.into(),
            admin,
        }
    }

    #[tokio::test]
    async fn creates_user_with_requested_role() {
        let stg = MemoryStorage::new();
        create_user(&stg, params("ops", true)).await.unwrap();

        let user = UserStore::get_by_username(&stg, "ops").await.unwrap().unwrap();
        assert!(user.is_admin);
        assert_eq!(user.token_hash.len(), 64);
        assert_ne!(user.token_hash, hash_token(""));
    }

    #[tokio::test]
    async fn duplicate_username_fails() {
        let stg = MemoryStorage::new();
        create_user(&stg, params("ops", false)).await.unwrap();

        let err = create_user(&stg, params("ops", false)).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::AlreadyExists)
        ));
    }

    #[test]
    fn parses_flags() {
        let parsed = CreateUserParams::try_parse_from(["create-user", "--username", "ops", "--admin"])
            .unwrap();
        assert_eq!(parsed.username, "ops");
        assert!(parsed.admin);
    }
}
