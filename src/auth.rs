use crate::{
    auth::backend::VirtueAuthBackend,
    data::user::User,
    error::{
        BcryptSnafu, ForeignAccountSnafu, JoinTaskSnafu, NotAdminSnafu, UnauthorisedSnafu,
        VirtueResult,
    },
    store::Store,
};
use axum_login::AuthSession;
use secrecy::{ExposeSecret, SecretString};
use snafu::{OptionExt, ResultExt, ensure};
use uuid::Uuid;

pub mod backend;
pub mod session_store;

pub type VirtueSession = AuthSession<VirtueAuthBackend>;

pub async fn hash_password(password: SecretString) -> VirtueResult<String> {
    tokio::task::spawn_blocking(move || {
        bcrypt::hash(password.expose_secret().as_bytes(), bcrypt::DEFAULT_COST)
    })
    .await
    .context(JoinTaskSnafu)?
    .context(BcryptSnafu)
}

pub async fn verify_password(password: SecretString, hash: SecretString) -> VirtueResult<bool> {
    tokio::task::spawn_blocking(move || {
        bcrypt::verify(password.expose_secret(), hash.expose_secret())
    })
    .await
    .context(JoinTaskSnafu)?
    .context(BcryptSnafu)
}

///looks the caller up afresh, so a revoked admin flag takes effect straight away
pub async fn ensure_admin(store: &dyn Store, caller: Option<Uuid>) -> VirtueResult<User> {
    let id = caller.context(UnauthorisedSnafu)?;
    let user = store.get_user(id).await?.context(UnauthorisedSnafu)?;
    ensure!(user.is_admin, NotAdminSnafu { id });
    Ok(user)
}

pub trait AuthUtilities {
    fn caller_id(&self) -> Option<Uuid>;
    fn require_user(&self) -> VirtueResult<&User>;
    ///for endpoints that still name the account in their parameters
    fn require_account(&self, requested: Uuid) -> VirtueResult<&User>;
}

impl AuthUtilities for VirtueSession {
    fn caller_id(&self) -> Option<Uuid> {
        self.user.as_ref().map(|user| user.id)
    }

    fn require_user(&self) -> VirtueResult<&User> {
        self.user.as_ref().context(UnauthorisedSnafu)
    }

    fn require_account(&self, requested: Uuid) -> VirtueResult<&User> {
        let user = self.require_user()?;
        ensure!(user.id == requested, ForeignAccountSnafu { requested });
        Ok(user)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{data::user::AddUser, error::VirtueError, store::memory::MemoryStore};
    use email_address::EmailAddress;
    use std::str::FromStr;

    pub(crate) async fn add_user(store: &dyn Store, email: &str) -> User {
        store
            .insert_user(AddUser {
                first_name: "Test".into(),
                surname: "User".into(),
                email: EmailAddress::from_str(email).unwrap(),
                bcrypt_hashed_password: "unused".into(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn admins_pass_the_gate() {
        let store = MemoryStore::default();
        let admin = add_user(&store, "admin@example.com").await;

        let passed = ensure_admin(&store, Some(admin.id)).await.unwrap();
        assert_eq!(passed.id, admin.id);
    }

    #[tokio::test]
    async fn everyone_else_is_unauthorised() {
        let store = MemoryStore::default();
        add_user(&store, "admin@example.com").await;
        let parent = add_user(&store, "parent@example.com").await;

        assert!(matches!(
            ensure_admin(&store, Some(parent.id)).await,
            Err(VirtueError::NotAdmin { .. })
        ));
        assert!(matches!(
            ensure_admin(&store, None).await,
            Err(VirtueError::Unauthorised)
        ));
        assert!(matches!(
            ensure_admin(&store, Some(Uuid::new_v4())).await,
            Err(VirtueError::Unauthorised)
        ));
    }

    #[tokio::test]
    async fn passwords_round_trip_through_bcrypt() {
        let hash = hash_password(SecretString::from("correct horse".to_string())).await.unwrap();

        assert!(
            verify_password(SecretString::from("correct horse".to_string()), SecretString::from(hash.clone()))
                .await
                .unwrap()
        );
        assert!(
            !verify_password(SecretString::from("battery staple".to_string()), SecretString::from(hash))
                .await
                .unwrap()
        );
    }
}
