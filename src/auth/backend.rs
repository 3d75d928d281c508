use crate::{
    auth::verify_password,
    data::user::{User, normalise_email},
    error::VirtueError,
    state::VirtueState,
};
use async_trait::async_trait;
use axum_login::{AuthnBackend, UserId};
use secrecy::SecretString;

#[derive(Clone)]
pub struct VirtueAuthBackend {
    state: VirtueState,
}

impl VirtueAuthBackend {
    pub const fn new(state: VirtueState) -> Self {
        Self { state }
    }
}

pub enum VirtueAuthCredentials {
    EmailPassword {
        email: String,
        password: SecretString,
    },
}

#[async_trait]
impl AuthnBackend for VirtueAuthBackend {
    type User = User;
    type Credentials = VirtueAuthCredentials;
    type Error = VirtueError;

    async fn authenticate(
        &self,
        creds: Self::Credentials,
    ) -> Result<Option<Self::User>, Self::Error> {
        match creds {
            VirtueAuthCredentials::EmailPassword { email, password } => {
                let Some(user) = self.state.store().get_user_by_email(&normalise_email(&email)).await? else {
                    return Ok(None);
                };

                let password_verification_result =
                    verify_password(password, user.bcrypt_hashed_password.clone()).await?;

                Ok(password_verification_result.then_some(user))
            }
        }
    }

    async fn get_user(&self, user_id: &UserId<Self>) -> Result<Option<Self::User>, Self::Error> {
        self.state.store().get_user(*user_id).await
    }
}
