use axum_login::AuthUser;
use email_address::EmailAddress;
use maud::Render;
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub surname: String,
    pub email: EmailAddress,
    pub bcrypt_hashed_password: SecretString,
    pub is_admin: bool,
}

///a new account. whether it becomes an admin is decided by the store at insert time.
pub struct AddUser {
    pub first_name: String,
    pub surname: String,
    pub email: EmailAddress,
    pub bcrypt_hashed_password: String,
}

///emails are stored and looked up lowercased, so one address is one account
pub fn normalise_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Render for User {
    fn render_to(&self, buffer: &mut String) {
        self.first_name.render_to(buffer);
        buffer.push(' ');
        self.surname.render_to(buffer);
    }
}

impl AuthUser for User {
    type Id = Uuid;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn session_auth_hash(&self) -> &[u8] {
        self.bcrypt_hashed_password.expose_secret().as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalise_email("  Sam@Example.COM "), "sam@example.com");
        assert_eq!(normalise_email("sam@example.com"), "sam@example.com");
    }
}
