use crate::{
    auth::{VirtueSession, hash_password},
    data::user::{AddUser, normalise_email},
    error::{EmailSnafu, VirtueError, VirtueResult},
    maud_conveniences::{errors_list, form_submit_button, simple_form_element, supertitle},
    state::VirtueState,
};
use axum::{
    Form,
    body::Body,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use bitflags::bitflags;
use email_address::EmailAddress;
use maud::html;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use snafu::ResultExt;
use std::str::FromStr;

bitflags! {
    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    pub struct SignUpDetailsError: u16 {
        const EMPTY_FIRST_NAME =  0b0000_0000_0000_0001;
        const EMPTY_SURNAME =     0b0000_0000_0000_0010;
        const EMPTY_PASSWORD =    0b0000_0000_0000_0100;
        const INVALID_EMAIL =     0b0000_0000_0000_1000;

        const MISMATCH_PASSWORD = 0b0000_0000_0010_0000;
        const EMAIL_TAKEN =       0b0000_0000_0100_0000;
    }
}

impl SignUpDetailsError {
    pub fn as_nice_list(&self) -> impl Iterator<Item = &'static str> {
        self.iter().filter_map(|x| match x {
            Self::EMPTY_FIRST_NAME => Some("Provided First Name was empty"),
            Self::EMPTY_SURNAME => Some("Provided surname was empty"),
            Self::EMPTY_PASSWORD => Some("Provided password was empty"),
            Self::INVALID_EMAIL => Some("Provided email wasn't a valid email address"),
            Self::MISMATCH_PASSWORD => Some("Passwords didn't match"),
            Self::EMAIL_TAKEN => Some("An account already exists with that email"),
            _ => None,
        })
    }
}

#[derive(Deserialize)]
pub struct SignUpQuery {
    errors: Option<u16>,
}

pub async fn get_sign_up(
    State(state): State<VirtueState>,
    session: VirtueSession,
    Query(SignUpQuery { errors }): Query<SignUpQuery>,
) -> VirtueResult<Response<Body>> {
    if session.user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    let is_first_account = !state.store().any_users_exist().await?;

    let errors = errors.map_or_else(
        SignUpDetailsError::empty,
        SignUpDetailsError::from_bits_truncate,
    );

    Ok(state.render(session, html! {
        div class="bg-gray-800 p-8 rounded-lg shadow-xl w-full max-w-md" {
            @if is_first_account {
                (supertitle("Create Admin Account"))
                p class="text-gray-300 mb-4" {"This is the first account on the site, so it will be able to manage classes."}
            } @else {
                (supertitle("Sign Up"))
            }

            @if !errors.is_empty() {
                (errors_list(errors.as_nice_list()))
            }

            form method="post" {
                (simple_form_element("first_name", "First Name", true, None, None))
                (simple_form_element("surname", "Surname", true, None, None))
                (simple_form_element("email", "Email", true, Some("email"), None))
                (simple_form_element("password", "Password", true, Some("password"), None))
                (simple_form_element("confirm_password", "Confirm Password", true, Some("password"), None))
                (form_submit_button(Some("Create Account")))
            }
        }
    }).into_response())
}

#[derive(Deserialize)]
pub struct SignUpForm {
    first_name: String,
    surname: String,
    email: String,
    password: SecretString,
    confirm_password: SecretString,
}

impl SignUpForm {
    fn validate(&self) -> SignUpDetailsError {
        let mut errors = SignUpDetailsError::empty();
        if self.first_name.trim().is_empty() {
            errors |= SignUpDetailsError::EMPTY_FIRST_NAME;
        }
        if self.surname.trim().is_empty() {
            errors |= SignUpDetailsError::EMPTY_SURNAME;
        }
        if !EmailAddress::is_valid(self.email.trim()) {
            errors |= SignUpDetailsError::INVALID_EMAIL;
        }
        if self.password.expose_secret().trim().is_empty() {
            errors |= SignUpDetailsError::EMPTY_PASSWORD;
        }
        if self.password.expose_secret() != self.confirm_password.expose_secret() {
            errors |= SignUpDetailsError::MISMATCH_PASSWORD;
        }
        errors
    }
}

pub async fn post_sign_up(
    State(state): State<VirtueState>,
    mut session: VirtueSession,
    Form(form): Form<SignUpForm>,
) -> VirtueResult<Redirect> {
    let errors = form.validate();
    if !errors.is_empty() {
        return Ok(Redirect::to(&format!("/sign-up?errors={}", errors.bits())));
    }

    let SignUpForm {
        first_name,
        surname,
        email,
        password,
        confirm_password: _,
    } = form;
    let email = EmailAddress::from_str(&normalise_email(&email)).context(EmailSnafu)?;
    let bcrypt_hashed_password = hash_password(password).await?;

    let user = match state
        .store()
        .insert_user(AddUser {
            first_name: first_name.trim().to_string(),
            surname: surname.trim().to_string(),
            email,
            bcrypt_hashed_password,
        })
        .await
    {
        Ok(user) => user,
        Err(VirtueError::EmailTaken { email }) => {
            warn!(?email, "Sign up with an email that already has an account");
            return Ok(Redirect::to(&format!(
                "/sign-up?errors={}",
                SignUpDetailsError::EMAIL_TAKEN.bits()
            )));
        }
        Err(e) => return Err(e),
    };
    info!(id = ?user.id, is_admin = user.is_admin, "Created account");

    session.login(&user).await?;

    Ok(Redirect::to(if user.is_admin { "/admin/classes" } else { "/students/new" }))
}
