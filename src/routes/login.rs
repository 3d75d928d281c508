use crate::{
    auth::{VirtueSession, backend::VirtueAuthCredentials},
    error::VirtueResult,
    maud_conveniences::{form_submit_button, simple_form_element, title},
    state::VirtueState,
};
use axum::{
    Form,
    body::Body,
    extract::{Query, State},
    http::Response,
    response::{IntoResponse, Redirect},
};
use maud::html;
use secrecy::SecretString;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct LoginOptions {
    pub next: Option<String>,
    pub login_failed: Option<bool>,
}

///only ever redirect to somewhere on this site
pub fn local_redirect_target(next: Option<&str>) -> &str {
    match next {
        Some(next) if next.starts_with('/') && !next.starts_with("//") => next,
        _ => "/",
    }
}

pub async fn get_login(
    State(state): State<VirtueState>,
    session: VirtueSession,
    Query(LoginOptions { next, login_failed }): Query<LoginOptions>,
) -> VirtueResult<Response<Body>> {
    if !state.store().any_users_exist().await? {
        return Ok(Redirect::to("/sign-up").into_response());
    }

    if session.user.is_some() {
        return Ok(Redirect::to(local_redirect_target(next.as_deref())).into_response());
    }

    let login_failed = login_failed.unwrap_or(false);

    Ok(state.render(session, html! {
        div class="bg-gray-800 shadow-md rounded px-8 pt-6 pb-8 mb-4 w-full max-w-sm" {
            (title("Login"))
            @if login_failed {
                div role="alert" class="bg-red-100 border border-red-400 text-red-700 px-4 py-4 rounded relative" {
                    strong class="font-bold" {"Alert!"}
                    br;
                    // avoid giving extra details for security reasons :)
                    span class="block sm:inline" {"Email/Password not found or password incorrect"}
                }
                br;
            }

            form method="post" {
                @if let Some(next) = next {
                    input type="hidden" name="next" value=(next) {}
                }
                (simple_form_element("email", "Email", true, Some("email"), None))
                (simple_form_element("password", "Password", true, Some("password"), None))
                (form_submit_button(Some("Login")))
            }
            p class="text-sm text-gray-400 mt-4" {
                "No account yet? "
                a href="/sign-up" class="text-blue-400 underline" {"Sign up"}
            }
        }
    }).into_response())
}

#[derive(Deserialize)]
pub struct LoginForm {
    email: String,
    password: SecretString,
    next: Option<String>,
}

pub async fn post_login(
    mut session: VirtueSession,
    Form(LoginForm {
        email,
        password,
        next,
    }): Form<LoginForm>,
) -> VirtueResult<Redirect> {
    let Some(user) = session
        .authenticate(VirtueAuthCredentials::EmailPassword { email, password })
        .await?
    else {
        let mut redirect = "/login?login_failed=true".to_string();
        if let Some(next) = next {
            redirect += format!("&next={next}").as_str();
        }
        return Ok(Redirect::to(&redirect));
    };

    session.login(&user).await?;
    info!(id = ?user.id, "Logged in");

    Ok(Redirect::to(local_redirect_target(next.as_deref())))
}

pub async fn post_logout(mut session: VirtueSession) -> VirtueResult<Redirect> {
    session.logout().await?;
    Ok(Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirects_stay_on_site() {
        assert_eq!(local_redirect_target(Some("/bookings/new?class=2")), "/bookings/new?class=2");
        assert_eq!(local_redirect_target(Some("https://evil.example")), "/");
        assert_eq!(local_redirect_target(Some("//evil.example")), "/");
        assert_eq!(local_redirect_target(None), "/");
    }
}
