use crate::{
    auth::{backend::VirtueAuthBackend, session_store::VirtueSessionStore},
    routes::{
        admin::get_admin_classes,
        api::api_router,
        bookings::{get_bookings, get_new_booking, post_new_booking},
        index::get_index_route,
        login::{get_login, post_login, post_logout},
        sign_up::{get_sign_up, post_sign_up},
        students::{get_new_student, get_students, post_new_student},
        timetable::{get_calendar, get_timetable},
    },
    state::VirtueState,
};
use axum::{
    Router,
    routing::{get, post},
};
use axum_login::{
    AuthManagerLayerBuilder,
    tower_sessions::{Expiry, SessionManagerLayer, cookie::time::Duration},
};

pub mod admin;
pub mod api;
pub mod bookings;
pub mod index;
pub mod login;
pub mod sign_up;
pub mod students;
pub mod timetable;

///every page and API route, behind the session and auth layers
pub fn app(state: VirtueState) -> Router {
    let session_layer = SessionManagerLayer::new(VirtueSessionStore::new(state.clone()))
        .with_expiry(Expiry::OnInactivity(Duration::days(5)));
    let auth_backend = VirtueAuthBackend::new(state.clone());
    let auth_layer = AuthManagerLayerBuilder::new(auth_backend, session_layer).build();

    Router::new()
        .route("/", get(get_index_route))
        .route("/timetable", get(get_timetable))
        .route("/calendar", get(get_calendar))
        .route("/students", get(get_students))
        .route("/students/new", get(get_new_student).post(post_new_student))
        .route("/bookings", get(get_bookings))
        .route("/bookings/new", get(get_new_booking).post(post_new_booking))
        .route("/admin/classes", get(get_admin_classes))
        .route("/login", get(get_login).post(post_login))
        .route("/logout", post(post_logout))
        .route("/sign-up", get(get_sign_up).post(post_sign_up))
        .merge(api_router())
        .layer(auth_layer)
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_app {
    use super::app;
    use crate::{
        config::{RuntimeConfiguration, timetable::TimetableSource},
        data::{
            student::AddStudent,
            user::{AddUser, User},
        },
        state::VirtueState,
        store::memory::MemoryStore,
    };
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
        response::Response,
    };
    use email_address::EmailAddress;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::{str::FromStr, sync::Arc};
    use tower::ServiceExt;
    use uuid::Uuid;

    pub const PASSWORD: &str = "correct-horse-battery-staple";

    pub fn state() -> VirtueState {
        VirtueState::with_store(
            Arc::new(MemoryStore::default()),
            RuntimeConfiguration::in_memory(TimetableSource::File(
                concat!(env!("CARGO_MANIFEST_DIR"), "/timetable.json").into(),
            )),
        )
    }

    ///adds an account that can log in with [`PASSWORD`]. the first one added is the admin.
    pub async fn add_account(state: &VirtueState, email: &str) -> User {
        //lowest bcrypt cost, to keep the tests quick
        let bcrypt_hashed_password = bcrypt::hash(PASSWORD, 4).unwrap();
        state
            .store()
            .insert_user(AddUser {
                first_name: "Test".into(),
                surname: "User".into(),
                email: EmailAddress::from_str(email).unwrap(),
                bcrypt_hashed_password,
            })
            .await
            .unwrap()
    }

    pub async fn add_student(state: &VirtueState, user_id: Uuid) -> i32 {
        state
            .store()
            .insert_student(AddStudent {
                user_id,
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                date_of_birth: None,
                address1: "1 Road".into(),
                address2: None,
                city: "London".into(),
                county: "Greater London".into(),
                postcode: "N1 1AA".into(),
            })
            .await
            .unwrap()
    }

    pub async fn send(state: &VirtueState, request: Request<Body>) -> Response {
        app(state.clone()).oneshot(request).await.unwrap()
    }

    pub async fn json_body(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    }

    pub fn location(response: &Response) -> Option<&str> {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    pub fn form_request(uri: &str, body: String, cookie: Option<&str>) -> Request<Body> {
        with_cookie(Request::post(uri), cookie)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    pub fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
        with_cookie(Request::get(uri), cookie)
            .body(Body::empty())
            .unwrap()
    }

    pub fn json_request(uri: &str, body: &Value, cookie: Option<&str>) -> Request<Body> {
        with_cookie(Request::post(uri), cookie)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn with_cookie(
        builder: axum::http::request::Builder,
        cookie: Option<&str>,
    ) -> axum::http::request::Builder {
        match cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    ///logs in through `/login`, returning the session cookie to send with later requests
    pub async fn log_in(state: &VirtueState, email: &str) -> String {
        let response = send(
            state,
            form_request("/login", format!("email={email}&password={PASSWORD}"), None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/"));

        response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|cookie| cookie.split(';').next())
            .unwrap()
            .to_string()
    }
}
