use crate::auth::backend::VirtueAuthBackend;
use axum::{
    Json,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::html;
use serde_json::json;
use snafu::Snafu;
use std::{num::ParseIntError, path::PathBuf};
use uuid::Uuid;

pub type VirtueResult<T> = Result<T, VirtueError>;
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum VirtueError {
    #[snafu(display("Error opening database"))]
    OpenDatabase { source: sqlx::Error },
    #[snafu(display("Error getting db connection"))]
    GetDatabaseConnection { source: sqlx::Error },
    #[snafu(display("Error making SQL query"))]
    MakeQuery { source: sqlx::Error },
    #[snafu(display("Error commiting SQL transaction"))]
    CommitTransaction { source: sqlx::Error },
    #[snafu(display("Error migrating DB schema"))]
    MigrateError { source: sqlx::migrate::MigrateError },
    #[snafu(display("Error converting unix timestamp {} to a date", timestamp))]
    InvalidDateTime { timestamp: i64 },
    #[snafu(display("Error serialising with rmp_serde"))]
    RmpSerdeEncode { source: rmp_serde::encode::Error },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse IP port"))]
    ParsePort { source: ParseIntError },
    #[snafu(display("Unknown store kind {:?}, expected `postgres` or `memory`", found))]
    UnknownStoreKind { found: String },
    #[snafu(display("Unable to parse student ID {:?}", original))]
    ParseStudentId {
        source: ParseIntError,
        original: String,
    },
    #[snafu(display("Unable to find student with ID: {}", id))]
    MissingStudent { id: i32 },
    #[snafu(display("Unable to find class with ID: {:?}", id))]
    MissingClass { id: String },
    #[snafu(display("Student {} is not registered to this account", student_id))]
    StudentNotOwned { student_id: i32 },
    #[snafu(display("Cannot act on behalf of another account"))]
    ForeignAccount { requested: Uuid },
    #[snafu(display("This student is already booked for this class"))]
    AlreadyBooked { student_id: i32, class_id: String },
    #[snafu(display("An account already exists for {}", email))]
    EmailTaken { email: String },
    #[snafu(display("Error with hashing/password verification"))]
    Bcrypt { source: bcrypt::BcryptError },
    #[snafu(display("Error joining blocking task"))]
    JoinTask { source: tokio::task::JoinError },
    #[snafu(display("Error with sessions"))]
    TowerSession {
        source: axum_login::tower_sessions::session::Error,
    },
    #[snafu(display("Unauthorised"))]
    Unauthorised,
    #[snafu(display("Unauthorised"))]
    NotAdmin { id: Uuid },
    #[snafu(display("Error parsing email address"))]
    Email { source: email_address::Error },
    #[snafu(display("Unable to read timetable from {}", path.display()))]
    ReadTimetable {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("Unable to fetch timetable from {}", url))]
    FetchTimetable { source: reqwest::Error, url: String },
    #[snafu(display("Unable to decode timetable"))]
    DecodeTimetable { source: serde_json::Error },
}

impl From<axum_login::Error<VirtueAuthBackend>> for VirtueError {
    fn from(value: axum_login::Error<VirtueAuthBackend>) -> Self {
        match value {
            axum_login::Error::Session(source) => Self::TowerSession { source },
            axum_login::Error::Backend(backend) => backend,
        }
    }
}

impl VirtueError {
    #[allow(clippy::match_same_arms)]
    pub fn status_code(&self) -> StatusCode {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const NA: StatusCode = StatusCode::FORBIDDEN; //not allowed
        const BI: StatusCode = StatusCode::BAD_REQUEST; //bad input
        const UA: StatusCode = StatusCode::UNAUTHORIZED; //unauthorised
        const CF: StatusCode = StatusCode::CONFLICT; //conflict

        match self {
            Self::OpenDatabase { .. } | Self::GetDatabaseConnection { .. } => ISE,
            Self::CommitTransaction { .. } | Self::MigrateError { .. } => ISE,
            Self::MakeQuery { source } => match source {
                sqlx::Error::RowNotFound => NF,
                _ => ISE,
            },
            Self::InvalidDateTime { .. } => ISE,
            Self::RmpSerdeEncode { .. } => ISE,
            Self::BadEnvVar { .. } | Self::ParsePort { .. } | Self::UnknownStoreKind { .. } => ISE,
            Self::ParseStudentId { .. } => BI,
            Self::MissingStudent { .. } | Self::MissingClass { .. } => NF,
            Self::StudentNotOwned { .. } | Self::ForeignAccount { .. } => NA,
            Self::AlreadyBooked { .. } | Self::EmailTaken { .. } => CF,
            Self::Bcrypt { .. } | Self::JoinTask { .. } | Self::TowerSession { .. } => ISE,
            Self::Unauthorised | Self::NotAdmin { .. } => UA,
            Self::Email { .. } => BI,
            Self::ReadTimetable { .. } | Self::FetchTimetable { .. } => ISE,
            Self::DecodeTimetable { .. } => ISE,
        }
    }
}

impl IntoResponse for VirtueError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        error!(?self, "Error!");

        let body = html! {
            div class="bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4" role="alert" {
                strong class="font-bold" {"Error: "}
                span {(self.to_string())}
            }
        };

        (status_code, Html(body)).into_response()
    }
}

///the same errors, but rendered as `{"error": "..."}` for the JSON API
#[derive(Debug)]
pub struct ApiError(pub VirtueError);

impl From<VirtueError> for ApiError {
    fn from(value: VirtueError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let Self(inner) = self;
        let status_code = inner.status_code();
        error!(?inner, "API Error!");

        (status_code, Json(json!({ "error": inner.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_errors_map_to_expected_status_codes() {
        assert_eq!(
            VirtueError::AlreadyBooked {
                student_id: 1,
                class_id: "1".into()
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            VirtueError::NotAdmin { id: Uuid::nil() }.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            VirtueError::StudentNotOwned { student_id: 3 }.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            VirtueError::ForeignAccount { requested: Uuid::nil() }.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            VirtueError::MissingClass { id: "x".into() }.status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn api_errors_render_as_json() {
        let response = ApiError(VirtueError::Unauthorised).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response
                .headers()
                .get(axum::http::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("application/json")
        );
    }
}
