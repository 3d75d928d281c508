//! JSON endpoints, with the paths and field names the booking site's frontend has always used.
//!
//! Where a legacy `user_id` parameter is still sent it must name the signed-in account.

use crate::{
    auth::{AuthUtilities, VirtueSession},
    data::{
        booking::{NewBooking, create_booking},
        class::FlattenedClass,
        student::Student,
    },
    error::{ApiResult, ParseStudentIdSnafu},
    routes::admin::api_get_admin_classes,
    state::VirtueState,
};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use uuid::Uuid;

pub fn api_router() -> Router<VirtueState> {
    Router::new()
        .route("/api/fetch/getAllUsersStudents", get(get_all_users_students))
        .route("/api/check/checkDuplicateBooking", get(check_duplicate_booking))
        .route("/api/check/checkIfUserIsAdmin", get(check_if_user_is_admin))
        .route("/api/store/storeBooking", post(store_booking))
        .route("/api/admin/classes", get(api_get_admin_classes))
        .route("/api/fetchTimetable", get(fetch_timetable))
}

#[derive(Deserialize)]
pub struct UserIdQuery {
    user_id: Uuid,
}

pub async fn get_all_users_students(
    State(state): State<VirtueState>,
    session: VirtueSession,
    Query(UserIdQuery { user_id }): Query<UserIdQuery>,
) -> ApiResult<Json<Vec<Student>>> {
    let user_id = session.require_account(user_id)?.id;
    Ok(Json(state.store().get_students_for_user(user_id).await?))
}

#[derive(Deserialize)]
pub struct DuplicateBookingQuery {
    student_id: i32,
    selected_class: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HasBooking {
    has_booking: bool,
}

pub async fn check_duplicate_booking(
    State(state): State<VirtueState>,
    Query(DuplicateBookingQuery {
        student_id,
        selected_class,
    }): Query<DuplicateBookingQuery>,
) -> ApiResult<Json<HasBooking>> {
    let has_booking = state
        .store()
        .has_booking(student_id, &selected_class)
        .await?;
    Ok(Json(HasBooking { has_booking }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IsAdmin {
    is_admin: bool,
}

pub async fn check_if_user_is_admin(
    State(state): State<VirtueState>,
    Query(UserIdQuery { user_id }): Query<UserIdQuery>,
) -> ApiResult<Json<IsAdmin>> {
    let is_admin = state
        .store()
        .get_user(user_id)
        .await?
        .is_some_and(|user| user.is_admin);
    Ok(Json(IsAdmin { is_admin }))
}

#[derive(Deserialize)]
pub struct StoreBookingRequest {
    selected_class: String,
    selected_student: String,
    user_id: Uuid,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredBooking {
    booking_id: i32,
}

pub async fn store_booking(
    State(state): State<VirtueState>,
    session: VirtueSession,
    Json(StoreBookingRequest {
        selected_class,
        selected_student,
        user_id,
    }): Json<StoreBookingRequest>,
) -> ApiResult<(StatusCode, Json<StoredBooking>)> {
    let user_id = session.require_account(user_id)?.id;
    let student_id = selected_student
        .trim()
        .parse()
        .context(ParseStudentIdSnafu {
            original: selected_student.clone(),
        })?;
    let timetable = state.fetch_timetable().await?;

    let booking_id = create_booking(
        state.store(),
        &timetable,
        NewBooking {
            user_id,
            student_id,
            class_id: selected_class,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(StoredBooking { booking_id })))
}

pub async fn fetch_timetable(State(state): State<VirtueState>) -> ApiResult<Json<Vec<FlattenedClass>>> {
    Ok(Json(state.fetch_timetable().await?))
}
