use crate::{
    auth::{AuthUtilities, VirtueSession, ensure_admin},
    data::class::FlattenedClass,
    error::{ApiResult, VirtueResult},
    maud_conveniences::render_table,
    state::VirtueState,
};
use axum::{Json, extract::State};
use maud::{Markup, html};

pub async fn get_admin_classes(State(state): State<VirtueState>, session: VirtueSession) -> VirtueResult<Markup> {
    ensure_admin(state.store(), session.caller_id()).await?;
    let classes = state.fetch_timetable().await?;

    let rows = classes
        .into_iter()
        .map(|class| {
            [
                html! { (class.id) },
                html! {
                    span class="inline-block w-3 h-3 rounded-full mr-2" style={"background-color: " (class.background_color)} {}
                    (class.name)
                },
                html! { (class.start_time) " - " (class.end_time) },
                html! { (day_names(&class.days_of_week)) },
                html! { (class.cost) },
                html! { (class.age.as_deref().unwrap_or("Any")) },
            ]
        })
        .collect();

    Ok(state.render(session, html! {
        div class="bg-gray-800 p-8 rounded shadow-md max-w-6xl w-full" {
            (render_table("Classes", ["ID", "Name", "Time", "Days", "Cost", "Age"], rows))
        }
    }))
}

pub async fn api_get_admin_classes(
    State(state): State<VirtueState>,
    session: VirtueSession,
) -> ApiResult<Json<Vec<FlattenedClass>>> {
    ensure_admin(state.store(), session.caller_id()).await?;
    Ok(Json(state.fetch_timetable().await?))
}

///`daysOfWeek` counts from Sunday, as the calendar widget does
fn day_names(days: &[u8]) -> String {
    const NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

    days.iter()
        .filter_map(|day| NAMES.get(usize::from(*day)))
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_app::{add_account, get_request, json_body, log_in, send, state};
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use serde_json::json;

    #[test]
    fn days_are_named_from_sunday() {
        assert_eq!(day_names(&[0, 3, 6]), "Sun, Wed, Sat");
        assert_eq!(day_names(&[9]), "");
    }

    #[tokio::test]
    async fn only_admins_get_the_class_list() {
        let state = state();
        add_account(&state, "admin@example.com").await;
        add_account(&state, "parent@example.com").await;
        let admin = log_in(&state, "admin@example.com").await;
        let parent = log_in(&state, "parent@example.com").await;

        for cookie in [None, Some(parent.as_str())] {
            let response = send(&state, get_request("/api/admin/classes", cookie)).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(json_body(response).await, json!({"error": "Unauthorised"}));
        }

        let response = send(&state, get_request("/api/admin/classes", Some(&admin))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let classes: Vec<FlattenedClass> = serde_json::from_value(json_body(response).await).unwrap();
        assert_eq!(classes, state.fetch_timetable().await.unwrap());
    }

    #[tokio::test]
    async fn class_table_page_is_admin_only() {
        let state = state();
        add_account(&state, "admin@example.com").await;
        add_account(&state, "parent@example.com").await;
        let admin = log_in(&state, "admin@example.com").await;
        let parent = log_in(&state, "parent@example.com").await;

        for cookie in [None, Some(parent.as_str())] {
            let response = send(&state, get_request("/admin/classes", cookie)).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }

        let response = send(&state, get_request("/admin/classes", Some(&admin))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8_lossy(&bytes);
        assert!(html.contains("Adult Acrobatics"));
        assert!(html.contains("Mini Movers"));
    }
}
