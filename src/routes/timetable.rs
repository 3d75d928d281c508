use crate::{
    auth::VirtueSession, data::class::FlattenedClass, error::VirtueResult, state::VirtueState,
};
use axum::extract::State;
use maud::{Markup, PreEscaped, html};

///JSON that is safe to drop straight into a `<script>` element
fn script_safe_json(classes: &[FlattenedClass]) -> String {
    serde_json::to_string(classes)
        .unwrap_or_else(|_| "[]".to_string())
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

fn render_calendar(classes: &[FlattenedClass]) -> Markup {
    html! {
        div class="w-full max-w-6xl bg-white text-gray-900 rounded-lg p-4" {
            div id="calendar" {}
        }
        dialog id="class_dialog" class="fixed inset-0 m-auto bg-gray-800 text-white rounded-lg shadow-xl p-8 max-w-md w-full" {
            h2 id="class_dialog_title" class="text-2xl font-semibold mb-2 text-center" {}
            p id="class_dialog_cost" class="text-center" {}
            p id="class_dialog_age" class="text-center mb-4" {}
            p id="class_dialog_description" class="mb-4" {}
            a id="class_dialog_book" href="/bookings/new" class="block w-full bg-blue-600 hover:bg-blue-800 font-bold py-2 px-4 rounded text-center" {
                "Book This Class"
            }
            form method="dialog" class="flex justify-center mt-4" {
                button class="bg-slate-600 hover:bg-slate-800 font-bold py-2 px-4 rounded" {"Close"}
            }
        }
        script type="application/json" id="timetable_data" {(PreEscaped(script_safe_json(classes)))}
        script src="https://cdn.jsdelivr.net/npm/fullcalendar@6.1.15/index.global.min.js" {}
        script {(PreEscaped(include_str!("timetable.js")))}
    }
}

pub async fn get_timetable(State(state): State<VirtueState>, session: VirtueSession) -> VirtueResult<Markup> {
    let classes = state.fetch_timetable().await?;
    Ok(state.render(session, render_calendar(&classes)))
}

pub async fn get_calendar(State(state): State<VirtueState>, session: VirtueSession) -> VirtueResult<Markup> {
    get_timetable(State(state), session).await
}
