use crate::{auth::VirtueSession, state::VirtueState};
use axum::extract::State;
use maud::{Markup, html};

pub async fn get_index_route(State(state): State<VirtueState>, session: VirtueSession) -> Markup {
    let join_link = if session.user.is_some() {
        "/students/new"
    } else {
        "/sign-up"
    };

    state.render(session, html! {
        div class="bg-gray-800 p-8 rounded shadow-md max-w-md w-full" {
            h1 class="text-5xl font-bold text-center" {"Virtue"}
            h2 class="text-3xl font-semibold mb-6 text-center text-gray-300" {"Movement Co."}

            div class="flex flex-row space-x-4 justify-center" {
                a href=(join_link) class="bg-blue-600 hover:bg-blue-800 font-bold py-2 px-4 rounded" {
                    "JOIN THE FAMILY"
                }
                a href="/timetable" class="bg-slate-600 hover:bg-slate-800 font-bold py-2 px-4 rounded" {
                    "TIMETABLE"
                }
            }
        }
    })
}
