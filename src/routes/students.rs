use crate::{
    auth::{AuthUtilities, VirtueSession},
    data::student::{NewStudentForm, Student, StudentDetailsError},
    error::VirtueResult,
    maud_conveniences::{
        errors_list, form_submit_button, simple_form_element, supertitle, title,
    },
    state::VirtueState,
};
use axum::{
    Form,
    body::Body,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use maud::{Markup, html};
use serde::Deserialize;

pub fn signed_out_prompt(action: &'static str) -> Markup {
    html! {
        div class="flex justify-center" {
            h1 class="text-2xl text-white" {
                "Please "
                a href="/login" class="text-blue-400" {"sign in"}
                " " (action)
            }
        }
    }
}

pub fn render_student_cards(students: &[Student]) -> Markup {
    html! {
        div class="grid grid-cols-1 gap-4 sm:grid-cols-2 lg:grid-cols-3 p-8" {
            @for student in students {
                div class="bg-gray-800 rounded-lg shadow-md p-4" {
                    h2 class="text-xl font-semibold mb-2" {(student.full_name())}
                    p {
                        span class="font-semibold" {"Student First Name: "}
                        (student.first_name)
                    }
                    p {
                        span class="font-semibold" {"Student Last Name: "}
                        (student.last_name)
                    }
                    p {
                        span class="font-semibold" {"Student Date Of Birth: "}
                        @if let Some(dob) = student.date_of_birth {
                            (dob.format("%d/%m/%Y"))
                        } @else {
                            "N/A"
                        }
                    }
                    p {
                        span class="font-semibold" {"Address: "}
                        (student.address())
                    }
                }
            }
        }
    }
}

pub async fn get_students(State(state): State<VirtueState>, session: VirtueSession) -> VirtueResult<Markup> {
    let Some(user) = session.user.clone() else {
        return Ok(state.render(session, signed_out_prompt("to view your registered students")));
    };
    let students = state.store().get_students_for_user(user.id).await?;

    Ok(state.render(session, html! {
        div class="w-full max-w-5xl flex flex-col" {
            (supertitle("Current Students"))
            a href="/students/new" class="bg-slate-700 hover:bg-slate-600 font-bold py-2 px-4 rounded text-center" {
                "Add New Student"
            }
            @if students.is_empty() {
                p class="text-center text-gray-400 mt-8" {"No students registered yet."}
            } @else {
                (render_student_cards(&students))
            }
        }
    }))
}

#[derive(Deserialize)]
pub struct NewStudentQuery {
    errors: Option<u16>,
}

pub async fn get_new_student(
    State(state): State<VirtueState>,
    session: VirtueSession,
    Query(NewStudentQuery { errors }): Query<NewStudentQuery>,
) -> Response<Body> {
    if session.user.is_none() {
        return Redirect::to("/login?next=/students/new").into_response();
    }

    let errors = errors.map_or_else(
        StudentDetailsError::empty,
        StudentDetailsError::from_bits_truncate,
    );

    state.render(session, html! {
        div class="bg-gray-800 p-8 rounded-lg shadow-xl w-full max-w-lg" {
            (title("Register a Student"))
            @if !errors.is_empty() {
                (errors_list(errors.as_nice_list()))
            }
            form method="post" {
                (simple_form_element("first_name", "First Name", true, None, None))
                (simple_form_element("last_name", "Last Name", true, None, None))
                (simple_form_element("date_of_birth", "Date of Birth (optional)", false, Some("date"), None))
                (simple_form_element("address1", "Address Line 1", true, None, None))
                (simple_form_element("address2", "Address Line 2 (optional)", false, None, None))
                (simple_form_element("city", "City", true, None, None))
                (simple_form_element("county", "County", true, None, None))
                (simple_form_element("postcode", "Postcode", true, None, None))
                (form_submit_button(Some("Register Student")))
            }
        }
    }).into_response()
}

pub async fn post_new_student(
    State(state): State<VirtueState>,
    session: VirtueSession,
    Form(form): Form<NewStudentForm>,
) -> VirtueResult<Redirect> {
    let user = session.require_user()?;

    let student = match form.validate(user.id, Utc::now().date_naive()) {
        Ok(student) => student,
        Err(errors) => {
            return Ok(Redirect::to(&format!("/students/new?errors={}", errors.bits())));
        }
    };

    let id = state.store().insert_student(student).await?;
    info!(id, user = ?user.id, "Registered student");

    Ok(Redirect::to("/students"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[test]
    fn cards_show_names_and_missing_dates() {
        let students = [Student {
            id: 1,
            user_id: Uuid::nil(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            date_of_birth: None,
            address1: "1 Road".into(),
            address2: None,
            city: "London".into(),
            county: "Greater London".into(),
            postcode: "N1 1AA".into(),
        }, Student {
            id: 2,
            user_id: Uuid::nil(),
            first_name: "Alan".into(),
            last_name: "Turing".into(),
            date_of_birth: NaiveDate::from_ymd_opt(2016, 6, 23),
            address1: "2 Road".into(),
            address2: None,
            city: "Wilmslow".into(),
            county: "Cheshire".into(),
            postcode: "SK9 1AA".into(),
        }];

        let html = render_student_cards(&students).into_string();
        assert!(html.contains("Ada Lovelace"));
        assert!(html.contains("N/A"));
        assert!(html.contains("23/06/2016"));
    }
}
