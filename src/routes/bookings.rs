use crate::{
    auth::{AuthUtilities, VirtueSession},
    data::{
        booking::{NewBooking, create_booking},
        class::{ClassSummary, summarise},
        student::Student,
    },
    error::{VirtueError, VirtueResult},
    maud_conveniences::{form_element, form_submit_button, open_dialog, render_table, supertitle},
    routes::students::signed_out_prompt,
    state::VirtueState,
};
use axum::{
    Form,
    body::Body,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use serde::Deserialize;
use std::collections::HashMap;

const SELECT_CLASS: &str = "shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600";

///the booking form, or a prompt to register a student first if there aren't any
pub fn render_booking_form(
    students: &[Student],
    classes: &[ClassSummary],
    selected_class: Option<&str>,
    already_booked: bool,
) -> Markup {
    html! {
        div class="flex flex-col justify-center border border-white rounded-lg p-10 w-full max-w-2xl" {
            (supertitle("Booking Form"))
            @if students.is_empty() {
                h2 class="text-3xl flex justify-center" {"No registered students found."}
                div class="p-10 flex justify-center" {
                    a href="/students/new" class="bg-blue-600 hover:bg-blue-800 font-bold py-2 px-4 rounded text-xl" {
                        "Register a student"
                    }
                }
            } @else {
                form method="post" action="/bookings/new" class="p-8 space-y-6" {
                    (form_element("selected_class", "Class", html! {
                        select required id="selected_class" name="selected_class" class=(SELECT_CLASS) {
                            option value="" disabled selected[selected_class.is_none()] {"Select a class to book"}
                            @for class in classes {
                                option value=(class.id) selected[selected_class == Some(class.id.as_str())] {(class.name)}
                            }
                        }
                    }))
                    (form_element("selected_student", "Student", html! {
                        select required id="selected_student" name="selected_student" class=(SELECT_CLASS) {
                            option value="" disabled selected {"Select a student for this class"}
                            @for student in students {
                                option value=(student.id) {(student.full_name())}
                            }
                        }
                    }))
                    (form_submit_button(Some("Submit")))
                }
            }
            @if already_booked {
                (open_dialog("Booking already exists", html! {
                    p class="flex justify-center" {"This student is already booked for this class."}
                }))
            }
        }
    }
}

#[derive(Deserialize)]
pub struct NewBookingQuery {
    class: Option<String>,
}

pub async fn get_new_booking(
    State(state): State<VirtueState>,
    session: VirtueSession,
    Query(NewBookingQuery { class }): Query<NewBookingQuery>,
) -> VirtueResult<Markup> {
    let Some(user) = session.user.clone() else {
        return Ok(state.render(session, signed_out_prompt("to book a class")));
    };

    let students = state.store().get_students_for_user(user.id).await?;
    let classes = summarise(&state.fetch_timetable().await?);

    Ok(state.render(
        session,
        render_booking_form(&students, &classes, class.as_deref(), false),
    ))
}

#[derive(Deserialize)]
pub struct NewBookingForm {
    selected_class: String,
    selected_student: i32,
}

pub async fn post_new_booking(
    State(state): State<VirtueState>,
    session: VirtueSession,
    Form(NewBookingForm {
        selected_class,
        selected_student,
    }): Form<NewBookingForm>,
) -> VirtueResult<Response<Body>> {
    let user = session.require_user()?.clone();
    let timetable = state.fetch_timetable().await?;

    match create_booking(
        state.store(),
        &timetable,
        NewBooking {
            user_id: user.id,
            student_id: selected_student,
            class_id: selected_class.clone(),
        },
    )
    .await
    {
        Ok(_) => Ok(Redirect::to("/bookings").into_response()),
        Err(VirtueError::AlreadyBooked { .. }) => {
            warn!(student_id = selected_student, class_id = ?selected_class, "Student already has a booking for this class");
            let students = state.store().get_students_for_user(user.id).await?;
            let classes = summarise(&timetable);
            let page = state.render(
                session,
                render_booking_form(&students, &classes, Some(&selected_class), true),
            );
            Ok((StatusCode::CONFLICT, page).into_response())
        }
        Err(e) => Err(e),
    }
}

pub async fn get_bookings(State(state): State<VirtueState>, session: VirtueSession) -> VirtueResult<Markup> {
    let Some(user) = session.user.clone() else {
        return Ok(state.render(session, signed_out_prompt("to view your bookings")));
    };

    let bookings = state.store().get_bookings_for_user(user.id).await?;
    let students: HashMap<i32, Student> = state
        .store()
        .get_students_for_user(user.id)
        .await?
        .into_iter()
        .map(|student| (student.id, student))
        .collect();
    let class_names: HashMap<String, String> = summarise(&state.fetch_timetable().await?)
        .into_iter()
        .map(|ClassSummary { id, name }| (id, name))
        .collect();

    let rows = bookings
        .into_iter()
        .map(|booking| {
            [
                html! {
                    @if let Some(student) = students.get(&booking.student_id) {
                        (student.full_name())
                    } @else {
                        p class="italic" {"Unknown student"}
                    }
                },
                html! {
                    @if let Some(name) = class_names.get(&booking.class_id) {
                        (name)
                    } @else {
                        p class="italic" {"No longer on the timetable"}
                    }
                },
                html! { (booking.created_at.format("%a %d/%m/%y @ %H:%M")) },
            ]
        })
        .collect();

    Ok(state.render(session, html! {
        div class="bg-gray-800 p-8 rounded shadow-md max-w-4xl w-full flex flex-col space-y-4" {
            (render_table("Your Bookings", ["Student", "Class", "Booked"], rows))
            a href="/bookings/new" class="bg-blue-600 hover:bg-blue-800 font-bold py-2 px-4 rounded text-center" {
                "Book a Class"
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn student() -> Student {
        Student {
            id: 9,
            user_id: Uuid::nil(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            date_of_birth: None,
            address1: "1 Road".into(),
            address2: None,
            city: "London".into(),
            county: "Greater London".into(),
            postcode: "N1 1AA".into(),
        }
    }

    fn classes() -> Vec<ClassSummary> {
        vec![
            ClassSummary {
                id: "1".into(),
                name: "Acro".into(),
            },
            ClassSummary {
                id: "2".into(),
                name: "Tumbling".into(),
            },
        ]
    }

    #[test]
    fn no_students_means_a_prompt_to_register() {
        let html = render_booking_form(&[], &classes(), None, false).into_string();

        assert!(html.contains("No registered students found."));
        assert!(html.contains("/students/new"));
        assert!(!html.contains("<form"));
    }

    #[test]
    fn students_get_the_form_with_the_class_preselected() {
        let html = render_booking_form(&[student()], &classes(), Some("2"), false).into_string();

        assert!(html.contains("<form"));
        assert!(html.contains("Ada Lovelace"));
        assert!(html.contains(r#"<option value="2" selected>Tumbling</option>"#));
        assert!(!html.contains("Booking already exists"));
    }

    #[test]
    fn duplicate_booking_shows_the_dialog() {
        let html = render_booking_form(&[student()], &classes(), Some("1"), true).into_string();
        assert!(html.contains("Booking already exists"));
        assert!(html.contains("This student is already booked for this class."));
    }
}
