use crate::{
    data::class::{FlattenedClass, find_class},
    error::{
        AlreadyBookedSnafu, MissingClassSnafu, MissingStudentSnafu, StudentNotOwnedSnafu,
        VirtueResult,
    },
    store::Store,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use snafu::{OptionExt, ensure};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i32,
    pub student_id: i32,
    pub class_id: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: Uuid,
    pub student_id: i32,
    pub class_id: String,
}

///result of the single insert-or-reject. there is no separate "check" step.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    Created(i32),
    AlreadyBooked,
}

///books a student onto a class, rejecting a second booking for the same pair.
///
///the student has to belong to the booking user, and the class has to be on the current timetable.
pub async fn create_booking(
    store: &dyn Store,
    timetable: &[FlattenedClass],
    booking: NewBooking,
) -> VirtueResult<i32> {
    let student = store
        .get_student(booking.student_id)
        .await?
        .context(MissingStudentSnafu {
            id: booking.student_id,
        })?;
    ensure!(
        student.user_id == booking.user_id,
        StudentNotOwnedSnafu {
            student_id: student.id
        }
    );
    find_class(timetable, &booking.class_id).context(MissingClassSnafu {
        id: booking.class_id.clone(),
    })?;

    let (student_id, class_id) = (booking.student_id, booking.class_id.clone());
    match store.insert_booking_if_absent(booking).await? {
        BookingOutcome::Created(id) => {
            info!(id, student_id, ?class_id, "Created booking");
            Ok(id)
        }
        BookingOutcome::AlreadyBooked => AlreadyBookedSnafu {
            student_id,
            class_id,
        }
        .fail(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::{class::test_class, student::AddStudent},
        error::VirtueError,
        store::memory::MemoryStore,
    };
    use std::sync::Arc;

    async fn store_with_student() -> (MemoryStore, Uuid, i32) {
        let store = MemoryStore::default();
        let user_id = Uuid::new_v4();
        let student_id = store
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
            .unwrap();
        (store, user_id, student_id)
    }

    fn timetable() -> Vec<FlattenedClass> {
        vec![test_class("1", "Gymnastics"), test_class("2", "Freerunning")]
    }

    #[tokio::test]
    async fn first_booking_succeeds_and_duplicate_is_rejected() {
        let (store, user_id, student_id) = store_with_student().await;
        let booking = NewBooking {
            user_id,
            student_id,
            class_id: "1".into(),
        };

        create_booking(&store, &timetable(), booking.clone())
            .await
            .unwrap();
        assert!(store.has_booking(student_id, "1").await.unwrap());

        let err = create_booking(&store, &timetable(), booking)
            .await
            .unwrap_err();
        assert!(matches!(err, VirtueError::AlreadyBooked { .. }));
        assert_eq!(store.get_bookings_for_user(user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn same_student_can_book_different_classes() {
        let (store, user_id, student_id) = store_with_student().await;
        for class_id in ["1", "2"] {
            create_booking(
                &store,
                &timetable(),
                NewBooking {
                    user_id,
                    student_id,
                    class_id: class_id.into(),
                },
            )
            .await
            .unwrap();
        }
        assert_eq!(store.get_bookings_for_user(user_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn concurrent_submissions_create_exactly_one_booking() {
        let (store, user_id, student_id) = store_with_student().await;
        let store = Arc::new(store);
        let timetable = Arc::new(timetable());

        let attempts: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                let timetable = timetable.clone();
                tokio::spawn(async move {
                    create_booking(
                        store.as_ref(),
                        &timetable,
                        NewBooking {
                            user_id,
                            student_id,
                            class_id: "2".into(),
                        },
                    )
                    .await
                    .is_ok()
                })
            })
            .collect();

        let mut successes = 0;
        for attempt in attempts {
            if attempt.await.unwrap() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(store.get_bookings_for_user(user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn cannot_book_someone_elses_student() {
        let (store, _, student_id) = store_with_student().await;
        let err = create_booking(
            &store,
            &timetable(),
            NewBooking {
                user_id: Uuid::new_v4(),
                student_id,
                class_id: "1".into(),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, VirtueError::StudentNotOwned { .. }));
    }

    #[tokio::test]
    async fn unknown_students_and_classes_are_rejected() {
        let (store, user_id, student_id) = store_with_student().await;

        let err = create_booking(
            &store,
            &timetable(),
            NewBooking {
                user_id,
                student_id: student_id + 100,
                class_id: "1".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, VirtueError::MissingStudent { .. }));

        let err = create_booking(
            &store,
            &timetable(),
            NewBooking {
                user_id,
                student_id,
                class_id: "99".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, VirtueError::MissingClass { .. }));
        assert!(!store.has_booking(student_id, "99").await.unwrap());
    }
}
