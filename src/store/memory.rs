use crate::{
    data::{
        booking::{Booking, BookingOutcome, NewBooking},
        student::{AddStudent, Student},
        user::{AddUser, User},
    },
    error::{EmailTakenSnafu, VirtueResult},
    store::{Store, StoredSession},
};
use async_trait::async_trait;
use chrono::Utc;
use secrecy::SecretString;
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    students: Vec<Student>,
    bookings: Vec<Booking>,
    sessions: HashMap<String, StoredSession>,
}

///everything behind one lock, so each operation is atomic with respect to the others
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn next_id(ids: impl Iterator<Item = i32>) -> i32 {
    ids.max().unwrap_or(0) + 1
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_user(&self, id: Uuid) -> VirtueResult<Option<User>> {
        Ok(self.tables().users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> VirtueResult<Option<User>> {
        Ok(self
            .tables()
            .users
            .iter()
            .find(|u| u.email.as_str() == email)
            .cloned())
    }

    async fn any_users_exist(&self) -> VirtueResult<bool> {
        Ok(!self.tables().users.is_empty())
    }

    async fn insert_user(&self, user: AddUser) -> VirtueResult<User> {
        let mut tables = self.tables();
        if tables
            .users
            .iter()
            .any(|u| u.email.as_str() == user.email.as_str())
        {
            return EmailTakenSnafu {
                email: user.email.to_string(),
            }
            .fail();
        }

        let user = User {
            id: Uuid::new_v4(),
            first_name: user.first_name,
            surname: user.surname,
            email: user.email,
            bcrypt_hashed_password: SecretString::from(user.bcrypt_hashed_password),
            is_admin: tables.users.is_empty(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn get_student(&self, id: i32) -> VirtueResult<Option<Student>> {
        Ok(self.tables().students.iter().find(|s| s.id == id).cloned())
    }

    async fn get_students_for_user(&self, user_id: Uuid) -> VirtueResult<Vec<Student>> {
        Ok(self
            .tables()
            .students
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert_student(&self, student: AddStudent) -> VirtueResult<i32> {
        let mut tables = self.tables();
        let id = next_id(tables.students.iter().map(|s| s.id));
        let AddStudent {
            user_id,
            first_name,
            last_name,
            date_of_birth,
            address1,
            address2,
            city,
            county,
            postcode,
        } = student;

        tables.students.push(Student {
            id,
            user_id,
            first_name,
            last_name,
            date_of_birth,
            address1,
            address2,
            city,
            county,
            postcode,
        });
        Ok(id)
    }

    async fn has_booking(&self, student_id: i32, class_id: &str) -> VirtueResult<bool> {
        Ok(self
            .tables()
            .bookings
            .iter()
            .any(|b| b.student_id == student_id && b.class_id == class_id))
    }

    async fn insert_booking_if_absent(&self, booking: NewBooking) -> VirtueResult<BookingOutcome> {
        let mut tables = self.tables();
        if tables
            .bookings
            .iter()
            .any(|b| b.student_id == booking.student_id && b.class_id == booking.class_id)
        {
            return Ok(BookingOutcome::AlreadyBooked);
        }

        let id = next_id(tables.bookings.iter().map(|b| b.id));
        tables.bookings.push(Booking {
            id,
            student_id: booking.student_id,
            class_id: booking.class_id,
            user_id: booking.user_id,
            created_at: Utc::now(),
        });
        Ok(BookingOutcome::Created(id))
    }

    async fn get_bookings_for_user(&self, user_id: Uuid) -> VirtueResult<Vec<Booking>> {
        Ok(self
            .tables()
            .bookings
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn session_exists(&self, id: &str) -> VirtueResult<bool> {
        Ok(self.tables().sessions.contains_key(id))
    }

    async fn save_session(&self, id: &str, session: StoredSession) -> VirtueResult<()> {
        self.tables().sessions.insert(id.to_string(), session);
        Ok(())
    }

    async fn load_session(&self, id: &str) -> VirtueResult<Option<StoredSession>> {
        Ok(self.tables().sessions.get(id).cloned())
    }

    async fn delete_session(&self, id: &str) -> VirtueResult<()> {
        self.tables().sessions.remove(id);
        Ok(())
    }

    async fn delete_expired_sessions(&self) -> VirtueResult<()> {
        let now = Utc::now();
        self.tables()
            .sessions
            .retain(|_, session| session.expiry_date >= now);
        Ok(())
    }
}
