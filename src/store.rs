use crate::{
    data::{
        booking::{Booking, BookingOutcome, NewBooking},
        student::{AddStudent, Student},
        user::{AddUser, User},
    },
    error::VirtueResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

#[derive(Debug, Clone)]
pub struct StoredSession {
    pub data: Vec<u8>,
    pub expiry_date: DateTime<Utc>,
}

///everything the site persists. implemented over postgres for real deployments, and in memory for
///tests and quick local runs.
#[async_trait]
pub trait Store: Send + Sync + Debug {
    async fn get_user(&self, id: Uuid) -> VirtueResult<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> VirtueResult<Option<User>>;
    async fn any_users_exist(&self) -> VirtueResult<bool>;
    ///the first account ever created is made an admin
    async fn insert_user(&self, user: AddUser) -> VirtueResult<User>;

    async fn get_student(&self, id: i32) -> VirtueResult<Option<Student>>;
    async fn get_students_for_user(&self, user_id: Uuid) -> VirtueResult<Vec<Student>>;
    async fn insert_student(&self, student: AddStudent) -> VirtueResult<i32>;

    async fn has_booking(&self, student_id: i32, class_id: &str) -> VirtueResult<bool>;
    ///must check and insert as one atomic step
    async fn insert_booking_if_absent(&self, booking: NewBooking) -> VirtueResult<BookingOutcome>;
    async fn get_bookings_for_user(&self, user_id: Uuid) -> VirtueResult<Vec<Booking>>;

    async fn session_exists(&self, id: &str) -> VirtueResult<bool>;
    async fn save_session(&self, id: &str, session: StoredSession) -> VirtueResult<()>;
    async fn load_session(&self, id: &str) -> VirtueResult<Option<StoredSession>>;
    async fn delete_session(&self, id: &str) -> VirtueResult<()>;
    async fn delete_expired_sessions(&self) -> VirtueResult<()>;

    async fn close(&self) {}
}
