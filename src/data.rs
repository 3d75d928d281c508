pub mod booking;
pub mod class;
pub mod student;
pub mod user;
