use crate::{
    config::DbConfig,
    data::{
        booking::{Booking, BookingOutcome, NewBooking},
        student::{AddStudent, Student},
        user::{AddUser, User},
    },
    error::{
        CommitTransactionSnafu, EmailSnafu, EmailTakenSnafu, GetDatabaseConnectionSnafu,
        MakeQuerySnafu, MigrateSnafu, OpenDatabaseSnafu, VirtueResult,
    },
    store::{Store, StoredSession},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use email_address::EmailAddress;
use secrecy::SecretString;
use snafu::ResultExt;
use sqlx::{Pool, Postgres, pool::PoolConnection, postgres::PgPoolOptions};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: Pool<Postgres>,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    first_name: String,
    surname: String,
    email: String,
    bcrypt_hashed_password: String,
    is_admin: bool,
}

impl TryFrom<UserRow> for User {
    type Error = crate::error::VirtueError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            first_name: row.first_name,
            surname: row.surname,
            email: EmailAddress::from_str(&row.email).context(EmailSnafu)?,
            bcrypt_hashed_password: SecretString::from(row.bcrypt_hashed_password),
            is_admin: row.is_admin,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    data: Vec<u8>,
    expiry_date: DateTime<Utc>,
}

impl PostgresStore {
    pub async fn connect(options: PgPoolOptions, config: &DbConfig) -> VirtueResult<Self> {
        let pool = options
            .connect(&config.get_db_path())
            .await
            .context(OpenDatabaseSnafu)?;

        sqlx::migrate!().run(&pool).await.context(MigrateSnafu)?;

        Ok(Self { pool })
    }

    async fn get_connection(&self) -> VirtueResult<PoolConnection<Postgres>> {
        self.pool
            .acquire()
            .await
            .context(GetDatabaseConnectionSnafu)
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn get_user(&self, id: Uuid) -> VirtueResult<Option<User>> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM public.users WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.get_connection().await?)
            .await
            .context(MakeQuerySnafu)?
            .map(User::try_from)
            .transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> VirtueResult<Option<User>> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM public.users WHERE email = $1")
            .bind(email)
            .fetch_optional(&mut *self.get_connection().await?)
            .await
            .context(MakeQuerySnafu)?
            .map(User::try_from)
            .transpose()
    }

    async fn any_users_exist(&self) -> VirtueResult<bool> {
        sqlx::query_scalar("SELECT exists(SELECT 1 FROM public.users)")
            .fetch_one(&mut *self.get_connection().await?)
            .await
            .context(MakeQuerySnafu)
    }

    async fn insert_user(&self, user: AddUser) -> VirtueResult<User> {
        let mut transaction = self.pool.begin().await.context(GetDatabaseConnectionSnafu)?;

        //stops two simultaneous first sign-ups from both becoming admins
        sqlx::query("LOCK TABLE public.users IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *transaction)
            .await
            .context(MakeQuerySnafu)?;
        let is_first: bool = sqlx::query_scalar("SELECT NOT exists(SELECT 1 FROM public.users)")
            .fetch_one(&mut *transaction)
            .await
            .context(MakeQuerySnafu)?;

        let Some(row) = sqlx::query_as::<_, UserRow>(
            "INSERT INTO public.users (first_name, surname, email, bcrypt_hashed_password, is_admin) VALUES ($1, $2, $3, $4, $5) ON CONFLICT (email) DO NOTHING RETURNING *",
        )
        .bind(&user.first_name)
        .bind(&user.surname)
        .bind(user.email.as_str())
        .bind(&user.bcrypt_hashed_password)
        .bind(is_first)
        .fetch_optional(&mut *transaction)
        .await
        .context(MakeQuerySnafu)?
        else {
            return EmailTakenSnafu {
                email: user.email.to_string(),
            }
            .fail();
        };

        transaction.commit().await.context(CommitTransactionSnafu)?;
        User::try_from(row)
    }

    async fn get_student(&self, id: i32) -> VirtueResult<Option<Student>> {
        sqlx::query_as::<_, Student>("SELECT * FROM public.students WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.get_connection().await?)
            .await
            .context(MakeQuerySnafu)
    }

    async fn get_students_for_user(&self, user_id: Uuid) -> VirtueResult<Vec<Student>> {
        sqlx::query_as::<_, Student>(
            "SELECT * FROM public.students WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&mut *self.get_connection().await?)
        .await
        .context(MakeQuerySnafu)
    }

    async fn insert_student(&self, student: AddStudent) -> VirtueResult<i32> {
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

        sqlx::query_scalar(
            "INSERT INTO public.students (user_id, first_name, last_name, date_of_birth, address1, address2, city, county, postcode) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING id",
        )
        .bind(user_id)
        .bind(first_name)
        .bind(last_name)
        .bind(date_of_birth)
        .bind(address1)
        .bind(address2)
        .bind(city)
        .bind(county)
        .bind(postcode)
        .fetch_one(&mut *self.get_connection().await?)
        .await
        .context(MakeQuerySnafu)
    }

    async fn has_booking(&self, student_id: i32, class_id: &str) -> VirtueResult<bool> {
        sqlx::query_scalar(
            "SELECT exists(SELECT 1 FROM public.bookings WHERE student_id = $1 AND class_id = $2)",
        )
        .bind(student_id)
        .bind(class_id)
        .fetch_one(&mut *self.get_connection().await?)
        .await
        .context(MakeQuerySnafu)
    }

    async fn insert_booking_if_absent(&self, booking: NewBooking) -> VirtueResult<BookingOutcome> {
        let id: Option<i32> = sqlx::query_scalar(
            "INSERT INTO public.bookings (student_id, class_id, user_id) VALUES ($1, $2, $3) ON CONFLICT ON CONSTRAINT bookings_one_per_student_and_class DO NOTHING RETURNING id",
        )
        .bind(booking.student_id)
        .bind(&booking.class_id)
        .bind(booking.user_id)
        .fetch_optional(&mut *self.get_connection().await?)
        .await
        .context(MakeQuerySnafu)?;

        Ok(id.map_or(BookingOutcome::AlreadyBooked, BookingOutcome::Created))
    }

    async fn get_bookings_for_user(&self, user_id: Uuid) -> VirtueResult<Vec<Booking>> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM public.bookings WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&mut *self.get_connection().await?)
        .await
        .context(MakeQuerySnafu)
    }

    async fn session_exists(&self, id: &str) -> VirtueResult<bool> {
        sqlx::query_scalar("SELECT exists(SELECT 1 FROM public.sessions WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *self.get_connection().await?)
            .await
            .context(MakeQuerySnafu)
    }

    async fn save_session(&self, id: &str, session: StoredSession) -> VirtueResult<()> {
        sqlx::query("INSERT INTO public.sessions VALUES ($1, $2, $3) ON CONFLICT (id) DO UPDATE SET data = excluded.data, expiry_date = excluded.expiry_date")
            .bind(id)
            .bind(session.data)
            .bind(session.expiry_date)
            .execute(&mut *self.get_connection().await?)
            .await
            .context(MakeQuerySnafu)?;
        Ok(())
    }

    async fn load_session(&self, id: &str) -> VirtueResult<Option<StoredSession>> {
        Ok(sqlx::query_as::<_, SessionRow>(
            "SELECT data, expiry_date FROM public.sessions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.get_connection().await?)
        .await
        .context(MakeQuerySnafu)?
        .map(|SessionRow { data, expiry_date }| StoredSession { data, expiry_date }))
    }

    async fn delete_session(&self, id: &str) -> VirtueResult<()> {
        sqlx::query("DELETE FROM public.sessions WHERE id = $1")
            .bind(id)
            .execute(&mut *self.get_connection().await?)
            .await
            .context(MakeQuerySnafu)?;
        Ok(())
    }

    async fn delete_expired_sessions(&self) -> VirtueResult<()> {
        sqlx::query("DELETE FROM public.sessions WHERE expiry_date < now()")
            .execute(&mut *self.get_connection().await?)
            .await
            .context(MakeQuerySnafu)?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
