use chrono::Utc;
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use crate::domain::birth_date::BirthDate;
use crate::domain::birthday_record::BirthdayRecord;
use crate::domain::contact_email::ContactEmail;
use crate::domain::new_birthday::NewBirthday;
use crate::domain::username::Username;

const PG_UNIQUE_VIOLATION: &str = "23505";

#[derive(thiserror::Error)]
pub enum StoreError {
    #[error("Email already exists")]
    DuplicateEmail,
    #[error("Birthday record not found")]
    NotFound,
    #[error("Failed to execute query")]
    Database(#[source] sqlx::Error),
}

impl std::fmt::Debug for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Caused by:\n\t({})", self)
    }
}

fn map_row(row: PgRow) -> BirthdayRecord {
    BirthdayRecord {
        id: row.get("id"),
        username: Username::parse(row.get("username")).unwrap(),
        email: ContactEmail::parse(row.get("email")).unwrap(),
        date_of_birth: BirthDate::new(row.get("date_of_birth")),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[tracing::instrument(name = "Insert a new birthday record", skip(new_birthday, db_pool))]
pub async fn insert_birthday(
    db_pool: &PgPool,
    new_birthday: &NewBirthday,
) -> Result<BirthdayRecord, StoreError> {
    if find_by_email(db_pool, new_birthday.email.as_ref())
        .await?
        .is_some()
    {
        return Err(StoreError::DuplicateEmail);
    }

    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO birthdays (id, username, email, date_of_birth, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, username, email, date_of_birth, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new_birthday.username.as_ref())
    .bind(new_birthday.email.as_ref())
    .bind(new_birthday.date_of_birth.as_date())
    .bind(now)
    .bind(now)
    .map(map_row)
    .fetch_one(db_pool)
    .await
    .map_err(|err| {
        // The unique index re-checks what find_by_email probed above.
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(PG_UNIQUE_VIOLATION) {
                return StoreError::DuplicateEmail;
            }
        }
        tracing::error!("Failed to execute query: {:?}", err);
        StoreError::Database(err)
    })
}

#[tracing::instrument(name = "List all birthday records", skip(db_pool))]
pub async fn list_birthdays(db_pool: &PgPool) -> Result<Vec<BirthdayRecord>, StoreError> {
    sqlx::query(
        r#"
        SELECT id, username, email, date_of_birth, created_at, updated_at
        FROM birthdays
        ORDER BY date_of_birth ASC
        "#,
    )
    .map(map_row)
    .fetch_all(db_pool)
    .await
    .map_err(|err| {
        tracing::error!("Failed to execute query: {:?}", err);
        StoreError::Database(err)
    })
}

/// Year-blind lookup for the daily scan. Matching runs in Rust through
/// `BirthDate::matches_month_day` rather than a database date-part
/// expression, keeping the predicate portable and unit-testable.
#[tracing::instrument(name = "Find birthday records by month and day", skip(db_pool))]
pub async fn find_by_month_day(
    db_pool: &PgPool,
    month: u32,
    day: u32,
) -> Result<Vec<BirthdayRecord>, StoreError> {
    let records = sqlx::query(
        r#"
        SELECT id, username, email, date_of_birth, created_at, updated_at
        FROM birthdays
        "#,
    )
    .map(map_row)
    .fetch_all(db_pool)
    .await
    .map_err(|err| {
        tracing::error!("Failed to execute query: {:?}", err);
        StoreError::Database(err)
    })?;

    Ok(records
        .into_iter()
        .filter(|record| record.date_of_birth.matches_month_day(month, day))
        .collect())
}

#[tracing::instrument(name = "Find a birthday record by email", skip(db_pool))]
pub async fn find_by_email(
    db_pool: &PgPool,
    email: &str,
) -> Result<Option<BirthdayRecord>, StoreError> {
    sqlx::query(
        r#"
        SELECT id, username, email, date_of_birth, created_at, updated_at
        FROM birthdays
        WHERE email = $1
        "#,
    )
    .bind(email)
    .map(map_row)
    .fetch_optional(db_pool)
    .await
    .map_err(|err| {
        tracing::error!("Failed to execute query: {:?}", err);
        StoreError::Database(err)
    })
}

#[tracing::instrument(name = "Delete a birthday record", skip(db_pool))]
pub async fn delete_birthday(db_pool: &PgPool, id: Uuid) -> Result<(), StoreError> {
    let result = sqlx::query("DELETE FROM birthdays WHERE id = $1")
        .bind(id)
        .execute(db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            StoreError::Database(err)
        })?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound);
    }

    Ok(())
}
