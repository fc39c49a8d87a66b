use actix_web::{web, HttpResponse, ResponseError};
use reqwest::StatusCode;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::new_birthday::{NewBirthday, NewBirthdayBody};
use crate::store::{self, StoreError};

#[derive(thiserror::Error)]
pub enum BirthdayApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Email already exists")]
    DuplicateEmail,
    #[error("Something went wrong")]
    Store(#[source] StoreError),
}

impl std::fmt::Debug for BirthdayApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Caused by:\n\t({})", self)
    }
}

impl From<StoreError> for BirthdayApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => BirthdayApiError::DuplicateEmail,
            other => BirthdayApiError::Store(other),
        }
    }
}

impl ResponseError for BirthdayApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            BirthdayApiError::Validation(_) | BirthdayApiError::DuplicateEmail => {
                StatusCode::BAD_REQUEST
            }
            BirthdayApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}

#[tracing::instrument(
    name = "Creating a new birthday record",
    skip(body, db_pool),
    fields(
        record_username = %body.username,
        record_email = %body.email
    )
)]
pub async fn handle_create_birthday(
    body: web::Json<NewBirthdayBody>,
    db_pool: web::Data<PgPool>,
) -> Result<HttpResponse, BirthdayApiError> {
    let new_birthday: NewBirthday = body.into_inner().try_into().map_err(|err: String| {
        tracing::error!("Validation error: {:?}", err);
        BirthdayApiError::Validation(err)
    })?;

    let record = store::insert_birthday(&db_pool, &new_birthday).await?;

    Ok(HttpResponse::Created().json(record))
}

#[tracing::instrument(name = "Listing all birthday records", skip(db_pool))]
pub async fn handle_list_birthdays(
    db_pool: web::Data<PgPool>,
) -> Result<HttpResponse, BirthdayApiError> {
    let records = store::list_birthdays(&db_pool).await?;

    Ok(HttpResponse::Ok().json(records))
}

#[tracing::instrument(name = "Deleting a birthday record", skip(db_pool), fields(record_id = %path))]
pub async fn handle_delete_birthday(
    path: web::Path<String>,
    db_pool: web::Data<PgPool>,
) -> Result<HttpResponse, BirthdayApiError> {
    let id = Uuid::parse_str(&path)
        .map_err(|_| BirthdayApiError::Validation(format!("{} is not a valid record id", path)))?;

    match store::delete_birthday(&db_pool, id).await {
        Ok(()) => {}
        // Deleting something already gone is fine from the caller's side.
        Err(StoreError::NotFound) => {
            tracing::warn!("No birthday record with id {}, nothing deleted", id);
        }
        Err(err) => return Err(err.into()),
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Birthday deleted successfully" })))
}
