use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::birth_date::BirthDate;
use crate::domain::contact_email::ContactEmail;
use crate::domain::username::Username;

#[derive(Debug, Clone, serde::Serialize)]
pub struct BirthdayRecord {
    pub id: Uuid,
    pub username: Username,
    pub email: ContactEmail,
    #[serde(rename = "dob")]
    pub date_of_birth: BirthDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
