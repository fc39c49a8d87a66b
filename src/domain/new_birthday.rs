use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::birth_date::BirthDate;
use crate::domain::contact_email::ContactEmail;
use crate::domain::username::Username;

pub struct NewBirthday {
    pub username: Username,
    pub email: ContactEmail,
    pub date_of_birth: BirthDate,
}

#[derive(Deserialize)]
pub struct NewBirthdayBody {
    pub username: String,
    pub email: String,
    pub dob: NaiveDate,
}

impl TryFrom<NewBirthdayBody> for NewBirthday {
    type Error = String;

    fn try_from(body: NewBirthdayBody) -> Result<Self, Self::Error> {
        let username = Username::parse(body.username)?;
        let email = ContactEmail::parse(body.email)?;
        let date_of_birth = BirthDate::new(body.dob);

        Ok(NewBirthday {
            username,
            email,
            date_of_birth,
        })
    }
}
