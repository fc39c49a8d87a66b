pub mod birth_date;
pub mod birthday_record;
pub mod contact_email;
pub mod new_birthday;
pub mod username;
