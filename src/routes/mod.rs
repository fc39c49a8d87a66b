pub mod birthdays;
pub mod health_check;
pub mod scan;

pub use birthdays::{handle_create_birthday, handle_delete_birthday, handle_list_birthdays};
pub use health_check::health_check;
pub use scan::handle_trigger_scan;
