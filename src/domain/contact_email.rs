use validator::validate_email;

/// Contact address of a birthday record. Normalized to lowercase so the
/// uniqueness constraint in the store is case-insensitive.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ContactEmail(String);

impl ContactEmail {
    pub fn parse(email: String) -> Result<ContactEmail, String> {
        let normalized = email.trim().to_lowercase();
        let is_valid_email = validate_email(&normalized);

        if !is_valid_email {
            return Err(format!("{} email is not valid", email));
        }

        Ok(Self(normalized))
    }
}

impl AsRef<str> for ContactEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
