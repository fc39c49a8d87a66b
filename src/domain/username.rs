use unicode_segmentation::UnicodeSegmentation;

const MAX_CHAR_LENGHT: usize = 256;
const FORBIDDEN_CHARS: [char; 9] = ['/', '{', '}', '"', '>', '<', '\\', '(', ')'];

#[derive(Debug, Clone, serde::Serialize)]
pub struct Username(String);

impl Username {
    /// Leading and trailing whitespace is dropped before validation, so
    /// `"  Ada "` is stored as `"Ada"`.
    pub fn parse(name: String) -> Result<Username, String> {
        let trimmed = name.trim();
        let is_empty = trimmed.is_empty();
        let is_too_long = trimmed.graphemes(true).count() > MAX_CHAR_LENGHT;
        let contains_forbidden_chars = trimmed.chars().any(|char| FORBIDDEN_CHARS.contains(&char));

        if is_empty || is_too_long || contains_forbidden_chars {
            return Err(format!("{} is not a valid username", name));
        }

        Ok(Self(trimmed.to_string()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
