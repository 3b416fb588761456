use serde::{Deserialize, Serialize};
use std::fmt;

/// Email address value object
///
/// Stored trimmed and lower-cased so lookups are case-insensitive.
///
/// # Invariants
/// - Exactly one '@' with a non-empty local part
/// - Domain contains a '.' that is neither first nor last
/// - No whitespace, at most 254 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Creates a new Email value object
    ///
    /// # Example
    /// ```
    /// use cgk_platform_api::domain::user::value_objects::Email;
    ///
    /// let email = Email::new(" Orders@Example.com ").expect("valid email");
    /// assert_eq!(email.as_str(), "orders@example.com");
    /// ```
    pub fn new(email: impl Into<String>) -> Result<Self, String> {
        let email = email.into().trim().to_lowercase();
        if Self::is_valid(&email) {
            Ok(Email(email))
        } else {
            Err(format!("Invalid email: {}", email))
        }
    }

    fn is_valid(email: &str) -> bool {
        if email.len() > 254 || email.chars().any(char::is_whitespace) {
            return false;
        }

        let mut parts = email.split('@');
        let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
            return false;
        };

        !local.is_empty()
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
    }

    /// Returns the email as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the part after '@'
    pub fn domain(&self) -> &str {
        self.0.rsplit('@').next().unwrap_or_default()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Email::new(value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_email() {
        assert!(Email::new("test@example.com").is_ok());
    }

    #[test]
    fn valid_email_with_subdomain() {
        assert!(Email::new("user@mail.example.com").is_ok());
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        let email = Email::new("  Support@Brand.COM").unwrap();
        assert_eq!(email.as_str(), "support@brand.com");
        assert_eq!(email.domain(), "brand.com");
    }

    #[test]
    fn invalid_email_no_at_symbol() {
        assert!(Email::new("invalid").is_err());
    }

    #[test]
    fn invalid_email_two_at_symbols() {
        assert!(Email::new("a@b@example.com").is_err());
    }

    #[test]
    fn invalid_email_no_domain_dot() {
        assert!(Email::new("a@localhost").is_err());
        assert!(Email::new("a@.com").is_err());
        assert!(Email::new("a@example.").is_err());
    }

    #[test]
    fn invalid_email_empty_local_part() {
        assert!(Email::new("@example.com").is_err());
    }

    #[test]
    fn invalid_email_inner_whitespace() {
        assert!(Email::new("first last@example.com").is_err());
    }

    #[test]
    fn deserialize_validates() {
        let ok: Result<Email, _> = serde_json::from_str("\"a@b.co\"");
        assert!(ok.is_ok());
        let bad: Result<Email, _> = serde_json::from_str("\"nope\"");
        assert!(bad.is_err());
    }

    #[test]
    fn email_display() {
        let email = Email::new("test@example.com").unwrap();
        assert_eq!(format!("{}", email), "test@example.com");
    }
}
