use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an A/B test
///
/// # Status Transitions
/// ```text
/// Draft -> Running <-> Paused
///             |          |
///             +-> Completed <-+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ab_test_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AbTestStatus {
    /// Being configured, not visible to shoppers
    Draft,
    /// Assigning visitors and attributing orders
    Running,
    /// Temporarily stopped; existing assignments are kept
    Paused,
    /// Finished; results are frozen
    Completed,
}

impl AbTestStatus {
    /// Checks if a transition from current status to next status is valid
    ///
    /// # Example
    /// ```
    /// use cgk_platform_api::domain::ab_test::AbTestStatus;
    ///
    /// assert!(AbTestStatus::Draft.can_transition_to(AbTestStatus::Running));
    /// assert!(!AbTestStatus::Completed.can_transition_to(AbTestStatus::Running));
    /// ```
    pub fn can_transition_to(&self, next: AbTestStatus) -> bool {
        use AbTestStatus::*;
        matches!(
            (self, next),
            (Draft, Running)
                | (Running, Paused)
                | (Paused, Running)
                | (Running, Completed)
                | (Paused, Completed)
        )
    }

    /// Whether orders placed now may still be attributed
    ///
    /// Paused tests keep attributing so carts started before the pause count.
    pub fn accepts_attribution(&self) -> bool {
        matches!(self, AbTestStatus::Running | AbTestStatus::Paused)
    }
}

impl fmt::Display for AbTestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbTestStatus::Draft => write!(f, "draft"),
            AbTestStatus::Running => write!(f, "running"),
            AbTestStatus::Paused => write!(f, "paused"),
            AbTestStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Single-character variant tag used in shipping rate titles, e.g. `(A)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VariantSuffix(char);

impl VariantSuffix {
    /// Parses a suffix; accepts one ASCII alphanumeric character, upper-cased
    pub fn parse(value: &str) -> Result<Self, String> {
        let mut chars = value.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphanumeric() => Ok(Self(c.to_ascii_uppercase())),
            _ => Err(format!(
                "Variant suffix must be a single letter or digit, got '{}'",
                value
            )),
        }
    }

    pub fn as_char(&self) -> char {
        self.0
    }

    /// Rate title suffix the storefront expects, e.g. `" (B)"`
    pub fn rate_title_tag(&self) -> String {
        format!(" ({})", self.0)
    }
}

impl fmt::Display for VariantSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for VariantSuffix {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VariantSuffix> for String {
    fn from(suffix: VariantSuffix) -> Self {
        suffix.0.to_string()
    }
}
