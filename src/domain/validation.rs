use std::fmt;

/// Collected validation failures for a single input
///
/// Validation keeps going after the first problem so callers can report
/// everything wrong with a request at once.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(Vec<String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    /// Records `message` when `condition` is false
    pub fn check(&mut self, condition: bool, message: impl Into<String>) {
        if !condition {
            self.push(message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }

    /// Converts into a `Result`, failing when any error was recorded
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn collects_all_messages() {
        let mut errors = ValidationErrors::new();
        errors.check(false, "name is required");
        errors.check(true, "never recorded");
        errors.push("weights must sum to 100");

        let err = errors.into_result().unwrap_err();
        assert_eq!(err.messages().len(), 2);
        assert_eq!(err.to_string(), "name is required; weights must sum to 100");
    }
}
