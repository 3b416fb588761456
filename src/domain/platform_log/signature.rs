//! Error fingerprinting
//!
//! Error messages that differ only in dynamic values (ids, emails, prices,
//! timestamps) should group together. Messages are normalized by replacing
//! those values with placeholders, then hashed.

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

fn rule(pattern: &str, replacement: &'static str) -> Rule {
    Rule {
        pattern: Regex::new(pattern).expect("normalization pattern is valid"),
        replacement,
    }
}

// Order matters: broad tokens (URLs) first, bare digit runs last.
static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        rule(r#"https?://[^\s"'<>]+"#, "<url>"),
        rule(r"gid://shopify/(\w+)/\d+", "gid://shopify/$1/<id>"),
        rule(
            r"\b[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}\b",
            "<uuid>",
        ),
        rule(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}", "<email>"),
        rule(
            r"\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:?\d{2})?",
            "<timestamp>",
        ),
        rule(
            r"(?:[$€£]\s?\d[\d,]*(?:\.\d{1,2})?|\b\d[\d,]*(?:\.\d{1,2})?\s?(?:USD|EUR|GBP|CAD|AUD)\b)",
            "<price>",
        ),
        rule(r"\b[0-9a-fA-F]{16,}\b", "<hex>"),
        rule(r"\d+", "<n>"),
        rule(r"\s+", " "),
    ]
});

/// Replaces dynamic substrings with stable placeholders
///
/// # Example
/// ```
/// use cgk_platform_api::domain::platform_log::signature::normalize_error_message;
///
/// assert_eq!(
///     normalize_error_message("Refund of $12.50 failed for jane@brand.com"),
///     "Refund of <price> failed for <email>"
/// );
/// ```
pub fn normalize_error_message(message: &str) -> String {
    let normalized = RULES.iter().fold(message.to_string(), |acc, rule| {
        rule.pattern
            .replace_all(&acc, rule.replacement)
            .into_owned()
    });
    normalized.trim().to_string()
}

/// Lowercase hex SHA-256 of the normalized message
pub fn error_signature(message: &str) -> String {
    hex::encode(Sha256::digest(normalize_error_message(message).as_bytes()))
}
