// Contact consent domain module
// Phone normalization and SMS keyword handling

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const MIN_E164_DIGITS: usize = 8;
pub const MAX_E164_DIGITS: usize = 15;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PhoneError {
    #[error("Phone number is empty")]
    Empty,

    #[error("Phone number contains invalid characters")]
    InvalidCharacters,

    #[error("Phone number must have between 8 and 15 digits, got {0}")]
    InvalidLength(usize),
}

/// Normalizes a phone number to E.164 (`+` followed by 8 to 15 digits)
///
/// # Arguments
/// * `input` - Phone number as typed, separators allowed
/// * `default_country_code` - Applied to bare 10-digit numbers
///
/// # Example
/// ```
/// use cgk_platform_api::domain::contact::normalize_phone_e164;
///
/// assert_eq!(normalize_phone_e164("(555) 123-4567", "1").unwrap(), "+15551234567");
/// assert_eq!(normalize_phone_e164("0044 20 7946 0958", "1").unwrap(), "+442079460958");
/// ```
pub fn normalize_phone_e164(input: &str, default_country_code: &str) -> Result<String, PhoneError> {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();

    if cleaned.is_empty() {
        return Err(PhoneError::Empty);
    }

    let (explicit_country, digits) = if let Some(rest) = cleaned.strip_prefix('+') {
        (true, rest)
    } else if let Some(rest) = cleaned.strip_prefix("00") {
        (true, rest)
    } else {
        (false, cleaned.as_str())
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(PhoneError::InvalidCharacters);
    }

    let full = if explicit_country {
        digits.to_string()
    } else if digits.len() == 10 {
        format!("{}{}", default_country_code.trim_start_matches('+'), digits)
    } else {
        // 11 digits with a leading 1 already carries the NANP country code
        digits.to_string()
    };

    if !(MIN_E164_DIGITS..=MAX_E164_DIGITS).contains(&full.len()) {
        return Err(PhoneError::InvalidLength(full.len()));
    }

    Ok(format!("+{}", full))
}

/// Meaning of an inbound SMS body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordClass {
    OptOut,
    OptIn,
    Help,
    None,
}

const OPT_OUT_KEYWORDS: [&str; 8] = [
    "STOP", "STOPALL", "UNSUBSCRIBE", "CANCEL", "END", "QUIT", "OPTOUT", "REVOKE",
];
const OPT_IN_KEYWORDS: [&str; 4] = ["START", "UNSTOP", "YES", "SUBSCRIBE"];
const HELP_KEYWORDS: [&str; 2] = ["HELP", "INFO"];

/// Classifies a whole inbound message as a compliance keyword
pub fn classify_keyword(body: &str) -> KeywordClass {
    let keyword = body.trim().to_uppercase();
    let keyword = keyword.as_str();

    if OPT_OUT_KEYWORDS.contains(&keyword) {
        KeywordClass::OptOut
    } else if OPT_IN_KEYWORDS.contains(&keyword) {
        KeywordClass::OptIn
    } else if HELP_KEYWORDS.contains(&keyword) {
        KeywordClass::Help
    } else {
        KeywordClass::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "contact_channel", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContactChannel {
    Sms,
    Email,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ContactConsent {
    pub tenant_id: Uuid,
    pub channel: ContactChannel,
    pub address: String,
    pub opted_out: bool,
    pub source_keyword: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Inbound SMS as delivered by the messaging provider
#[derive(Debug, Clone, Deserialize)]
pub struct InboundSms {
    pub from: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InboundSmsReply {
    pub phone: String,
    pub keyword: KeywordClass,
    pub opted_out: Option<bool>,
}

impl ContactConsent {
    /// Consent change implied by a keyword, if any
    pub fn from_keyword(
        tenant_id: Uuid,
        phone: &str,
        body: &str,
        class: KeywordClass,
    ) -> Option<Self> {
        let opted_out = match class {
            KeywordClass::OptOut => true,
            KeywordClass::OptIn => false,
            KeywordClass::Help | KeywordClass::None => return None,
        };
        Some(Self {
            tenant_id,
            channel: ContactChannel::Sms,
            address: phone.to_string(),
            opted_out,
            source_keyword: Some(body.trim().to_uppercase()),
            updated_at: Utc::now(),
        })
    }
}
