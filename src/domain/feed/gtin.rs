// GS1 identifier validation for g:gtin

/// Valid GTIN lengths: GTIN-8, UPC-A (12), EAN-13, GTIN-14
const VALID_LENGTHS: [usize; 4] = [8, 12, 13, 14];

/// Normalizes a GTIN by removing spaces and dashes, then checks it
///
/// Returns the digits when the length and GS1 check digit are valid.
///
/// # Example
/// ```
/// use cgk_platform_api::domain::feed::gtin::normalize_gtin;
///
/// assert_eq!(normalize_gtin("0-36000-29145-2").as_deref(), Some("036000291452"));
/// assert!(normalize_gtin("036000291453").is_none());
/// ```
pub fn normalize_gtin(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| !matches!(c, ' ' | '-')).collect();

    if !VALID_LENGTHS.contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    // All-zero codes pass the checksum but are placeholders
    if digits.chars().all(|c| c == '0') {
        return None;
    }

    has_valid_check_digit(&digits).then_some(digits)
}

/// GS1 mod-10: from the right, excluding the check digit, weights alternate 3,1,3,...
fn has_valid_check_digit(digits: &str) -> bool {
    let values: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();
    let Some((check, body)) = values.split_last() else {
        return false;
    };

    let sum: u32 = body
        .iter()
        .rev()
        .enumerate()
        .map(|(i, d)| if i % 2 == 0 { d * 3 } else { *d })
        .sum();

    (10 - sum % 10) % 10 == *check
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_codes() {
        assert_eq!(normalize_gtin("036000291452").as_deref(), Some("036000291452"));
        assert_eq!(normalize_gtin("4006381333931").as_deref(), Some("4006381333931"));
        assert_eq!(normalize_gtin("96385074").as_deref(), Some("96385074"));
        assert_eq!(normalize_gtin("10036000291459").as_deref(), Some("10036000291459"));
    }

    #[test]
    fn strips_separators() {
        assert_eq!(normalize_gtin("400 6381 33393 1").as_deref(), Some("4006381333931"));
    }

    #[test]
    fn bad_check_digit() {
        assert!(normalize_gtin("4006381333932").is_none());
    }

    #[test]
    fn bad_length_or_chars() {
        assert!(normalize_gtin("12345").is_none());
        assert!(normalize_gtin("40063813339A1").is_none());
        assert!(normalize_gtin("").is_none());
    }

    #[test]
    fn all_zero_rejected() {
        assert!(normalize_gtin("00000000").is_none());
    }
}
