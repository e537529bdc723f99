/// Country code assumed for bare local numbers when none is configured.
pub const DEFAULT_COUNTRY_CODE: &str = "34";

const MIN_DIGITS: usize = 8;
const MAX_DIGITS: usize = 15;
const LOCAL_MOBILE_DIGITS: usize = 9;

/// Normalizes a phone number to its international digits-only form, the shape the
/// WhatsApp service expects (`34600111222`).
///
/// Separators are stripped; a leading `+` or `00` marks an international number;
/// a bare 9-digit number starting with 6-9 is a local mobile and gets
/// `default_cc` prepended. Returns `None` when the result is not a plausible
/// all-digit number.
pub fn normalize_phone(raw: &str, default_cc: &str) -> Option<String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')' | '/' | '\u{a0}'))
        .collect();

    let digits = if let Some(rest) = cleaned.strip_prefix('+') {
        rest.to_string()
    } else if let Some(rest) = cleaned.strip_prefix("00") {
        rest.to_string()
    } else if cleaned.len() == LOCAL_MOBILE_DIGITS
        && cleaned.starts_with(|c: char| matches!(c, '6'..='9'))
    {
        format!("{}{}", default_cc, cleaned)
    } else {
        cleaned
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    if digits.len() < MIN_DIGITS || digits.len() > MAX_DIGITS {
        return None;
    }

    Some(digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equivalent_forms_share_canonical_value() {
        for raw in ["+34600111222", "0034600111222", "34600111222", "600111222"] {
            assert_eq!(
                normalize_phone(raw, "34").as_deref(),
                Some("34600111222"),
                "input {}",
                raw
            );
        }
    }

    #[test]
    fn test_separators_are_stripped() {
        assert_eq!(
            normalize_phone("+34 600-111.222", "34").as_deref(),
            Some("34600111222")
        );
        assert_eq!(
            normalize_phone("(600) 111 222", "34").as_deref(),
            Some("34600111222")
        );
    }

    #[test]
    fn test_invalid_numbers() {
        assert_eq!(normalize_phone("abc123", "34"), None);
        assert_eq!(normalize_phone("", "34"), None);
        assert_eq!(normalize_phone("12345", "34"), None);
        assert_eq!(normalize_phone("+34 6OO 111 222", "34"), None);
    }

    #[test]
    fn test_landline_is_not_prefixed() {
        // not mobile shaped, kept as given
        assert_eq!(normalize_phone("123456789", "34").as_deref(), Some("123456789"));
        assert_eq!(normalize_phone("612345678", "52").as_deref(), Some("52612345678"));
    }
}
