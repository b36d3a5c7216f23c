//! Validation of person name parts.

/// Longest accepted name part, in characters.
pub const NAME_PART_MAX_LEN: usize = 150;

/// Message shown to the user when a name part fails validation.
pub const NAME_FORMAT_MESSAGE: &str =
    "Name and surname must be 1 to 150 characters of letters, digits, spaces, hyphens, underscores, apostrophes and periods; middle name may be empty.";

/// Check one part of a person's name.
///
/// Surrounding whitespace is ignored. The remaining text must be at most
/// [`NAME_PART_MAX_LEN`] characters of letters, digits, spaces, `-`, `_`,
/// `'` and `.`, and may be empty only when `allow_empty` is set.
pub fn validate_name_part(part: &str, allow_empty: bool) -> bool {
    let part = part.trim();
    if part.is_empty() {
        return allow_empty;
    }

    part.chars().count() <= NAME_PART_MAX_LEN
        && part
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '\'' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_part_accepts_unicode_letters() {
        assert!(validate_name_part("Иванов", false));
        assert!(validate_name_part("Anne-Marie", false));
        assert!(validate_name_part("O'Brien", false));
        assert!(validate_name_part("  Jr. ", false));
    }

    #[test]
    fn test_name_part_empty() {
        assert!(!validate_name_part("", false));
        assert!(!validate_name_part("   ", false));
        assert!(validate_name_part("", true));
    }

    #[test]
    fn test_name_part_length_limit() {
        assert!(validate_name_part(&"я".repeat(150), false));
        assert!(!validate_name_part(&"я".repeat(151), false));
    }

    #[test]
    fn test_name_part_rejects_symbols() {
        assert!(!validate_name_part("<b>", false));
        assert!(!validate_name_part("a@b", true));
    }
}
