//! Codec for the UPnP `TIMEOUT` header (`Second-<n>`).

/// Prefix of every finite UPnP timeout value
pub const TIMEOUT_PREFIX: &str = "Second-";

/// Parse a `TIMEOUT` header value into seconds.
///
/// Returns `None` for anything other than `Second-` followed by decimal
/// digits that fit in a `u32`. `Second-infinite` is deliberately rejected:
/// the caller decides what an absent lease means.
pub fn parse_timeout(value: &str) -> Option<u32> {
    let digits = value.strip_prefix(TIMEOUT_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok()
}

/// Format a lease length as a `TIMEOUT` header value.
pub fn format_timeout(seconds: u32) -> String {
    format!("{}{}", TIMEOUT_PREFIX, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_valid_timeout_header() {
        assert_eq!(parse_timeout("Second-1"), Some(1));
        assert_eq!(parse_timeout("Second-43200"), Some(43200));
        assert_eq!(parse_timeout("Second-0"), Some(0));
    }

    #[test]
    fn test_invalid_timeout_number() {
        assert_eq!(parse_timeout("Timeout-1"), None);
        assert_eq!(parse_timeout("Second-"), None);
        assert_eq!(parse_timeout("Second-infinite"), None);
        assert_eq!(parse_timeout("Second-+5"), None);
        assert_eq!(parse_timeout("Second-99999999999"), None);
    }

    #[test]
    fn test_invalid_timeout_header() {
        assert_eq!(parse_timeout("Timeout"), None);
        assert_eq!(parse_timeout(""), None);
        assert_eq!(parse_timeout("second-10"), None);
    }

    #[test]
    fn test_format_timeout() {
        assert_eq!(format_timeout(43200), "Second-43200");
        assert_eq!(format_timeout(0), "Second-0");
    }

    proptest! {
        #[test]
        fn unprefixed_values_never_parse(value in "[^S].*") {
            prop_assert_eq!(parse_timeout(&value), None);
        }

        #[test]
        fn formatted_leases_parse_back(seconds in any::<u32>()) {
            prop_assert_eq!(parse_timeout(&format_timeout(seconds)), Some(seconds));
        }
    }
}
