use chrono::Utc;

/// RFC3339 timestamp in UTC (for persisted records and logs).
pub fn iso_timestamp_utc() -> String {
    Utc::now().to_rfc3339()
}

/// Parse a user-typed positive count, tolerating surrounding whitespace and
/// digit grouping (`1,000`, `1_000`).
pub fn parse_count(text: &str) -> Option<u64> {
    let digits: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '_'))
        .collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u64>().ok().filter(|&n| n >= 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_count_accepts_plain_and_grouped_numbers() {
        assert_eq!(parse_count("100"), Some(100));
        assert_eq!(parse_count("  7 "), Some(7));
        assert_eq!(parse_count("1,000"), Some(1000));
        assert_eq!(parse_count("1_000"), Some(1000));
    }

    #[test]
    fn parse_count_rejects_non_positive_and_garbage() {
        assert_eq!(parse_count("0"), None);
        assert_eq!(parse_count("-3"), None);
        assert_eq!(parse_count("ten"), None);
        assert_eq!(parse_count("1e3"), None);
        assert_eq!(parse_count("1.5"), None);
        assert_eq!(parse_count(""), None);
        assert_eq!(parse_count("99999999999999999999999"), None);
    }

    #[test]
    fn iso_timestamp_is_rfc3339() {
        let ts = iso_timestamp_utc();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
