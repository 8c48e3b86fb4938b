//! Parser for the upstream's wrapped-epoch-millis date format.
//!
//! Dates arrive as a literal string like `/Date(1700000000000-0700)/`, where
//! the leading integer is epoch milliseconds and the trailing signed
//! four-digit offset is a timezone suffix. Only the milliseconds are
//! authoritative; the offset is not applied to the timestamp, it is simply
//! stripped.

use chrono::{DateTime, Utc};

/// Parse an upstream date string into an absolute timestamp.
///
/// Returns `None` if the string does not match the expected
/// `/Date(<millis>[+-]<offset>)/` shape.
#[must_use]
pub fn parse_upstream_date(raw: &str) -> Option<DateTime<Utc>> {
    let inner = raw.strip_prefix("/Date(")?.strip_suffix(")/")?;

    let digit_end = inner
        .char_indices()
        .find(|(i, c)| *i > 0 && (*c == '+' || *c == '-'))
        .map_or(inner.len(), |(i, _)| i);

    let millis: i64 = inner[..digit_end].parse().ok()?;
    DateTime::from_timestamp_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_negative_offset() {
        let parsed = parse_upstream_date("/Date(1700000000000-0700)/").unwrap();
        assert_eq!(parsed.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn parses_with_positive_offset() {
        let parsed = parse_upstream_date("/Date(1700000000000+0900)/").unwrap();
        assert_eq!(parsed.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn parses_without_offset() {
        let parsed = parse_upstream_date("/Date(1700000000000)/").unwrap();
        assert_eq!(parsed.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse_upstream_date("2024-01-01T00:00:00Z").is_none());
        assert!(parse_upstream_date("/Date(notanumber)/").is_none());
        assert!(parse_upstream_date("").is_none());
    }
}
