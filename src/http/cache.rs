//! HTTP cache control module
//!
//! `Last-Modified` generation and `If-Modified-Since` handling.

use chrono::{DateTime, Utc};
use std::time::SystemTime;

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Format a timestamp as an IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
pub fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format(HTTP_DATE_FORMAT).to_string()
}

/// Parse an HTTP date header value
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

/// Check whether a conditional GET can be answered with 304.
///
/// `If-Modified-Since` is ignored when the request also carries
/// `If-None-Match`, or when its date cannot be parsed. The file time is
/// compared at second precision.
pub fn is_not_modified(
    if_modified_since: Option<&str>,
    has_if_none_match: bool,
    modified: SystemTime,
) -> bool {
    if has_if_none_match {
        return false;
    }
    let Some(since) = if_modified_since.and_then(parse_http_date) else {
        return false;
    };
    DateTime::<Utc>::from(modified).timestamp() <= since.timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn at(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn test_http_date() {
        assert_eq!(http_date(at(784_111_777)), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn test_parse_http_date() {
        let date = parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT").unwrap();
        assert_eq!(date.timestamp(), 784_111_777);
        assert!(parse_http_date("yesterday").is_none());
    }

    #[test]
    fn test_not_modified() {
        let header = Some("Sun, 06 Nov 1994 08:49:37 GMT");
        assert!(is_not_modified(header, false, at(784_111_777)));
        assert!(is_not_modified(header, false, at(784_111_000)));
        // Sub-second part of the file time is ignored
        assert!(is_not_modified(
            header,
            false,
            at(784_111_777) + Duration::from_millis(400)
        ));
        assert!(!is_not_modified(header, false, at(784_111_778)));
    }

    #[test]
    fn test_not_modified_ignored_cases() {
        assert!(!is_not_modified(None, false, at(0)));
        assert!(!is_not_modified(Some("garbage"), false, at(0)));
        assert!(!is_not_modified(
            Some("Sun, 06 Nov 1994 08:49:37 GMT"),
            true,
            at(0)
        ));
    }
}
