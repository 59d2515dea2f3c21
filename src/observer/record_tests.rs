//! Tests for call records and response truncation.

use std::time::Duration;

use super::{CallLevel, CallRecord, RESPONSE_LOG_LIMIT, TRUNCATION_MARKER, truncate_for_log};

mod truncation {
    use super::*;

    #[test]
    fn short_body_is_verbatim() {
        assert_eq!(truncate_for_log("<ok/>"), "<ok/>");
    }

    #[test]
    fn body_at_limit_is_verbatim() {
        let body = "a".repeat(RESPONSE_LOG_LIMIT);

        assert_eq!(truncate_for_log(&body), body);
    }

    #[test]
    fn body_over_limit_is_cut_and_marked() {
        let body = "a".repeat(RESPONSE_LOG_LIMIT + 1);

        let logged = truncate_for_log(&body);

        assert_eq!(logged.len(), RESPONSE_LOG_LIMIT + TRUNCATION_MARKER.len());
        assert!(logged.ends_with("a..."));
    }

    #[test]
    fn limit_counts_characters_not_bytes() {
        let body = "é".repeat(RESPONSE_LOG_LIMIT + 5);

        let logged = truncate_for_log(&body);

        assert_eq!(logged.chars().count(), RESPONSE_LOG_LIMIT + 3);
        assert!(logged.starts_with(&"é".repeat(RESPONSE_LOG_LIMIT)));
    }

    #[test]
    fn empty_body_is_empty() {
        assert_eq!(truncate_for_log(""), "");
    }
}

mod record {
    use super::*;

    #[test]
    fn new_record_has_no_response() {
        let record = CallRecord::new("DoWork", "http://svc/test", "<xml/>");

        assert_eq!(record.http_status, 0);
        assert!(record.response_body.is_empty());
        assert_eq!(record.wall_time, Duration::ZERO);
    }

    #[test]
    fn with_response_truncates_body() {
        let body = "x".repeat(RESPONSE_LOG_LIMIT * 2);

        let record = CallRecord::new("A", "L", "").with_response(500, body.as_bytes());

        assert_eq!(record.http_status, 500);
        assert_eq!(
            record.response_body.len(),
            RESPONSE_LOG_LIMIT + TRUNCATION_MARKER.len()
        );
    }

    #[test]
    fn with_response_replaces_invalid_utf8() {
        let record = CallRecord::new("A", "L", "").with_response(200, &[0x3c, 0xff, 0x3e]);

        assert_eq!(record.response_body, "<\u{fffd}>");
    }

    #[test]
    fn timings_are_kept() {
        let record = CallRecord::new("A", "L", "")
            .with_engine_times(Duration::from_millis(30), Duration::from_millis(4))
            .with_wall_time(Duration::from_millis(35));

        assert_eq!(record.total_time, Duration::from_millis(30));
        assert_eq!(record.connect_time, Duration::from_millis(4));
        assert_eq!(record.wall_time, Duration::from_millis(35));
    }
}

mod level {
    use super::*;

    #[test]
    fn ok_is_debug() {
        assert_eq!(CallLevel::for_status(200), CallLevel::Debug);
    }

    #[test]
    fn everything_else_is_error() {
        for status in [0, 201, 204, 301, 401, 404, 500] {
            assert_eq!(CallLevel::for_status(status), CallLevel::Error, "{status}");
        }
    }
}
