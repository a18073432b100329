//! Short human-readable ages ("3d", "5h", "12m", "45s")

use chrono::{DateTime, Duration, Utc};

/// Age of a timestamp relative to now, in its largest non-zero unit
pub fn elapsed_time_short(since: DateTime<Utc>) -> String {
    duration_time_short(Utc::now() - since)
}

/// Format a duration using only its largest non-zero unit
///
/// Units are floored, so 47 hours renders as "1d". Negative durations (clock
/// skew between us and the API server) render as "0s".
pub fn duration_time_short(elapsed: Duration) -> String {
    let secs = elapsed.num_seconds().max(0);
    let mins = secs / 60;
    let hours = mins / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{}d", days)
    } else if hours > 0 {
        format!("{}h", hours)
    } else if mins > 0 {
        format!("{}m", mins)
    } else {
        format!("{}s", secs)
    }
}

/// Parse an RFC 3339 timestamp as found in object metadata
pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_largest_unit_wins() {
        assert_eq!(duration_time_short(Duration::seconds(45)), "45s");
        assert_eq!(duration_time_short(Duration::minutes(12)), "12m");
        assert_eq!(duration_time_short(Duration::hours(5)), "5h");
        assert_eq!(duration_time_short(Duration::days(3)), "3d");
    }

    #[test]
    fn test_units_are_floored_not_combined() {
        assert_eq!(
            duration_time_short(Duration::hours(47) + Duration::minutes(59)),
            "1d"
        );
        assert_eq!(duration_time_short(Duration::seconds(119)), "1m");
        assert_eq!(duration_time_short(Duration::zero()), "0s");
    }

    #[test]
    fn test_negative_duration_clamps() {
        assert_eq!(duration_time_short(Duration::seconds(-30)), "0s");
    }

    #[test]
    fn test_elapsed_time_short() {
        let three_days_ago = Utc::now() - Duration::days(3) - Duration::hours(2);
        assert_eq!(elapsed_time_short(three_days_ago), "3d");
    }

    #[test]
    fn test_parse_timestamp() {
        assert!(parse_timestamp("2024-05-01T10:00:00Z").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
