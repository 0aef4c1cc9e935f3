//! Coarse, kubectl-like age buckets.

use chrono::{DateTime, Duration, Utc};

/// `< 1m`, `{n}m`, `{n}h` or `{n}d`.
pub fn format_age(d: Duration) -> String {
    if d < Duration::minutes(1) {
        "< 1m".to_string()
    } else if d < Duration::hours(1) {
        format!("{}m", d.num_minutes())
    } else if d < Duration::hours(24) {
        format!("{}h", d.num_hours())
    } else {
        format!("{}d", d.num_days())
    }
}

pub fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts).ok().map(|t| t.with_timezone(&Utc))
}

/// Age of an RFC3339 timestamp relative to `now`; `None` when unparseable.
pub fn age_between(ts: &str, now: DateTime<Utc>) -> Option<String> {
    parse_timestamp(ts).map(|t| format_age(now - t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets() {
        assert_eq!(format_age(Duration::seconds(0)), "< 1m");
        assert_eq!(format_age(Duration::seconds(59)), "< 1m");
        assert_eq!(format_age(Duration::seconds(60)), "1m");
        assert_eq!(format_age(Duration::minutes(59)), "59m");
        assert_eq!(format_age(Duration::minutes(61)), "1h");
        assert_eq!(format_age(Duration::hours(23)), "23h");
        assert_eq!(format_age(Duration::hours(49)), "2d");
        // clock skew: future timestamps land in the smallest bucket
        assert_eq!(format_age(Duration::minutes(-5)), "< 1m");
    }

    #[test]
    fn between_timestamps() {
        let now = parse_timestamp("2024-05-01T12:00:00Z").unwrap();
        assert_eq!(age_between("2024-05-01T11:30:00Z", now).as_deref(), Some("30m"));
        assert_eq!(age_between("2024-04-28T12:00:00+00:00", now).as_deref(), Some("3d"));
        assert_eq!(age_between("2024-05-01T11:59:30.123456Z", now).as_deref(), Some("< 1m"));
        assert_eq!(age_between("yesterday", now), None);
    }
}
