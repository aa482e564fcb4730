use chrono::{DateTime, TimeDelta, Utc};

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;

/// Error for a stored timestamp that can't be made sense of.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Parse a textual timestamp in seconds since the epoch, possibly with a
/// fractional part, like `1718000000.5`.
fn parse_timestamp(timestamp: &str) -> Result<DateTime<Utc>, FormatError> {
    let invalid = || FormatError::InvalidTimestamp(timestamp.to_string());

    let seconds: f64 = timestamp.trim().parse().map_err(|_| invalid())?;
    if !seconds.is_finite() {
        return Err(invalid());
    }

    let whole = seconds.floor();
    // Guard the float->int cast; chrono rejects anything past year 262143 anyway.
    if whole.abs() > i64::MAX as f64 / 2.0 {
        return Err(invalid());
    }
    let nanos = (((seconds - whole) * 1e9) as u32).min(999_999_999);

    DateTime::from_timestamp(whole as i64, nanos).ok_or_else(invalid)
}

/// Describe elapsed time as a coarse English phrase like `"3 days ago"`.
///
/// Quotients are truncated and there is no singular form, so a day and a bit
/// is `"1 days ago"`. Negative durations count as no time elapsed.
fn describe_elapsed(elapsed: TimeDelta) -> String {
    let total_seconds = elapsed.num_seconds().max(0);
    let days = total_seconds / SECONDS_PER_DAY;
    let remainder = total_seconds % SECONDS_PER_DAY;

    if days >= 365 {
        format!("{} years ago", days / 365)
    } else if days >= 30 {
        format!("{} months ago", days / 30)
    } else if days >= 1 {
        format!("{days} days ago")
    } else if remainder >= SECONDS_PER_HOUR {
        format!("{} hours ago", remainder / SECONDS_PER_HOUR)
    } else if remainder >= SECONDS_PER_MINUTE {
        format!("{} minutes ago", remainder / SECONDS_PER_MINUTE)
    } else {
        format!("{remainder} seconds ago")
    }
}

/// Turn a stored timestamp (decimal seconds since the epoch) into a phrase
/// like `"5 hours ago"`, relative to `now`.
///
/// # Errors
///
/// Returns [`FormatError::InvalidTimestamp`] if the timestamp isn't a finite
/// number of seconds representable as a date, such as the `"Unknown"`
/// placeholder.
pub fn time_ago(timestamp: &str, now: DateTime<Utc>) -> Result<String, FormatError> {
    let then = parse_timestamp(timestamp)?;
    Ok(describe_elapsed(now - then))
}

/// Same as [`time_ago`], but an invalid timestamp becomes a readable
/// `"Invalid timestamp: ..."` string instead of an error.
#[must_use]
pub fn time_ago_or_fallback(timestamp: &str, now: DateTime<Utc>) -> String {
    time_ago(timestamp, now).unwrap_or_else(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_720_000_000, 0).unwrap()
    }

    fn ago(delta: TimeDelta) -> String {
        let then = now() - delta;
        time_ago(&then.timestamp().to_string(), now()).unwrap()
    }

    #[test]
    fn ladder() {
        assert_eq!(ago(TimeDelta::days(400)), "1 years ago");
        assert_eq!(ago(TimeDelta::days(45)), "1 months ago");
        assert_eq!(ago(TimeDelta::days(5)), "5 days ago");
        assert_eq!(ago(TimeDelta::seconds(7200)), "2 hours ago");
        assert_eq!(ago(TimeDelta::seconds(90)), "1 minutes ago");
        assert_eq!(ago(TimeDelta::seconds(10)), "10 seconds ago");
    }

    #[test]
    fn boundaries_are_inclusive() {
        assert_eq!(ago(TimeDelta::days(365)), "1 years ago");
        assert_eq!(ago(TimeDelta::days(364)), "12 months ago");
        assert_eq!(ago(TimeDelta::days(30)), "1 months ago");
        assert_eq!(ago(TimeDelta::days(29)), "29 days ago");
        assert_eq!(ago(TimeDelta::days(1)), "1 days ago");
        assert_eq!(ago(TimeDelta::seconds(3600)), "1 hours ago");
        assert_eq!(ago(TimeDelta::seconds(3599)), "59 minutes ago");
        assert_eq!(ago(TimeDelta::seconds(60)), "1 minutes ago");
        assert_eq!(ago(TimeDelta::seconds(59)), "59 seconds ago");
    }

    #[test]
    fn truncates() {
        assert_eq!(ago(TimeDelta::days(2 * 365 + 364)), "2 years ago");
        assert_eq!(ago(TimeDelta::seconds(2 * 3600 + 3599)), "2 hours ago");
        // Days win over the sub-day remainder.
        assert_eq!(ago(TimeDelta::days(3) + TimeDelta::hours(23)), "3 days ago");
    }

    #[test]
    fn fractional_timestamps() {
        let stamp = format!("{:.1}", (now() - TimeDelta::seconds(125)).timestamp() as f64);
        assert!(stamp.ends_with(".0"));
        assert_eq!(time_ago(&stamp, now()).unwrap(), "2 minutes ago");

        let stamp = format!("{}.75", (now() - TimeDelta::seconds(11)).timestamp());
        assert_eq!(time_ago(&stamp, now()).unwrap(), "10 seconds ago");
    }

    #[test]
    fn future_clamps_to_zero() {
        let stamp = (now() + TimeDelta::days(3)).timestamp().to_string();
        assert_eq!(time_ago(&stamp, now()).unwrap(), "0 seconds ago");
        let stamp = now().timestamp().to_string();
        assert_eq!(time_ago(&stamp, now()).unwrap(), "0 seconds ago");
    }

    #[test]
    fn invalid_input() {
        let error = time_ago("not-a-number", now()).unwrap_err();
        assert_eq!(
            error,
            FormatError::InvalidTimestamp("not-a-number".to_string())
        );

        let text = time_ago_or_fallback("not-a-number", now());
        assert!(text.contains("not-a-number"));
        assert!(text.starts_with("Invalid timestamp"));

        assert_eq!(
            time_ago_or_fallback("Unknown", now()),
            "Invalid timestamp: Unknown"
        );
        assert!(time_ago("", now()).is_err());
        assert!(time_ago("NaN", now()).is_err());
        assert!(time_ago("inf", now()).is_err());
        assert!(time_ago("1e300", now()).is_err());
    }

    #[test]
    fn deterministic() {
        let stamp = "1719990000.0";
        let first = time_ago(stamp, now()).unwrap();
        for _ in 0..10 {
            assert_eq!(time_ago(stamp, now()).unwrap(), first);
        }
        assert_eq!(first, "2 hours ago");
    }
}
