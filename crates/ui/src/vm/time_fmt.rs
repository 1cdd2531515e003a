use chrono::{DateTime, TimeDelta, Utc};

#[must_use]
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.to_rfc3339()
}

/// Minutes and seconds, e.g. `3m 20s`; negative spans clamp to zero.
#[must_use]
pub fn format_elapsed(value: TimeDelta) -> String {
    let secs = value.num_seconds().max(0);
    if secs < 60 {
        format!("{secs}s")
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Whole scores without a fraction, anything else to one decimal.
#[must_use]
pub fn format_score(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_drop_trailing_zero_fraction() {
        assert_eq!(format_score(10.0), "10");
        assert_eq!(format_score(7.5), "7.5");
        assert_eq!(format_score(0.0), "0");
    }

    #[test]
    fn elapsed_uses_minutes_past_a_minute() {
        assert_eq!(format_elapsed(TimeDelta::seconds(42)), "42s");
        assert_eq!(format_elapsed(TimeDelta::seconds(200)), "3m 20s");
        assert_eq!(format_elapsed(TimeDelta::seconds(-5)), "0s");
    }
}
