use chrono::{DateTime, Utc};

/// Relative description of `time` seen from `now`: "in 3 days", "2 hours ago".
pub fn from_now(time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = time.signed_duration_since(now).num_seconds();
    let phrase = humanize(delta.unsigned_abs() as f64);
    if delta >= 0 {
        format!("in {}", phrase)
    } else {
        format!("{} ago", phrase)
    }
}

fn humanize(seconds: f64) -> String {
    let minutes = seconds / 60.0;
    let hours = minutes / 60.0;
    let days = hours / 24.0;

    if seconds < 45.0 {
        "a few seconds".to_string()
    } else if seconds < 90.0 {
        "a minute".to_string()
    } else if minutes < 45.0 {
        format!("{} minutes", minutes.round())
    } else if minutes < 90.0 {
        "an hour".to_string()
    } else if hours < 22.0 {
        format!("{} hours", hours.round())
    } else if hours < 36.0 {
        "a day".to_string()
    } else if days < 26.0 {
        format!("{} days", days.round())
    } else if days < 46.0 {
        "a month".to_string()
    } else if days < 320.0 {
        format!("{} months", (days / 30.4).round())
    } else if days < 548.0 {
        "a year".to_string()
    } else {
        format!("{} years", (days / 365.0).round())
    }
}
