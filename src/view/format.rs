use chrono::{DateTime, Utc};

pub fn badge_label(is_finished: bool) -> &'static str {
    if is_finished { "Done" } else { "Pending" }
}

pub fn check_mark(is_finished: bool) -> &'static str {
    if is_finished { "[x]" } else { "[ ]" }
}

/// Relative age of a timestamp, e.g. `3 hours ago`.
pub fn posted_at(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(created_at) = created_at else { return "unknown date".to_string() };
    let elapsed = now.signed_duration_since(created_at);
    let plural = |n: i64, unit: &str| if n == 1 { format!("1 {unit} ago") } else { format!("{n} {unit}s ago") };
    if elapsed.num_days() > 0 { plural(elapsed.num_days(), "day") }
    else if elapsed.num_hours() > 0 { plural(elapsed.num_hours(), "hour") }
    else if elapsed.num_minutes() > 0 { plural(elapsed.num_minutes(), "minute") }
    else if elapsed.num_seconds() > 0 { plural(elapsed.num_seconds(), "second") }
    else { "just now".to_string() }
}
