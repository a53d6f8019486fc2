use chrono::{DateTime, TimeZone};

/// Format used for human-facing timestamps, e.g. in generated descriptions.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn format_display<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(DISPLAY_FORMAT).to_string()
}
