use chrono::{DateTime, Local, SecondsFormat, Timelike, Utc};

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// ISO-8601 stamp with millisecond precision, e.g. `2026-10-16T09:30:00.123Z`.
pub fn iso_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn hour_of_day(at: &DateTime<Local>) -> u32 {
    at.hour()
}

/// Wall-clock time as a person would read it, e.g. `3:04:05 PM`.
pub fn display_time(at: &DateTime<Local>) -> String {
    at.format("%-I:%M:%S %p").to_string()
}
