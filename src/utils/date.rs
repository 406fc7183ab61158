// Clock time parsing and formatting
// Timestamps are milliseconds since the Unix epoch

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveTime, TimeZone};

/// Parse a clock time (`9:30`, `09:30`, `930`, `0930`) as a time of today in
/// the local timezone and return its timestamp in milliseconds.
pub fn time_to_timestamp(text: &str) -> Result<i64> {
    time_on_date(text, Local::now().date_naive())
}

/// Parse a clock time as a time on the given local date
pub fn time_on_date(text: &str, date: NaiveDate) -> Result<i64> {
    let time = parse_clock_time(text)?;
    let local = Local
        .from_local_datetime(&date.and_time(time))
        .earliest()
        .with_context(|| format!("Time {} does not exist on {}", text, date))?;
    Ok(local.timestamp_millis())
}

/// Parse `H:MM`, `HH:MM`, `HMM` or `HHMM` into a time of day
pub fn parse_clock_time(text: &str) -> Result<NaiveTime> {
    let trimmed = text.trim();
    let (hours, minutes) = match trimmed.split_once(':') {
        Some((h, m)) => (h, m),
        None if trimmed.len() >= 3 && trimmed.is_ascii() => trimmed.split_at(trimmed.len() - 2),
        None => anyhow::bail!("Invalid time: '{}'. Expected HH:MM", text),
    };

    let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(hours) || hours.len() > 2 || !all_digits(minutes) || minutes.len() != 2 {
        anyhow::bail!("Invalid time: '{}'. Expected HH:MM", text);
    }

    let hours: u32 = hours.parse()?;
    let minutes: u32 = minutes.parse()?;
    NaiveTime::from_hms_opt(hours, minutes, 0)
        .with_context(|| format!("Invalid time: '{}'. Hours must be 0-23 and minutes 0-59", text))
}

/// Format a timestamp as local `HH:MM`, or return the fallback when absent
pub fn format_timestamp(timestamp: Option<i64>, fallback: &str) -> String {
    match timestamp.and_then(|ms| Local.timestamp_millis_opt(ms).single()) {
        Some(dt) => dt.format("%H:%M").to_string(),
        None => fallback.to_string(),
    }
}
