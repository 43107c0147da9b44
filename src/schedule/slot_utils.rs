use chrono::NaiveDate;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Parses a time string (HH:MM, optionally HH:MM:SS) to minutes since midnight
/// Seconds are accepted for backend compatibility but dropped
pub fn parse_time_to_minutes(time_str: &str) -> Option<u32> {
    let parts: Vec<&str> = time_str.trim().split(':').collect();
    if parts.len() != 2 && parts.len() != 3 {
        return None;
    }
    let is_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if !is_digits(parts[0]) || parts[0].len() > 2 || !is_digits(parts[1]) || parts[1].len() != 2 {
        return None;
    }
    if parts.len() == 3 && (!is_digits(parts[2]) || parts[2].len() != 2) {
        return None;
    }
    let hours: u32 = parts[0].parse().ok()?;
    let minutes: u32 = parts[1].parse().ok()?;
    if hours >= 24 || minutes >= 60 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Formats minutes since midnight to time string (HH:MM)
pub fn minutes_to_time_string(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    format!("{:02}:{:02}", hours % 24, mins)
}

/// Parses a match date, truncating any time component ("2024-06-01T10:00:00Z" -> 2024-06-01)
pub fn parse_match_date(date_str: &str) -> Option<NaiveDate> {
    let trimmed = date_str.trim();
    let day_part = trimmed
        .split(|c| c == 'T' || c == ' ')
        .next()
        .unwrap_or(trimmed);
    NaiveDate::parse_from_str(day_part, "%Y-%m-%d").ok()
}

/// Human readable gap, e.g. "30 min", "2h", "2h 15m"
pub fn format_gap(minutes: i64) -> String {
    if minutes < 0 {
        return format!("-{}", format_gap(-minutes));
    }
    let hours = minutes / 60;
    let mins = minutes % 60;
    match (hours, mins) {
        (0, m) => format!("{} min", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}
