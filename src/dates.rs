//! Date, duration and label helpers shared by the parsers and the analysis layer
//!
//! Dates are handled as `NaiveDate` throughout so a plan row always lands on
//! the calendar day written in the markdown, whatever the host timezone.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// ---------------------------------------------------------------------------
/// Date Parsing
/// ---------------------------------------------------------------------------

/// Formats tried after the explicit year-first scan fails.
/// `%B`/`%A` also accept the abbreviated names when parsing.
const LOOSE_DATE_FORMATS: &[&str] = &[
  "%B %d %Y",
  "%d %B %Y",
  "%A %B %d %Y",
  "%A %d %B %Y",
  "%m/%d/%Y",
  "%m-%d-%Y",
];

/// Parse a date cell. Year-first `YYYY-M-D` / `YYYY/M/D` anywhere in the text
/// wins, since it is unambiguous across locales.
pub fn parse_date(cell: &str) -> Option<NaiveDate> {
  let text = cell.trim();
  if text.is_empty() {
    return None;
  }
  if let Some(date) = find_iso_dates(text).into_iter().next() {
    return Some(date);
  }
  parse_loose_date(text)
}

/// Every year-first date found in the text, in order of appearance
pub fn find_iso_dates(text: &str) -> Vec<NaiveDate> {
  let bytes = text.as_bytes();
  let mut found = Vec::new();
  let mut i = 0;

  while i < bytes.len() {
    let at_boundary = i == 0 || !bytes[i - 1].is_ascii_digit();
    if at_boundary {
      if let Some((date, len)) = iso_date_at(&bytes[i..]) {
        found.push(date);
        i += len;
        continue;
      }
    }
    i += 1;
  }

  found
}

fn iso_date_at(bytes: &[u8]) -> Option<(NaiveDate, usize)> {
  let (year, year_len) = leading_number(bytes, 4)?;
  if year_len != 4 {
    return None;
  }
  let mut pos = year_len;

  let sep = *bytes.get(pos)?;
  if sep != b'-' && sep != b'/' {
    return None;
  }
  pos += 1;

  let (month, month_len) = leading_number(&bytes[pos..], 2)?;
  pos += month_len;
  if *bytes.get(pos)? != sep {
    return None;
  }
  pos += 1;

  let (day, day_len) = leading_number(&bytes[pos..], 2)?;
  pos += day_len;
  if bytes.get(pos).is_some_and(|b| b.is_ascii_digit()) {
    return None;
  }

  NaiveDate::from_ymd_opt(year as i32, month, day).map(|d| (d, pos))
}

/// Up to `max` leading ASCII digits; rejects runs longer than `max`
fn leading_number(bytes: &[u8], max: usize) -> Option<(u32, usize)> {
  let len = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
  if len == 0 || len > max {
    return None;
  }
  let value = bytes[..len]
    .iter()
    .fold(0u32, |acc, b| acc * 10 + (b - b'0') as u32);
  Some((value, len))
}

fn parse_loose_date(text: &str) -> Option<NaiveDate> {
  let normalized = text
    .replace([',', '.'], " ")
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ");

  LOOSE_DATE_FORMATS
    .iter()
    .find_map(|fmt| NaiveDate::parse_from_str(&normalized, fmt).ok())
}

/// The given day at 12:00
pub fn noon(date: NaiveDate) -> NaiveDateTime {
  let time = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN);
  date.and_time(time)
}

/// ---------------------------------------------------------------------------
/// Duration Parsing
/// ---------------------------------------------------------------------------

/// Parse a free-text duration into whole minutes.
///
/// Accepts bare minutes (`45`), hours and minutes (`1h 30m`, `1h30`),
/// decimal hours (`1.5h`, `2.5 hrs`), explicit minutes (`40 min`) and clock
/// notation (`1:30`, `1:30:00`) anywhere in the cell. Parenthesized notes and
/// digits glued to a label (`Z2`) are ignored. A unitless number only counts
/// as the first duration or as the minutes after an hour value. Anything
/// else, including `-`, is 0.
pub fn parse_duration_minutes(cell: &str) -> u32 {
  let text = strip_parenthesized(&cell.trim().to_lowercase());
  let text = text.trim();
  if text.is_empty() || text == "-" {
    return 0;
  }

  // A clock that does not fit in u32 minutes is unreadable, not a huge session
  if let Some(clock) = text.split_whitespace().map(clock_token).find(|t| is_clock_shaped(t)) {
    return parse_clock(clock).unwrap_or(0);
  }

  let chars: Vec<char> = text.chars().collect();
  let mut total = 0.0;
  let mut counted = 0;
  let mut after_hours = false;
  let mut i = 0;

  while i < chars.len() {
    if !chars[i].is_ascii_digit() {
      i += 1;
      continue;
    }

    let glued = i > 0 && chars[i - 1].is_alphabetic();
    let start = i;
    while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
      i += 1;
    }
    let number: String = chars[start..i].iter().collect();

    while i < chars.len() && chars[i].is_whitespace() {
      i += 1;
    }
    let unit_start = i;
    while i < chars.len() && (chars[i].is_alphabetic() || chars[i] == '\'') {
      i += 1;
    }
    let unit: String = chars[unit_start..i].iter().collect();

    let Ok(value) = number.trim_end_matches('.').parse::<f64>() else {
      after_hours = false;
      continue;
    };
    // "1h30" glues the minutes to the hour unit; anything else glued is a label
    if glued && !after_hours {
      continue;
    }

    let is_hours = matches!(unit.as_str(), "h" | "hr" | "hrs" | "hour" | "hours");
    match unit.as_str() {
      _ if is_hours => total += value * 60.0,
      "m" | "min" | "mins" | "minute" | "minutes" | "'" => total += value,
      "" if counted == 0 || after_hours => total += value,
      _ => {
        after_hours = false;
        continue;
      }
    }
    counted += 1;
    after_hours = is_hours;
  }

  total.round().max(0.0) as u32
}

/// Blank out `(...)` notes so their numbers are not read as durations
fn strip_parenthesized(text: &str) -> String {
  let mut depth = 0usize;
  text
    .chars()
    .map(|c| match c {
      '(' => {
        depth += 1;
        ' '
      }
      ')' => {
        depth = depth.saturating_sub(1);
        ' '
      }
      _ if depth > 0 => ' ',
      _ => c,
    })
    .collect()
}

/// Strip punctuation around a whitespace token, keeping digits and colons
fn clock_token(token: &str) -> &str {
  token.trim_matches(|c: char| !c.is_ascii_digit() && c != ':')
}

fn is_clock_shaped(token: &str) -> bool {
  let parts: Vec<&str> = token.split(':').collect();
  (2..=3).contains(&parts.len())
    && parts
      .iter()
      .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}

fn parse_clock(text: &str) -> Option<u32> {
  let parts: Vec<&str> = text.split(':').collect();
  if !is_clock_shaped(text) || parts[1..].iter().any(|p| p.len() != 2) {
    return None;
  }

  let hours: u32 = parts[0].parse().ok()?;
  let minutes: u32 = parts[1].parse().ok()?;
  let seconds: u32 = parts.get(2).map_or(Some(0), |s| s.parse().ok())?;
  hours
    .checked_mul(60)?
    .checked_add(minutes)?
    .checked_add((seconds as f64 / 60.0).round() as u32)
}

/// ---------------------------------------------------------------------------
/// Week Boundaries & Labels
/// ---------------------------------------------------------------------------

/// The Saturday closing the Sunday-to-Saturday week that contains `date`
pub fn week_ending_saturday(date: NaiveDate) -> NaiveDate {
  let days_to_saturday = 6 - date.weekday().num_days_from_sunday();
  date + Duration::days(days_to_saturday as i64)
}

/// Short chart label, e.g. "Jun 1"
pub fn short_label(date: NaiveDate) -> String {
  date.format("%b %-d").to_string()
}

/// "45m", "2h", "1h 30m"
pub fn format_minutes(minutes: u32) -> String {
  let (h, m) = (minutes / 60, minutes % 60);
  match (h, m) {
    (0, m) => format!("{}m", m),
    (h, 0) => format!("{}h", h),
    (h, m) => format!("{}h {}m", h, m),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Weekday;

  fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn test_parse_iso_dates() {
    assert_eq!(parse_date("2025-06-01"), Some(ymd(2025, 6, 1)));
    assert_eq!(parse_date("2025/6/1"), Some(ymd(2025, 6, 1)));
    assert_eq!(parse_date("Sun 2025-6-1"), Some(ymd(2025, 6, 1)));
  }

  #[test]
  fn test_parse_loose_dates() {
    assert_eq!(parse_date("June 1, 2025"), Some(ymd(2025, 6, 1)));
    assert_eq!(parse_date("Jun 1 2025"), Some(ymd(2025, 6, 1)));
    assert_eq!(parse_date("1 June 2025"), Some(ymd(2025, 6, 1)));
    assert_eq!(parse_date("6/1/2025"), Some(ymd(2025, 6, 1)));
    assert_eq!(parse_date("Sunday, June 1, 2025"), Some(ymd(2025, 6, 1)));
  }

  #[test]
  fn test_parse_date_rejects_garbage() {
    assert_eq!(parse_date(""), None);
    assert_eq!(parse_date("YYYY-MM-DD"), None);
    assert_eq!(parse_date("2025-02-30"), None);
    assert_eq!(parse_date("12025-06-01"), None);
  }

  #[test]
  fn test_find_multiple_iso_dates() {
    let dates = find_iso_dates("2025-06-01 to 2025-07-15");
    assert_eq!(dates, vec![ymd(2025, 6, 1), ymd(2025, 7, 15)]);
  }

  #[test]
  fn test_noon_keeps_calendar_day() {
    let stamp = noon(ymd(2025, 6, 1));
    assert_eq!(stamp.date(), ymd(2025, 6, 1));
    assert_eq!(stamp.format("%H:%M").to_string(), "12:00");
  }

  #[test]
  fn test_duration_forms() {
    assert_eq!(parse_duration_minutes("1h 30m"), 90);
    assert_eq!(parse_duration_minutes("45"), 45);
    assert_eq!(parse_duration_minutes("-"), 0);
    assert_eq!(parse_duration_minutes(""), 0);
    assert_eq!(parse_duration_minutes("2h"), 120);
    assert_eq!(parse_duration_minutes("1.5h"), 90);
    assert_eq!(parse_duration_minutes("2.5 hrs"), 150);
    assert_eq!(parse_duration_minutes("40 min"), 40);
    assert_eq!(parse_duration_minutes("1h30"), 90);
    assert_eq!(parse_duration_minutes("1:30"), 90);
    assert_eq!(parse_duration_minutes("0:45:30"), 46);
    assert_eq!(parse_duration_minutes("n/a"), 0);
  }

  #[test]
  fn test_duration_oversized_clock_is_zero() {
    assert_eq!(parse_duration_minutes("99999999:00"), 0);
    assert_eq!(parse_duration_minutes("4294967295:59:59"), 0);
  }

  #[test]
  fn test_duration_ignores_notes() {
    assert_eq!(parse_duration_minutes("45 (Z2)"), 45);
    assert_eq!(parse_duration_minutes("Z2 45"), 45);
    assert_eq!(parse_duration_minutes("1h30m (3x10 @ threshold)"), 90);
    assert_eq!(parse_duration_minutes("40 min, 4 strides"), 40);
  }

  #[test]
  fn test_duration_clock_inside_text() {
    assert_eq!(parse_duration_minutes("1:30 easy"), 90);
    assert_eq!(parse_duration_minutes("approx. 0:45:00"), 45);
  }

  #[test]
  fn test_duration_ignores_distance_units() {
    assert_eq!(parse_duration_minutes("10 km"), 0);
    assert_eq!(parse_duration_minutes("60 min / 10 km"), 60);
  }

  #[test]
  fn test_week_ending_saturday() {
    // 2025-06-01 is a Sunday
    let sunday = ymd(2025, 6, 1);
    assert_eq!(sunday.weekday(), Weekday::Sun);
    assert_eq!(week_ending_saturday(sunday), ymd(2025, 6, 7));

    let saturday = ymd(2025, 6, 7);
    assert_eq!(week_ending_saturday(saturday), saturday);
  }

  #[test]
  fn test_labels() {
    assert_eq!(short_label(ymd(2025, 6, 1)), "Jun 1");
    assert_eq!(format_minutes(45), "45m");
    assert_eq!(format_minutes(120), "2h");
    assert_eq!(format_minutes(95), "1h 35m");
  }
}
