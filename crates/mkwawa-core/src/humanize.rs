//! Human-readable durations shown alongside records.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};

fn plural(n: i64, unit: &str) -> String {
  if n == 1 { format!("{n} {unit}") } else { format!("{n} {unit}s") }
}

/// Completed years between `date_of_birth` and `today`.
pub fn age(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
  let had_birthday =
    (today.month(), today.day()) >= (date_of_birth.month(), date_of_birth.day());
  today.year() - date_of_birth.year() - i32::from(!had_birthday)
}

/// "`Y` years, `M` months, `D` days" since `start`, borrowing 30 days per
/// month when the day difference is negative.
pub fn time_in_service(start: NaiveDate, today: NaiveDate) -> String {
  let mut years = today.year() - start.year();
  let mut months = today.month() as i32 - start.month() as i32;
  let mut days = today.day() as i32 - start.day() as i32;

  if days < 0 {
    months -= 1;
    days += 30;
  }
  if months < 0 {
    years -= 1;
    months += 12;
  }
  format!("{years} years, {months} months, {days} days")
}

/// Rental period rendered in the largest calendar unit that is at least one
/// (weeks of 7 days, months of 30, years of 365). `None` when `end` precedes
/// `start`.
pub fn rental_duration(start: NaiveDate, end: NaiveDate) -> Option<String> {
  let days = (end - start).num_days();
  if days < 0 {
    return None;
  }
  Some(match days {
    0..=6 => plural(days, "day"),
    7..=29 => plural(days / 7, "week"),
    30..=364 => plural(days / 30, "month"),
    _ => plural(days / 365, "year"),
  })
}

/// Coarse "N units" bucket for an absolute number of seconds.
fn bucket(seconds: i64) -> String {
  match seconds {
    s if s < 60 => plural(s, "second"),
    s if s < 3_600 => plural(s / 60, "minute"),
    s if s < 86_400 => plural(s / 3_600, "hour"),
    s if s < 604_800 => plural(s / 86_400, "day"),
    s if s < 2_592_000 => plural(s / 604_800, "week"),
    s if s < 31_536_000 => plural(s / 2_592_000, "month"),
    s => plural(s / 31_536_000, "year"),
  }
}

/// "just now" / "N units ago" for a past instant.
pub fn time_since(past: DateTime<Utc>, now: DateTime<Utc>) -> String {
  let seconds = (now - past).num_seconds().max(0);
  if seconds < 60 {
    return "just now".to_owned();
  }
  format!("{} ago", bucket(seconds))
}

/// Distance from `now` to a calendar date, "N units to come" for the future
/// and "N units ago" for the past. Also returns the signed offset in seconds,
/// which orders future dates first when sorted descending.
pub fn relative_date(date: NaiveDate, now: DateTime<Utc>) -> (String, i64) {
  let at = date.and_time(NaiveTime::MIN).and_utc();
  let offset = (at - now).num_seconds();
  if offset > 0 {
    (format!("{} to come", bucket(offset)), offset)
  } else {
    (format!("{} ago", bucket(-offset)), offset)
  }
}
