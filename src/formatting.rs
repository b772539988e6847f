// Copyright 2023 Remi Bernotavicius

use chrono::{Datelike as _, NaiveDateTime, Timelike as _};

fn pluralize(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{count} {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

/// Renders a number of minutes like "1 hr 5 mins", as shown for preparation and cooking times.
pub fn convert_time(time: i32) -> String {
    let hours = time / 60;
    let minutes = time % 60;

    let hrs = if hours > 1 { "hrs" } else { "hr" };
    let mins = if minutes > 1 { "mins" } else { "min" };

    if hours > 0 && minutes > 0 {
        format!("{hours} {hrs} {minutes} {mins}")
    } else if hours > 0 {
        format!("{hours} {hrs}")
    } else {
        format!("{minutes} {mins}")
    }
}

/// Describes when `date` happened relative to `now`.
///
/// The comparison is between calendar fields rather than elapsed time, and the first matching rule
/// wins: a review from 23:59 yesterday is "Yesterday" even if it is only two minutes old.
pub fn format_date(date: NaiveDateTime, now: NaiveDateTime) -> String {
    let years = i64::from(now.year() - date.year());
    if years > 5 {
        return format!("{years} years ago");
    }
    if years > 1 {
        return format!("{}/{}/{}", date.month(), date.day(), date.year());
    }
    if years == 1 || now.month() > date.month() {
        return date.format("%B %-d").to_string();
    }

    let days = i64::from(now.day()) - i64::from(date.day());
    if days > 7 {
        return format!("{days} days ago");
    }
    if days > 1 {
        return date.format("%A").to_string();
    }
    if days == 1 {
        return "Yesterday".into();
    }

    let hours = i64::from(now.hour()) - i64::from(date.hour());
    if hours > 0 {
        return format!("{} ago", pluralize(hours, "hour"));
    }
    let minutes = i64::from(now.minute()) - i64::from(date.minute());
    if minutes > 0 {
        return format!("{} ago", pluralize(minutes, "min"));
    }
    let seconds = i64::from(now.second()) - i64::from(date.second());
    format!("{} ago", pluralize(seconds, "second"))
}

#[cfg(test)]
fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

#[test]
fn convert_time_units() {
    assert_eq!(convert_time(0), "0 min");
    assert_eq!(convert_time(1), "1 min");
    assert_eq!(convert_time(45), "45 mins");
    assert_eq!(convert_time(60), "1 hr");
    assert_eq!(convert_time(61), "1 hr 1 min");
    assert_eq!(convert_time(90), "1 hr 30 mins");
    assert_eq!(convert_time(120), "2 hrs");
    assert_eq!(convert_time(185), "3 hrs 5 mins");
}

#[test]
fn format_date_years() {
    let now = at("2026-06-01 12:00:00");
    assert_eq!(format_date(at("2020-01-01 00:00:00"), now), "6 years ago");
    assert_eq!(format_date(at("2021-12-31 23:59:59"), now), "12/31/2021");
    assert_eq!(format_date(at("2023-03-07 08:00:00"), now), "3/7/2023");
    assert_eq!(format_date(at("2025-09-14 08:00:00"), now), "September 14");
    assert_eq!(format_date(at("2025-12-31 23:59:59"), at("2026-01-01 00:00:01")), "December 31");
}

#[test]
fn format_date_earlier_month() {
    let now = at("2026-06-01 12:00:00");
    assert_eq!(format_date(at("2026-05-31 12:00:00"), now), "May 31");
    assert_eq!(format_date(at("2026-01-05 12:00:00"), now), "January 5");
}

#[test]
fn format_date_days() {
    let now = at("2026-06-20 12:00:00");
    assert_eq!(format_date(at("2026-06-01 09:00:00"), now), "19 days ago");
    assert_eq!(format_date(at("2026-06-12 09:00:00"), now), "8 days ago");
    // 2026-06-13 is a Saturday
    assert_eq!(format_date(at("2026-06-13 09:00:00"), now), "Saturday");
    assert_eq!(format_date(at("2026-06-17 09:00:00"), now), "Wednesday");
    assert_eq!(format_date(at("2026-06-18 23:59:59"), now), "Thursday");
    assert_eq!(format_date(at("2026-06-19 23:59:59"), now), "Yesterday");
    assert_eq!(format_date(at("2026-06-19 00:00:00"), now), "Yesterday");
}

#[test]
fn format_date_same_day() {
    let now = at("2026-06-20 12:01:30");
    assert_eq!(format_date(at("2026-06-20 12:00:00"), now), "1 min ago");
    assert_eq!(format_date(at("2026-06-20 11:59:00"), now), "1 hour ago");
    assert_eq!(format_date(at("2026-06-20 09:30:00"), now), "3 hours ago");
    assert_eq!(format_date(at("2026-06-20 11:58:59"), at("2026-06-20 12:00:00")), "1 hour ago");
    assert_eq!(format_date(at("2026-06-20 12:01:00"), now), "30 seconds ago");
    assert_eq!(format_date(at("2026-06-20 12:01:29"), now), "1 second ago");
    assert_eq!(format_date(now, now), "0 seconds ago");
    assert_eq!(format_date(at("2026-06-20 11:50:00"), at("2026-06-20 12:00:00")), "1 hour ago");
    assert_eq!(format_date(at("2026-06-20 12:10:00"), at("2026-06-20 12:30:00")), "20 mins ago");
}
