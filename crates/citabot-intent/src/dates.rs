// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Normalization of raw date/time entity strings into typed values.
//!
//! The provider returns whatever the client typed ("mañana", "el viernes",
//! "a las 10"); booking needs concrete dates and times. Anything that does
//! not normalize is treated as not-extracted, so the dialogue re-prompts
//! instead of booking a wrong slot.

use chrono::{Datelike, Days, NaiveDate, NaiveTime, Weekday};

/// Parses a raw date mention relative to `today`.
///
/// Accepts relative words (hoy/mañana/pasado mañana and English
/// equivalents), weekday names (resolving to the next occurrence, never
/// today), ISO dates, and numeric day/month forms.
pub fn parse_date(raw: &str, today: NaiveDate) -> Option<NaiveDate> {
    let needle = raw.trim().to_lowercase();
    let needle = needle
        .strip_prefix("el ")
        .or_else(|| needle.strip_prefix("este "))
        .or_else(|| needle.strip_prefix("next "))
        .unwrap_or(&needle)
        .trim();

    match needle {
        "" => return None,
        "hoy" | "today" => return Some(today),
        "mañana" | "manana" | "tomorrow" => return today.checked_add_days(Days::new(1)),
        "pasado mañana" | "pasado manana" => return today.checked_add_days(Days::new(2)),
        _ => {}
    }

    if let Some(weekday) = parse_weekday(needle) {
        return Some(next_weekday(today, weekday));
    }

    if let Ok(date) = NaiveDate::parse_from_str(needle, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(needle, "%d/%m/%Y") {
        return Some(date);
    }

    // Day/month without a year: this year, or next year if already past.
    if let Some((day_str, month_str)) = needle.split_once('/')
        && let (Ok(day), Ok(month)) = (day_str.parse::<u32>(), month_str.parse::<u32>())
        && let Some(date) = NaiveDate::from_ymd_opt(today.year(), month, day)
    {
        return if date < today {
            NaiveDate::from_ymd_opt(today.year() + 1, month, day)
        } else {
            Some(date)
        };
    }

    None
}

fn parse_weekday(s: &str) -> Option<Weekday> {
    match s {
        "lunes" | "monday" => Some(Weekday::Mon),
        "martes" | "tuesday" => Some(Weekday::Tue),
        "miércoles" | "miercoles" | "wednesday" => Some(Weekday::Wed),
        "jueves" | "thursday" => Some(Weekday::Thu),
        "viernes" | "friday" => Some(Weekday::Fri),
        "sábado" | "sabado" | "saturday" => Some(Weekday::Sat),
        "domingo" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Next occurrence of `weekday` strictly after `today`. A client saying
/// "el viernes" on a Friday means next week.
fn next_weekday(today: NaiveDate, weekday: Weekday) -> NaiveDate {
    let today_num = today.weekday().num_days_from_monday();
    let target_num = weekday.num_days_from_monday();
    let ahead = (target_num + 7 - today_num) % 7;
    let ahead = if ahead == 0 { 7 } else { ahead };
    today + Days::new(u64::from(ahead))
}

/// Parses a raw time mention: "10:30", "a las 10", "10h", a bare hour.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let needle = raw.trim().to_lowercase();
    let needle = needle
        .strip_prefix("a las ")
        .or_else(|| needle.strip_prefix("a la "))
        .or_else(|| needle.strip_prefix("at "))
        .unwrap_or(&needle)
        .trim();
    let needle = needle.strip_suffix('h').unwrap_or(needle).trim();

    if let Some((hour_str, minute_str)) = needle.split_once(':') {
        let hour: u32 = hour_str.trim().parse().ok()?;
        let minute: u32 = minute_str.trim().parse().ok()?;
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }

    let hour: u32 = needle.parse().ok()?;
    NaiveTime::from_hms_opt(hour, 0, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wed() -> NaiveDate {
        // 2026-09-02 is a Wednesday.
        NaiveDate::from_ymd_opt(2026, 9, 2).unwrap()
    }

    #[test]
    fn relative_words_resolve_against_today() {
        assert_eq!(parse_date("hoy", wed()), Some(wed()));
        assert_eq!(
            parse_date("mañana", wed()),
            NaiveDate::from_ymd_opt(2026, 9, 3)
        );
        assert_eq!(
            parse_date("pasado mañana", wed()),
            NaiveDate::from_ymd_opt(2026, 9, 4)
        );
        assert_eq!(parse_date("tomorrow", wed()), NaiveDate::from_ymd_opt(2026, 9, 3));
    }

    #[test]
    fn weekdays_resolve_to_next_occurrence() {
        // Friday after Wednesday 2026-09-02 is 2026-09-04.
        assert_eq!(
            parse_date("el viernes", wed()),
            NaiveDate::from_ymd_opt(2026, 9, 4)
        );
        // Same weekday rolls a full week forward.
        assert_eq!(
            parse_date("miércoles", wed()),
            NaiveDate::from_ymd_opt(2026, 9, 9)
        );
    }

    #[test]
    fn explicit_dates_parse() {
        assert_eq!(
            parse_date("2026-09-12", wed()),
            NaiveDate::from_ymd_opt(2026, 9, 12)
        );
        assert_eq!(
            parse_date("12/09/2026", wed()),
            NaiveDate::from_ymd_opt(2026, 9, 12)
        );
        assert_eq!(
            parse_date("12/09", wed()),
            NaiveDate::from_ymd_opt(2026, 9, 12)
        );
    }

    #[test]
    fn past_day_month_rolls_to_next_year() {
        assert_eq!(
            parse_date("01/02", wed()),
            NaiveDate::from_ymd_opt(2027, 2, 1)
        );
    }

    #[test]
    fn junk_dates_are_rejected() {
        assert_eq!(parse_date("", wed()), None);
        assert_eq!(parse_date("cuando pueda", wed()), None);
        assert_eq!(parse_date("32/13", wed()), None);
    }

    #[test]
    fn times_parse_in_common_forms() {
        assert_eq!(parse_time("10:30"), NaiveTime::from_hms_opt(10, 30, 0));
        assert_eq!(parse_time("a las 10"), NaiveTime::from_hms_opt(10, 0, 0));
        assert_eq!(parse_time("17h"), NaiveTime::from_hms_opt(17, 0, 0));
        assert_eq!(parse_time("9"), NaiveTime::from_hms_opt(9, 0, 0));
    }

    #[test]
    fn junk_times_are_rejected() {
        assert_eq!(parse_time("por la tarde"), None);
        assert_eq!(parse_time("25:00"), None);
        assert_eq!(parse_time(""), None);
    }
}
