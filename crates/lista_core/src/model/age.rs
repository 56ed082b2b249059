//! Birth-date handling and derived age.
//!
//! # Invariants
//! - Age is always computed from `fecha_nacimiento`, never stored.
//! - Persisted birth dates use the canonical `YYYY-MM-DD` text form.

use chrono::{Datelike, Local, Months, NaiveDate};

const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";
const DAY_FIRST_DATE_FORMAT: &str = "%d/%m/%Y";

/// Current calendar date in the process' local timezone.
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

/// Whole years elapsed between `birth` and `today`.
///
/// One year is subtracted while the birthday has not yet been reached in
/// `today`'s year. Birth dates after `today` yield `0`.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> u32 {
    if birth > today {
        return 0;
    }

    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).unwrap_or(0)
}

/// Birth date of someone who turns `age` exactly on `today`.
///
/// Feb 29 maps to Feb 28 in non-leap target years.
pub fn birth_date_for_age(age: u32, today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_months(Months::new(age.saturating_mul(12)))
        .unwrap_or(NaiveDate::MIN)
}

/// Parses a birth date in any of the shapes callers hand us.
///
/// Accepts `YYYY-MM-DD`, an ISO datetime starting with one (`2010-06-15T00:00:00Z`),
/// and day-first `DD/MM/YYYY` as produced by spreadsheet exports.
pub fn parse_birth_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, CANONICAL_DATE_FORMAT) {
        return Some(date);
    }
    if let Some((date_part, _)) = trimmed.split_once('T') {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, CANONICAL_DATE_FORMAT) {
            return Some(date);
        }
    }
    NaiveDate::parse_from_str(trimmed, DAY_FIRST_DATE_FORMAT).ok()
}

/// Canonical storage form of a birth date.
pub fn format_birth_date(date: NaiveDate) -> String {
    date.format(CANONICAL_DATE_FORMAT).to_string()
}
