//! Month-end calendar helpers used to lay out billing periods.
//!
//! Every billing boundary in the schedule falls on a calendar month-end, so
//! these helpers only ever need to know the length of a month.

use chrono::{Datelike, NaiveDate};

use crate::error::CreditSimError;
use crate::CreditSimResult;

/// Last calendar day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> CreditSimResult<NaiveDate> {
    last_day_of(date.year(), date.month())
}

/// Last calendar day of the month *after* the one containing `date`.
///
/// December rolls over into January of the following year.
pub fn next_month_end(date: NaiveDate) -> CreditSimResult<NaiveDate> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    last_day_of(year, month)
}

/// Day difference `end - start`: the start date is excluded, the end date is
/// included. Negative when `end` precedes `start`.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// Day after `date`.
pub fn next_day(date: NaiveDate) -> CreditSimResult<NaiveDate> {
    date.succ_opt()
        .ok_or_else(|| CreditSimError::DateError(format!("no calendar day after {date}")))
}

/// Number of days in a given month/year.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn last_day_of(year: i32, month: u32) -> CreditSimResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, days_in_month(year, month)).ok_or_else(|| {
        CreditSimError::DateError(format!("month {month}-{year} is outside the supported range"))
    })
}
