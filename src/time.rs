// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Time conversions.
//!
//! All model times are kept as MJD2000, i.e. the (fractional) number of days
//! since 2000-01-01T00:00:00. Model files commonly express time as decimal
//! years; these are converted with the proleptic Gregorian calendar, so that
//! a decimal year's fraction is relative to the length of that year.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

/// Days from 0001-01-01 (day 1) to 2000-01-01.
const MJD2000_DAYS_FROM_CE: i32 = 730_120;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// The number of days between 2000-01-01 and 1st January of `year`. `None` if
/// the year is outside the supported calendar range.
fn year_start_mjd2000(year: i32) -> Option<i32> {
    NaiveDate::from_ymd_opt(year, 1, 1).map(|d| d.num_days_from_ce() - MJD2000_DAYS_FROM_CE)
}

/// The MJD2000 bounds of `year`.
fn year_bounds_mjd2000(year: i32) -> Option<(f64, f64)> {
    let start = year_start_mjd2000(year)?;
    let end = year_start_mjd2000(year.checked_add(1)?)?;
    Some((f64::from(start), f64::from(end)))
}

/// Convert a decimal year (e.g. 2015.5) to MJD2000. Infinite and NaN values
/// are passed through unchanged; years beyond the calendar range become
/// infinite.
pub fn decimal_year_to_mjd2000(decimal_year: f64) -> f64 {
    if !decimal_year.is_finite() {
        return decimal_year;
    }
    let year = decimal_year.floor();
    // `as` saturates; anything out of i32 range is rejected below.
    match i32::try_from(year as i64).ok().and_then(year_bounds_mjd2000) {
        Some((start, end)) => start + (decimal_year - year) * (end - start),
        None => f64::INFINITY.copysign(decimal_year),
    }
}

/// Convert MJD2000 to a decimal year. Infinite and NaN values are passed
/// through unchanged; times beyond the calendar range become infinite.
pub fn mjd2000_to_decimal_year(mjd2000: f64) -> f64 {
    if !mjd2000.is_finite() {
        return mjd2000;
    }
    let bounds = (mjd2000.floor() as i64)
        .checked_add(i64::from(MJD2000_DAYS_FROM_CE))
        .and_then(|days| i32::try_from(days).ok())
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .and_then(|date| Some((date.year(), year_bounds_mjd2000(date.year())?)));
    match bounds {
        Some((year, (start, end))) => f64::from(year) + (mjd2000 - start) / (end - start),
        None => f64::INFINITY.copysign(mjd2000),
    }
}

/// Convert a date and time to MJD2000.
pub fn datetime_to_mjd2000(datetime: NaiveDateTime) -> f64 {
    let days = datetime.num_days_from_ce() - MJD2000_DAYS_FROM_CE;
    let time = datetime.time();
    let seconds =
        f64::from(time.num_seconds_from_midnight()) + f64::from(time.nanosecond()) * 1e-9;
    f64::from(days) + seconds / SECONDS_PER_DAY
}
