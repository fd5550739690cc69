// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Calendar-day parsing for timestamp searches.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};

const DAY_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d.%m.%Y", "%d/%m/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

const SECONDS_PER_DAY: i64 = 86_400;

/// Parse a search value as a calendar day in `offset`.
///
/// Accepts plain dates, local date-times (the time part is dropped) and
/// RFC 3339 instants (converted to `offset` first).
#[must_use]
pub fn parse_day(value: &str, offset: FixedOffset) -> Option<NaiveDate> {
    let value = value.trim();
    DAY_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.with_timezone(&offset).date_naive())
        })
}

/// `[midnight, next midnight)` of `day` in `offset`, as Unix seconds.
#[must_use]
pub fn day_bounds(day: NaiveDate, offset: FixedOffset) -> Option<(i64, i64)> {
    let midnight = day.and_hms_opt(0, 0, 0)?;
    let start = offset.from_local_datetime(&midnight).single()?.timestamp();
    Some((start, start + SECONDS_PER_DAY))
}
