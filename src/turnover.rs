//! Turnover aggregation: revenue totals over date ranges and the
//! daily/weekly/monthly rollups behind the admin report.
//!
//! Prices are summed in `Decimal`, then truncated to whole currency units
//! (fractional pence are discarded, not rounded) before combining. A range
//! with no records yields zeros, never an error.

use chrono::{Datelike, NaiveDate, TimeDelta};
use rusqlite::Connection;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::db::repository::{appointment, prescription};
use crate::db::DatabaseError;

/// Revenue totals for one date range, in whole currency units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Turnover {
    pub prescriptions: i64,
    pub appointments: i64,
    pub total: i64,
}

/// Total turnover between the given dates, inclusive both ends.
pub fn turnover(
    conn: &Connection,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Turnover, DatabaseError> {
    let prescriptions = prescription::sum_price_between(conn, start, end)?
        .trunc()
        .to_i64()
        .unwrap_or(0);
    let appointments = appointment::sum_price_between(conn, start, end)?
        .trunc()
        .to_i64()
        .unwrap_or(0);

    Ok(Turnover {
        prescriptions,
        appointments,
        total: prescriptions + appointments,
    })
}

/// One entry per day of the reference date's month, zero-filled for days
/// with no activity.
pub fn daily(conn: &Connection, reference: NaiveDate) -> Result<Vec<Turnover>, DatabaseError> {
    let month_start = first_of_month(reference);
    let days = days_in_month(reference);

    let mut entries = Vec::with_capacity(days as usize);
    for offset in 0..days {
        let day = month_start + TimeDelta::days(offset);
        entries.push(turnover(conn, day, day)?);
    }
    Ok(entries)
}

/// One entry per calendar week-row of the reference date's month, as a
/// month calendar would display them. The first week is the Monday-aligned
/// week containing day 1, which may start in the prior month; each entry
/// spans exactly seven days.
pub fn weekly(conn: &Connection, reference: NaiveDate) -> Result<Vec<Turnover>, DatabaseError> {
    let month_start = first_of_month(reference);
    let week_start =
        month_start - TimeDelta::days(month_start.weekday().num_days_from_monday() as i64);
    let weeks = week_rows_in_month(reference);

    let mut entries = Vec::with_capacity(weeks as usize);
    for row in 0..weeks {
        let start = week_start + TimeDelta::weeks(row);
        entries.push(turnover(conn, start, start + TimeDelta::days(6))?);
    }
    Ok(entries)
}

/// Twelve entries for the reference date's year, one per calendar month,
/// each covering the first through the last day inclusive.
pub fn monthly(conn: &Connection, reference: NaiveDate) -> Result<Vec<Turnover>, DatabaseError> {
    let mut entries = Vec::with_capacity(12);
    for month in 1..=12 {
        let start = NaiveDate::from_ymd_opt(reference.year(), month, 1).unwrap();
        let end = first_of_next_month(start) - TimeDelta::days(1);
        entries.push(turnover(conn, start, end)?);
    }
    Ok(entries)
}

/// Arithmetic mean of the `total` field. The rollup producers always return
/// non-empty sequences; an empty slice still yields 0 rather than dividing
/// by zero.
pub fn average(entries: &[Turnover]) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }
    let sum: i64 = entries.iter().map(|t| t.total).sum();
    sum as f64 / entries.len() as f64
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap()
}

fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1).unwrap()
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1).unwrap()
    }
}

fn days_in_month(date: NaiveDate) -> i64 {
    (first_of_next_month(date) - first_of_month(date)).num_days()
}

/// Number of week rows a Monday-first month calendar shows for this month
/// (5 or 6; 4 for a February starting on Monday).
fn week_rows_in_month(date: NaiveDate) -> i64 {
    let lead = first_of_month(date).weekday().num_days_from_monday() as i64;
    (lead + days_in_month(date) + 6) / 7
}
