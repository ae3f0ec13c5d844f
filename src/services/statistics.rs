//! Aggregations over query results for dashboard endpoints, plus the date
//! windows those endpoints filter on.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::errors::{AppError, AppResult};

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Key used when a grouped row carries no barangay.
pub const UNKNOWN_BARANGAY: &str = "Unknown";

/// Half-open timestamp range `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateWindow {
    pub start: String,
    pub end: String,
}

impl DateWindow {
    fn months(year: i32, month: u32, span: u32) -> AppResult<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| AppError::bad_request("Invalid month"))?;
        let end_month0 = month - 1 + span;
        let end = NaiveDate::from_ymd_opt(year + (end_month0 / 12) as i32, end_month0 % 12 + 1, 1)
            .ok_or_else(|| AppError::bad_request("Invalid month"))?;
        Ok(Self {
            start: format!("{}T00:00:00Z", start.format("%Y-%m-%d")),
            end: format!("{}T00:00:00Z", end.format("%Y-%m-%d")),
        })
    }
}

/// Window covering the month named by `YYYY-MM`.
pub fn month_window(date: &str) -> AppResult<DateWindow> {
    let (year, month) = date
        .trim()
        .split_once('-')
        .ok_or_else(|| AppError::bad_request("date must be formatted as YYYY-MM"))?;
    let year: i32 = year
        .parse()
        .map_err(|_| AppError::bad_request("date must be formatted as YYYY-MM"))?;
    let month = parse_month(month)?;
    DateWindow::months(year, month, 1)
}

/// Window covering month `MM` of `year`.
pub fn month_of_year_window(year: i32, month: &str) -> AppResult<DateWindow> {
    DateWindow::months(year, parse_month(month)?, 1)
}

/// Window covering a calendar year.
pub fn year_window(year: i32) -> DateWindow {
    DateWindow {
        start: format!("{}-01-01T00:00:00Z", year),
        end: format!("{}-01-01T00:00:00Z", year + 1),
    }
}

fn parse_month(raw: &str) -> AppResult<u32> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|m| (1..=12).contains(m))
        .ok_or_else(|| AppError::bad_request("Invalid month"))
}

/// Parse store timestamps: RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.f]`, or a bare date.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Vaccination dashboard totals for one year
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VaccinationStats {
    /// Records per month name
    pub total_records: BTreeMap<String, u64>,
    pub total_cats: u64,
    pub total_dogs: u64,
}

/// Count `rows` created in `year` per month, and the cats and dogs among them.
///
/// Rows carry `created_at` and an embedded `PetRecords` relation.
pub fn vaccination_stats(rows: &[Value], year: i32) -> VaccinationStats {
    use chrono::Datelike;

    let mut stats = VaccinationStats::default();
    for row in rows {
        let Some(created) = row
            .get("created_at")
            .and_then(Value::as_str)
            .and_then(parse_timestamp)
        else {
            continue;
        };
        if created.year() != year {
            continue;
        }

        let month = MONTH_NAMES[created.month0() as usize];
        *stats.total_records.entry(month.to_string()).or_insert(0) += 1;

        for pet in embedded(row, "PetRecords") {
            // Exact match; stored values are lowercase
            match pet.get("specie").and_then(Value::as_str) {
                Some("cat") => stats.total_cats += 1,
                Some("dog") => stats.total_dogs += 1,
                _ => {}
            }
        }
    }
    stats
}

/// Count rows per `PetRecords.PetOwnerProfiles.barangay`.
pub fn barangay_totals(rows: &[Value]) -> BTreeMap<String, u64> {
    let mut totals = BTreeMap::new();
    for row in rows {
        for pet in embedded(row, "PetRecords") {
            for owner in embedded(pet, "PetOwnerProfiles") {
                let barangay = owner
                    .get("barangay")
                    .and_then(Value::as_str)
                    .filter(|b| !b.is_empty())
                    .unwrap_or(UNKNOWN_BARANGAY);
                *totals.entry(barangay.to_string()).or_insert(0) += 1;
            }
        }
    }
    totals
}

/// Sum of `num_vaccines` across distribution rows.
pub fn total_vaccines(rows: &[Value]) -> i64 {
    rows.iter()
        .filter_map(|row| row.get("num_vaccines"))
        .filter_map(|n| match n {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .sum()
}

/// An embedded relation may come back as one object or a list.
fn embedded<'a>(row: &'a Value, key: &str) -> Vec<&'a Value> {
    match row.get(key) {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(obj @ Value::Object(_)) => vec![obj],
        _ => Vec::new(),
    }
}
