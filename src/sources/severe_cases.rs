// src/sources/severe_cases.rs
//! Nationwide severe-case CSV feed.
//!
//! The feed carries one row per (date, prefecture); the nationwide total uses
//! the sentinel category `ALL`. A day counts as published once its aggregate
//! row exists.

use chrono::NaiveDate;
use serde::Serialize;

use crate::poll::{FetchResult, FreshnessPredicate, PollTarget, Verdict};

pub const DEFAULT_FEED_URL: &str =
    "https://covid19.mhlw.go.jp/public/opendata/severe_cases_daily.csv";
pub const AGGREGATE_CATEGORY: &str = "ALL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SevereCaseRow {
    pub date: NaiveDate,
    pub category: String,
    pub count: i64,
}

/// Accepts `2021/1/2` (the feed's own format) and `2021-01-02`.
pub fn parse_feed_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    NaiveDate::parse_from_str(s, "%Y/%m/%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .ok()
}

/// Columns are read by position: date, category, count. Rows that fail to
/// decode or parse are skipped.
pub fn parse_rows(bytes: &[u8]) -> Vec<SevereCaseRow> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for (idx, record) in reader.byte_records().enumerate() {
        let parsed = record.ok().as_ref().and_then(row_from_record);
        match parsed {
            Some(row) => rows.push(row),
            None => tracing::debug!(target: "severe_cases", line = idx + 2, "skipping malformed row"),
        }
    }
    rows
}

fn row_from_record(record: &csv::ByteRecord) -> Option<SevereCaseRow> {
    let field = |i: usize| record.get(i).and_then(|raw| std::str::from_utf8(raw).ok());
    Some(SevereCaseRow {
        date: parse_feed_date(field(0)?)?,
        category: field(1)?.to_string(),
        count: field(2)?.parse().ok()?,
    })
}

pub fn find_aggregate<'a>(
    rows: &'a [SevereCaseRow],
    date: NaiveDate,
    category: &str,
) -> Option<&'a SevereCaseRow> {
    rows.iter().find(|r| r.date == date && r.category == category)
}

/// Ready with the aggregate row's count once the target date has a row.
#[derive(Debug, Clone)]
pub struct AggregateRowPredicate {
    pub category: String,
}

impl Default for AggregateRowPredicate {
    fn default() -> Self {
        Self {
            category: AGGREGATE_CATEGORY.to_string(),
        }
    }
}

impl FreshnessPredicate for AggregateRowPredicate {
    type Payload = SevereCaseRow;

    fn evaluate(&self, target: &PollTarget, fetched: &FetchResult) -> Verdict<SevereCaseRow> {
        let Some(date) = target.target_date() else {
            return Verdict::NotReady;
        };
        if !fetched.is_success() {
            return Verdict::NotReady;
        }
        let rows = parse_rows(&fetched.body);
        match find_aggregate(&rows, date, &self.category) {
            Some(row) => Verdict::Ready(row.clone()),
            None => Verdict::NotReady,
        }
    }
}
