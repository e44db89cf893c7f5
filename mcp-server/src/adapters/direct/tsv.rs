//! Parsing of TSV campaign performance reports
//!
//! The Reports API is asked for a column header and no title or summary
//! rows, so the body is a header line followed by one line per day.

use csv::{ReaderBuilder, StringRecord};

use crate::domain::entities::Trend;
use crate::error::SourceError;

/// Relative CPA change between halves of the period that counts as a trend
const TREND_THRESHOLD: f64 = 0.10;

/// One daily row of a campaign performance report
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRow {
    pub date: String,
    pub clicks: u64,
    pub cost: f64,
    pub impressions: u64,
    pub conversions: u64,
}

/// Column positions resolved from the header line
struct Columns {
    date: Option<usize>,
    clicks: Option<usize>,
    cost: Option<usize>,
    impressions: Option<usize>,
    conversions: Option<usize>,
}

impl Columns {
    fn from_header(header: &StringRecord) -> Self {
        let find = |name: &str| header.iter().position(|h| h.trim() == name);
        Self {
            date: find("Date"),
            clicks: find("Clicks"),
            cost: find("Cost"),
            impressions: find("Impressions"),
            conversions: find("Conversions"),
        }
    }
}

/// Parse a report body into daily rows.
///
/// Missing or non-numeric cells (the API writes `--` when a value is not
/// available) count as zero. A body without data lines is `NoData`.
pub fn parse_daily_rows(body: &str) -> Result<Vec<DailyRow>, SourceError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .has_headers(true)
        .from_reader(body.trim().as_bytes());

    let header = reader
        .headers()
        .map_err(|e| SourceError::Parse(e.to_string()))?
        .clone();
    let columns = Columns::from_header(&header);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| SourceError::Parse(e.to_string()))?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        rows.push(DailyRow {
            date: cell(&record, columns.date).unwrap_or_default().to_string(),
            clicks: int_cell(&record, columns.clicks),
            cost: float_cell(&record, columns.cost),
            impressions: int_cell(&record, columns.impressions),
            conversions: int_cell(&record, columns.conversions),
        });
    }

    if rows.is_empty() {
        return Err(SourceError::NoData);
    }
    rows.sort_by(|a, b| a.date.cmp(&b.date));
    Ok(rows)
}

fn cell(record: &StringRecord, index: Option<usize>) -> Option<&str> {
    index.and_then(|i| record.get(i)).map(str::trim)
}

fn int_cell(record: &StringRecord, index: Option<usize>) -> u64 {
    cell(record, index)
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0)
}

fn float_cell(record: &StringRecord, index: Option<usize>) -> f64 {
    cell(record, index)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Compare CPA of the first half of the period against the second half
pub fn detect_trend(rows: &[DailyRow]) -> Trend {
    if rows.len() < 2 {
        return Trend::Stable;
    }

    let (first, second) = rows.split_at(rows.len() / 2);
    let (Some(before), Some(after)) = (half_cpa(first), half_cpa(second)) else {
        return Trend::Stable;
    };

    if after < before * (1.0 - TREND_THRESHOLD) {
        Trend::Improving
    } else if after > before * (1.0 + TREND_THRESHOLD) {
        Trend::Worsening
    } else {
        Trend::Stable
    }
}

fn half_cpa(rows: &[DailyRow]) -> Option<f64> {
    let cost: f64 = rows.iter().map(|r| r.cost).sum();
    let conversions: u64 = rows.iter().map(|r| r.conversions).sum();
    (conversions > 0).then(|| cost / conversions as f64)
}
