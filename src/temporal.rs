//! Date and time normalization shared by both registries.
//!
//! Rates work at month granularity (`YYYY-MM`, anchored to the first day of
//! the month). Outages work at second granularity and must already be
//! normalized to UTC by the data source: naive instants and non-UTC offsets
//! are rejected at ingestion. Queries use a more forgiving coercion that also
//! accepts bare dates.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::error::TimeError;

/// A month-granularity date: either already typed, or `YYYY-MM` text.
#[derive(Copy, Clone, Debug, derive_more::From)]
pub enum DateInput<'a> {
    Date(NaiveDate),
    Text(&'a str),
}

/// An instant: either already typed, or ISO-8601 text.
#[derive(Copy, Clone, Debug, derive_more::From)]
pub enum InstantInput<'a> {
    Instant(DateTime<Utc>),
    Text(&'a str),
}

/// Parse a `YYYY-MM` month date, anchored to the first day of the month.
///
/// Already-typed dates pass through unchanged.
pub fn parse_month_date(input: DateInput<'_>) -> Result<NaiveDate, TimeError> {
    match input {
        DateInput::Date(date) => Ok(date),
        DateInput::Text(text) => NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d")
            .map_err(|_| TimeError::Format(text.to_string())),
    }
}

/// Parse an ISO-8601 instant for data ingestion.
///
/// The offset must be present and must be zero (`Z` or `+00:00`): the
/// datasets are required to carry UTC instants, so a naive instant or a
/// non-UTC offset is a data error, not something to coerce.
pub fn parse_instant(input: InstantInput<'_>) -> Result<DateTime<Utc>, TimeError> {
    match input {
        InstantInput::Instant(instant) => Ok(instant),
        InstantInput::Text(text) => match DateTime::parse_from_rfc3339(text) {
            Ok(instant) if instant.offset().local_minus_utc() == 0 => {
                Ok(instant.with_timezone(&Utc))
            }
            Ok(_) => Err(TimeError::NonUtc(text.to_string())),
            Err(_) if is_naive(text) => Err(TimeError::Naive(text.to_string())),
            Err(_) => Err(TimeError::Format(text.to_string())),
        },
    }
}

/// Coerce a query bound to a UTC instant.
///
/// Queries are not data: a bare date means midnight UTC, a naive datetime is
/// assumed UTC, and an explicit offset is converted.
pub fn parse_query_instant(input: InstantInput<'_>) -> Result<DateTime<Utc>, TimeError> {
    match input {
        InstantInput::Instant(instant) => Ok(instant),
        InstantInput::Text(text) => {
            if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
                return Ok(instant.with_timezone(&Utc));
            }
            if let Ok(datetime) = text.parse::<NaiveDateTime>() {
                return Ok(datetime.and_utc());
            }
            if let Ok(date) = text.parse::<NaiveDate>() {
                return Ok(date.and_time(NaiveTime::MIN).and_utc());
            }
            Err(TimeError::Format(text.to_string()))
        }
    }
}

fn is_naive(text: &str) -> bool {
    text.parse::<NaiveDateTime>().is_ok() || text.parse::<NaiveDate>().is_ok()
}
