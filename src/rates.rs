//! Rate registry: named, typed billing parameters whose values change over
//! time.
//!
//! Each rate carries an ordered history of string-encoded values, each
//! effective from its `from` month through its `until` month, with an absent
//! `until` meaning "no expiration". Validation proves the timeline free of
//! overlaps and every value representable as the declared type; lookups then
//! resolve the value effective at a given month.

use std::{collections::BTreeMap, str::FromStr};

use chrono::NaiveDate;
use itertools::Itertools;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    error::{LookupError, ValidationErrorKind, ValidationErrors, Violation},
    temporal::{self, DateInput},
};

/// Supported data types for rate values.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, derive_more::Display)]
pub enum RateType {
    #[serde(rename = "str")]
    #[display("str")]
    Str,

    #[serde(rename = "Decimal")]
    #[display("Decimal")]
    Decimal,

    #[serde(rename = "bool")]
    #[display("bool")]
    Bool,
}

impl RateType {
    /// Check that a raw value is representable as this type.
    ///
    /// Boolean values must literally be `"true"` or `"false"` (any casing),
    /// which is narrower than what [`RateRegistry::get_value_at`] accepts on
    /// the read side.
    fn check(self, value: &str) -> Result<(), ValidationErrorKind> {
        let ok = match self {
            Self::Str => true,
            Self::Decimal => Decimal::from_str(value).is_ok(),
            Self::Bool => matches!(value.to_lowercase().as_str(), "true" | "false"),
        };
        if ok {
            Ok(())
        } else {
            Err(ValidationErrorKind::TypeMismatch { value: value.to_string(), expected: self })
        }
    }
}

/// A rate value converted to its declared type.
#[derive(Clone, Debug, Eq, PartialEq, derive_more::Display)]
pub enum RateValue {
    #[display("{_0}")]
    Str(String),

    #[display("{_0}")]
    Decimal(Decimal),

    #[display("{_0}")]
    Bool(bool),
}

/// One raw `history` entry as it appears in the document.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryRecord {
    pub value: String,
    pub from: String,
    pub until: Option<String>,
}

/// One raw rate item as it appears in the document.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateRecord {
    pub name: String,

    #[serde(rename = "type")]
    pub declared_type: RateType,

    pub history: Vec<HistoryRecord>,
}

/// A validated history entry. The value stays string-encoded; conversion
/// happens per lookup.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RateHistoryEntry {
    pub value: String,
    pub date_from: NaiveDate,
    pub date_until: Option<NaiveDate>,
}

impl RateHistoryEntry {
    /// Closed containment: `from <= date <= until`. With an absent `until`
    /// the upper bound collapses to the queried date itself, so any date on
    /// or after `from` matches.
    fn contains(&self, date: NaiveDate) -> bool {
        self.date_from <= date && date <= self.date_until.unwrap_or(date)
    }

    fn effective_end(&self) -> NaiveDate {
        self.date_until.unwrap_or(NaiveDate::MAX)
    }

    fn range(&self) -> String {
        match self.date_until {
            Some(until) => format!("[{}, {until}]", self.date_from),
            None => format!("[{}, open]", self.date_from),
        }
    }
}

/// A named rate with its validated history, in document order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RateSeries {
    pub name: String,
    pub declared_type: RateType,
    pub history: Vec<RateHistoryEntry>,
}

/// All rates of one validated document, keyed by name. Immutable once built.
#[derive(Clone, Debug, Default)]
pub struct RateRegistry {
    items: BTreeMap<String, RateSeries>,
}

impl RateRegistry {
    /// Validate a raw rates document.
    ///
    /// Every violation found in the document is reported, not just the first
    /// one: a duplicate name or an unparseable date is recorded and the scan
    /// continues.
    pub fn from_document(records: Vec<RateRecord>) -> Result<Self, ValidationErrors> {
        let mut violations = Vec::new();
        let mut items = BTreeMap::new();
        for (index, record) in records.into_iter().enumerate() {
            let location = format!("rates[{index}]");
            if items.contains_key(&record.name) {
                violations.push(Violation::new(
                    format!("{location}.name"),
                    ValidationErrorKind::DuplicateName(record.name),
                ));
                continue;
            }
            let series = validate_series(record, &location, &mut violations);
            items.insert(series.name.clone(), series);
        }
        if violations.is_empty() { Ok(Self { items }) } else { Err(ValidationErrors(violations)) }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RateSeries> {
        self.items.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Resolve the value of a rate effective at the given month.
    ///
    /// The requested type must equal the declared type of the series; the
    /// matched value is then converted (`bool` reads accept `"true"` and
    /// `"1"`).
    pub fn get_value_at<'a>(
        &self,
        name: &str,
        date: impl Into<DateInput<'a>>,
        requested: RateType,
    ) -> Result<RateValue, LookupError> {
        let series =
            self.items.get(name).ok_or_else(|| LookupError::NotFound(name.to_string()))?;
        let date = temporal::parse_month_date(date.into())?;
        let entry = series
            .history
            .iter()
            .find(|entry| entry.contains(date))
            .ok_or_else(|| LookupError::NoValueAtDate { name: name.to_string(), date })?;
        if requested != series.declared_type {
            return Err(LookupError::TypeMismatch {
                name: name.to_string(),
                declared: series.declared_type,
                requested,
            });
        }
        match series.declared_type {
            RateType::Str => Ok(RateValue::Str(entry.value.clone())),
            RateType::Bool => {
                Ok(RateValue::Bool(matches!(entry.value.to_lowercase().as_str(), "true" | "1")))
            }
            RateType::Decimal => {
                Decimal::from_str(&entry.value).map(RateValue::Decimal).map_err(|_| {
                    LookupError::InvalidValue {
                        name: name.to_string(),
                        value: entry.value.clone(),
                        declared: RateType::Decimal,
                    }
                })
            }
        }
    }
}

fn validate_series(
    record: RateRecord,
    location: &str,
    violations: &mut Vec<Violation>,
) -> RateSeries {
    let mut history = Vec::new();
    for (index, entry) in record.history.into_iter().enumerate() {
        let location = format!("{location}.history[{index}]");
        if let Err(kind) = record.declared_type.check(&entry.value) {
            violations.push(Violation::new(format!("{location}.value"), kind));
        }
        let date_from = match temporal::parse_month_date(entry.from.as_str().into()) {
            Ok(date) => date,
            Err(error) => {
                violations.push(Violation::new(format!("{location}.from"), error));
                continue;
            }
        };
        let date_until = match entry.until {
            None => None,
            Some(text) => match temporal::parse_month_date(text.as_str().into()) {
                Ok(date) => Some(date),
                Err(error) => {
                    violations.push(Violation::new(format!("{location}.until"), error));
                    continue;
                }
            },
        };
        if let Some(until) = date_until {
            if until <= date_from {
                violations.push(Violation::new(
                    location,
                    ValidationErrorKind::InvalidRange {
                        from: date_from.to_string(),
                        until: until.to_string(),
                    },
                ));
                continue;
            }
        }
        history.push(RateHistoryEntry { value: entry.value, date_from, date_until });
    }

    // Closed-range comparison: an entry ending exactly when the next begins
    // counts as an overlap.
    for (previous, next) in history.iter().sorted_by_key(|entry| entry.date_from).tuple_windows()
    {
        if previous.effective_end() >= next.date_from {
            violations.push(Violation::new(
                format!("{location}.history"),
                ValidationErrorKind::Overlap { previous: previous.range(), next: next.range() },
            ));
        }
    }

    RateSeries { name: record.name, declared_type: record.declared_type, history }
}
