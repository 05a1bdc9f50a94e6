//! Error taxonomy.
//!
//! Document validation reports *every* violation found in one pass as a
//! [`ValidationErrors`] aggregate, so a CI run can annotate all problems at
//! once. Lookups target a single entity and fail individually with a
//! [`LookupError`].

use std::fmt::{self, Display, Formatter};

use chrono::NaiveDate;

use crate::rates::RateType;

/// A date or time string that violates the normalization contract.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum TimeError {
    #[error("{0:?} is not a valid date or time")]
    Format(String),

    #[error("timezone information required: {0:?}")]
    Naive(String),

    #[error("non-UTC timezone in {0:?}: please convert to UTC")]
    NonUtc(String),
}

/// One kind of document-validation violation.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ValidationErrorKind {
    #[error(transparent)]
    Time(#[from] TimeError),

    #[error("`until` ({until}) must be after `from` ({from})")]
    InvalidRange { from: String, until: String },

    #[error("date ranges overlap: {previous} and {next}")]
    Overlap { previous: String, next: String },

    #[error("found duplicate name {0:?} in list")]
    DuplicateName(String),

    #[error("found duplicate url {0:?} in outages list")]
    DuplicateUrl(String),

    #[error("duplicate affected service {0:?}")]
    DuplicateService(String),

    #[error("value {value:?} is not a valid {expected}")]
    TypeMismatch { value: String, expected: RateType },
}

/// A single violation, located by its field path in the source document.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{location}: {kind}")]
pub struct Violation {
    pub location: String,
    pub kind: ValidationErrorKind,
}

impl Violation {
    pub fn new(location: impl Into<String>, kind: impl Into<ValidationErrorKind>) -> Self {
        Self { location: location.into(), kind: kind.into() }
    }
}

/// Every violation found while validating one document.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValidationErrors(pub Vec<Violation>);

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} validation error(s):", self.0.len())?;
        for violation in &self.0 {
            writeln!(f, "  - {violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// A failed per-entity lookup. Never aggregated.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum LookupError {
    #[error("rate {0:?} not found")]
    NotFound(String),

    #[error("no value for {name:?} at {date}")]
    NoValueAtDate { name: String, date: NaiveDate },

    #[error("rate {name:?} is declared as {declared}, but {requested} was requested")]
    TypeMismatch { name: String, declared: RateType, requested: RateType },

    /// Unreachable for a registry that passed validation.
    #[error("stored value {value:?} of rate {name:?} does not parse as {declared}")]
    InvalidValue { name: String, value: String, declared: RateType },

    #[error(transparent)]
    Time(#[from] TimeError),
}

/// Fetching, parsing, or validating a document failed.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to fetch the document")]
    Fetch(#[from] ureq::Error),

    #[error("failed to read the document")]
    Io(#[from] std::io::Error),

    #[error("failed to parse the document")]
    Parse(#[from] serde_yaml::Error),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),
}
