//! Validation and time-based lookups for the NERC rates and outages
//! datasets.
//!
//! Two small, human-maintained YAML documents are loaded once, validated as a
//! whole, and become immutable in-memory registries:
//!
//! - [`rates::RateRegistry`] — named, typed billing rates with
//!   non-overlapping effective-dated histories and point-in-time lookups.
//! - [`outages::OutageRegistry`] — URL-identified outage events with
//!   UTC timeframes and window-overlap lookups, clipped to the query window.

pub mod cli;
pub mod error;
pub mod github;
pub mod loader;
pub mod outages;
pub mod prelude;
pub mod rates;
pub mod temporal;

pub use crate::{
    error::{LoadError, LookupError, TimeError, ValidationErrorKind, ValidationErrors, Violation},
    loader::Loader,
    outages::{OutageEvent, OutageRegistry, OutageTimeframe},
    rates::{RateHistoryEntry, RateRegistry, RateSeries, RateType, RateValue},
};
