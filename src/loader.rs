//! Generic validated-document loading.
//!
//! One [`Loader`] per dataset, configured with the registry type it targets
//! plus its default remote and local sources. Fetching and YAML parsing are
//! plain plumbing; all domain rules live in the registries' `from_document`.

use std::{marker::PhantomData, path::Path};

use serde::de::DeserializeOwned;

use crate::{
    error::{LoadError, ValidationErrors},
    outages::{OutageRecord, OutageRegistry},
    prelude::*,
    rates::{RateRecord, RateRegistry},
};

pub const DEFAULT_RATES_URL: &str =
    "https://raw.githubusercontent.com/CCI-MOC/nerc-rates/main/rates.yaml";
pub const DEFAULT_RATES_FILE: &str = "rates.yaml";
pub const DEFAULT_OUTAGES_URL: &str =
    "https://raw.githubusercontent.com/CCI-MOC/nerc-outages/main/outages.yaml";
pub const DEFAULT_OUTAGES_FILE: &str = "outages.yaml";

/// The rates dataset.
pub const RATES: Loader<RateRegistry> = Loader::new(DEFAULT_RATES_URL, DEFAULT_RATES_FILE);

/// The outages dataset.
pub const OUTAGES: Loader<OutageRegistry> = Loader::new(DEFAULT_OUTAGES_URL, DEFAULT_OUTAGES_FILE);

/// A registry buildable from a parsed document.
pub trait Document: Sized {
    type Record: DeserializeOwned;

    fn from_document(records: Vec<Self::Record>) -> Result<Self, ValidationErrors>;
}

impl Document for RateRegistry {
    type Record = RateRecord;

    fn from_document(records: Vec<Self::Record>) -> Result<Self, ValidationErrors> {
        RateRegistry::from_document(records)
    }
}

impl Document for OutageRegistry {
    type Record = OutageRecord;

    fn from_document(records: Vec<Self::Record>) -> Result<Self, ValidationErrors> {
        OutageRegistry::from_document(records)
    }
}

/// Loads and validates documents for one registry type, with injected
/// default remote and local sources.
pub struct Loader<T> {
    pub default_url: &'static str,
    pub default_file: &'static str,
    target: PhantomData<T>,
}

impl<T: Document> Loader<T> {
    #[must_use]
    pub const fn new(default_url: &'static str, default_file: &'static str) -> Self {
        Self { default_url, default_file, target: PhantomData }
    }

    /// Fetch, parse, and validate a document from a URL, defaulting to the
    /// configured one.
    pub fn load_from_url(&self, url: Option<&str>) -> Result<T, LoadError> {
        let url = url.unwrap_or(self.default_url);
        debug!(url, "fetching document");
        let mut response = ureq::get(url).call()?;
        let body = response.body_mut().read_to_string()?;
        self.parse(&body)
    }

    /// Read, parse, and validate a document from a local file, defaulting to
    /// the configured one.
    pub fn load_from_file(&self, path: Option<&Path>) -> Result<T, LoadError> {
        let path = path.unwrap_or_else(|| Path::new(self.default_file));
        debug!(path = %path.display(), "reading document");
        let body = std::fs::read_to_string(path)?;
        self.parse(&body)
    }

    /// Parse and validate an already-fetched document.
    pub fn parse(&self, body: &str) -> Result<T, LoadError> {
        let records: Vec<T::Record> = serde_yaml::from_str(body)?;
        Ok(T::from_document(records)?)
    }
}
