//! Outage registry: URL-identified events, each with one or more timeframes
//! tagging the services they affect.
//!
//! Instants are ingested under the strict UTC policy of
//! [`crate::temporal::parse_instant`]. Overlap queries use an open-interval
//! test: an outage ending exactly when the query window starts (or starting
//! exactly when it ends) does not match. Matched timeframes are clipped to
//! the query window.

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::Deserialize;

use crate::{
    error::{TimeError, ValidationErrorKind, ValidationErrors, Violation},
    temporal::{self, InstantInput},
};

/// One raw timeframe as it appears in the document.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeframeRecord {
    pub from: String,
    pub until: Option<String>,
    pub affected_services: Vec<String>,
}

/// One raw outage as it appears in the document.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutageRecord {
    pub url: String,
    pub timeframes: Vec<TimeframeRecord>,
}

/// A validated timeframe. An absent `time_until` means the outage is
/// ongoing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OutageTimeframe {
    pub time_from: DateTime<Utc>,
    pub time_until: Option<DateTime<Utc>>,
    pub affected_services: Vec<String>,
}

impl OutageTimeframe {
    fn effective_end(&self) -> DateTime<Utc> {
        self.time_until.unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// A validated outage event, identified by its URL.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OutageEvent {
    pub url: String,
    pub timeframes: Vec<OutageTimeframe>,
}

/// All outages of one validated document, in document order. Immutable once
/// built.
#[derive(Clone, Debug, Default)]
pub struct OutageRegistry {
    events: Vec<OutageEvent>,
}

impl OutageRegistry {
    /// Validate a raw outages document, reporting every violation found.
    pub fn from_document(records: Vec<OutageRecord>) -> Result<Self, ValidationErrors> {
        let mut violations = Vec::new();
        let mut events: Vec<OutageEvent> = Vec::new();
        for (index, record) in records.into_iter().enumerate() {
            let location = format!("outages[{index}]");
            if events.iter().any(|event| event.url == record.url) {
                violations.push(Violation::new(
                    format!("{location}.url"),
                    ValidationErrorKind::DuplicateUrl(record.url),
                ));
                continue;
            }
            let mut timeframes = Vec::new();
            for (index, timeframe) in record.timeframes.into_iter().enumerate() {
                let location = format!("{location}.timeframes[{index}]");
                let duplicate_services: Vec<String> =
                    timeframe.affected_services.iter().duplicates().cloned().collect();
                for service in duplicate_services {
                    violations.push(Violation::new(
                        format!("{location}.affected_services"),
                        ValidationErrorKind::DuplicateService(service),
                    ));
                }
                let time_from = match temporal::parse_instant(timeframe.from.as_str().into()) {
                    Ok(instant) => instant,
                    Err(error) => {
                        violations.push(Violation::new(format!("{location}.from"), error));
                        continue;
                    }
                };
                let time_until = match timeframe.until {
                    None => None,
                    Some(text) => match temporal::parse_instant(text.as_str().into()) {
                        Ok(instant) => Some(instant),
                        Err(error) => {
                            violations.push(Violation::new(format!("{location}.until"), error));
                            continue;
                        }
                    },
                };
                if let Some(until) = time_until {
                    // Unlike rate histories, a zero-length timeframe is fine.
                    if until < time_from {
                        violations.push(Violation::new(
                            location,
                            ValidationErrorKind::InvalidRange {
                                from: time_from.to_rfc3339(),
                                until: until.to_rfc3339(),
                            },
                        ));
                        continue;
                    }
                }
                timeframes.push(OutageTimeframe {
                    time_from,
                    time_until,
                    affected_services: timeframe.affected_services,
                });
            }
            events.push(OutageEvent { url: record.url, timeframes });
        }
        if violations.is_empty() { Ok(Self { events }) } else { Err(ValidationErrors(violations)) }
    }

    #[must_use]
    pub fn events(&self) -> &[OutageEvent] {
        &self.events
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Collect the timeframes affecting a service that overlap the query
    /// window, clipped to it.
    ///
    /// Results keep storage order (event order, then timeframe order within
    /// the event). No match is never an error: the result is just empty.
    pub fn get_outages_during<'a>(
        &self,
        start: impl Into<InstantInput<'a>>,
        end: impl Into<InstantInput<'a>>,
        service: &str,
    ) -> Result<Vec<(DateTime<Utc>, DateTime<Utc>)>, TimeError> {
        let start = temporal::parse_query_instant(start.into())?;
        let end = temporal::parse_query_instant(end.into())?;
        let mut clipped = Vec::new();
        for event in &self.events {
            for timeframe in &event.timeframes {
                if !timeframe.affected_services.iter().any(|affected| affected == service) {
                    continue;
                }
                let until = timeframe.effective_end();
                if timeframe.time_from < end && until > start {
                    clipped.push((start.max(timeframe.time_from), end.min(until)));
                }
            }
        }
        Ok(clipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(document: &str) -> Result<OutageRegistry, ValidationErrors> {
        let records: Vec<OutageRecord> = serde_yaml::from_str(document).unwrap();
        OutageRegistry::from_document(records)
    }

    fn utc(text: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(text).unwrap().with_timezone(&Utc)
    }

    const SHUTDOWN_2024: &str = r#"
- url: https://nerc.mghpcc.org/event/mghpcc-annual-power-shutdown-2024/
  timeframes:
    - from: "2024-05-22T08:00:00Z"
      until: "2024-05-28T23:00:00Z"
      affected_services:
        - NERC OpenStack
        - NERC OpenShift
"#;

    #[test]
    fn test_window_containing_the_outage() -> crate::prelude::Result {
        let registry = registry(SHUTDOWN_2024)?;
        assert_eq!(
            registry.get_outages_during("2024-05-01", "2024-06-01", "NERC OpenStack")?,
            vec![(utc("2024-05-22T08:00:00Z"), utc("2024-05-28T23:00:00Z"))],
        );
        Ok(())
    }

    #[test]
    fn test_overlap_is_clipped_to_the_window() -> crate::prelude::Result {
        let registry = registry(SHUTDOWN_2024)?;
        assert_eq!(
            registry.get_outages_during("2024-05-25", "2024-06-01", "NERC OpenStack")?,
            vec![(utc("2024-05-25T00:00:00Z"), utc("2024-05-28T23:00:00Z"))],
        );
        assert_eq!(
            registry.get_outages_during("2024-05-01", "2024-05-23", "NERC OpenStack")?,
            vec![(utc("2024-05-22T08:00:00Z"), utc("2024-05-23T00:00:00Z"))],
        );
        Ok(())
    }

    #[test]
    fn test_boundary_touch_does_not_overlap() -> crate::prelude::Result {
        let registry = registry(SHUTDOWN_2024)?;
        // Window ending exactly at the outage start, and starting exactly at
        // the outage end.
        assert!(
            registry
                .get_outages_during("2024-05-01", "2024-05-22T08:00:00Z", "NERC OpenStack")?
                .is_empty()
        );
        assert!(
            registry
                .get_outages_during("2024-05-28T23:00:00Z", "2024-06-15", "NERC OpenStack")?
                .is_empty()
        );
        Ok(())
    }

    #[test]
    fn test_unaffected_service_does_not_match() -> crate::prelude::Result {
        let registry = registry(SHUTDOWN_2024)?;
        assert!(
            registry.get_outages_during("2024-05-01", "2024-06-01", "NERC Storage")?.is_empty()
        );
        Ok(())
    }

    #[test]
    fn test_ongoing_outage_is_clipped_to_the_window_end() -> crate::prelude::Result {
        let registry = registry(
            r#"
- url: https://nerc.mghpcc.org/event/ongoing/
  timeframes:
    - from: "2024-05-22T08:00:00Z"
      affected_services:
        - NERC OpenStack
"#,
        )?;
        assert_eq!(
            registry.get_outages_during("2024-05-01", "2024-06-01", "NERC OpenStack")?,
            vec![(utc("2024-05-22T08:00:00Z"), utc("2024-06-01T00:00:00Z"))],
        );
        Ok(())
    }

    #[test]
    fn test_results_keep_storage_order() -> crate::prelude::Result {
        let registry = registry(
            r#"
- url: https://nerc.mghpcc.org/event/second-week/
  timeframes:
    - from: "2024-06-10T00:00:00Z"
      until: "2024-06-11T00:00:00Z"
      affected_services: [NERC OpenStack]
    - from: "2024-06-12T00:00:00Z"
      until: "2024-06-13T00:00:00Z"
      affected_services: [NERC OpenStack]
- url: https://nerc.mghpcc.org/event/first-week/
  timeframes:
    - from: "2024-06-03T00:00:00Z"
      until: "2024-06-04T00:00:00Z"
      affected_services: [NERC OpenStack]
"#,
        )?;
        assert_eq!(
            registry.get_outages_during("2024-06-01", "2024-07-01", "NERC OpenStack")?,
            vec![
                (utc("2024-06-10T00:00:00Z"), utc("2024-06-11T00:00:00Z")),
                (utc("2024-06-12T00:00:00Z"), utc("2024-06-13T00:00:00Z")),
                (utc("2024-06-03T00:00:00Z"), utc("2024-06-04T00:00:00Z")),
            ],
        );
        Ok(())
    }

    #[test]
    fn test_empty_registry_yields_empty_results() -> crate::prelude::Result {
        let registry = OutageRegistry::from_document(Vec::new())?;
        assert!(
            registry.get_outages_during("2024-05-01", "2024-06-01", "NERC OpenStack")?.is_empty()
        );
        Ok(())
    }

    #[test]
    fn test_duplicate_urls_are_rejected() {
        let error = registry(
            r#"
- url: https://nerc.mghpcc.org/event/a/
  timeframes: []
- url: https://nerc.mghpcc.org/event/a/
  timeframes: []
"#,
        )
        .unwrap_err();
        assert_eq!(
            error.0,
            vec![Violation::new(
                "outages[1].url",
                ValidationErrorKind::DuplicateUrl("https://nerc.mghpcc.org/event/a/".to_string()),
            )],
        );
    }

    #[test]
    fn test_duplicate_affected_services_are_rejected() {
        let error = registry(
            r#"
- url: https://nerc.mghpcc.org/event/a/
  timeframes:
    - from: "2024-05-22T08:00:00Z"
      affected_services:
        - NERC OpenStack
        - NERC OpenShift
        - NERC OpenStack
"#,
        )
        .unwrap_err();
        assert_eq!(
            error.0,
            vec![Violation::new(
                "outages[0].timeframes[0].affected_services",
                ValidationErrorKind::DuplicateService("NERC OpenStack".to_string()),
            )],
        );
    }

    #[test]
    fn test_non_utc_offset_is_rejected() {
        let error = registry(
            r#"
- url: https://nerc.mghpcc.org/event/a/
  timeframes:
    - from: "2024-05-22T08:00:00-04:00"
      affected_services: [NERC OpenStack]
"#,
        )
        .unwrap_err();
        assert!(matches!(
            error.0[0].kind,
            ValidationErrorKind::Time(TimeError::NonUtc(_)),
        ));
    }

    #[test]
    fn test_naive_instant_is_rejected() {
        let error = registry(
            r#"
- url: https://nerc.mghpcc.org/event/a/
  timeframes:
    - from: "2024-05-22T08:00:00"
      affected_services: [NERC OpenStack]
"#,
        )
        .unwrap_err();
        assert!(matches!(error.0[0].kind, ValidationErrorKind::Time(TimeError::Naive(_))));
    }

    #[test]
    fn test_until_before_from_is_rejected() {
        let error = registry(
            r#"
- url: https://nerc.mghpcc.org/event/a/
  timeframes:
    - from: "2024-05-22T08:00:00Z"
      until: "2024-05-22T07:59:59Z"
      affected_services: [NERC OpenStack]
"#,
        )
        .unwrap_err();
        assert!(matches!(error.0[0].kind, ValidationErrorKind::InvalidRange { .. }));
    }

    #[test]
    fn test_zero_length_timeframe_is_allowed() -> crate::prelude::Result {
        let registry = registry(
            r#"
- url: https://nerc.mghpcc.org/event/a/
  timeframes:
    - from: "2024-05-22T08:00:00Z"
      until: "2024-05-22T08:00:00Z"
      affected_services: [NERC OpenStack]
"#,
        )?;
        assert_eq!(registry.len(), 1);
        Ok(())
    }

    #[test]
    fn test_every_violation_is_reported_in_one_pass() {
        let error = registry(
            r#"
- url: https://nerc.mghpcc.org/event/a/
  timeframes:
    - from: "2024-05-22T08:00:00"
      affected_services: [NERC OpenStack]
- url: https://nerc.mghpcc.org/event/a/
  timeframes: []
"#,
        )
        .unwrap_err();
        let locations: Vec<&str> =
            error.0.iter().map(|violation| violation.location.as_str()).collect();
        assert_eq!(locations, vec!["outages[0].timeframes[0].from", "outages[1].url"]);
    }
}
