//! GitHub Actions workflow annotations.
//!
//! CI validates the datasets on every pull request; failures are surfaced as
//! `::error` annotations so they show up inline on the offending file.

use crate::error::LoadError;

/// Render one annotation line per problem in a failed load.
#[must_use]
pub fn annotations(file: &str, title: &str, error: &LoadError) -> Vec<String> {
    match error {
        LoadError::Validation(errors) => errors
            .0
            .iter()
            .map(|violation| {
                format!("::error file={file},title={title} validation error::{violation}")
            })
            .collect(),
        LoadError::Parse(error) => {
            let annotation = error.location().map_or_else(
                || format!("::error file={file},title={title} parser error::{error}"),
                |location| {
                    format!(
                        "::error file={file},line={line},title={title} parser error::{error}",
                        line = location.line(),
                    )
                },
            );
            vec![annotation]
        }
        error => vec![format!("::error file={file},title={title} error::{error}")],
    }
}
