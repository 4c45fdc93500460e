//! Process filter validation.
//!
//! The log service filters server-side; checking the expression locally
//! against the live process list only exists to give a fast, friendly error
//! before the first network round trip.

use crate::api::LogsApi;
use crate::error::{LogsError, Result};

/// Separator between filter terms (`web|worker`).
pub const TERM_SEPARATOR: char = '|';

/// A non-empty `|`-separated list of process selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessFilter {
    terms: Vec<String>,
}

impl ProcessFilter {
    /// Split a raw expression into terms. The empty string means "no filter".
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        Some(Self {
            terms: raw.split(TERM_SEPARATOR).map(str::to_string).collect(),
        })
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Check every term against the known process types.
    ///
    /// Fails on the first term that matches none of them.
    pub fn validate(&self, topology: &[String]) -> Result<()> {
        match self
            .terms
            .iter()
            .find(|term| !topology.iter().any(|name| term_matches(term, name)))
        {
            Some(term) => Err(LogsError::InvalidFilter { term: term.clone() }),
            None => Ok(()),
        }
    }
}

/// `web` selects every web container, `web-1` selects one instance.
pub fn term_matches(term: &str, process_type: &str) -> bool {
    match term.strip_prefix(process_type) {
        Some("") => true,
        Some(rest) => rest.starts_with('-'),
        None => false,
    }
}

/// Validate `filter` against the application's current process types.
///
/// No request is made for an empty filter.
pub fn check_filter<A: LogsApi + ?Sized>(api: &A, app: &str, filter: &str) -> Result<()> {
    let Some(filter) = ProcessFilter::parse(filter) else {
        return Ok(());
    };
    let topology = api.list_process_types(app)?;
    tracing::debug!(app, ?topology, "validating process filter");
    filter.validate(&topology)
}
