// Team column filtering and header construction.

use crate::record::Record;
use crate::stat::{StatRow, TeamDirectory, NAME_FIELD, TYPE_FIELD};
use tracing::warn;

/// Synthetic trailing column holding each row's distribution strip.
pub const DISTRIBUTION_COLUMN: &str = "distribution";

/// The set of team abbreviations to display. Empty means "all teams".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamFilter {
    teams: Vec<String>,
}

impl TeamFilter {
    /// No filtering: every team column is shown.
    pub fn all() -> Self {
        Self::default()
    }

    /// Build a filter from a comma-separated parameter value such as
    /// `"BOS,LAL"`. Entries are trimmed; blanks and repeats are dropped.
    pub fn from_param(value: &str) -> Self {
        let mut teams: Vec<String> = Vec::new();
        for abbr in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if !teams.iter().any(|t| t == abbr) {
                teams.push(abbr.to_string());
            }
        }
        Self { teams }
    }

    pub fn is_active(&self) -> bool {
        !self.teams.is_empty()
    }

    /// Requested abbreviations, in request order.
    pub fn teams(&self) -> &[String] {
        &self.teams
    }

    /// Log requested abbreviations that the team metadata does not know.
    /// Unknown entries are kept; they simply match no column.
    pub fn warn_unknown(&self, directory: &TeamDirectory) {
        for abbr in self.teams.iter().filter(|a| !directory.contains(a)) {
            warn!("team filter: unknown team abbreviation '{}'", abbr);
        }
    }

    /// Reduce a row to `name`, `type`, and the teams in the filter. Kept
    /// columns stay in the row's own order. An inactive filter returns the
    /// row unchanged.
    pub fn apply(&self, row: StatRow) -> StatRow {
        if !self.is_active() {
            return row;
        }
        let StatRow {
            name,
            category,
            teams,
        } = row;
        let kept: Record = teams
            .into_iter()
            .filter(|(abbr, _)| self.teams.contains(abbr))
            .collect();
        StatRow {
            name,
            category,
            teams: kept,
        }
    }
}

/// Column headers for the displayed rows: the first row's keys followed by
/// the synthetic `distribution` column.
///
/// With no rows the header falls back to `name`, `type` and whatever teams
/// the filter requested.
pub fn build_header(rows: &[StatRow], filter: &TeamFilter) -> Vec<String> {
    let mut header: Vec<String> = match rows.first() {
        Some(first) => first.keys().map(str::to_string).collect(),
        None => [NAME_FIELD, TYPE_FIELD]
            .into_iter()
            .map(str::to_string)
            .chain(filter.teams().iter().cloned())
            .collect(),
    };
    header.push(DISTRIBUTION_COLUMN.to_string());
    header
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
