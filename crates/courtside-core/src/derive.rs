// Derive stage: turns a loaded snapshot into display-ready table rows.
//
// Pure and synchronous. Order: rank select -> team filter -> dedup ->
// header -> one distribution summary per row.

use crate::dedup::{dedup_by_name, select_rank_rows};
use crate::distribution::{summarize, DistributionError, DistributionSummary, StripLayout};
use crate::filter::{build_header, TeamFilter};
use crate::stat::{DataSnapshot, StatRow};
use tracing::{info, warn};

/// A displayed rank row and its distribution strip.
#[derive(Debug, Clone)]
pub struct DerivedRow {
    pub row: StatRow,
    /// A missing base stat leaves a gap in this row only.
    pub strip: Result<DistributionSummary, DistributionError>,
}

/// Header and rows ready for the presentation layer.
#[derive(Debug, Clone)]
pub struct StatTable {
    pub header: Vec<String>,
    pub rows: Vec<DerivedRow>,
}

impl StatTable {
    /// Rows whose strip could not be built.
    pub fn missing_strips(&self) -> usize {
        self.rows.iter().filter(|r| r.strip.is_err()).count()
    }
}

/// Build the display table from a snapshot.
pub fn derive(snapshot: &DataSnapshot, filter: &TeamFilter, layout: &StripLayout) -> StatTable {
    if filter.is_active() {
        filter.warn_unknown(&snapshot.teams);
    }

    let selected: Vec<StatRow> = select_rank_rows(&snapshot.stats)
        .into_iter()
        .map(|row| filter.apply(row))
        .collect();
    let rows = dedup_by_name(selected);
    let header = build_header(&rows, filter);

    let rows: Vec<DerivedRow> = rows
        .into_iter()
        .map(|row| {
            let strip = summarize(&row, &snapshot.stats, layout);
            if let Err(e) = &strip {
                warn!("skipping distribution for '{}': {}", row.name, e);
            }
            DerivedRow { row, strip }
        })
        .collect();

    let table = StatTable { header, rows };
    info!(
        "derived {} rank rows ({} columns, {} without distribution)",
        table.rows.len(),
        table.header.len(),
        table.missing_strips()
    );
    table
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
