// Domain types: team metadata, stat rows, and the loaded data snapshot.

use crate::record::{Cell, Record};
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

/// Field holding the stat identifier in the combined stats file.
pub const NAME_FIELD: &str = "name";
/// Field holding the stat category in the combined stats file.
pub const TYPE_FIELD: &str = "type";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum RowError {
    #[error("row is missing text field `{0}`")]
    MissingField(&'static str),
}

#[derive(Debug, Error, PartialEq)]
pub enum TeamError {
    #[error("duplicate team abbreviation `{0}`")]
    DuplicateTeam(String),

    #[error("team record has an empty abbreviation")]
    EmptyAbbr,
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

/// Metadata for one team, as found in the teams JSON file.
///
/// Only `abbr` is required. Everything else is kept in `extra` so nothing
/// from the source file is silently lost.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TeamRecord {
    pub abbr: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Team records keyed by abbreviation, in source order.
#[derive(Debug, Clone, Default)]
pub struct TeamDirectory {
    teams: Vec<TeamRecord>,
    index: HashMap<String, usize>,
}

impl TeamDirectory {
    /// Build a directory, rejecting blank or repeated abbreviations.
    pub fn new(records: Vec<TeamRecord>) -> Result<Self, TeamError> {
        let mut index = HashMap::with_capacity(records.len());
        let mut teams = Vec::with_capacity(records.len());
        for mut team in records {
            team.abbr = team.abbr.trim().to_string();
            if team.abbr.is_empty() {
                return Err(TeamError::EmptyAbbr);
            }
            if index.contains_key(&team.abbr) {
                return Err(TeamError::DuplicateTeam(team.abbr));
            }
            index.insert(team.abbr.clone(), teams.len());
            teams.push(team);
        }
        Ok(Self { teams, index })
    }

    pub fn get(&self, abbr: &str) -> Option<&TeamRecord> {
        self.index.get(abbr).map(|&i| &self.teams[i])
    }

    pub fn contains(&self, abbr: &str) -> bool {
        self.index.contains_key(abbr)
    }

    /// Abbreviations in source order.
    pub fn abbrs(&self) -> impl Iterator<Item = &str> {
        self.teams.iter().map(|t| t.abbr.as_str())
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Stat rows
// ---------------------------------------------------------------------------

/// One statistic across all teams.
#[derive(Debug, Clone, PartialEq)]
pub struct StatRow {
    pub name: String,
    /// Category such as `Offense` or `Defense` (the `type` column).
    pub category: String,
    /// Per-team cells keyed by abbreviation, in source column order.
    pub teams: Record,
}

impl StatRow {
    /// Split a normalized record into the identifying fields and team cells.
    ///
    /// `name` and `type` must be text; a purely numeric stat name is not a
    /// valid identifier.
    pub fn from_record(mut record: Record) -> Result<Self, RowError> {
        let name = take_text(&mut record, NAME_FIELD)?;
        let category = take_text(&mut record, TYPE_FIELD)?;
        Ok(Self {
            name,
            category,
            teams: record,
        })
    }

    /// All keys in display order: `name`, `type`, then team abbreviations.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        [NAME_FIELD, TYPE_FIELD].into_iter().chain(self.teams.keys())
    }

    /// Numeric team values in column order. Text cells are skipped.
    pub fn numeric_values(&self) -> impl Iterator<Item = (&str, f64)> {
        self.teams
            .iter()
            .filter_map(|(k, v)| v.as_number().map(|n| (k, n)))
    }
}

fn take_text(record: &mut Record, field: &'static str) -> Result<String, RowError> {
    match record.take(field) {
        Some(Cell::Text(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(RowError::MissingField(field)),
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Both input datasets, loaded once and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct DataSnapshot {
    pub teams: TeamDirectory,
    /// Every stat row from the combined file, in file order, including
    /// duplicates and base (non-rank) stats.
    pub stats: Vec<StatRow>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::normalize_row;

    fn team(abbr: &str) -> TeamRecord {
        TeamRecord {
            abbr: abbr.into(),
            name: None,
            extra: HashMap::new(),
        }
    }

    #[test]
    fn team_json_keeps_extra_fields() {
        let json = r#"[{"abbr":"BOS","name":"Boston Celtics","conf":"East","id":1610612738}]"#;
        let teams: Vec<TeamRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(teams[0].abbr, "BOS");
        assert_eq!(teams[0].name.as_deref(), Some("Boston Celtics"));
        assert_eq!(teams[0].extra["conf"], serde_json::json!("East"));
        assert_eq!(teams[0].extra["id"], serde_json::json!(1610612738));
    }

    #[test]
    fn directory_rejects_duplicate_abbr() {
        let err = TeamDirectory::new(vec![team("BOS"), team("LAL"), team("BOS")]).unwrap_err();
        assert_eq!(err, TeamError::DuplicateTeam("BOS".into()));
    }

    #[test]
    fn directory_rejects_blank_abbr() {
        let err = TeamDirectory::new(vec![team("  ")]).unwrap_err();
        assert_eq!(err, TeamError::EmptyAbbr);
    }

    #[test]
    fn directory_lookup_and_order() {
        let dir = TeamDirectory::new(vec![team("LAL"), team(" BOS ")]).unwrap();
        assert_eq!(dir.len(), 2);
        assert!(dir.contains("BOS"));
        assert_eq!(dir.get("LAL").map(|t| t.abbr.as_str()), Some("LAL"));
        let abbrs: Vec<&str> = dir.abbrs().collect();
        assert_eq!(abbrs, vec!["LAL", "BOS"]);
    }

    #[test]
    fn stat_row_from_record() {
        let record = normalize_row(vec![
            ("name", "PTS_RANK"),
            ("type", "Offense"),
            ("BOS", "1"),
            ("LAL", "15"),
        ]);
        let row = StatRow::from_record(record).unwrap();
        assert_eq!(row.name, "PTS_RANK");
        assert_eq!(row.category, "Offense");
        let keys: Vec<&str> = row.keys().collect();
        assert_eq!(keys, vec!["name", "type", "BOS", "LAL"]);
    }

    #[test]
    fn stat_row_requires_text_name() {
        let record = normalize_row(vec![("name", "12"), ("type", "Offense")]);
        assert_eq!(
            StatRow::from_record(record),
            Err(RowError::MissingField("name"))
        );

        let record = normalize_row(vec![("name", "PTS")]);
        assert_eq!(
            StatRow::from_record(record),
            Err(RowError::MissingField("type"))
        );
    }

    #[test]
    fn numeric_values_skip_text_cells() {
        let record = normalize_row(vec![
            ("name", "PTS"),
            ("type", "Offense"),
            ("BOS", "110.5"),
            ("LAL", "n/a"),
            ("NYK", "101"),
        ]);
        let row = StatRow::from_record(record).unwrap();
        let values: Vec<(&str, f64)> = row.numeric_values().collect();
        assert_eq!(values, vec![("BOS", 110.5), ("NYK", 101.0)]);
    }
}
