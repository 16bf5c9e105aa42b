// Load stage: fetch both data resources concurrently and parse them into an
// immutable snapshot.
//
// Teams come from a JSON array of objects keyed by `abbr`; stats come from a
// combined CSV with `name`, `type`, and one column per team.

use crate::config::DataPaths;
use async_trait::async_trait;
use courtside_core::record::normalize_row;
use courtside_core::stat::{DataSnapshot, StatRow, TeamDirectory, TeamError, TeamRecord};
use std::io::Read;
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {location}: {source}")]
    Io {
        location: String,
        source: std::io::Error,
    },

    #[error("request for {location} failed: {source}")]
    Http {
        location: String,
        source: reqwest::Error,
    },

    #[error("invalid team JSON in {location}: {source}")]
    Json {
        location: String,
        source: serde_json::Error,
    },

    #[error("CSV error in {location}: {source}")]
    Csv { location: String, source: csv::Error },

    #[error("bad team data in {location}: {source}")]
    Teams { location: String, source: TeamError },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Fetching
// ---------------------------------------------------------------------------

/// Source of raw resource bytes.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, LoadError>;
}

/// Reads `http://` and `https://` locations over the network and everything
/// else from the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct DefaultFetcher {
    client: reqwest::Client,
}

impl DefaultFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

fn is_http(location: &str) -> bool {
    let lower = location.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[async_trait]
impl ResourceFetcher for DefaultFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, LoadError> {
        if is_http(location) {
            debug!("fetching {} over HTTP", location);
            let http_err = |source: reqwest::Error| LoadError::Http {
                location: location.to_string(),
                source,
            };
            let response = self
                .client
                .get(location.trim())
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(http_err)?;
            let body = response.bytes().await.map_err(http_err)?;
            Ok(body.to_vec())
        } else {
            debug!("reading {} from disk", location);
            tokio::fs::read(location).await.map_err(|e| LoadError::Io {
                location: location.to_string(),
                source: e,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing (reader/slice based so tests need no files)
// ---------------------------------------------------------------------------

fn parse_teams(bytes: &[u8], location: &str) -> Result<TeamDirectory, LoadError> {
    let records: Vec<TeamRecord> =
        serde_json::from_slice(bytes).map_err(|e| LoadError::Json {
            location: location.to_string(),
            source: e,
        })?;
    TeamDirectory::new(records).map_err(|e| LoadError::Teams {
        location: location.to_string(),
        source: e,
    })
}

fn load_stats_from_reader<R: Read>(rdr: R) -> Result<Vec<StatRow>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(rdr);
    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();
    for result in reader.records() {
        match result {
            Ok(record) => {
                let normalized = normalize_row(headers.iter().zip(record.iter()));
                match StatRow::from_record(normalized) {
                    Ok(row) => rows.push(row),
                    Err(e) => warn!(
                        "skipping stat row at line {}: {}",
                        source_line(record.position()),
                        e
                    ),
                }
            }
            Err(e) => {
                warn!(
                    "skipping malformed stat row at line {}: {}",
                    source_line(e.position()),
                    e
                );
            }
        }
    }
    Ok(rows)
}

/// 1-based file line a record starts on, header included. 0 if unknown.
fn source_line(position: Option<&csv::Position>) -> u64 {
    position.map(|p| p.line()).unwrap_or(0)
}

fn parse_stats(bytes: &[u8], location: &str) -> Result<Vec<StatRow>, LoadError> {
    load_stats_from_reader(bytes).map_err(|e| LoadError::Csv {
        location: location.to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Public loader
// ---------------------------------------------------------------------------

/// Fetch both resources concurrently and build the snapshot. Any fetch or
/// parse failure aborts the whole load; nothing is retried.
pub async fn load_snapshot(
    fetcher: &dyn ResourceFetcher,
    paths: &DataPaths,
) -> Result<DataSnapshot, LoadError> {
    let (team_bytes, stat_bytes) =
        tokio::try_join!(fetcher.fetch(&paths.teams), fetcher.fetch(&paths.stats))?;

    let teams = parse_teams(&team_bytes, &paths.teams)?;
    let stats = parse_stats(&stat_bytes, &paths.stats)?;

    if teams.is_empty() {
        return Err(LoadError::Validation(format!(
            "team file {} contains no teams",
            paths.teams
        )));
    }
    if stats.is_empty() {
        return Err(LoadError::Validation(format!(
            "stats file {} produced zero valid rows",
            paths.stats
        )));
    }

    info!("loaded {} teams and {} stat rows", teams.len(), stats.len());
    Ok(DataSnapshot { teams, stats })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use courtside_core::record::Cell;
    use std::collections::HashMap;

    /// In-memory fetcher keyed by location.
    struct MemoryFetcher(HashMap<String, Vec<u8>>);

    impl MemoryFetcher {
        fn new(entries: &[(&str, &str)]) -> Self {
            Self(
                entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
                    .collect(),
            )
        }
    }

    #[async_trait]
    impl ResourceFetcher for MemoryFetcher {
        async fn fetch(&self, location: &str) -> Result<Vec<u8>, LoadError> {
            self.0.get(location).cloned().ok_or_else(|| LoadError::Io {
                location: location.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not in memory"),
            })
        }
    }

    const TEAMS: &str = r#"[{"abbr":"BOS","name":"Boston Celtics"},{"abbr":"LAL"}]"#;
    const STATS: &str = "\
name,type,BOS,LAL
PTS,Offense,110.5,98.2
PTS_RANK,Offense,1,15";

    fn paths() -> DataPaths {
        DataPaths {
            teams: "teams.json".into(),
            stats: "combined.csv".into(),
        }
    }

    // -- CSV parsing --

    #[test]
    fn stats_csv_normalizes_numbers() {
        let rows = load_stats_from_reader(STATS.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "PTS");
        assert_eq!(rows[0].category, "Offense");
        assert_eq!(rows[0].teams.get("BOS"), Some(&Cell::Numeric(110.5)));
        assert_eq!(rows[1].teams.get("LAL"), Some(&Cell::Numeric(15.0)));
    }

    #[test]
    fn header_whitespace_trimmed() {
        let csv_data = "name, type , BOS\nPTS,Offense,1";
        let rows = load_stats_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].teams.get("BOS"), Some(&Cell::Numeric(1.0)));
    }

    #[test]
    fn non_numeric_cells_kept_as_text() {
        let csv_data = "name,type,BOS,LAL\nPTS,Offense,-,98.2";
        let rows = load_stats_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(rows[0].teams.get("BOS"), Some(&Cell::Text("-".into())));
    }

    #[test]
    fn rows_without_name_or_type_skipped() {
        let csv_data = "\
name,type,BOS
PTS,Offense,1
,Offense,2
REB,,3
AST,Offense,4";
        let rows = load_stats_from_reader(csv_data.as_bytes()).unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["PTS", "AST"]);
    }

    #[test]
    fn ragged_rows_skipped() {
        let csv_data = "\
name,type,BOS,LAL
PTS,Offense,1,2
REB,Offense,3
AST,Offense,4,5";
        let rows = load_stats_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].name, "AST");
    }

    #[test]
    fn skipped_rows_report_file_line() {
        let csv_data = "name,type,BOS\nPTS,Offense,1\n,Offense,2\n";
        let mut reader = csv::Reader::from_reader(csv_data.as_bytes());
        let lines: Vec<u64> = reader
            .records()
            .map(|r| source_line(r.unwrap().position()))
            .collect();
        assert_eq!(lines, vec![2, 3]);
        assert_eq!(source_line(None), 0);
    }

    #[test]
    fn missing_type_column_yields_no_rows() {
        let csv_data = "name,BOS\nPTS,1";
        assert!(load_stats_from_reader(csv_data.as_bytes()).unwrap().is_empty());
    }

    // -- Team JSON parsing --

    #[test]
    fn teams_json_parsed() {
        let dir = parse_teams(TEAMS.as_bytes(), "teams.json").unwrap();
        assert_eq!(dir.len(), 2);
        assert_eq!(
            dir.get("BOS").and_then(|t| t.name.as_deref()),
            Some("Boston Celtics")
        );
    }

    #[test]
    fn teams_json_without_abbr_rejected() {
        let err = parse_teams(br#"[{"name":"Nobody"}]"#, "teams.json").unwrap_err();
        assert!(matches!(err, LoadError::Json { .. }), "got {err:?}");
    }

    #[test]
    fn duplicate_team_rejected() {
        let err = parse_teams(br#"[{"abbr":"BOS"},{"abbr":"BOS"}]"#, "teams.json").unwrap_err();
        assert!(
            matches!(err, LoadError::Teams { source: TeamError::DuplicateTeam(ref a), .. } if a == "BOS"),
            "got {err:?}"
        );
    }

    // -- Location routing --

    #[test]
    fn http_detection() {
        assert!(is_http("http://example.com/teams.json"));
        assert!(is_http("HTTPS://example.com/combined.csv"));
        assert!(!is_http("data/teams.json"));
        assert!(!is_http("/srv/http/teams.json"));
    }

    // -- Snapshot loading --

    #[tokio::test]
    async fn load_snapshot_joins_both_resources() {
        let fetcher = MemoryFetcher::new(&[("teams.json", TEAMS), ("combined.csv", STATS)]);
        let snapshot = load_snapshot(&fetcher, &paths()).await.unwrap();
        assert_eq!(snapshot.teams.len(), 2);
        assert_eq!(snapshot.stats.len(), 2);
    }

    #[tokio::test]
    async fn missing_resource_aborts_load() {
        let fetcher = MemoryFetcher::new(&[("teams.json", TEAMS)]);
        let err = load_snapshot(&fetcher, &paths()).await.unwrap_err();
        assert!(
            matches!(err, LoadError::Io { ref location, .. } if location == "combined.csv"),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn empty_stats_is_validation_error() {
        let fetcher =
            MemoryFetcher::new(&[("teams.json", TEAMS), ("combined.csv", "name,type,BOS\n")]);
        let err = load_snapshot(&fetcher, &paths()).await.unwrap_err();
        assert!(matches!(err, LoadError::Validation(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn empty_teams_is_validation_error() {
        let fetcher = MemoryFetcher::new(&[("teams.json", "[]"), ("combined.csv", STATS)]);
        let err = load_snapshot(&fetcher, &paths()).await.unwrap_err();
        assert!(matches!(err, LoadError::Validation(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn default_fetcher_reads_local_files() {
        let dir = std::env::temp_dir().join("courtside_loader_local");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("teams.json"), TEAMS).unwrap();

        let fetcher = DefaultFetcher::new();
        let location = dir.join("teams.json").display().to_string();
        let bytes = fetcher.fetch(&location).await.unwrap();
        assert_eq!(bytes, TEAMS.as_bytes());

        let missing = dir.join("nope.csv").display().to_string();
        assert!(matches!(
            fetcher.fetch(&missing).await,
            Err(LoadError::Io { .. })
        ));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
