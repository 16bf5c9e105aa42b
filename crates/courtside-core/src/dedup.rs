// Rank-stat selection and first-seen-wins deduplication by stat name.

use crate::stat::StatRow;
use std::collections::HashSet;
use tracing::debug;

const RANK_SUFFIX: &str = "_RANK";

/// True if `name` ends in `_RANK` (ASCII case-insensitive).
pub fn is_rank_stat(name: &str) -> bool {
    rank_suffix_start(name).is_some()
}

/// Name of the base statistic a rank stat derives from: `PTS_RANK` → `PTS`.
/// Names without the suffix are returned unchanged.
pub fn base_stat_name(name: &str) -> &str {
    match rank_suffix_start(name) {
        Some(idx) => &name[..idx],
        None => name,
    }
}

fn rank_suffix_start(name: &str) -> Option<usize> {
    let idx = name.len().checked_sub(RANK_SUFFIX.len())?;
    let tail = name.get(idx..)?;
    tail.eq_ignore_ascii_case(RANK_SUFFIX).then_some(idx)
}

/// Rows whose name marks them as rank stats, in input order.
pub fn select_rank_rows(rows: &[StatRow]) -> Vec<StatRow> {
    rows.iter()
        .filter(|r| is_rank_stat(&r.name))
        .cloned()
        .collect()
}

/// Drop rows whose `name` was already seen. The first occurrence wins and
/// relative order is preserved.
///
/// Some stats are published under more than one category, which is where the
/// duplicates come from.
pub fn dedup_by_name(rows: Vec<StatRow>) -> Vec<StatRow> {
    let mut seen: HashSet<String> = HashSet::with_capacity(rows.len());
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        if seen.insert(row.name.clone()) {
            out.push(row);
        } else {
            debug!(
                "dropping duplicate stat '{}' (category '{}')",
                row.name, row.category
            );
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
