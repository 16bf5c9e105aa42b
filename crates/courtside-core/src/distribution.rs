// Distribution strips: per-stat extent, mean, and pixel layout.
//
// A rank row (e.g. `PTS_RANK`) is drawn using the values of its base stat
// (`PTS`) from the full stat table, so the strip always reflects the whole
// league even when the table's columns are filtered.

use crate::dedup::base_stat_name;
use crate::stat::StatRow;
use serde::Deserialize;
use thiserror::Error;

/// Label of the synthetic league-average mark.
pub const AVG_LABEL: &str = "AVG";

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Space reserved around the plot area of a strip, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 10.0,
            right: 10.0,
            bottom: 20.0,
            left: 10.0,
        }
    }
}

/// Pixel geometry of one distribution strip.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct StripLayout {
    /// Outer SVG width including margins.
    pub width: f64,
    /// Outer SVG height including margins.
    pub height: f64,
    pub margin: Margins,
    /// Width of each team mark.
    pub mark_width: f64,
    /// Approximate number of axis ticks.
    pub ticks: usize,
}

impl Default for StripLayout {
    fn default() -> Self {
        Self {
            width: 500.0,
            height: 40.0,
            margin: Margins::default(),
            mark_width: 3.0,
            ticks: 10,
        }
    }
}

impl StripLayout {
    /// Width of the plot area, i.e. the scale's output range.
    pub fn inner_width(&self) -> f64 {
        self.width - self.margin.left - self.margin.right
    }

    pub fn inner_height(&self) -> f64 {
        self.height - self.margin.top - self.margin.bottom
    }
}

// ---------------------------------------------------------------------------
// Linear scale
// ---------------------------------------------------------------------------

// Thresholds for rounding a raw tick step to 1, 2, 5 or 10 times a power of ten.
const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

/// Maps a numeric domain `[d0, d1]` linearly onto a pixel range `[r0, r1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    /// Map a domain value to the range. A zero-width domain, or one too wide
    /// to represent, maps every value to the start of the range.
    pub fn scale(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span == 0.0 || !span.is_finite() {
            return r0;
        }
        r0 + (value - d0) / span * (r1 - r0)
    }

    /// Roughly `count` evenly spaced round values inside the domain.
    ///
    /// Returns no ticks when the domain or the tick step cannot be
    /// represented as finite values.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (lo, hi) = if self.domain.0 <= self.domain.1 {
            self.domain
        } else {
            (self.domain.1, self.domain.0)
        };
        if count == 0 || !lo.is_finite() || !hi.is_finite() || !(hi - lo).is_finite() {
            return Vec::new();
        }
        if lo == hi {
            return vec![lo];
        }

        let raw = (hi - lo) / count as f64;
        let power = raw.log10().floor();
        let error = raw / 10f64.powf(power);
        let factor = if error >= E10 {
            10.0
        } else if error >= E5 {
            5.0
        } else if error >= E2 {
            2.0
        } else {
            1.0
        };

        // Negative powers step by dividing, which keeps values like 0.1 exact.
        if power >= 0.0 {
            let step = factor * 10f64.powf(power);
            if !step.is_finite() || step == 0.0 {
                return Vec::new();
            }
            tick_indices(lo / step, hi / step, count)
                .map(|i| i as f64 * step)
                .collect()
        } else {
            let inv = 10f64.powf(-power) / factor;
            if !inv.is_finite() || inv == 0.0 {
                return Vec::new();
            }
            tick_indices(lo * inv, hi * inv, count)
                .map(|i| i as f64 / inv)
                .collect()
        }
    }
}

/// Integer tick indices between two step-scaled bounds. Empty when the
/// bounds are not finite or would give far more ticks than requested.
fn tick_indices(lo: f64, hi: f64, count: usize) -> impl Iterator<Item = i64> {
    let (first, last) = (lo.ceil(), hi.floor());
    let limit = (count as f64 + 1.0) * 4.0;
    let bounded = first.is_finite() && last.is_finite() && last - first <= limit;
    bounded
        .then(|| first as i64..=last as i64)
        .into_iter()
        .flatten()
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DistributionError {
    #[error("no base stat '{base}' found for '{rank}'")]
    MissingBaseStat { rank: String, base: String },

    #[error("base stat '{0}' has no numeric team values")]
    NoNumericValues(String),
}

/// One mark on a strip: a team (or the average) and where it lands.
#[derive(Debug, Clone, PartialEq)]
pub struct StripMark {
    pub label: String,
    pub value: f64,
    /// Horizontal pixel offset inside the plot area.
    pub offset: f64,
}

/// Everything needed to draw one distribution strip.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionSummary {
    /// Name of the base stat the values came from.
    pub stat: String,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Team marks in column order, then the `AVG` mark.
    pub marks: Vec<StripMark>,
    /// Axis ticks as `(value, offset)` pairs.
    pub ticks: Vec<(f64, f64)>,
}

/// Find the base stat row for a rank row by stripping the `_RANK` suffix.
/// The first row with a matching name wins.
pub fn find_base_stat<'a>(
    rank_name: &str,
    all_stats: &'a [StatRow],
) -> Result<&'a StatRow, DistributionError> {
    let base = base_stat_name(rank_name);
    all_stats
        .iter()
        .find(|s| s.name == base)
        .ok_or_else(|| DistributionError::MissingBaseStat {
            rank: rank_name.to_string(),
            base: base.to_string(),
        })
}

/// Summarize the league-wide distribution behind a rank row.
///
/// `all_stats` must be the complete, unfiltered stat table.
pub fn summarize(
    row: &StatRow,
    all_stats: &[StatRow],
    layout: &StripLayout,
) -> Result<DistributionSummary, DistributionError> {
    let base = find_base_stat(&row.name, all_stats)?;

    let mut samples: Vec<(String, f64)> = base
        .numeric_values()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    if samples.is_empty() {
        return Err(DistributionError::NoNumericValues(base.name.clone()));
    }

    let (min, max) = samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, v)| {
            (lo.min(*v), hi.max(*v))
        });
    // Dividing first keeps the sum finite for values near f64::MAX.
    let n = samples.len() as f64;
    let mean = samples.iter().map(|(_, v)| v / n).sum::<f64>();

    samples.push((AVG_LABEL.to_string(), mean));

    let x = LinearScale::new((min, max), (0.0, layout.inner_width()));
    let marks = samples
        .into_iter()
        .map(|(label, value)| StripMark {
            offset: x.scale(value),
            label,
            value,
        })
        .collect();
    let ticks = x
        .ticks(layout.ticks)
        .into_iter()
        .map(|t| (t, x.scale(t)))
        .collect();

    Ok(DistributionSummary {
        stat: base.name.clone(),
        min,
        max,
        mean,
        marks,
        ticks,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
