// Raw record normalization: tagged cells and the numeric coercion rule.

use std::fmt;

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// A single value from a data file, tagged as numeric or text.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Numeric(f64),
    Text(String),
}

impl Cell {
    /// The numeric value, or `None` for text cells.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Numeric(v) => Some(*v),
            Cell::Text(_) => None,
        }
    }

    /// The text value, or `None` for numeric cells.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Numeric(_) => None,
            Cell::Text(s) => Some(s),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Cell::Numeric(_))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Numeric(v) => write!(f, "{v}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

/// Classify a raw string value.
///
/// A value is numeric when, ignoring surrounding ASCII whitespace, it is a
/// non-empty decimal or exponent literal (the exponent may be signed) without
/// a leading `+` and parses to a finite `f64`. `NaN` and infinities stay
/// text. Text cells keep the original, untrimmed string.
pub fn parse_cell(raw: &str) -> Cell {
    let trimmed = raw.trim_matches(|c: char| c.is_ascii_whitespace());
    if trimmed.is_empty() || trimmed.starts_with('+') {
        return Cell::Text(raw.to_string());
    }
    // f64::from_str accepts "inf"/"nan" spellings; reject anything alphabetic
    // other than an exponent marker. A `+` is only valid as an exponent sign.
    let mut prev = None;
    let literal = trimmed.chars().all(|c| {
        let ok = match c {
            '+' => matches!(prev, Some('e' | 'E')),
            '.' | '-' | 'e' | 'E' => true,
            _ => c.is_ascii_digit(),
        };
        prev = Some(c);
        ok
    });
    if !literal {
        return Cell::Text(raw.to_string());
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Cell::Numeric(v),
        _ => Cell::Text(raw.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// An ordered list of named cells, in source column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, Cell)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. Later duplicates of an existing key replace its value
    /// in place, keeping the original position.
    pub fn push(&mut self, key: impl Into<String>, value: Cell) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Cell> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Remove a field, returning its value.
    pub fn take(&mut self, key: &str) -> Option<Cell> {
        let idx = self.fields.iter().position(|(k, _)| k == key)?;
        Some(self.fields.remove(idx).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl IntoIterator for Record {
    type Item = (String, Cell);
    type IntoIter = std::vec::IntoIter<(String, Cell)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl FromIterator<(String, Cell)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Cell)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.push(k, v);
        }
        record
    }
}

/// Normalize a raw string record: every value that is fully numeric becomes
/// `Cell::Numeric`, everything else passes through as `Cell::Text`.
pub fn normalize_row<I, K, V>(raw: I) -> Record
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: AsRef<str>,
{
    raw.into_iter()
        .map(|(k, v)| (k.into(), parse_cell(v.as_ref())))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
