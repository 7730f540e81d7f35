//! Group, reduce, rank and truncate.
//!
//! [`aggregate`] groups rows by a key field, reduces each group to a number
//! ([`ValueMode::Count`] or the parsed value of a field), sorts groups
//! descending and keeps the first [`TOP_N`]. The function is pure.
//!
//! NaN ranks below every number. Entries with equal values, NaN included,
//! keep the order in which their label was first encountered.

use std::{cmp::Ordering, collections::HashMap};

use serde::{Deserialize, Serialize};

use crate::dataset::Row;

/// Number of entries a chart shows.
pub const TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueMode {
    /// Number of rows sharing the group value.
    Count,
    /// Numeric parse of the named field, summed when a label repeats.
    Field(String),
}

impl ValueMode {
    pub fn field(name: impl Into<String>) -> Self {
        ValueMode::Field(name.into())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedEntry {
    pub label: String,
    pub value: f64,
}

impl AggregatedEntry {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Ranked groups, non-increasing by value, with unique labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankedList {
    entries: Vec<AggregatedEntry>,
}

impl RankedList {
    pub fn entries(&self) -> &[AggregatedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AggregatedEntry> {
        self.entries.iter()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.label.as_str())
    }

    /// Largest finite value, or `None` when no entry has one.
    pub fn max_value(&self) -> Option<f64> {
        self.entries
            .iter()
            .map(|entry| entry.value)
            .filter(|value| value.is_finite())
            .fold(None, |acc, value| match acc {
                Some(current) if current >= value => Some(current),
                _ => Some(value),
            })
    }
}

impl<'a> IntoIterator for &'a RankedList {
    type Item = &'a AggregatedEntry;
    type IntoIter = std::slice::Iter<'a, AggregatedEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

pub fn aggregate<'a, I>(rows: I, group_field: &str, mode: &ValueMode) -> RankedList
where
    I: IntoIterator<Item = &'a Row>,
{
    aggregate_top(rows, group_field, mode, TOP_N)
}

/// Like [`aggregate`] with a caller-chosen truncation length. `0` keeps every group.
pub fn aggregate_top<'a, I>(rows: I, group_field: &str, mode: &ValueMode, top: usize) -> RankedList
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, f64)> = Vec::new();

    for row in rows {
        let label = row.get(group_field).unwrap_or("");
        let contribution = match mode {
            ValueMode::Count => 1.0,
            ValueMode::Field(field) => parse_numeric(row.get(field)),
        };
        match positions.get(label) {
            Some(&idx) => groups[idx].1 += contribution,
            None => {
                positions.insert(label, groups.len());
                groups.push((label, contribution));
            }
        }
    }

    // `sort_by` is stable, so ties keep encounter order.
    groups.sort_by(|a, b| descending(a.1, b.1));
    if top > 0 {
        groups.truncate(top);
    }

    RankedList {
        entries: groups
            .into_iter()
            .map(|(label, value)| AggregatedEntry::new(label, value))
            .collect(),
    }
}

/// Descending order with NaN treated as negative infinity.
pub fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Parses a raw field the way a loose numeric coercion would: surrounding
/// whitespace is ignored, an empty string is zero, anything else that is not
/// a number (including a missing field) is NaN.
///
/// Unsigned `0x`, `0o` and `0b` literals are read in their radix.
pub fn parse_numeric(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return f64::NAN;
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    if let Some(value) = parse_radix_literal(trimmed) {
        return value;
    }
    match trimmed {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ if trimmed.chars().any(|c| c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E')) => {
            f64::NAN
        }
        _ => trimmed.parse::<f64>().unwrap_or(f64::NAN),
    }
}

/// `Some` for input carrying a radix prefix; NaN when its digits are invalid.
fn parse_radix_literal(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'0' {
        return None;
    }
    let radix = match bytes[1] {
        b'x' | b'X' => 16,
        b'o' | b'O' => 8,
        b'b' | b'B' => 2,
        _ => return None,
    };
    let digits = &text[2..];
    if digits.is_empty() {
        return Some(f64::NAN);
    }
    let value = digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix).map(|digit| acc * f64::from(radix) + f64::from(digit))
    });
    Some(value.unwrap_or(f64::NAN))
}
