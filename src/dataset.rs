//! In-memory tabular records as parsed from CSV text.
//!
//! A [`Row`] is a loose mapping from field name to raw string value. No schema
//! is enforced: short records simply lack the trailing fields, and lookups of
//! unknown names return `None`.

use std::collections::HashMap;

use itertools::Itertools;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: HashMap<String, String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zips header names with record values; surplus values without a header are dropped.
    pub fn from_record<'a, I>(headers: &[String], values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let fields = headers
            .iter()
            .zip(values)
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect();
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let fields = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { fields }
    }
}

/// A loaded dataset. Built once by a [`crate::loader::Loader`] and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self { headers, rows }
    }

    /// Builds a dataset from rows alone; headers are the sorted union of their field names.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let headers = rows
            .iter()
            .flat_map(|row| row.fields.keys().cloned())
            .sorted()
            .dedup()
            .collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.headers.iter().any(|h| h == field)
    }

    /// Distinct values of `field`, sorted ascending. Rows lacking the field are skipped.
    pub fn distinct_values(&self, field: &str) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|row| row.get(field))
            .sorted()
            .dedup()
            .map(str::to_string)
            .collect()
    }

    /// Rows whose `field` equals `value` exactly.
    pub fn matching<'a>(
        &'a self,
        field: &'a str,
        value: &'a str,
    ) -> impl Iterator<Item = &'a Row> + 'a {
        self.rows
            .iter()
            .filter(move |row| row.get(field) == Some(value))
    }
}
