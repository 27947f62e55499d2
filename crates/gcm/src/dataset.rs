//! Column-oriented observation tables, one column per graph node.

use std::collections::{HashMap, HashSet};

use ndarray::Array1;
use serde_json::{Map, Value};

use crate::error::GcmError;

/// Tabular dataset with named `f64` columns of equal length.
#[derive(Debug, Clone)]
pub struct Dataset {
    names: Vec<String>,
    index: HashMap<String, usize>,
    columns: Vec<Array1<f64>>,
    n_rows: usize,
}

impl Dataset {
    /// Build a dataset from (name, values) pairs.
    ///
    /// All columns must be non-empty and of equal length; names must be
    /// unique.
    pub fn from_columns<I, S>(pairs: I) -> Result<Self, GcmError>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let mut names = Vec::new();
        let mut index = HashMap::new();
        let mut columns = Vec::new();
        let mut n_rows = None;
        for (name, values) in pairs {
            let name = name.into();
            if index.contains_key(&name) {
                return Err(GcmError::DuplicateColumn(name));
            }
            let expected = *n_rows.get_or_insert(values.len());
            if values.len() != expected {
                return Err(GcmError::RaggedColumn {
                    column: name,
                    expected,
                    actual: values.len(),
                });
            }
            index.insert(name.clone(), columns.len());
            names.push(name);
            columns.push(Array1::from_vec(values));
        }
        let n_rows = n_rows.unwrap_or(0);
        if n_rows == 0 {
            return Err(GcmError::EmptyDataset);
        }
        Ok(Self {
            names,
            index,
            columns,
            n_rows,
        })
    }

    /// Build a dataset from row records (one JSON object per row).
    ///
    /// The schema is the union of keys across all records in first-seen
    /// order. A record that lacks a column, or holds a non-numeric value,
    /// contributes a NaN cell, mirroring tabular-import semantics.
    pub fn from_records(records: &[Map<String, Value>]) -> Result<Self, GcmError> {
        if records.is_empty() {
            return Err(GcmError::EmptyDataset);
        }
        let mut names: Vec<String> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for record in records {
            for key in record.keys() {
                if seen.insert(key.as_str()) {
                    names.push(key.clone());
                }
            }
        }
        let pairs: Vec<(String, Vec<f64>)> = names
            .into_iter()
            .map(|name| {
                let values = records
                    .iter()
                    .map(|r| r.get(&name).and_then(Value::as_f64).unwrap_or(f64::NAN))
                    .collect();
                (name, values)
            })
            .collect();
        Self::from_columns(pairs)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Column names in schema order.
    pub fn column_names(&self) -> Vec<&str> {
        self.names.iter().map(String::as_str).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Result<&Array1<f64>, GcmError> {
        self.index
            .get(name)
            .map(|&i| &self.columns[i])
            .ok_or_else(|| GcmError::MissingColumn(name.to_string()))
    }

    /// Column lookup that additionally rejects NaN and infinite cells.
    pub fn require_finite(&self, name: &str) -> Result<&Array1<f64>, GcmError> {
        let column = self.column(name)?;
        if column.iter().any(|v| !v.is_finite()) {
            return Err(GcmError::NonFiniteColumn(name.to_string()));
        }
        Ok(column)
    }
}
