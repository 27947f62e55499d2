//! Rolling accumulation of telemetry rows between events.

use std::collections::VecDeque;

use causeway_gcm::{Dataset, GcmError};
use serde_json::{Map, Value};

use crate::error::AgentError;

/// Bounded FIFO of observation rows aligned to a fixed column list.
///
/// Rows are only accepted complete: a record that lacks any expected column
/// (or holds a non-numeric value there) is rejected rather than padded.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    columns: Vec<String>,
    rows: VecDeque<Vec<f64>>,
    min_samples: usize,
    max_rows: usize,
}

impl SampleWindow {
    pub fn new(columns: Vec<String>, min_samples: usize, max_rows: usize) -> Self {
        Self {
            columns,
            rows: VecDeque::new(),
            min_samples,
            max_rows,
        }
    }

    fn row_from(&self, record: &Map<String, Value>) -> Result<Vec<f64>, AgentError> {
        let mut row = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let value = record
                .get(column)
                .and_then(Value::as_f64)
                .ok_or_else(|| AgentError::MissingField(column.clone()))?;
            row.push(value);
        }
        Ok(row)
    }

    fn append(&mut self, row: Vec<f64>) {
        if self.rows.len() == self.max_rows {
            self.rows.pop_front();
        }
        self.rows.push_back(row);
    }

    /// Append one record, evicting the oldest row when full.
    pub fn push_record(&mut self, record: &Map<String, Value>) -> Result<(), AgentError> {
        let row = self.row_from(record)?;
        self.append(row);
        Ok(())
    }

    /// Append a batch atomically: if any record is incomplete, none are kept.
    pub fn push_batch(&mut self, records: &[&Map<String, Value>]) -> Result<usize, AgentError> {
        let rows = records
            .iter()
            .map(|record| self.row_from(record))
            .collect::<Result<Vec<_>, _>>()?;
        let accepted = rows.len();
        for row in rows {
            self.append(row);
        }
        Ok(accepted)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Enough rows buffered to fit a model.
    pub fn is_ready(&self) -> bool {
        self.rows.len() >= self.min_samples
    }

    /// Snapshot the buffered rows as a column-oriented dataset.
    pub fn to_dataset(&self) -> Result<Dataset, GcmError> {
        let pairs = self.columns.iter().enumerate().map(|(j, name)| {
            let values: Vec<f64> = self.rows.iter().map(|row| row[j]).collect();
            (name.clone(), values)
        });
        Dataset::from_columns(pairs)
    }
}
