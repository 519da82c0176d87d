use tracing::{debug, warn};

use crate::error::{FillError, Result};
use crate::record::{CellValue, CenterId, ColumnMap, Record};

/// Participant records in source row order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Build a dataset from a header row and data rows.
    ///
    /// Fails with `MissingField` when a required column is absent. Rows
    /// without a usable `Center_ID` are skipped.
    pub fn from_table<S: AsRef<str>>(headers: &[S], rows: &[Vec<CellValue>]) -> Result<Self> {
        let columns = ColumnMap::from_headers(headers)?;
        let mut records = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            if row.iter().all(|c| matches!(c, CellValue::Empty)) {
                continue;
            }
            let record = Record::from_row(&columns, row);
            if record.center_id.is_none() {
                // +2: one for the header row, one for 1-based sheet numbering
                warn!("Skipping row {}: no usable Center_ID", index + 2);
                continue;
            }
            records.push(record);
        }
        debug!("Dataset built with {} records", records.len());
        Ok(Self { records })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Find the record for `key`. Duplicate ids resolve to the first row.
    pub fn resolve(&self, key: CenterId) -> Result<&Record> {
        self.records
            .iter()
            .find(|r| r.center_id == Some(key))
            .ok_or(FillError::NotFound(key))
    }
}
