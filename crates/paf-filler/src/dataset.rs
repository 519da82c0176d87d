//! Spreadsheet loading: the first worksheet (or a named one) becomes a
//! `Dataset`, with its first row read as the header.

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Range, Reader};
use paf_core::{CellValue, Dataset, FillError};
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Failed to open workbook {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("Workbook {0:?} has no worksheets")]
    NoSheets(PathBuf),

    #[error("Failed to read worksheet '{name}': {source}")]
    Sheet {
        name: String,
        #[source]
        source: calamine::Error,
    },

    #[error("Worksheet '{0}' has no header row")]
    NoHeader(String),

    #[error(transparent)]
    Columns(#[from] FillError),
}

/// Convert one calamine cell into the loader-neutral `CellValue`.
pub fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(n) => CellValue::Int(*n),
        Data::Float(n) => CellValue::Float(*n),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => CellValue::Error(format!("{e:?}")),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => CellValue::DateTime(value),
            // Serial outside chrono's range: keep the raw number
            None => CellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

/// Build a dataset from a worksheet range: first row is the header.
pub fn dataset_from_range(name: &str, range: &Range<Data>) -> Result<Dataset, DatasetError> {
    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| DatasetError::NoHeader(name.to_string()))?
        .iter()
        .map(|c| cell_value(c).render().unwrap_or_default())
        .collect();

    let body: Vec<Vec<CellValue>> = rows.map(|row| row.iter().map(cell_value).collect()).collect();
    Ok(Dataset::from_table(&headers, &body)?)
}

/// Load the participant dataset from `path`.
pub fn load_dataset(path: &Path, sheet: Option<&str>) -> Result<Dataset, DatasetError> {
    info!("Loading data from {:?}...", path);
    let mut workbook = open_workbook_auto(path).map_err(|source| DatasetError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| DatasetError::NoSheets(path.to_path_buf()))?,
    };
    let range = workbook
        .worksheet_range(&name)
        .map_err(|source| DatasetError::Sheet { name: name.clone(), source })?;

    let dataset = dataset_from_range(&name, &range)?;
    info!("Data loaded from {:?} ({} participants)", path, dataset.len());
    Ok(dataset)
}
