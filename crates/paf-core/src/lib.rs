//! Core engine for filling PAF (participant profile) forms.
//!
//! This crate owns everything between a loaded dataset and a written document:
//! - `Dataset` / `Record`: typed participant rows and `Center_ID` resolution
//! - `FieldMap`: the 15 placeholder tokens rendered from one record
//! - `TemplateDocument`: a DOCX package with an editable table/run model
//! - `substitute`: in-place placeholder replacement inside table cells
//! - `FormFiller`: resolve → map → substitute for one key at a time

mod contact;
mod dataset;
mod error;
mod fields;
mod fill;
mod record;
mod substitute;
pub mod template;

pub use contact::extract_phone_and_name;
pub use dataset::Dataset;
pub use error::{FillError, Result};
pub use fields::{FieldMap, Placeholder, DEFAULT_DATE_FORMAT};
pub use fill::{FilledForm, FormFiller};
pub use record::{CellValue, CenterId, Column, ColumnMap, Record};
pub use substitute::{
    substitute, DedupKey, SubstitutionMode, SubstitutionOptions, SubstitutionReport,
};
pub use template::TemplateDocument;
