//! Command-line front end for the PAF form filler.
//!
//! Loads the participant spreadsheet and template once, then fills forms
//! either for a single `--center-id` or interactively, saving each one under
//! `<output-dir>/<Center_ID>/PAF-<date>.docx`.

pub mod config;
pub mod dataset;
pub mod date;
pub mod output;
pub mod session;
pub mod viewer;

pub use config::Config;
pub use dataset::{load_dataset, DatasetError};
pub use date::{validate_date, DateError};
pub use output::{OutputLocator, ProfileDirLocator};
pub use session::{Session, SessionSummary};
pub use viewer::{DocumentViewer, SystemViewer};
