use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use paf_core::{CenterId, DedupKey, SubstitutionMode, SubstitutionOptions};

/// Substitution strategy, as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ModeArg {
    /// Rewrite inside runs, keeping each run's formatting
    #[default]
    Runs,
    /// Collapse each affected paragraph into its first run
    Paragraph,
}

impl From<ModeArg> for SubstitutionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Runs => SubstitutionMode::Runs,
            ModeArg::Paragraph => SubstitutionMode::Paragraph,
        }
    }
}

/// Key of the visited set used to skip repeated paragraphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DedupArg {
    /// Skip paragraphs whose text was already processed
    #[default]
    Content,
    /// Skip only repeat visits of the same paragraph (merged cells)
    Paragraph,
}

impl From<DedupArg> for DedupKey {
    fn from(dedup: DedupArg) -> Self {
        match dedup {
            DedupArg::Content => DedupKey::Content,
            DedupArg::Paragraph => DedupKey::Paragraph,
        }
    }
}

/// Configuration for the paf-filler CLI.
#[derive(Parser, Debug, Clone)]
#[command(name = "paf-filler")]
#[command(about = "Fill PAF forms from a participant spreadsheet and a DOCX template")]
pub struct Config {
    /// Participant spreadsheet (xlsx, xls, ods)
    #[arg(long, default_value = "ScriptContacts.xlsx", env = "PAF_DATA")]
    pub data: PathBuf,

    /// Worksheet to read (defaults to the first one)
    #[arg(long, env = "PAF_SHEET")]
    pub sheet: Option<String>,

    /// DOCX template with {PLACEHOLDER} tokens in its tables
    #[arg(long, default_value = "templateCopy.docx", env = "PAF_TEMPLATE")]
    pub template: PathBuf,

    /// Root directory for filled forms (defaults to ~/member_profiles)
    #[arg(long, env = "PAF_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Fill a single form for this Center_ID and exit
    #[arg(long)]
    pub center_id: Option<CenterId>,

    /// Date written into {CURRENT_DATE} (MM/DD/YYYY or MM-DD-YYYY)
    #[arg(long, requires = "center_id")]
    pub date: Option<String>,

    /// Substitution strategy
    #[arg(long, value_enum, default_value_t = ModeArg::Runs)]
    pub mode: ModeArg,

    /// Visited-set key for repeated paragraphs
    #[arg(long, value_enum, default_value_t = DedupArg::Content)]
    pub dedup: DedupArg,

    /// Do not open saved forms in the system viewer
    #[arg(long)]
    pub no_open: bool,

    /// Print the field values as JSON before each fill
    #[arg(long)]
    pub dump_fields: bool,
}

impl Config {
    pub fn substitution_options(&self) -> SubstitutionOptions {
        SubstitutionOptions {
            mode: self.mode.into(),
            dedup: self.dedup.into(),
        }
    }
}
