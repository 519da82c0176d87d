use std::path::{Path, PathBuf};

use paf_core::CenterId;

/// Where a filled form for a participant and date is written.
pub trait OutputLocator {
    fn locate(&self, center_id: CenterId, date: &str) -> PathBuf;
}

/// `<root>/<Center_ID>/PAF-<date>.docx`, one directory per participant.
#[derive(Debug, Clone)]
pub struct ProfileDirLocator {
    root: PathBuf,
}

impl ProfileDirLocator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `~/member_profiles`, or `./member_profiles` without a home directory.
    pub fn default_root() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("member_profiles")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for ProfileDirLocator {
    fn default() -> Self {
        Self::new(Self::default_root())
    }
}

/// Date text usable in a file name: path separators become `-`.
fn file_date(date: &str) -> String {
    date.trim().replace(['/', '\\'], "-")
}

impl OutputLocator for ProfileDirLocator {
    fn locate(&self, center_id: CenterId, date: &str) -> PathBuf {
        self.root
            .join(center_id.to_string())
            .join(format!("PAF-{}.docx", file_date(date)))
    }
}
