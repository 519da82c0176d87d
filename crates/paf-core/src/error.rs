use crate::record::CenterId;

/// Errors raised while loading records or templates and filling forms.
#[derive(Debug, thiserror::Error)]
pub enum FillError {
    #[error("No data found for Center_ID: {0}")]
    NotFound(CenterId),

    #[error("Required column '{0}' is missing from the dataset")]
    MissingField(String),

    #[error("No template loaded")]
    NoTemplateLoaded,

    #[error("Template part '{0}' not found in DOCX package")]
    MissingPart(String),

    #[error("Template package error: {0}")]
    Package(#[from] zip::result::ZipError),

    #[error("Template XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Template part '{0}' is not valid UTF-8")]
    Encoding(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FillError {
    /// Whether the error only concerns one key, so an interactive session can
    /// report it and move on to the next one.
    pub fn is_per_key(&self) -> bool {
        matches!(self, FillError::NotFound(_) | FillError::MissingField(_))
    }
}

pub type Result<T> = std::result::Result<T, FillError>;
