use std::io::{Seek, Write};
use std::path::Path;

use tracing::{info, instrument, warn};

use crate::dataset::Dataset;
use crate::error::{FillError, Result};
use crate::fields::FieldMap;
use crate::record::CenterId;
use crate::substitute::{substitute, SubstitutionOptions, SubstitutionReport};
use crate::template::TemplateDocument;

/// Fills a PAF template from a participant dataset, one `Center_ID` at a time.
///
/// The loaded template is never edited: every fill works on its own copy, so
/// consecutive fills for different participants start from the same pristine
/// document.
#[derive(Debug, Clone)]
pub struct FormFiller {
    dataset: Dataset,
    template: Option<TemplateDocument>,
    options: SubstitutionOptions,
}

/// Result of one fill: the rewritten document and what went into it.
#[derive(Debug, Clone)]
pub struct FilledForm {
    pub center_id: CenterId,
    pub fields: FieldMap,
    pub report: SubstitutionReport,
    pub document: TemplateDocument,
}

impl FilledForm {
    pub fn save(&self, path: &Path) -> Result<()> {
        self.document.save(path)
    }

    pub fn write_to<W: Write + Seek>(&self, sink: W) -> Result<W> {
        self.document.write_to(sink)
    }
}

impl FormFiller {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            template: None,
            options: SubstitutionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SubstitutionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn set_template(&mut self, template: TemplateDocument) {
        self.template = Some(template);
    }

    pub fn load_template(&mut self, path: &Path) -> Result<()> {
        self.template = Some(TemplateDocument::open(path)?);
        Ok(())
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn options(&self) -> SubstitutionOptions {
        self.options
    }

    /// Field values `center_id` would be filled with.
    pub fn fields_for(&self, center_id: CenterId, date: Option<&str>) -> Result<FieldMap> {
        let record = self.dataset.resolve(center_id)?;
        Ok(FieldMap::build(record, date))
    }

    /// Fill a fresh copy of the template for `center_id`.
    #[instrument(skip(self), level = "debug")]
    pub fn fill(&self, center_id: CenterId, date: Option<&str>) -> Result<FilledForm> {
        let template = self.template.as_ref().ok_or(FillError::NoTemplateLoaded)?;
        let fields = self.fields_for(center_id, date)?;
        Ok(self.fill_with(template, center_id, fields))
    }

    /// Fill a fresh copy of the template with an already built field map.
    pub fn fill_fields(&self, center_id: CenterId, fields: FieldMap) -> Result<FilledForm> {
        let template = self.template.as_ref().ok_or(FillError::NoTemplateLoaded)?;
        Ok(self.fill_with(template, center_id, fields))
    }

    fn fill_with(
        &self,
        template: &TemplateDocument,
        center_id: CenterId,
        fields: FieldMap,
    ) -> FilledForm {
        let mut document = template.clone();
        let report = substitute(&mut document, &fields, self.options);

        if report.replacements == 0 {
            warn!("No placeholders found in template tables for Center_ID {}", center_id);
        } else {
            info!(
                "Filled {} placeholders for Center_ID {} ({} paragraphs processed)",
                report.replacements, center_id, report.paragraphs_processed
            );
        }

        FilledForm { center_id, fields, report, document }
    }
}
