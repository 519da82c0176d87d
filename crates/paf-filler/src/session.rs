//! The fill workflow around `FormFiller`: prompting for ids and dates,
//! saving each form under the output root and opening it.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use paf_core::{CenterId, FillError, FormFiller};
use tracing::{error, info, warn};

use crate::date::validate_date;
use crate::output::OutputLocator;
use crate::viewer::DocumentViewer;

/// Inputs that end an interactive session (compared case-insensitively).
pub const EXIT_WORDS: [&str; 4] = ["exit", "quit", "q", "e"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub written: usize,
    pub failed: usize,
}

/// One line typed at the `Center id` prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdInput {
    Exit,
    Blank,
    Id(CenterId),
    Invalid(String),
}

impl IdInput {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return IdInput::Blank;
        }
        if EXIT_WORDS.iter().any(|w| trimmed.eq_ignore_ascii_case(w)) {
            return IdInput::Exit;
        }
        match trimmed.parse::<CenterId>() {
            Ok(id) => IdInput::Id(id),
            Err(e) => IdInput::Invalid(e.to_string()),
        }
    }
}

pub struct Session<'a> {
    filler: &'a FormFiller,
    locator: &'a dyn OutputLocator,
    viewer: Option<&'a dyn DocumentViewer>,
    dump_fields: bool,
}

impl<'a> Session<'a> {
    pub fn new(filler: &'a FormFiller, locator: &'a dyn OutputLocator) -> Self {
        Self {
            filler,
            locator,
            viewer: None,
            dump_fields: false,
        }
    }

    pub fn with_viewer(mut self, viewer: &'a dyn DocumentViewer) -> Self {
        self.viewer = Some(viewer);
        self
    }

    pub fn with_field_dump(mut self, enabled: bool) -> Self {
        self.dump_fields = enabled;
        self
    }

    /// Fill, save and open the form for one participant.
    pub fn fill_one<W: Write>(
        &self,
        center_id: CenterId,
        date: &str,
        out: &mut W,
    ) -> anyhow::Result<PathBuf> {
        let form = if self.dump_fields {
            let fields = self.filler.fields_for(center_id, Some(date))?;
            writeln!(out, "{}", serde_json::to_string_pretty(&fields)?)?;
            self.filler.fill_fields(center_id, fields)?
        } else {
            self.filler.fill(center_id, Some(date))?
        };

        let path = self.locator.locate(center_id, date);
        form.save(&path).with_context(|| {
            format!("Failed to save form for Center_ID {} to {:?}", center_id, path)
        })?;

        if let Some(viewer) = self.viewer {
            if let Err(e) = viewer.open(&path) {
                warn!("Could not open {:?}: {}", path, e);
            }
        }
        Ok(path)
    }

    /// Prompt for ids and dates until an exit word or end of input.
    ///
    /// A failed fill is reported and counted; the session goes on with the
    /// next id. Only reading `input` or writing `out` can end it early.
    pub fn run<R: BufRead, W: Write>(
        &self,
        mut input: R,
        mut out: W,
    ) -> anyhow::Result<SessionSummary> {
        let mut summary = SessionSummary::default();

        loop {
            let Some(line) = prompt(&mut input, &mut out, "Enter Center id: ")? else {
                break;
            };
            let center_id = match IdInput::parse(&line) {
                IdInput::Exit => {
                    writeln!(out, "exiting program")?;
                    break;
                }
                IdInput::Blank => continue,
                IdInput::Invalid(reason) => {
                    writeln!(out, "error: {}", reason)?;
                    continue;
                }
                IdInput::Id(id) => id,
            };

            let Some(line) = prompt(&mut input, &mut out, "Enter date string: ")? else {
                break;
            };
            let date = match validate_date(&line) {
                Ok(date) => date,
                Err(e) => {
                    writeln!(out, "{}", e)?;
                    continue;
                }
            };

            match self.fill_one(center_id, date, &mut out) {
                Ok(path) => {
                    writeln!(out, "Document saved to: {}", path.display())?;
                    summary.written += 1;
                }
                Err(e) => {
                    let per_key = e.downcast_ref::<FillError>().is_some_and(FillError::is_per_key);
                    if !per_key {
                        error!("Fill for Center_ID {} failed: {:#}", center_id, e);
                    }
                    writeln!(out, "{:#}", e)?;
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Session finished: {} forms written, {} failed",
            summary.written, summary.failed
        );
        Ok(summary)
    }
}

/// Write `message`, then read one line. `None` at end of input.
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    message: &str,
) -> anyhow::Result<Option<String>> {
    write!(out, "{}", message)?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("exit", IdInput::Exit)]
    #[case("QUIT\n", IdInput::Exit)]
    #[case(" q ", IdInput::Exit)]
    #[case("E", IdInput::Exit)]
    #[case("", IdInput::Blank)]
    #[case("  \n", IdInput::Blank)]
    #[case("1042\n", IdInput::Id(CenterId(1042)))]
    #[case("-3", IdInput::Id(CenterId(-3)))]
    fn test_id_input(#[case] line: &str, #[case] expected: IdInput) {
        assert_eq!(IdInput::parse(line), expected);
    }

    #[rstest]
    #[case("abc")]
    #[case("10.5")]
    #[case("exiting")]
    fn test_invalid_id_input(#[case] line: &str) {
        assert!(matches!(IdInput::parse(line), IdInput::Invalid(_)));
    }
}
