use std::ops::Range;

/// Index of a paragraph inside a `TemplateDocument`.
pub type ParagraphId = usize;

/// Index of a cell inside a `Layout`.
pub type CellId = usize;

/// One `<w:t>` element: where it sits in the source XML and its current text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSlot {
    pub(crate) range: Range<usize>,
    pub(crate) qname: String,
    pub(crate) text: String,
    pub(crate) dirty: bool,
}

impl TextSlot {
    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn set(&mut self, text: &str) {
        if self.text != text {
            self.text.clear();
            self.text.push_str(text);
            self.dirty = true;
        }
    }
}

/// A run of text sharing one set of run properties (`<w:r>`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Run {
    pub(crate) slots: Vec<TextSlot>,
}

impl Run {
    pub fn text(&self) -> String {
        self.slots.iter().map(|s| s.text.as_str()).collect()
    }

    /// Whether the run has a `<w:t>` element that can receive text.
    pub fn holds_text(&self) -> bool {
        !self.slots.is_empty()
    }

    /// Replace the run's text, keeping its run properties.
    ///
    /// The whole text goes into the first `<w:t>`; any further ones are
    /// emptied. Returns `false` for runs without a text element.
    pub fn set_text(&mut self, text: &str) -> bool {
        let Some((first, rest)) = self.slots.split_first_mut() else {
            return false;
        };
        first.set(text);
        for slot in rest {
            slot.set("");
        }
        true
    }

    pub fn is_modified(&self) -> bool {
        self.slots.iter().any(|s| s.dirty)
    }

    /// The run's `<w:t>` elements. Tabs and breaks between them are not
    /// part of the model and stay where they are in the source.
    pub(crate) fn slots_mut(&mut self) -> &mut [TextSlot] {
        &mut self.slots
    }
}

/// A paragraph (`<w:p>`) and the runs it owns, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    pub(crate) runs: Vec<Run>,
}

impl Paragraph {
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text()).collect()
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn runs_mut(&mut self) -> &mut [Run] {
        &mut self.runs
    }

    /// Rewrite the paragraph as a single run of text: the first run that can
    /// hold text receives everything, every other run is emptied. That run's
    /// formatting ends up applied to the whole paragraph.
    pub fn set_text(&mut self, text: &str) -> bool {
        let Some(first) = self.runs.iter().position(Run::holds_text) else {
            return false;
        };
        for (index, run) in self.runs.iter_mut().enumerate() {
            if index == first {
                run.set_text(text);
            } else {
                run.set_text("");
            }
        }
        true
    }

    pub fn is_modified(&self) -> bool {
        self.runs.iter().any(Run::is_modified)
    }

    /// Detached paragraph with one single-`<w:t>` run per entry.
    #[cfg(test)]
    pub(crate) fn from_run_texts(texts: &[&str]) -> Self {
        let runs: Vec<Vec<&str>> = texts.iter().map(|t| vec![*t]).collect();
        let runs: Vec<&[&str]> = runs.iter().map(Vec::as_slice).collect();
        Self::from_slot_texts(&runs)
    }

    /// Detached paragraph with one run per entry and one `<w:t>` per text.
    #[cfg(test)]
    pub(crate) fn from_slot_texts(runs: &[&[&str]]) -> Self {
        let runs = runs
            .iter()
            .map(|texts| Run {
                slots: texts
                    .iter()
                    .map(|t| TextSlot {
                        range: 0..0,
                        qname: "w:t".to_string(),
                        text: t.to_string(),
                        dirty: false,
                    })
                    .collect(),
            })
            .collect();
        Paragraph { runs }
    }
}

/// A table cell (`<w:tc>`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub paragraphs: Vec<ParagraphId>,
}

/// A table row, one entry per grid column.
///
/// A cell spanning several columns (`w:gridSpan`) appears once per column it
/// covers, and a vertically merged continuation cell (`w:vMerge`) resolves to
/// the cell starting the merge, so the same `CellId` can show up repeatedly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<CellId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<Row>,
}

/// Table structure of a document body. Immutable once parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    pub(crate) tables: Vec<Table>,
    pub(crate) cells: Vec<Cell>,
}

impl Layout {
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id]
    }

    /// Paragraph ids in traversal order (table → row → grid cell →
    /// paragraph). Merged cells make ids repeat.
    pub fn paragraph_visits(&self) -> impl Iterator<Item = ParagraphId> + '_ {
        self.tables
            .iter()
            .flat_map(|t| t.rows.iter())
            .flat_map(|r| r.cells.iter())
            .flat_map(|&c| self.cells[c].paragraphs.iter().copied())
    }
}
