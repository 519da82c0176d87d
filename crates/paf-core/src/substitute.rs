use std::collections::HashSet;
use std::ops::Range;

use tracing::debug;

use crate::fields::{FieldMap, Placeholder};
use crate::template::{Paragraph, ParagraphId, TemplateDocument, TextSlot};

/// Granularity at which placeholders are rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubstitutionMode {
    /// Rewrite inside runs: every run keeps its own formatting, and a value
    /// takes the formatting of the run where its token starts.
    #[default]
    Runs,
    /// Rebuild each paragraph with placeholders as one run. The first run's
    /// formatting is applied to the whole paragraph.
    Paragraph,
}

/// What the visited set remembers between paragraphs of one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupKey {
    /// Paragraph text: a paragraph whose text was already processed is
    /// skipped, even when it is a different paragraph in another cell.
    #[default]
    Content,
    /// Paragraph identity: each paragraph is processed once no matter how
    /// many merged grid positions reach it.
    Paragraph,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubstitutionOptions {
    pub mode: SubstitutionMode,
    pub dedup: DedupKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubstitutionReport {
    /// Paragraph visits that were processed (not skipped as duplicates).
    pub paragraphs_processed: usize,
    /// Paragraph visits skipped by the visited set.
    pub paragraphs_skipped: usize,
    /// Placeholder occurrences replaced.
    pub replacements: usize,
}

/// Replace placeholders in every table cell of `document`.
///
/// Paragraphs are visited table by table, row by row, grid cell by grid cell.
/// A visit is skipped when the visited set already holds the paragraph,
/// except for paragraphs reading exactly `{CURRENT_DATE}`, which are always
/// processed. Tokens missing from `fields` are left as they are.
pub fn substitute(
    document: &mut TemplateDocument,
    fields: &FieldMap,
    options: SubstitutionOptions,
) -> SubstitutionReport {
    let date_token = Placeholder::CurrentDate.token();
    let (layout, paragraphs) = document.parts_mut();

    let mut seen_text: HashSet<String> = HashSet::new();
    let mut seen_ids: HashSet<ParagraphId> = HashSet::new();
    let mut report = SubstitutionReport::default();

    for id in layout.paragraph_visits() {
        let paragraph = &mut paragraphs[id];
        let text = paragraph.text();

        let first_visit = match options.dedup {
            DedupKey::Content => seen_text.insert(text.clone()),
            DedupKey::Paragraph => seen_ids.insert(id),
        };
        if !first_visit && text != date_token {
            report.paragraphs_skipped += 1;
            continue;
        }

        report.paragraphs_processed += 1;
        report.replacements += match options.mode {
            SubstitutionMode::Runs => replace_in_runs(paragraph, fields),
            SubstitutionMode::Paragraph => replace_in_paragraph(paragraph, &text, fields),
        };
    }

    debug!(
        "Substitution pass: {} processed, {} skipped, {} replacements",
        report.paragraphs_processed, report.paragraphs_skipped, report.replacements
    );
    report
}

/// A placeholder found in concatenated run text.
struct TokenMatch<'f> {
    span: Range<usize>,
    token: &'f str,
    value: &'f str,
}

/// Leftmost non-overlapping occurrences of mapped tokens in `text`.
fn find_tokens<'f>(text: &str, fields: &'f FieldMap) -> Vec<TokenMatch<'f>> {
    let mut matches = Vec::new();
    let mut cursor = 0;
    while let Some(offset) = text[cursor..].find('{') {
        let start = cursor + offset;
        let Some(close) = text[start..].find('}') else {
            break;
        };
        let end = start + close + 1;
        match fields.iter().find(|(token, _)| *token == &text[start..end]) {
            Some((token, value)) => {
                matches.push(TokenMatch { span: start..end, token, value });
                cursor = end;
            }
            None => cursor = start + 1,
        }
    }
    matches
}

/// Run-level replacement.
///
/// Runs whose whole text is a token are replaced first. The remaining
/// stretches of untouched runs are then searched as one string so tokens the
/// editor split across runs (`{` + `CURRENT_DATE}`) or embedded next to other
/// text are found too. Edits are made per `<w:t>` element: the value is
/// written where the token starts, the token's other characters are removed
/// from the elements that follow, and elements the token does not touch are
/// left alone along with any tab or break between them.
fn replace_in_runs(paragraph: &mut Paragraph, fields: &FieldMap) -> usize {
    let runs = paragraph.runs_mut();
    let mut replaced = vec![false; runs.len()];
    let mut count = 0;

    for (index, run) in runs.iter_mut().enumerate() {
        if fields.get(&run.text()).is_some() {
            let mut slots: Vec<&mut TextSlot> = run.slots_mut().iter_mut().collect();
            count += replace_spanning(&mut slots, fields);
            replaced[index] = true;
        }
    }

    let mut index = 0;
    while index < runs.len() {
        if replaced[index] {
            index += 1;
            continue;
        }
        let end = replaced[index..]
            .iter()
            .position(|r| *r)
            .map_or(runs.len(), |p| index + p);
        let mut slots: Vec<&mut TextSlot> = runs[index..end]
            .iter_mut()
            .flat_map(|r| r.slots_mut().iter_mut())
            .collect();
        count += replace_spanning(&mut slots, fields);
        index = end;
    }

    count
}

fn replace_spanning(slots: &mut [&mut TextSlot], fields: &FieldMap) -> usize {
    let mut starts = Vec::with_capacity(slots.len());
    let mut lens = Vec::with_capacity(slots.len());
    let mut joined = String::new();
    for slot in slots.iter() {
        starts.push(joined.len());
        lens.push(slot.text().len());
        joined.push_str(slot.text());
    }

    let matches = find_tokens(&joined, fields);
    if matches.is_empty() {
        return 0;
    }

    // Byte position → index of the element holding it
    let slot_at = |pos: usize| {
        (0..starts.len())
            .rev()
            .find(|&i| starts[i] <= pos && pos < starts[i] + lens[i])
            .unwrap_or(0)
    };

    let mut current: Vec<String> = slots.iter().map(|s| s.text().to_string()).collect();
    for m in matches.iter().rev() {
        let first = slot_at(m.span.start);
        let last = slot_at(m.span.end - 1);
        let head = m.span.start - starts[first];
        let tail = m.span.end - starts[last];

        if first == last {
            let text = &current[first];
            current[first] = format!("{}{}{}", &text[..head], m.value, &text[tail..]);
        } else {
            current[first] = format!("{}{}", &current[first][..head], m.value);
            for text in &mut current[first + 1..last] {
                text.clear();
            }
            current[last] = current[last][tail..].to_string();
        }
        debug!(
            "Replaced {} with '{}' across text elements {}..={}",
            m.token, m.value, first, last
        );
    }

    for (slot, text) in slots.iter_mut().zip(&current) {
        slot.set(text);
    }
    matches.len()
}

/// Paragraph-level replacement: literal replacement over the paragraph text,
/// written back as a single run.
fn replace_in_paragraph(paragraph: &mut Paragraph, text: &str, fields: &FieldMap) -> usize {
    let mut rebuilt = text.to_string();
    let mut count = 0;
    for (token, value) in fields.iter() {
        let occurrences = rebuilt.matches(token).count();
        if occurrences > 0 {
            rebuilt = rebuilt.replace(token, value);
            count += occurrences;
            debug!("Replaced {} with '{}' in: '{}'", token, value, text);
        }
    }
    if count > 0 {
        paragraph.set_text(&rebuilt);
    }
    count
}
