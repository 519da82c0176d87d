//! Reading table structure out of `word/document.xml` and writing text edits
//! back into it.
//!
//! The source XML is never re-serialized. Parsing records the byte range of
//! every `<w:t>` element that belongs to a table-cell paragraph, and
//! rendering splices rewritten elements into the original text at those
//! ranges. Everything else in the part stays byte-for-byte identical.

use roxmltree::Node;

use super::model::{Cell, CellId, Layout, Paragraph, ParagraphId, Row, Run, Table, TextSlot};
use crate::error::Result;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

fn is_w(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name && node.tag_name().namespace() == Some(W_NS)
}

fn w_child<'a, 'input>(node: &Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|c| is_w(c, name))
}

fn w_val<'a>(node: &Node<'a, '_>) -> Option<&'a str> {
    node.attribute((W_NS, "val"))
}

/// Merge properties read from `<w:tcPr>`.
struct CellProps {
    grid_span: usize,
    continues_merge: bool,
}

impl CellProps {
    fn read(tc: &Node) -> Self {
        let mut props = CellProps { grid_span: 1, continues_merge: false };
        let Some(tc_pr) = w_child(tc, "tcPr") else {
            return props;
        };
        if let Some(span) = w_child(&tc_pr, "gridSpan") {
            props.grid_span =
                w_val(&span).and_then(|v| v.parse::<usize>().ok()).unwrap_or(1).max(1);
        }
        if let Some(vmerge) = w_child(&tc_pr, "vMerge") {
            // A bare <w:vMerge/> continues the merge above it
            props.continues_merge = w_val(&vmerge).unwrap_or("continue") != "restart";
        }
        props
    }
}

/// Element name as written in the source, prefix included (`w:t`).
fn qualified_name(element_xml: &str) -> String {
    element_xml
        .trim_start_matches('<')
        .chars()
        .take_while(|c| !c.is_whitespace() && *c != '>' && *c != '/')
        .collect()
}

#[derive(Default)]
struct LayoutBuilder {
    layout: Layout,
    paragraphs: Vec<Paragraph>,
}

impl LayoutBuilder {
    fn add_table(&mut self, xml: &str, tbl: Node) {
        let mut rows = Vec::new();
        // Grid of the previous row, used to resolve vertical merges
        let mut above: Vec<Option<CellId>> = Vec::new();

        for tr in tbl.children().filter(|n| is_w(n, "tr")) {
            let mut grid: Vec<Option<CellId>> = Vec::new();
            let skipped = w_child(&tr, "trPr")
                .and_then(|pr| w_child(&pr, "gridBefore"))
                .and_then(|gb| w_val(&gb).and_then(|v| v.parse::<usize>().ok()))
                .unwrap_or(0);
            grid.resize(skipped, None);

            for tc in row_cells(tr) {
                let props = CellProps::read(&tc);
                let merged_into = if props.continues_merge {
                    above.get(grid.len()).copied().flatten()
                } else {
                    None
                };
                let id = match merged_into {
                    Some(id) => id,
                    None => self.add_cell(xml, tc),
                };
                grid.extend(std::iter::repeat(Some(id)).take(props.grid_span));
            }

            rows.push(Row { cells: grid.iter().flatten().copied().collect() });
            above = grid;
        }

        self.layout.tables.push(Table { rows });
    }

    fn add_cell(&mut self, xml: &str, tc: Node) -> CellId {
        let paragraphs = tc
            .children()
            .filter(|n| is_w(n, "p"))
            .map(|p| self.add_paragraph(xml, p))
            .collect();
        self.layout.cells.push(Cell { paragraphs });
        self.layout.cells.len() - 1
    }

    fn add_paragraph(&mut self, xml: &str, p: Node) -> ParagraphId {
        // Runs nested in hyperlinks, insertions or smart tags still belong to
        // this paragraph; runs of nested paragraphs (text boxes) do not.
        let runs = p
            .descendants()
            .filter(|n| is_w(n, "r"))
            .filter(|r| r.ancestors().skip(1).find(|a| is_w(a, "p")) == Some(p))
            .map(|r| read_run(xml, r))
            .collect();
        self.paragraphs.push(Paragraph { runs });
        self.paragraphs.len() - 1
    }
}

/// `<w:tc>` elements of a row, looking through content controls.
fn row_cells<'a, 'input>(tr: Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
    let mut cells = Vec::new();
    for child in tr.children() {
        if is_w(&child, "tc") {
            cells.push(child);
        } else if is_w(&child, "sdt") {
            if let Some(content) = w_child(&child, "sdtContent") {
                cells.extend(content.children().filter(|n| is_w(n, "tc")));
            }
        }
    }
    cells
}

fn read_run(xml: &str, r: Node) -> Run {
    let slots = r
        .children()
        .filter(|n| is_w(n, "t"))
        .map(|t| {
            let range = t.range();
            TextSlot {
                qname: qualified_name(&xml[range.clone()]),
                range,
                text: t.text().unwrap_or_default().to_string(),
                dirty: false,
            }
        })
        .collect();
    Run { slots }
}

/// Parse the table structure of a `document.xml` part.
///
/// Every `<w:tbl>` is collected in document order, nested tables included.
pub(crate) fn parse_document(xml: &str) -> Result<(Layout, Vec<Paragraph>)> {
    let doc = roxmltree::Document::parse(xml)?;
    let mut builder = LayoutBuilder::default();
    for tbl in doc.descendants().filter(|n| is_w(n, "tbl")) {
        builder.add_table(xml, tbl);
    }
    Ok((builder.layout, builder.paragraphs))
}

/// XML 1.0 `Char`: anything else cannot appear in the part, escaped or not.
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

fn escape_xml_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn write_text_element(out: &mut String, qname: &str, text: &str) {
    out.push('<');
    out.push_str(qname);
    out.push_str(" xml:space=\"preserve\">");
    out.push_str(&escape_xml_text(text));
    out.push_str("</");
    out.push_str(qname);
    out.push('>');
}

/// Write a slot's text in place of its `<w:t>`.
///
/// Tabs and line breaks become `<w:tab/>` and `<w:br/>` siblings between
/// text elements, and characters XML cannot carry are dropped. An empty
/// slot is written as an empty element.
fn write_slot(out: &mut String, slot: &TextSlot) {
    // "w:t" -> "w:"
    let prefix = slot.qname.strip_suffix('t').unwrap_or_default();
    let mut segment = String::new();
    let mut wrote = false;

    let mut chars = slot.text.chars().filter(|c| is_xml_char(*c)).peekable();
    while let Some(c) = chars.next() {
        let sibling = match c {
            '\t' => "tab",
            '\n' => "br",
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                "br"
            }
            _ => {
                segment.push(c);
                continue;
            }
        };
        if !segment.is_empty() {
            write_text_element(out, &slot.qname, &segment);
            segment.clear();
        }
        out.push('<');
        out.push_str(prefix);
        out.push_str(sibling);
        out.push_str("/>");
        wrote = true;
    }

    if !segment.is_empty() {
        write_text_element(out, &slot.qname, &segment);
    } else if !wrote {
        out.push('<');
        out.push_str(&slot.qname);
        out.push_str("/>");
    }
}

/// Apply every modified text slot to the original XML.
pub(crate) fn render_document(xml: &str, paragraphs: &[Paragraph]) -> String {
    let mut edits: Vec<&TextSlot> = paragraphs
        .iter()
        .flat_map(|p| p.runs.iter())
        .flat_map(|r| r.slots.iter())
        .filter(|s| s.dirty)
        .collect();
    edits.sort_by_key(|s| s.range.start);

    let mut out = String::with_capacity(xml.len());
    let mut cursor = 0;
    for slot in edits {
        out.push_str(&xml[cursor..slot.range.start]);
        write_slot(&mut out, slot);
        cursor = slot.range.end;
    }
    out.push_str(&xml[cursor..]);
    out
}
