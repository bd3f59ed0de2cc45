use scraper::{ElementRef, Html, Selector};

use crate::error::{PipelineError, Result};
use crate::process::{utils::clean_cell_text, RawTable};

/// Every non-empty `<table>` of the document, in document order.
///
/// The header is the first row made only of `<th>` cells; rows above it
/// (captions, notes) are dropped. A table without such a row uses its first
/// row. `colspan` repeats a cell to the right, `rowspan` carries it down into
/// the following rows, and short rows are padded with empty cells to the
/// table width.
pub fn parse_html_tables(html: &str) -> Vec<RawTable> {
    let tables = Selector::parse("table").expect("CSS selector for tables should be valid");
    let rows = Selector::parse("tr").expect("CSS selector for table rows should be valid");

    let doc = Html::parse_document(html);
    doc.select(&tables)
        .filter_map(|table| {
            let source = own_rows(table, &rows);
            let header = source.iter().position(|r| r.all_th);
            to_raw_table(expand_spans(&source), header)
        })
        .collect()
}

/// Pick table `index`, or fail naming how many tables there were.
pub fn select_table(mut tables: Vec<RawTable>, index: usize) -> Result<RawTable> {
    let found = tables.len();
    if index >= found {
        return Err(PipelineError::SchemaMismatch(format!(
            "table {} requested but the page has {} table(s)",
            index, found
        )));
    }
    Ok(tables.swap_remove(index))
}

struct SourceCell {
    text: String,
    colspan: usize,
    rowspan: usize,
}

struct SourceRow {
    cells: Vec<SourceCell>,
    all_th: bool,
}

fn span(cell: &ElementRef, attr: &str) -> usize {
    cell.value()
        .attr(attr)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(1)
}

/// Rows belonging to `table` itself, skipping rows of nested tables.
fn own_rows(table: ElementRef, rows: &Selector) -> Vec<SourceRow> {
    table
        .select(rows)
        .filter(|tr| {
            tr.ancestors()
                .filter_map(ElementRef::wrap)
                .find(|e| e.value().name() == "table")
                .map(|e| e.id() == table.id())
                .unwrap_or(false)
        })
        .map(|tr| {
            let elements: Vec<ElementRef> = tr
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|c| matches!(c.value().name(), "th" | "td"))
                .collect();
            SourceRow {
                all_th: elements.iter().all(|c| c.value().name() == "th"),
                cells: elements
                    .iter()
                    .map(|c| SourceCell {
                        text: clean_cell_text(&c.text().collect::<String>()),
                        colspan: span(c, "colspan"),
                        rowspan: span(c, "rowspan"),
                    })
                    .collect(),
            }
        })
        .filter(|row| !row.cells.is_empty())
        .collect()
}

/// Lay source cells out on a rectangular-ish grid.
fn expand_spans(rows: &[SourceRow]) -> Vec<Vec<String>> {
    // per column: (text, rows still to fill)
    let mut carry: Vec<Option<(String, usize)>> = Vec::new();
    let mut grid = Vec::with_capacity(rows.len());

    for row in rows {
        let mut out: Vec<String> = Vec::new();
        let mut cells = row.cells.iter();
        loop {
            let col = out.len();
            if let Some(slot) = carry.get_mut(col) {
                if let Some((text, left)) = slot.as_mut() {
                    out.push(text.clone());
                    *left -= 1;
                    if *left == 0 {
                        *slot = None;
                    }
                    continue;
                }
            }
            match cells.next() {
                Some(cell) => {
                    for _ in 0..cell.colspan {
                        let c = out.len();
                        if cell.rowspan > 1 {
                            if carry.len() <= c {
                                carry.resize(c + 1, None);
                            }
                            carry[c] = Some((cell.text.clone(), cell.rowspan - 1));
                        } else if let Some(slot) = carry.get_mut(c) {
                            // the colspan takes this row from the carried cell
                            if let Some((_, left)) = slot.as_mut() {
                                *left -= 1;
                                if *left == 0 {
                                    *slot = None;
                                }
                            }
                        }
                        out.push(cell.text.clone());
                    }
                }
                // nothing left in this row, but a cell further right is still carried
                None if carry.iter().skip(col).any(Option::is_some) => out.push(String::new()),
                None => break,
            }
        }
        grid.push(out);
    }
    grid
}

/// `header` is the grid position of the header row; `None` means the first row.
fn to_raw_table(mut grid: Vec<Vec<String>>, header: Option<usize>) -> Option<RawTable> {
    if grid.is_empty() {
        return None;
    }
    let width = grid.iter().map(Vec::len).max().unwrap_or(0);
    for row in grid.iter_mut() {
        row.resize(width, String::new());
    }
    let mut rows = grid.split_off(header.unwrap_or(0));
    let headers = rows.remove(0);
    Some(RawTable::new(headers, rows))
}
