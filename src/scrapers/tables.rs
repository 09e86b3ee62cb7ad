//! Locating tables in loosely structured HTML.
//!
//! IBTrACS pages are laid out with nested `<table>` elements and carry few
//! ids, so tables are addressed by their position among all tables that match
//! a selector. A table that is missing is reported as `None`; a table that
//! exists but has no rows is `Some` of an empty matrix.

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

/// Find the `index`-th (zero-based) element matching `selector`, in document order.
///
/// Returns `None` when fewer than `index + 1` elements match.
pub fn nth_table<'a>(
    document: &'a Html,
    selector: &Selector,
    index: usize,
) -> Option<ElementRef<'a>> {
    let tables: Vec<ElementRef<'a>> = document.select(selector).collect();
    if tables.len() <= index {
        warn!(
            found = tables.len(),
            expected = index + 1,
            "Fewer tables than expected on page"
        );
        return None;
    }
    Some(tables[index])
}

/// Text of every element matching `cells` below `element`, trimmed.
pub fn cell_texts(element: ElementRef<'_>, cells: &Selector) -> Vec<String> {
    element.select(cells).map(element_text).collect()
}

/// Collect every `row` of a table as trimmed cell text.
pub fn table_rows(table: ElementRef<'_>, rows: &Selector, cells: &Selector) -> Vec<Vec<String>> {
    table
        .select(rows)
        .map(|row| cell_texts(row, cells))
        .collect()
}

/// Locate the `index`-th matching table and return its rows as text.
pub fn locate_table(
    document: &Html,
    table: &Selector,
    index: usize,
    rows: &Selector,
    cells: &Selector,
) -> Option<Vec<Vec<String>>> {
    nth_table(document, table, index).map(|t| table_rows(t, rows, cells))
}

/// All text below an element, concatenated, with surrounding whitespace stripped.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <table class="a"><tr><td>first</td></tr></table>
          <table class="b">
            <tr><th> Head </th><td>x</td></tr>
            <tr><td>
                 one
            </td><td>two&nbsp;</td></tr>
          </table>
          <table class="b"></table>
        </body></html>"#;

    fn sel(s: &str) -> Selector {
        Selector::parse(s).unwrap()
    }

    #[test]
    fn test_locate_table_by_position() {
        let doc = Html::parse_document(PAGE);
        let rows = locate_table(&doc, &sel("table"), 1, &sel("tr"), &sel("td, th")).unwrap();
        assert_eq!(
            rows,
            vec![
                vec!["Head".to_string(), "x".to_string()],
                vec!["one".to_string(), "two".to_string()],
            ]
        );
    }

    #[test]
    fn test_locate_table_by_attribute() {
        let doc = Html::parse_document(PAGE);
        let rows = locate_table(&doc, &sel("table.a"), 0, &sel("tr"), &sel("td")).unwrap();
        assert_eq!(rows, vec![vec!["first".to_string()]]);
    }

    #[test]
    fn test_missing_table_is_distinct_from_empty_table() {
        let doc = Html::parse_document(PAGE);
        let empty = locate_table(&doc, &sel("table.b"), 1, &sel("tr"), &sel("td")).unwrap();
        assert!(empty.is_empty());
        assert!(locate_table(&doc, &sel("table.b"), 2, &sel("tr"), &sel("td")).is_none());
        assert!(locate_table(&doc, &sel("table"), 3, &sel("tr"), &sel("td")).is_none());
    }

    #[test]
    fn test_cell_selector_limits_cells() {
        let doc = Html::parse_document(PAGE);
        let rows = locate_table(&doc, &sel("table.b"), 0, &sel("tr"), &sel("td")).unwrap();
        assert_eq!(rows[0], vec!["x".to_string()]);
    }
}
