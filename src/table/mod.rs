// src/table/mod.rs
use tracing::debug;

/// A loosely structured grid of cells parsed from a delimited export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Each source row as a Vec of cleaned cell strings, in source order.
    /// Rows are not required to be rectangular.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }
}

const DELIMITER: char = ',';

/// Parse raw delimited text into a [`Table`].
///
/// Lines that are blank after trimming are dropped; everything else is split
/// on the delimiter and cleaned cell by cell. Never fails: malformed lines
/// simply produce shorter rows, which downstream extraction bounds-checks.
///
/// Known limitation kept from the sheet export path: a quoted field that
/// contains the delimiter is split at the delimiter anyway.
pub fn parse_table(raw: &str) -> Table {
    let rows: Vec<Vec<String>> = raw
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split(DELIMITER).map(clean_cell).collect())
        .collect();

    debug!(rows = rows.len(), "parsed table");
    Table { rows }
}

/// Strip one layer of surrounding double quotes if present, then trim
/// surrounding whitespace.
pub fn clean_cell(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };
    unquoted.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_cells_keep_trimmed_inner_value() {
        let table = parse_table("\"  95.5  \",90");
        assert_eq!(table.rows, vec![vec!["95.5".to_string(), "90".to_string()]]);
    }

    #[test]
    fn blank_lines_are_dropped() {
        let table = parse_table("a,b\n\n   \nc,d\n");
        assert_eq!(table.len(), 2);
        assert_eq!(table.row(1).unwrap(), ["c".to_string(), "d".to_string()]);
    }

    #[test]
    fn rows_may_be_ragged() {
        let table = parse_table("a,b,c\nd\ne,f");
        assert_eq!(table.row(0).unwrap().len(), 3);
        assert_eq!(table.row(1).unwrap().len(), 1);
        assert_eq!(table.row(2).unwrap().len(), 2);
    }

    #[test]
    fn empty_input_gives_empty_table() {
        assert!(parse_table("").is_empty());
        assert!(parse_table("\n  \n").is_empty());
    }

    #[test]
    fn clean_cell_strips_one_quote_layer_only() {
        assert_eq!(clean_cell("\"\"x\"\""), "\"x\"");
        assert_eq!(clean_cell("  plain  "), "plain");
        assert_eq!(clean_cell("\"\""), "");
        assert_eq!(clean_cell("\""), "\"");
    }

    #[test]
    fn quoted_field_with_delimiter_splits_anyway() {
        // Documented limitation: the embedded comma ends the cell.
        let table = parse_table("\"1,5\",2");
        assert_eq!(
            table.rows,
            vec![vec!["\"1".to_string(), "5\"".to_string(), "2".to_string()]]
        );
    }
}
