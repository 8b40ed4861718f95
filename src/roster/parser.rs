//! Roster table extraction.
//!
//! A roster page holds one `table.items` with a row per player. Every `th`/`td`
//! below a row is collected in document order (nested tables included), and
//! the name and value are read from fixed cell positions.

use crate::config::ParserConfig;
use crate::error::{ParseError, RowError};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

/// One extracted row, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
    pub name: String,
    pub raw_value: String,
}

impl RosterRow {
    /// Pick the named fields out of a row's cell texts.
    pub fn from_cells(cells: &[String], layout: &RowLayout) -> Result<Self, RowError> {
        let name = cells
            .get(layout.name_cell)
            .filter(|s| !s.is_empty())
            .ok_or(RowError::MissingField {
                field: "name",
                position: layout.name_cell,
                available: cells.len(),
            })?;
        let raw_value = cells.get(layout.value_cell).ok_or(RowError::MissingField {
            field: "value",
            position: layout.value_cell,
            available: cells.len(),
        })?;

        Ok(Self {
            name: name.clone(),
            raw_value: raw_value.clone(),
        })
    }
}

/// Cell positions of the fields inside a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLayout {
    pub name_cell: usize,
    pub value_cell: usize,
}

/// Result of parsing one page.
#[derive(Debug, Clone, Default)]
pub struct ParsedRoster {
    pub rows: Vec<RosterRow>,
    /// Rows that matched the selector but lacked a field.
    pub skipped_rows: usize,
}

impl ParsedRoster {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Extracts player rows from roster markup.
#[derive(Debug, Clone)]
pub struct RosterParser {
    row_selector: Selector,
    row_selector_src: String,
    cell_selector: Selector,
    layout: RowLayout,
}

impl RosterParser {
    /// Build a parser from configuration, validating the row selector.
    pub fn new(config: &ParserConfig) -> Result<Self, ParseError> {
        let row_selector = compile(&config.row_selector)?;
        let cell_selector = compile("th, td")?;

        Ok(Self {
            row_selector,
            row_selector_src: config.row_selector.clone(),
            cell_selector,
            layout: RowLayout {
                name_cell: config.name_cell,
                value_cell: config.value_cell,
            },
        })
    }

    /// Parse a page. Never fails; an absent table yields an empty roster.
    pub fn parse(&self, markup: &str) -> ParsedRoster {
        let document = Html::parse_document(markup);
        let mut parsed = ParsedRoster::default();

        for (index, row) in document.select(&self.row_selector).enumerate() {
            let cells = self.cell_texts(row);
            match RosterRow::from_cells(&cells, &self.layout) {
                Ok(roster_row) => parsed.rows.push(roster_row),
                Err(e) => {
                    debug!("Skipping roster row {}: {}", index, e);
                    parsed.skipped_rows += 1;
                }
            }
        }

        if parsed.skipped_rows > 0 {
            warn!(
                "Skipped {} malformed roster rows ({} kept)",
                parsed.skipped_rows,
                parsed.rows.len()
            );
        }

        parsed
    }

    /// Selector source, for error messages.
    pub fn row_selector(&self) -> &str {
        &self.row_selector_src
    }

    fn cell_texts(&self, row: ElementRef<'_>) -> Vec<String> {
        row.select(&self.cell_selector).map(cell_text).collect()
    }
}

/// Text of a cell: every text fragment trimmed, then concatenated.
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn compile(selector: &str) -> Result<Selector, ParseError> {
    Selector::parse(selector).map_err(|e| ParseError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}
