//! Table input: header labels, quote-aware row splitting and the two table modes.

use crate::schema::{InventoryItem, INVENTORY_COLUMNS};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableMode {
    /// Free-form rows parsed from normalized model output.
    CsvDerived,
    /// Rows produced from schema-known records.
    Structured,
}

/// A header plus rows, ready for layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInput {
    /// Raw column names, as they appear in the source.
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub mode: TableMode,
}

impl TableInput {
    pub fn csv(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            header,
            rows,
            mode: TableMode::CsvDerived,
        }
    }

    /// Parses normalizer output: the first non-blank line is the header.
    pub fn from_normalized_csv(normalized: &str) -> Self {
        let mut lines = normalized
            .lines()
            .map(|line| line.trim_end_matches('\r').trim())
            .filter(|line| !line.is_empty());

        let header = lines.next().map(split_csv_line).unwrap_or_default();
        let rows = lines.map(split_csv_line).collect();

        Self::csv(header, rows)
    }

    pub fn from_records(items: &[InventoryItem]) -> Self {
        Self {
            header: INVENTORY_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: items.iter().map(InventoryItem::to_row).collect(),
            mode: TableMode::Structured,
        }
    }

    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    pub fn header_labels(&self) -> Vec<String> {
        self.header.iter().map(|h| format_header_label(h)).collect()
    }

    /// Every row conformed to the header width.
    pub fn conformed_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| conform_row(row, self.column_count()))
            .collect()
    }
}

/// `predicted_quantity` -> `Predicted Quantity`.
pub fn format_header_label(raw: &str) -> String {
    raw.trim()
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    let mut label: String = first.to_uppercase().collect();
                    label.push_str(&chars.as_str().to_lowercase());
                    label
                }
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    Outside,
    Inside,
}

/// Splits one already-assembled row. A `"` toggles quoting, commas inside quotes do
/// not split, and an unterminated quote runs to end of line.
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut state = QuoteState::Outside;

    for ch in line.chars() {
        match (ch, state) {
            ('"', QuoteState::Outside) => state = QuoteState::Inside,
            ('"', QuoteState::Inside) => state = QuoteState::Outside,
            (',', QuoteState::Outside) => {
                cells.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    cells.push(current.trim().to_string());

    cells
}

/// Pads with empty cells or drops extras so the row has exactly `width` cells.
pub fn conform_row(row: &[String], width: usize) -> Vec<String> {
    let mut cells: Vec<String> = row.iter().take(width).cloned().collect();
    cells.resize(width, String::new());
    cells
}
