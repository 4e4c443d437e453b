//! Reassembles forecast rows that the text generator split across physical lines.
//!
//! The generator is prompted for `date,product,predicted_quantity,confidence_level`
//! rows. It regularly wraps them so that each field lands on its own line, or a
//! multi-word product name spans several lines. This is a fixed-arity heuristic for
//! that one row shape, not a general CSV repair: rows are complete once they hold
//! [`ROW_ARITY`] fields, and anything still pending at end of input is dropped.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

/// Number of fields in a forecast row.
pub const ROW_ARITY: usize = 4;

static DATE_FRAGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap());
static SKU_FRAGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^SKU[0-9]+$").unwrap());
static INTEGER_FRAGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());
static LEVEL_FRAGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(low|medium|high)$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// A bare date, SKU, integer or confidence word: exactly one field.
    Fragment,
    /// Already carries a full row.
    Complete,
    /// Words continuing a multi-word field.
    Continuation,
}

pub fn classify_line(line: &str) -> LineKind {
    if DATE_FRAGMENT.is_match(line)
        || SKU_FRAGMENT.is_match(line)
        || INTEGER_FRAGMENT.is_match(line)
        || LEVEL_FRAGMENT.is_match(line)
    {
        LineKind::Fragment
    } else if line.split(',').count() >= ROW_ARITY {
        LineKind::Complete
    } else {
        LineKind::Continuation
    }
}

/// Pending-row buffer. `open` is the multi-word field still receiving words.
#[derive(Debug, Default)]
struct RowAssembler {
    fields: Vec<String>,
    open: Option<String>,
    rows: Vec<String>,
}

impl RowAssembler {
    fn feed(&mut self, line: &str) {
        match classify_line(line) {
            LineKind::Complete => self.rows.push(line.to_string()),
            LineKind::Fragment => {
                self.close_open_field();
                self.push_field(line.to_string());
            }
            LineKind::Continuation => {
                let mut parts = line.split(',');
                if let Some(first) = parts.next() {
                    self.extend_open_field(first);
                }
                for part in parts {
                    self.close_open_field();
                    self.extend_open_field(part);
                }
            }
        }
    }

    fn extend_open_field(&mut self, words: &str) {
        let words = words.trim();
        match self.open.as_mut() {
            Some(open) if !words.is_empty() => {
                if !open.is_empty() {
                    open.push(' ');
                }
                open.push_str(words);
            }
            Some(_) => {}
            None => self.open = Some(words.to_string()),
        }
    }

    fn close_open_field(&mut self) {
        if let Some(open) = self.open.take() {
            self.push_field(open);
        }
    }

    fn push_field(&mut self, field: String) {
        self.fields.push(field);
        if self.fields.len() == ROW_ARITY {
            self.rows.push(self.fields.join(","));
            self.fields.clear();
        }
    }

    fn finish(self) -> Vec<String> {
        let pending = self.fields.len() + usize::from(self.open.is_some());
        if pending > 0 {
            debug!(
                "Dropping incomplete forecast row with {} of {} fields",
                pending, ROW_ARITY
            );
        }
        self.rows
    }
}

/// Repairs line-fragmented forecast CSV into one complete row per line.
///
/// Never fails: malformed input yields fewer rows, and a trailing partial row is
/// discarded. Quotes are left untouched for the table parser.
pub fn normalize_forecast_csv(raw: &str) -> String {
    let mut assembler = RowAssembler::default();

    for line in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
        assembler.feed(line);
    }

    assembler.finish().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_fragments() {
        assert_eq!(classify_line("2023-08-01"), LineKind::Fragment);
        assert_eq!(classify_line("SKU001"), LineKind::Fragment);
        assert_eq!(classify_line("120"), LineKind::Fragment);
        assert_eq!(classify_line("HIGH"), LineKind::Fragment);
        assert_eq!(classify_line("Medium"), LineKind::Fragment);
    }

    #[test]
    fn test_classify_complete_and_continuation() {
        assert_eq!(classify_line("a,b,c,d"), LineKind::Complete);
        assert_eq!(classify_line("a,b,c,d,e"), LineKind::Complete);
        assert_eq!(classify_line("ProductA"), LineKind::Continuation);
        assert_eq!(classify_line("sku001"), LineKind::Continuation);
        assert_eq!(classify_line("a,b"), LineKind::Continuation);
        assert_eq!(classify_line("12.5"), LineKind::Continuation);
    }

    #[test]
    fn test_only_ascii_digits_make_fragments() {
        assert_eq!(classify_line("١٢٠"), LineKind::Continuation);
        assert_eq!(classify_line("٢٠٢٣-٠٨-٠١"), LineKind::Continuation);
        assert_eq!(classify_line("SKU٠٠١"), LineKind::Continuation);

        // Non-ASCII digits join into one open field instead of closing a row.
        let raw = "٢٠٢٣-٠٨-٠١\nWidget\n١٢٠\nhigh";
        assert_eq!(normalize_forecast_csv(raw), "");
    }

    #[test]
    fn test_split_row_is_reassembled() {
        let raw = "2023-08-01\nProductA\n120\nhigh";
        assert_eq!(normalize_forecast_csv(raw), "2023-08-01,ProductA,120,high");
    }

    #[test]
    fn test_complete_rows_pass_through() {
        let raw = "date,product,qty,conf\n2023-08-01,ProductA,120,high";
        assert_eq!(normalize_forecast_csv(raw), raw);
    }

    #[test]
    fn test_whitespace_and_blank_lines_are_trimmed() {
        let raw = "  date,product,qty,conf  \r\n\n\n   2023-08-01,ProductA,120,high\r\n";
        assert_eq!(
            normalize_forecast_csv(raw),
            "date,product,qty,conf\n2023-08-01,ProductA,120,high"
        );
    }

    #[test]
    fn test_multi_word_product_name() {
        let raw = "2023-08-02\nBlue\nWidget\nDeluxe\n95\nmedium";
        assert_eq!(
            normalize_forecast_csv(raw),
            "2023-08-02,Blue Widget Deluxe,95,medium"
        );
    }

    #[test]
    fn test_fragmented_rows_after_header() {
        let raw = "date,product,predicted_quantity,confidence_level\n\
                   2023-08-01\nSKU001\n120\nhigh\n\
                   2023-08-02\nSKU002\n80\nlow";
        assert_eq!(
            normalize_forecast_csv(raw),
            "date,product,predicted_quantity,confidence_level\n\
             2023-08-01,SKU001,120,high\n\
             2023-08-02,SKU002,80,low"
        );
    }

    #[test]
    fn test_partial_comma_line_joins_fragments() {
        let raw = "2023-08-01,SKU001\n120\nhigh";
        assert_eq!(normalize_forecast_csv(raw), "2023-08-01,SKU001,120,high");
    }

    #[test]
    fn test_trailing_partial_row_is_dropped() {
        let raw = "2023-08-01,SKU001,120,high\n2023-08-02\nSKU002";
        assert_eq!(normalize_forecast_csv(raw), "2023-08-01,SKU001,120,high");
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert_eq!(normalize_forecast_csv(""), "");
        assert_eq!(normalize_forecast_csv("\n \n\t\n"), "");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let raw = "date,product,qty,conf\n2023-08-01\nProductA\n120\nhigh\n2023-08-02,ProductB,7,low";
        let once = normalize_forecast_csv(raw);
        assert_eq!(normalize_forecast_csv(&once), once);
    }

    #[test]
    fn test_every_output_line_has_four_fields() {
        let raw = "noise line\n2023-08-01\nSKU9\n3\nlow\nmore, noise\n2023-08-03\nThing\n4\nHIGH\n17";
        let normalized = normalize_forecast_csv(raw);
        for line in normalized.lines() {
            assert_eq!(line.split(',').count(), ROW_ARITY, "line: {line}");
        }
    }
}
