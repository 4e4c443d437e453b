//! Column sizing policies and overflow truncation.

use log::warn;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

pub const ELLIPSIS: &str = "...";

/// Shortening steps tried before switching to the character-count estimate.
const MAX_TRUNCATION_STEPS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnBand {
    pub min: f32,
    pub max: f32,
}

impl ColumnBand {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, width: f32) -> f32 {
        width.clamp(self.min, self.max)
    }
}

/// Bands for the structured inventory table, by column position.
pub const INVENTORY_BANDS: [ColumnBand; 9] = [
    ColumnBand::new(80.0, 150.0), // name
    ColumnBand::new(55.0, 80.0),  // sku
    ColumnBand::new(55.0, 100.0), // category
    ColumnBand::new(40.0, 60.0),  // quantity
    ColumnBand::new(45.0, 65.0),  // threshold
    ColumnBand::new(45.0, 70.0),  // cost
    ColumnBand::new(45.0, 70.0),  // price
    ColumnBand::new(45.0, 80.0),  // status
    ColumnBand::new(60.0, 120.0), // location
];

pub trait ColumnSizingPolicy {
    /// Turns measured natural widths (text plus padding) into final widths.
    fn resolve_widths(&self, natural: &[f32], available: f32) -> Vec<f32>;

    /// Band for a column, if the policy has one.
    fn band(&self, _column: usize) -> Option<ColumnBand> {
        None
    }

    /// Whether cell text wider than its column is cut with an ellipsis.
    fn truncates_overflow(&self) -> bool;
}

/// Widths follow content; the whole table scales down to fit.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentSizing;

impl ColumnSizingPolicy for ContentSizing {
    fn resolve_widths(&self, natural: &[f32], available: f32) -> Vec<f32> {
        let total: f32 = natural.iter().sum();
        if total > available && total > 0.0 {
            let ratio = available / total;
            natural.iter().map(|w| w * ratio).collect()
        } else {
            natural.to_vec()
        }
    }

    fn truncates_overflow(&self) -> bool {
        false
    }
}

/// Content widths clamped into per-column bands; scaling never goes below a band
/// minimum.
#[derive(Debug, Clone)]
pub struct BandedSizing {
    bands: Vec<ColumnBand>,
}

impl BandedSizing {
    pub fn new(bands: Vec<ColumnBand>) -> Self {
        Self { bands }
    }

    pub fn inventory() -> Self {
        Self::new(INVENTORY_BANDS.to_vec())
    }

    pub fn column_count(&self) -> usize {
        self.bands.len()
    }
}

impl ColumnSizingPolicy for BandedSizing {
    fn resolve_widths(&self, natural: &[f32], available: f32) -> Vec<f32> {
        let clamped: Vec<f32> = natural
            .iter()
            .enumerate()
            .map(|(i, w)| match self.bands.get(i) {
                Some(band) => band.clamp(*w),
                None => *w,
            })
            .collect();

        let total: f32 = clamped.iter().sum();
        if total <= available || total <= 0.0 {
            return clamped;
        }

        let ratio = available / total;
        let scaled: Vec<f32> = clamped
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let min = self.bands.get(i).map_or(0.0, |band| band.min);
                (w * ratio).max(min)
            })
            .collect();

        let scaled_total: f32 = scaled.iter().sum();
        if scaled_total > available {
            warn!(
                "Column minimums need {:.1}pt but only {:.1}pt are available",
                scaled_total, available
            );
        }
        scaled
    }

    fn band(&self, column: usize) -> Option<ColumnBand> {
        self.bands.get(column).copied()
    }

    fn truncates_overflow(&self) -> bool {
        true
    }
}

/// Cuts `text` so that `text[..n] + "..."` measures at most `max_width`.
///
/// Shortens one character at a time for a bounded number of steps, then falls back
/// to estimating the kept length from the average character width. The returned stem
/// is always a strict prefix of `text`. When not even the bare ellipsis fits, the
/// result is empty.
pub fn truncate_to_width<'a>(
    text: &'a str,
    max_width: f32,
    measure: impl Fn(&str) -> f32,
) -> Cow<'a, str> {
    if text.is_empty() || measure(text) <= max_width {
        return Cow::Borrowed(text);
    }

    // Byte offsets of every char boundary short of the full string.
    let boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let with_ellipsis = |end: usize| format!("{}{}", &text[..boundaries[end]], ELLIPSIS);
    let fits = |end: usize| measure(&with_ellipsis(end)) <= max_width;
    let clipped = |end: usize| {
        if fits(end) {
            Cow::Owned(with_ellipsis(end))
        } else {
            Cow::Borrowed("")
        }
    };

    let mut keep = boundaries.len().saturating_sub(1);
    for _ in 0..MAX_TRUNCATION_STEPS {
        if keep == 0 {
            return clipped(0);
        }
        if fits(keep) {
            return Cow::Owned(with_ellipsis(keep));
        }
        keep -= 1;
    }

    let char_count = boundaries.len() as f32;
    let average = measure(text) / char_count;
    let budget = (max_width - measure(ELLIPSIS)).max(0.0);
    let estimate = if average > 0.0 {
        (budget / average).floor() as usize
    } else {
        0
    };

    keep = estimate.min(keep);
    while keep > 0 && !fits(keep) {
        keep -= 1;
    }
    clipped(keep)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn per_char(text: &str) -> f32 {
        text.chars().count() as f32 * 5.0
    }

    #[test]
    fn test_content_sizing_keeps_fitting_widths() {
        let widths = ContentSizing.resolve_widths(&[50.0, 60.0], 200.0);
        assert_eq!(widths, vec![50.0, 60.0]);
    }

    #[test]
    fn test_content_sizing_scales_proportionally() {
        let widths = ContentSizing.resolve_widths(&[100.0, 300.0], 200.0);
        assert!((widths[0] - 50.0).abs() < 1e-4);
        assert!((widths[1] - 150.0).abs() < 1e-4);
        assert!(!ContentSizing.truncates_overflow());
    }

    #[test]
    fn test_banded_sizing_clamps_into_bands() {
        let policy = BandedSizing::new(vec![ColumnBand::new(40.0, 80.0), ColumnBand::new(30.0, 50.0)]);
        let widths = policy.resolve_widths(&[10.0, 500.0], 1000.0);
        assert_eq!(widths, vec![40.0, 50.0]);
        assert!(policy.truncates_overflow());
    }

    #[test]
    fn test_banded_sizing_never_scales_below_minimum() {
        let policy = BandedSizing::new(vec![ColumnBand::new(60.0, 200.0), ColumnBand::new(10.0, 200.0)]);
        let widths = policy.resolve_widths(&[100.0, 200.0], 150.0);
        // ratio = 0.5 -> 50 is lifted to the 60 minimum, 100 stays.
        assert_eq!(widths, vec![60.0, 100.0]);
    }

    #[test]
    fn test_inventory_bands_cover_schema() {
        assert_eq!(BandedSizing::inventory().column_count(), 9);
        for band in INVENTORY_BANDS {
            assert!(band.min < band.max);
        }
    }

    #[test]
    fn test_truncate_short_text_is_untouched() {
        assert_eq!(truncate_to_width("abc", 100.0, per_char), "abc");
    }

    #[test]
    fn test_truncate_adds_ellipsis_and_fits() {
        let out = truncate_to_width("abcdefghij", 35.0, per_char);
        assert_eq!(out, "abcd...");
        assert!(per_char(&out) <= 35.0);
    }

    #[test]
    fn test_truncate_long_text_uses_estimate() {
        let long = "x".repeat(500);
        let out = truncate_to_width(&long, 100.0, per_char);
        assert!(out.ends_with(ELLIPSIS));
        assert!(per_char(&out) <= 100.0);
        let stem = out.trim_end_matches(ELLIPSIS);
        assert!(long.starts_with(stem) && stem.len() < long.len());
        assert_eq!(stem.len(), 17);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let out = truncate_to_width("ééééééééé", 30.0, per_char);
        assert_eq!(out, "ééé...");
    }

    #[test]
    fn test_truncate_bare_ellipsis_when_it_just_fits() {
        // "..." is 15 wide here.
        let out = truncate_to_width("abcdef", 15.0, per_char);
        assert_eq!(out, ELLIPSIS);
    }

    #[test]
    fn test_truncate_narrower_than_ellipsis_is_empty() {
        assert_eq!(truncate_to_width("abcdef", 14.0, per_char), "");
        assert_eq!(truncate_to_width("abcdef", 1.0, per_char), "");
        assert_eq!(truncate_to_width("5", 0.0, per_char), "");
        assert_eq!(truncate_to_width(&"x".repeat(500), 10.0, per_char), "");
    }
}
