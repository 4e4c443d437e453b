//! # Forecast Report
//!
//! Turns model-generated demand forecasts into paginated table reports.
//!
//! ## Core Concepts
//!
//! - **Normalizer**: rebuilds `date,product,predicted_quantity,confidence_level` rows that
//!   the model broke across lines
//! - **Table layout**: sizes columns, measures rows and paginates them with a repeated
//!   header band on every page
//! - **Render surface**: the drawing contract the layout writes to; [`RecordingSurface`]
//!   records the instruction stream for a document writer
//! - **Structured mode**: schema-known inventory records with per-column width bands and
//!   ellipsis truncation
//!
//! ## Example
//!
//! ```rust,ignore
//! use forecast_report::*;
//!
//! let raw = "2023-08-01\nProductA\n120\nhigh";
//! let csv = format!("date,product,predicted_quantity,confidence_level\n{}",
//!     normalize_forecast_csv(raw));
//!
//! let mut surface = RecordingSurface::new(PageSetup::a4().size());
//! let summary = render_table(&TableInput::from_normalized_csv(&csv), &mut surface).unwrap();
//! assert_eq!(summary.rows_drawn, 1);
//! ```

pub mod config;
pub mod error;
pub mod layout;
pub mod metrics;
pub mod normalizer;
pub mod report;
pub mod schema;
pub mod sizing;
pub mod style;
pub mod surface;
pub mod table;

pub use config::{LayoutConfig, PageSetup, ReportTheme, TableTheme};
pub use error::{ForecastReportError, Result};
pub use layout::{ColumnSpec, PagePlan, PreparedCell, PreparedRow, RenderSummary, TableLayout};
pub use metrics::{get_metrics, FontFace, FontMetricTable, FontSpec};
pub use normalizer::{classify_line, normalize_forecast_csv, LineKind, ROW_ARITY};
pub use report::{clean_markdown, ForecastResponse, ReportComposer, ReportOutcome};
pub use schema::*;
pub use sizing::{
    truncate_to_width, BandedSizing, ColumnBand, ColumnSizingPolicy, ContentSizing, ELLIPSIS,
    INVENTORY_BANDS,
};
pub use style::{CellKind, Color, ConfidenceLevel, TextAlign};
pub use surface::{
    DrawOp, GraphicsStack, GraphicsState, LinearGradient, Page, PageSize, Point, Rect,
    RecordingSurface, RenderSurface, TextRun,
};
pub use table::{conform_row, format_header_label, split_csv_line, TableInput, TableMode};

use log::{debug, info};

/// Renders tables with a fixed [`LayoutConfig`].
pub struct TableRenderer {
    config: LayoutConfig,
}

impl TableRenderer {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Renders with the header band at the top margin of the current page.
    pub fn render(
        &self,
        input: &TableInput,
        surface: &mut dyn RenderSurface,
    ) -> Result<RenderSummary> {
        self.render_at(input, surface, self.config.page.margin)
    }

    pub fn render_at(
        &self,
        input: &TableInput,
        surface: &mut dyn RenderSurface,
        start_y: f32,
    ) -> Result<RenderSummary> {
        debug!(
            "Rendering {:?} table with {} columns and {} rows at y={}",
            input.mode,
            input.column_count(),
            input.rows.len(),
            start_y
        );

        let layout = TableLayout::build(input, &*surface, &self.config)?;
        let summary = layout.paint(surface, start_y);

        if summary.placeholder {
            info!("Table has no data rows; drew placeholder");
        }
        Ok(summary)
    }
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

/// Renders `input` with the default layout at the top of the current page.
pub fn render_table(
    input: &TableInput,
    surface: &mut impl RenderSurface,
) -> Result<RenderSummary> {
    TableRenderer::default().render(input, surface)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORECAST: &str = "date,product,predicted_quantity,confidence_level\n\
        2023-08-01,SKU001,120,high\n\
        2023-08-02,Blue Widget,80,Medium\n\
        2023-08-03,sku003,15.5,low";

    fn a4_surface() -> RecordingSurface {
        RecordingSurface::new(PageSetup::a4().size())
    }

    #[test]
    fn test_end_to_end_render() {
        let mut surface = a4_surface();
        let input = TableInput::from_normalized_csv(FORECAST);
        let summary = render_table(&input, &mut surface).unwrap();

        assert_eq!(summary.pages, 1);
        assert_eq!(summary.rows_drawn, 3);
        assert_eq!(summary.page_rows, vec![0..3]);
        assert!(!summary.placeholder);

        let texts: Vec<&str> = surface.pages()[0].texts().map(|t| t.text.as_str()).collect();
        assert_eq!(
            &texts[..4],
            &["Date", "Product", "Predicted Quantity", "Confidence Level"]
        );
        assert_eq!(texts.len(), 4 + 3 * 4);
    }

    #[test]
    fn test_cell_alignment_and_level_colors() {
        let mut surface = a4_surface();
        render_table(&TableInput::from_normalized_csv(FORECAST), &mut surface).unwrap();
        let theme = TableTheme::default();

        for run in surface.pages()[0].texts().skip(4) {
            let expected = match run.text.as_str() {
                "high" | "Medium" | "low" => TextAlign::Center,
                "SKU001" | "sku003" | "Blue Widget" => TextAlign::Left,
                _ => TextAlign::Right,
            };
            assert_eq!(run.align, expected, "alignment of {}", run.text);
        }

        let color_of = |text: &str| {
            surface.pages()[0]
                .texts()
                .find(|t| t.text == text)
                .map(|t| t.color)
                .unwrap()
        };
        assert_eq!(color_of("high"), theme.high_color);
        assert_eq!(color_of("Medium"), theme.medium_color);
        assert_eq!(color_of("low"), theme.low_color);
        assert_eq!(color_of("120"), theme.text);
    }

    #[test]
    fn test_level_word_in_any_column() {
        let mut surface = a4_surface();
        let input = TableInput::from_normalized_csv("status,note\nLOW,fine");
        render_table(&input, &mut surface).unwrap();
        let run = surface.pages()[0]
            .texts()
            .find(|t| t.text == "LOW")
            .unwrap();
        assert_eq!(run.align, TextAlign::Center);
        assert_eq!(run.color, TableTheme::default().low_color);
    }

    #[test]
    fn test_render_at_offset() {
        let mut surface = a4_surface();
        let renderer = TableRenderer::default();
        let summary = renderer
            .render_at(&TableInput::from_normalized_csv(FORECAST), &mut surface, 300.0)
            .unwrap();
        assert!(summary.end_y > 300.0);
        match &surface.pages()[0].ops[0] {
            DrawOp::FillGradient { rect, .. } => assert_eq!(rect.y, 300.0),
            other => panic!("unexpected first op {:?}", other),
        }
    }

    #[test]
    fn test_failed_render_draws_nothing() {
        let mut surface = RecordingSurface::new(PageSize {
            width: 80.0,
            height: 80.0,
        });
        let result = render_table(&TableInput::from_normalized_csv(FORECAST), &mut surface);
        assert!(matches!(result, Err(ForecastReportError::InvalidSurface { .. })));
        assert_eq!(surface.op_count(), 0);
        assert_eq!(surface.page_count(), 1);
    }
}
