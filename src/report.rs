//! Forecast responses and the full report page sequence built around the table.

use crate::config::LayoutConfig;
use crate::layout::{RenderSummary, TableLayout};
use crate::metrics::FontSpec;
use crate::normalizer::normalize_forecast_csv;
use crate::style::{Color, TextAlign};
use crate::surface::{height_or_zero, GraphicsStack, GraphicsState, Point, Rect, RenderSurface};
use crate::table::TableInput;
use chrono::{Local, NaiveDateTime};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const NO_DATA: &str = "No data available";

static CSV_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```csv\r?\n([\s\S]*?)\r?\n```").unwrap());
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*]+)\*").unwrap());
static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"#{1,6}\s?([^#\n]+)").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap());

/// Model output split into its narrative and the fenced CSV block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub narrative: String,
    pub forecast_csv: Option<String>,
}

impl ForecastResponse {
    /// Takes the first ```` ```csv ```` fenced block as the forecast data. The
    /// narrative is everything else, trimmed.
    pub fn parse(raw: &str) -> Self {
        let Some(caps) = CSV_BLOCK.captures(raw) else {
            debug!("Response has no csv block");
            return Self {
                narrative: raw.trim().to_string(),
                forecast_csv: None,
            };
        };

        // Group 0 always exists on a match.
        let block = caps.get(0).map_or(0..0, |m| m.range());
        let narrative = format!("{}{}", &raw[..block.start], &raw[block.end..]);
        let forecast_csv = caps
            .get(1)
            .map(|m| m.as_str().to_string())
            .filter(|csv| !csv.trim().is_empty());

        Self {
            narrative: narrative.trim().to_string(),
            forecast_csv,
        }
    }
}

/// Strips bold, italic and heading markers and reduces links to their text.
pub fn clean_markdown(text: &str) -> String {
    let cleaned = BOLD.replace_all(text, "$1");
    let cleaned = ITALIC.replace_all(&cleaned, "$1");
    let cleaned = HEADING.replace_all(&cleaned, "$1");
    let cleaned = LINK.replace_all(&cleaned, "$1");

    match cleaned.trim() {
        "" => NO_DATA.to_string(),
        trimmed => trimmed.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportOutcome {
    pub pages: usize,
    pub table: Option<RenderSummary>,
    /// Why the data section was left out, when the table failed validation.
    pub table_error: Option<String>,
}

pub struct ReportComposer {
    config: LayoutConfig,
}

impl ReportComposer {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn compose_now(
        &self,
        response: &ForecastResponse,
        surface: &mut dyn RenderSurface,
    ) -> ReportOutcome {
        self.compose(response, surface, Local::now().naive_local())
    }

    /// Draws the title block and narrative, then the data table on a page of its own.
    ///
    /// A table that fails validation is left out; the narrative pages are kept and
    /// the error is reported in the outcome.
    pub fn compose(
        &self,
        response: &ForecastResponse,
        surface: &mut dyn RenderSurface,
        generated_at: NaiveDateTime,
    ) -> ReportOutcome {
        let theme = &self.config.report;
        let page = surface.page_size();
        let margin = self.config.page.margin;
        let area = Rect::new(
            margin,
            margin,
            page.width - 2.0 * margin,
            page.height - 2.0 * margin,
        );

        let body = FontSpec::regular(theme.body_font_size);
        let heading = FontSpec::bold(theme.heading_font_size);
        let mut gs = GraphicsStack::new(GraphicsState::new(body));
        let mut pages = 1;
        let mut y = area.y;

        let title = FontSpec::bold(theme.title_font_size);
        y = self.heading_line(
            &mut gs,
            surface,
            &theme.title,
            title,
            theme.accent,
            TextAlign::Center,
            area,
            y,
        );

        let stamp = format!(
            "Generated on: {}",
            generated_at.format("%A, %B %-d, %Y %I:%M %p")
        );
        y = self.heading_line(
            &mut gs,
            surface,
            &stamp,
            body,
            theme.muted,
            TextAlign::Center,
            area,
            y,
        );

        gs.save();
        gs.set_stroke(Color::BLACK, 1.0);
        gs.line(
            surface,
            Point::new(area.x, y),
            Point::new(area.x + area.width, y),
        );
        gs.restore();
        y += theme.spacing;

        y = self.heading_line(
            &mut gs,
            surface,
            &theme.analysis_heading,
            heading,
            theme.accent,
            TextAlign::Left,
            area,
            y,
        );

        let narrative = clean_markdown(&response.narrative);
        gs.save();
        gs.set_fill(Color::BLACK).set_font(body);
        for paragraph in narrative.lines().map(str::trim) {
            if paragraph.is_empty() {
                y += body.line_height();
                continue;
            }
            let height = height_or_zero(&*surface, paragraph, &body, area.width)
                .max(body.line_height());
            if y + height > area.bottom() && y > area.y {
                surface.begin_page();
                pages += 1;
                y = area.y;
            }
            gs.text(
                surface,
                paragraph,
                Point::new(area.x, y),
                area.width,
                TextAlign::Left,
            );
            y += height;
        }
        gs.restore();

        let Some(csv) = response.forecast_csv.as_deref() else {
            info!("Composed report without forecast data on {} page(s)", pages);
            return ReportOutcome {
                pages,
                table: None,
                table_error: None,
            };
        };

        let input = TableInput::from_normalized_csv(&normalize_forecast_csv(csv));
        let layout = match TableLayout::build(&input, &*surface, &self.config) {
            Ok(layout) => layout,
            Err(e) => {
                warn!("Leaving forecast table out of the report: {}", e);
                return ReportOutcome {
                    pages,
                    table: None,
                    table_error: Some(e.to_string()),
                };
            }
        };

        surface.begin_page();
        pages += 1;
        let y = self.heading_line(
            &mut gs,
            surface,
            &theme.data_heading,
            heading,
            theme.accent,
            TextAlign::Left,
            area,
            area.y,
        );
        let summary = layout.paint(surface, y);
        pages += summary.new_pages;

        info!(
            "Composed report with {} forecast rows on {} page(s)",
            summary.rows_drawn, pages
        );
        ReportOutcome {
            pages,
            table: Some(summary),
            table_error: None,
        }
    }

    /// Draws one line of text in its own graphics state and returns the next cursor.
    #[allow(clippy::too_many_arguments)]
    fn heading_line(
        &self,
        gs: &mut GraphicsStack,
        surface: &mut dyn RenderSurface,
        text: &str,
        font: FontSpec,
        color: Color,
        align: TextAlign,
        area: Rect,
        y: f32,
    ) -> f32 {
        gs.save();
        gs.set_fill(color).set_font(font);
        gs.text(surface, text, Point::new(area.x, y), area.width, align);
        gs.restore();
        y + font.line_height() + self.config.report.spacing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageSetup;
    use crate::surface::RecordingSurface;
    use chrono::NaiveDate;

    const RAW: &str = "## Summary\nDemand for **Widget** rises in August.\n\n```csv\ndate,product,predicted_quantity,confidence_level\n2023-08-01,SKU001,120,high\n2023-08-02,SKU002,80,low\n```\nSee [the dashboard](https://example.com) for details.";

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 8, 3)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_extracts_csv_block() {
        let response = ForecastResponse::parse(RAW);
        let csv = response.forecast_csv.unwrap();
        assert!(csv.starts_with("date,product"));
        assert!(csv.ends_with("2023-08-02,SKU002,80,low"));
        assert!(!response.narrative.contains("```"));
        assert!(response.narrative.starts_with("## Summary"));
        assert!(response.narrative.ends_with("for details."));
    }

    #[test]
    fn test_parse_without_block() {
        let response = ForecastResponse::parse("  just words \n");
        assert_eq!(response.narrative, "just words");
        assert!(response.forecast_csv.is_none());
    }

    #[test]
    fn test_parse_blank_block_is_absent() {
        let response = ForecastResponse::parse("text\n```csv\n\n```");
        assert!(response.forecast_csv.is_none());
    }

    #[test]
    fn test_clean_markdown() {
        assert_eq!(
            clean_markdown("## Outlook\n**Strong** *steady* [demand](http://x)"),
            "Outlook\nStrong steady demand"
        );
        assert_eq!(clean_markdown(""), NO_DATA);
        assert_eq!(clean_markdown("   "), NO_DATA);
    }

    #[test]
    fn test_compose_full_report() {
        let mut surface = RecordingSurface::new(PageSetup::a4().size());
        let composer = ReportComposer::new(LayoutConfig::default());
        let outcome = composer.compose(
            &ForecastResponse::parse(RAW),
            &mut surface,
            generated_at(),
        );

        assert_eq!(outcome.pages, 2);
        assert_eq!(surface.page_count(), 2);
        assert_eq!(outcome.table.unwrap().rows_drawn, 2);

        let first: Vec<&str> = surface.pages()[0].texts().map(|t| t.text.as_str()).collect();
        assert_eq!(first[0], "NextGen Retail Forecast Report");
        assert_eq!(first[1], "Generated on: Thursday, August 3, 2023 02:05 PM");
        assert_eq!(first[2], "Forecast Analysis");
        assert!(first.contains(&"Demand for Widget rises in August."));

        let second: Vec<&str> = surface.pages()[1].texts().map(|t| t.text.as_str()).collect();
        assert_eq!(second[0], "Forecast Data");
        assert!(second.contains(&"Predicted Quantity"));
    }

    #[test]
    fn test_compose_narrative_only() {
        let mut surface = RecordingSurface::new(PageSetup::a4().size());
        let composer = ReportComposer::new(LayoutConfig::default());
        let outcome = composer.compose(
            &ForecastResponse::parse("No csv today."),
            &mut surface,
            generated_at(),
        );
        assert_eq!(outcome.pages, 1);
        assert!(outcome.table.is_none());
        assert!(outcome.table_error.is_none());
    }

    #[test]
    fn test_long_narrative_flows_onto_new_pages() {
        let mut surface = RecordingSurface::new(PageSetup::a4().size());
        let composer = ReportComposer::new(LayoutConfig::default());
        let narrative = (0..120)
            .map(|i| format!("Observation {i} about seasonal demand."))
            .collect::<Vec<_>>()
            .join("\n");
        let outcome = composer.compose(
            &ForecastResponse::parse(&narrative),
            &mut surface,
            generated_at(),
        );
        assert!(outcome.pages > 1);
        assert_eq!(outcome.pages, surface.page_count());
    }

    #[test]
    fn test_invalid_table_keeps_narrative() {
        let config = LayoutConfig {
            page: PageSetup {
                margin: 400.0,
                ..PageSetup::a4()
            },
            ..LayoutConfig::default()
        };
        let mut surface = RecordingSurface::new(PageSetup::a4().size());
        let outcome = ReportComposer::new(config).compose(
            &ForecastResponse::parse(RAW),
            &mut surface,
            generated_at(),
        );

        assert!(outcome.table.is_none());
        assert!(outcome.table_error.unwrap().contains("Invalid surface"));
        // No data page was opened for the rejected table.
        assert_eq!(outcome.pages, surface.page_count());
        assert!(surface
            .pages()
            .iter()
            .flat_map(|p| p.texts())
            .all(|t| t.text != "Forecast Data"));
    }
}
