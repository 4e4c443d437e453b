use crate::error::{ForecastReportError, Result};
use crate::metrics::FontSpec;
use crate::style::{Color, ConfidenceLevel};
use crate::surface::{LinearGradient, PageSize};
use serde::{Deserialize, Serialize};

/// Page geometry in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSetup {
    pub width: f32,
    pub height: f32,
    /// Applied on all four sides.
    pub margin: f32,
}

impl PageSetup {
    pub fn a4() -> Self {
        Self {
            width: 595.28,
            height: 841.89,
            margin: 50.0,
        }
    }

    pub fn letter() -> Self {
        Self {
            width: 612.0,
            height: 792.0,
            margin: 50.0,
        }
    }

    pub fn size(&self) -> PageSize {
        PageSize {
            width: self.width,
            height: self.height,
        }
    }
}

impl Default for PageSetup {
    fn default() -> Self {
        Self::a4()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableTheme {
    pub header_height: f32,
    /// Vertical offset of header text inside the band.
    pub header_text_offset: f32,
    pub min_row_height: f32,
    /// Horizontal inset of cell text on each side; also the top inset of row text.
    pub cell_padding: f32,
    /// Added to the tallest wrapped cell when sizing a row.
    pub row_padding: f32,
    pub body_font_size: f32,
    pub header_font_size: f32,
    pub label_font_size: f32,
    /// Space between the continuation label and the header band.
    pub label_gap: f32,

    pub header_gradient: LinearGradient,
    pub header_border: Color,
    pub header_border_width: f32,
    pub header_text: Color,
    pub even_row_gradient: LinearGradient,
    pub odd_row_gradient: LinearGradient,
    pub row_border: Color,
    pub row_border_width: f32,
    pub text: Color,
    pub label_color: Color,
    pub high_color: Color,
    pub medium_color: Color,
    pub low_color: Color,

    pub continuation_label: String,
    pub empty_label: String,
}

impl TableTheme {
    pub fn body_font(&self) -> FontSpec {
        FontSpec::regular(self.body_font_size)
    }

    pub fn header_font(&self) -> FontSpec {
        FontSpec::bold(self.header_font_size)
    }

    pub fn label_font(&self) -> FontSpec {
        FontSpec::bold(self.label_font_size)
    }

    pub fn level_color(&self, level: ConfidenceLevel) -> Color {
        match level {
            ConfidenceLevel::High => self.high_color,
            ConfidenceLevel::Medium => self.medium_color,
            ConfidenceLevel::Low => self.low_color,
        }
    }
}

impl Default for TableTheme {
    fn default() -> Self {
        Self {
            header_height: 25.0,
            header_text_offset: 7.0,
            min_row_height: 20.0,
            cell_padding: 5.0,
            row_padding: 10.0,
            body_font_size: 10.0,
            header_font_size: 10.0,
            label_font_size: 14.0,
            label_gap: 10.0,
            header_gradient: LinearGradient {
                start: Color::rgb(0x00, 0x33, 0x66),
                end: Color::rgb(0x00, 0x66, 0xCC),
            },
            header_border: Color::rgb(0x00, 0x00, 0x33),
            header_border_width: 1.5,
            header_text: Color::WHITE,
            even_row_gradient: LinearGradient {
                start: Color::WHITE,
                end: Color::rgb(0xF8, 0xF8, 0xF8),
            },
            odd_row_gradient: LinearGradient {
                start: Color::rgb(0xF5, 0xF5, 0xF5),
                end: Color::rgb(0xE8, 0xE8, 0xE8),
            },
            row_border: Color::rgb(0xCC, 0xCC, 0xCC),
            row_border_width: 0.5,
            text: Color::BLACK,
            label_color: Color::rgb(0x00, 0x33, 0x66),
            high_color: Color::rgb(0x00, 0x66, 0x00),
            medium_color: Color::rgb(0x99, 0x66, 0x00),
            low_color: Color::rgb(0x99, 0x00, 0x00),
            continuation_label: "Forecast Data (Continued)".to_string(),
            empty_label: "No forecast data available".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportTheme {
    pub title: String,
    pub title_font_size: f32,
    pub heading_font_size: f32,
    pub body_font_size: f32,
    pub accent: Color,
    pub muted: Color,
    pub analysis_heading: String,
    pub data_heading: String,
    /// Vertical gap after each block.
    pub spacing: f32,
}

impl Default for ReportTheme {
    fn default() -> Self {
        Self {
            title: "NextGen Retail Forecast Report".to_string(),
            title_font_size: 24.0,
            heading_font_size: 18.0,
            body_font_size: 12.0,
            accent: Color::rgb(0x00, 0x33, 0x66),
            muted: Color::rgb(0x66, 0x66, 0x66),
            analysis_heading: "Forecast Analysis".to_string(),
            data_heading: "Forecast Data".to_string(),
            spacing: 14.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub page: PageSetup,
    pub table: TableTheme,
    pub report: ReportTheme,
}

impl LayoutConfig {
    /// Loads a possibly partial JSON document over the defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects geometry that would give zero-height rows or draw outside the page.
    pub fn validate(&self) -> Result<()> {
        let page = &self.page;
        let table = &self.table;
        let report = &self.report;

        require_positive("page.width", page.width)?;
        require_positive("page.height", page.height)?;
        require_non_negative("page.margin", page.margin)?;

        require_positive("table.header_height", table.header_height)?;
        require_positive("table.min_row_height", table.min_row_height)?;
        require_non_negative("table.header_text_offset", table.header_text_offset)?;
        require_non_negative("table.cell_padding", table.cell_padding)?;
        require_non_negative("table.row_padding", table.row_padding)?;
        require_non_negative("table.label_gap", table.label_gap)?;
        require_non_negative("table.header_border_width", table.header_border_width)?;
        require_non_negative("table.row_border_width", table.row_border_width)?;
        require_positive("table.body_font_size", table.body_font_size)?;
        require_positive("table.header_font_size", table.header_font_size)?;
        require_positive("table.label_font_size", table.label_font_size)?;

        require_positive("report.title_font_size", report.title_font_size)?;
        require_positive("report.heading_font_size", report.heading_font_size)?;
        require_positive("report.body_font_size", report.body_font_size)?;
        require_non_negative("report.spacing", report.spacing)?;

        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn require_positive(field: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ForecastReportError::InvalidConfig(format!(
            "{} must be positive and finite, got {}",
            field, value
        )))
    }
}

fn require_non_negative(field: &str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ForecastReportError::InvalidConfig(format!(
            "{} must be non-negative and finite, got {}",
            field, value
        )))
    }
}
