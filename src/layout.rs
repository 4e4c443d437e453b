//! Table layout and pagination.
//!
//! Rendering is split in two phases. [`TableLayout::build`] validates the input and
//! surface, sizes columns, truncates or measures every cell and resolves every row
//! height; it is the only fallible step and draws nothing. [`TableLayout::paint`]
//! then walks the page plan and emits draw ops in strict top-to-bottom,
//! left-to-right order. A rejected table therefore never leaves partial content on
//! the surface.

use crate::config::{LayoutConfig, TableTheme};
use crate::error::{ForecastReportError, Result};
use crate::sizing::{truncate_to_width, BandedSizing, ColumnBand, ColumnSizingPolicy, ContentSizing};
use crate::style::{CellKind, TextAlign};
use crate::surface::{
    height_or_zero, width_or_zero, GraphicsStack, GraphicsState, Point, Rect, RenderSurface,
};
use crate::table::{TableInput, TableMode};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub x: f32,
    pub width: f32,
    /// Only set for structured tables.
    pub band: Option<ColumnBand>,
}

impl ColumnSpec {
    /// Width left for text after horizontal padding.
    pub fn text_width(&self, padding: f32) -> f32 {
        (self.width - 2.0 * padding).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedCell {
    /// Text as drawn, possibly truncated.
    pub text: String,
    pub kind: CellKind,
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedRow {
    pub cells: Vec<PreparedCell>,
    pub height: f32,
}

/// Which rows land on one page and where the header band sits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagePlan {
    pub rows: Range<usize>,
    pub header_y: f32,
    /// The page was begun by the table rather than already open.
    pub new_page: bool,
    /// Carries the continuation label above the header.
    pub continued: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSummary {
    /// Pages the table occupies, counting the one it started on.
    pub pages: usize,
    /// Pages the table began itself.
    pub new_pages: usize,
    pub rows_drawn: usize,
    /// Row indices drawn on each page, in page order.
    pub page_rows: Vec<Range<usize>>,
    /// Cursor position below the last drawn element.
    pub end_y: f32,
    /// The no-data placeholder was drawn instead of a table.
    pub placeholder: bool,
}

#[derive(Debug, Clone)]
pub struct TableLayout {
    mode: TableMode,
    labels: Vec<String>,
    columns: Vec<ColumnSpec>,
    rows: Vec<PreparedRow>,
    theme: TableTheme,
    /// Usable page area inside the margins.
    area: Rect,
    label_height: f32,
}

impl TableLayout {
    pub fn build(
        input: &TableInput,
        surface: &dyn RenderSurface,
        config: &LayoutConfig,
    ) -> Result<Self> {
        config.validate()?;

        let page = surface.page_size();
        let margin = config.page.margin;
        let area = Rect::new(
            margin,
            margin,
            page.width - 2.0 * margin,
            page.height - 2.0 * margin,
        );
        let usable = |v: f32| v.is_finite() && v > 0.0;
        if !usable(area.width) || !usable(area.height) {
            return Err(ForecastReportError::InvalidSurface {
                width: area.width,
                height: area.height,
            });
        }

        if input.header.is_empty() && !input.rows.is_empty() {
            return Err(ForecastReportError::EmptyHeader {
                rows: input.rows.len(),
            });
        }

        let policy: Box<dyn ColumnSizingPolicy> = match input.mode {
            TableMode::CsvDerived => Box::new(ContentSizing),
            TableMode::Structured => {
                let banded = BandedSizing::inventory();
                if banded.column_count() != input.column_count() {
                    return Err(ForecastReportError::ColumnCountMismatch {
                        expected: banded.column_count(),
                        actual: input.column_count(),
                    });
                }
                Box::new(banded)
            }
        };

        let theme = config.table.clone();
        let labels = input.header_labels();
        let cells = input.conformed_rows();

        let columns = resolve_columns(
            surface,
            &theme,
            policy.as_ref(),
            &labels,
            &cells,
            area,
        );

        let rows = cells
            .iter()
            .map(|row| prepare_row(surface, &theme, policy.as_ref(), &columns, row))
            .collect();

        let label_font = theme.label_font();
        let label_height = height_or_zero(
            surface,
            &theme.continuation_label,
            &label_font,
            area.width,
        )
        .max(label_font.line_height());

        debug!(
            "Laid out {:?} table: {} columns, {} rows",
            input.mode,
            columns.len(),
            cells.len()
        );

        Ok(Self {
            mode: input.mode,
            labels,
            columns,
            rows,
            theme,
            area,
            label_height,
        })
    }

    pub fn mode(&self) -> TableMode {
        self.mode
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn rows(&self) -> &[PreparedRow] {
        &self.rows
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Splits rows into pages for a table whose header starts at `start_y`.
    ///
    /// A row is never split. A page break happens before a row whose bottom would
    /// pass the usable area, unless it is the first row on its page. When the header
    /// and first row do not fit below `start_y`, the table starts on a new page.
    pub fn paginate(&self, start_y: f32) -> Vec<PagePlan> {
        let top = self.area.y;
        let bottom = self.area.bottom();
        let header_height = self.theme.header_height;

        let Some(first) = self.rows.first() else {
            return Vec::new();
        };

        let mut plans = Vec::new();
        let mut new_page = false;
        let mut header_y = start_y;
        if start_y > top && start_y + header_height + first.height > bottom {
            new_page = true;
            header_y = top;
        }

        let mut continued = false;
        let mut page_start = 0;
        let mut y = header_y + header_height;

        for (i, row) in self.rows.iter().enumerate() {
            if i > page_start && y + row.height > bottom {
                plans.push(PagePlan {
                    rows: page_start..i,
                    header_y,
                    new_page,
                    continued,
                });
                page_start = i;
                new_page = true;
                continued = true;
                header_y = top + self.label_height + self.theme.label_gap;
                y = header_y + header_height;
            }
            y += row.height;
        }

        plans.push(PagePlan {
            rows: page_start..self.rows.len(),
            header_y,
            new_page,
            continued,
        });
        plans
    }

    /// Draws the table with its header band at `start_y` on the current page.
    pub fn paint(&self, surface: &mut dyn RenderSurface, start_y: f32) -> RenderSummary {
        let mut gs = GraphicsStack::new(GraphicsState::new(self.theme.body_font()));

        if self.rows.is_empty() {
            return self.paint_placeholder(&mut gs, surface, start_y);
        }

        let plans = self.paginate(start_y);
        let mut end_y = start_y;

        for plan in &plans {
            if plan.new_page {
                surface.begin_page();
            }
            if plan.continued {
                self.paint_continuation_label(&mut gs, surface);
            }

            self.paint_header(&mut gs, surface, plan.header_y);
            let mut y = plan.header_y + self.theme.header_height;
            for index in plan.rows.clone() {
                self.paint_row(&mut gs, surface, index, y);
                y += self.rows[index].height;
            }
            end_y = y;
        }

        let summary = RenderSummary {
            pages: plans.len(),
            new_pages: plans.iter().filter(|p| p.new_page).count(),
            rows_drawn: self.rows.len(),
            page_rows: plans.into_iter().map(|p| p.rows).collect(),
            end_y,
            placeholder: false,
        };
        info!(
            "Rendered {} table rows across {} page(s)",
            summary.rows_drawn, summary.pages
        );
        summary
    }

    fn paint_placeholder(
        &self,
        gs: &mut GraphicsStack,
        surface: &mut dyn RenderSurface,
        y: f32,
    ) -> RenderSummary {
        gs.save();
        gs.set_fill(self.theme.text).set_font(self.theme.body_font());
        gs.text(
            surface,
            &self.theme.empty_label,
            Point::new(self.area.x, y),
            self.area.width,
            TextAlign::Center,
        );
        let end_y = y + gs.current().font.line_height();
        gs.restore();

        RenderSummary {
            pages: 1,
            new_pages: 0,
            rows_drawn: 0,
            page_rows: Vec::new(),
            end_y,
            placeholder: true,
        }
    }

    fn paint_continuation_label(&self, gs: &mut GraphicsStack, surface: &mut dyn RenderSurface) {
        gs.save();
        gs.set_fill(self.theme.label_color)
            .set_font(self.theme.label_font());
        gs.text(
            surface,
            &self.theme.continuation_label,
            Point::new(self.area.x, self.area.y),
            self.area.width,
            TextAlign::Center,
        );
        gs.restore();
    }

    fn paint_header(&self, gs: &mut GraphicsStack, surface: &mut dyn RenderSurface, y: f32) {
        let theme = &self.theme;
        let band = Rect::new(self.area.x, y, self.area.width, theme.header_height);

        gs.save();
        gs.fill_gradient(surface, band, theme.header_gradient);
        gs.set_stroke(theme.header_border, theme.header_border_width);
        gs.stroke_rect(surface, band);
        gs.set_fill(theme.header_text).set_font(theme.header_font());

        for (i, (column, label)) in self.columns.iter().zip(&self.labels).enumerate() {
            if i > 0 {
                gs.line(
                    surface,
                    Point::new(column.x, y),
                    Point::new(column.x, band.bottom()),
                );
            }
            gs.text(
                surface,
                label,
                Point::new(column.x + theme.cell_padding, y + theme.header_text_offset),
                column.text_width(theme.cell_padding),
                TextAlign::Center,
            );
        }
        gs.restore();
    }

    fn paint_row(
        &self,
        gs: &mut GraphicsStack,
        surface: &mut dyn RenderSurface,
        index: usize,
        y: f32,
    ) {
        let theme = &self.theme;
        let row = &self.rows[index];
        let rect = Rect::new(self.area.x, y, self.area.width, row.height);
        let gradient = if index % 2 == 1 {
            theme.odd_row_gradient
        } else {
            theme.even_row_gradient
        };

        gs.save();
        gs.fill_gradient(surface, rect, gradient);
        gs.set_stroke(theme.row_border, theme.row_border_width);
        gs.stroke_rect(surface, rect);
        gs.set_font(theme.body_font());

        for (i, (column, cell)) in self.columns.iter().zip(&row.cells).enumerate() {
            if i > 0 {
                gs.line(
                    surface,
                    Point::new(column.x, y),
                    Point::new(column.x, rect.bottom()),
                );
            }

            let color = cell
                .kind
                .level()
                .map_or(theme.text, |level| theme.level_color(level));
            gs.save();
            gs.set_fill(color);
            gs.text(
                surface,
                &cell.text,
                Point::new(column.x + theme.cell_padding, y + theme.cell_padding),
                column.text_width(theme.cell_padding),
                cell.kind.alignment(),
            );
            gs.restore();
        }
        gs.restore();
    }
}

fn resolve_columns(
    surface: &dyn RenderSurface,
    theme: &TableTheme,
    policy: &dyn ColumnSizingPolicy,
    labels: &[String],
    rows: &[Vec<String>],
    area: Rect,
) -> Vec<ColumnSpec> {
    let header_font = theme.header_font();
    let body_font = theme.body_font();

    let natural: Vec<f32> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let widest_cell = rows
                .iter()
                .filter_map(|row| row.get(i))
                .map(|cell| width_or_zero(surface, cell, &body_font))
                .fold(0.0_f32, f32::max);
            width_or_zero(surface, label, &header_font).max(widest_cell)
                + 2.0 * theme.cell_padding
        })
        .collect();

    let widths = policy.resolve_widths(&natural, area.width);

    let mut x = area.x;
    widths
        .into_iter()
        .enumerate()
        .map(|(i, width)| {
            let column = ColumnSpec {
                x,
                width,
                band: policy.band(i),
            };
            x += width;
            column
        })
        .collect()
}

fn prepare_row(
    surface: &dyn RenderSurface,
    theme: &TableTheme,
    policy: &dyn ColumnSizingPolicy,
    columns: &[ColumnSpec],
    row: &[String],
) -> PreparedRow {
    let font = theme.body_font();
    let mut height = 0.0_f32;

    let cells = columns
        .iter()
        .zip(row)
        .map(|(column, original)| {
            let text_width = column.text_width(theme.cell_padding);
            let text = if policy.truncates_overflow() {
                truncate_to_width(original, text_width, |s| width_or_zero(surface, s, &font))
                    .into_owned()
            } else {
                original.clone()
            };

            height = height.max(height_or_zero(surface, &text, &font, text_width));

            PreparedCell {
                truncated: text != *original,
                kind: CellKind::detect(original),
                text,
            }
        })
        .collect();

    let height = height + theme.row_padding;
    let height = if height.is_finite() {
        height.max(theme.min_row_height)
    } else {
        theme.min_row_height
    };

    PreparedRow { cells, height }
}
