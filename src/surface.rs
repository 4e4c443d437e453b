//! The drawing contract between the layout engine and a document writer.
//!
//! Style state is explicit: a [`GraphicsStack`] owned by the caller resolves every
//! color, stroke width and font before a [`DrawOp`] is handed to the surface, so
//! surfaces never carry ambient fill/stroke/font state between calls.

use crate::error::Result;
use crate::metrics::{get_metrics, FontSpec};
use crate::style::{Color, TextAlign};
use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

/// Horizontal two-stop gradient across a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearGradient {
    pub start: Color,
    pub end: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub origin: Point,
    /// Box the text is aligned (and wrapped) within.
    pub width: f32,
    pub align: TextAlign,
    pub font: FontSpec,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    FillGradient {
        rect: Rect,
        gradient: LinearGradient,
    },
    StrokeRect {
        rect: Rect,
        color: Color,
        line_width: f32,
    },
    Line {
        from: Point,
        to: Point,
        color: Color,
        line_width: f32,
    },
    Text(TextRun),
}

/// Paginated canvas with text measurement.
///
/// Measurement returns `None` when the surface cannot measure the text (for example
/// an unsupported glyph); callers treat that as zero.
pub trait RenderSurface {
    fn page_size(&self) -> PageSize;

    fn measure_width(&self, text: &str, font: &FontSpec) -> Option<f32>;

    fn measure_height(&self, text: &str, font: &FontSpec, width: f32) -> Option<f32>;

    /// Starts a new page; subsequent draws land on it.
    fn begin_page(&mut self);

    fn draw(&mut self, op: DrawOp);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphicsState {
    pub fill: Color,
    pub stroke: Color,
    pub line_width: f32,
    pub font: FontSpec,
}

impl GraphicsState {
    pub fn new(font: FontSpec) -> Self {
        Self {
            fill: Color::BLACK,
            stroke: Color::BLACK,
            line_width: 1.0,
            font,
        }
    }
}

/// Save/restore stack over [`GraphicsState`]. Draw helpers read the current state
/// and emit fully-resolved ops.
#[derive(Debug, Clone)]
pub struct GraphicsStack {
    current: GraphicsState,
    saved: Vec<GraphicsState>,
}

impl GraphicsStack {
    pub fn new(initial: GraphicsState) -> Self {
        Self {
            current: initial,
            saved: Vec::new(),
        }
    }

    pub fn current(&self) -> &GraphicsState {
        &self.current
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn save(&mut self) {
        self.saved.push(self.current);
    }

    pub fn restore(&mut self) {
        match self.saved.pop() {
            Some(state) => self.current = state,
            None => warn!("Graphics state restore without matching save"),
        }
    }

    pub fn set_fill(&mut self, color: Color) -> &mut Self {
        self.current.fill = color;
        self
    }

    pub fn set_stroke(&mut self, color: Color, line_width: f32) -> &mut Self {
        self.current.stroke = color;
        self.current.line_width = line_width;
        self
    }

    pub fn set_font(&mut self, font: FontSpec) -> &mut Self {
        self.current.font = font;
        self
    }

    pub fn fill_gradient(
        &self,
        surface: &mut dyn RenderSurface,
        rect: Rect,
        gradient: LinearGradient,
    ) {
        surface.draw(DrawOp::FillGradient { rect, gradient });
    }

    pub fn stroke_rect(&self, surface: &mut dyn RenderSurface, rect: Rect) {
        surface.draw(DrawOp::StrokeRect {
            rect,
            color: self.current.stroke,
            line_width: self.current.line_width,
        });
    }

    pub fn line(&self, surface: &mut dyn RenderSurface, from: Point, to: Point) {
        surface.draw(DrawOp::Line {
            from,
            to,
            color: self.current.stroke,
            line_width: self.current.line_width,
        });
    }

    pub fn text(
        &self,
        surface: &mut dyn RenderSurface,
        text: &str,
        origin: Point,
        width: f32,
        align: TextAlign,
    ) {
        surface.draw(DrawOp::Text(TextRun {
            text: text.to_string(),
            origin,
            width,
            align,
            font: self.current.font,
            color: self.current.fill,
        }));
    }
}

/// Width of `text`, with measurement failures and non-finite results as zero.
pub fn width_or_zero(surface: &dyn RenderSurface, text: &str, font: &FontSpec) -> f32 {
    finite_or_zero(surface.measure_width(text, font), text)
}

/// Wrapped height of `text`, with measurement failures and non-finite results as zero.
pub fn height_or_zero(
    surface: &dyn RenderSurface,
    text: &str,
    font: &FontSpec,
    width: f32,
) -> f32 {
    finite_or_zero(surface.measure_height(text, font, width), text)
}

fn finite_or_zero(measured: Option<f32>, text: &str) -> f32 {
    match measured {
        Some(value) if value.is_finite() && value >= 0.0 => value,
        _ => {
            log::debug!("Text measurement failed for {:?}; using zero", text);
            0.0
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &TextRun> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text(run) => Some(run),
            _ => None,
        })
    }
}

/// In-memory surface that records the draw instruction stream page by page and
/// measures with the static Helvetica tables.
///
/// Starts with one open page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingSurface {
    size: PageSize,
    pages: Vec<Page>,
}

impl RecordingSurface {
    pub fn new(size: PageSize) -> Self {
        Self {
            size,
            pages: vec![Page::default()],
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn op_count(&self) -> usize {
        self.pages.iter().map(|p| p.ops.len()).sum()
    }

    /// The instruction stream as JSON for an external document writer.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.pages)?)
    }

    fn is_measurable(text: &str) -> bool {
        !text
            .chars()
            .any(|c| c.is_control() && c != '\n' && c != '\t')
    }
}

impl RenderSurface for RecordingSurface {
    fn page_size(&self) -> PageSize {
        self.size
    }

    fn measure_width(&self, text: &str, font: &FontSpec) -> Option<f32> {
        if !Self::is_measurable(text) {
            return None;
        }
        Some(get_metrics(font.face).measure_str(text, font.size))
    }

    fn measure_height(&self, text: &str, font: &FontSpec, width: f32) -> Option<f32> {
        if !Self::is_measurable(text) {
            return None;
        }
        let lines = get_metrics(font.face).wrapped_lines(text, font.size, width);
        Some(lines as f32 * font.line_height())
    }

    fn begin_page(&mut self) {
        self.pages.push(Page::default());
    }

    fn draw(&mut self, op: DrawOp) {
        match self.pages.last_mut() {
            Some(page) => page.ops.push(op),
            None => self.pages.push(Page { ops: vec![op] }),
        }
    }
}
