//! Deterministic paginator implementing [`LayoutBackend`].
//!
//! Metrics are deliberately simple: every glyph is half an em wide, lines are
//! 1.2 em high, and wrapping is greedy on whitespace. That is enough to make
//! page assignment depend on content the way a real typesetter does, while
//! staying reproducible across runs.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::backend::{Bounds, LayoutBackend, Point, TextStyle};
use crate::config::PaperSize;
use crate::error::Error;

/// Page margin (2 cm) on the top, left, and right edges. The bottom margin
/// is twice this to leave room for the page number.
pub const MARGIN: f32 = 56.693;

/// Line height relative to font size.
const LINE_SPACING: f32 = 1.2;

/// Average glyph width relative to font size.
const GLYPH_WIDTH: f32 = 0.5;

/// Ascender height relative to font size.
const ASCENDER: f32 = 0.8;

/// Slack for float comparisons of accumulated paddings.
const EPSILON: f32 = 0.001;

/// Markup commands with an optional bracketed argument, e.g. `\hyperref[x]`.
#[allow(clippy::expect_used, reason = "pattern is a compile-time constant")]
static COMMAND: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(r"\\[a-zA-Z]+(?:\[[^\]]*\])?").expect("valid regex"));

/// The finished output of one pass.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutDocument {
    /// Named destinations and the page each one points at.
    pub destinations: BTreeMap<String, u32>,
    /// Paper height in points.
    pub height: f32,
    /// Pages in order.
    pub pages: Vec<LayoutPage>,
    /// Paper width in points.
    pub width: f32,
}

impl LayoutDocument {
    /// All text placed on a page, one item per line. Empty for unknown pages.
    pub fn page_text(&self, number: u32) -> String {
        let Some(page) = self.pages.iter().find(|p| return p.number == number) else {
            return String::new();
        };
        let lines: Vec<&str> = page
            .items
            .iter()
            .filter_map(|item| {
                return match item {
                    LayoutItem::Text { text, .. } => Some(text.as_str()),
                    LayoutItem::Circle { .. } | LayoutItem::Line { .. } | LayoutItem::Rectangle { .. } => None,
                };
            })
            .collect();
        return lines.join("\n");
    }

    /// Write the document as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if serialization fails or `Error::Io` if the write fails.
    pub fn write(&self, path: &Path) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        return Ok(());
    }
}

/// One positioned drawing operation, in absolute page coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LayoutItem {
    /// Filled circle.
    Circle {
        /// Centre.
        center: Point,
        /// Radius.
        radius: f32,
    },
    /// Stroked line.
    Line {
        /// Start point.
        from: Point,
        /// End point.
        to: Point,
        /// Stroke width.
        weight: f32,
    },
    /// Filled rectangle.
    Rectangle {
        /// Top-left corner.
        at: Point,
        /// Fill colour as a hex triple.
        color: String,
        /// Height.
        height: f32,
        /// Width.
        width: f32,
    },
    /// A single line of text. `at` is the top of the line box.
    Text {
        /// Position.
        at: Point,
        /// Face and size.
        style: TextStyle,
        /// Backend markup for this line.
        text: String,
    },
}

/// A page of placed items.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutPage {
    /// Page number stamped at the bottom, set by `number_pages`.
    pub footer: Option<String>,
    /// Items in placement order.
    pub items: Vec<LayoutItem>,
    /// 1-based page number.
    pub number: u32,
}

/// In-memory paginator. One instance renders one pass.
#[derive(Debug)]
pub struct PagedLayout {
    /// Index of the page content currently goes to.
    current: usize,
    /// Distance of the cursor from the bottom of the bounds.
    cursor: f32,
    /// Named destinations.
    destinations: BTreeMap<String, u32>,
    /// Paper height.
    height: f32,
    /// Accumulated left indentation.
    padding_left: f32,
    /// Accumulated right indentation.
    padding_right: f32,
    /// All pages laid out so far.
    pages: Vec<LayoutPage>,
    /// Paper width.
    width: f32,
}

impl PagedLayout {
    /// Absolute coordinates of a point inside the current bounds.
    fn absolute(&self, at: Point) -> Point {
        return Point { x: MARGIN + self.padding_left + at.x, y: 2.0 * MARGIN + at.y };
    }

    /// Hand over the laid out pages.
    pub fn finish(self) -> LayoutDocument {
        return LayoutDocument {
            destinations: self.destinations,
            height: self.height,
            pages: self.pages,
            width: self.width,
        };
    }

    /// Full height between the top and bottom margins.
    fn inner_height(&self) -> f32 {
        return self.height - 3.0 * MARGIN;
    }

    /// A paginator for the given paper, positioned at the top of page 1.
    pub fn new(paper: PaperSize) -> Self {
        let (width, height) = paper.dimensions();
        return Self::with_size(width, height);
    }

    /// Place one line at the cursor, breaking the page first if it doesn't fit.
    fn place_line(&mut self, line: &str, style: TextStyle) -> Result<(), Error> {
        if style.size <= 0.0 {
            return Err(Error::Backend { operation: "text", reason: format!("font size {} is not positive", style.size) });
        }
        let line_height = style.size * LINE_SPACING;
        if line_height > self.inner_height() {
            return Err(Error::Backend {
                operation: "text",
                reason: format!("a {line_height}pt line cannot fit on a {}pt page", self.inner_height()),
            });
        }

        if self.cursor - line_height < 0.0 {
            self.start_new_page();
        }
        let at = self.absolute(Point { x: 0.0, y: self.cursor });
        self.push(LayoutItem::Text { at, style, text: line.to_string() });
        self.cursor -= line_height;
        return Ok(());
    }

    /// Append an item to the current page.
    fn push(&mut self, item: LayoutItem) {
        if let Some(page) = self.pages.get_mut(self.current) {
            page.items.push(item);
        }
    }

    /// Greedy word wrap at the current width. Explicit line breaks are kept;
    /// an empty input line yields one blank line.
    fn wrap(&self, markup: &str, style: TextStyle) -> Vec<String> {
        let max_width = self.bounds().width;
        let mut lines = Vec::new();

        for source_line in markup.lines() {
            let mut current = String::new();
            for word in source_line.split_whitespace() {
                let candidate = if current.is_empty() { word.to_string() } else { format!("{current} {word}") };
                if !current.is_empty() && self.width_of(&candidate, style) > max_width {
                    lines.push(std::mem::replace(&mut current, word.to_string()));
                } else {
                    current = candidate;
                }
            }
            lines.push(current);
        }
        return lines;
    }

    /// A paginator with custom paper dimensions in points.
    pub fn with_size(width: f32, height: f32) -> Self {
        let mut layout = Self {
            current: 0,
            cursor: 0.0,
            destinations: BTreeMap::new(),
            height,
            padding_left: 0.0,
            padding_right: 0.0,
            pages: vec![LayoutPage { footer: None, items: Vec::new(), number: 1 }],
            width,
        };
        layout.cursor = layout.inner_height();
        return layout;
    }
}

impl LayoutBackend for PagedLayout {
    fn add_destination(&mut self, anchor: &str) {
        self.destinations.insert(anchor.to_string(), self.page_number());
    }

    fn add_padding(&mut self, left: f32, right: f32) {
        self.padding_left += left;
        self.padding_right += right;
    }

    fn ascender(&self, size: f32) -> f32 {
        return size * ASCENDER;
    }

    fn bounds(&self) -> Bounds {
        return Bounds {
            height: self.inner_height(),
            width: self.width - 2.0 * MARGIN - self.padding_left - self.padding_right,
        };
    }

    fn cursor(&self) -> f32 {
        return self.cursor;
    }

    fn draw_text(&mut self, at: Point, markup: &str, style: TextStyle) {
        let at = self.absolute(at);
        self.push(LayoutItem::Text { at, style, text: markup.to_string() });
    }

    fn fill_circle(&mut self, center: Point, radius: f32) {
        let center = self.absolute(center);
        self.push(LayoutItem::Circle { center, radius });
    }

    fn fill_rectangle(&mut self, at: Point, width: f32, height: f32, color: &str) {
        let at = self.absolute(at);
        self.push(LayoutItem::Rectangle { at, color: color.to_string(), height, width });
    }

    fn go_to_page(&mut self, page: u32) -> Result<(), Error> {
        let index = usize::try_from(page).unwrap_or(usize::MAX);
        if index == 0 || index > self.pages.len() {
            return Err(Error::Backend {
                operation: "go_to_page",
                reason: format!("page {page} does not exist ({} laid out)", self.pages.len()),
            });
        }
        self.current = index.saturating_sub(1);
        self.cursor = self.inner_height();
        return Ok(());
    }

    fn horizontal_rule(&mut self, weight: f32) {
        let y = self.cursor;
        let from = self.absolute(Point { x: 0.0, y });
        let to = self.absolute(Point { x: self.bounds().width, y });
        self.push(LayoutItem::Line { from, to, weight });
    }

    fn is_page_blank(&self) -> bool {
        return self.pages.get(self.current).is_none_or(|page| return page.items.is_empty());
    }

    fn move_cursor_to(&mut self, y: f32) {
        self.cursor = y.clamp(0.0, self.inner_height());
    }

    fn move_down(&mut self, amount: f32) {
        if self.cursor - amount < 0.0 {
            self.start_new_page();
        } else {
            self.cursor -= amount;
        }
    }

    fn number_pages(&mut self) {
        for page in &mut self.pages {
            page.footer = Some(page.number.to_string());
        }
    }

    fn page_number(&self) -> u32 {
        return u32::try_from(self.current.saturating_add(1)).unwrap_or(u32::MAX);
    }

    fn raw(&mut self, markup: &str) -> Result<(), Error> {
        return self.text(markup, TextStyle::BODY);
    }

    fn start_new_page(&mut self) {
        if self.current.saturating_add(1) >= self.pages.len() {
            let number = u32::try_from(self.pages.len().saturating_add(1)).unwrap_or(u32::MAX);
            self.pages.push(LayoutPage { footer: None, items: Vec::new(), number });
            tracing::trace!(page = number, "started page");
        }
        self.current = self.current.saturating_add(1);
        self.cursor = self.inner_height();
    }

    fn stroke_line(&mut self, from: Point, to: Point) {
        let from = self.absolute(from);
        let to = self.absolute(to);
        self.push(LayoutItem::Line { from, to, weight: 1.0 });
    }

    fn subtract_padding(&mut self, left: f32, right: f32) -> Result<(), Error> {
        if left > self.padding_left + EPSILON || right > self.padding_right + EPSILON {
            return Err(Error::Backend {
                operation: "subtract_padding",
                reason: format!(
                    "removing {left}/{right} exceeds current padding {}/{}",
                    self.padding_left, self.padding_right
                ),
            });
        }
        self.padding_left = (self.padding_left - left).max(0.0);
        self.padding_right = (self.padding_right - right).max(0.0);
        return Ok(());
    }

    fn text(&mut self, markup: &str, style: TextStyle) -> Result<(), Error> {
        for line in self.wrap(markup, style) {
            self.place_line(&line, style)?;
        }
        return Ok(());
    }

    fn text_height(&self, markup: &str, style: TextStyle) -> f32 {
        let lines = self.wrap(markup, style).len();
        return f32::from(u16::try_from(lines).unwrap_or(u16::MAX)) * style.size * LINE_SPACING;
    }

    fn verbatim(&mut self, text: &str) -> Result<(), Error> {
        for line in text.lines() {
            self.place_line(line, TextStyle::MONO)?;
        }
        return Ok(());
    }

    fn width_of(&self, markup: &str, style: TextStyle) -> f32 {
        let visible = COMMAND.replace_all(markup, "");
        let count = visible.chars().filter(|c| return !matches!(c, '\\' | '{' | '}')).count();
        return f32::from(u16::try_from(count).unwrap_or(u16::MAX)) * style.size * GLYPH_WIDTH;
    }
}
