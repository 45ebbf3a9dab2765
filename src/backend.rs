//! The paginated-layout collaborator: what the renderer needs from a page engine.
//!
//! Coordinates follow the usual PDF convention inside the current bounding
//! box: `x` grows to the right from the left padding, `y` is measured upwards
//! from the bottom of the box, so the cursor shrinks as content is added.

use serde::Serialize;

use crate::error::Error;

/// Font sizes for heading levels 1 through 6.
pub const HEADING_SIZES: [f32; 6] = [32.0, 22.0, 18.0, 16.0, 14.0, 12.0];

/// Body text size in points.
pub const BASE_FONT_SIZE: f32 = 11.0;

/// Monospaced text is set slightly smaller to match the serif's visual size.
pub const MONO_FONT_SIZE: f32 = BASE_FONT_SIZE - 1.0;

/// Width and height of the current bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Usable height in points.
    pub height: f32,
    /// Usable width in points, after paddings.
    pub width: f32,
}

/// Font families known to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Font {
    /// Monospaced face for code and call sequences.
    Mono,
    /// Sans-serif face for headings.
    Sans,
    /// Serif face for body text.
    Serif,
    /// Small-caps serif for captions.
    SerifCaps,
}

/// A position inside the current bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    /// Horizontal offset from the left edge.
    pub x: f32,
    /// Vertical offset from the bottom edge.
    pub y: f32,
}

/// How a text run is set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextStyle {
    /// Face.
    pub font: Font,
    /// Size in points.
    pub size: f32,
}

impl TextStyle {
    /// Body text.
    pub const BODY: Self = Self { font: Font::Serif, size: BASE_FONT_SIZE };

    /// Code and verbatim blocks.
    pub const MONO: Self = Self { font: Font::Mono, size: MONO_FONT_SIZE };

    /// Style for a heading of the given level, `None` beyond the last defined level.
    pub fn heading(level: u8) -> Option<Self> {
        let index = usize::from(level).checked_sub(1)?;
        let size = HEADING_SIZES.get(index).copied()?;
        return Some(Self { font: Font::Sans, size });
    }
}

/// Operations the renderer drives. One backend instance renders one pass.
///
/// Implementations must lay content out strictly in call order: page numbers
/// reported by [`LayoutBackend::page_number`] are recorded as anchor pages.
pub trait LayoutBackend {
    /// Register a named destination on the current page.
    fn add_destination(&mut self, anchor: &str);

    /// Indent following content.
    fn add_padding(&mut self, left: f32, right: f32);

    /// Font ascender for a size, used to align list glyphs with text.
    fn ascender(&self, size: f32) -> f32;

    /// Current bounding box.
    fn bounds(&self) -> Bounds;

    /// Vertical cursor position inside the bounds.
    fn cursor(&self) -> f32;

    /// Draw text at a fixed position without moving the cursor.
    fn draw_text(&mut self, at: Point, markup: &str, style: TextStyle);

    /// Fill a circle, used for bullets.
    fn fill_circle(&mut self, center: Point, radius: f32);

    /// Fill a rectangle whose top-left corner is `at`.
    fn fill_rectangle(&mut self, at: Point, width: f32, height: f32, color: &str);

    /// Switch to an already laid out page (1-based), cursor at its top.
    ///
    /// # Errors
    ///
    /// Returns `Error::Backend` if the page doesn't exist.
    fn go_to_page(&mut self, page: u32) -> Result<(), Error>;

    /// Stroke a rule across the full width at the cursor.
    fn horizontal_rule(&mut self, weight: f32);

    /// Whether nothing has been placed on the current page yet.
    fn is_page_blank(&self) -> bool;

    /// Move the cursor to an absolute position on the current page.
    fn move_cursor_to(&mut self, y: f32);

    /// Move the cursor down, breaking the page if it runs off the bottom.
    fn move_down(&mut self, amount: f32);

    /// Stamp the page number on every page.
    fn number_pages(&mut self);

    /// 1-based number of the current page.
    fn page_number(&self) -> u32;

    /// Emit backend-native markup as a flowing block.
    ///
    /// # Errors
    ///
    /// Returns `Error::Backend` if the text cannot be laid out.
    fn raw(&mut self, markup: &str) -> Result<(), Error>;

    /// Open a new page after the current one.
    fn start_new_page(&mut self);

    /// Stroke a straight line.
    fn stroke_line(&mut self, from: Point, to: Point);

    /// Undo an earlier [`LayoutBackend::add_padding`].
    ///
    /// # Errors
    ///
    /// Returns `Error::Backend` if more padding is removed than was added.
    fn subtract_padding(&mut self, left: f32, right: f32) -> Result<(), Error>;

    /// Flow text with inline markup, wrapping and breaking pages as needed.
    ///
    /// # Errors
    ///
    /// Returns `Error::Backend` if the text cannot be laid out.
    fn text(&mut self, markup: &str, style: TextStyle) -> Result<(), Error>;

    /// Height the text would occupy at the current width, without placing it.
    fn text_height(&self, markup: &str, style: TextStyle) -> f32;

    /// Preformatted monospaced text, line breaks preserved.
    ///
    /// # Errors
    ///
    /// Returns `Error::Backend` if the text cannot be laid out.
    fn verbatim(&mut self, text: &str) -> Result<(), Error>;

    /// Rendered width of a single line of text.
    fn width_of(&self, markup: &str, style: TextStyle) -> f32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_styles_stop_after_level_six() {
        assert_eq!(TextStyle::heading(1).map(|s| s.size), Some(32.0));
        assert_eq!(TextStyle::heading(6).map(|s| s.size), Some(12.0));
        assert_eq!(TextStyle::heading(7), None);
        assert_eq!(TextStyle::heading(0), None);
    }
}
