//! Block renderer: turns block markup into layout operations.
//!
//! List handling is an explicit state machine over [`RenderState`]. Every
//! list start pushes an indentation that the matching list end pops again,
//! and label/note items remember where their box started so the side borders
//! can be drawn once the item's extent (possibly over several pages) is known.

use crate::backend::{BASE_FONT_SIZE, LayoutBackend, Point, TextStyle};
use crate::error::Error;
use crate::inline::{BOLD, EMPHASIS, InlineHandler, render_inlines};
use crate::model::{Block, Inline, ListItem, ListKind};

/// Indentation of list content.
pub const LIST_PADDING: f32 = 20.0;

/// Gap between a list glyph and the item text.
const GLYPH_GAP: f32 = 5.0;

/// Background of label boxes.
const LABEL_FILL: &str = "DDDDDD";

/// Inner spacing keeping note content off the box borders.
const NOTE_PADDING: f32 = 5.0;

/// Per-pass list state. Must be balanced again once a block sequence has
/// been rendered completely.
#[derive(Debug, Default)]
pub struct RenderState {
    /// Item counters of the open counted lists (numbered and alphabetic),
    /// innermost last. Reset to 0 on list entry.
    counters: Vec<(ListKind, u32)>,
    /// Kinds of the open lists, innermost last.
    lists: Vec<ListKind>,
    /// Page and cursor where each open label/note box started.
    note_starts: Vec<(u32, f32)>,
    /// Left/right indentation pushed on the backend, innermost last.
    paddings: Vec<(f32, f32)>,
}

impl RenderState {
    /// Number of open lists.
    pub fn depth(&self) -> usize {
        return self.lists.len();
    }

    /// Whether every list, box, and indentation has been closed.
    pub fn is_balanced(&self) -> bool {
        return self.lists.is_empty()
            && self.counters.is_empty()
            && self.note_starts.is_empty()
            && self.paddings.is_empty();
    }

    /// Advance the innermost counter and format its item label:
    /// `1.2.` for nested numbered lists, `B.` / `b.` for alphabetic ones.
    fn next_label(&mut self) -> Option<String> {
        let (kind, count) = self.counters.last_mut()?;
        *count = count.saturating_add(1);
        let (kind, count) = (*kind, *count);

        return match kind {
            ListKind::Lalpha => Some(format!("{}.", letter(count, b'a'))),
            ListKind::Ualpha => Some(format!("{}.", letter(count, b'A'))),
            ListKind::Number => {
                let segments: Vec<String> = self
                    .counters
                    .iter()
                    .filter(|(k, _)| return *k == ListKind::Number)
                    .map(|(_, n)| return n.to_string())
                    .collect();
                Some(format!("{}.", segments.join(".")))
            },
            ListKind::Bullet | ListKind::Label | ListKind::Note => None,
        };
    }

    /// Drop everything. Called at the start of each pass.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Renders the block markup of one entity.
pub struct BlockRenderer<'c> {
    /// Layout engine.
    backend: &'c mut dyn LayoutBackend,
    /// Anchor of the entity being rendered, for diagnostics.
    entity: &'c str,
    /// Inline renderer, usually a cross-referencer scoped to the entity.
    handler: &'c mut dyn InlineHandler,
    /// Added to every requested heading level.
    heading_base: u8,
    /// List state shared across the pass.
    state: &'c mut RenderState,
}

impl<'c> BlockRenderer<'c> {
    /// Open an item of the innermost list.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnbalancedList` if no list is open, or a backend error.
    pub fn begin_item(&mut self, item: &ListItem) -> Result<(), Error> {
        let Some(kind) = self.state.lists.last().copied() else {
            return Err(self.unbalanced("list item start"));
        };
        let ascender = self.backend.ascender(BASE_FONT_SIZE);
        let cursor = self.backend.cursor();

        match kind {
            ListKind::Bullet => {
                let radius = ascender / 5.0;
                let center = Point { x: -radius - GLYPH_GAP, y: cursor - ascender / 2.0 };
                self.backend.fill_circle(center, radius);
            },
            ListKind::Lalpha | ListKind::Number | ListKind::Ualpha => {
                let label = self.state.next_label().unwrap_or_default();
                let x = -self.backend.width_of(&label, TextStyle::BODY) - GLYPH_GAP;
                self.backend.draw_text(Point { x, y: cursor - ascender }, &label, TextStyle::BODY);
            },
            ListKind::Label | ListKind::Note => {
                let label = render_inlines(item.label.as_deref().unwrap_or_default(), self.handler);
                let label = format!("{}{label}{}", BOLD.0, BOLD.1);
                self.label_box(&label)?;
            },
        }
        return Ok(());
    }

    /// Open a list of the given kind.
    pub fn begin_list(&mut self, kind: ListKind) {
        self.state.lists.push(kind);
        if kind.is_labelled() {
            self.push_padding(LIST_PADDING, LIST_PADDING);
        } else {
            self.push_padding(LIST_PADDING, 0.0);
        }
        if matches!(kind, ListKind::Lalpha | ListKind::Number | ListKind::Ualpha) {
            self.state.counters.push((kind, 0));
        }
    }

    /// Render a block and everything nested in it.
    fn block(&mut self, block: &Block) -> Result<(), Error> {
        match block {
            Block::BlankLine => self.backend.text("\n", TextStyle::BODY)?,
            Block::Heading { level, text } => self.heading(*level, text)?,
            Block::List { items, kind } => {
                self.begin_list(*kind);
                for item in items {
                    self.begin_item(item)?;
                    self.render(&item.body)?;
                    self.end_item()?;
                }
                self.end_list()?;
            },
            Block::Paragraph { text } => {
                let markup = render_inlines(text, self.handler);
                self.backend.text(&markup, TextStyle::BODY)?;
            },
            Block::Raw { text } => self.backend.raw(text)?,
            Block::Rule { weight } => self.backend.horizontal_rule(f32::from(*weight)),
            Block::Verbatim { text } => {
                self.backend.verbatim(text)?;
                self.backend.text("\n", TextStyle::BODY)?;
            },
        }
        return Ok(());
    }

    /// Close the innermost list item, finishing its box for label and note lists.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnbalancedList` if no list is open, or a backend error.
    pub fn end_item(&mut self) -> Result<(), Error> {
        let Some(kind) = self.state.lists.last().copied() else {
            return Err(self.unbalanced("list item end"));
        };
        if !kind.is_labelled() {
            return Ok(());
        }

        self.pop_padding()?;
        self.backend.horizontal_rule(1.0);

        let (end_page, end_pos) = (self.backend.page_number(), self.backend.cursor());
        let Some((start_page, start_pos)) = self.state.note_starts.pop() else {
            return Err(self.unbalanced("list item end"));
        };

        if start_page == end_page {
            self.side_borders(start_pos, end_pos);
            return Ok(());
        }

        // The box spans pages: border each page separately.
        for page in start_page..=end_page {
            self.backend.go_to_page(page)?;
            let top = self.backend.bounds().height;
            if page == start_page {
                self.side_borders(start_pos, 0.0);
            } else if page == end_page {
                self.side_borders(top, end_pos);
            } else {
                self.side_borders(top, 0.0);
            }
        }
        self.backend.move_cursor_to(end_pos);
        self.backend.text("\n", TextStyle::BODY)?;
        return Ok(());
    }

    /// Close the innermost list.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnbalancedList` if no list is open, or a backend error.
    pub fn end_list(&mut self) -> Result<(), Error> {
        let Some(kind) = self.state.lists.pop() else {
            return Err(self.unbalanced("list end"));
        };
        self.pop_padding()?;
        if matches!(kind, ListKind::Lalpha | ListKind::Number | ListKind::Ualpha) {
            self.state.counters.pop();
        }
        return Ok(());
    }

    /// Emit a heading at the user's level shifted by the entity's base level.
    /// Levels past the last heading style degrade to an italic paragraph.
    fn heading(&mut self, level: u8, text: &[Inline]) -> Result<(), Error> {
        let markup = render_inlines(text, self.handler);
        let absolute = self.heading_base.saturating_add(level);

        if let Some(style) = TextStyle::heading(absolute) {
            return self.backend.text(&markup, style);
        }
        tracing::warn!(entity = self.entity, level = absolute, "heading level out of range, rendering as emphasis");
        return self.backend.text(&format!("{}{markup}{}", EMPHASIS.0, EMPHASIS.1), TextStyle::BODY);
    }

    /// Draw a label box at the cursor: grey background, top and side
    /// borders, the label itself, then the rule opening the content area.
    fn label_box(&mut self, label: &str) -> Result<(), Error> {
        let height = self.backend.text_height(label, TextStyle::BODY);
        let width = self.backend.bounds().width;
        let top = self.backend.cursor();

        self.backend.fill_rectangle(Point { x: 0.0, y: top }, width, height, LABEL_FILL);
        self.backend.stroke_line(Point { x: 0.0, y: top - height }, Point { x: 0.0, y: top });
        self.backend.stroke_line(Point { x: 0.0, y: top }, Point { x: width, y: top });
        self.backend.stroke_line(Point { x: width, y: top }, Point { x: width, y: top - height });
        self.backend.text(label, TextStyle::BODY)?;

        self.state.note_starts.push((self.backend.page_number(), self.backend.cursor()));
        self.backend.horizontal_rule(1.0);
        self.push_padding(NOTE_PADDING, NOTE_PADDING);
        return Ok(());
    }

    /// A renderer for one entity's markup.
    pub fn new(
        backend: &'c mut dyn LayoutBackend,
        state: &'c mut RenderState,
        handler: &'c mut dyn InlineHandler,
        heading_base: u8,
        entity: &'c str,
    ) -> Self {
        return Self { backend, entity, handler, heading_base, state };
    }

    /// Undo the innermost indentation.
    fn pop_padding(&mut self) -> Result<(), Error> {
        let Some((left, right)) = self.state.paddings.pop() else {
            return Err(self.unbalanced("padding pop"));
        };
        return self.backend.subtract_padding(left, right);
    }

    /// Indent following content and remember by how much.
    fn push_padding(&mut self, left: f32, right: f32) {
        self.state.paddings.push((left, right));
        self.backend.add_padding(left, right);
    }

    /// Render a sequence of blocks in order.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnbalancedList` on structural list errors, or a backend error.
    pub fn render(&mut self, blocks: &[Block]) -> Result<(), Error> {
        for block in blocks {
            self.block(block)?;
        }
        return Ok(());
    }

    /// Left and right box borders between two heights on the current page.
    fn side_borders(&mut self, from: f32, to: f32) {
        let width = self.backend.bounds().width;
        self.backend.stroke_line(Point { x: 0.0, y: from }, Point { x: 0.0, y: to });
        self.backend.stroke_line(Point { x: width, y: from }, Point { x: width, y: to });
    }

    /// Build the error for a structural event with no open list.
    fn unbalanced(&self, event: &'static str) -> Error {
        return Error::UnbalancedList { entity: self.entity.to_string(), event };
    }
}

/// `1` → `A`, `2` → `B`, ... wrapping after `Z`.
fn letter(count: u32, base: u8) -> char {
    let offset = u8::try_from(count.saturating_sub(1) % 26).unwrap_or(0);
    return char::from(base.saturating_add(offset));
}
