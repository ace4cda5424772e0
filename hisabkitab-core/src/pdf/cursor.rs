use std::path::Path;

use crate::pdf::canvas::{Canvas, PAGE_HEIGHT_MM};
use crate::pdf::PdfError;

/// Left edge of every line, in mm.
pub const LEFT_MARGIN: f32 = 15.0;
/// Baseline of the first line on a page, in mm from the bottom.
pub const TOP_MARGIN: f32 = PAGE_HEIGHT_MM - 15.0;
/// Lines are never written below this baseline.
pub const BOTTOM_MARGIN: f32 = 18.0;
/// Longest line written; anything beyond is cut off.
pub const MAX_LINE_CHARS: usize = 95;

/// Vertical writer over a [`Canvas`].
///
/// The cursor accumulates lines on the current page until the next line
/// would start below [`BOTTOM_MARGIN`]; then the page is committed and the
/// cursor jumps to [`TOP_MARGIN`] of a fresh one. [`PageCursor::finalize`]
/// consumes the cursor, so nothing can be emitted after the document is
/// produced.
pub struct PageCursor<C: Canvas> {
    canvas: C,
    y: f32,
    page: usize,
}

impl<C: Canvas> PageCursor<C> {
    pub fn new(canvas: C) -> Self {
        Self {
            canvas,
            y: TOP_MARGIN,
            page: 1,
        }
    }

    /// Current baseline, in mm from the bottom of the page.
    pub fn y(&self) -> f32 {
        self.y
    }

    /// 1-based number of the page being written.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Writes one line of regular text and moves down by `line_height`.
    pub fn emit_line(&mut self, text: &str, font_size: f32, line_height: f32) {
        self.write(text, font_size, line_height, false);
    }

    /// Same as [`PageCursor::emit_line`] in the bold face.
    pub fn emit_bold(&mut self, text: &str, font_size: f32, line_height: f32) {
        self.write(text, font_size, line_height, true);
    }

    /// Moves down without writing. The page break, if any, happens on the
    /// next emitted line.
    pub fn gap(&mut self, height: f32) {
        self.y -= height;
    }

    /// Commits the current page and continues at the top of a new one.
    pub fn new_page(&mut self) {
        self.canvas.begin_page();
        self.page += 1;
        self.y = TOP_MARGIN;
    }

    /// Draws an image on the current page without moving the cursor.
    pub fn place_image(&mut self, path: &Path, x: f32, y: f32, width: f32) -> Result<(), PdfError> {
        self.canvas.draw_image(path, x, y, width)
    }

    /// Closes the last page and returns the serialized document.
    pub fn finalize(self) -> Result<Vec<u8>, PdfError> {
        self.canvas.finish()
    }

    fn write(&mut self, text: &str, font_size: f32, line_height: f32, bold: bool) {
        if self.y < BOTTOM_MARGIN {
            self.new_page();
        }
        let text = truncate_chars(text, MAX_LINE_CHARS);
        self.canvas.draw_text(text, LEFT_MARGIN, self.y, font_size, bold);
        self.y -= line_height;
    }
}

/// Longest prefix of `text` holding at most `max` characters.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Splits `text` into pieces of at most `width` characters. Empty input
/// yields a single empty piece so every source line occupies a row.
pub fn hard_wrap(text: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() || width == 0 {
        return vec![text.to_string()];
    }
    chars.chunks(width).map(|chunk| chunk.iter().collect()).collect()
}
