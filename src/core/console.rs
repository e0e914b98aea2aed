//! Character-grid display buffer: per-cell background, foreground, and glyph code.

use super::{Color, ConsoleError};

/// One cell as seen through [`Console::get`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Tile {
    pub glyph: u32,
    pub fg: Color,
    pub bg: Color,
}

/// A `width x height` grid of cells stored as three parallel row-major arrays.
///
/// The arrays are private so their lengths always equal `width * height`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Console {
    width: u32,
    height: u32,
    bg: Vec<Color>,
    fg: Vec<Color>,
    ch: Vec<u32>,
}

impl Console {
    /// Glyph code written by [`Console::new`] and [`Console::resize`].
    pub const BLANK: u32 = b' ' as u32;

    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Console {
            width,
            height,
            bg: vec![Color::DEFAULT_BG; len],
            fg: vec![Color::DEFAULT_FG; len],
            ch: vec![Self::BLANK; len],
        }
    }

    /// Builds a console from caller-owned arrays, checking every length.
    pub fn from_parts(
        width: u32,
        height: u32,
        bg: Vec<Color>,
        fg: Vec<Color>,
        ch: Vec<u32>,
    ) -> Result<Self, ConsoleError> {
        let expected = width as usize * height as usize;
        let check = |what: &'static str, actual: usize| {
            if actual == expected {
                Ok(())
            } else {
                Err(ConsoleError::ShapeMismatch {
                    what,
                    width,
                    height,
                    expected,
                    actual,
                })
            }
        };
        check("bg", bg.len())?;
        check("fg", fg.len())?;
        check("ch", ch.len())?;
        Ok(Console {
            width,
            height,
            bg,
            fg,
            ch,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.ch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ch.is_empty()
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    /// Returns the cell at `(x, y)`, or `None` if out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<Tile> {
        self.index(x, y).map(|i| Tile {
            glyph: self.ch[i],
            fg: self.fg[i],
            bg: self.bg[i],
        })
    }

    /// Writes a whole cell. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, tile: Tile) {
        if let Some(i) = self.index(x, y) {
            self.ch[i] = tile.glyph;
            self.fg[i] = tile.fg;
            self.bg[i] = tile.bg;
        }
    }

    pub fn put_char(&mut self, x: u32, y: u32, glyph: u32) {
        if let Some(i) = self.index(x, y) {
            self.ch[i] = glyph;
        }
    }

    pub fn set_fg(&mut self, x: u32, y: u32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.fg[i] = color;
        }
    }

    pub fn set_bg(&mut self, x: u32, y: u32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.bg[i] = color;
        }
    }

    /// Fills every cell with the same glyph and colors.
    pub fn clear(&mut self, glyph: u32, fg: Color, bg: Color) {
        self.ch.fill(glyph);
        self.fg.fill(fg);
        self.bg.fill(bg);
    }

    /// Prints `text` left to right starting at `(x, y)`, one char per cell,
    /// clipping at the right edge. Returns the number of cells written.
    pub fn print(&mut self, x: u32, y: u32, text: &str, fg: Color, bg: Color) -> u32 {
        let mut written = 0;
        for (offset, c) in text.chars().enumerate() {
            let Ok(offset) = u32::try_from(offset) else {
                break;
            };
            let Some(cx) = x.checked_add(offset) else {
                break;
            };
            if self.index(cx, y).is_none() {
                break;
            }
            self.set(
                cx,
                y,
                Tile {
                    glyph: c as u32,
                    fg,
                    bg,
                },
            );
            written += 1;
        }
        written
    }

    /// Changes the dimensions. Existing content is discarded.
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Console::new(width, height);
    }

    pub fn bg(&self) -> &[Color] {
        &self.bg
    }

    pub fn fg(&self) -> &[Color] {
        &self.fg
    }

    pub fn glyphs(&self) -> &[u32] {
        &self.ch
    }

    /// Background colors as tightly packed RGB8 (`3 * width * height` bytes).
    pub fn bg_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.bg)
    }

    /// Foreground colors as tightly packed RGB8 (`3 * width * height` bytes).
    pub fn fg_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.fg)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/core_console.rs"]
mod tests;
