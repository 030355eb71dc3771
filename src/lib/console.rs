use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    blend::{blend_color, BlendMode},
    grid::{Grid, GridError},
    rect::Rect,
    util::Color,
    BoundedMap,
};

const DEFAULT_FG: Color = Color::WHITE;
const DEFAULT_BG: Color = Color::BLACK;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConsoleError {
    #[error("({x}, {y}) is outside of the {width}x{height} console")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
    #[error("invalid console size {width}x{height}")]
    InvalidSize { width: i32, height: i32 },
    #[error("{name} alpha must be within [0, 1], got {value}")]
    InvalidAlpha { name: &'static str, value: f32 },
}

impl From<GridError> for ConsoleError {
    fn from(e: GridError) -> Self {
        match e {
            GridError::OutOfBounds {
                x,
                y,
                width,
                height,
            } => ConsoleError::OutOfBounds {
                x,
                y,
                width,
                height,
            },
            GridError::InvalidSize { width, height } => {
                ConsoleError::InvalidSize { width, height }
            }
            GridError::SizeMismatch { expected, .. } => ConsoleError::InvalidSize {
                width: expected as i32,
                height: 1,
            },
        }
    }
}

/// A single console cell: a glyph drawn in a foreground color over a background color.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub struct Cell {
    pub glyph: char,
    pub fg: Color,
    pub bg: Color,
}

impl Cell {
    pub const fn new(glyph: char, fg: Color, bg: Color) -> Self {
        Self { glyph, fg, bg }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            glyph: ' ',
            fg: DEFAULT_FG,
            bg: DEFAULT_BG,
        }
    }
}

/// A Console is a grid of cells consisting of a glyph, a foreground color and a background
/// color.  To use a Console, create one, draw glyphs and colors onto it, composite it onto other
/// consoles with [blit], and hand its [Console::cells] to a renderer.
///
/// Single-cell access outside of the console is an error; the drawing helpers (`print`,
/// `fill_rect`, `draw_frame`) clip instead.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Console {
    default_cell: Cell,
    cells: Grid<Cell>,
}

impl Console {
    /// Create a new Console with every cell set to `default_cell`.
    ///
    /// A zero width or height creates an empty console that can't be addressed.
    pub fn new(width: i32, height: i32, default_cell: Cell) -> Result<Self, ConsoleError> {
        Ok(Self {
            default_cell,
            cells: Grid::new(width, height, default_cell)?,
        })
    }

    /// The width of the Console in cells.
    #[inline]
    pub fn width(&self) -> i32 {
        self.cells.width()
    }

    /// The height of the Console in cells.
    #[inline]
    pub fn height(&self) -> i32 {
        self.cells.height()
    }

    /// The cell used to fill newly exposed cells after [Console::resize].
    pub fn default_cell(&self) -> Cell {
        self.default_cell
    }

    pub fn set_default_cell(&mut self, cell: Cell) {
        self.default_cell = cell;
    }

    /// All cells in row-major order, for rasterization.
    pub fn cells(&self) -> &[Cell] {
        self.cells.cells()
    }

    /// Iterate over each row of cells from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.cells().chunks(self.width().max(1) as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Result<Cell, ConsoleError> {
        Ok(*self.cells.get(x, y)?)
    }

    pub fn set(
        &mut self,
        x: i32,
        y: i32,
        glyph: char,
        fg: Color,
        bg: Color,
    ) -> Result<(), ConsoleError> {
        self.set_cell(x, y, Cell::new(glyph, fg, bg))
    }

    pub fn set_cell(&mut self, x: i32, y: i32, cell: Cell) -> Result<(), ConsoleError> {
        Ok(self.cells.set(x, y, cell)?)
    }

    /// Change only the glyph at the given position.
    pub fn set_glyph(&mut self, x: i32, y: i32, glyph: char) -> Result<(), ConsoleError> {
        self.cells.get_mut(x, y)?.glyph = glyph;
        Ok(())
    }

    /// Set foreground and/or background colors at a given position, leaving the glyph as-is.
    pub fn recolor<F, B>(&mut self, x: i32, y: i32, fg: F, bg: B) -> Result<(), ConsoleError>
    where
        F: Into<Option<Color>>,
        B: Into<Option<Color>>,
    {
        let cell = self.cells.get_mut(x, y)?;

        if let Some(fg) = fg.into() {
            cell.fg = fg;
        }
        if let Some(bg) = bg.into() {
            cell.bg = bg;
        }

        Ok(())
    }

    /// Overwrite every cell with `fill`.
    pub fn clear(&mut self, fill: Cell) {
        self.cells.fill(fill);
    }

    /// Resize the Console, keeping the overlapping top-left region and filling the rest with
    /// the default cell.
    pub fn resize(&mut self, width: i32, height: i32) -> Result<(), ConsoleError> {
        if width == self.width() && height == self.height() {
            return Ok(());
        }

        let old = &self.cells;
        let default_cell = self.default_cell;
        let cells = Grid::from_fn(width, height, |x, y| {
            old.get(x, y).copied().unwrap_or(default_cell)
        })?;

        self.cells = cells;

        Ok(())
    }

    #[inline]
    fn put_color_raw<F, B>(&mut self, x: i32, y: i32, glyph: char, fg: F, bg: B)
    where
        F: Into<Option<Color>> + Copy,
        B: Into<Option<Color>> + Copy,
    {
        if let Ok(cell) = self.cells.get_mut(x, y) {
            cell.glyph = glyph;
            if let Some(fg) = fg.into() {
                cell.fg = fg;
            }
            if let Some(bg) = bg.into() {
                cell.bg = bg;
            }
        }
    }

    /// Print a string on the Console starting at the given position, optionally changing the
    /// foreground and/or background colors.  Anything past the edges of the Console is clipped.
    ///
    /// Returns the number of characters actually drawn.
    pub fn print<F, B>(&mut self, x: i32, y: i32, s: &str, fg: F, bg: B) -> usize
    where
        F: Into<Option<Color>> + Copy,
        B: Into<Option<Color>> + Copy,
    {
        if y < 0 || y >= self.height() || x >= self.width() {
            return 0;
        }

        let mut drawn = 0;

        for (i, c) in s.chars().enumerate() {
            let cx = x + i as i32;

            if cx >= self.width() {
                break;
            }
            if cx >= 0 {
                self.put_color_raw(cx, y, c, fg, bg);
                drawn += 1;
            }
        }

        drawn
    }

    /// Print word-wrapped text inside `rect`, clipped to both the rectangle and the Console.
    ///
    /// Returns the number of lines the text needed, which may exceed the rectangle's height.
    pub fn print_rect<F, B>(&mut self, rect: Rect, s: &str, fg: F, bg: B) -> usize
    where
        F: Into<Option<Color>> + Copy,
        B: Into<Option<Color>> + Copy,
    {
        let lines = wrap_text(s, rect.width().max(1) as usize);

        for (i, line) in lines.iter().enumerate().take(rect.height().max(0) as usize) {
            self.print(rect.x1, rect.y1 + i as i32, line, fg, bg);
        }

        lines.len()
    }

    /// Fill every cell of `rect` that lies within the Console with `cell`.
    pub fn fill_rect(&mut self, rect: Rect, cell: Cell) {
        if let Some(clipped) = self.full_rect().and_then(|r| r.intersection(&rect)) {
            for (x, y) in clipped.iter_positions() {
                self.put_color_raw(x, y, cell.glyph, cell.fg, cell.bg);
            }
        }
    }

    /// Draw a single-line box around the edge of `rect`, clearing its interior.  Any part of the
    /// box that falls outside of the Console is clipped off.
    pub fn draw_frame<F, B>(&mut self, rect: Rect, fg: F, bg: B)
    where
        F: Into<Option<Color>> + Copy,
        B: Into<Option<Color>> + Copy,
    {
        let Rect { x1, y1, x2, y2 } = rect;
        let clipped = match self.full_rect().and_then(|r| r.intersection(&rect)) {
            Some(r) => r,
            None => return,
        };

        for y in clipped.y1..=clipped.y2 {
            for x in clipped.x1..=clipped.x2 {
                let glyph = match (x == x1, x == x2, y == y1, y == y2) {
                    (true, _, true, _) => '┌',
                    (_, true, true, _) => '┐',
                    (true, _, _, true) => '└',
                    (_, true, _, true) => '┘',
                    (true, _, _, _) | (_, true, _, _) => '│',
                    (_, _, true, _) | (_, _, _, true) => '─',
                    _ => ' ',
                };

                self.put_color_raw(x, y, glyph, fg, bg);
            }
        }
    }

    /// Rectangle covering the whole Console, or [None] if it is empty.
    pub fn full_rect(&self) -> Option<Rect> {
        Rect::try_new(0, 0, self.width(), self.height())
    }
}

impl BoundedMap for Console {
    fn bounds(&self) -> (i32, i32, i32, i32) {
        (0, 0, self.width() - 1, self.height() - 1)
    }
}

/// Break `s` into lines of at most `width` characters, splitting on whitespace where possible
/// and hard-splitting words that are too long.  Explicit newlines are kept.
fn wrap_text(s: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in s.split('\n') {
        let mut line = String::new();
        let mut line_len = 0;

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();

            if line_len > 0 && line_len + 1 + word.len() > width {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            while word.len() > width {
                if line_len > 0 {
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                lines.push(word.drain(..width).collect());
            }
            if word.is_empty() {
                continue;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line.extend(word.iter());
            line_len += word.len();
        }

        lines.push(line);
    }

    lines
}

fn check_alpha(name: &'static str, value: f32) -> Result<(), ConsoleError> {
    if (0. ..=1.).contains(&value) {
        Ok(())
    } else {
        Err(ConsoleError::InvalidAlpha { name, value })
    }
}

/// Composite one cell over another.  The source glyph is taken whenever any of its foreground
/// is blended in.
fn blend_cell(dst: Cell, src: Cell, fg_alpha: f32, bg_alpha: f32, mode: BlendMode) -> Cell {
    if mode == BlendMode::Ignore || (fg_alpha <= 0. && bg_alpha <= 0.) {
        return dst;
    }

    Cell {
        glyph: if fg_alpha > 0. { src.glyph } else { dst.glyph },
        fg: blend_color(dst.fg, src.fg, fg_alpha, mode),
        bg: blend_color(dst.bg, src.bg, bg_alpha, mode),
    }
}

#[allow(clippy::too_many_arguments)]
fn blit_impl(
    source: &Console,
    src_rect: Rect,
    dest: &mut Console,
    dest_x: i32,
    dest_y: i32,
    fg_alpha: f32,
    bg_alpha: f32,
    mode: BlendMode,
    key_color: Option<Color>,
) -> Result<(), ConsoleError> {
    check_alpha("foreground", fg_alpha)?;
    check_alpha("background", bg_alpha)?;

    // Clip the source rectangle to the source, then its translation to the destination.
    let src_clip = match source.full_rect().and_then(|r| r.intersection(&src_rect)) {
        Some(r) => r,
        None => return Ok(()),
    };
    let dx = dest_x - src_rect.x1;
    let dy = dest_y - src_rect.y1;
    let translated = Rect {
        x1: src_clip.x1 + dx,
        y1: src_clip.y1 + dy,
        x2: src_clip.x2 + dx,
        y2: src_clip.y2 + dy,
    };
    let dest_clip = match dest.full_rect().and_then(|r| r.intersection(&translated)) {
        Some(r) => r,
        None => return Ok(()),
    };

    log::trace!(
        "blit {}x{} cells to ({}, {}) with {:?}",
        dest_clip.width(),
        dest_clip.height(),
        dest_clip.x1,
        dest_clip.y1,
        mode,
    );

    let src_width = source.width();
    let dest_width = dest.width();
    let src_cells = source.cells();
    let dest_cells = dest.cells.cells_mut();

    for y in dest_clip.y1..=dest_clip.y2 {
        for x in dest_clip.x1..=dest_clip.x2 {
            let src_cell = src_cells[((y - dy) * src_width + (x - dx)) as usize];

            if key_color == Some(src_cell.bg) {
                continue;
            }

            let dest_cell = &mut dest_cells[(y * dest_width + x) as usize];
            *dest_cell = blend_cell(*dest_cell, src_cell, fg_alpha, bg_alpha, mode);
        }
    }

    Ok(())
}

/// Composite the `src_rect` region of `source` onto `dest` with its top-left corner at
/// (`dest_x`, `dest_y`).
///
/// The region is clipped to both consoles, so a blit that falls entirely outside either of them
/// does nothing.  `fg_alpha` and `bg_alpha` must lie within `[0, 1]` and scale how much of the
/// source foreground and background are blended in with `mode`; a zero alpha leaves the
/// matching colors of the destination untouched.
#[allow(clippy::too_many_arguments)]
pub fn blit(
    source: &Console,
    src_rect: Rect,
    dest: &mut Console,
    dest_x: i32,
    dest_y: i32,
    fg_alpha: f32,
    bg_alpha: f32,
    mode: BlendMode,
) -> Result<(), ConsoleError> {
    blit_impl(
        source, src_rect, dest, dest_x, dest_y, fg_alpha, bg_alpha, mode, None,
    )
}

/// Like [blit], but source cells whose background is `key_color` are skipped entirely.
#[allow(clippy::too_many_arguments)]
pub fn blit_keyed(
    source: &Console,
    src_rect: Rect,
    dest: &mut Console,
    dest_x: i32,
    dest_y: i32,
    fg_alpha: f32,
    bg_alpha: f32,
    mode: BlendMode,
    key_color: Color,
) -> Result<(), ConsoleError> {
    blit_impl(
        source,
        src_rect,
        dest,
        dest_x,
        dest_y,
        fg_alpha,
        bg_alpha,
        mode,
        Some(key_color),
    )
}
