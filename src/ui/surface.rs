use crate::ui::text_utils::fit_text;
use anyhow::Result;
use ratatui::style::Style;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub height: u16,
    pub width: u16,
}

impl Dimensions {
    pub fn new(height: u16, width: u16) -> Self {
        Self { height, width }
    }
}

/// Drawing capability the table view paints through.
///
/// Writes go to an off-screen frame; nothing reaches the display until
/// `flush`. Flushing mid-frame is allowed and shows whatever has been
/// written so far.
pub trait Surface {
    /// Current size of the physical terminal
    fn size(&self) -> Result<Dimensions>;

    /// Whether `dimensions` differ from the size the frame was laid out for
    fn was_resized(&self, dimensions: Dimensions) -> bool;

    fn resize(&mut self, dimensions: Dimensions) -> Result<()>;

    /// Blank the frame
    fn clear(&mut self);

    /// Write `text` at (`row`, `col`), left-aligned in `width` cells
    fn put(&mut self, row: u16, col: u16, text: &str, width: u16, style: Style);

    fn move_cursor(&mut self, row: u16, col: u16);

    fn flush(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    symbol: char,
    style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            symbol: ' ',
            style: Style::default(),
        }
    }
}

/// In-memory surface for tests and headless use.
///
/// Keeps a character grid with per-cell styles, the last flushed copy of
/// it, and counters for flushes and resizes.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    terminal_size: Dimensions,
    frame_size: Dimensions,
    cells: Vec<Cell>,
    displayed: Vec<Cell>,
    cursor: (u16, u16),
    flushes: usize,
    resizes: usize,
}

impl MemorySurface {
    pub fn new(height: u16, width: u16) -> Self {
        let size = Dimensions::new(height, width);
        let area = height as usize * width as usize;
        Self {
            terminal_size: size,
            frame_size: size,
            cells: vec![Cell::default(); area],
            displayed: vec![Cell::default(); area],
            cursor: (0, 0),
            flushes: 0,
            resizes: 0,
        }
    }

    /// Pretend the user resized the terminal window
    pub fn set_terminal_size(&mut self, height: u16, width: u16) {
        self.terminal_size = Dimensions::new(height, width);
    }

    /// Text of `row` in the current frame, trailing spaces trimmed
    pub fn line(&self, row: u16) -> String {
        Self::render_line(&self.cells, self.frame_size, row)
    }

    /// All rows of the current frame
    pub fn lines(&self) -> Vec<String> {
        (0..self.frame_size.height).map(|row| self.line(row)).collect()
    }

    /// Text of `row` as of the last flush
    pub fn displayed_line(&self, row: u16) -> String {
        Self::render_line(&self.displayed, self.frame_size, row)
    }

    pub fn style_at(&self, row: u16, col: u16) -> Style {
        self.index(row, col)
            .map(|i| self.cells[i].style)
            .unwrap_or_default()
    }

    pub fn cursor(&self) -> (u16, u16) {
        self.cursor
    }

    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    pub fn resize_count(&self) -> usize {
        self.resizes
    }

    fn index(&self, row: u16, col: u16) -> Option<usize> {
        (row < self.frame_size.height && col < self.frame_size.width)
            .then(|| row as usize * self.frame_size.width as usize + col as usize)
    }

    fn render_line(cells: &[Cell], size: Dimensions, row: u16) -> String {
        if row >= size.height {
            return String::new();
        }
        let start = row as usize * size.width as usize;
        let line: String = cells[start..start + size.width as usize]
            .iter()
            .map(|cell| cell.symbol)
            .collect();
        line.trim_end().to_string()
    }
}

impl Surface for MemorySurface {
    fn size(&self) -> Result<Dimensions> {
        Ok(self.terminal_size)
    }

    fn was_resized(&self, dimensions: Dimensions) -> bool {
        dimensions != self.frame_size
    }

    fn resize(&mut self, dimensions: Dimensions) -> Result<()> {
        let area = dimensions.height as usize * dimensions.width as usize;
        self.frame_size = dimensions;
        self.cells = vec![Cell::default(); area];
        self.displayed = vec![Cell::default(); area];
        self.resizes += 1;
        Ok(())
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    fn put(&mut self, row: u16, col: u16, text: &str, width: u16, style: Style) {
        for (offset, symbol) in fit_text(text, width as usize).chars().enumerate() {
            let Some(col) = col.checked_add(offset as u16) else {
                break;
            };
            match self.index(row, col) {
                Some(i) => self.cells[i] = Cell { symbol, style },
                None => break,
            }
        }
    }

    fn move_cursor(&mut self, row: u16, col: u16) {
        self.cursor = (row, col);
    }

    fn flush(&mut self) -> Result<()> {
        self.displayed.clone_from(&self.cells);
        self.flushes += 1;
        Ok(())
    }
}
