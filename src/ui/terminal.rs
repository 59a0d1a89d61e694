use crate::ui::surface::{Dimensions, Surface};
use crate::ui::text_utils::fit_text;
use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    buffer::Buffer,
    layout::{Position, Rect},
    style::Style,
    Terminal,
};
use std::io::{self, Stderr};
use tracing::debug;

/// Full-screen surface on the controlling terminal.
///
/// Drawing happens on stderr so stdout stays free for the selected record.
/// Raw mode and the alternate screen are entered on construction and left
/// again on drop.
pub struct TerminalSurface {
    terminal: Terminal<CrosstermBackend<Stderr>>,
    frame: Buffer,
    cursor: Position,
}

impl TerminalSurface {
    pub fn new() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;

        let mut stderr = io::stderr();
        if let Err(e) = execute!(stderr, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(anyhow::anyhow!("Failed to setup terminal: {}", e));
        }

        let backend = CrosstermBackend::new(stderr);
        let terminal = match Terminal::new(backend) {
            Ok(t) => t,
            Err(e) => {
                let _ = disable_raw_mode();
                let _ = execute!(io::stderr(), LeaveAlternateScreen);
                return Err(anyhow::anyhow!("Failed to create terminal: {}", e));
            }
        };

        let size = terminal.size()?;
        let frame = Buffer::empty(Rect::new(0, 0, size.width, size.height));
        debug!(target: "view", "Terminal ready at {}x{}", size.width, size.height);

        Ok(Self {
            terminal,
            frame,
            cursor: Position::new(0, 0),
        })
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        // Always restore terminal, even on error
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

impl Surface for TerminalSurface {
    fn size(&self) -> Result<Dimensions> {
        let size = self.terminal.size()?;
        Ok(Dimensions::new(size.height, size.width))
    }

    fn was_resized(&self, dimensions: Dimensions) -> bool {
        self.frame.area.height != dimensions.height || self.frame.area.width != dimensions.width
    }

    fn resize(&mut self, dimensions: Dimensions) -> Result<()> {
        let area = Rect::new(0, 0, dimensions.width, dimensions.height);
        self.terminal.resize(area)?;
        self.frame = Buffer::empty(area);
        debug!(target: "view", "Resized to {}x{}", dimensions.width, dimensions.height);
        Ok(())
    }

    fn clear(&mut self) {
        self.frame.reset();
    }

    fn put(&mut self, row: u16, col: u16, text: &str, width: u16, style: Style) {
        let area = self.frame.area;
        if row >= area.height || col >= area.width {
            return;
        }
        let width = width.min(area.width - col) as usize;
        self.frame
            .set_stringn(col, row, fit_text(text, width), width, style);
    }

    fn move_cursor(&mut self, row: u16, col: u16) {
        self.cursor = Position::new(col, row);
    }

    fn flush(&mut self) -> Result<()> {
        // Terminal diffs its current buffer against what was last shown, so
        // hand it a copy of the frame; the frame itself survives partial
        // flushes in the middle of a repaint.
        self.terminal.current_buffer_mut().clone_from(&self.frame);
        self.terminal.flush()?;
        self.terminal.swap_buffers();
        self.terminal.set_cursor_position(self.cursor)?;
        self.terminal.show_cursor()?;
        Backend::flush(self.terminal.backend_mut())?;
        Ok(())
    }
}
