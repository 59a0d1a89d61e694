//! Scroll window calculations for the row viewport

use std::ops::Range;

/// Rows left for data once the header and the search prompt are drawn
pub fn visible_row_count(terminal_height: u16) -> usize {
    terminal_height.saturating_sub(2) as usize
}

/// Indices to render so that `selected` is on screen.
///
/// The window scrolls the minimum amount: it stays at the top until the
/// selection passes the last visible row, then keeps the selection on the
/// bottom line.
pub fn scroll_window(selected: usize, visible_rows: usize) -> Range<usize> {
    let min_row = (selected + 1).saturating_sub(visible_rows);
    min_row..min_row + visible_rows
}
