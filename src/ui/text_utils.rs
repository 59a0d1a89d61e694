//! Text fitting helpers for fixed-width cells

/// Left-align `text` in a cell of `width` characters, truncating or padding
/// with spaces. Control characters (newlines, tabs) become spaces so a
/// value can never break the row grid.
pub fn fit_text(text: &str, width: usize) -> String {
    let mut fitted: String = text
        .chars()
        .take(width)
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let len = fitted.chars().count();
    if len < width {
        fitted.extend(std::iter::repeat(' ').take(width - len));
    }
    fitted
}

/// Equal share of the terminal width per column. Zero columns is treated as
/// one so an empty schema never divides by zero.
pub fn column_width(terminal_width: u16, column_count: usize) -> usize {
    terminal_width as usize / column_count.max(1)
}
