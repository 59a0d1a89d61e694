use crate::config::Config;
use crate::data::filter_table::FilterTable;
use crate::data::record::{display_value, Record, Row};
use crate::data::table::{Table, TableHandle};
use crate::search_filter::{MatchMode, TextMatcher};
use crate::ui::keys::{Key, KeySource};
use crate::ui::scroll_utils::{scroll_window, visible_row_count};
use crate::ui::surface::{Dimensions, Surface};
use crate::ui::text_utils::column_width;
use anyhow::Result;
use ratatui::style::{Color, Modifier, Style};
use std::time::Duration;
use tracing::{debug, info, trace};

/// Presentation settings for [`TableView`]
#[derive(Debug, Clone)]
pub struct ViewOptions {
    pub prompt: String,
    /// How long a row fetch may take before the screen is flushed anyway
    pub refresh_delay: Duration,
    pub match_mode: MatchMode,
    pub header_palette: Vec<Color>,
    pub cell_palette: Vec<Color>,
    pub selected_modifier: Modifier,
}

impl ViewOptions {
    pub fn from_config(config: &Config) -> Self {
        let mut selected_modifier = Modifier::empty();
        if config.theme.selected_bold {
            selected_modifier |= Modifier::BOLD;
        }
        if config.theme.selected_reversed {
            selected_modifier |= Modifier::REVERSED;
        }

        Self {
            prompt: config.display.prompt.clone(),
            refresh_delay: config.display.refresh_delay(),
            match_mode: config.search.match_mode,
            header_palette: config.theme.header_palette(),
            cell_palette: config.theme.cell_palette(),
            selected_modifier,
        }
    }
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Result of handling one key
#[derive(Debug, Clone)]
pub enum Step {
    /// Keep reading keys
    Continue,
    /// The view is finished; `Some` when a record was confirmed
    Done(Option<Record>),
}

/// Interactive, searchable view over a table.
///
/// Holds the base table for the whole session and the table currently on
/// screen, which is either the base itself or a filter built for the
/// current search text. Rows are pulled lazily, only for the visible
/// window.
pub struct TableView<S> {
    surface: S,
    options: ViewOptions,
    base: TableHandle,
    active: TableHandle,
    selected_row: usize,
    search_text: String,
    visible_rows: usize,
}

impl<S: Surface> TableView<S> {
    pub fn new(surface: S, base: TableHandle, options: ViewOptions) -> Self {
        Self {
            surface,
            options,
            active: base.clone(),
            base,
            selected_row: 0,
            search_text: String::new(),
            visible_rows: 0,
        }
    }

    pub fn selected_row(&self) -> usize {
        self.selected_row
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn base_table(&self) -> &TableHandle {
        &self.base
    }

    pub fn active_table(&self) -> &TableHandle {
        &self.active
    }

    pub fn is_filtered(&self) -> bool {
        !self.active.same_table(&self.base)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Draw, then handle keys until the user confirms or cancels.
    ///
    /// Returns the confirmed record, or `None` on cancel (or when confirming
    /// on an empty table).
    pub async fn show<K: KeySource + ?Sized>(&mut self, keys: &mut K) -> Result<Option<Record>> {
        self.draw().await?;
        loop {
            let key = keys.next_key().await?;
            if let Step::Done(selection) = self.handle_key(key).await? {
                return Ok(selection);
            }
        }
    }

    /// Apply one key. Every key that does not end the view repaints.
    pub async fn handle_key(&mut self, key: Key) -> Result<Step> {
        trace!(target: "input", "Handling {:?} at row {}", key, self.selected_row);
        match key {
            Key::Enter => {
                let selection = self.active.get(self.selected_row).await;
                info!(
                    target: "view",
                    "Confirmed row {} ({})",
                    self.selected_row,
                    if selection.is_some() { "record" } else { "empty" }
                );
                return Ok(Step::Done(selection));
            }
            Key::Escape => {
                info!(target: "view", "Cancelled");
                return Ok(Step::Done(None));
            }
            Key::Down => self.move_down().await,
            Key::Up => self.move_up(),
            Key::PageDown => self.page_down().await,
            Key::PageUp => self.page_up(),
            Key::Home => self.selected_row = 0,
            Key::Backspace => {
                self.search_text.pop();
                self.apply_search().await;
            }
            Key::Char(c) => {
                self.search_text.push(c);
                self.apply_search().await;
            }
            Key::Resize | Key::Other => {}
        }

        self.draw().await?;
        Ok(Step::Continue)
    }

    pub async fn move_down(&mut self) {
        if self.active.get(self.selected_row + 1).await.is_some() {
            self.selected_row += 1;
        }
    }

    pub fn move_up(&mut self) {
        if self.selected_row >= 1 {
            self.selected_row -= 1;
        }
    }

    async fn page_down(&mut self) {
        for _ in 0..self.visible_rows.max(1) {
            let before = self.selected_row;
            self.move_down().await;
            if self.selected_row == before {
                break;
            }
        }
    }

    fn page_up(&mut self) {
        self.selected_row = self.selected_row.saturating_sub(self.visible_rows.max(1));
    }

    /// Point the view at the table for the current search text.
    ///
    /// Any non-empty text gets a brand new filter over the base table;
    /// nothing is carried over from the previous query. Empty text goes back
    /// to the base table itself.
    async fn apply_search(&mut self) {
        if self.search_text.is_empty() {
            if self.is_filtered() {
                debug!(target: "filter", "Search cleared, back to base table");
                self.active = self.base.clone();
            }
        } else {
            debug!(
                target: "filter",
                "Filtering on {:?} ({:?})",
                self.search_text,
                self.options.match_mode
            );
            let matcher = TextMatcher::new(&self.search_text, self.options.match_mode);
            self.active = TableHandle::new(FilterTable::new(self.base.clone(), matcher));
        }

        self.clamp_selection().await;
    }

    async fn clamp_selection(&mut self) {
        while self.selected_row > 0 && self.active.get(self.selected_row).await.is_none() {
            self.selected_row -= 1;
        }
    }

    /// Repaint the whole screen: table, prompt, cursor.
    pub async fn draw(&mut self) -> Result<()> {
        let dimensions = self.surface.size()?;
        if self.surface.was_resized(dimensions) {
            self.surface.resize(dimensions)?;
        }
        self.surface.clear();

        self.draw_prompt(dimensions);
        self.draw_table(dimensions).await?;

        let prompt_len = self.options.prompt.chars().count() + self.search_text.chars().count();
        let cursor_col = cursor_column(prompt_len, dimensions.width);
        self.surface
            .move_cursor(dimensions.height.saturating_sub(1), cursor_col);
        self.surface.flush()
    }

    fn draw_prompt(&mut self, dimensions: Dimensions) {
        let text = format!("{}{}", self.options.prompt, self.search_text);
        self.surface.put(
            dimensions.height.saturating_sub(1),
            0,
            &text,
            dimensions.width,
            Style::default(),
        );
    }

    async fn draw_table(&mut self, dimensions: Dimensions) -> Result<()> {
        self.visible_rows = visible_row_count(dimensions.height);
        let window = scroll_window(self.selected_row, self.visible_rows);

        // schema always comes from the unfiltered table
        let column_count = self.base.column_count().await;
        let width = column_width(dimensions.width, column_count);

        for i in 0..column_count {
            let name = self.base.column_name(i).await.unwrap_or_default();
            let style = Style::default()
                .fg(pick(&self.options.header_palette, i))
                .add_modifier(Modifier::BOLD);
            self.surface
                .put(0, (i * width) as u16, &name, width as u16, style);
        }

        if column_count == 0 {
            return Ok(());
        }

        trace!(target: "view", "Drawing rows {:?}", window);
        for index in window.clone() {
            let row = self.fetch_row(index).await?;
            let screen_row = (index + 1 - window.start) as u16;
            let emphasis = if index == self.selected_row {
                self.options.selected_modifier
            } else {
                Modifier::empty()
            };

            for j in 0..column_count {
                let text = row
                    .as_ref()
                    .and_then(|values| values.get(j))
                    .map(display_value)
                    .unwrap_or_default();
                let style = Style::default()
                    .fg(pick(&self.options.cell_palette, j))
                    .add_modifier(emphasis);
                self.surface
                    .put(screen_row, (j * width) as u16, &text, width as u16, style);
            }
        }

        Ok(())
    }

    /// Fetch a row, flushing what is already drawn if the fetch is slow.
    ///
    /// The refresh timer races the fetch and is dropped as soon as the row
    /// arrives, whether or not it has fired. It fires at most once.
    async fn fetch_row(&mut self, index: usize) -> Result<Option<Row>> {
        let Self {
            surface,
            active,
            options,
            ..
        } = self;

        let fetch = active.row(index);
        tokio::pin!(fetch);
        let refresh = tokio::time::sleep(options.refresh_delay);
        tokio::pin!(refresh);
        let mut refreshed = false;

        loop {
            tokio::select! {
                row = &mut fetch => return Ok(row),
                () = &mut refresh, if !refreshed => {
                    refreshed = true;
                    trace!(target: "view", "Row {} is slow, flushing partial frame", index);
                    surface.flush()?;
                }
            }
        }
    }
}

/// Column just past the prompt text, kept on screen
fn cursor_column(prompt_len: usize, width: u16) -> u16 {
    prompt_len.min(width.saturating_sub(1) as usize) as u16
}

fn pick(palette: &[Color], index: usize) -> Color {
    if palette.is_empty() {
        Color::Reset
    } else {
        palette[index % palette.len()]
    }
}
