use super::display::{BLANK_MARKER, DisplayError, LINES, MARKER, PanelDisplay, WIDTH, truncate};

/// Rows visible at once. The window start is always a multiple of this.
pub const PAGE_SIZE: usize = LINES;

/// A cursor move that actually moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorMove {
    pub previous: usize,
    /// The visible window jumped to a new page; every row must be
    /// repainted to drop stale markers.
    pub paginated: bool,
}

/// Windowed selection over the playlist names.
#[derive(Debug, Clone, Default)]
pub struct MenuList {
    items: Vec<String>,
    window_start: usize,
    selected: usize,
}

impl MenuList {
    pub fn new(items: Vec<String>) -> Self {
        Self {
            items,
            window_start: 0,
            selected: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn window_start(&self) -> usize {
        self.window_start
    }

    pub fn selected_item(&self) -> Option<&str> {
        self.items.get(self.selected).map(String::as_str)
    }

    /// Move one step up; `None` when already at the top.
    pub fn up(&mut self) -> Option<CursorMove> {
        if self.selected == 0 {
            return None;
        }
        Some(self.move_to(self.selected - 1))
    }

    /// Move one step down; `None` when already at the bottom.
    pub fn down(&mut self) -> Option<CursorMove> {
        if self.selected + 1 >= self.items.len() {
            return None;
        }
        Some(self.move_to(self.selected + 1))
    }

    fn move_to(&mut self, target: usize) -> CursorMove {
        let previous = self.selected;
        self.selected = target;
        let in_window =
            target >= self.window_start && target < self.window_start + PAGE_SIZE;
        if !in_window {
            self.window_start = (target / PAGE_SIZE) * PAGE_SIZE;
        }
        CursorMove {
            previous,
            paginated: !in_window,
        }
    }

    /// Repaint every visible row.
    pub fn render(&self, display: &mut dyn PanelDisplay) -> Result<(), DisplayError> {
        display.clear()?;
        let end = (self.window_start + PAGE_SIZE).min(self.items.len());
        for (row, index) in (self.window_start..end).enumerate() {
            display.write_line(row + 1, &self.row_text(index))?;
        }
        Ok(())
    }

    /// Repaint after a move: the two affected rows, or the whole page
    /// when the window jumped.
    pub fn render_move(
        &self,
        display: &mut dyn PanelDisplay,
        moved: CursorMove,
    ) -> Result<(), DisplayError> {
        if moved.paginated {
            return self.render(display);
        }
        display.write_line(
            moved.previous - self.window_start + 1,
            &self.row_text(moved.previous),
        )?;
        display.write_line(
            self.selected - self.window_start + 1,
            &self.row_text(self.selected),
        )
    }

    fn row_text(&self, index: usize) -> String {
        let prefix = if index == self.selected {
            MARKER
        } else {
            BLANK_MARKER
        };
        format!("{prefix}{}", truncate(&self.items[index], WIDTH - MARKER.len()))
    }
}
