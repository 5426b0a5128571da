use std::ops::Range;

/// Rows a bordered panel loses to its top and bottom edges
const PANEL_CHROME: u16 = 2;

/// Browse pointer over the catalog, independent of what is playing.
///
/// Invariant: `index < len`. Movement clamps at both ends, it never wraps.
/// The visible window pages rather than scrolls: it starts at the largest
/// multiple of the page size not past the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionCursor {
    index: usize,
    len: usize,
    viewport_height: Option<u16>,
}

impl SelectionCursor {
    /// `len` is clamped to at least 1; the catalog is never empty
    pub fn new(len: usize) -> Self {
        Self {
            index: 0,
            len: len.max(1),
            viewport_height: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn move_up(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    pub fn move_down(&mut self) -> bool {
        if self.index + 1 < self.len {
            self.index += 1;
            true
        } else {
            false
        }
    }

    pub fn set(&mut self, index: usize) {
        self.index = index.min(self.len - 1);
    }

    /// Adopt a new catalog length, pulling the cursor back inside if needed
    pub fn resize(&mut self, len: usize) {
        self.len = len.max(1);
        self.index = self.index.min(self.len - 1);
    }

    /// Outer height of the playlist panel, borders included
    pub fn set_viewport_height(&mut self, height: u16) {
        self.viewport_height = Some(height);
    }

    /// Rows per page; everything fits on one page until the viewport is known
    pub fn page_size(&self) -> usize {
        match self.viewport_height {
            Some(height) => usize::from(height.saturating_sub(PANEL_CHROME)).max(1),
            None => self.len,
        }
    }

    pub fn window_start(&self) -> usize {
        let page = self.page_size();
        self.index - self.index % page
    }

    pub fn visible_range(&self) -> Range<usize> {
        let start = self.window_start();
        start..(start + self.page_size()).min(self.len)
    }
}
