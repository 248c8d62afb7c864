use std::cell::Cell;

/// Visible window onto a scrollable panel.
///
/// Its width is the outer width minus a vertical scrollbar allowance while
/// that scrollbar is showing.
#[derive(Debug)]
pub struct Viewport {
    outer_width: Cell<u32>,
    height: Cell<u32>,
    chrome: u32,
    scrollbar_width: u32,
    vertical_bar: Cell<bool>,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            outer_width: Cell::new(width),
            height: Cell::new(height),
            chrome: 0,
            scrollbar_width: 0,
            vertical_bar: Cell::new(false),
        }
    }

    /// Columns taken by the vertical scrollbar when it shows.
    pub fn with_scrollbar(mut self, width: u32) -> Self {
        self.scrollbar_width = width;
        self
    }

    /// Window decoration subtracted when the viewport follows a window.
    pub fn with_chrome(mut self, chrome: u32) -> Self {
        self.chrome = chrome;
        self
    }

    pub fn width(&self) -> u32 {
        let bar = if self.vertical_bar.get() {
            self.scrollbar_width
        } else {
            0
        };
        self.outer_width.get().saturating_sub(bar)
    }

    pub fn height(&self) -> u32 {
        self.height.get()
    }

    pub fn set_height(&self, height: u32) {
        self.height.set(height);
    }

    /// Follow the enclosing window's width.
    pub fn fit_window(&self, window_width: u32) {
        self.outer_width.set(window_width.saturating_sub(self.chrome));
    }

    pub fn vertical_scrollbar_visible(&self) -> bool {
        self.vertical_bar.get()
    }

    /// Show the vertical scrollbar iff the content is taller than the viewport.
    ///
    /// Returns true when the usable width changed as a result.
    pub fn reconcile_scrollbar(&self, content_height: u32) -> bool {
        let needed = self.scrollbar_width > 0 && content_height > self.height.get();
        if needed == self.vertical_bar.get() {
            return false;
        }
        self.vertical_bar.set(needed);
        true
    }
}
