use crate::geometry::Size;
use crate::width::display_width;

/// A rectangular element the flow layout can measure.
///
/// The engine only reads sizes; it never mutates items.
pub trait LayoutItem {
    fn preferred_size(&self) -> Size;

    fn minimum_size(&self) -> Size {
        self.preferred_size()
    }

    fn is_visible(&self) -> bool {
        true
    }
}

impl<T: LayoutItem + ?Sized> LayoutItem for Box<T> {
    fn preferred_size(&self) -> Size {
        (**self).preferred_size()
    }

    fn minimum_size(&self) -> Size {
        (**self).minimum_size()
    }

    fn is_visible(&self) -> bool {
        (**self).is_visible()
    }
}

/// Item with explicit sizes, e.g. an icon button of known extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedItem {
    preferred: Size,
    minimum: Size,
    visible: bool,
}

impl FixedItem {
    pub fn new(width: u32, height: u32) -> Self {
        let size = Size::new(width, height);
        Self {
            preferred: size,
            minimum: size,
            visible: true,
        }
    }

    pub fn with_minimum(mut self, width: u32, height: u32) -> Self {
        self.minimum = Size::new(width, height);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

impl LayoutItem for FixedItem {
    fn preferred_size(&self) -> Size {
        self.preferred
    }

    fn minimum_size(&self) -> Size {
        self.minimum
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Text chip sized by the display width of its label.
///
/// ANSI styling in the label does not count towards its width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelItem {
    text: String,
    padding: u32,
    height: u32,
    visible: bool,
}

impl LabelItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            padding: 1,
            height: 1,
            visible: true,
        }
    }

    /// Columns added on each side of the label.
    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

impl LayoutItem for LabelItem {
    fn preferred_size(&self) -> Size {
        let columns = u32::try_from(display_width(&self.text)).unwrap_or(u32::MAX);
        Size::new(
            columns.saturating_add(self.padding.saturating_mul(2)),
            self.height,
        )
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}
