//! Scrollable wrap panel: the host-facing container around the flow engine.
//!
//! The panel reports a deliberately narrow preferred width so an enclosing
//! host can always shrink it, tracks its viewport's width, and lets its
//! height follow the wrapped content so vertical scrolling works.

mod theme;
mod viewport;

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;

use crate::error::{LayoutError, Result};
use crate::geometry::{Insets, Rect, Size};
use crate::layout::{
    FlowLayout, FlowTarget, LayoutItem, MeasureCache, MeasureKey, Placement, SeedSizes,
    SizeSelector,
};
use crate::logging::{LogLevel, Logger, emit, json_kv};
use crate::metrics::LayoutMetrics;

pub use theme::{Rgb, StaticTheme, ThemeProvider};
pub use viewport::Viewport;

const LOG_TARGET: &str = "wrapflow::layout";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Result of one revalidation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevalidateOutcome {
    /// Size the panel adopted.
    pub size: Size,
    pub rows: usize,
    /// The viewport's usable width changed (scrollbar toggled) during the pass.
    pub viewport_changed: bool,
}

pub struct WrapPanel {
    items: Vec<Box<dyn LayoutItem>>,
    layout: Option<FlowLayout>,
    theme: Rc<dyn ThemeProvider>,
    border: Option<Insets>,
    size: Size,
    viewport: Option<Rc<Viewport>>,
    valid: bool,
    placements: Vec<Placement>,
    seeds: SeedSizes,
    cache: MeasureCache,
    revision: u64,
    metrics: Option<Rc<RefCell<LayoutMetrics>>>,
    logger: Option<Logger>,
    paint_count: u64,
}

impl Default for WrapPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl WrapPanel {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            layout: Some(FlowLayout::default()),
            theme: Rc::new(StaticTheme::default()),
            border: None,
            size: Size::ZERO,
            viewport: None,
            valid: false,
            placements: Vec::new(),
            seeds: SeedSizes::default(),
            cache: MeasureCache::new(),
            revision: 0,
            metrics: None,
            logger: None,
            paint_count: 0,
        }
    }

    /// Convenience for hosts that share the panel with a [`crate::ResizeSync`].
    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    pub fn with_layout(mut self, layout: FlowLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn with_theme(mut self, theme: Rc<dyn ThemeProvider>) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_border(mut self, border: Insets) -> Self {
        self.border = Some(border);
        self
    }

    pub fn with_seeds(mut self, seeds: SeedSizes) -> Self {
        self.seeds = seeds;
        self
    }

    pub fn with_viewport(mut self, viewport: Rc<Viewport>) -> Self {
        self.viewport = Some(viewport);
        self
    }

    pub fn with_metrics(mut self, metrics: Rc<RefCell<LayoutMetrics>>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn layout(&self) -> Option<&FlowLayout> {
        self.layout.as_ref()
    }

    pub fn set_layout(&mut self, layout: Option<FlowLayout>) {
        self.layout = layout;
        self.invalidate();
    }

    pub fn set_border(&mut self, border: Option<Insets>) {
        self.border = border;
        self.invalidate();
    }

    pub fn viewport(&self) -> Option<&Rc<Viewport>> {
        self.viewport.as_ref()
    }

    pub fn set_viewport(&mut self, viewport: Option<Rc<Viewport>>) {
        self.viewport = viewport;
        self.invalidate();
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, size: Size) {
        if self.size != size {
            self.size = size;
            self.invalidate();
        }
    }

    pub fn add<I>(&mut self, item: I)
    where
        I: LayoutItem + 'static,
    {
        self.items.push(Box::new(item));
        self.items_changed();
    }

    pub fn insert<I>(&mut self, index: usize, item: I) -> Result<()>
    where
        I: LayoutItem + 'static,
    {
        if index > self.items.len() {
            return Err(self.missing(index));
        }
        self.items.insert(index, Box::new(item));
        self.items_changed();
        Ok(())
    }

    pub fn replace<I>(&mut self, index: usize, item: I) -> Result<Box<dyn LayoutItem>>
    where
        I: LayoutItem + 'static,
    {
        let len = self.items.len();
        let slot = self
            .items
            .get_mut(index)
            .ok_or(LayoutError::ItemNotFound { index, len })?;
        let previous = std::mem::replace(slot, Box::new(item));
        self.items_changed();
        Ok(previous)
    }

    pub fn remove(&mut self, index: usize) -> Result<Box<dyn LayoutItem>> {
        if index >= self.items.len() {
            return Err(self.missing(index));
        }
        let removed = self.items.remove(index);
        self.items_changed();
        Ok(removed)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items are treated as immutable once added; replace one to change it.
    fn items_changed(&mut self) {
        self.revision = self.revision.wrapping_add(1);
        self.invalidate();
    }

    fn missing(&self, index: usize) -> LayoutError {
        LayoutError::ItemNotFound {
            index,
            len: self.items.len(),
        }
    }

    /// Wrapped preferred size from the layout, ignoring seed sizing.
    pub fn preferred_layout_size(&mut self) -> Option<Size> {
        self.measure(SizeSelector::Preferred)
    }

    pub fn minimum_layout_size(&mut self) -> Option<Size> {
        self.measure(SizeSelector::Minimum)
    }

    fn measure(&mut self, selector: SizeSelector) -> Option<Size> {
        let layout = self.layout?;
        let key = MeasureKey::for_target(&layout, &*self, selector, self.revision);
        let mut cache = std::mem::take(&mut self.cache);
        let (size, hit) = cache.get_or_insert_with(key, || match selector {
            SizeSelector::Preferred => layout.preferred_layout_size(&*self),
            SizeSelector::Minimum => layout.minimum_layout_size(&*self),
        });
        self.cache = cache;
        if let Some(metrics) = self.metrics.as_ref() {
            metrics.borrow_mut().record_measurement(hit);
        }
        Some(size)
    }

    /// Narrow preferred size: the width the host should respect, wrapped height.
    pub fn preferred_size(&mut self) -> Size {
        let Some(layout_size) = self.preferred_layout_size() else {
            return self.seeds.preferred;
        };
        let viewport_width = self.viewport.as_ref().map(|viewport| viewport.width()).unwrap_or(0);
        let width = if viewport_width > 0 {
            viewport_width
        } else if self.size.width > 0 {
            self.size.width
        } else {
            self.seeds.narrow_width
        };
        Size::new(width, layout_size.height)
    }

    pub fn minimum_size(&self) -> Size {
        self.seeds.minimum
    }

    pub fn preferred_scrollable_viewport_size(&mut self) -> Size {
        match self.preferred_layout_size() {
            Some(size) => Size::new(self.seeds.narrow_width, size.height),
            None => self.seeds.scrollable,
        }
    }

    pub fn tracks_viewport_width(&self) -> bool {
        true
    }

    pub fn tracks_viewport_height(&self) -> bool {
        false
    }

    pub fn scrollable_unit_increment(&self, orientation: Orientation) -> u32 {
        match orientation {
            Orientation::Vertical => 20,
            Orientation::Horizontal => 10,
        }
    }

    pub fn scrollable_block_increment(&self, visible: Rect, orientation: Orientation) -> u32 {
        match orientation {
            Orientation::Vertical => visible.height,
            Orientation::Horizontal => visible.width,
        }
    }

    pub fn border_color(&self, key: &str) -> Option<Rgb> {
        self.theme.color(key)
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Adopt the viewport width, place the items and settle the scrollbar.
    pub fn revalidate(&mut self) -> RevalidateOutcome {
        if let Some(viewport) = self.viewport.as_ref() {
            self.size.width = viewport.width();
        }

        let height = self
            .preferred_layout_size()
            .map(|size| size.height)
            .unwrap_or(self.size.height);
        self.size.height = height;

        let (placements, rows) = match self.layout {
            Some(layout) => {
                let (placements, rows) = layout.arrange(&*self);
                (placements, rows.len())
            }
            None => (Vec::new(), 0),
        };
        self.placements = placements;
        self.valid = true;

        let viewport_changed = self
            .viewport
            .as_ref()
            .map(|viewport| viewport.reconcile_scrollbar(height))
            .unwrap_or(false);

        if let Some(metrics) = self.metrics.as_ref() {
            metrics.borrow_mut().record_layout_pass();
        }
        emit(
            self.logger.as_ref(),
            LogLevel::Debug,
            LOG_TARGET,
            "layout_pass",
            [
                json_kv("width", json!(self.size.width)),
                json_kv("height", json!(self.size.height)),
                json_kv("rows", json!(rows)),
                json_kv("viewport_changed", json!(viewport_changed)),
            ],
        );

        RevalidateOutcome {
            size: self.size,
            rows,
            viewport_changed,
        }
    }

    /// Request a repaint; painting itself belongs to the host.
    pub fn repaint(&mut self) {
        self.paint_count = self.paint_count.saturating_add(1);
    }

    pub fn paint_count(&self) -> u64 {
        self.paint_count
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }
}

impl FlowTarget for WrapPanel {
    fn item_count(&self) -> usize {
        self.items.len()
    }

    fn item(&self, index: usize) -> Option<&dyn LayoutItem> {
        self.items.get(index).map(|item| item.as_ref())
    }

    fn insets(&self) -> Insets {
        self.border.unwrap_or_else(|| self.theme.panel_insets())
    }

    fn current_width(&self) -> u32 {
        self.size.width
    }

    fn viewport_width(&self) -> Option<u32> {
        self.viewport.as_ref().map(|viewport| viewport.width())
    }

    fn is_valid(&self) -> bool {
        self.valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Alignment, FixedItem, LabelItem};

    fn panel_with(count: usize) -> WrapPanel {
        let mut panel = WrapPanel::new().with_layout(FlowLayout::new(Alignment::Left, 5, 5));
        for _ in 0..count {
            panel.add(FixedItem::new(40, 40));
        }
        panel
    }

    #[test]
    fn seed_sizes_without_layout() {
        let mut panel = WrapPanel::new();
        panel.set_layout(None);
        assert_eq!(panel.preferred_size(), Size::new(10, 50));
        assert_eq!(panel.minimum_size(), Size::new(10, 10));
        assert_eq!(panel.preferred_scrollable_viewport_size(), Size::new(10, 100));
    }

    #[test]
    fn unattached_panel_reports_narrow_width() {
        let mut panel = panel_with(3);
        assert_eq!(panel.preferred_size(), Size::new(10, 50));
        assert_eq!(panel.preferred_scrollable_viewport_size(), Size::new(10, 50));
        assert!(panel.tracks_viewport_width());
        assert!(!panel.tracks_viewport_height());
    }

    #[test]
    fn preferred_width_follows_viewport() {
        let viewport = Rc::new(Viewport::new(140, 300));
        let mut panel = panel_with(6).with_viewport(Rc::clone(&viewport));
        assert_eq!(panel.preferred_size(), Size::new(140, 95));

        panel.set_size(Size::new(500, 95));
        assert_eq!(panel.preferred_size(), Size::new(140, 95));
    }

    #[test]
    fn preferred_width_falls_back_to_own_width() {
        let mut panel = panel_with(6);
        panel.set_size(Size::new(140, 0));
        assert_eq!(panel.preferred_size(), Size::new(140, 95));
    }

    #[test]
    fn revalidate_places_items_at_viewport_width() {
        let viewport = Rc::new(Viewport::new(140, 300));
        let mut panel = panel_with(6).with_viewport(viewport);
        let outcome = panel.revalidate();

        assert_eq!(outcome.size, Size::new(140, 95));
        assert_eq!(outcome.rows, 2);
        assert!(!outcome.viewport_changed);
        assert!(panel.is_valid());
        assert_eq!(panel.placements().len(), 6);
        assert_eq!(panel.placements()[3].bounds, Rect::new(5, 50, 40, 40));
    }

    #[test]
    fn revalidate_reports_scrollbar_toggle() {
        let viewport = Rc::new(Viewport::new(140, 60).with_scrollbar(10));
        let mut panel = panel_with(6).with_viewport(Rc::clone(&viewport));

        let first = panel.revalidate();
        assert!(first.viewport_changed);
        assert_eq!(viewport.width(), 130);

        let second = panel.revalidate();
        assert_eq!(second.size.width, 130);
        assert!(!second.viewport_changed);
    }

    #[test]
    fn border_overrides_theme_insets() {
        let theme = Rc::new(StaticTheme::new(Insets::uniform(3)).with_color("selection", "#66d9ef"));
        let mut panel = WrapPanel::new().with_theme(theme);
        assert_eq!(panel.insets(), Insets::uniform(3));
        assert_eq!(panel.border_color("selection"), Some(Rgb(0x66, 0xd9, 0xef)));

        panel.set_border(Some(Insets::symmetric(4, 8)));
        assert_eq!(panel.insets(), Insets::symmetric(4, 8));
    }

    #[test]
    fn mutations_invalidate_and_check_bounds() {
        let mut panel = panel_with(2);
        panel.revalidate();
        assert!(panel.is_valid());

        panel.insert(1, LabelItem::new("dark")).unwrap();
        assert!(!panel.is_valid());
        assert_eq!(panel.len(), 3);

        let err = panel.remove(7).err().unwrap();
        assert!(matches!(err, LayoutError::ItemNotFound { index: 7, len: 3 }));
        assert!(panel.insert(9, FixedItem::new(1, 1)).is_err());

        let previous = panel.replace(0, FixedItem::new(10, 10).hidden()).unwrap();
        assert_eq!(previous.preferred_size(), Size::new(40, 40));
        assert_eq!(panel.remove(0).unwrap().preferred_size(), Size::new(10, 10));
    }

    #[test]
    fn repeated_queries_hit_the_cache() {
        let metrics = Rc::new(RefCell::new(LayoutMetrics::new()));
        let mut panel = panel_with(4).with_metrics(Rc::clone(&metrics));
        panel.set_size(Size::new(140, 0));
        let first = panel.preferred_layout_size();
        let second = panel.preferred_layout_size();
        assert_eq!(first, second);

        let snapshot = metrics.borrow().snapshot();
        assert_eq!(snapshot.measurements, 1);
        assert_eq!(snapshot.cache_hits, 1);
    }

    #[test]
    fn item_changes_miss_the_cache() {
        let metrics = Rc::new(RefCell::new(LayoutMetrics::new()));
        let mut panel = panel_with(4).with_metrics(Rc::clone(&metrics));
        panel.set_size(Size::new(140, 0));
        assert_eq!(panel.preferred_layout_size(), Some(Size::new(140, 95)));

        panel.replace(3, FixedItem::new(40, 80)).unwrap();
        assert_eq!(panel.preferred_layout_size(), Some(Size::new(140, 135)));
        panel.remove(3).unwrap();
        assert_eq!(panel.preferred_layout_size(), Some(Size::new(140, 50)));
        panel.add(FixedItem::new(40, 40));
        assert_eq!(panel.preferred_layout_size(), Some(Size::new(140, 95)));

        let snapshot = metrics.borrow().snapshot();
        assert_eq!(snapshot.measurements, 4);
        assert_eq!(snapshot.cache_hits, 0);
    }

    #[test]
    fn scroll_increments() {
        let panel = WrapPanel::new();
        let visible = Rect::new(0, 0, 120, 80);
        assert_eq!(panel.scrollable_unit_increment(Orientation::Vertical), 20);
        assert_eq!(panel.scrollable_unit_increment(Orientation::Horizontal), 10);
        assert_eq!(panel.scrollable_block_increment(visible, Orientation::Vertical), 80);
        assert_eq!(panel.scrollable_block_increment(visible, Orientation::Horizontal), 120);
    }
}
