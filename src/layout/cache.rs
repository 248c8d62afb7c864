//! Measurement cache keyed by a digest of the container's geometry inputs.
//!
//! Hosts query preferred sizes far more often than geometry changes. Items
//! are not measured to build a key: the container supplies a revision that
//! changes whenever its item list changes, and the key folds that in with the
//! resolved width, viewport, validity, insets, gaps and selector.

use std::collections::HashMap;

use blake3::{Hash, Hasher};

use crate::geometry::Size;

use super::adaptive::resolve_available_width;
use super::core::{Alignment, FlowLayout, FlowTarget, SizeSelector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeasureKey(Hash);

impl MeasureKey {
    /// `revision` must change whenever an item is added, removed, replaced or
    /// resized.
    pub fn for_target<T>(
        layout: &FlowLayout,
        target: &T,
        selector: SizeSelector,
        revision: u64,
    ) -> Self
    where
        T: FlowTarget + ?Sized,
    {
        let mut hasher = Hasher::new();
        let viewport = target.viewport_width();
        let insets = target.insets();

        hasher.update(&[match selector {
            SizeSelector::Preferred => 0,
            SizeSelector::Minimum => 1,
        }]);
        hasher.update(&[alignment_tag(layout.alignment), u8::from(target.is_valid())]);
        hasher.update(&revision.to_le_bytes());
        hasher.update(&(target.item_count() as u64).to_le_bytes());
        for value in [
            layout.hgap,
            layout.vgap,
            resolve_available_width(target.current_width(), viewport),
            viewport.unwrap_or(0),
            insets.top,
            insets.left,
            insets.bottom,
            insets.right,
        ] {
            hasher.update(&value.to_le_bytes());
        }

        Self(hasher.finalize())
    }
}

fn alignment_tag(alignment: Alignment) -> u8 {
    match alignment {
        Alignment::Left => 0,
        Alignment::Center => 1,
        Alignment::Right => 2,
        Alignment::Leading => 3,
        Alignment::Trailing => 4,
    }
}

/// Bounded map from measurement keys to sizes; cleared wholesale when full.
#[derive(Debug)]
pub struct MeasureCache {
    entries: HashMap<MeasureKey, Size>,
    capacity: usize,
}

impl Default for MeasureCache {
    fn default() -> Self {
        Self::with_capacity(64)
    }
}

impl MeasureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Returns the size and whether it came from the cache.
    pub fn get_or_insert_with<F>(&mut self, key: MeasureKey, measure: F) -> (Size, bool)
    where
        F: FnOnce() -> Size,
    {
        if let Some(size) = self.entries.get(&key) {
            return (*size, true);
        }
        if self.entries.len() >= self.capacity {
            self.entries.clear();
        }
        let size = measure();
        self.entries.insert(key, size);
        (size, false)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::geometry::Insets;
    use crate::layout::item::{FixedItem, LayoutItem};

    struct Strip {
        items: Vec<FixedItem>,
        width: u32,
    }

    impl FlowTarget for Strip {
        fn item_count(&self) -> usize {
            self.items.len()
        }

        fn item(&self, index: usize) -> Option<&dyn LayoutItem> {
            self.items.get(index).map(|item| item as &dyn LayoutItem)
        }

        fn insets(&self) -> Insets {
            Insets::default()
        }

        fn current_width(&self) -> u32 {
            self.width
        }
    }

    struct Counted {
        calls: Cell<u32>,
    }

    impl LayoutItem for Counted {
        fn preferred_size(&self) -> Size {
            self.calls.set(self.calls.get() + 1);
            Size::new(40, 40)
        }
    }

    struct CountingStrip {
        item: Counted,
    }

    impl FlowTarget for CountingStrip {
        fn item_count(&self) -> usize {
            1
        }

        fn item(&self, index: usize) -> Option<&dyn LayoutItem> {
            (index == 0).then_some(&self.item as &dyn LayoutItem)
        }

        fn insets(&self) -> Insets {
            Insets::default()
        }

        fn current_width(&self) -> u32 {
            100
        }
    }

    #[test]
    fn key_changes_with_width_selector_and_revision() {
        let layout = FlowLayout::default();
        let mut strip = Strip {
            items: vec![FixedItem::new(40, 40); 3],
            width: 140,
        };
        let base = MeasureKey::for_target(&layout, &strip, SizeSelector::Preferred, 0);
        assert_eq!(
            base,
            MeasureKey::for_target(&layout, &strip, SizeSelector::Preferred, 0)
        );
        assert_ne!(
            base,
            MeasureKey::for_target(&layout, &strip, SizeSelector::Minimum, 0)
        );
        assert_ne!(
            base,
            MeasureKey::for_target(&layout, &strip, SizeSelector::Preferred, 1)
        );

        strip.width = 230;
        assert_ne!(
            base,
            MeasureKey::for_target(&layout, &strip, SizeSelector::Preferred, 0)
        );
    }

    #[test]
    fn building_a_key_measures_nothing() {
        let layout = FlowLayout::default();
        let strip = CountingStrip {
            item: Counted {
                calls: Cell::new(0),
            },
        };
        let mut cache = MeasureCache::new();
        let key = MeasureKey::for_target(&layout, &strip, SizeSelector::Preferred, 7);
        assert_eq!(strip.item.calls.get(), 0);

        cache.get_or_insert_with(key, || layout.preferred_layout_size(&strip));
        assert_eq!(strip.item.calls.get(), 1);

        let key = MeasureKey::for_target(&layout, &strip, SizeSelector::Preferred, 7);
        let (size, hit) = cache.get_or_insert_with(key, || layout.preferred_layout_size(&strip));
        assert!(hit);
        assert_eq!(size, Size::new(50, 50));
        assert_eq!(strip.item.calls.get(), 1);
    }

    #[test]
    fn hits_skip_measurement_and_capacity_bounds_growth() {
        let layout = FlowLayout::default();
        let mut cache = MeasureCache::with_capacity(2);
        let mut strip = Strip {
            items: vec![FixedItem::new(40, 40)],
            width: 100,
        };

        let key = MeasureKey::for_target(&layout, &strip, SizeSelector::Preferred, 0);
        let (size, hit) = cache.get_or_insert_with(key, || Size::new(50, 50));
        assert_eq!((size, hit), (Size::new(50, 50), false));
        let (_, hit) = cache.get_or_insert_with(key, || unreachable!("cached"));
        assert!(hit);

        for width in [120, 140, 160] {
            strip.width = width;
            let key = MeasureKey::for_target(&layout, &strip, SizeSelector::Preferred, 0);
            cache.get_or_insert_with(key, || Size::new(width, 50));
        }
        assert!(cache.len() <= 2);
    }
}
