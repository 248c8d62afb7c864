use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::{Insets, Rect, Size};

use super::adaptive::{clamp_to_viewport, resolve_available_width};
use super::item::LayoutItem;

/// Row justification inside the packing width.
///
/// Wrapping always packs left-to-right; alignment only shifts finished rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Leading,
    Trailing,
}

impl Alignment {
    fn offset(self, slack: u32) -> u32 {
        match self {
            Alignment::Left | Alignment::Leading => 0,
            Alignment::Center => slack / 2,
            Alignment::Right | Alignment::Trailing => slack,
        }
    }
}

/// Which of an item's two sizes a measurement reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeSelector {
    Preferred,
    Minimum,
}

impl SizeSelector {
    pub fn measure(self, item: &dyn LayoutItem) -> Size {
        match self {
            SizeSelector::Preferred => item.preferred_size(),
            SizeSelector::Minimum => item.minimum_size(),
        }
    }
}

/// Container side of the measurement protocol.
pub trait FlowTarget {
    fn item_count(&self) -> usize;

    fn item(&self, index: usize) -> Option<&dyn LayoutItem>;

    fn insets(&self) -> Insets;

    /// Current assigned width; 0 before the first layout.
    fn current_width(&self) -> u32;

    /// Width of the enclosing scroll viewport, if the container lives in one.
    fn viewport_width(&self) -> Option<u32> {
        None
    }

    /// Whether the container's geometry is settled (not awaiting revalidation).
    fn is_valid(&self) -> bool {
        true
    }
}

/// One wrapped row: a contiguous run of visible items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Positions in the visible-item sequence.
    pub items: Range<usize>,
    pub width: u32,
    pub height: u32,
}

/// Bounds assigned to a visible item by [`FlowLayout::layout_container`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Index of the item in its container, hidden items included.
    pub index: usize,
    pub bounds: Rect,
}

/// Width left for rows once insets and the two edge gaps are taken out.
///
/// An available width of 0 means unconstrained.
pub fn packing_width(available_width: u32, insets: Insets, hgap: u32) -> u32 {
    if available_width == 0 {
        return u32::MAX;
    }
    available_width.saturating_sub(insets.horizontal().saturating_add(hgap.saturating_mul(2)))
}

/// Greedy left-to-right row packing.
///
/// An item joins the current row when the row is empty or when it still fits
/// after one `hgap`; an item wider than the packing width gets a row of its own.
pub fn pack_rows(sizes: &[Size], packing_width: u32, hgap: u32) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut start = 0;
    let mut row_width = 0u32;
    let mut row_height = 0u32;

    for (idx, size) in sizes.iter().enumerate() {
        let overflows = row_width
            .saturating_add(hgap)
            .saturating_add(size.width)
            > packing_width;
        if row_width > 0 && overflows {
            rows.push(Row {
                items: start..idx,
                width: row_width,
                height: row_height,
            });
            start = idx;
            row_width = 0;
            row_height = 0;
        }

        if idx > start {
            row_width = row_width.saturating_add(hgap);
        }
        row_width = row_width.saturating_add(size.width);
        row_height = row_height.max(size.height);
    }

    if start < sizes.len() {
        rows.push(Row {
            items: start..sizes.len(),
            width: row_width,
            height: row_height,
        });
    }

    rows
}

fn fold_rows(rows: &[Row], insets: Insets, hgap: u32, vgap: u32) -> Size {
    let width = rows.iter().map(|row| row.width).max().unwrap_or(0);
    let row_gaps = u32::try_from(rows.len().saturating_sub(1)).unwrap_or(u32::MAX);
    let height = rows
        .iter()
        .fold(0u32, |acc, row| acc.saturating_add(row.height))
        .saturating_add(vgap.saturating_mul(row_gaps));

    Size::new(
        width
            .saturating_add(insets.horizontal())
            .saturating_add(hgap.saturating_mul(2)),
        height
            .saturating_add(insets.vertical())
            .saturating_add(vgap.saturating_mul(2)),
    )
}

/// Wrapped size of an already measured sequence of visible item sizes.
pub fn wrapped_size(
    sizes: &[Size],
    available_width: u32,
    insets: Insets,
    hgap: u32,
    vgap: u32,
) -> Size {
    let rows = pack_rows(sizes, packing_width(available_width, insets, hgap), hgap);
    fold_rows(&rows, insets, hgap, vgap)
}

/// Measure items and compute their wrapped size; hidden items take no space.
pub fn compute_wrapped_size<'a, I>(
    items: I,
    available_width: u32,
    insets: Insets,
    hgap: u32,
    vgap: u32,
    selector: SizeSelector,
) -> Size
where
    I: IntoIterator<Item = &'a dyn LayoutItem>,
{
    let sizes: Vec<Size> = items
        .into_iter()
        .filter(|item| item.is_visible())
        .map(|item| selector.measure(item))
        .collect();
    wrapped_size(&sizes, available_width, insets, hgap, vgap)
}

/// Visible items of a target with their container indices.
pub fn visible_entries<T>(target: &T, selector: SizeSelector) -> Vec<(usize, Size)>
where
    T: FlowTarget + ?Sized,
{
    (0..target.item_count())
        .filter_map(|index| target.item(index).map(|item| (index, item)))
        .filter(|(_, item)| item.is_visible())
        .map(|(index, item)| (index, selector.measure(item)))
        .collect()
}

/// Flow layout that wraps rows and reports sizes consistent with its wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowLayout {
    pub alignment: Alignment,
    pub hgap: u32,
    pub vgap: u32,
}

impl Default for FlowLayout {
    fn default() -> Self {
        Self {
            alignment: Alignment::Left,
            hgap: 5,
            vgap: 5,
        }
    }
}

impl FlowLayout {
    pub fn new(alignment: Alignment, hgap: u32, vgap: u32) -> Self {
        Self {
            alignment,
            hgap,
            vgap,
        }
    }

    /// Parse a layout from JSON; missing fields keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn preferred_layout_size<T>(&self, target: &T) -> Size
    where
        T: FlowTarget + ?Sized,
    {
        self.layout_size(target, SizeSelector::Preferred)
    }

    pub fn minimum_layout_size<T>(&self, target: &T) -> Size
    where
        T: FlowTarget + ?Sized,
    {
        let mut minimum = self.layout_size(target, SizeSelector::Minimum);
        // Legacy flow-layout compatibility, not a layout rule.
        minimum.width = minimum.width.saturating_sub(self.hgap.saturating_add(1));
        minimum
    }

    /// Wrapped size for the width the target currently resolves to.
    pub fn layout_size<T>(&self, target: &T, selector: SizeSelector) -> Size
    where
        T: FlowTarget + ?Sized,
    {
        let viewport = target.viewport_width();
        let available = resolve_available_width(target.current_width(), viewport);
        let sizes: Vec<Size> = visible_entries(target, selector)
            .into_iter()
            .map(|(_, size)| size)
            .collect();
        let size = wrapped_size(&sizes, available, target.insets(), self.hgap, self.vgap);
        clamp_to_viewport(size, viewport, target.is_valid())
    }

    /// Row partition the target would be laid out with.
    pub fn rows<T>(&self, target: &T, selector: SizeSelector) -> Vec<Row>
    where
        T: FlowTarget + ?Sized,
    {
        let available = resolve_available_width(target.current_width(), target.viewport_width());
        let sizes: Vec<Size> = visible_entries(target, selector)
            .into_iter()
            .map(|(_, size)| size)
            .collect();
        pack_rows(
            &sizes,
            packing_width(available, target.insets(), self.hgap),
            self.hgap,
        )
    }

    /// Assign bounds to every visible item at its preferred size.
    ///
    /// Rows start one `hgap` inside the left inset, the first row one `vgap`
    /// below the top inset; items shorter than their row are centred in it.
    pub fn layout_container<T>(&self, target: &T) -> Vec<Placement>
    where
        T: FlowTarget + ?Sized,
    {
        self.arrange(target).0
    }

    /// Placements together with the rows they were packed into, from a
    /// single measurement of the items.
    pub fn arrange<T>(&self, target: &T) -> (Vec<Placement>, Vec<Row>)
    where
        T: FlowTarget + ?Sized,
    {
        let insets = target.insets();
        let available = resolve_available_width(target.current_width(), target.viewport_width());
        let packing = packing_width(available, insets, self.hgap);
        let entries = visible_entries(target, SizeSelector::Preferred);
        let sizes: Vec<Size> = entries.iter().map(|(_, size)| *size).collect();
        let rows = pack_rows(&sizes, packing, self.hgap);

        let origin_x = insets.left.saturating_add(self.hgap);
        let mut y = insets.top.saturating_add(self.vgap);
        let mut placements = Vec::with_capacity(entries.len());

        for row in &rows {
            let slack = if available == 0 {
                0
            } else {
                packing.saturating_sub(row.width)
            };
            let mut x = origin_x.saturating_add(self.alignment.offset(slack));

            for &(index, size) in &entries[row.items.clone()] {
                let dy = row.height.saturating_sub(size.height) / 2;
                placements.push(Placement {
                    index,
                    bounds: Rect::new(x, y.saturating_add(dy), size.width, size.height),
                });
                x = x.saturating_add(size.width).saturating_add(self.hgap);
            }

            y = y.saturating_add(row.height).saturating_add(self.vgap);
        }

        (placements, rows)
    }
}
