//! Layout module orchestrator.
//!
//! The flow-wrap engine lives in `core`, width resolution in `adaptive`,
//! measurable items in `item` and the optional measurement cache in `cache`.

pub mod adaptive;
pub mod cache;
mod core;
pub mod item;

pub use adaptive::{SeedSizes, clamp_to_viewport, resolve_available_width};
pub use cache::{MeasureCache, MeasureKey};
pub use core::{
    Alignment, FlowLayout, FlowTarget, Placement, Row, SizeSelector, compute_wrapped_size,
    pack_rows, packing_width, visible_entries, wrapped_size,
};
pub use item::{FixedItem, LabelItem, LayoutItem};
