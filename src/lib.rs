//! Flow-wrap layout engine with adaptive width resolution.
//!
//! Items are packed left to right and wrap into additional rows when the
//! available width runs out. A scrollable [`WrapPanel`] resolves that width
//! from its viewport, and [`ResizeSync`] posts a relayout on the
//! [`EventQueue`] whenever the enclosing [`Window`] changes width.

pub mod error;
pub mod geometry;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod panel;
pub mod runtime;
pub mod width;

pub use error::{LayoutError, Result};
pub use geometry::{Insets, Rect, Size};
pub use layout::{
    Alignment, FixedItem, FlowLayout, FlowTarget, LabelItem, LayoutItem, MeasureCache, Placement,
    Row, SeedSizes, SizeSelector, clamp_to_viewport, resolve_available_width,
};
pub use logging::{LogEvent, LogFields, LogLevel, Logger, LoggingError, LoggingResult};
pub use metrics::{LayoutMetrics, MetricSnapshot};
pub use panel::{Orientation, RevalidateOutcome, StaticTheme, ThemeProvider, Viewport, WrapPanel};
pub use runtime::driver::{DriverError, DriverFlow, DriverResult, TerminalDriver};
pub use runtime::{
    EventQueue, RelayoutCause, ResizeObserver, ResizeSync, SubscriptionId, SyncConfig, Window,
};
pub use width::display_width;
