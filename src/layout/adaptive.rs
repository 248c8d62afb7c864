//! Adaptive width source.
//!
//! Decides which width the flow engine treats as authoritative when a
//! container has not been laid out yet, or sits inside a scrollable viewport
//! whose width is the real constraint.

use serde::{Deserialize, Serialize};

use crate::geometry::Size;

/// Resolve the available width from the container's own width and the width
/// of an enclosing viewport, if any.
///
/// Returns 0 when nothing is known yet; the engine reads that as
/// "unconstrained" and measures a single row.
pub fn resolve_available_width(current_width: u32, viewport_width: Option<u32>) -> u32 {
    match viewport_width {
        Some(viewport) if viewport > 0 && (current_width == 0 || current_width > viewport) => {
            viewport
        }
        _ => current_width,
    }
}

/// Clamp a reported width to the viewport so the preferred width shrinks
/// with the window.
///
/// Only applies to a valid container inside a viewport of positive width.
pub fn clamp_to_viewport(size: Size, viewport_width: Option<u32>, valid: bool) -> Size {
    match viewport_width {
        Some(viewport) if viewport > 0 && valid => Size::new(size.width.min(viewport), size.height),
        _ => size,
    }
}

/// Constant sizes reported before a panel can measure itself.
///
/// Keeping these small lets a host shrink a panel that has never been shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedSizes {
    /// Preferred size when no layout is installed.
    pub preferred: Size,
    /// Minimum size, always.
    pub minimum: Size,
    /// Scrollable viewport size when no layout is installed.
    pub scrollable: Size,
    /// Width hint reported next to the wrapped height for scrollable sizing.
    pub narrow_width: u32,
}

impl Default for SeedSizes {
    fn default() -> Self {
        Self {
            preferred: Size::new(10, 50),
            minimum: Size::new(10, 10),
            scrollable: Size::new(10, 100),
            narrow_width: 10,
        }
    }
}
