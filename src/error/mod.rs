//! Error orchestrator; the concrete types live in `types`.

mod types;

pub use types::{LayoutError, Result};
