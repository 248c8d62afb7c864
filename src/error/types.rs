use thiserror::Error;

/// Unified result type for the crate.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Errors surfaced around the layout engine.
///
/// Measurement and placement never fail; these cover panel mutation and
/// configuration loading. Terminal failures live in the driver's error type.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("item index {index} out of range for {len} items")]
    ItemNotFound { index: usize, len: usize },
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
