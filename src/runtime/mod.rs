//! Event-driven side of the engine: the next-tick queue, windows with resize
//! notifications, and the synchronization that turns width changes into
//! posted relayouts.
//!
//! Everything here runs on the UI thread; state is shared through `Rc`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::logging::Logger;
use crate::metrics::LayoutMetrics;

pub mod driver;
pub mod queue;
pub mod sync;
pub mod window;

pub use queue::EventQueue;
pub use sync::{RelayoutCause, ResizeSync};
pub use window::{ResizeObserver, SubscriptionId, Window};

/// Configuration knobs for resize synchronization.
#[derive(Clone)]
pub struct SyncConfig {
    /// Optional structured logger.
    pub logger: Option<Logger>,
    /// Metrics accumulator shared with the host.
    pub metrics: Option<Rc<RefCell<LayoutMetrics>>>,
    /// Relayouts one panel may run within a single queue drain; the rest are
    /// dropped so a host that keeps changing geometry cannot spin forever.
    pub max_consecutive_relayouts: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            logger: None,
            metrics: None,
            max_consecutive_relayouts: 8,
        }
    }
}

impl SyncConfig {
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_max_consecutive_relayouts(mut self, limit: u32) -> Self {
        self.max_consecutive_relayouts = limit;
        self
    }

    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Rc::new(RefCell::new(LayoutMetrics::new())));
        }
    }

    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    /// Access the shared metrics handle if metrics are enabled.
    pub fn metrics_handle(&self) -> Option<Rc<RefCell<LayoutMetrics>>> {
        self.metrics.as_ref().map(Rc::clone)
    }
}
