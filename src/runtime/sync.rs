//! Resize synchronization between a top-level window and a wrap panel.
//!
//! A width change posts one relayout to the event queue instead of laying
//! out inside the notification, so the relayout sees settled geometry and a
//! drag storm cannot re-enter layout.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde_json::json;

use crate::logging::{LogLevel, emit, json_kv};
use crate::panel::WrapPanel;

use super::SyncConfig;
use super::queue::EventQueue;
use super::window::{ResizeObserver, SubscriptionId, Window};

const LOG_TARGET: &str = "wrapflow::sync";
const METRICS_TARGET: &str = "wrapflow::metrics";

/// Why a relayout was posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayoutCause {
    WindowResized,
    ViewportChanged,
    Requested,
    /// Catch-up pass for relayouts dropped by the per-drain budget.
    Deferred,
}

impl RelayoutCause {
    fn as_str(self) -> &'static str {
        match self {
            RelayoutCause::WindowResized => "window_resized",
            RelayoutCause::ViewportChanged => "viewport_changed",
            RelayoutCause::Requested => "requested",
            RelayoutCause::Deferred => "deferred",
        }
    }
}

enum Attachment {
    Detached,
    Attached {
        window: Rc<Window>,
        subscription: SubscriptionId,
        baseline: Rc<Cell<u32>>,
    },
}

/// Posts and runs relayouts for one panel, with a per-drain budget.
///
/// Relayouts over budget are dropped, but the first one dropped schedules a
/// single catch-up pass at the start of the next drain so the panel always
/// ends up laid out for the final geometry.
struct Relayouter {
    panel: Weak<RefCell<WrapPanel>>,
    queue: Weak<EventQueue>,
    config: SyncConfig,
    generation: Cell<u64>,
    runs_this_drain: Cell<u32>,
    deferred: Cell<bool>,
}

impl Relayouter {
    fn on_window_resized(self: &Rc<Self>, baseline: &Cell<u32>, width: u32) {
        let unchanged = baseline.get() == width;
        if let Some(metrics) = self.config.metrics.as_ref() {
            metrics.borrow_mut().record_notification(unchanged);
        }
        if unchanged {
            emit(
                self.config.logger.as_ref(),
                LogLevel::Trace,
                LOG_TARGET,
                "resize_debounced",
                [json_kv("width", json!(width))],
            );
            return;
        }

        baseline.set(width);
        self.post(RelayoutCause::WindowResized);
    }

    fn post(self: &Rc<Self>, cause: RelayoutCause) {
        let Some(queue) = self.queue.upgrade() else {
            return;
        };
        if let Some(metrics) = self.config.metrics.as_ref() {
            metrics.borrow_mut().record_relayout_posted();
        }
        emit(
            self.config.logger.as_ref(),
            LogLevel::Debug,
            LOG_TARGET,
            "relayout_posted",
            [json_kv("cause", json!(cause.as_str()))],
        );

        let this = Rc::clone(self);
        queue.post("relayout", move || this.run(cause));
    }

    fn run(self: &Rc<Self>, cause: RelayoutCause) {
        let Some(panel) = self.panel.upgrade() else {
            emit(
                self.config.logger.as_ref(),
                LogLevel::Trace,
                LOG_TARGET,
                "relayout_skipped",
                [json_kv("reason", json!("panel_dropped"))],
            );
            return;
        };

        if cause == RelayoutCause::Deferred {
            self.deferred.set(false);
        }
        if !self.within_budget() {
            if let Some(metrics) = self.config.metrics.as_ref() {
                metrics.borrow_mut().record_relayout_suppressed();
            }
            emit(
                self.config.logger.as_ref(),
                LogLevel::Warn,
                LOG_TARGET,
                "relayout_suppressed",
                [
                    json_kv("cause", json!(cause.as_str())),
                    json_kv("limit", json!(self.config.max_consecutive_relayouts)),
                ],
            );
            self.defer();
            return;
        }

        let outcome = {
            let Ok(mut panel) = panel.try_borrow_mut() else {
                emit(
                    self.config.logger.as_ref(),
                    LogLevel::Warn,
                    LOG_TARGET,
                    "relayout_skipped",
                    [json_kv("reason", json!("panel_busy"))],
                );
                return;
            };
            panel.invalidate();
            let outcome = panel.revalidate();
            panel.repaint();
            outcome
        };

        if let Some(metrics) = self.config.metrics.as_ref() {
            metrics.borrow_mut().record_relayout_run();
        }
        emit(
            self.config.logger.as_ref(),
            LogLevel::Debug,
            LOG_TARGET,
            "relayout_completed",
            [
                json_kv("cause", json!(cause.as_str())),
                json_kv("width", json!(outcome.size.width)),
                json_kv("height", json!(outcome.size.height)),
                json_kv("rows", json!(outcome.rows)),
            ],
        );

        if outcome.viewport_changed {
            self.post(RelayoutCause::ViewportChanged);
        }
    }

    fn emit_metrics(&self) {
        let (Some(logger), Some(metrics)) =
            (self.config.logger.as_ref(), self.config.metrics.as_ref())
        else {
            return;
        };
        let event = metrics.borrow().snapshot().to_log_event(METRICS_TARGET);
        if logger.enabled(event.level) {
            let _ = logger.log_event(event);
        }
    }

    fn defer(self: &Rc<Self>) {
        if self.deferred.replace(true) {
            return;
        }
        let Some(queue) = self.queue.upgrade() else {
            self.deferred.set(false);
            return;
        };
        if let Some(metrics) = self.config.metrics.as_ref() {
            metrics.borrow_mut().record_relayout_deferred();
        }
        emit(
            self.config.logger.as_ref(),
            LogLevel::Debug,
            LOG_TARGET,
            "relayout_deferred",
            std::iter::empty(),
        );

        let this = Rc::clone(self);
        queue.post_next_drain("relayout_deferred", move || this.run(RelayoutCause::Deferred));
    }

    /// Count this run against the budget of the current drain.
    fn within_budget(&self) -> bool {
        if let Some(queue) = self.queue.upgrade() {
            let generation = queue.generation();
            if generation != self.generation.get() {
                self.generation.set(generation);
                self.runs_this_drain.set(0);
            }
        }
        let runs = self.runs_this_drain.get();
        if runs >= self.config.max_consecutive_relayouts {
            return false;
        }
        self.runs_this_drain.set(runs + 1);
        true
    }
}

/// Keeps one window subscription per panel and turns width changes into
/// posted relayouts.
///
/// Dropping the handle removes the subscription.
pub struct ResizeSync {
    relayouter: Rc<Relayouter>,
    attachment: Attachment,
}

impl ResizeSync {
    pub fn new(panel: &Rc<RefCell<WrapPanel>>, queue: &Rc<EventQueue>, config: SyncConfig) -> Self {
        Self {
            relayouter: Rc::new(Relayouter {
                panel: Rc::downgrade(panel),
                queue: Rc::downgrade(queue),
                config,
                generation: Cell::new(0),
                runs_this_drain: Cell::new(0),
                deferred: Cell::new(false),
            }),
            attachment: Attachment::Detached,
        }
    }

    /// Host callback for the panel becoming shown or hidden.
    ///
    /// `window` is the panel's top-level window at that moment, if it has one.
    pub fn on_showing_changed(&mut self, showing: bool, window: Option<&Rc<Window>>) {
        match (showing, window) {
            (true, Some(window)) => self.attach(window),
            (true, None) => {}
            (false, _) => self.detach(),
        }
    }

    /// Subscribe to `window`, replacing any earlier subscription.
    pub fn attach(&mut self, window: &Rc<Window>) {
        self.detach();

        let baseline = Rc::new(Cell::new(window.width()));
        let callback = {
            let relayouter = Rc::clone(&self.relayouter);
            let baseline = Rc::clone(&baseline);
            move |width: u32| relayouter.on_window_resized(&baseline, width)
        };
        let subscription = window.subscribe(Box::new(callback));

        emit(
            self.relayouter.config.logger.as_ref(),
            LogLevel::Info,
            LOG_TARGET,
            "attached",
            [
                json_kv("subscription", json!(subscription)),
                json_kv("baseline", json!(window.width())),
            ],
        );
        self.attachment = Attachment::Attached {
            window: Rc::clone(window),
            subscription,
            baseline,
        };
    }

    pub fn detach(&mut self) {
        let previous = std::mem::replace(&mut self.attachment, Attachment::Detached);
        if let Attachment::Attached {
            window,
            subscription,
            ..
        } = previous
        {
            window.unsubscribe(subscription);
            emit(
                self.relayouter.config.logger.as_ref(),
                LogLevel::Info,
                LOG_TARGET,
                "detached",
                [json_kv("subscription", json!(subscription))],
            );
            self.relayouter.emit_metrics();
        }
    }

    pub fn is_attached(&self) -> bool {
        matches!(self.attachment, Attachment::Attached { .. })
    }

    pub fn window(&self) -> Option<&Rc<Window>> {
        match &self.attachment {
            Attachment::Attached { window, .. } => Some(window),
            Attachment::Detached => None,
        }
    }

    /// Last window width a relayout was posted for.
    pub fn baseline(&self) -> Option<u32> {
        match &self.attachment {
            Attachment::Attached { baseline, .. } => Some(baseline.get()),
            Attachment::Detached => None,
        }
    }

    /// Post a relayout outside of any resize, e.g. after the items changed.
    pub fn request_relayout(&self) {
        self.relayouter.post(RelayoutCause::Requested);
    }
}

impl Drop for ResizeSync {
    fn drop(&mut self) {
        self.detach();
    }
}
