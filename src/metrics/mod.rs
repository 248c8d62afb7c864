use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;

/// Counters for measurement work and resize synchronization.
#[derive(Debug, Default, Clone)]
pub struct LayoutMetrics {
    measurements: u64,
    cache_hits: u64,
    layout_passes: u64,
    notifications: u64,
    debounced: u64,
    relayouts_posted: u64,
    relayouts_run: u64,
    relayouts_suppressed: u64,
    relayouts_deferred: u64,
}

impl LayoutMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_measurement(&mut self, cache_hit: bool) {
        if cache_hit {
            self.cache_hits = self.cache_hits.saturating_add(1);
        } else {
            self.measurements = self.measurements.saturating_add(1);
        }
    }

    pub fn record_layout_pass(&mut self) {
        self.layout_passes = self.layout_passes.saturating_add(1);
    }

    pub fn record_notification(&mut self, debounced: bool) {
        self.notifications = self.notifications.saturating_add(1);
        if debounced {
            self.debounced = self.debounced.saturating_add(1);
        }
    }

    pub fn record_relayout_posted(&mut self) {
        self.relayouts_posted = self.relayouts_posted.saturating_add(1);
    }

    pub fn record_relayout_run(&mut self) {
        self.relayouts_run = self.relayouts_run.saturating_add(1);
    }

    pub fn record_relayout_suppressed(&mut self) {
        self.relayouts_suppressed = self.relayouts_suppressed.saturating_add(1);
    }

    pub fn record_relayout_deferred(&mut self) {
        self.relayouts_deferred = self.relayouts_deferred.saturating_add(1);
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            measurements: self.measurements,
            cache_hits: self.cache_hits,
            layout_passes: self.layout_passes,
            notifications: self.notifications,
            debounced: self.debounced,
            relayouts_posted: self.relayouts_posted,
            relayouts_run: self.relayouts_run,
            relayouts_suppressed: self.relayouts_suppressed,
            relayouts_deferred: self.relayouts_deferred,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub measurements: u64,
    pub cache_hits: u64,
    pub layout_passes: u64,
    pub notifications: u64,
    pub debounced: u64,
    pub relayouts_posted: u64,
    pub relayouts_run: u64,
    pub relayouts_suppressed: u64,
    pub relayouts_deferred: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "layout_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("measurements".to_string(), json!(self.measurements));
        map.insert("cache_hits".to_string(), json!(self.cache_hits));
        map.insert("layout_passes".to_string(), json!(self.layout_passes));
        map.insert("notifications".to_string(), json!(self.notifications));
        map.insert("debounced".to_string(), json!(self.debounced));
        map.insert("relayouts_posted".to_string(), json!(self.relayouts_posted));
        map.insert("relayouts_run".to_string(), json!(self.relayouts_run));
        map.insert(
            "relayouts_suppressed".to_string(),
            json!(self.relayouts_suppressed),
        );
        map.insert(
            "relayouts_deferred".to_string(),
            json!(self.relayouts_deferred),
        );
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reports_counters_as_fields() {
        let mut metrics = LayoutMetrics::new();
        metrics.record_notification(false);
        metrics.record_notification(true);
        metrics.record_relayout_posted();
        metrics.record_measurement(true);

        let event = metrics.snapshot().to_log_event("wrapflow::metrics");
        assert_eq!(event.message, "layout_metrics");
        assert_eq!(event.field("notifications"), Some(&json!(2)));
        assert_eq!(event.field("debounced"), Some(&json!(1)));
        assert_eq!(event.field("cache_hits"), Some(&json!(1)));
        assert_eq!(event.field("measurements"), Some(&json!(0)));
    }
}
