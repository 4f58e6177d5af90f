//! Per-instance battery gauges
//!
//! The gauges live on a caller-supplied [`Registry`] so the exporter owns
//! the registry and hands it to whatever needs it, instead of reaching for
//! the process-wide default one.

use crate::error::MetricsError;
use crate::record::Readings;
use prometheus::proto::MetricFamily;
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};

/// Label distinguishing series per reporting client.
pub const INSTANCE_LABEL: &str = "instance";

/// Thread-safe store of per-instance gauge values.
pub trait MetricStore: Send + Sync {
    /// Overwrite all gauges for `instance`.
    fn upsert(&self, instance: &str, readings: &Readings);

    /// Snapshot of every metric family in the store.
    fn gather(&self) -> Vec<MetricFamily>;

    /// Text exposition of [`gather`](Self::gather).
    fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// The six battery gauges, registered on a [`Registry`].
///
/// Entries are never evicted; stale instances are left for the scraper
/// to filter by `last_updated`.
#[derive(Clone)]
pub struct BatteryMetrics {
    registry: Registry,
    charging: GaugeVec,
    discharging_time: GaugeVec,
    charging_time: GaugeVec,
    level: GaugeVec,
    tab_count: GaugeVec,
    last_updated: GaugeVec,
}

impl BatteryMetrics {
    /// Create the gauges and register them on `registry`.
    ///
    /// Fails if any of the names is already registered there.
    pub fn register(registry: &Registry) -> Result<Self, MetricsError> {
        let metrics = Self {
            registry: registry.clone(),
            charging: gauge_vec("charging", "charging")?,
            discharging_time: gauge_vec("dischargingTime", "dischargingtime")?,
            charging_time: gauge_vec("chargingTime", "chargingtime")?,
            level: gauge_vec("level", "charge level")?,
            tab_count: gauge_vec("tabCount", "tab count")?,
            last_updated: gauge_vec("last_updated", "timestamp of last update")?,
        };

        for vec in [
            &metrics.charging,
            &metrics.discharging_time,
            &metrics.charging_time,
            &metrics.level,
            &metrics.tab_count,
            &metrics.last_updated,
        ] {
            registry.register(Box::new(vec.clone()))?;
        }

        Ok(metrics)
    }

    /// Current readings for an instance, if it has reported.
    pub fn snapshot(&self, instance: &str) -> Option<Readings> {
        let get = |vec: &GaugeVec| {
            vec.get_metric_with_label_values(&[instance])
                .ok()
                .map(|g| g.get())
        };
        // A label set that was never written has no last_updated entry yet
        let known = self
            .gather()
            .iter()
            .filter(|mf| mf.get_name() == "last_updated")
            .flat_map(|mf| mf.get_metric())
            .any(|m| m.get_label().iter().any(|l| l.get_value() == instance));
        if !known {
            return None;
        }

        Some(Readings {
            charging: get(&self.charging)?,
            charging_time: get(&self.charging_time)?,
            discharging_time: get(&self.discharging_time)?,
            level: get(&self.level)?,
            tab_count: get(&self.tab_count)?,
            last_updated: get(&self.last_updated)?,
        })
    }
}

fn gauge_vec(name: &str, help: &str) -> Result<GaugeVec, MetricsError> {
    Ok(GaugeVec::new(Opts::new(name, help), &[INSTANCE_LABEL])?)
}

impl MetricStore for BatteryMetrics {
    fn upsert(&self, instance: &str, readings: &Readings) {
        let labels = [instance];
        self.level.with_label_values(&labels).set(readings.level);
        self.charging_time
            .with_label_values(&labels)
            .set(readings.charging_time);
        self.discharging_time
            .with_label_values(&labels)
            .set(readings.discharging_time);
        self.charging.with_label_values(&labels).set(readings.charging);
        self.tab_count
            .with_label_values(&labels)
            .set(readings.tab_count);
        self.last_updated
            .with_label_values(&labels)
            .set(readings.last_updated);
    }

    fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }
}
