//! Prometheus-backed metrics.
//!
//! This module defines a [`MetricsRegistry`] that owns a Prometheus
//! registry and the node metrics published on every scrape.

use prometheus::{self, Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

use crate::config::MetricsConfig;

/// Node-level metrics fed by the probes.
#[derive(Clone)]
pub struct NodeMetrics {
    /// Latest block number extracted from the node log (0 when not found).
    pub latest_block: IntGauge,
    /// Failed probes, labelled by probe kind.
    pub probe_errors: IntCounterVec,
}

impl NodeMetrics {
    /// Registers node metrics into the given `Registry`.
    pub fn register(registry: &Registry, namespace: &str) -> Result<Self, prometheus::Error> {
        let latest_block = IntGauge::with_opts(
            Opts::new(
                "latest_block",
                "Latest block number found in the node log tail (0 if none was found)",
            )
            .namespace(namespace),
        )?;
        registry.register(Box::new(latest_block.clone()))?;

        let probe_errors = IntCounterVec::new(
            Opts::new(
                "probe_errors_total",
                "Total number of failed probes (service manager or log file)",
            )
            .namespace(namespace),
            &["probe"],
        )?;
        registry.register(Box::new(probe_errors.clone()))?;

        Ok(Self {
            latest_block,
            probe_errors,
        })
    }
}

/// Wrapper around a Prometheus registry and the node metrics.
///
/// Created once at startup and shared behind an `Arc`. The gauge is the
/// only process-wide mutable state; prometheus gauges are atomic, so writes
/// need no extra lock and the last write wins.
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Registry,
    pub node: NodeMetrics,
}

impl MetricsRegistry {
    /// Creates a fresh registry with the node metrics and, when enabled on
    /// Linux, the default process collector.
    pub fn new(cfg: &MetricsConfig) -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let node = NodeMetrics::register(&registry, &cfg.namespace)?;

        if cfg.process_metrics {
            register_process_collector(&registry)?;
        }

        Ok(Self { registry, node })
    }

    /// Overwrites the latest-block gauge.
    pub fn set_latest_block(&self, value: i64) {
        self.node.latest_block.set(value);
    }

    /// Counts one failed probe of the given kind.
    pub fn record_probe_error(&self, probe: &str) {
        self.node.probe_errors.with_label_values(&[probe]).inc();
    }

    /// Encodes all metrics in this registry into the Prometheus text format.
    pub fn gather_text(&self) -> Result<String, prometheus::Error> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(target_os = "linux")]
fn register_process_collector(registry: &Registry) -> Result<(), prometheus::Error> {
    registry.register(Box::new(prometheus::process_collector::ProcessCollector::for_self()))
}

#[cfg(not(target_os = "linux"))]
fn register_process_collector(_registry: &Registry) -> Result<(), prometheus::Error> {
    tracing::debug!("process metrics are only collected on Linux");
    Ok(())
}

/// Content type of the Prometheus text exposition format.
pub const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> MetricsRegistry {
        MetricsRegistry::new(&MetricsConfig {
            process_metrics: false,
            ..MetricsConfig::default()
        })
        .expect("create metrics registry")
    }

    #[test]
    fn node_metrics_register_and_record() {
        let registry = Registry::new();
        let metrics = NodeMetrics::register(&registry, "redbelly").expect("register metrics");

        metrics.latest_block.set(12);
        metrics.probe_errors.with_label_values(&["block"]).inc();

        let metric_families = registry.gather();
        assert_eq!(metric_families.len(), 2);
    }

    #[test]
    fn latest_block_gauge_is_overwritten() {
        let registry = registry();
        registry.set_latest_block(100);
        registry.set_latest_block(7);

        assert_eq!(registry.node.latest_block.get(), 7);
        let text = registry.gather_text().unwrap();
        assert!(text.contains("redbelly_latest_block 7"));
    }

    #[test]
    fn probe_errors_are_labelled() {
        let registry = registry();
        registry.record_probe_error("service");
        registry.record_probe_error("service");

        let text = registry.gather_text().unwrap();
        assert!(text.contains(r#"redbelly_probe_errors_total{probe="service"} 2"#));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn process_metrics_are_exported_on_linux() {
        let registry = MetricsRegistry::new(&MetricsConfig::default()).unwrap();
        let text = registry.gather_text().unwrap();
        assert!(text.contains("process_cpu_seconds_total"));
    }
}
