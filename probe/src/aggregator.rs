//! Status Aggregator.
//!
//! Composes the service probe, the log tail reader and the block extractor
//! into the payloads served over HTTP. Independent probes run concurrently
//! and are joined; if any of them fails the whole probe fails. Every
//! external call runs under the configured timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::NodeConfig;
use crate::error::{ConfigError, LOG_PROBE, ProbeError};
use crate::extract::BlockExtractor;
use crate::service::{ServiceProbe, SystemdProbe};
use crate::tail::{FileTailReader, LogTailReader};
use crate::types::{BlockNumber, LogTailWindow, ServiceStatus};

/// Service status together with the latest block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceHealth {
    pub service: ServiceStatus,
    pub latest_block: BlockNumber,
}

/// Full snapshot served by the detailed status endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailedStatus {
    pub service: ServiceStatus,
    pub latest_block: BlockNumber,
    /// Number of log lines the block was extracted from.
    pub window_size: usize,
    /// Human-readable report from the service manager.
    pub system_status: String,
}

/// Runs probes on behalf of one request.
///
/// Holds no per-request state; it can be shared behind an `Arc` and used
/// by any number of concurrent requests.
pub struct StatusAggregator {
    service: Arc<dyn ServiceProbe>,
    tail: Arc<dyn LogTailReader>,
    extractor: Arc<BlockExtractor>,
    timeout: Duration,
    default_window: usize,
}

impl StatusAggregator {
    pub fn new(
        service: Arc<dyn ServiceProbe>,
        tail: Arc<dyn LogTailReader>,
        extractor: Arc<BlockExtractor>,
        timeout: Duration,
        default_window: usize,
    ) -> Self {
        Self {
            service,
            tail,
            extractor,
            timeout,
            default_window,
        }
    }

    /// Builds an aggregator backed by systemd and the configured log file.
    pub fn from_config(cfg: &NodeConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let rules = cfg.log.load_rules()?;

        tracing::info!(
            rules = rules.len(),
            version = rules.version(),
            log = %cfg.log.path.display(),
            unit = %cfg.service.unit,
            "block extraction rules loaded"
        );

        Ok(Self::new(
            Arc::new(SystemdProbe::new(cfg.service.unit.clone())),
            Arc::new(FileTailReader::new(cfg.log.path.clone())),
            Arc::new(BlockExtractor::new(rules)),
            cfg.log.probe_timeout,
            cfg.log.tail_lines,
        ))
    }

    async fn with_timeout<T>(
        &self,
        probe: &'static str,
        fut: impl Future<Output = Result<T, ProbeError>>,
    ) -> Result<T, ProbeError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout {
                probe,
                after: self.timeout,
            }),
        }
    }

    /// Service state and main pid, queried concurrently.
    pub async fn probe_service(&self) -> Result<ServiceStatus, ProbeError> {
        let (state, pid) = tokio::try_join!(
            self.with_timeout("service", self.service.check_service_active()),
            self.with_timeout("pid", self.service.main_pid()),
        )?;

        Ok(ServiceStatus {
            name: self.service.unit().to_string(),
            state,
            pid,
        })
    }

    /// Raw tail window of `window_size` lines.
    pub async fn probe_logs(&self, window_size: usize) -> Result<LogTailWindow, ProbeError> {
        self.with_timeout(LOG_PROBE, self.tail.read_tail(window_size))
            .await
    }

    /// Latest block extracted from a fresh tail window.
    pub async fn probe_block(&self, window_size: usize) -> Result<BlockNumber, ProbeError> {
        let window = self.probe_logs(window_size).await?;
        let block = self.extractor.extract(&window);
        tracing::debug!(lines = window.len(), %block, "block probe finished");
        Ok(block)
    }

    /// Service status and latest block over the default window.
    pub async fn service_health(&self) -> Result<ServiceHealth, ProbeError> {
        let (service, latest_block) =
            tokio::try_join!(self.probe_service(), self.probe_block(self.default_window))?;

        Ok(ServiceHealth {
            service,
            latest_block,
        })
    }

    /// Full snapshot: service status, latest block and the system status
    /// report, probed concurrently.
    pub async fn detailed_status(&self) -> Result<DetailedStatus, ProbeError> {
        let (service, latest_block, system_status) = tokio::try_join!(
            self.probe_service(),
            self.probe_block(self.default_window),
            self.with_timeout("status", self.service.status_report()),
        )?;

        Ok(DetailedStatus {
            service,
            latest_block,
            window_size: self.default_window,
            system_status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::types::ServiceState;

    struct FakeService {
        reachable: bool,
        delay: Option<Duration>,
    }

    impl FakeService {
        fn up() -> Self {
            Self {
                reachable: true,
                delay: None,
            }
        }

        fn unreachable() -> Self {
            Self {
                reachable: false,
                delay: None,
            }
        }

        async fn answer<T>(&self, value: T) -> Result<T, ProbeError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.reachable {
                Ok(value)
            } else {
                Err(ProbeError::ServiceQuery {
                    unit: "redbelly.service".to_string(),
                    command: "systemctl is-active".to_string(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::ConnectionRefused,
                        "Failed to connect to bus",
                    ),
                })
            }
        }
    }

    #[async_trait]
    impl ServiceProbe for FakeService {
        fn unit(&self) -> &str {
            "redbelly.service"
        }

        async fn check_service_active(&self) -> Result<ServiceState, ProbeError> {
            self.answer(ServiceState::Active).await
        }

        async fn main_pid(&self) -> Result<Option<String>, ProbeError> {
            self.answer(Some("4242".to_string())).await
        }

        async fn status_report(&self) -> Result<String, ProbeError> {
            self.answer("● redbelly.service - Redbelly node\n   Active: active (running)".to_string())
                .await
        }
    }

    struct FakeTail {
        lines: Option<Vec<&'static str>>,
    }

    #[async_trait]
    impl LogTailReader for FakeTail {
        async fn read_tail(&self, lines: usize) -> Result<LogTailWindow, ProbeError> {
            match &self.lines {
                Some(all) => {
                    let start = all.len().saturating_sub(lines);
                    Ok(all[start..].iter().copied().collect())
                }
                None => Err(ProbeError::LogRead {
                    path: "/var/log/redbelly/rbn_logs/rbbc_logs.log".into(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                }),
            }
        }
    }

    fn aggregator(service: FakeService, lines: Option<Vec<&'static str>>) -> StatusAggregator {
        StatusAggregator::new(
            Arc::new(service),
            Arc::new(FakeTail { lines }),
            Arc::new(BlockExtractor::default()),
            Duration::from_secs(2),
            1000,
        )
    }

    #[tokio::test]
    async fn probe_service_reports_state_and_pid() {
        let agg = aggregator(FakeService::up(), Some(vec![]));

        let status = agg.probe_service().await.unwrap();
        assert_eq!(status.name, "redbelly.service");
        assert_eq!(status.state, ServiceState::Active);
        assert_eq!(status.pid.as_deref(), Some("4242"));
    }

    #[tokio::test]
    async fn probe_block_extracts_from_window() {
        let agg = aggregator(
            FakeService::up(),
            Some(vec!["Done processing block 10", "Done processing block 12"]),
        );

        assert_eq!(agg.probe_block(1000).await.unwrap(), BlockNumber::Found(12));
    }

    #[tokio::test]
    async fn probe_block_only_sees_the_requested_window() {
        let agg = aggregator(
            FakeService::up(),
            Some(vec!["Done processing block 10", "noise", "noise"]),
        );

        assert_eq!(agg.probe_block(2).await.unwrap(), BlockNumber::NotFound);
        assert_eq!(agg.probe_block(3).await.unwrap(), BlockNumber::Found(10));
    }

    #[tokio::test]
    async fn unreadable_log_is_an_error_not_a_missing_block() {
        let agg = aggregator(FakeService::up(), None);

        let err = agg.probe_block(1000).await.unwrap_err();
        assert!(matches!(err, ProbeError::LogRead { .. }));
    }

    #[tokio::test]
    async fn detailed_status_merges_all_probes() {
        let agg = aggregator(
            FakeService::up(),
            Some(vec![r#"Inserted new chain segment ... number: "7""#]),
        );

        let detailed = agg.detailed_status().await.unwrap();
        assert!(detailed.service.is_active());
        assert_eq!(detailed.latest_block, BlockNumber::Found(7));
        assert_eq!(detailed.window_size, 1000);
        assert!(detailed.system_status.contains("redbelly.service"));
    }

    #[tokio::test]
    async fn failed_service_probe_fails_detailed_status() {
        let agg = aggregator(
            FakeService::unreachable(),
            Some(vec!["Done processing block 5"]),
        );

        // The block probe alone still succeeds.
        assert_eq!(agg.probe_block(1000).await.unwrap(), BlockNumber::Found(5));

        let err = agg.detailed_status().await.unwrap_err();
        assert!(matches!(err, ProbeError::ServiceQuery { .. }));
        assert!(err.to_string().contains("redbelly.service"));
    }

    #[tokio::test]
    async fn slow_probe_times_out() {
        let service = FakeService {
            reachable: true,
            delay: Some(Duration::from_secs(30)),
        };
        let agg = StatusAggregator::new(
            Arc::new(service),
            Arc::new(FakeTail { lines: Some(vec![]) }),
            Arc::new(BlockExtractor::default()),
            Duration::from_millis(50),
            1000,
        );

        let err = agg.probe_service().await.unwrap_err();
        assert!(matches!(err, ProbeError::Timeout { .. }));
    }
}
