//! Health gateway configuration.
//!
//! Every setting is a command-line flag with an environment variable
//! fallback, and maps onto `node_probe::NodeConfig` plus the HTTP listen
//! address.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use node_probe::{LogConfig, MetricsConfig, NodeConfig, ServiceConfig};

/// Health-check and metrics sidecar for a Redbelly node.
#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "0.0.0.0:9092", env = "HEALTH_LISTEN_ADDR")]
    pub listen_addr: SocketAddr,

    /// Path of the node's rolling log file
    #[arg(
        long,
        default_value = node_probe::config::DEFAULT_LOG_PATH,
        env = "HEALTH_LOG_PATH"
    )]
    pub log_path: PathBuf,

    /// systemd unit running the node
    #[arg(
        long,
        default_value = node_probe::config::DEFAULT_SERVICE_UNIT,
        env = "HEALTH_SERVICE_UNIT"
    )]
    pub service_unit: String,

    /// Default number of log lines scanned per probe
    #[arg(long, default_value_t = 1000, env = "HEALTH_TAIL_LINES")]
    pub tail_lines: usize,

    /// Largest tail window a request may ask for
    #[arg(long, default_value_t = 10_000, env = "HEALTH_MAX_TAIL_LINES")]
    pub max_tail_lines: usize,

    /// Timeout for each log read or systemctl call, in seconds
    #[arg(long, default_value_t = 5, env = "HEALTH_PROBE_TIMEOUT_SECS")]
    pub probe_timeout_secs: u64,

    /// TOML file replacing the built-in block extraction rules
    #[arg(long, env = "HEALTH_RULES_FILE")]
    pub rules_file: Option<PathBuf>,

    /// Do not export the default process_* metrics
    #[arg(long, env = "HEALTH_NO_PROCESS_METRICS")]
    pub no_process_metrics: bool,
}

/// Configuration for the health gateway HTTP server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP server to.
    pub listen_addr: SocketAddr,
    /// Probe configuration handed to the `node_probe` crate.
    pub node: NodeConfig,
}

impl From<Args> for ApiConfig {
    fn from(args: Args) -> Self {
        Self {
            listen_addr: args.listen_addr,
            node: NodeConfig {
                service: ServiceConfig {
                    unit: args.service_unit,
                },
                log: LogConfig {
                    path: args.log_path,
                    tail_lines: args.tail_lines,
                    max_tail_lines: args.max_tail_lines,
                    probe_timeout: Duration::from_secs(args.probe_timeout_secs),
                    rules_file: args.rules_file,
                },
                metrics: MetricsConfig {
                    process_metrics: !args.no_process_metrics,
                    ..MetricsConfig::default()
                },
            },
        }
    }
}
