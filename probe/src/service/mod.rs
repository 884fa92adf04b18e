//! Service Status Probe.
//!
//! The aggregator only talks to the service manager through
//! [`ServiceProbe`], so tests can swap in a fake instead of running
//! `systemctl`.

pub mod systemd;

use async_trait::async_trait;

use crate::error::ProbeError;
use crate::types::ServiceState;

pub use systemd::SystemdProbe;

/// Queries the OS service manager about one unit.
#[async_trait]
pub trait ServiceProbe: Send + Sync {
    /// Unit name being probed, e.g. `redbelly.service`.
    fn unit(&self) -> &str;

    /// Whether the unit is active.
    async fn check_service_active(&self) -> Result<ServiceState, ProbeError>;

    /// Main process id of the unit, `None` if it has no running process.
    async fn main_pid(&self) -> Result<Option<String>, ProbeError>;

    /// Human-readable status report for the unit.
    async fn status_report(&self) -> Result<String, ProbeError>;
}
