//! systemd-backed service probe.
//!
//! Shells out to `systemctl`. systemctl reports inactive or failed units
//! through non-zero exit codes while still printing an answer, so a
//! non-zero exit is only treated as a failure when stdout is empty.

use std::ffi::OsString;

use async_trait::async_trait;
use tokio::process::Command;

use super::ServiceProbe;
use crate::error::ProbeError;
use crate::types::ServiceState;

/// Probes a systemd unit through the `systemctl` command.
#[derive(Clone, Debug)]
pub struct SystemdProbe {
    unit: String,
    program: OsString,
}

impl SystemdProbe {
    /// Probe for `unit` using `systemctl` from `PATH`.
    pub fn new(unit: impl Into<String>) -> Self {
        Self::with_program(unit, "systemctl")
    }

    /// Probe for `unit` using an explicit systemctl-compatible program.
    pub fn with_program(unit: impl Into<String>, program: impl Into<OsString>) -> Self {
        Self {
            unit: unit.into(),
            program: program.into(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<String, ProbeError> {
        let output = Command::new(&self.program)
            .args(args)
            .arg(&self.unit)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ProbeError::ServiceQuery {
                unit: self.unit.clone(),
                command: format!("{} {}", self.program.to_string_lossy(), args.join(" ")),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();

        if !output.status.success() && stdout.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ProbeError::ServiceOutput {
                unit: self.unit.clone(),
                message: if stderr.is_empty() {
                    format!("{} exited with {}", args.join(" "), output.status)
                } else {
                    stderr
                },
            });
        }

        Ok(stdout)
    }
}

#[async_trait]
impl ServiceProbe for SystemdProbe {
    fn unit(&self) -> &str {
        &self.unit
    }

    async fn check_service_active(&self) -> Result<ServiceState, ProbeError> {
        let out = self.run(&["is-active"]).await?;
        Ok(ServiceState::from_is_active(&out))
    }

    async fn main_pid(&self) -> Result<Option<String>, ProbeError> {
        let out = self.run(&["show", "--property=MainPID", "--value"]).await?;
        Ok(parse_main_pid(&out))
    }

    async fn status_report(&self) -> Result<String, ProbeError> {
        self.run(&["status", "--no-pager", "--lines=0"]).await
    }
}

/// Parses `systemctl show --property=MainPID` output.
///
/// Accepts both `--value` output (`1234`) and `MainPID=1234`. A pid of 0
/// means the unit has no running main process.
fn parse_main_pid(output: &str) -> Option<String> {
    let value = output.trim();
    let value = value.strip_prefix("MainPID=").unwrap_or(value);

    if value.is_empty() || value == "0" || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(value.to_string())
}
